use crate::error::{CrashGraphError, Result};
use crate::normalize::RowLayout;
use crate::query::params::{bind_literal, ParamSpec};
use crate::store::PreparedQuery;

/// Marker replaced by the bound literal in a template body.
pub const PLACEHOLDER: &str = "%value%";

const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// One parameterized analytical query.
#[derive(Debug)]
pub struct QueryTemplate {
    /// Operation name, e.g. `model-with-most-crashes-by-weather`.
    pub name: &'static str,
    pub description: &'static str,
    /// Legacy HTTP route of the same view.
    pub legacy_route: &'static str,
    pub param: Option<ParamSpec>,
    pub layout: RowLayout,
    /// SPARQL body without prologue; uses the `rdf:` and `onto:` prefixes.
    pub body: &'static str,
}

/// `PREFIX` declarations shared by every query.
pub fn prologue(namespace: &str) -> String {
    format!(
        "PREFIX rdf: <{}>\nPREFIX onto: <{}>\n",
        RDF_NAMESPACE, namespace
    )
}

impl QueryTemplate {
    /// Bind `value` (if the template takes one) and render the full query.
    pub fn prepare(&self, namespace: &str, value: Option<&str>) -> Result<PreparedQuery> {
        let body = match (self.param, value) {
            (None, None) => self.body.to_string(),
            (Some(spec), Some(raw)) => {
                let value = spec.normalize(raw)?;
                self.body.replace(PLACEHOLDER, &bind_literal(&value))
            }
            (Some(spec), None) => {
                return Err(CrashGraphError::InvalidInput(format!(
                    "operation '{}' requires parameter '{}'",
                    self.name, spec.name
                )));
            }
            (None, Some(_)) => {
                return Err(CrashGraphError::InvalidInput(format!(
                    "operation '{}' takes no parameter",
                    self.name
                )));
            }
        };

        Ok(PreparedQuery::new(
            self.name,
            format!("{}{}", prologue(namespace), body),
        ))
    }
}
