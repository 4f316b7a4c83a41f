//! Caller-supplied parameters: normalization and literal binding.

use oxigraph::model::Literal;
use serde::Serialize;

use crate::error::{CrashGraphError, Result};

/// Where the legacy HTTP route expects the parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamSource {
    /// Trailing path segment, e.g. `/filterDataByPhase/landing`.
    Path,
    /// Query-string argument, e.g. `/filterDataByDate?date=2021-07-02`.
    Query,
}

/// Declaration of the single parameter a template accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Upper-case the first letter to match the stored casing.
    pub capitalize: bool,
    pub source: ParamSource,
}

impl ParamSpec {
    /// A path parameter, capitalized before binding.
    pub const fn path(name: &'static str) -> Self {
        Self {
            name,
            capitalize: true,
            source: ParamSource::Path,
        }
    }

    /// A query-string parameter bound verbatim.
    pub const fn query(name: &'static str) -> Self {
        Self {
            name,
            capitalize: false,
            source: ParamSource::Query,
        }
    }

    /// Apply the casing convention; empty values are rejected.
    pub fn normalize(&self, raw: &str) -> Result<String> {
        if raw.is_empty() {
            return Err(CrashGraphError::InvalidInput(format!(
                "parameter '{}' must not be empty",
                self.name
            )));
        }
        if self.capitalize {
            Ok(capitalize_first(raw))
        } else {
            Ok(raw.to_string())
        }
    }
}

/// Upper-case the first character and keep the rest as given.
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Serialize a value as a plain RDF literal in SPARQL syntax.
///
/// Quotes, backslashes and line breaks are escaped by the literal writer, so
/// the value can never close the literal and inject query text.
pub fn bind_literal(value: &str) -> String {
    Literal::new_simple_literal(value).to_string()
}
