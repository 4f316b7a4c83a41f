//! Query Template Library: the flat namespace of analytical operations.

pub mod catalog;
pub mod params;
pub mod template;

pub use catalog::TEMPLATES;
pub use params::{capitalize_first, ParamSource, ParamSpec};
pub use template::QueryTemplate;

use serde::Serialize;

use crate::error::{CrashGraphError, Result};
use crate::normalize::RowLayout;

/// Operation name of the risk inference.
pub const DERIVE_RISK: &str = "derive-risk";

/// Legacy routes answering the risk inference.
pub const DERIVE_RISK_ROUTES: &[&str] = &["/test", "/apply_rule"];

/// A resolved operation name.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    Template(&'static QueryTemplate),
    DeriveRisk,
}

impl Operation {
    /// Resolve an operation by name.
    pub fn lookup(name: &str) -> Result<Self> {
        if name == DERIVE_RISK {
            return Ok(Self::DeriveRisk);
        }
        catalog::find(name)
            .map(Self::Template)
            .ok_or_else(|| CrashGraphError::UnknownOperation(name.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Template(template) => template.name,
            Self::DeriveRisk => DERIVE_RISK,
        }
    }

    pub fn param(&self) -> Option<ParamSpec> {
        match self {
            Self::Template(template) => template.param,
            Self::DeriveRisk => None,
        }
    }
}

/// Catalog entry as listed to callers.
#[derive(Debug, Serialize)]
pub struct OperationInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub parameter: Option<ParamSpec>,
    pub layout: RowLayout,
    pub routes: Vec<&'static str>,
}

/// Every operation, templates first, then the inference.
pub fn operations() -> Vec<OperationInfo> {
    let mut operations: Vec<OperationInfo> = TEMPLATES
        .iter()
        .map(|template| OperationInfo {
            name: template.name,
            description: template.description,
            parameter: template.param,
            layout: template.layout,
            routes: vec![template.legacy_route],
        })
        .collect();

    operations.push(OperationInfo {
        name: DERIVE_RISK,
        description: "Drones inferred to be high risk (crashed in heavy rain or snow)",
        parameter: None,
        layout: RowLayout::Named,
        routes: DERIVE_RISK_ROUTES.to_vec(),
    });
    operations
}
