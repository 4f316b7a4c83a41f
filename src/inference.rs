//! Inference Engine: one forward-chaining rule over the base facts.
//!
//! ```text
//! Drone(?d) ^ CrashEvent(?e) ^ involvedInCrash(?d, ?e) ^ weather(?e, "Heavy Rain/Snow")
//!     -> hasRisk(?d, "High")
//! ```
//!
//! Evaluation goes from base facts (a loaded [`Graph`]) to [`DerivedFacts`].
//! Derived facts are a set and live only for the current request: they are
//! merged into a new snapshot with [`InferenceEngine::materialize`], never
//! into the source graph.

use std::collections::HashSet;

use oxigraph::model::{Literal, NamedNode, Subject, Term, Triple};
use serde::Serialize;

use crate::error::{CrashGraphError, Result};
use crate::normalize::lexical;
use crate::query::params::bind_literal;
use crate::query::template::prologue;
use crate::store::{Graph, PreparedQuery};

/// Weather value that makes a crash count towards high risk.
pub const HEAVY_RAIN_SNOW: &str = "Heavy Rain/Snow";

/// Risk label attached by the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLevel {
    High,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High",
        }
    }
}

/// `hasRisk(drone, risk)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivedFact {
    pub drone: Subject,
    pub risk: RiskLevel,
}

/// Result of applying the rule: each drone at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedFacts {
    facts: Vec<DerivedFact>,
}

impl DerivedFacts {
    pub fn facts(&self) -> &[DerivedFact] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// Applies the high-risk rule and answers queries over base + derived facts.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    namespace: String,
    has_risk: NamedNode,
}

impl InferenceEngine {
    pub fn new(namespace: &str) -> Result<Self> {
        let has_risk = NamedNode::new(format!("{}hasRisk", namespace))
            .map_err(|e| CrashGraphError::Config(format!("Invalid namespace {}: {}", namespace, e)))?;
        Ok(Self {
            namespace: namespace.to_string(),
            has_risk,
        })
    }

    /// Evaluate the rule body against `base` and collect one fact per drone.
    ///
    /// Fails as a whole on any evaluation error; nothing partial is returned.
    pub fn derive(&self, base: &Graph) -> Result<DerivedFacts> {
        let body = PreparedQuery::new(
            "derive-risk/rule",
            format!(
                "{}SELECT ?d WHERE {{\n  ?d rdf:type onto:Drone .\n  ?e rdf:type onto:CrashEvent .\n  ?d onto:involvedInCrash ?e .\n  ?e onto:weather {} .\n}}",
                prologue(&self.namespace),
                bind_literal(HEAVY_RAIN_SNOW)
            ),
        );
        let matches = base.select(&body).map_err(into_inference)?;

        let mut seen = HashSet::new();
        let mut facts = Vec::new();
        for row in matches.rows() {
            let drone = match row.first() {
                Some(Some(Term::NamedNode(node))) => Subject::from(node.clone()),
                Some(Some(Term::BlankNode(node))) => Subject::from(node.clone()),
                other => {
                    return Err(CrashGraphError::Inference(format!(
                        "rule matched a non-resource drone: {:?}",
                        other
                    )));
                }
            };
            if seen.insert(drone.clone()) {
                facts.push(DerivedFact {
                    drone,
                    risk: RiskLevel::High,
                });
            }
        }

        log::debug!("Risk rule derived {} fact(s)", facts.len());
        Ok(DerivedFacts { facts })
    }

    /// A new snapshot holding the base facts plus the derived ones.
    pub fn materialize(&self, base: &Graph, derived: &DerivedFacts) -> Result<Graph> {
        let triples = derived.facts().iter().map(|fact| {
            Triple::new(
                fact.drone.clone(),
                self.has_risk.clone(),
                Literal::new_simple_literal(fact.risk.label()),
            )
        });
        base.union(triples).map_err(into_inference)
    }

    /// Identities of every drone with `hasRisk = "High"` after inference.
    pub fn high_risk_drones(&self, base: &Graph) -> Result<Vec<String>> {
        let derived = self.derive(base)?;
        let inferred = self.materialize(base, &derived)?;

        let query = PreparedQuery::new(
            "derive-risk/select",
            format!(
                "{}SELECT ?d WHERE {{ ?d onto:hasRisk {} }} ORDER BY ?d",
                prologue(&self.namespace),
                bind_literal(RiskLevel::High.label())
            ),
        );
        let results = inferred.select(&query).map_err(into_inference)?;

        Ok(results
            .rows()
            .iter()
            .filter_map(|row| row.first().and_then(|term| term.as_ref()))
            .map(lexical)
            .collect())
    }
}

fn into_inference(err: CrashGraphError) -> CrashGraphError {
    match err {
        CrashGraphError::Inference(_) => err,
        other => CrashGraphError::Inference(other.to_string()),
    }
}
