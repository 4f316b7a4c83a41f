//! Loaded graph snapshot: Turtle parsing, SELECT evaluation, union with derived facts.

use std::io::Read;

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{GraphName, Quad, Term, Triple};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::error::{CrashGraphError, Result};

/// A read-only snapshot of the crash graph held in memory.
pub struct Graph {
    store: Store,
}

/// A SELECT query rendered from a named template, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    template: String,
    text: String,
}

impl PreparedQuery {
    pub fn new(template: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            text: text.into(),
        }
    }

    /// Name of the template this query was rendered from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Bindings of one SELECT query: declared variables plus one row per solution.
///
/// Each row holds one slot per declared variable, `None` where unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    variables: Vec<String>,
    rows: Vec<Vec<Option<Term>>>,
}

impl ResultSet {
    pub fn new(variables: Vec<String>, rows: Vec<Vec<Option<Term>>>) -> Self {
        Self { variables, rows }
    }

    /// Output variables in projection order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn rows(&self) -> &[Vec<Option<Term>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Graph {
    /// Create an empty snapshot.
    pub fn empty() -> Result<Self> {
        Ok(Self {
            store: Store::new()?,
        })
    }

    /// Parse a Turtle document into a new snapshot.
    pub fn from_turtle(data: &str) -> Result<Self> {
        Self::from_reader(data.as_bytes())
    }

    /// Parse Turtle from any reader into a new snapshot.
    ///
    /// The whole document is parsed before anything is stored, so a syntax
    /// error never leaves a half-loaded graph behind.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let quads = RdfParser::from_format(RdfFormat::Turtle)
            .for_reader(reader)
            .collect::<std::result::Result<Vec<Quad>, _>>()
            .map_err(|e| CrashGraphError::Parse(e.to_string()))?;

        let graph = Self::empty()?;
        graph.store.extend(quads)?;
        Ok(graph)
    }

    /// Build a snapshot from triples in the default graph.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Result<Self> {
        let graph = Self::empty()?;
        graph
            .store
            .extend(triples.into_iter().map(|t| t.in_graph(GraphName::DefaultGraph)))?;
        Ok(graph)
    }

    /// Number of facts in the snapshot.
    pub fn len(&self) -> Result<usize> {
        Ok(self.store.len()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.store.is_empty()?)
    }

    /// Evaluate a SELECT query and collect its bindings.
    ///
    /// Any syntax or evaluation failure, and any non-SELECT result form, is
    /// reported as a query error naming the template.
    pub fn select(&self, query: &PreparedQuery) -> Result<ResultSet> {
        let results = self
            .store
            .query(query.text())
            .map_err(|e| CrashGraphError::query(query.template(), e))?;

        let QueryResults::Solutions(solutions) = results else {
            return Err(CrashGraphError::query(
                query.template(),
                "expected SELECT solutions",
            ));
        };

        let variables: Vec<String> = solutions
            .variables()
            .iter()
            .map(|v| v.as_str().to_string())
            .collect();

        let mut rows = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| CrashGraphError::query(query.template(), e))?;
            rows.push(
                variables
                    .iter()
                    .map(|v| solution.get(v.as_str()).cloned())
                    .collect(),
            );
        }

        log::debug!(
            "Template '{}' returned {} row(s)",
            query.template(),
            rows.len()
        );
        Ok(ResultSet::new(variables, rows))
    }

    /// Create a new snapshot holding these facts plus `derived`.
    ///
    /// `self` is left untouched.
    pub fn union(&self, derived: impl IntoIterator<Item = Triple>) -> Result<Graph> {
        let base = self
            .store
            .iter()
            .collect::<std::result::Result<Vec<Quad>, _>>()?;

        let union = Self::empty()?;
        union.store.extend(base)?;
        union
            .store
            .extend(derived.into_iter().map(|t| t.in_graph(GraphName::DefaultGraph)))?;
        Ok(union)
    }
}
