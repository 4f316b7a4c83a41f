//! Result Normalizer: turns SELECT bindings into ordered, JSON-ready records.
//!
//! Aggregate views keep the legacy positional rendering
//! (`subject` / `property` / `object`); projection queries are keyed by variable name.
//! Either way every value becomes its lexical string form or `null`.

use oxigraph::model::Term;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::store::ResultSet;

/// Keys used by the positional layout, in column order.
pub const POSITIONAL_COLUMNS: [&str; 3] = ["subject", "property", "object"];

/// How a template's rows are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLayout {
    Positional,
    Named,
}

/// Concrete output contract for one result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultShape {
    /// First three columns mapped to `subject`, `property`, `object`.
    Positional,
    /// One key per declared output variable.
    Named(Vec<String>),
}

impl ResultShape {
    pub fn from_layout(layout: RowLayout, results: &ResultSet) -> Self {
        match layout {
            RowLayout::Positional => Self::Positional,
            RowLayout::Named => Self::Named(results.variables().to_vec()),
        }
    }
}

/// One output row: ordered column name → nullable string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    columns: Vec<(String, Option<String>)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<String>) {
        self.columns.push((name.into(), value));
    }

    /// `None` if the column does not exist, `Some(None)` if it is null.
    pub fn get(&self, name: &str) -> Option<&Option<String>> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Value of a bound column, `None` for absent or null columns.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_deref())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Lexical form of a term: IRIs and literals alike, no type tagging.
pub fn lexical(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

/// Normalize every row of `results` according to `shape`, keeping row order.
pub fn normalize(shape: &ResultShape, results: &ResultSet) -> Vec<Record> {
    match shape {
        ResultShape::Positional => results.rows().iter().map(|row| positional(row)).collect(),
        ResultShape::Named(variables) => {
            // Resolve each declared variable to its column once.
            let indexes: Vec<Option<usize>> = variables
                .iter()
                .map(|var| results.variables().iter().position(|v| v == var))
                .collect();
            results
                .rows()
                .iter()
                .map(|row| {
                    variables
                        .iter()
                        .zip(&indexes)
                        .map(|(var, index)| {
                            let value = index
                                .and_then(|i| row.get(i))
                                .and_then(|term| term.as_ref())
                                .map(lexical);
                            (var.as_str(), value)
                        })
                        .collect()
                })
                .collect()
        }
    }
}

fn positional(row: &[Option<Term>]) -> Record {
    POSITIONAL_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let value = row.get(i).and_then(|term| term.as_ref()).map(lexical);
            (*key, value)
        })
        .collect()
}
