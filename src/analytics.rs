//! The flat operation namespace: load a snapshot, run one operation, normalize.

use std::sync::Arc;
use std::time::Instant;

use crate::audit;
use crate::config::Config;
use crate::error::{CrashGraphError, Result};
use crate::inference::InferenceEngine;
use crate::normalize::{normalize, Record, ResultShape};
use crate::query::Operation;
use crate::store::{Graph, GraphClient};

/// Column holding the drone identity in `derive-risk` records.
pub const DRONE_COLUMN: &str = "drone";

/// Runs catalog operations against fresh snapshots of the graph endpoint.
pub struct Analytics {
    client: GraphClient,
    executor: Arc<Executor>,
}

/// Snapshot-bound evaluation, shared with blocking tasks.
struct Executor {
    namespace: String,
    engine: InferenceEngine,
}

impl Executor {
    /// Reject a bad parameter without touching any graph.
    fn check(&self, operation: Operation, value: Option<&str>) -> Result<()> {
        match operation {
            Operation::Template(template) => template.prepare(&self.namespace, value).map(|_| ()),
            Operation::DeriveRisk => reject_value(operation, value),
        }
    }

    fn execute(&self, graph: &Graph, operation: Operation, value: Option<&str>) -> Result<Vec<Record>> {
        match operation {
            Operation::Template(template) => {
                let query = template.prepare(&self.namespace, value)?;
                let results = graph.select(&query)?;
                let shape = ResultShape::from_layout(template.layout, &results);
                Ok(normalize(&shape, &results))
            }
            Operation::DeriveRisk => {
                reject_value(operation, value)?;
                Ok(self
                    .engine
                    .high_risk_drones(graph)?
                    .into_iter()
                    .map(|drone| [(DRONE_COLUMN, Some(drone))].into_iter().collect())
                    .collect())
            }
        }
    }
}

fn reject_value(operation: Operation, value: Option<&str>) -> Result<()> {
    match value {
        None => Ok(()),
        Some(_) => Err(CrashGraphError::InvalidInput(format!(
            "operation '{}' takes no parameter",
            operation.name()
        ))),
    }
}

impl Analytics {
    /// Bind operations to the graph served by `client`, in its namespace.
    pub fn new(client: GraphClient) -> Result<Self> {
        let namespace = client.namespace().to_string();
        let engine = InferenceEngine::new(&namespace)?;
        Ok(Self {
            client,
            executor: Arc::new(Executor { namespace, engine }),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(GraphClient::new(&config.store)?)
    }

    pub fn client(&self) -> &GraphClient {
        &self.client
    }

    /// Run operation `name` against a freshly loaded snapshot.
    ///
    /// Name and parameter are validated before the graph is fetched. Every
    /// call is audited, failed ones included.
    pub async fn run(&self, name: &str, value: Option<&str>) -> Result<Vec<Record>> {
        let start = Instant::now();
        let outcome = self.load_and_execute(name, value).await;
        audit::log_operation(name, value, &outcome, start.elapsed());
        outcome
    }

    async fn load_and_execute(&self, name: &str, value: Option<&str>) -> Result<Vec<Record>> {
        let operation = Operation::lookup(name)?;
        self.executor.check(operation, value)?;

        let graph = self.client.load().await?;
        let executor = Arc::clone(&self.executor);
        let value = value.map(str::to_string);

        tokio::task::spawn_blocking(move || executor.execute(&graph, operation, value.as_deref()))
            .await
            .map_err(|e| CrashGraphError::Io(std::io::Error::other(e)))?
    }

    /// Run operation `name` against an already loaded snapshot.
    pub fn run_on(&self, graph: &Graph, name: &str, value: Option<&str>) -> Result<Vec<Record>> {
        let operation = Operation::lookup(name)?;
        self.executor.execute(graph, operation, value)
    }
}
