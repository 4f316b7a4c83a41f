use crate::config::StoreConfig;
use crate::error::{CrashGraphError, Result};
use crate::store::Graph;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Instant;

/// HTTP client for the graph endpoint
///
/// Fetches the full Turtle dump on every call; there is no
/// cache, so each snapshot reflects the store at the time of the request.
/// Failures are not retried.
pub struct GraphClient {
    client: Client,
    endpoint: String,
    namespace: String,
}

impl GraphClient {
    /// Create a client with the connect and read timeouts from `config`.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()
            .map_err(|e| CrashGraphError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            namespace: config.namespace.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ontology namespace the served graph is written in.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Download the raw Turtle payload.
    pub async fn fetch_turtle(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "text/turtle")
            .send()
            .await
            .map_err(|e| {
                CrashGraphError::SourceUnavailable(format!("{}: {}", self.endpoint, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrashGraphError::SourceUnavailable(format!(
                "{} answered with status {}",
                self.endpoint, status
            )));
        }

        response.text().await.map_err(|e| {
            CrashGraphError::SourceUnavailable(format!(
                "Failed to read body from {}: {}",
                self.endpoint, e
            ))
        })
    }

    /// Fetch and parse a fresh snapshot of the graph.
    pub async fn load(&self) -> Result<Graph> {
        let start = Instant::now();
        let body = self.fetch_turtle().await?;
        let bytes = body.len();

        let graph = tokio::task::spawn_blocking(move || Graph::from_turtle(&body))
            .await
            .map_err(|e| CrashGraphError::Io(std::io::Error::other(e)))??;

        log::debug!(
            "Loaded {} bytes from {} in {:?}",
            bytes,
            self.endpoint,
            start.elapsed()
        );
        Ok(graph)
    }
}
