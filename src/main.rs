use anyhow::{Context, Result};
use crashgraph::http::HttpServer;
use crashgraph::{Analytics, Config, GraphClient};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", &config.crashgraph.log_level),
    )
    .init();

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("check");

    match command {
        "serve" => run_http_server(config).await?,
        "check" => run_check(config).await?,
        other => anyhow::bail!("Unknown command '{}'. Usage: crashgraph [serve|check]", other),
    }

    Ok(())
}

/// Run the HTTP server
async fn run_http_server(config: Config) -> Result<()> {
    log::info!("Starting crashgraph v{}", env!("CARGO_PKG_VERSION"));

    let analytics = Analytics::from_config(&config)?;
    let server = HttpServer::new(analytics, config.http_server.clone());
    server.run().await?;

    Ok(())
}

/// Load the configuration and one snapshot of the graph
async fn run_check(config: Config) -> Result<()> {
    log::info!("Starting crashgraph v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Graph endpoint: {}", config.store.endpoint);
    log::info!("Ontology namespace: {}", config.store.namespace);

    let client = GraphClient::new(&config.store)?;
    let start = Instant::now();
    let graph = client
        .load()
        .await
        .with_context(|| format!("Failed to load graph from {}", client.endpoint()))?;

    log::info!(
        "Loaded {} triples in {:?}",
        graph.len()?,
        start.elapsed()
    );
    Ok(())
}
