use anyhow::Result;
use clap::Parser;
use crashgraph::query::operations;
use crashgraph::{Analytics, Config};
use std::time::Instant;

/// Run one analytical operation against the graph endpoint and print the records as JSON.
#[derive(Debug, Parser)]
#[command(name = "crashgraph-query", version)]
struct Args {
    /// Operation name, e.g. `count-by-phase` (see --list)
    #[arg(required_unless_present = "list")]
    operation: Option<String>,

    /// Parameter value for operations that take one
    value: Option<String>,

    /// Print the operation catalog and exit
    #[arg(long)]
    list: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if args.list {
        return print_json(&operations(), args.pretty);
    }

    let operation = args
        .operation
        .ok_or_else(|| anyhow::anyhow!("Usage: crashgraph-query <operation> [value] [--pretty]"))?;

    let config = Config::load()?;
    let analytics = Analytics::from_config(&config)?;

    let start = Instant::now();
    let records = analytics.run(&operation, args.value.as_deref()).await?;
    log::info!(
        "{} returned {} record(s) in {:?}",
        operation,
        records.len(),
        start.elapsed()
    );

    print_json(&records, args.pretty)
}
