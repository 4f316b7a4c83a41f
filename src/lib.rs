pub mod analytics;
pub mod audit;
pub mod config;
pub mod error;
pub mod http;
pub mod inference;
pub mod normalize;
pub mod query;
pub mod store;

#[cfg(test)]
mod test_support;

pub use analytics::Analytics;
pub use config::Config;
pub use error::{CrashGraphError, Result};
pub use normalize::Record;
pub use store::{Graph, GraphClient};
