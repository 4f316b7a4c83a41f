//! Graph Client and in-memory snapshots.
//!
//! Every analytical operation works on its own [`Graph`] snapshot, fetched
//! fresh from the endpoint by [`GraphClient::load`]. Nothing is cached
//! between operations, so the full reload on each call is the scalability
//! limit of this design.

mod client;
mod graph;

pub use client::GraphClient;
pub use graph::{Graph, PreparedQuery, ResultSet};
