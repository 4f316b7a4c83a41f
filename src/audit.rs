//! Per-operation audit logging.

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;

/// Log one executed operation.
///
/// Returns the generated operation_id (UUID).
pub fn log_operation<T>(
    operation: &str,
    parameter: Option<&str>,
    outcome: &Result<Vec<T>>,
    elapsed: Duration,
) -> String {
    let operation_id = Uuid::new_v4().to_string();
    let timestamp = Utc::now().to_rfc3339();
    let parameter = parameter.unwrap_or("-");

    match outcome {
        Ok(rows) => log::info!(
            "op={} ts={} operation={} parameter={:?} rows={} elapsed_ms={}",
            operation_id,
            timestamp,
            operation,
            parameter,
            rows.len(),
            elapsed.as_millis()
        ),
        Err(e) => log::warn!(
            "op={} ts={} operation={} parameter={:?} error={} elapsed_ms={}: {}",
            operation_id,
            timestamp,
            operation,
            parameter,
            e.kind(),
            elapsed.as_millis(),
            e
        ),
    }

    operation_id
}
