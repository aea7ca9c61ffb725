//! Shared wall-clock helper.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch as f64.
///
/// Every producer stamps its output with this clock so staleness checks
/// compare like with like.
pub fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
