//! Domain model for users, work domains and tasks.
//!
//! # Responsibility
//! - Define canonical data structures shared by storage, assignment and services.
//! - Keep lifecycle invariants next to the types they constrain.
//!
//! # Invariants
//! - Identifiers are store-assigned and increase in creation order.
//! - Tasks reference domains by name and users by id; nothing is owned
//!   structurally across records.
//! - Timestamps are Unix epoch milliseconds.

pub mod domain;
pub mod task;
pub mod user;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns current wall-clock time as Unix epoch milliseconds.
///
/// Clamps to `0` when the system clock reports a time before the epoch.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
