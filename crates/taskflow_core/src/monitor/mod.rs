//! Overdue-task monitoring.
//!
//! # Responsibility
//! - Sweep pending tasks past their deadline and move them to the currently
//!   least-loaded member of the same domain.
//! - Run that sweep on a dedicated thread with an explicit start/stop lifecycle.
//!
//! # Invariants
//! - A sweep never changes task status or deadline.
//! - A failure on one task never stops the sweep of the others.
//! - Sweeps never overlap; a sweep that outlives its interval causes missed
//!   ticks to be skipped, not queued.

mod deadline;
mod scheduler;

pub use deadline::{DeadlineMonitor, Reassignment, TickReport};
pub use scheduler::{MonitorHandle, MonitorScheduler};
