//! Task list state for the TaskPro dashboard.

mod list;
mod stats;

pub use list::{Draft, TaskList};
pub use stats::TaskStats;
