//! Task query engine: filtering, sorting and dashboard views.
//!
//! Everything here is a pure function of its inputs. The store hands in
//! its current collection on every call and nothing is retained.

mod filter;
mod presets;
mod sort;
mod views;

pub use filter::{filter_tasks, matches_filter};
pub use presets::FilterPreset;
pub use sort::{compare_tasks, sort_tasks};
pub use views::{
    DashboardViews, RECENTLY_COMPLETED_LIMIT, TaskStats, completion_rate, derive_views,
    is_due_today, is_overdue, recently_completed, task_stats,
};

use crate::model::{SortDirection, SortKey, Task, TaskFilter};

/// Filter then sort, the way the task list presents a query.
pub fn query_tasks(
    tasks: &[Task],
    filter: &TaskFilter,
    key: SortKey,
    direction: SortDirection,
) -> Vec<Task> {
    sort_tasks(&filter_tasks(tasks, filter), key, direction)
}
