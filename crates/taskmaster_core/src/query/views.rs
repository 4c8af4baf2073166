use crate::model::{Task, TaskPriority, TaskStatus};
use serde::Serialize;
use time::OffsetDateTime;
use time::macros::time;

pub const RECENTLY_COMPLETED_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardViews {
    pub overdue: Vec<Task>,
    pub due_today: Vec<Task>,
    pub high_priority: Vec<Task>,
    pub recently_completed: Vec<Task>,
    pub stats: TaskStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Whole percent, rounded half away from zero.
    pub completion_rate: u32,
}

/// Dashboard categorisation of `tasks` as seen at `now`.
///
/// Calendar days are taken in `now`'s UTC offset.
pub fn derive_views(tasks: &[Task], now: OffsetDateTime) -> DashboardViews {
    let open = || tasks.iter().filter(|task| !task.is_completed());

    let overdue = open()
        .filter(|task| task.due_date.is_some_and(|due| is_overdue(due, now)))
        .cloned()
        .collect();
    let due_today = open()
        .filter(|task| task.due_date.is_some_and(|due| is_due_today(due, now)))
        .cloned()
        .collect();
    let high_priority = open()
        .filter(|task| task.priority == TaskPriority::High)
        .cloned()
        .collect();

    DashboardViews {
        overdue,
        due_today,
        high_priority,
        recently_completed: recently_completed(tasks, RECENTLY_COMPLETED_LIMIT),
        stats: task_stats(tasks),
    }
}

/// Whether the end of `due`'s calendar day (23:59:59.999) has already passed.
pub fn is_overdue(due: OffsetDateTime, now: OffsetDateTime) -> bool {
    let end_of_day = due
        .to_offset(now.offset())
        .replace_time(time!(23:59:59.999));
    end_of_day < now
}

pub fn is_due_today(due: OffsetDateTime, now: OffsetDateTime) -> bool {
    due.to_offset(now.offset()).date() == now.date()
}

/// Completed tasks, most recent first by `completed_at` (or `updated_at`).
pub fn recently_completed(tasks: &[Task], limit: usize) -> Vec<Task> {
    let mut completed: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Completed)
        .collect();
    completed.sort_by(|a, b| finished_at(b).cmp(&finished_at(a)));
    completed.into_iter().take(limit).cloned().collect()
}

fn finished_at(task: &Task) -> OffsetDateTime {
    task.completed_at.unwrap_or(task.updated_at)
}

pub fn task_stats(tasks: &[Task]) -> TaskStats {
    let total_tasks = tasks.len();
    let completed_tasks = tasks.iter().filter(|task| task.is_completed()).count();

    TaskStats {
        total_tasks,
        completed_tasks,
        completion_rate: completion_rate(completed_tasks, total_tasks),
    }
}

pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let completed = completed as u64;
    let total = total as u64;
    ((completed * 200 + total) / (total * 2)) as u32
}
