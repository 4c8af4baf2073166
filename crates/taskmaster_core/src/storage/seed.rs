use crate::error::AppError;
use crate::model::{Category, Tag, Task, TaskPriority, TaskStatus};
use crate::store::TaskStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use time::{Duration, OffsetDateTime};
use tracing::info;

pub const SCHEMA_VERSION: u32 = 1;
pub const SAMPLE_USER_ID: &str = "user1";

#[derive(Debug, Serialize, Deserialize)]
struct SeedDocument {
    schema_version: u32,
    tasks: Vec<Task>,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    selected_task_id: Option<String>,
}

/// Reads a session's starting data. Nothing is ever written back.
pub fn load_seed(path: &Path) -> Result<TaskStore, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let seed: SeedDocument = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    if !(1..=SCHEMA_VERSION).contains(&seed.schema_version) {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    validate_tasks(&seed.tasks)?;

    if let Some(selected) = seed.selected_task_id.as_deref()
        && !seed.tasks.iter().any(|task| task.id == selected)
    {
        return Err(AppError::invalid_data("selected_task_id not found"));
    }

    info!(
        path = %path.display(),
        tasks = seed.tasks.len(),
        "seed loaded"
    );

    let mut store = TaskStore::from_parts(seed.tasks, seed.categories, seed.tags);
    store.select_task(seed.selected_task_id.as_deref())?;
    Ok(store)
}

fn validate_tasks(tasks: &[Task]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for task in tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(AppError::invalid_data(format!(
                "duplicate task id '{}'",
                task.id
            )));
        }
        if task.title.trim().is_empty() {
            return Err(AppError::invalid_data(format!(
                "task '{}' has an empty title",
                task.id
            )));
        }
        if task.is_completed() != task.completed_at.is_some() {
            return Err(AppError::invalid_data(format!(
                "task '{}': completed_at must be set exactly when status is completed",
                task.id
            )));
        }
        if task.updated_at < task.created_at {
            return Err(AppError::invalid_data(format!(
                "task '{}': updated_at precedes created_at",
                task.id
            )));
        }
    }
    Ok(())
}

/// The demo workspace: eight tasks spread around `now`, five categories, five tags.
pub fn sample_state(now: OffsetDateTime) -> TaskStore {
    let days = Duration::days;
    let task = |id: &str, title: &str, description: &str| Task {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        status: TaskStatus::Todo,
        priority: TaskPriority::Medium,
        due_date: None,
        created_at: now,
        updated_at: now,
        completed_at: None,
        category_id: None,
        tags: Vec::new(),
        user_id: SAMPLE_USER_ID.to_string(),
    };
    let ids = |values: &[&str]| -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    };

    let tasks = vec![
        Task {
            status: TaskStatus::InProgress,
            priority: TaskPriority::High,
            due_date: Some(now + days(1)),
            created_at: now - days(2),
            updated_at: now - days(1),
            category_id: Some("work".into()),
            tags: ids(&["urgent", "meeting"]),
            ..task(
                "task1",
                "Complete project proposal",
                "Write a detailed project proposal for the new client project including timeline, budget, and resource allocation.",
            )
        },
        Task {
            due_date: Some(now + days(2)),
            created_at: now - days(1),
            updated_at: now - days(1),
            category_id: Some("shopping".into()),
            ..task(
                "task2",
                "Buy groceries",
                "Milk, eggs, bread, fruits, vegetables",
            )
        },
        Task {
            priority: TaskPriority::Low,
            due_date: Some(now + days(7)),
            created_at: now - days(3),
            updated_at: now - days(3),
            category_id: Some("health".into()),
            ..task(
                "task3",
                "Schedule dentist appointment",
                "Call Dr. Smith for a check-up appointment",
            )
        },
        Task {
            priority: TaskPriority::High,
            due_date: Some(now - days(1)),
            created_at: now - days(4),
            updated_at: now - days(2),
            category_id: Some("work".into()),
            tags: ids(&["urgent", "meeting"]),
            ..task(
                "task4",
                "Prepare for presentation",
                "Create slides and practice for the quarterly review presentation",
            )
        },
        Task {
            status: TaskStatus::Completed,
            due_date: Some(now - days(2)),
            created_at: now - days(5),
            updated_at: now - days(1),
            completed_at: Some(now - days(1)),
            category_id: Some("personal".into()),
            tags: ids(&["important"]),
            ..task(
                "task5",
                "Pay utility bills",
                "Pay electricity, water, and internet bills",
            )
        },
        Task {
            status: TaskStatus::InProgress,
            created_at: now - days(6),
            updated_at: now - days(3),
            category_id: Some("education".into()),
            tags: ids(&["idea"]),
            ..task(
                "task6",
                "Research new technologies",
                "Look into React 18 features and new TypeScript updates",
            )
        },
        Task {
            status: TaskStatus::Completed,
            priority: TaskPriority::High,
            due_date: Some(now - days(3)),
            created_at: now - days(7),
            updated_at: now - days(2),
            completed_at: Some(now - days(2)),
            category_id: Some("work".into()),
            tags: ids(&["review"]),
            ..task(
                "task7",
                "Review code pull request",
                "Review and provide feedback on the new feature PR",
            )
        },
        Task {
            priority: TaskPriority::Low,
            due_date: Some(now + days(3)),
            created_at: now - days(1),
            updated_at: now - days(1),
            category_id: Some("personal".into()),
            tags: ids(&["idea"]),
            ..task(
                "task8",
                "Plan weekend trip",
                "Research destinations, accommodations, and activities for the weekend getaway",
            )
        },
    ];

    let category = |id: &str, name: &str, color: &str, icon: &str| Category {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        icon: Some(icon.to_string()),
    };
    let categories = vec![
        category("work", "Work", "#4361ee", "briefcase"),
        category("personal", "Personal", "#3f37c9", "user"),
        category("shopping", "Shopping", "#f72585", "shopping-cart"),
        category("health", "Health", "#4caf50", "heart"),
        category("education", "Education", "#ff9800", "book"),
    ];

    let tag = |id: &str, name: &str, color: &str| Tag {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
    };
    let tags = vec![
        tag("urgent", "Urgent", "#f44336"),
        tag("important", "Important", "#ff9800"),
        tag("meeting", "Meeting", "#4361ee"),
        tag("idea", "Idea", "#4caf50"),
        tag("review", "Review", "#3f37c9"),
    ];

    TaskStore::from_parts(tasks, categories, tags)
}
