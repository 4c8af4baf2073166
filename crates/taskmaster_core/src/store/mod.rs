//! In-memory state container and the only writer of task records.
//!
//! Every mutation goes through a `&mut self` method; the `_at` variants
//! take the clock value so callers (and tests) control timestamps.

mod catalog;

pub use catalog::{CategoryDraft, CategoryUpdate, TagDraft, TagUpdate};

use crate::error::AppError;
use crate::model::{
    Category, SortDirection, SortKey, Tag, Task, TaskFilter, TaskPriority, TaskStatus,
};
use crate::query::{self, DashboardViews};
use time::OffsetDateTime;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<OffsetDateTime>,
    pub category_id: Option<String>,
    pub tags: Vec<String>,
    pub user_id: String,
}

impl TaskDraft {
    pub fn new<U: Into<String>, T: Into<String>>(user_id: U, title: T) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            category_id: None,
            tags: Vec::new(),
            user_id: user_id.into(),
        }
    }
}

/// Partial edit. `None` leaves a field alone; `Some(None)` clears an optional field.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<OffsetDateTime>>,
    pub category_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    selected_task_id: Option<String>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(tasks: Vec<Task>, categories: Vec<Category>, tags: Vec<Tag>) -> Self {
        Self {
            tasks,
            categories,
            tags,
            selected_task_id: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn selected_task_id(&self) -> Option<&str> {
        self.selected_task_id.as_deref()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let id = self.selected_task_id.as_deref()?;
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn task(&self, id: &str) -> Result<&Task, AppError> {
        let index = self.task_index(id)?;
        Ok(&self.tasks[index])
    }

    pub fn query(&self, filter: &TaskFilter, key: SortKey, direction: SortDirection) -> Vec<Task> {
        query::query_tasks(&self.tasks, filter, key, direction)
    }

    pub fn dashboard(&self, now: OffsetDateTime) -> DashboardViews {
        query::derive_views(&self.tasks, now)
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Task, AppError> {
        self.add_task_at(draft, OffsetDateTime::now_utc())
    }

    pub fn add_task_at(&mut self, draft: TaskDraft, now: OffsetDateTime) -> Result<Task, AppError> {
        let title = required_title(&draft.title)?;
        let tags = tag_ids(&draft.tags)?;
        let id = self.next_task_id(now);

        let task = Task {
            id,
            title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
            completed_at: (draft.status == TaskStatus::Completed).then_some(now),
            category_id: draft.category_id,
            tags,
            user_id: draft.user_id,
        };

        debug!(task_id = %task.id, "task added");
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<Task, AppError> {
        self.update_task_at(id, update, OffsetDateTime::now_utc())
    }

    pub fn update_task_at(
        &mut self,
        id: &str,
        update: TaskUpdate,
        now: OffsetDateTime,
    ) -> Result<Task, AppError> {
        if update == TaskUpdate::default() {
            return Err(AppError::invalid_input("nothing to edit"));
        }
        let title = update.title.as_deref().map(required_title).transpose()?;
        let tags = update.tags.as_deref().map(tag_ids).transpose()?;
        let index = self.task_index(id)?;
        let task = &mut self.tasks[index];

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(category_id) = update.category_id {
            task.category_id = category_id;
        }
        if let Some(tags) = tags {
            task.tags = tags;
        }
        if let Some(status) = update.status {
            apply_status(task, status, now);
        }
        touch(task, now);

        debug!(task_id = %task.id, "task updated");
        Ok(task.clone())
    }

    /// Removes the task and drops the selection if it pointed at it.
    pub fn delete_task(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self.task_index(id)?;
        let removed = self.tasks.remove(index);

        if self.selected_task_id.as_deref() == Some(removed.id.as_str()) {
            self.selected_task_id = None;
        }

        debug!(task_id = %removed.id, "task deleted");
        Ok(removed)
    }

    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<Task, AppError> {
        self.set_status_at(id, status, OffsetDateTime::now_utc())
    }

    pub fn set_status_at(
        &mut self,
        id: &str,
        status: TaskStatus,
        now: OffsetDateTime,
    ) -> Result<Task, AppError> {
        let index = self.task_index(id)?;
        let task = &mut self.tasks[index];
        apply_status(task, status, now);
        touch(task, now);

        debug!(task_id = %task.id, status = %status, "task status changed");
        Ok(task.clone())
    }

    pub fn set_priority(&mut self, id: &str, priority: TaskPriority) -> Result<Task, AppError> {
        self.set_priority_at(id, priority, OffsetDateTime::now_utc())
    }

    pub fn set_priority_at(
        &mut self,
        id: &str,
        priority: TaskPriority,
        now: OffsetDateTime,
    ) -> Result<Task, AppError> {
        let index = self.task_index(id)?;
        let task = &mut self.tasks[index];
        task.priority = priority;
        touch(task, now);

        Ok(task.clone())
    }

    pub fn add_tag_to_task(&mut self, task_id: &str, tag_id: &str) -> Result<Task, AppError> {
        self.add_tag_to_task_at(task_id, tag_id, OffsetDateTime::now_utc())
    }

    /// Already-tagged tasks are returned unchanged, `updated_at` included.
    pub fn add_tag_to_task_at(
        &mut self,
        task_id: &str,
        tag_id: &str,
        now: OffsetDateTime,
    ) -> Result<Task, AppError> {
        let tag_id = required_id(tag_id, "tag id")?;
        let index = self.task_index(task_id)?;
        let task = &mut self.tasks[index];

        if !task.has_tag(tag_id) {
            task.tags.push(tag_id.to_string());
            touch(task, now);
        }

        Ok(task.clone())
    }

    pub fn remove_tag_from_task(&mut self, task_id: &str, tag_id: &str) -> Result<Task, AppError> {
        self.remove_tag_from_task_at(task_id, tag_id, OffsetDateTime::now_utc())
    }

    pub fn remove_tag_from_task_at(
        &mut self,
        task_id: &str,
        tag_id: &str,
        now: OffsetDateTime,
    ) -> Result<Task, AppError> {
        let tag_id = required_id(tag_id, "tag id")?;
        let index = self.task_index(task_id)?;
        let task = &mut self.tasks[index];

        if task.has_tag(tag_id) {
            task.tags.retain(|tag| tag != tag_id);
            touch(task, now);
        }

        Ok(task.clone())
    }

    /// `None` clears the selection.
    pub fn select_task(&mut self, id: Option<&str>) -> Result<Option<Task>, AppError> {
        match id {
            None => {
                self.selected_task_id = None;
                Ok(None)
            }
            Some(id) => {
                let task = self.task(id)?.clone();
                self.selected_task_id = Some(task.id.clone());
                Ok(Some(task))
            }
        }
    }

    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        if let Some(selected) = self.selected_task_id.as_deref()
            && !self.tasks.iter().any(|task| task.id == selected)
        {
            self.selected_task_id = None;
        }
    }

    pub fn resolve_category(&self, task: &Task) -> Option<&Category> {
        let category_id = task.category_id.as_deref()?;
        self.categories
            .iter()
            .find(|category| category.id == category_id)
    }

    /// Known tags of `task` in the task's order; dangling ids are skipped.
    pub fn resolve_tags(&self, task: &Task) -> Vec<&Tag> {
        task.tags
            .iter()
            .filter_map(|tag_id| self.tags.iter().find(|tag| &tag.id == tag_id))
            .collect()
    }

    fn task_index(&self, id: &str) -> Result<usize, AppError> {
        let trimmed_id = required_id(id, "id")?;
        self.tasks
            .iter()
            .position(|task| task.id == trimmed_id)
            .ok_or_else(|| AppError::not_found(format!("task '{trimmed_id}' not found")))
    }

    fn next_task_id(&self, now: OffsetDateTime) -> String {
        let base = format!("task-{}", now.unix_timestamp_nanos());
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.tasks.iter().any(|task| task.id == candidate) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        candidate
    }
}

fn required_title(title: &str) -> Result<String, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }
    Ok(trimmed.to_string())
}

// Trimmed, non-blank and deduplicated in first-seen order.
fn tag_ids(tags: &[String]) -> Result<Vec<String>, AppError> {
    let mut ids: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = required_id(tag, "tag id")?;
        if !ids.iter().any(|existing| existing == tag) {
            ids.push(tag.to_string());
        }
    }
    Ok(ids)
}

pub(crate) fn required_id<'a>(id: &'a str, what: &str) -> Result<&'a str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input(format!("{what} is required")));
    }
    Ok(trimmed)
}

// completed_at is kept in step with the status: entering COMPLETED stamps
// it, any other status clears it.
fn apply_status(task: &mut Task, status: TaskStatus, now: OffsetDateTime) {
    if status == TaskStatus::Completed {
        if task.status != TaskStatus::Completed || task.completed_at.is_none() {
            task.completed_at = Some(now);
        }
    } else {
        task.completed_at = None;
    }
    task.status = status;
}

fn touch(task: &mut Task, now: OffsetDateTime) {
    if now > task.updated_at {
        task.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskDraft, TaskStore, TaskUpdate};
    use crate::model::{Category, Tag, TaskPriority, TaskStatus};
    use crate::test_support::at;

    fn store_with(titles: &[&str]) -> TaskStore {
        let mut store = TaskStore::new();
        for (index, title) in titles.iter().enumerate() {
            let now = at("2024-06-01T09:00:00Z") + time::Duration::minutes(index as i64);
            store
                .add_task_at(TaskDraft::new("user1", *title), now)
                .unwrap();
        }
        store
    }

    #[test]
    fn add_task_applies_defaults() {
        let now = at("2024-06-01T09:00:00Z");
        let mut store = TaskStore::new();

        let task = store
            .add_task_at(TaskDraft::new("user1", "  Write report "), now)
            .unwrap();

        assert_eq!(task.title, "Write report");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.created_at, now);
        assert_eq!(task.updated_at, now);
        assert_eq!(task.completed_at, None);
        assert!(task.id.starts_with("task-"));
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn add_task_rejects_blank_title() {
        let mut store = TaskStore::new();

        let err = store.add_task(TaskDraft::new("user1", "   ")).unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn add_task_generates_unique_ids_for_same_instant() {
        let now = at("2024-06-01T09:00:00Z");
        let mut store = TaskStore::new();

        let first = store.add_task_at(TaskDraft::new("u", "one"), now).unwrap();
        let second = store.add_task_at(TaskDraft::new("u", "two"), now).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn add_completed_draft_stamps_completed_at() {
        let now = at("2024-06-01T09:00:00Z");
        let mut store = TaskStore::new();
        let mut draft = TaskDraft::new("u", "done already");
        draft.status = TaskStatus::Completed;
        draft.tags = vec!["a".into(), "b".into(), "a".into()];

        let task = store.add_task_at(draft, now).unwrap();

        assert_eq!(task.completed_at, Some(now));
        assert_eq!(task.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn status_transitions_keep_completed_at_in_step() {
        let mut store = store_with(&["task"]);
        let id = store.tasks()[0].id.clone();

        let done_at = at("2024-06-02T10:00:00Z");
        let done = store
            .set_status_at(&id, TaskStatus::Completed, done_at)
            .unwrap();
        assert_eq!(done.completed_at, Some(done_at));
        assert_eq!(done.updated_at, done_at);

        let reopened_at = at("2024-06-03T10:00:00Z");
        let reopened = store
            .set_status_at(&id, TaskStatus::InProgress, reopened_at)
            .unwrap();
        assert_eq!(reopened.completed_at, None);
        assert_eq!(reopened.updated_at, reopened_at);
    }

    #[test]
    fn completing_twice_keeps_first_completion_time() {
        let mut store = store_with(&["task"]);
        let id = store.tasks()[0].id.clone();

        let first = at("2024-06-02T10:00:00Z");
        store.set_status_at(&id, TaskStatus::Completed, first).unwrap();
        let again = store
            .set_status_at(&id, TaskStatus::Completed, at("2024-06-04T10:00:00Z"))
            .unwrap();

        assert_eq!(again.completed_at, Some(first));
    }

    #[test]
    fn updated_at_never_moves_backwards() {
        let mut store = store_with(&["task"]);
        let id = store.tasks()[0].id.clone();
        let later = at("2024-06-05T00:00:00Z");
        store.set_priority_at(&id, TaskPriority::High, later).unwrap();

        let task = store
            .set_priority_at(&id, TaskPriority::Low, at("2024-06-02T00:00:00Z"))
            .unwrap();

        assert_eq!(task.priority, TaskPriority::Low);
        assert_eq!(task.updated_at, later);
    }

    #[test]
    fn update_task_applies_partial_changes() {
        let mut store = store_with(&["draft"]);
        let id = store.tasks()[0].id.clone();
        let now = at("2024-06-02T00:00:00Z");

        let update = TaskUpdate {
            title: Some("Final".into()),
            description: Some(Some("notes".into())),
            due_date: Some(Some(at("2024-06-09T00:00:00Z"))),
            category_id: Some(Some("work".into())),
            status: Some(TaskStatus::Completed),
            ..TaskUpdate::default()
        };
        let task = store.update_task_at(&id, update, now).unwrap();

        assert_eq!(task.title, "Final");
        assert_eq!(task.description.as_deref(), Some("notes"));
        assert_eq!(task.category_id.as_deref(), Some("work"));
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_at, Some(now));
        assert_eq!(task.priority, TaskPriority::Medium);

        let cleared = store
            .update_task_at(
                &id,
                TaskUpdate {
                    description: Some(None),
                    due_date: Some(None),
                    ..TaskUpdate::default()
                },
                now,
            )
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.due_date, None);
        assert_eq!(cleared.title, "Final");
    }

    #[test]
    fn update_task_rejects_blank_title_without_changes() {
        let mut store = store_with(&["keep"]);
        let id = store.tasks()[0].id.clone();

        let err = store
            .update_task(
                &id,
                TaskUpdate {
                    title: Some(" ".into()),
                    priority: Some(TaskPriority::High),
                    ..TaskUpdate::default()
                },
            )
            .unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert_eq!(store.tasks()[0].priority, TaskPriority::Medium);
    }

    #[test]
    fn blank_tag_ids_are_rejected_on_add_and_update() {
        let mut store = store_with(&["task"]);
        let id = store.tasks()[0].id.clone();

        let mut draft = TaskDraft::new("u", "tagged");
        draft.tags = vec!["urgent".into(), "  ".into()];
        assert_eq!(store.add_task(draft).unwrap_err().code(), "invalid_input");
        assert_eq!(store.tasks().len(), 1);

        let err = store
            .update_task(
                &id,
                TaskUpdate {
                    tags: Some(vec![String::new()]),
                    ..TaskUpdate::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.code(), "invalid_input");
        assert!(store.tasks()[0].tags.is_empty());
    }

    #[test]
    fn update_tags_are_trimmed_and_deduplicated() {
        let mut store = store_with(&["task"]);
        let id = store.tasks()[0].id.clone();

        let task = store
            .update_task(
                &id,
                TaskUpdate {
                    tags: Some(vec![" review ".into(), "idea".into(), "review".into()]),
                    ..TaskUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(task.tags, vec!["review".to_string(), "idea".to_string()]);
    }

    #[test]
    fn empty_update_is_rejected_without_touching_the_task() {
        let mut store = store_with(&["task"]);
        let id = store.tasks()[0].id.clone();
        let before = store.tasks()[0].clone();

        let err = store
            .update_task_at(&id, TaskUpdate::default(), at("2024-07-01T00:00:00Z"))
            .unwrap_err();

        assert_eq!(err.code(), "invalid_input");
        assert_eq!(err.message(), "nothing to edit");
        assert_eq!(store.tasks()[0], before);
    }

    #[test]
    fn unknown_and_blank_ids_are_rejected() {
        let mut store = store_with(&["task"]);

        assert_eq!(
            store.set_status("missing", TaskStatus::Todo).unwrap_err().code(),
            "not_found"
        );
        assert_eq!(store.delete_task("  ").unwrap_err().code(), "invalid_input");
        assert_eq!(store.select_task(Some("missing")).unwrap_err().code(), "not_found");
    }

    #[test]
    fn delete_clears_matching_selection_only() {
        let mut store = store_with(&["one", "two"]);
        let first = store.tasks()[0].id.clone();
        let second = store.tasks()[1].id.clone();

        store.select_task(Some(&first)).unwrap();
        store.delete_task(&second).unwrap();
        assert_eq!(store.selected_task_id(), Some(first.as_str()));

        let removed = store.delete_task(&first).unwrap();
        assert_eq!(removed.title, "one");
        assert_eq!(store.selected_task_id(), None);
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn add_tag_is_idempotent() {
        let mut store = store_with(&["task"]);
        let id = store.tasks()[0].id.clone();
        let tagged_at = at("2024-06-02T00:00:00Z");

        store.add_tag_to_task_at(&id, "urgent", tagged_at).unwrap();
        let again = store
            .add_tag_to_task_at(&id, "urgent", at("2024-06-03T00:00:00Z"))
            .unwrap();

        assert_eq!(again.tags, vec!["urgent".to_string()]);
        assert_eq!(again.updated_at, tagged_at);
    }

    #[test]
    fn remove_tag_drops_only_that_tag() {
        let mut store = store_with(&["task"]);
        let id = store.tasks()[0].id.clone();
        store.add_tag_to_task(&id, "urgent").unwrap();
        store.add_tag_to_task(&id, "review").unwrap();

        let task = store.remove_tag_from_task(&id, "urgent").unwrap();

        assert_eq!(task.tags, vec!["review".to_string()]);
    }

    #[test]
    fn dangling_references_resolve_to_nothing() {
        let mut store = TaskStore::from_parts(
            Vec::new(),
            vec![Category {
                id: "work".into(),
                name: "Work".into(),
                color: "#4361ee".into(),
                icon: None,
            }],
            vec![Tag {
                id: "urgent".into(),
                name: "Urgent".into(),
                color: "#f44336".into(),
            }],
        );
        let mut draft = TaskDraft::new("u", "task");
        draft.category_id = Some("deleted".into());
        draft.tags = vec!["gone".into(), "urgent".into()];
        let task = store.add_task(draft).unwrap();

        assert!(store.resolve_category(&task).is_none());
        let tags: Vec<&str> = store
            .resolve_tags(&task)
            .into_iter()
            .map(|tag| tag.id.as_str())
            .collect();
        assert_eq!(tags, vec!["urgent"]);
    }

    #[test]
    fn replace_tasks_drops_dangling_selection() {
        let mut store = store_with(&["one"]);
        let id = store.tasks()[0].id.clone();
        store.select_task(Some(&id)).unwrap();

        store.replace_tasks(Vec::new());

        assert_eq!(store.selected_task_id(), None);
    }
}
