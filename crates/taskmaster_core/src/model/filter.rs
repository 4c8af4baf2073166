use super::task::{TaskPriority, TaskStatus, canonical_token};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Query over a task collection.
///
/// Every dimension is optional. An empty `status`, `priority` or `tags`
/// set and an empty `search_text` all mean "no constraint", never
/// "exclude everything".
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub status: Vec<TaskStatus>,
    #[serde(default)]
    pub priority: Vec<TaskPriority>,
    #[serde(default)]
    pub category_id: Option<String>,
    /// Match-any tag ids.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date_from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date_to: Option<OffsetDateTime>,
}

impl TaskFilter {
    /// Open work only: the task list's starting point.
    pub fn active() -> Self {
        Self {
            status: vec![TaskStatus::Todo, TaskStatus::InProgress],
            ..Self::default()
        }
    }

    pub fn toggle_status(&mut self, status: TaskStatus) {
        toggle(&mut self.status, status);
    }

    pub fn toggle_priority(&mut self, priority: TaskPriority) {
        toggle(&mut self.priority, priority);
    }

    pub fn toggle_tag(&mut self, tag_id: &str) {
        if let Some(index) = self.tags.iter().position(|tag| tag == tag_id) {
            self.tags.remove(index);
        } else {
            self.tags.push(tag_id.to_string());
        }
    }

    /// Back to [`TaskFilter::active`], keeping whatever the user typed in search.
    pub fn reset(&mut self) {
        let search_text = self.search_text.take();
        *self = Self {
            search_text,
            ..Self::active()
        };
    }
}

fn toggle<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if let Some(index) = values.iter().position(|existing| *existing == value) {
        values.remove(index);
    } else {
        values.push(value);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
    CreatedAt,
    Title,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DueDate => "due_date",
            Self::Priority => "priority",
            Self::CreatedAt => "created_at",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical_token(raw).as_str() {
            "due_date" | "duedate" | "due" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "created_at" | "createdat" | "created" => Ok(Self::CreatedAt),
            "title" => Ok(Self::Title),
            _ => Err(AppError::invalid_input(format!(
                "unknown sort key '{}'",
                raw.trim()
            ))),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical_token(raw).as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            _ => Err(AppError::invalid_input(format!(
                "unknown sort direction '{}'",
                raw.trim()
            ))),
        }
    }
}
