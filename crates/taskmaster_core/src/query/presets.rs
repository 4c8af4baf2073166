use crate::error::AppError;
use crate::model::{TaskFilter, TaskPriority, TaskStatus, canonical_token};
use std::fmt;
use std::str::FromStr;
use time::{Duration, OffsetDateTime, Time};

/// Named starting filters for the task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPreset {
    Active,
    Overdue,
    Today,
    HighPriority,
    Completed,
}

impl FilterPreset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::HighPriority => "high-priority",
            Self::Completed => "completed",
        }
    }

    pub fn filter_at(self, now: OffsetDateTime) -> TaskFilter {
        match self {
            Self::Active => TaskFilter::active(),
            // Undated open tasks pass the upper bound too.
            Self::Overdue => TaskFilter {
                due_date_to: Some(now),
                ..TaskFilter::active()
            },
            Self::Today => {
                let start_of_day = now.replace_time(Time::MIDNIGHT);
                TaskFilter {
                    due_date_from: Some(start_of_day),
                    due_date_to: Some(start_of_day + Duration::days(1)),
                    ..TaskFilter::active()
                }
            }
            Self::HighPriority => TaskFilter {
                priority: vec![TaskPriority::High],
                ..TaskFilter::active()
            },
            Self::Completed => TaskFilter {
                status: vec![TaskStatus::Completed],
                ..TaskFilter::default()
            },
        }
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterPreset {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match canonical_token(raw).as_str() {
            "active" | "all" => Ok(Self::Active),
            "overdue" => Ok(Self::Overdue),
            "today" => Ok(Self::Today),
            "high_priority" | "high" => Ok(Self::HighPriority),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(AppError::invalid_input(format!(
                "unknown filter preset '{}'",
                raw.trim()
            ))),
        }
    }
}
