use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskmaster_core::error::AppError;
use taskmaster_core::model::{Category, Tag, Task};
use taskmaster_core::query::{DashboardViews, is_overdue};
use taskmaster_core::store::TaskStore;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

const SELECTED_MARKER: &str = "[SEL] ";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
    #[tabled(rename = "Icon")]
    icon: String,
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Color")]
    color: String,
}

/// Where timestamps are shown and which instant counts as "now".
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub now: OffsetDateTime,
    pub local_offset: UtcOffset,
}

impl RenderContext {
    fn overdue(&self, task: &Task) -> bool {
        !task.is_completed() && task.due_date.is_some_and(|due| is_overdue(due, self.now))
    }

    fn status_label(&self, task: &Task) -> String {
        if self.overdue(task) {
            format!("{} (overdue)", task.status)
        } else {
            task.status.to_string()
        }
    }

    fn format_time(&self, value: OffsetDateTime) -> Result<String, AppError> {
        value
            .to_offset(self.local_offset)
            .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
            .map_err(|err| AppError::invalid_data(format!("cannot format timestamp: {err}")))
    }

    fn format_optional(&self, value: Option<OffsetDateTime>) -> Result<String, AppError> {
        value.map_or_else(|| Ok("-".to_string()), |value| self.format_time(value))
    }
}

pub fn tasks_table(
    store: &TaskStore,
    tasks: &[Task],
    ctx: &RenderContext,
) -> Result<String, AppError> {
    if tasks.is_empty() {
        return Ok("No tasks.".to_string());
    }

    let selected = store.selected_task().map(|task| task.id.as_str());
    let mut rows = Vec::with_capacity(tasks.len());
    for task in tasks {
        let marker = if selected == Some(task.id.as_str()) {
            SELECTED_MARKER
        } else {
            ""
        };
        rows.push(TaskRow {
            id: format!("{marker}{}", task.id),
            title: task.title.clone(),
            status: ctx.status_label(task),
            priority: task.priority.to_string(),
            due: ctx.format_optional(task.due_date)?,
            category: category_label(store, task),
            tags: tag_labels(store, task),
        });
    }

    Ok(Table::new(rows).with(Style::psql()).to_string())
}

/// A task as JSON plus the derived `overdue` flag.
pub fn task_value(task: &Task, ctx: &RenderContext) -> Result<Value, AppError> {
    let mut value = serde_json::to_value(task)
        .map_err(|err| AppError::invalid_data(format!("cannot encode task: {err}")))?;
    if let Value::Object(fields) = &mut value {
        fields.insert("overdue".to_string(), Value::Bool(ctx.overdue(task)));
    }
    Ok(value)
}

pub fn tasks_json(tasks: &[Task], ctx: &RenderContext) -> Result<String, AppError> {
    let values = tasks
        .iter()
        .map(|task| task_value(task, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(values).to_string())
}

pub fn task_details(store: &TaskStore, task: &Task, ctx: &RenderContext) -> Result<String, AppError> {
    let mut lines = Vec::new();
    let selected = store
        .selected_task()
        .is_some_and(|selected| selected.id == task.id);

    lines.push(format!(
        "{}{} ({})",
        if selected { SELECTED_MARKER } else { "" },
        task.title,
        task.id
    ));
    if let Some(description) = task.description.as_deref() {
        lines.push(format!("  Description: {description}"));
    }
    lines.push(format!("  Status:      {}", ctx.status_label(task)));
    lines.push(format!("  Priority:    {}", task.priority));
    lines.push(format!("  Due:         {}", ctx.format_optional(task.due_date)?));
    lines.push(format!("  Category:    {}", category_label(store, task)));
    lines.push(format!("  Tags:        {}", tag_labels(store, task)));
    lines.push(format!("  Created:     {}", ctx.format_time(task.created_at)?));
    lines.push(format!("  Updated:     {}", ctx.format_time(task.updated_at)?));
    if let Some(completed_at) = task.completed_at {
        lines.push(format!("  Completed:   {}", ctx.format_time(completed_at)?));
    }

    Ok(lines.join("\n"))
}

pub fn dashboard_plain(
    store: &TaskStore,
    views: &DashboardViews,
    ctx: &RenderContext,
) -> Result<String, AppError> {
    let stats = views.stats;
    let mut sections = vec![format!(
        "Tasks: {} total, {} completed ({}%)",
        stats.total_tasks, stats.completed_tasks, stats.completion_rate
    )];

    for (heading, tasks) in [
        ("Overdue", &views.overdue),
        ("Due today", &views.due_today),
        ("High priority", &views.high_priority),
        ("Recently completed", &views.recently_completed),
    ] {
        sections.push(format!(
            "\n{heading} ({}):\n{}",
            tasks.len(),
            tasks_table(store, tasks, ctx)?
        ));
    }

    Ok(sections.join("\n"))
}

pub fn dashboard_json(views: &DashboardViews) -> Result<String, AppError> {
    serde_json::to_string(views)
        .map_err(|err| AppError::invalid_data(format!("cannot encode dashboard: {err}")))
}

pub fn categories_table(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories.".to_string();
    }
    let rows = categories.iter().map(|category| CategoryRow {
        id: category.id.clone(),
        name: category.name.clone(),
        color: category.color.clone(),
        icon: category.icon.clone().unwrap_or_else(|| "-".to_string()),
    });
    Table::new(rows).with(Style::psql()).to_string()
}

pub fn tags_table(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "No tags.".to_string();
    }
    let rows = tags.iter().map(|tag| TagRow {
        id: tag.id.clone(),
        name: tag.name.clone(),
        color: tag.color.clone(),
    });
    Table::new(rows).with(Style::psql()).to_string()
}

fn category_label(store: &TaskStore, task: &Task) -> String {
    store
        .resolve_category(task)
        .map(|category| category.name.clone())
        .unwrap_or_else(|| "-".to_string())
}

fn tag_labels(store: &TaskStore, task: &Task) -> String {
    let names: Vec<&str> = store
        .resolve_tags(task)
        .into_iter()
        .map(|tag| tag.name.as_str())
        .collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}
