use crate::model::{Task, TaskFilter};

/// Tasks matching every dimension of `filter`, in their original order.
pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| matches_filter(task, filter))
        .cloned()
        .collect()
}

pub fn matches_filter(task: &Task, filter: &TaskFilter) -> bool {
    if !filter.status.is_empty() && !filter.status.contains(&task.status) {
        return false;
    }

    if !filter.priority.is_empty() && !filter.priority.contains(&task.priority) {
        return false;
    }

    if let Some(category_id) = non_blank(filter.category_id.as_deref())
        && task.category_id.as_deref() != Some(category_id)
    {
        return false;
    }

    if !filter.tags.is_empty() && !filter.tags.iter().any(|tag| task.has_tag(tag)) {
        return false;
    }

    if let Some(search_text) = non_blank(filter.search_text.as_deref())
        && !matches_search(task, search_text)
    {
        return false;
    }

    // Undated tasks are never excluded by the date bounds.
    if let Some(due) = task.due_date {
        if let Some(from) = filter.due_date_from
            && due < from
        {
            return false;
        }
        if let Some(to) = filter.due_date_to
            && due > to
        {
            return false;
        }
    }

    true
}

fn matches_search(task: &Task, search_text: &str) -> bool {
    let needle = search_text.to_lowercase();
    if task.title.to_lowercase().contains(&needle) {
        return true;
    }

    task.description
        .as_deref()
        .is_some_and(|description| description.to_lowercase().contains(&needle))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::filter_tasks;
    use crate::model::{TaskFilter, TaskPriority, TaskStatus};
    use crate::test_support::{at, task};

    fn ids(tasks: &[crate::model::Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_returns_every_task_in_order() {
        let tasks = vec![task("t1", "b"), task("t2", "a"), task("t3", "c")];

        let filtered = filter_tasks(&tasks, &TaskFilter::default());

        assert_eq!(filtered, tasks);
    }

    #[test]
    fn empty_status_set_means_no_constraint() {
        let mut archived = task("t1", "old");
        archived.status = TaskStatus::Archived;
        let tasks = vec![archived, task("t2", "new")];
        let filter = TaskFilter {
            status: Vec::new(),
            ..TaskFilter::default()
        };

        assert_eq!(filter_tasks(&tasks, &filter).len(), 2);
    }

    #[test]
    fn status_and_priority_are_membership_checks() {
        let mut done = task("t1", "done");
        done.status = TaskStatus::Completed;
        let mut high = task("t2", "high");
        high.priority = TaskPriority::High;
        let mut low_doing = task("t3", "low");
        low_doing.status = TaskStatus::InProgress;
        low_doing.priority = TaskPriority::Low;
        let tasks = vec![done, high, low_doing];

        let filter = TaskFilter {
            status: vec![TaskStatus::Todo, TaskStatus::InProgress],
            priority: vec![TaskPriority::High, TaskPriority::Low],
            ..TaskFilter::default()
        };

        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["t2", "t3"]);
    }

    #[test]
    fn category_requires_exact_match() {
        let mut work = task("t1", "work");
        work.category_id = Some("work".into());
        let mut home = task("t2", "home");
        home.category_id = Some("personal".into());
        let uncategorized = task("t3", "none");
        let tasks = vec![work, home, uncategorized];

        let filter = TaskFilter {
            category_id: Some("work".into()),
            ..TaskFilter::default()
        };

        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["t1"]);
    }

    #[test]
    fn tags_match_any() {
        let mut tagged = task("a", "A");
        tagged.tags = vec!["urgent".into(), "review".into()];
        let mut review_only = task("b", "B");
        review_only.tags = vec!["review".into()];
        let tasks = vec![tagged, review_only];

        let filter = TaskFilter {
            tags: vec!["urgent".into()],
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["a"]);

        let filter = TaskFilter {
            tags: vec!["missing".into(), "review".into()],
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["a", "b"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let dentist = task("t1", "Schedule dentist appointment");
        let groceries = task("t2", "Buy groceries");
        let mut described = task("t3", "Call office");
        described.description = Some("Ask about the DENTAL plan".into());
        let tasks = vec![dentist, groceries, described];

        let filter = TaskFilter {
            search_text: Some("dent".into()),
            ..TaskFilter::default()
        };

        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["t1", "t3"]);
    }

    #[test]
    fn empty_search_text_is_ignored() {
        let tasks = vec![task("t1", "anything")];
        let filter = TaskFilter {
            search_text: Some(String::new()),
            ..TaskFilter::default()
        };

        assert_eq!(filter_tasks(&tasks, &filter).len(), 1);
    }

    #[test]
    fn due_date_bounds_are_inclusive_and_skip_undated_tasks() {
        let mut early = task("early", "early");
        early.due_date = Some(at("2024-06-01T00:00:00Z"));
        let mut start = task("start", "start");
        start.due_date = Some(at("2024-06-05T00:00:00Z"));
        let mut end = task("end", "end");
        end.due_date = Some(at("2024-06-10T00:00:00Z"));
        let mut late = task("late", "late");
        late.due_date = Some(at("2024-06-11T00:00:00Z"));
        let undated = task("undated", "undated");
        let tasks = vec![early, start, end, late, undated];

        let filter = TaskFilter {
            due_date_from: Some(at("2024-06-05T00:00:00Z")),
            due_date_to: Some(at("2024-06-10T00:00:00Z")),
            ..TaskFilter::default()
        };

        assert_eq!(
            ids(&filter_tasks(&tasks, &filter)),
            vec!["start", "end", "undated"]
        );
    }

    #[test]
    fn dimensions_combine_with_and() {
        let mut match_all = task("t1", "Prepare report");
        match_all.priority = TaskPriority::High;
        match_all.tags = vec!["urgent".into()];
        let mut wrong_tag = task("t2", "Prepare slides");
        wrong_tag.priority = TaskPriority::High;
        let mut wrong_priority = task("t3", "Prepare notes");
        wrong_priority.tags = vec!["urgent".into()];
        let tasks = vec![match_all, wrong_tag, wrong_priority];

        let filter = TaskFilter {
            priority: vec![TaskPriority::High],
            tags: vec!["urgent".into()],
            search_text: Some("prepare".into()),
            ..TaskFilter::default()
        };

        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["t1"]);
    }

    #[test]
    fn filter_leaves_input_untouched() {
        let tasks = vec![task("t1", "one"), task("t2", "two")];
        let before = tasks.clone();

        let filter = TaskFilter {
            search_text: Some("two".into()),
            ..TaskFilter::default()
        };
        let filtered = filter_tasks(&tasks, &filter);

        assert_eq!(tasks, before);
        assert_eq!(ids(&filtered), vec!["t2"]);
    }
}
