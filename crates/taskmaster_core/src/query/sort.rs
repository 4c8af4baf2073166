use crate::model::{SortDirection, SortKey, Task};
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Stable sort into a new vector; the input is left as is.
///
/// Undated tasks stay after dated ones for [`SortKey::DueDate`] in both
/// directions; every other ordering is flipped by [`SortDirection::Desc`].
pub fn sort_tasks(tasks: &[Task], key: SortKey, direction: SortDirection) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| compare_tasks(a, b, key, direction));
    sorted
}

pub fn compare_tasks(a: &Task, b: &Task, key: SortKey, direction: SortDirection) -> Ordering {
    match key {
        SortKey::DueDate => match (a.due_date, b.due_date) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(left), Some(right)) => directed(left.cmp(&right), direction),
        },
        SortKey::Priority => directed(a.priority.rank().cmp(&b.priority.rank()), direction),
        SortKey::CreatedAt => directed(a.created_at.cmp(&b.created_at), direction),
        SortKey::Title => directed(compare_titles(&a.title, &b.title), direction),
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

// Three levels, as a collator would: base letters (accents and case
// stripped), then accents, then case with lowercase first.
fn compare_titles(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| accented(a).cmp(&accented(b)))
        .then_with(|| b.cmp(a))
}

fn base_letters(title: &str) -> String {
    title
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
}

fn accented(title: &str) -> String {
    title.nfd().collect::<String>().to_lowercase()
}
