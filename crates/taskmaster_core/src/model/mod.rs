mod filter;
mod task;

pub use filter::{SortDirection, SortKey, TaskFilter};
pub use task::{Category, Tag, Task, TaskPriority, TaskStatus, canonical_token};
