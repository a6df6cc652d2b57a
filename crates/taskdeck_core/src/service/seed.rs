//! Built-in example tasks used on first start and on reset.

use crate::model::task::{Priority, Task, TaskId};
use chrono::{DateTime, Utc};

const SEED: &[(u64, &str, &str, bool, Priority)] = &[
    (
        1,
        "Learn the framework",
        "Master the core concepts of the framework",
        false,
        Priority::High,
    ),
    (
        2,
        "Configure routing",
        "Set up navigation between pages",
        true,
        Priority::High,
    ),
    (
        3,
        "Build the components",
        "Develop the header, footer, home and about views",
        true,
        Priority::Medium,
    ),
    (
        4,
        "Adopt reactive streams",
        "Use observables to manage application data",
        false,
        Priority::High,
    ),
    (
        5,
        "Add tests",
        "Write unit tests for the services",
        false,
        Priority::Low,
    ),
];

/// Returns the five example tasks, all stamped with `created_at`.
pub fn seed_tasks(created_at: DateTime<Utc>) -> Vec<Task> {
    SEED.iter()
        .map(|&(id, title, description, completed, priority)| Task {
            id: TaskId(id),
            title: title.to_string(),
            description: description.to_string(),
            completed,
            priority,
            created_at,
        })
        .collect()
}
