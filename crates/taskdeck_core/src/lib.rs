//! Core domain logic for Taskdeck.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sanitize;
pub mod service;

pub use config::{StoreConfig, DEFAULT_NOTIFICATION_TTL, DEFAULT_STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::notification::{Notification, NotificationKind};
pub use model::task::{ParsePriorityError, Priority, Task, TaskDraft, TaskId, TaskPatch, TaskStats};
pub use repo::slot_repo::{RepoError, RepoResult, SlotStorage, SqliteSlotStorage};
pub use service::notifier::{Clock, ManualClock, Notifier, SystemClock};
pub use service::seed::seed_tasks;
pub use service::subscribers::SubscriptionId;
pub use service::task_codec::{decode_tasks, encode_tasks, encode_tasks_pretty, CodecError};
pub use service::task_store::{StoreError, TaskStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
