//! Domain model for tasks and transient notifications.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and notifier.
//! - Own the persisted/exported JSON shape of a task.
//!
//! # Invariants
//! - Every task is identified by a `TaskId` unique within one collection.
//! - `id` and `created_at` never change after creation.

pub mod notification;
pub mod task;
