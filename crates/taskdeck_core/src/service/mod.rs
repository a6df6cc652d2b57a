//! Stateful services: the task store and its notifier.
//!
//! # Responsibility
//! - Orchestrate sanitizer, persistence and notifications per user action.
//! - Keep callers decoupled from storage and serialization details.

pub mod notifier;
pub mod seed;
pub mod subscribers;
pub mod task_codec;
pub mod task_store;
