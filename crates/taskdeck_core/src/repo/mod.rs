//! Key-value slot persistence.
//!
//! # Responsibility
//! - Define the storage contract the task store persists through.
//! - Keep SQL details out of the store.
//!
//! # Invariants
//! - A slot holds one opaque UTF-8 value; writes replace it whole.

pub mod slot_repo;
