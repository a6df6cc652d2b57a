//! Authoritative task collection with persistence and notifications.
//!
//! # Responsibility
//! - Own the only mutable copy of the task list.
//! - Publish every change to subscribers, then write it to the storage slot.
//! - Surface outcomes of user actions through the `Notifier`.
//!
//! # Invariants
//! - Task ids are unique and assigned as `max(existing) + 1`, never reused
//!   while a larger id exists.
//! - A mutation publishes exactly once; no-op calls publish nothing.
//! - Storage failures are logged and never reach the caller.
//! - Imported documents are stored verbatim, without sanitization.

use crate::config::StoreConfig;
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskStats};
use crate::repo::slot_repo::SlotStorage;
use crate::sanitize::{
    contains_malicious_markup, log_security_warning, validate_description, validate_title,
};
use crate::service::notifier::Notifier;
use crate::service::seed::seed_tasks;
use crate::service::subscribers::{SubscriptionId, Subscribers};
use crate::service::task_codec::{decode_tasks, encode_tasks, encode_tasks_pretty, CodecError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MSG_INVALID_TITLE: &str = "Invalid title: a task needs a non-empty title";
const MSG_UNSAFE_CONTENT: &str = "Potentially unsafe content was removed from the task";
const MSG_UPDATED: &str = "Task updated successfully";
const MSG_RESET: &str = "Tasks reset to the default set";
const MSG_IMPORT_FAILED: &str = "Import failed: the file is not a valid task list";
const MSG_IDS_EXHAUSTED: &str = "Cannot add task: no task ids left";

/// Error returned to Rust callers of store mutations.
///
/// The same outcome is also surfaced as an error notification.
#[derive(Debug)]
pub enum StoreError {
    /// Title was empty after cleaning; nothing changed.
    InvalidTitle,
    /// Import payload was not a task array; nothing changed.
    ImportFormat(CodecError),
    /// The largest existing id is `u64::MAX`; nothing changed.
    IdsExhausted,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "task title is empty after cleaning"),
            Self::ImportFormat(err) => write!(f, "{err}"),
            Self::IdsExhausted => write!(f, "no task id left after {}", u64::MAX),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTitle | Self::IdsExhausted => None,
            Self::ImportFormat(err) => Some(err),
        }
    }
}

/// Cleaned text fields plus whether any of them carried injected markup.
struct CleanedFields {
    title: Option<String>,
    description: Option<String>,
    flagged: bool,
}

/// Reactive task store over a slot storage backend.
pub struct TaskStore<S: SlotStorage> {
    storage: S,
    config: StoreConfig,
    tasks: Vec<Task>,
    notifier: Notifier,
    task_subscribers: Subscribers<[Task]>,
    stats_subscribers: Subscribers<TaskStats>,
}

impl<S: SlotStorage> TaskStore<S> {
    /// Loads the persisted collection, falling back to the seed set.
    ///
    /// The resolved collection is written back once so the slot always
    /// holds a parseable document after startup.
    pub fn open(storage: S, notifier: Notifier, config: StoreConfig) -> Self {
        let tasks = load_tasks(&storage, &config.storage_key, &notifier);
        let store = Self {
            storage,
            config,
            tasks,
            notifier,
            task_subscribers: Subscribers::new(),
            stats_subscribers: Subscribers::new(),
        };
        store.persist();
        info!(
            "event=store_open module=store status=ok task_count={} storage_key={}",
            store.tasks.len(),
            store.config.storage_key
        );
        store
    }

    /// Current collection snapshot.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn completed_tasks(&self) -> Vec<Task> {
        self.tasks.iter().filter(|task| task.completed).cloned().collect()
    }

    pub fn pending_tasks(&self) -> Vec<Task> {
        self.tasks.iter().filter(|task| !task.completed).cloned().collect()
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Creates a task from `draft` after cleaning its text fields.
    ///
    /// # Errors
    /// - `StoreError::InvalidTitle` when the title is blank after cleaning.
    /// - `StoreError::IdsExhausted` when an imported task already holds `u64::MAX`.
    pub fn add(&mut self, draft: TaskDraft) -> Result<Task, StoreError> {
        let cleaned = self.clean_fields(
            Some(draft.title.as_str()),
            Some(draft.description.as_str()),
        )?;
        let Some(id) = TaskId::next_after(&self.tasks) else {
            warn!("event=task_add module=store status=rejected reason=ids_exhausted");
            self.notifier.error(MSG_IDS_EXHAUSTED);
            return Err(StoreError::IdsExhausted);
        };
        if cleaned.flagged {
            self.notifier.warning(MSG_UNSAFE_CONTENT);
        }

        let draft = TaskDraft {
            title: cleaned.title.unwrap_or_default(),
            description: cleaned.description.unwrap_or_default(),
            ..draft
        };
        let task = Task::from_draft(id, draft, self.notifier.now());
        self.tasks.push(task.clone());
        info!("event=task_add module=store status=ok task_id={}", task.id);
        self.publish();

        self.notifier.success(format!("Task \"{}\" added", task.title));
        Ok(task)
    }

    /// Removes a task. Absent ids change nothing and notify nothing.
    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        info!("event=task_delete module=store status=ok task_id={id}");
        self.publish();

        self.notifier.error(format!("Task \"{}\" deleted", removed.title));
        Some(removed)
    }

    /// Flips `completed`. Absent ids change nothing and notify nothing.
    pub fn toggle_completion(&mut self, id: TaskId) -> Option<Task> {
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        let toggled = task.clone();
        info!(
            "event=task_toggle module=store status=ok task_id={} completed={}",
            id, toggled.completed
        );
        self.publish();

        let state = if toggled.completed {
            "completed"
        } else {
            "reopened"
        };
        self.notifier.info(format!("Task \"{}\" {state}", toggled.title));
        Some(toggled)
    }

    /// Merges `patch` into the task with `id`.
    ///
    /// Text fields present in the patch are cleaned before the id lookup, so
    /// an unsafe-content warning or invalid-title error is raised even when
    /// the id is absent. An absent id returns `Ok(None)` without publishing
    /// or a success notification.
    ///
    /// # Errors
    /// - `StoreError::InvalidTitle` when a provided title is blank after cleaning.
    pub fn update(&mut self, id: TaskId, patch: TaskPatch) -> Result<Option<Task>, StoreError> {
        let cleaned = self.clean_fields(patch.title.as_deref(), patch.description.as_deref())?;
        if cleaned.flagged {
            self.notifier.warning(MSG_UNSAFE_CONTENT);
        }
        let patch = TaskPatch {
            title: cleaned.title,
            description: cleaned.description,
            ..patch
        };

        let Some(index) = self.position(id) else {
            debug!("event=task_update module=store status=skipped reason=not_found task_id={id}");
            return Ok(None);
        };
        let updated = self.tasks[index].patched(&patch);
        self.tasks[index] = updated.clone();
        info!("event=task_update module=store status=ok task_id={id}");
        self.publish();

        self.notifier.success(MSG_UPDATED);
        Ok(Some(updated))
    }

    /// Drops persisted data and restores the seed set with fresh timestamps.
    pub fn reset(&mut self) {
        if let Err(err) = self.storage.remove_slot(&self.config.storage_key) {
            error!(
                "event=slot_remove module=store status=error storage_key={} error={}",
                self.config.storage_key, err
            );
        }
        self.tasks = seed_tasks(self.notifier.now());
        info!(
            "event=store_reset module=store status=ok task_count={}",
            self.tasks.len()
        );
        self.publish();

        self.notifier.info(MSG_RESET);
    }

    /// Pretty-printed JSON document of the current collection.
    pub fn export_json(&self) -> Result<String, CodecError> {
        encode_tasks_pretty(&self.tasks)
    }

    /// Replaces the whole collection with a previously exported document.
    ///
    /// Returns the number of imported tasks.
    ///
    /// # Errors
    /// - `StoreError::ImportFormat` when `text` is not a task array; the
    ///   collection is left untouched.
    pub fn import_json(&mut self, text: &str) -> Result<usize, StoreError> {
        let tasks = match decode_tasks(text) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!("event=task_import module=store status=error error={err}");
                self.notifier.error(MSG_IMPORT_FAILED);
                return Err(StoreError::ImportFormat(err));
            }
        };

        let count = tasks.len();
        self.tasks = tasks;
        info!("event=task_import module=store status=ok task_count={count}");
        self.publish();

        self.notifier.success(format!("{count} tasks imported"));
        Ok(count)
    }

    /// Subscribes to the task collection; the current list is replayed immediately.
    pub fn subscribe(&mut self, callback: impl FnMut(&[Task]) + 'static) -> SubscriptionId {
        self.task_subscribers.subscribe(&self.tasks, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.task_subscribers.unsubscribe(id)
    }

    /// Subscribes to derived statistics; current values are replayed immediately.
    pub fn subscribe_stats(
        &mut self,
        callback: impl FnMut(&TaskStats) + 'static,
    ) -> SubscriptionId {
        let stats = self.stats();
        self.stats_subscribers.subscribe(&stats, callback)
    }

    pub fn unsubscribe_stats(&mut self, id: SubscriptionId) -> bool {
        self.stats_subscribers.unsubscribe(id)
    }

    /// Writes the current collection to storage.
    pub fn flush(&self) {
        self.persist();
    }

    /// Flushes and releases the store.
    pub fn shutdown(self) {
        self.persist();
        info!(
            "event=store_shutdown module=store status=ok task_count={}",
            self.tasks.len()
        );
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    /// Runs provided text fields through the sanitizer.
    ///
    /// An invalid title notifies an error and aborts the caller.
    fn clean_fields(
        &mut self,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<CleanedFields, StoreError> {
        let mut flagged = false;
        if let Some(raw) = title {
            if contains_malicious_markup(raw) {
                log_security_warning(raw, "title");
                flagged = true;
            }
        }
        if let Some(raw) = description {
            if contains_malicious_markup(raw) {
                log_security_warning(raw, "description");
                flagged = true;
            }
        }

        let title = match title {
            Some(raw) => match validate_title(raw) {
                Some(cleaned) => Some(cleaned),
                None => {
                    warn!("event=task_validate module=store status=rejected reason=invalid_title");
                    self.notifier.error(MSG_INVALID_TITLE);
                    return Err(StoreError::InvalidTitle);
                }
            },
            None => None,
        };
        let description = description.map(|raw| validate_description(Some(raw)));

        Ok(CleanedFields {
            title,
            description,
            flagged,
        })
    }

    fn publish(&mut self) {
        let stats = self.stats();
        self.task_subscribers.emit(&self.tasks);
        self.stats_subscribers.emit(&stats);
        self.persist();
    }

    fn persist(&self) {
        let key = self.config.storage_key.as_str();
        let result = encode_tasks(&self.tasks)
            .map_err(|err| err.to_string())
            .and_then(|text| {
                self.storage
                    .write_slot(key, &text)
                    .map_err(|err| err.to_string())
            });
        match result {
            Ok(()) => debug!(
                "event=slot_write module=store status=ok storage_key={} task_count={}",
                key,
                self.tasks.len()
            ),
            Err(err) => error!(
                "event=slot_write module=store status=error storage_key={key} error={err}"
            ),
        }
    }
}

fn load_tasks<S: SlotStorage>(storage: &S, key: &str, notifier: &Notifier) -> Vec<Task> {
    match storage.read_slot(key) {
        Ok(Some(text)) => match decode_tasks(&text) {
            Ok(tasks) => {
                debug!(
                    "event=slot_read module=store status=ok storage_key={key} task_count={}",
                    tasks.len()
                );
                return tasks;
            }
            Err(err) => warn!(
                "event=slot_read module=store status=fallback reason=unparsable storage_key={key} error={err}"
            ),
        },
        Ok(None) => debug!(
            "event=slot_read module=store status=fallback reason=absent storage_key={key}"
        ),
        Err(err) => error!(
            "event=slot_read module=store status=fallback reason=storage_error storage_key={key} error={err}"
        ),
    }
    seed_tasks(notifier.now())
}
