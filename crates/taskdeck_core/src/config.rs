//! Store configuration.

use std::time::Duration;

/// Storage slot name used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "tasks";
/// How long a notification stays active before auto-removal.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(3000);

/// Settings for `TaskStore` and its notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Slot holding the JSON task array.
    pub storage_key: String,
    /// Passed to `Notifier::with_ttl` by hosts building the notifier.
    pub notification_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }
}

impl StoreConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }
}
