//! Transient notification queue with timed auto-removal.
//!
//! # Responsibility
//! - Own the active notification set and publish it on every change.
//! - Schedule removal of each notification after a fixed time-to-live.
//!
//! # Invariants
//! - Notification ids are monotonic and never reused by one notifier.
//! - Removal is idempotent; an expired or dismissed id stays removed.
//! - `dismiss` cancels the pending expiry of the same id.

use crate::config::DEFAULT_NOTIFICATION_TTL;
use crate::model::notification::{Notification, NotificationKind};
use crate::service::subscribers::{SubscriptionId, Subscribers};
use chrono::{DateTime, Duration as ChronoDuration, SubsecRound, Utc};
use log::debug;
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// Manually advanced clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(offset(self.now.get(), by));
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.now.set(instant);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Owner of the active notification set.
pub struct Notifier {
    clock: Box<dyn Clock>,
    ttl: Duration,
    last_id: u64,
    active: Vec<Notification>,
    /// Pending auto-removals keyed by notification id.
    deadlines: BTreeMap<u64, DateTime<Utc>>,
    subscribers: Subscribers<[Notification]>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}

impl Notifier {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self::with_ttl(clock, DEFAULT_NOTIFICATION_TTL)
    }

    pub fn with_ttl(clock: Box<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            last_id: 0,
            active: Vec::new(),
            deadlines: BTreeMap::new(),
            subscribers: Subscribers::new(),
        }
    }

    /// Adds a notification, publishes, and schedules its removal.
    ///
    /// Returns the assigned id.
    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.tick();

        self.last_id += 1;
        let id = self.last_id;
        let now = self.clock.now();
        self.active.push(Notification {
            id,
            message: message.into(),
            kind,
            created_at: now,
        });
        self.deadlines.insert(id, offset(now, self.ttl));
        debug!(
            "event=notification_show module=notifier status=ok id={} kind={}",
            id, kind
        );
        self.publish();
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.show(message, NotificationKind::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.show(message, NotificationKind::Error)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.show(message, NotificationKind::Info)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.show(message, NotificationKind::Warning)
    }

    /// Removes one notification. Absent ids are a silent no-op.
    pub fn dismiss(&mut self, id: u64) -> bool {
        self.deadlines.remove(&id);
        let before = self.active.len();
        self.active.retain(|notification| notification.id != id);
        if self.active.len() == before {
            return false;
        }
        debug!("event=notification_dismiss module=notifier status=ok id={id}");
        self.publish();
        true
    }

    /// Fires every expiry whose deadline has passed.
    ///
    /// Returns the number of notifications removed.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        let due: Vec<u64> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        if due.is_empty() {
            return 0;
        }

        for id in &due {
            self.deadlines.remove(id);
        }
        let before = self.active.len();
        self.active
            .retain(|notification| !due.contains(&notification.id));
        let removed = before - self.active.len();
        if removed > 0 {
            debug!("event=notification_expire module=notifier status=ok removed={removed}");
            self.publish();
        }
        removed
    }

    /// Earliest pending expiry, for callers driving `tick` from a loop.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.deadlines.values().min().copied()
    }

    /// Notifications still live at the clock's current instant.
    ///
    /// Entries past their deadline are left out even before `tick` fires them.
    pub fn active(&self) -> Vec<Notification> {
        let now = self.clock.now();
        self.active
            .iter()
            .filter(|notification| {
                self.deadlines
                    .get(&notification.id)
                    .map_or(true, |deadline| *deadline > now)
            })
            .cloned()
            .collect()
    }

    /// Current instant from this notifier's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Subscribes to the active set; the current set is replayed immediately.
    pub fn subscribe(&mut self, callback: impl FnMut(&[Notification]) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(&self.active, callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn publish(&mut self) {
        self.subscribers.emit(&self.active);
    }
}

/// `instant + duration`, saturating at the latest representable instant.
fn offset(instant: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    ChronoDuration::from_std(duration)
        .ok()
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
