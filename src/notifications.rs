//! Notification history and transient toasts.
//!
//! History entries are persisted newest-first and capped at
//! [`HISTORY_CAP`]; an entry only ever moves from unread to read. Toasts are
//! in-memory only and expire on their own as [`NotificationCenter::tick`]
//! is called.

use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::models::{Notification, NotificationKind};
use crate::store::{self, KeyValueStore, NOTIFICATIONS_KEY, StoreError};
use crate::utils::Clock;

pub const HISTORY_CAP: usize = 50;
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);
/// Time between a toast starting to leave and its removal
pub const TOAST_EXIT_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    Leaving,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: NotificationKind,
    pub shown_at: Instant,
    pub duration: Duration,
    pub phase: ToastPhase,
}

impl Toast {
    /// Phase at `now`, or `None` once the exit has finished
    fn phase_at(&self, now: Instant) -> Option<ToastPhase> {
        let elapsed = now.saturating_duration_since(self.shown_at);
        if elapsed < self.duration {
            Some(ToastPhase::Visible)
        } else if elapsed < self.duration + TOAST_EXIT_DURATION {
            Some(ToastPhase::Leaving)
        } else {
            None
        }
    }
}

type BadgeListener = Box<dyn FnMut(usize)>;

pub struct NotificationCenter {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    history: Vec<Notification>,
    toasts: Vec<Toast>,
    badge_listener: Option<BadgeListener>,
}

impl NotificationCenter {
    pub fn load(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Result<Self, StoreError> {
        let mut history: Vec<Notification> =
            store::load_json(store.as_ref(), NOTIFICATIONS_KEY)?.unwrap_or_default();
        history.truncate(HISTORY_CAP);
        Ok(Self {
            store,
            clock,
            history,
            toasts: Vec::new(),
            badge_listener: None,
        })
    }

    pub fn reload(&mut self) -> Result<(), StoreError> {
        let mut history: Vec<Notification> =
            store::load_json(self.store.as_ref(), NOTIFICATIONS_KEY)?.unwrap_or_default();
        history.truncate(HISTORY_CAP);
        self.history = history;
        self.refresh_badge();
        Ok(())
    }

    /// Called with the unread count after every change to the history
    pub fn set_badge_listener(&mut self, listener: impl FnMut(usize) + 'static) {
        self.badge_listener = Some(Box::new(listener));
    }

    fn refresh_badge(&mut self) {
        let unread = self.unread_count();
        if let Some(listener) = self.badge_listener.as_mut() {
            listener(unread);
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        store::save_json(self.store.as_ref(), NOTIFICATIONS_KEY, &self.history)
    }

    fn next_id(&self) -> i64 {
        let candidate = self.clock.now_millis();
        match self.history.iter().map(|n| n.id).max() {
            Some(max) if candidate <= max => max + 1,
            _ => candidate,
        }
    }

    /// Prepend an unread entry, drop anything past the cap, persist
    pub fn record(&mut self, message: impl Into<String>, kind: NotificationKind) -> Result<&Notification, StoreError> {
        let entry = Notification {
            id: self.next_id(),
            message: message.into(),
            kind,
            timestamp: self.clock.now().to_rfc3339(),
            read: false,
        };
        self.history.insert(0, entry);
        self.history.truncate(HISTORY_CAP);
        self.persist()?;
        self.refresh_badge();
        Ok(&self.history[0])
    }

    /// Mark one entry read. Returns false when the id is unknown or the entry
    /// was already read; neither case writes.
    pub fn mark_read(&mut self, id: i64) -> Result<bool, StoreError> {
        let Some(entry) = self.history.iter_mut().find(|n| n.id == id && !n.read) else {
            return Ok(false);
        };
        entry.read = true;
        self.persist()?;
        self.refresh_badge();
        Ok(true)
    }

    /// Mark every entry read; a no-op when nothing is unread
    pub fn mark_all_read(&mut self) -> Result<(), StoreError> {
        if self.unread_count() == 0 {
            return Ok(());
        }
        for entry in self.history.iter_mut() {
            entry.read = true;
        }
        self.persist()?;
        self.refresh_badge();
        Ok(())
    }

    pub fn unread_count(&self) -> usize {
        self.history.iter().filter(|n| !n.read).count()
    }

    /// Newest first
    pub fn history(&self) -> &[Notification] {
        &self.history
    }

    /// Record a history entry and show a toast for `duration`
    pub fn toast(&mut self, message: impl Into<String>, kind: NotificationKind, duration: Duration) -> Result<(), StoreError> {
        self.toast_at(message, kind, duration, Instant::now())
    }

    pub fn toast_at(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: Duration,
        now: Instant,
    ) -> Result<(), StoreError> {
        let message = message.into();
        self.record(message.clone(), kind)?;
        self.toasts.push(Toast {
            message,
            kind,
            shown_at: now,
            duration,
            phase: ToastPhase::Visible,
        });
        Ok(())
    }

    /// Advance toast phases and drop those whose exit has finished
    pub fn tick(&mut self, now: Instant) {
        self.toasts.retain_mut(|toast| match toast.phase_at(now) {
            Some(phase) => {
                toast.phase = phase;
                true
            }
            None => false,
        });
    }

    /// Toasts currently on screen, oldest first
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }
}
