//! The service context: owns every store and performs user-facing actions
//! as one step (mutation, notification, fresh view).

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::backup::{self, BackupError, ExportDocument};
use crate::models::{NewTask, NotificationKind, Task, TaskPatch, UserPatch, UserProfile};
use crate::notifications::{DEFAULT_TOAST_DURATION, NotificationCenter};
use crate::profile::UserProfileStore;
use crate::session::Session;
use crate::settings::{SettingKey, SettingValue, SettingsChange, SettingsError, SettingsStore};
use crate::store::{KeyValueStore, StoreError};
use crate::tasks::TaskRepository;
use crate::utils::Clock;
use crate::view::{self, Filter, Frame, ListView};

/// Result of an interactive action together with the view computed after it
#[derive(Debug, Clone)]
pub struct Update<T> {
    pub result: T,
    pub frame: Frame,
}

pub struct Routine {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    pub tasks: TaskRepository,
    pub settings: SettingsStore,
    pub profile: UserProfileStore,
    pub notifications: NotificationCenter,
    session: Session,
    toast_duration: Duration,
}

impl Routine {
    pub fn open(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Result<Self, StoreError> {
        Ok(Self {
            tasks: TaskRepository::load(store.clone(), clock.clone())?,
            settings: SettingsStore::load(store.clone())?,
            profile: UserProfileStore::load(store.clone(), clock.clone())?,
            notifications: NotificationCenter::load(store.clone(), clock.clone())?,
            session: Session::new(store.clone()),
            store,
            clock,
            toast_duration: DEFAULT_TOAST_DURATION,
        })
    }

    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toast_duration = duration;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn today(&self) -> String {
        self.clock.today()
    }

    fn toast(&mut self, message: &str, kind: NotificationKind) -> Result<(), StoreError> {
        self.notifications.toast(message, kind, self.toast_duration)
    }

    /// Main list for `filter` plus dashboard, from the current state
    pub fn frame(&self, filter: Filter) -> Frame {
        Frame::compute(
            self.tasks.all(),
            self.notifications.history(),
            filter,
            &self.clock.today(),
        )
    }

    pub fn completed_view(&self) -> ListView {
        view::completed_view(self.tasks.all())
    }

    pub fn add_task(&mut self, data: NewTask) -> Result<Task, StoreError> {
        let task = self.tasks.add(data)?;
        self.toast("Task added successfully!", NotificationKind::Success)?;
        Ok(task)
    }

    pub fn update_task(&mut self, id: i64, patch: TaskPatch) -> Result<Option<Task>, StoreError> {
        let updated = self.tasks.update(id, patch)?;
        if updated.is_some() {
            self.toast("Task updated", NotificationKind::Info)?;
        }
        Ok(updated)
    }

    /// Toggle completion and re-render list and dashboard together
    pub fn toggle_task(&mut self, id: i64, filter: Filter) -> Result<Update<Option<Task>>, StoreError> {
        let toggled = self.tasks.toggle_completed(id)?;
        if let Some(task) = &toggled {
            if task.completed {
                self.toast("Task completed! Great job!", NotificationKind::Success)?;
            } else {
                self.toast("Task marked as pending", NotificationKind::Info)?;
            }
        }
        Ok(Update { result: toggled, frame: self.frame(filter) })
    }

    /// Delete and re-render list and dashboard together
    pub fn delete_task(&mut self, id: i64, filter: Filter) -> Result<Update<bool>, StoreError> {
        let removed = self.tasks.delete(id)?;
        if removed {
            self.toast("Task deleted", NotificationKind::Info)?;
        }
        Ok(Update { result: removed, frame: self.frame(filter) })
    }

    pub fn set_setting(
        &mut self,
        key: SettingKey,
        value: SettingValue,
    ) -> Result<Option<SettingsChange>, SettingsError> {
        let change = self.settings.set(key, value)?;
        self.toast("Settings saved", NotificationKind::Success)?;
        Ok(change)
    }

    pub fn update_profile(&mut self, patch: UserPatch) -> Result<UserProfile, StoreError> {
        let user = self.profile.update(patch)?.clone();
        self.toast("Profile updated", NotificationKind::Success)?;
        Ok(user)
    }

    /// Refresh the profile's task counts from the repository
    pub fn refresh_profile(&mut self) -> Result<&UserProfile, StoreError> {
        self.profile.refresh_stats(&self.tasks)
    }

    pub fn export_json(&self) -> Result<String, BackupError> {
        self.export_document().to_pretty_json()
    }

    fn export_document(&self) -> ExportDocument<'_> {
        ExportDocument {
            tasks: self.tasks.all(),
            settings: self.settings.get_all(),
            user: self.profile.get(),
        }
    }

    /// Write `daily-routine-backup-<today>.json` into `dir`
    pub fn export_to(&mut self, dir: &Path) -> Result<PathBuf, BackupError> {
        let path = backup::write_backup(dir, &self.clock.today(), &self.export_document())?;
        self.toast("Data exported successfully!", NotificationKind::Success)?;
        Ok(path)
    }

    /// Wipe the whole store (session flag included) and reload every service
    /// from empty state. Declining changes nothing and records nothing.
    pub fn clear_all(&mut self, confirmed: bool) -> Result<bool, StoreError> {
        if !confirmed {
            return Ok(false);
        }
        self.store.clear()?;
        self.tasks.reload()?;
        self.settings.reload()?;
        self.profile.reload()?;
        self.notifications.reload()?;
        log::warn!("event=clear_all");
        Ok(true)
    }

    /// Advance toast timers
    pub fn tick(&mut self, now: Instant) {
        self.notifications.tick(now);
    }
}
