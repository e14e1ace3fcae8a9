use std::rc::Rc;

use crate::models::{UserPatch, UserProfile};
use crate::store::{self, KeyValueStore, StoreError, USER_KEY};
use crate::tasks::TaskRepository;
use crate::utils::Clock;

/// Owns the single user record
pub struct UserProfileStore {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    user: UserProfile,
}

impl UserProfileStore {
    pub fn load(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Result<Self, StoreError> {
        let user = store::load_json(store.as_ref(), USER_KEY)?
            .unwrap_or_else(|| UserProfile::new(clock.today()));
        Ok(Self { store, clock, user })
    }

    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.user = store::load_json(self.store.as_ref(), USER_KEY)?
            .unwrap_or_else(|| UserProfile::new(self.clock.today()));
        Ok(())
    }

    pub fn get(&self) -> &UserProfile {
        &self.user
    }

    /// Shallow merge of the present fields, then persist
    pub fn update(&mut self, patch: UserPatch) -> Result<&UserProfile, StoreError> {
        let user = &mut self.user;
        if let Some(v) = patch.name { user.name = v; }
        if let Some(v) = patch.email { user.email = v; }
        if let Some(v) = patch.avatar { user.avatar = v; }
        if let Some(v) = patch.streak { user.streak = v; }
        if let Some(v) = patch.success_rate { user.success_rate = v; }
        store::save_json(self.store.as_ref(), USER_KEY, &self.user)?;
        Ok(&self.user)
    }

    /// Recompute `total_tasks` and `completed_tasks` from `tasks` and persist.
    ///
    /// `streak` and `success_rate` are left as stored; between refreshes the
    /// counts may lag the repository.
    pub fn refresh_stats(&mut self, tasks: &TaskRepository) -> Result<&UserProfile, StoreError> {
        self.user.total_tasks = tasks.all().len();
        self.user.completed_tasks = tasks.completed().len();
        store::save_json(self.store.as_ref(), USER_KEY, &self.user)?;
        log::debug!(
            "event=profile_refresh total={} completed={}",
            self.user.total_tasks,
            self.user.completed_tasks
        );
        Ok(&self.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use crate::store::MemoryStore;
    use crate::utils::FixedClock;

    #[test]
    fn stats_are_stale_until_refreshed() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let clock: Rc<dyn Clock> = Rc::new(FixedClock::on_date("2024-03-10").unwrap());
        let mut tasks = TaskRepository::load(store.clone(), clock.clone()).unwrap();
        let mut profile = UserProfileStore::load(store, clock).unwrap();
        assert_eq!(profile.get().join_date, "2024-03-10");

        let a = tasks.add(NewTask::new("a")).unwrap();
        tasks.add(NewTask::new("b")).unwrap();
        tasks.toggle_completed(a.id).unwrap();
        assert_eq!(profile.get().total_tasks, 0);

        profile
            .update(UserPatch { streak: Some(4), ..UserPatch::default() })
            .unwrap();
        let user = profile.refresh_stats(&tasks).unwrap();
        assert_eq!(user.total_tasks, 2);
        assert_eq!(user.completed_tasks, 1);
        assert_eq!(user.streak, 4);
    }
}
