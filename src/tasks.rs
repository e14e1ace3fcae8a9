//! Task repository: owns the task list and writes it through to the store
//! after every mutation.

use std::rc::Rc;

use crate::models::{NewTask, Priority, Task, TaskPatch};
use crate::store::{self, KeyValueStore, StoreError, TASKS_KEY};
use crate::utils::Clock;

pub struct TaskRepository {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    tasks: Vec<Task>,
}

impl TaskRepository {
    /// Load tasks from the store; a missing or unparsable record is an empty list
    pub fn load(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Result<Self, StoreError> {
        let tasks = store::load_json(store.as_ref(), TASKS_KEY)?.unwrap_or_default();
        Ok(Self { store, clock, tasks })
    }

    /// Re-read the collection from the store
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.tasks = store::load_json(self.store.as_ref(), TASKS_KEY)?.unwrap_or_default();
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        store::save_json(self.store.as_ref(), TASKS_KEY, &self.tasks)
    }

    /// Time-based id, bumped past the current maximum when two adds land in
    /// the same millisecond
    fn next_id(&self) -> i64 {
        let candidate = self.clock.now_millis();
        match self.tasks.iter().map(|t| t.id).max() {
            Some(max) if candidate <= max => max + 1,
            _ => candidate,
        }
    }

    /// Create a task from `data`, append it and persist.
    ///
    /// The title is trusted to be non-empty; optional fields are not validated.
    pub fn add(&mut self, data: NewTask) -> Result<Task, StoreError> {
        let task = Task {
            id: self.next_id(),
            title: data.title,
            description: data.description.unwrap_or_default(),
            category: data.category.unwrap_or_default(),
            priority: data.priority.unwrap_or_default(),
            due_date: data.due_date.unwrap_or_default(),
            due_time: data.due_time.unwrap_or_default(),
            reminder: data.reminder.unwrap_or_else(|| "none".to_string()),
            repeat: data.repeat.unwrap_or_else(|| "none".to_string()),
            completed: false,
            subtasks: data.subtasks,
            created_at: self.clock.now().to_rfc3339(),
        };
        self.tasks.push(task.clone());
        self.persist()?;
        log::info!("event=task_add id={}", task.id);
        Ok(task)
    }

    /// Remove the task with `id`. Absent ids are a no-op; the collection is
    /// persisted either way. Returns whether a task was removed.
    pub fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        let len_before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.persist()?;
        let removed = self.tasks.len() != len_before;
        if removed {
            log::info!("event=task_delete id={}", id);
        }
        Ok(removed)
    }

    /// Merge `patch` into the task with `id`; persists only when found
    pub fn update(&mut self, id: i64, patch: TaskPatch) -> Result<Option<Task>, StoreError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        patch.apply(task);
        let updated = task.clone();
        self.persist()?;
        log::info!("event=task_update id={}", id);
        Ok(Some(updated))
    }

    /// Flip `completed` on the task with `id`
    pub fn toggle_completed(&mut self, id: i64) -> Result<Option<Task>, StoreError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let updated = task.clone();
        self.persist()?;
        log::info!("event=task_toggle id={} completed={}", id, updated.completed);
        Ok(Some(updated))
    }

    /// Drop every task and persist the empty list
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.tasks.clear();
        self.persist()
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn completed(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.completed).collect()
    }

    pub fn pending(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.completed).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.category == category).collect()
    }

    pub fn by_priority(&self, priority: Priority) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.priority == priority).collect()
    }

    /// Tasks whose `due_date` string-equals today's `YYYY-MM-DD`
    pub fn due_today(&self) -> Vec<&Task> {
        let today = self.clock.today();
        self.tasks.iter().filter(|t| is_due_today(t, &today)).collect()
    }

    /// Tasks whose `due_date` is lexically greater than today's date string.
    ///
    /// This is a string comparison, not a calendar one: it only orders
    /// correctly for zero-padded ISO dates.
    pub fn due_upcoming(&self) -> Vec<&Task> {
        let today = self.clock.today();
        self.tasks.iter().filter(|t| is_upcoming(t, &today)).collect()
    }

    /// `round(completed / total * 100)`, or 0 for an empty collection
    pub fn completion_percentage(&self) -> u32 {
        completion_percentage(&self.tasks)
    }

    pub fn remaining_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

pub(crate) fn is_due_today(task: &Task, today: &str) -> bool {
    task.due_date == today
}

pub(crate) fn is_upcoming(task: &Task, today: &str) -> bool {
    task.due_date.as_str() > today
}

pub(crate) fn completion_percentage(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let done = tasks.iter().filter(|t| t.completed).count();
    ((done as f64 / tasks.len() as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::utils::FixedClock;

    fn repo() -> (TaskRepository, Rc<MemoryStore>) {
        let store = Rc::new(MemoryStore::new());
        let clock = Rc::new(FixedClock::on_date("2024-01-01").unwrap());
        let repo = TaskRepository::load(store.clone(), clock).unwrap();
        (repo, store)
    }

    #[test]
    fn same_millisecond_adds_get_distinct_ids() {
        let (mut repo, _) = repo();
        let a = repo.add(NewTask::new("a")).unwrap();
        let b = repo.add(NewTask::new("b")).unwrap();
        assert_eq!(b.id, a.id + 1);
    }

    #[test]
    fn add_applies_defaults() {
        let (mut repo, _) = repo();
        let task = repo.add(NewTask::new("Stretch")).unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.reminder, "none");
        assert_eq!(task.repeat, "none");
        assert_eq!(task.due_date, "");
        assert!(!task.completed);
        assert!(task.subtasks.is_empty());
    }

    #[test]
    fn update_missing_id_does_not_write() {
        let (mut repo, store) = repo();
        repo.add(NewTask::new("a")).unwrap();
        let writes = store.write_count();
        let patch = TaskPatch { title: Some("b".into()), ..TaskPatch::default() };
        assert!(repo.update(42, patch).unwrap().is_none());
        assert_eq!(store.write_count(), writes);
        assert_eq!(repo.all().len(), 1);
    }

    #[test]
    fn due_today_and_upcoming_split_on_the_clock_date() {
        let (mut repo, _) = repo();
        repo.add(NewTask::new("Buy milk").due("2024-01-01")).unwrap();
        repo.add(NewTask::new("Dentist").due("2024-01-05")).unwrap();
        repo.add(NewTask::new("Taxes").due("2023-12-31")).unwrap();

        let today: Vec<_> = repo.due_today().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(today, vec!["Buy milk"]);
        let upcoming: Vec<_> = repo.due_upcoming().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(upcoming, vec!["Dentist"]);
    }

    #[test]
    fn pending_and_completed_partition_the_list() {
        let (mut repo, _) = repo();
        let a = repo.add(NewTask::new("a")).unwrap();
        repo.add(NewTask::new("b")).unwrap();
        repo.toggle_completed(a.id).unwrap();

        let pending: Vec<_> = repo.pending().iter().map(|t| t.title.as_str()).collect();
        let completed: Vec<_> = repo.completed().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(pending, vec!["b"]);
        assert_eq!(completed, vec!["a"]);
        assert_eq!(repo.remaining_count(), 1);
        assert_eq!(repo.completion_percentage(), 50);
    }

    #[test]
    fn category_and_priority_queries_match_exactly() {
        let (mut repo, _) = repo();
        repo.add(NewTask { category: Some("work".into()), priority: Some(Priority::High), ..NewTask::new("Report") })
            .unwrap();
        repo.add(NewTask { category: Some("home".into()), priority: Some(Priority::Low), ..NewTask::new("Dishes") })
            .unwrap();
        repo.add(NewTask { category: Some("Work".into()), ..NewTask::new("Email") }).unwrap();

        let work: Vec<_> = repo.by_category("work").iter().map(|t| t.title.as_str()).collect();
        assert_eq!(work, vec!["Report"]);
        let high: Vec<_> = repo.by_priority(Priority::High).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(high, vec!["Report"]);
        let medium: Vec<_> = repo.by_priority(Priority::Medium).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(medium, vec!["Email"]);
        assert!(repo.by_category("garden").is_empty());
    }

    #[test]
    fn empty_due_date_is_neither_today_nor_upcoming() {
        let (mut repo, _) = repo();
        repo.add(NewTask::new("someday")).unwrap();
        assert!(repo.due_today().is_empty());
        assert!(repo.due_upcoming().is_empty());
    }

    #[test]
    fn upcoming_is_lexical() {
        let (mut repo, _) = repo();
        // "2024-1-5" sorts after "2024-01-01" as a string even though it is
        // not zero padded
        repo.add(NewTask::new("odd").due("2024-1-5")).unwrap();
        repo.add(NewTask::new("past").due("2023-12-31")).unwrap();
        let upcoming: Vec<_> = repo.due_upcoming().iter().map(|t| t.title.clone()).collect();
        assert_eq!(upcoming, vec!["odd".to_string()]);
    }
}
