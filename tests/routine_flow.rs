use daily_routine::routine::Routine;
use daily_routine::settings::{SettingKey, SettingValue, SettingsChange};
use daily_routine::store::{KeyValueStore, TASKS_KEY};
use daily_routine::view::Filter;
use daily_routine::{FixedClock, MemoryStore, NewTask, NotificationKind, TaskPatch, UserPatch};
use std::rc::Rc;

fn open() -> (Rc<MemoryStore>, Routine) {
    let store = Rc::new(MemoryStore::new());
    let clock = Rc::new(FixedClock::on_date("2024-01-01").unwrap());
    let routine = Routine::open(store.clone(), clock).unwrap();
    (store, routine)
}

#[test]
fn add_then_delete_restores_count() {
    let (_store, mut routine) = open();
    routine.add_task(NewTask::new("Existing")).unwrap();
    let before = routine.tasks.all().len();

    let task = routine.add_task(NewTask::new("Temporary")).unwrap();
    assert_eq!(routine.tasks.all().len(), before + 1);

    let update = routine.delete_task(task.id, Filter::All).unwrap();
    assert!(update.result);
    assert_eq!(routine.tasks.all().len(), before);
    assert_eq!(update.frame.dashboard.total, before);
}

#[test]
fn toggling_twice_restores_completion() {
    let (_store, mut routine) = open();
    let task = routine.add_task(NewTask::new("Meditate")).unwrap();

    let first = routine.toggle_task(task.id, Filter::All).unwrap();
    assert_eq!(first.result.map(|t| t.completed), Some(true));
    let second = routine.toggle_task(task.id, Filter::All).unwrap();
    assert_eq!(second.result.map(|t| t.completed), Some(false));
    assert_eq!(routine.tasks.get(task.id).map(|t| t.completed), Some(false));
}

#[test]
fn ids_stay_unique_when_added_in_the_same_millisecond() {
    let (_store, mut routine) = open();
    let a = routine.add_task(NewTask::new("One")).unwrap();
    let b = routine.add_task(NewTask::new("Two")).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn empty_repository_reports_zero_percent() {
    let (_store, routine) = open();
    let frame = routine.frame(Filter::All);
    assert_eq!(frame.dashboard.completion_percentage, 0);
    assert_eq!(frame.dashboard.remaining_text(), "0 tasks remaining");
    assert_eq!(frame.list.empty_message, Some("No tasks yet. Add one to get started!"));
}

#[test]
fn today_and_upcoming_views_split_by_due_date() {
    let (_store, mut routine) = open();
    routine.add_task(NewTask::new("Due today").due("2024-01-01")).unwrap();
    routine.add_task(NewTask::new("Due later").due("2024-01-05")).unwrap();
    routine.add_task(NewTask::new("Overdue").due("2023-12-31")).unwrap();
    routine.add_task(NewTask::new("Someday")).unwrap();

    let today = routine.frame(Filter::Today);
    let titles: Vec<_> = today.list.rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Due today"]);

    let upcoming = routine.frame(Filter::Upcoming);
    let titles: Vec<_> = upcoming.list.rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Due later"]);

    assert_eq!(routine.frame(Filter::All).list.rows.len(), 4);

    let today: Vec<_> = routine.tasks.due_today().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(today, vec!["Due today"]);
    let upcoming: Vec<_> = routine.tasks.due_upcoming().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(upcoming, vec!["Due later"]);
}

#[test]
fn completed_tasks_leave_the_main_list_but_not_the_dashboard() {
    let (_store, mut routine) = open();
    let done = routine.add_task(NewTask::new("Done").due("2024-01-01")).unwrap();
    routine.add_task(NewTask::new("Open")).unwrap();
    routine.add_task(NewTask::new("Also open")).unwrap();

    let update = routine.toggle_task(done.id, Filter::Today).unwrap();
    assert!(update.frame.list.rows.is_empty());
    assert_eq!(update.frame.list.empty_message, Some("No tasks due today. Enjoy your day!"));
    assert_eq!(update.frame.dashboard.completion_percentage, 33);
    assert_eq!(update.frame.dashboard.remaining, 2);

    let completed = routine.completed_view();
    assert_eq!(completed.rows.len(), 1);
    assert!(completed.rows[0].checked);
    assert!(!completed.rows[0].interactive);
}

#[test]
fn upcoming_empty_state() {
    let (_store, routine) = open();
    let frame = routine.frame(Filter::Upcoming);
    assert_eq!(frame.list.empty_message, Some("No upcoming tasks scheduled."));
}

#[test]
fn updating_a_missing_task_writes_nothing() {
    let (store, mut routine) = open();
    let writes = store.write_count();
    let patch = TaskPatch { title: Some("Ghost".to_string()), ..TaskPatch::default() };
    assert!(routine.update_task(404, patch).unwrap().is_none());
    assert_eq!(store.write_count(), writes);
    assert!(routine.notifications.history().is_empty());
}

#[test]
fn history_keeps_the_newest_fifty() {
    let (_store, mut routine) = open();
    for i in 1..=51 {
        routine.notifications.record(format!("n{}", i), NotificationKind::Info).unwrap();
    }
    let history = routine.notifications.history();
    assert_eq!(history.len(), 50);
    assert_eq!(history[0].message, "n51");
    assert_eq!(history[49].message, "n2");
}

#[test]
fn mark_all_read_is_idempotent() {
    let (store, mut routine) = open();
    routine.add_task(NewTask::new("Walk")).unwrap();
    routine.add_task(NewTask::new("Cook")).unwrap();
    assert_eq!(routine.notifications.unread_count(), 2);

    routine.notifications.mark_all_read().unwrap();
    assert_eq!(routine.notifications.unread_count(), 0);
    let writes = store.write_count();
    routine.notifications.mark_all_read().unwrap();
    assert_eq!(store.write_count(), writes);
    assert!(routine.notifications.history().iter().all(|n| n.read));
}

#[test]
fn actions_record_toasts_in_history() {
    let (_store, mut routine) = open();
    let task = routine.add_task(NewTask::new("Stretch")).unwrap();
    routine.toggle_task(task.id, Filter::All).unwrap();
    routine.toggle_task(task.id, Filter::All).unwrap();
    routine.delete_task(task.id, Filter::All).unwrap();

    let messages: Vec<_> = routine.notifications.history().iter().map(|n| n.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Task deleted", "Task marked as pending", "Task completed! Great job!", "Task added successfully!"]
    );
    assert_eq!(routine.notifications.toasts().len(), 4);
}

#[test]
fn settings_start_with_all_ten_defaults() {
    let (_store, routine) = open();
    let json = serde_json::to_value(routine.settings.get_all()).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 10);
    assert_eq!(object["theme"], "light");
    assert_eq!(object["sortBy"], "dueDate");
    assert_eq!(object["pushNotifications"], true);
    assert_eq!(object["darkMode"], false);
}

#[test]
fn dark_mode_setting_reports_a_change() {
    let (_store, mut routine) = open();
    let change = routine.set_setting(SettingKey::DarkMode, SettingValue::Bool(true)).unwrap();
    assert_eq!(change, Some(SettingsChange::DarkMode(true)));
    assert!(routine.settings.get_all().dark_mode);

    let change = routine.set_setting(SettingKey::SortBy, SettingValue::Text("priority".into())).unwrap();
    assert_eq!(change, None);
}

#[test]
fn profile_update_and_stats() {
    let (_store, mut routine) = open();
    assert_eq!(routine.profile.get().name, "User");
    assert_eq!(routine.profile.get().join_date, "2024-01-01");

    let user = routine
        .update_profile(UserPatch { name: Some("Sam".into()), ..UserPatch::default() })
        .unwrap();
    assert_eq!(user.name, "Sam");

    let task = routine.add_task(NewTask::new("Plan week")).unwrap();
    routine.add_task(NewTask::new("Shop")).unwrap();
    routine.toggle_task(task.id, Filter::All).unwrap();
    let user = routine.refresh_profile().unwrap();
    assert_eq!(user.total_tasks, 2);
    assert_eq!(user.completed_tasks, 1);
}

#[test]
fn malformed_task_record_loads_as_empty() {
    let store = Rc::new(MemoryStore::new());
    store.set(TASKS_KEY, "{not json").unwrap();
    let clock = Rc::new(FixedClock::on_date("2024-01-01").unwrap());
    let routine = Routine::open(store, clock).unwrap();
    assert!(routine.tasks.all().is_empty());
}

#[test]
fn declined_clear_changes_nothing() {
    let (store, mut routine) = open();
    routine.session().login().unwrap();
    routine.add_task(NewTask::new("Keep me")).unwrap();
    let writes = store.write_count();

    assert!(!routine.clear_all(false).unwrap());
    assert_eq!(routine.tasks.all().len(), 1);
    assert_eq!(store.write_count(), writes);
    assert!(routine.session().is_active().unwrap());
}

#[test]
fn confirmed_clear_resets_everything_and_ends_the_session() {
    let (_store, mut routine) = open();
    routine.session().login().unwrap();
    routine.add_task(NewTask::new("Gone soon")).unwrap();
    routine.set_setting(SettingKey::Theme, SettingValue::Text("dark".into())).unwrap();

    assert!(routine.clear_all(true).unwrap());
    assert!(routine.tasks.all().is_empty());
    assert!(routine.notifications.history().is_empty());
    assert_eq!(routine.settings.get_all().theme, "light");
    assert_eq!(routine.profile.get().name, "User");
    assert!(!routine.session().is_active().unwrap());
}
