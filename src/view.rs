//! Pure view computation: filtered task lists, dashboard aggregates, and the
//! region-addressed rendering surface they are painted onto.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::{Notification, Task, UserProfile};
use crate::tasks::{completion_percentage, is_due_today, is_upcoming};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    #[default]
    All,
    Today,
    Upcoming,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Today, Filter::Upcoming];

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Today => "today",
            Filter::Upcoming => "upcoming",
        }
    }

    /// Message shown when the filtered list is empty
    pub fn empty_state(self) -> &'static str {
        match self {
            Filter::All => "No tasks yet. Add one to get started!",
            Filter::Today => "No tasks due today. Enjoy your day!",
            Filter::Upcoming => "No upcoming tasks scheduled.",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Today,
            Filter::Today => Filter::Upcoming,
            Filter::Upcoming => Filter::All,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Filter::All => Filter::Upcoming,
            Filter::Today => Filter::All,
            Filter::Upcoming => Filter::Today,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "today" => Ok(Filter::Today),
            "upcoming" => Ok(Filter::Upcoming),
            other => Err(format!("unknown filter '{}' (expected all, today or upcoming)", other)),
        }
    }
}

pub const COMPLETED_EMPTY_STATE: &str = "No completed tasks yet.";

/// Pending tasks selected by `filter`, in stored order.
///
/// Completed tasks never appear here; they have their own view.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: Filter, today: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| !t.completed)
        .filter(|t| match filter {
            Filter::All => true,
            Filter::Today => is_due_today(t, today),
            Filter::Upcoming => is_upcoming(t, today),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub detail: String,
    pub checked: bool,
    /// False for rows whose checkbox is display-only
    pub interactive: bool,
}

impl TaskRow {
    fn from_task(task: &Task, interactive: bool) -> Self {
        let mut parts = Vec::new();
        if !task.category.is_empty() {
            parts.push(task.category.clone());
        }
        parts.push(task.priority.to_string());
        match (task.due_date.is_empty(), task.due_time.is_empty()) {
            (false, false) => parts.push(format!("due {} {}", task.due_date, task.due_time)),
            (false, true) => parts.push(format!("due {}", task.due_date)),
            _ => {}
        }
        if !task.subtasks.is_empty() {
            parts.push(format!("{} subtasks", task.subtasks.len()));
        }
        Self {
            id: task.id,
            title: task.title.clone(),
            detail: parts.join(" • "),
            checked: task.completed,
            interactive,
        }
    }

    /// One-line text form used by the CLI and the text surface
    pub fn to_line(&self) -> String {
        let check = if self.checked { "[x]" } else { "[ ]" };
        format!("{} {} ({}) #{}", check, self.title, self.detail, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub rows: Vec<TaskRow>,
    /// Set when `rows` is empty
    pub empty_message: Option<&'static str>,
}

impl ListView {
    fn new(rows: Vec<TaskRow>, empty: &'static str) -> Self {
        let empty_message = rows.is_empty().then_some(empty);
        Self { rows, empty_message }
    }

    pub fn to_text(&self) -> String {
        match self.empty_message {
            Some(msg) => msg.to_string(),
            None => self
                .rows
                .iter()
                .map(TaskRow::to_line)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

pub fn task_list_view(tasks: &[Task], filter: Filter, today: &str) -> ListView {
    let rows = filter_tasks(tasks, filter, today)
        .into_iter()
        .map(|t| TaskRow::from_task(t, true))
        .collect();
    ListView::new(rows, filter.empty_state())
}

/// Only completed tasks, checkboxes display-only
pub fn completed_view(tasks: &[Task]) -> ListView {
    let rows = tasks
        .iter()
        .filter(|t| t.completed)
        .map(|t| TaskRow::from_task(t, false))
        .collect();
    ListView::new(rows, COMPLETED_EMPTY_STATE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dashboard {
    pub total: usize,
    pub remaining: usize,
    pub completion_percentage: u32,
    pub unread: usize,
}

impl Dashboard {
    pub fn compute(tasks: &[Task], notifications: &[Notification]) -> Self {
        Self {
            total: tasks.len(),
            remaining: tasks.iter().filter(|t| !t.completed).count(),
            completion_percentage: completion_percentage(tasks),
            unread: notifications.iter().filter(|n| !n.read).count(),
        }
    }

    pub fn remaining_text(&self) -> String {
        match self.remaining {
            1 => "1 task remaining".to_string(),
            n => format!("{} tasks remaining", n),
        }
    }

    pub fn percentage_text(&self) -> String {
        format!("{}% complete", self.completion_percentage)
    }

    /// Ten-cell text progress bar
    pub fn progress_bar(&self) -> String {
        let filled = (self.completion_percentage.min(100) / 10) as usize;
        format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled))
    }
}

/// One consistent snapshot of the main list and the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub filter: Filter,
    pub list: ListView,
    pub dashboard: Dashboard,
}

impl Frame {
    pub fn compute(tasks: &[Task], notifications: &[Notification], filter: Filter, today: &str) -> Self {
        Self {
            filter,
            list: task_list_view(tasks, filter, today),
            dashboard: Dashboard::compute(tasks, notifications),
        }
    }
}

/// Named slots a surface may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    TaskList,
    Progress,
    RemainingText,
    PercentageText,
    ProfileTotal,
    ProfileCompleted,
    ProfileStreak,
    ProfileSuccessRate,
    NotificationBadge,
}

/// Anything the renderer can write into. Regions a surface does not have
/// are skipped without error.
pub trait RenderSurface {
    fn has_region(&self, region: Region) -> bool;
    fn write(&mut self, region: Region, content: String);
}

/// Surface backed by a map of the regions it was built with
#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    slots: BTreeMap<Region, Option<String>>,
}

impl RegionMap {
    pub fn with_regions(regions: impl IntoIterator<Item = Region>) -> Self {
        Self {
            slots: regions.into_iter().map(|r| (r, None)).collect(),
        }
    }

    pub fn get(&self, region: Region) -> Option<&str> {
        self.slots.get(&region).and_then(|s| s.as_deref())
    }
}

impl RenderSurface for RegionMap {
    fn has_region(&self, region: Region) -> bool {
        self.slots.contains_key(&region)
    }

    fn write(&mut self, region: Region, content: String) {
        if let Some(slot) = self.slots.get_mut(&region) {
            *slot = Some(content);
        }
    }
}

fn put(surface: &mut dyn RenderSurface, region: Region, content: impl FnOnce() -> String) {
    if surface.has_region(region) {
        surface.write(region, content());
    }
}

/// Paint `frame` (and profile stats when given) onto `surface`
pub fn paint(surface: &mut dyn RenderSurface, frame: &Frame, profile: Option<&UserProfile>) {
    let dash = &frame.dashboard;
    put(surface, Region::TaskList, || frame.list.to_text());
    put(surface, Region::Progress, || dash.progress_bar());
    put(surface, Region::RemainingText, || dash.remaining_text());
    put(surface, Region::PercentageText, || dash.percentage_text());
    put(surface, Region::NotificationBadge, || dash.unread.to_string());
    if let Some(user) = profile {
        put(surface, Region::ProfileTotal, || user.total_tasks.to_string());
        put(surface, Region::ProfileCompleted, || user.completed_tasks.to_string());
        put(surface, Region::ProfileStreak, || user.streak.to_string());
        put(surface, Region::ProfileSuccessRate, || format!("{}%", user.success_rate));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn task(id: i64, title: &str, due: &str, completed: bool) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            category: String::new(),
            priority: Priority::Medium,
            due_date: due.to_string(),
            due_time: String::new(),
            reminder: "none".to_string(),
            repeat: "none".to_string(),
            completed,
            subtasks: Vec::new(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn main_list_excludes_completed() {
        let tasks = vec![
            task(1, "open", "2024-01-01", false),
            task(2, "done", "2024-01-01", true),
        ];
        for filter in Filter::ALL {
            let ids: Vec<i64> = filter_tasks(&tasks, filter, "2024-01-01").iter().map(|t| t.id).collect();
            assert!(!ids.contains(&2), "{} showed a completed task", filter);
        }
    }

    #[test]
    fn each_filter_has_its_own_empty_state() {
        let messages: Vec<_> = Filter::ALL
            .iter()
            .map(|f| task_list_view(&[], *f, "2024-01-01").empty_message.unwrap())
            .collect();
        assert_ne!(messages[0], messages[1]);
        assert_ne!(messages[1], messages[2]);
        assert_ne!(messages[0], messages[2]);
    }

    #[test]
    fn completed_view_rows_are_display_only() {
        let tasks = vec![task(1, "a", "", true), task(2, "b", "", false)];
        let view = completed_view(&tasks);
        assert_eq!(view.rows.len(), 1);
        assert!(view.rows[0].checked);
        assert!(!view.rows[0].interactive);
    }

    #[test]
    fn missing_regions_are_skipped() {
        let tasks = vec![task(1, "a", "", false), task(2, "b", "", true)];
        let frame = Frame::compute(&tasks, &[], Filter::All, "2024-01-01");
        let mut surface = RegionMap::with_regions([Region::PercentageText]);
        paint(&mut surface, &frame, None);
        assert_eq!(surface.get(Region::PercentageText), Some("50% complete"));
        assert_eq!(surface.get(Region::TaskList), None);
    }

    #[test]
    fn progress_bar_tracks_percentage() {
        let dash = Dashboard { completion_percentage: 33, ..Dashboard::default() };
        assert_eq!(dash.progress_bar(), "[###.......]");
        assert_eq!(Dashboard { remaining: 1, ..dash }.remaining_text(), "1 task remaining");
    }

    #[test]
    fn filter_cycles() {
        assert_eq!(Filter::All.next().next().next(), Filter::All);
        assert_eq!(Filter::All.previous(), Filter::Upcoming);
        assert_eq!("Today".parse::<Filter>().unwrap(), Filter::Today);
    }
}
