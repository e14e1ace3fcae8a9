use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}' (expected low, medium or high)", other)),
        }
    }
}

fn default_none() -> String {
    "none".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: String, // YYYY-MM-DD or empty
    #[serde(default)]
    pub due_time: String, // HH:MM or empty
    #[serde(default = "default_none")]
    pub reminder: String,
    #[serde(default = "default_none")]
    pub repeat: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub subtasks: Vec<String>,
    pub created_at: String,
}

/// Input for `TaskRepository::add`; only `title` is required
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub reminder: Option<String>,
    pub repeat: Option<String>,
    pub subtasks: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn due(mut self, date: impl Into<String>) -> Self {
        self.due_date = Some(date.into());
        self
    }
}

/// Partial update merged by `TaskRepository::update`.
///
/// `id`, `created_at` and `completed` are deliberately absent: the first two
/// are immutable and completion only changes through toggling.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub reminder: Option<String>,
    pub repeat: Option<String>,
    pub subtasks: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.due_time.is_none()
            && self.reminder.is_none()
            && self.repeat.is_none()
            && self.subtasks.is_none()
    }

    pub(crate) fn apply(self, task: &mut Task) {
        if let Some(v) = self.title { task.title = v; }
        if let Some(v) = self.description { task.description = v; }
        if let Some(v) = self.category { task.category = v; }
        if let Some(v) = self.priority { task.priority = v; }
        if let Some(v) = self.due_date { task.due_date = v; }
        if let Some(v) = self.due_time { task.due_time = v; }
        if let Some(v) = self.reminder { task.reminder = v; }
        if let Some(v) = self.repeat { task.repeat = v; }
        if let Some(v) = self.subtasks { task.subtasks = v; }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: String,
    pub join_date: String, // YYYY-MM-DD
    #[serde(default)]
    pub total_tasks: usize,
    #[serde(default)]
    pub completed_tasks: usize,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub success_rate: u32,
}

impl UserProfile {
    pub fn new(join_date: String) -> Self {
        Self {
            name: "User".to_string(),
            email: String::new(),
            avatar: String::new(),
            join_date,
            total_tasks: 0,
            completed_tasks: 0,
            streak: 0,
            success_rate: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub streak: Option<u32>,
    pub success_rate: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
/// Stored type names outside the known four load as `Info`.
#[serde(rename_all = "lowercase", from = "String")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

/// Color name and glyph used to draw a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindStyle {
    pub color: &'static str,
    pub glyph: &'static str,
}

impl From<String> for NotificationKind {
    fn from(s: String) -> Self {
        NotificationKind::parse_lossy(&s)
    }
}

impl NotificationKind {
    /// Map a type name to a kind; anything unrecognized is `Info`
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "success" => NotificationKind::Success,
            "error" => NotificationKind::Error,
            "warning" => NotificationKind::Warning,
            _ => NotificationKind::Info,
        }
    }

    pub fn style(self) -> KindStyle {
        match self {
            NotificationKind::Success => KindStyle { color: "green", glyph: "✓" },
            NotificationKind::Error => KindStyle { color: "red", glyph: "✗" },
            NotificationKind::Warning => KindStyle { color: "yellow", glyph: "⚠" },
            NotificationKind::Info => KindStyle { color: "blue", glyph: "ℹ" },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_json_uses_camel_case_and_defaults() {
        let task: Task = serde_json::from_str(
            r#"{"id":1,"title":"Buy milk","dueDate":"2024-01-01","createdAt":"2024-01-01T08:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.reminder, "none");
        assert_eq!(task.repeat, "none");
        assert!(!task.completed);

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2024-01-01");
        assert_eq!(json["dueTime"], "");
        assert_eq!(json["createdAt"], "2024-01-01T08:00:00Z");
    }

    #[test]
    fn unknown_notification_type_falls_back_to_info() {
        assert_eq!(NotificationKind::parse_lossy("celebration"), NotificationKind::Info);
        assert_eq!(NotificationKind::parse_lossy("Error"), NotificationKind::Error);
        assert_eq!(NotificationKind::parse_lossy("nope").style().glyph, "ℹ");

        let stored: Notification = serde_json::from_str(
            r#"{"id":1,"message":"Party","type":"celebration","timestamp":"2024-01-01T12:00:00+00:00","read":false}"#,
        )
        .unwrap();
        assert_eq!(stored.kind, NotificationKind::Info);
        assert_eq!(serde_json::to_value(&stored).unwrap()["type"], "info");
    }

    #[test]
    fn styles_are_distinct_per_kind() {
        let kinds = [
            NotificationKind::Success,
            NotificationKind::Error,
            NotificationKind::Warning,
            NotificationKind::Info,
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a.style().color, b.style().color);
                assert_ne!(a.style().glyph, b.style().glyph);
            }
        }
    }
}
