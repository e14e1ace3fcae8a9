use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use ratatui::widgets::ListState;

use crate::config::{Config, Theme};
use crate::models::{NewTask, Priority};
use crate::routine::Routine;
use crate::settings::{SettingKey, SettingValue, SettingsChange};
use crate::store::StoreError;
use crate::view::{Filter, Frame, ListView, TaskRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Tasks(Filter),
    Completed,
    Notifications,
}

impl Tab {
    pub const ORDER: [Tab; 5] = [
        Tab::Tasks(Filter::All),
        Tab::Tasks(Filter::Today),
        Tab::Tasks(Filter::Upcoming),
        Tab::Completed,
        Tab::Notifications,
    ];

    pub fn index(self) -> usize {
        Tab::ORDER.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Tab::ORDER[(self.index() + 1) % Tab::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        Tab::ORDER[(self.index() + Tab::ORDER.len() - 1) % Tab::ORDER.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Tasks(Filter::All) => "All",
            Tab::Tasks(Filter::Today) => "Today",
            Tab::Tasks(Filter::Upcoming) => "Upcoming",
            Tab::Completed => "Completed",
            Tab::Notifications => "Notifications",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    View,
    Adding,
    Help,
    ConfirmDelete(i64),
    ConfirmClear,
}

/// Row layout driven by the `fontSize` setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListDensity {
    Compact,
    Normal,
    Spacious,
}

impl ListDensity {
    fn from_font_size(size: &str) -> Self {
        match size {
            "small" => ListDensity::Compact,
            "large" => ListDensity::Spacious,
            _ => ListDensity::Normal,
        }
    }
}

pub struct App {
    pub config: Config,
    pub routine: Routine,

    pub tab: Tab,
    pub mode: Mode,
    pub list_state: ListState,
    pub input_buffer: String,
    /// Latest main-list snapshot; replaced whole after every mutation
    pub frame: Frame,

    pub theme: Theme,
    pub density: ListDensity,
    pub badge: Rc<Cell<usize>>,

    pub status_message: Option<String>,
    pub status_time: Option<Instant>,
    pub quit_requested: bool,
}

impl App {
    pub fn new(config: Config, mut routine: Routine) -> Self {
        let badge = Rc::new(Cell::new(routine.notifications.unread_count()));
        let sink = badge.clone();
        routine.notifications.set_badge_listener(move |unread| sink.set(unread));

        let frame = routine.frame(Filter::All);
        let settings = routine.settings.get_all().clone();
        let theme_name = if settings.dark_mode { "dark" } else { settings.theme.as_str() };
        let theme = config.resolve_theme(theme_name);

        let mut app = Self {
            config,
            routine,
            tab: Tab::Tasks(Filter::All),
            mode: Mode::View,
            list_state: ListState::default(),
            input_buffer: String::new(),
            frame,
            theme,
            density: ListDensity::from_font_size(&settings.font_size),
            badge,
            status_message: None,
            status_time: None,
            quit_requested: false,
        };
        app.sync_list_state();
        app
    }

    /// React to a presentation change coming out of the settings store
    pub fn apply_settings_change(&mut self, change: SettingsChange) {
        match change {
            SettingsChange::Theme(_) | SettingsChange::DarkMode(_) => {
                let settings = self.routine.settings.get_all();
                let name = if settings.dark_mode { "dark" } else { settings.theme.as_str() };
                self.theme = self.config.resolve_theme(name);
            }
            SettingsChange::FontSize(size) => {
                self.density = ListDensity::from_font_size(&size);
            }
        }
    }

    /// Rows of the list on the current tab
    pub fn current_view(&self) -> ListView {
        match self.tab {
            Tab::Tasks(_) => self.frame.list.clone(),
            Tab::Completed => self.routine.completed_view(),
            Tab::Notifications => ListView { rows: Vec::new(), empty_message: None },
        }
    }

    fn current_len(&self) -> usize {
        match self.tab {
            Tab::Notifications => self.routine.notifications.history().len(),
            _ => self.current_view().rows.len(),
        }
    }

    pub fn selected_row(&self) -> Option<TaskRow> {
        let index = self.list_state.selected()?;
        self.current_view().rows.into_iter().nth(index)
    }

    fn filter(&self) -> Filter {
        match self.tab {
            Tab::Tasks(filter) => filter,
            _ => self.frame.filter,
        }
    }

    pub fn refresh(&mut self) {
        self.frame = self.routine.frame(self.filter());
        self.sync_list_state();
    }

    /// Keep the selection inside the current list
    pub fn sync_list_state(&mut self) {
        let len = self.current_len();
        let selected = match (self.list_state.selected(), len) {
            (_, 0) => None,
            (Some(i), n) => Some(i.min(n - 1)),
            (None, _) => Some(0),
        };
        self.list_state.select(selected);
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.list_state.select(None);
        self.refresh();
    }

    pub fn move_selection_up(&mut self) {
        if let Some(i) = self.list_state.selected() {
            self.list_state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn move_selection_down(&mut self) {
        let len = self.current_len();
        if let Some(i) = self.list_state.selected() {
            if i + 1 < len {
                self.list_state.select(Some(i + 1));
            }
        }
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_time = Some(Instant::now());
    }

    /// Advance toast timers and clear stale status messages
    pub fn tick(&mut self, now: Instant) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;
        self.routine.tick(now);
        if let Some(time) = self.status_time {
            if now.saturating_duration_since(time).as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Toggle the selected task; list and dashboard come back together
    pub fn toggle_selected(&mut self) -> Result<(), StoreError> {
        let Some(row) = self.selected_row() else {
            return Ok(());
        };
        if !row.interactive {
            return Ok(());
        }
        let update = self.routine.toggle_task(row.id, self.filter())?;
        self.frame = update.frame;
        self.sync_list_state();
        Ok(())
    }

    pub fn request_delete(&mut self) {
        if let Some(row) = self.selected_row() {
            self.mode = Mode::ConfirmDelete(row.id);
        }
    }

    pub fn confirm_delete(&mut self, id: i64) -> Result<(), StoreError> {
        let update = self.routine.delete_task(id, self.filter())?;
        self.frame = update.frame;
        self.mode = Mode::View;
        self.sync_list_state();
        Ok(())
    }

    pub fn start_add(&mut self) {
        self.input_buffer.clear();
        self.mode = Mode::Adding;
    }

    /// Add a task from the quick-add line; blank input is ignored
    pub fn submit_add(&mut self) -> Result<(), StoreError> {
        let input = std::mem::take(&mut self.input_buffer);
        self.mode = Mode::View;
        match parse_quick_add(&input) {
            Some(data) => {
                self.routine.add_task(data)?;
                self.refresh();
            }
            None => self.set_status_message("Task title cannot be empty".to_string()),
        }
        Ok(())
    }

    pub fn mark_all_read(&mut self) -> Result<(), StoreError> {
        self.routine.notifications.mark_all_read()?;
        self.refresh();
        Ok(())
    }

    pub fn toggle_dark_mode(&mut self) {
        let dark = !self.routine.settings.get_all().dark_mode;
        match self.routine.set_setting(SettingKey::DarkMode, SettingValue::Bool(dark)) {
            Ok(Some(change)) => self.apply_settings_change(change),
            Ok(None) => {}
            Err(e) => self.set_status_message(format!("Failed to save setting: {}", e)),
        }
        self.refresh();
    }

    pub fn export(&mut self) {
        match self.routine.export_to(std::path::Path::new(".")) {
            Ok(path) => self.set_status_message(format!("Exported to {}", path.display())),
            Err(e) => self.set_status_message(format!("Export failed: {}", e)),
        }
        self.refresh();
    }

    /// Wipe everything; the session flag goes too, so the UI closes
    pub fn confirm_clear(&mut self) -> Result<(), StoreError> {
        self.mode = Mode::View;
        if self.routine.clear_all(true)? {
            self.quit_requested = true;
        }
        Ok(())
    }
}

/// Parse the quick-add line: a title followed by optional tokens
/// `@YYYY-MM-DD`, `@@HH:MM`, `!low|!medium|!high` and `#category`.
/// Returns `None` when no title remains.
pub fn parse_quick_add(input: &str) -> Option<NewTask> {
    let mut data = NewTask::default();
    let mut title = Vec::new();
    for word in input.split_whitespace() {
        if let Some(time) = word.strip_prefix("@@") {
            data.due_time = Some(time.to_string());
        } else if let Some(date) = word.strip_prefix('@') {
            data.due_date = Some(date.to_string());
        } else if let Some(priority) = word.strip_prefix('!').and_then(|p| p.parse::<Priority>().ok()) {
            data.priority = Some(priority);
        } else if let Some(category) = word.strip_prefix('#').filter(|c| !c.is_empty()) {
            data.category = Some(category.to_string());
        } else {
            title.push(word);
        }
    }
    if title.is_empty() {
        return None;
    }
    data.title = title.join(" ");
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_add_extracts_tokens() {
        let data = parse_quick_add("Buy milk @2024-01-01 @@09:30 !high #errands").unwrap();
        assert_eq!(data.title, "Buy milk");
        assert_eq!(data.due_date.as_deref(), Some("2024-01-01"));
        assert_eq!(data.due_time.as_deref(), Some("09:30"));
        assert_eq!(data.priority, Some(Priority::High));
        assert_eq!(data.category.as_deref(), Some("errands"));
    }

    #[test]
    fn quick_add_keeps_unknown_bang_words_in_title() {
        let data = parse_quick_add("Ship it !now").unwrap();
        assert_eq!(data.title, "Ship it !now");
        assert!(parse_quick_add("  @2024-01-01 ").is_none());
    }

    #[test]
    fn tabs_cycle_in_both_directions() {
        assert_eq!(Tab::Notifications.next(), Tab::Tasks(Filter::All));
        assert_eq!(Tab::Tasks(Filter::All).previous(), Tab::Notifications);
        assert_eq!(Tab::Completed.index(), 3);
    }
}
