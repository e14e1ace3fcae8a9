use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

use crate::backup::BackupError;
use crate::models::{NewTask, NotificationKind, Priority, TaskPatch, UserPatch};
use crate::routine::Routine;
use crate::settings::{SettingKey, SettingValue, SettingsError};
use crate::store::{KeyValueStore, MemoryStore, SESSION_KEY, SqliteStore, StoreError};
use crate::utils::parse_date;
use crate::view::{self, Filter, ListView, Region, RegionMap};

#[derive(Parser)]
#[command(name = "routine")]
#[command(about = "Daily Routine - a local daily task manager")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (uses separate dev config/store)
    #[arg(long)]
    pub dev: bool,

    /// Keep everything in memory for this run; nothing touches disk
    #[arg(long)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Start a session
    Login {
        /// Display name stored on the profile
        #[arg(long)]
        name: Option<String>,
    },
    /// End the session
    Logout,
    /// Add a new task
    Add {
        /// Task title
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
        /// Due time (HH:MM)
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        reminder: Option<String>,
        #[arg(long)]
        repeat: Option<String>,
        /// Subtask, repeatable
        #[arg(short, long = "subtask")]
        subtasks: Vec<String>,
    },
    /// Edit fields of an existing task
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        due: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long)]
        reminder: Option<String>,
        #[arg(long)]
        repeat: Option<String>,
    },
    /// List pending tasks
    List {
        /// all, today or upcoming
        #[arg(short, long, default_value = "all")]
        filter: Filter,
        /// Only tasks in this category
        #[arg(long)]
        category: Option<String>,
        /// Only tasks with this priority
        #[arg(short, long)]
        priority: Option<Priority>,
    },
    /// List completed tasks
    Completed,
    /// Toggle a task between pending and completed
    Toggle { id: i64 },
    /// Delete a task
    Delete { id: i64 },
    /// Show progress, remaining count and unread notifications
    Dashboard,
    /// Read or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Show or edit the user profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Notification history
    Notifications {
        #[command(subcommand)]
        command: Option<NotificationCommands>,
    },
    /// Export tasks, settings and profile to a JSON backup
    Export {
        /// Target directory (defaults to the current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Delete all data
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print every setting
    List,
    /// Print one setting
    Get { key: String },
    /// Change one setting
    Set { key: String, value: String },
    /// Restore defaults
    Reset,
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Print the profile with refreshed task counts
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// Print history, newest first
    List,
    /// Mark one notification read
    Read { id: i64 },
    /// Mark every notification read
    ReadAll,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error(transparent)]
    SettingsError(#[from] SettingsError),
    #[error("Backup error: {0}")]
    BackupError(#[from] BackupError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("Store path contains invalid UTF-8: {0}")]
    PathError(String),
    #[error("Not logged in. Run `routine login` first.")]
    NotLoggedIn,
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl Commands {
    /// Everything except `login` sits behind the session flag
    pub fn requires_session(&self) -> bool {
        !matches!(self, Commands::Login { .. })
    }
}

fn validate_due(due: Option<String>) -> Result<Option<String>, CliError> {
    match due {
        Some(d) => {
            parse_date(&d)
                .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", d, e)))?;
            Ok(Some(d))
        }
        None => Ok(None),
    }
}

fn validate_time(time: Option<String>) -> Result<Option<String>, CliError> {
    match time {
        Some(t) => {
            chrono::NaiveTime::parse_from_str(&t, "%H:%M")
                .map_err(|e| CliError::TimeParseError(format!("Invalid time format '{}': {}", t, e)))?;
            Ok(Some(t))
        }
        None => Ok(None),
    }
}

/// Open the store for this run: in memory and already logged in when
/// `ephemeral`, otherwise the SQLite file at `db_path`
pub fn open_store(ephemeral: bool, db_path: &Path) -> Result<Rc<dyn KeyValueStore>, CliError> {
    if ephemeral {
        let store = MemoryStore::new();
        store.set(SESSION_KEY, "true")?;
        log::info!("event=store_open kind=memory");
        return Ok(Rc::new(store));
    }
    let path = db_path
        .to_str()
        .ok_or_else(|| CliError::PathError(db_path.display().to_string()))?;
    let store = SqliteStore::new(path)?;
    log::info!("event=store_open kind=sqlite path={}", path);
    Ok(Rc::new(store))
}

/// Fail with `NotLoggedIn` unless the session flag is present
pub fn ensure_session(routine: &Routine) -> Result<(), CliError> {
    if routine.session().is_active()? {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}

pub fn handle_login(name: Option<String>, routine: &mut Routine) -> Result<(), CliError> {
    routine.session().login()?;
    if let Some(name) = name {
        routine.profile.update(UserPatch { name: Some(name), ..UserPatch::default() })?;
    }
    routine
        .notifications
        .record(format!("Welcome back, {}!", routine.profile.get().name), NotificationKind::Info)?;
    println!("Logged in as {}", routine.profile.get().name);
    Ok(())
}

pub fn handle_logout(routine: &Routine) -> Result<(), CliError> {
    routine.session().logout()?;
    println!("Logged out");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_add(
    title: String,
    description: Option<String>,
    category: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    time: Option<String>,
    reminder: Option<String>,
    repeat: Option<String>,
    subtasks: Vec<String>,
    routine: &mut Routine,
) -> Result<(), CliError> {
    let data = NewTask {
        title,
        description,
        category,
        priority,
        due_date: validate_due(due)?,
        due_time: validate_time(time)?,
        reminder,
        repeat,
        subtasks,
    };
    let task = routine.add_task(data)?;
    println!("Task created successfully (ID: {})", task.id);
    Ok(())
}

pub fn handle_edit(id: i64, patch: TaskPatch, routine: &mut Routine) -> Result<(), CliError> {
    let patch = TaskPatch {
        due_date: validate_due(patch.due_date)?,
        due_time: validate_time(patch.due_time)?,
        ..patch
    };
    match routine.update_task(id, patch)? {
        Some(task) => println!("Task {} updated: {}", task.id, task.title),
        None => eprintln!("Task {} not found.", id),
    }
    Ok(())
}

/// The filtered main list, narrowed to `category` and `priority` when given
pub fn list_view(
    routine: &Routine,
    filter: Filter,
    category: Option<&str>,
    priority: Option<Priority>,
) -> ListView {
    let in_category: Option<Vec<i64>> =
        category.map(|c| routine.tasks.by_category(c).iter().map(|t| t.id).collect());
    let with_priority: Option<Vec<i64>> =
        priority.map(|p| routine.tasks.by_priority(p).iter().map(|t| t.id).collect());

    let mut list = routine.frame(filter).list;
    list.rows.retain(|row| {
        in_category.as_ref().is_none_or(|ids| ids.contains(&row.id))
            && with_priority.as_ref().is_none_or(|ids| ids.contains(&row.id))
    });
    list.empty_message = list.rows.is_empty().then_some(filter.empty_state());
    list
}

pub fn handle_list(
    filter: Filter,
    category: Option<String>,
    priority: Option<Priority>,
    routine: &Routine,
) -> Result<(), CliError> {
    println!("{}", list_view(routine, filter, category.as_deref(), priority).to_text());
    Ok(())
}

pub fn handle_completed(routine: &Routine) -> Result<(), CliError> {
    println!("{}", routine.completed_view().to_text());
    Ok(())
}

pub fn handle_toggle(id: i64, routine: &mut Routine) -> Result<(), CliError> {
    let update = routine.toggle_task(id, Filter::All)?;
    match update.result {
        Some(task) => {
            let state = if task.completed { "completed" } else { "pending" };
            println!("Task {} marked as {}", task.id, state);
            println!(
                "{} {}",
                update.frame.dashboard.remaining_text(),
                update.frame.dashboard.percentage_text()
            );
        }
        None => eprintln!("Task {} not found.", id),
    }
    Ok(())
}

pub fn handle_delete(id: i64, routine: &mut Routine) -> Result<(), CliError> {
    let update = routine.delete_task(id, Filter::All)?;
    if update.result {
        println!("Task {} deleted. {}", id, update.frame.dashboard.remaining_text());
    } else {
        eprintln!("Task {} not found.", id);
    }
    Ok(())
}

pub fn handle_dashboard(routine: &mut Routine) -> Result<(), CliError> {
    routine.refresh_profile()?;
    let frame = routine.frame(Filter::All);
    let mut surface = RegionMap::with_regions([
        Region::Progress,
        Region::PercentageText,
        Region::RemainingText,
        Region::NotificationBadge,
        Region::ProfileTotal,
        Region::ProfileCompleted,
        Region::ProfileStreak,
    ]);
    view::paint(&mut surface, &frame, Some(routine.profile.get()));
    let slot = |r| surface.get(r).unwrap_or_default().to_string();
    println!("Progress     {} {}", slot(Region::Progress), slot(Region::PercentageText));
    println!("Remaining    {}", slot(Region::RemainingText));
    println!("Unread       {}", slot(Region::NotificationBadge));
    println!(
        "Profile      {} total, {} completed, {} day streak",
        slot(Region::ProfileTotal),
        slot(Region::ProfileCompleted),
        slot(Region::ProfileStreak)
    );
    Ok(())
}

pub fn handle_settings(command: SettingsCommands, routine: &mut Routine) -> Result<(), CliError> {
    match command {
        SettingsCommands::List => {
            for key in SettingKey::ALL {
                println!("{} = {}", key, routine.settings.get(key));
            }
        }
        SettingsCommands::Get { key } => {
            let key: SettingKey = key.parse()?;
            println!("{}", routine.settings.get(key));
        }
        SettingsCommands::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let value = SettingValue::parse_for(key, &value)?;
            routine.set_setting(key, value)?;
            println!("{} = {}", key, routine.settings.get(key));
        }
        SettingsCommands::Reset => {
            routine.settings.reset()?;
            println!("Settings restored to defaults");
        }
    }
    Ok(())
}

pub fn handle_profile(command: Option<ProfileCommands>, routine: &mut Routine) -> Result<(), CliError> {
    match command.unwrap_or(ProfileCommands::Show) {
        ProfileCommands::Show => {
            let user = routine.refresh_profile()?;
            println!("Name:          {}", user.name);
            println!("Email:         {}", user.email);
            println!("Joined:        {}", user.join_date);
            println!("Total tasks:   {}", user.total_tasks);
            println!("Completed:     {}", user.completed_tasks);
            println!("Streak:        {}", user.streak);
            println!("Success rate:  {}%", user.success_rate);
        }
        ProfileCommands::Update { name, email, avatar } => {
            let user = routine.update_profile(UserPatch { name, email, avatar, ..UserPatch::default() })?;
            println!("Profile updated for {}", user.name);
        }
    }
    Ok(())
}

pub fn handle_notifications(command: Option<NotificationCommands>, routine: &mut Routine) -> Result<(), CliError> {
    match command.unwrap_or(NotificationCommands::List) {
        NotificationCommands::List => {
            let history = routine.notifications.history();
            if history.is_empty() {
                println!("No notifications");
            }
            for n in history {
                let marker = if n.read { " " } else { "*" };
                println!("{} {} {} {}  #{}", marker, n.kind.style().glyph, n.timestamp, n.message, n.id);
            }
        }
        NotificationCommands::Read { id } => {
            if !routine.notifications.mark_read(id)? {
                eprintln!("Notification {} not found or already read.", id);
            }
        }
        NotificationCommands::ReadAll => {
            routine.notifications.mark_all_read()?;
            println!("All notifications marked as read");
        }
    }
    Ok(())
}

pub fn handle_export(dir: Option<PathBuf>, routine: &mut Routine) -> Result<(), CliError> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let path = routine.export_to(&dir)?;
    println!("Exported to {}", path.display());
    Ok(())
}

/// Ask before wiping unless `force`; anything but "y" aborts
pub fn handle_clear(force: bool, routine: &mut Routine, input: &mut dyn BufRead) -> Result<(), CliError> {
    let confirmed = if force {
        true
    } else {
        print!("Are you sure you want to delete all data? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        answer.trim().eq_ignore_ascii_case("y")
    };

    if routine.clear_all(confirmed)? {
        println!("All data cleared. Run `routine login` to start again.");
    } else {
        println!("Aborted.");
    }
    Ok(())
}
