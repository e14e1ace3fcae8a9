use chrono::{DateTime, Local, NaiveDate, TimeZone};
use directories::{BaseDirs, ProjectDirs};
use std::cell::Cell;
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    Dev,
    #[default]
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "daily-routine-dev",
            Profile::Prod => "daily-routine",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "daily-routine-dev" instead of "daily-routine"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "daily-routine", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (store file and logs live here)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "daily-routine", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
}

/// Source of "now" for ids, timestamps and the today/upcoming split.
///
/// Injected everywhere instead of calling `Local::now()` so tests can pin
/// the date.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Today's local date as `YYYY-MM-DD`
    fn today(&self) -> String {
        self.now().format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock pinned to a fixed instant; `advance_millis` moves it forward
#[derive(Debug)]
pub struct FixedClock {
    millis: Cell<i64>,
}

impl FixedClock {
    /// Noon local time on `date` (YYYY-MM-DD)
    pub fn on_date(date: &str) -> Option<Self> {
        let day = parse_date(date).ok()?;
        let noon = day.and_hms_opt(12, 0, 0)?;
        let local = Local.from_local_datetime(&noon).earliest()?;
        Some(Self {
            millis: Cell::new(local.timestamp_millis()),
        })
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis.set(self.millis.get() + delta);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        Local
            .timestamp_millis_opt(self.millis.get())
            .single()
            .unwrap_or_else(Local::now)
    }
}

/// Parsed key binding information
#[derive(Debug, Clone)]
pub struct ParsedKeyBinding {
    pub key_code: crossterm::event::KeyCode,
    pub requires_ctrl: bool,
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: crossterm::event::KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
            || modifiers.contains(crossterm::event::KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display, showing the platform-appropriate modifier
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports: single keys ("q", "a"), special keys ("Enter", "Tab") and "Ctrl+x"
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        let key_code = parse_key_code(key_part)?;
        return Ok(ParsedKeyBinding {
            key_code,
            requires_ctrl: true,
        });
    }

    let key_code = parse_key_code(key_str)?;
    Ok(ParsedKeyBinding {
        key_code,
        requires_ctrl: false,
    })
}

/// Parse a key code from a string (without modifiers)
fn parse_key_code(key_str: &str) -> Result<crossterm::event::KeyCode, String> {
    use crossterm::event::KeyCode;
    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "BackTab" => Ok(KeyCode::BackTab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Delete" => Ok(KeyCode::Delete),
        "F1" => Ok(KeyCode::F(1)),
        "F2" => Ok(KeyCode::F(2)),
        "F3" => Ok(KeyCode::F(3)),
        "F4" => Ok(KeyCode::F(4)),
        "F5" => Ok(KeyCode::F(5)),
        _ => {
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}
