use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

use crate::store::{self, KeyValueStore, SETTINGS_KEY, StoreError};

/// The flat settings record, persisted as a camelCase JSON object.
///
/// Keys missing from a stored record take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: String,
    pub font_size: String,
    pub push_notifications: bool,
    pub email_reminders: bool,
    pub sound_effects: bool,
    pub show_completed_tasks: bool,
    pub sort_by: String,
    pub recurring_tasks: bool,
    pub two_factor: bool,
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            font_size: "medium".to_string(),
            push_notifications: true,
            email_reminders: false,
            sound_effects: true,
            show_completed_tasks: true,
            sort_by: "dueDate".to_string(),
            recurring_tasks: true,
            two_factor: false,
            dark_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Theme,
    FontSize,
    PushNotifications,
    EmailReminders,
    SoundEffects,
    ShowCompletedTasks,
    SortBy,
    RecurringTasks,
    TwoFactor,
    DarkMode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 10] = [
        SettingKey::Theme,
        SettingKey::FontSize,
        SettingKey::PushNotifications,
        SettingKey::EmailReminders,
        SettingKey::SoundEffects,
        SettingKey::ShowCompletedTasks,
        SettingKey::SortBy,
        SettingKey::RecurringTasks,
        SettingKey::TwoFactor,
        SettingKey::DarkMode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::Theme => "theme",
            SettingKey::FontSize => "fontSize",
            SettingKey::PushNotifications => "pushNotifications",
            SettingKey::EmailReminders => "emailReminders",
            SettingKey::SoundEffects => "soundEffects",
            SettingKey::ShowCompletedTasks => "showCompletedTasks",
            SettingKey::SortBy => "sortBy",
            SettingKey::RecurringTasks => "recurringTasks",
            SettingKey::TwoFactor => "twoFactor",
            SettingKey::DarkMode => "darkMode",
        }
    }

    fn is_text(self) -> bool {
        matches!(self, SettingKey::Theme | SettingKey::FontSize | SettingKey::SortBy)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    /// Interpret CLI input for `key`: "true"/"false" (also on/off, yes/no)
    /// for switches, anything for text keys
    pub fn parse_for(key: SettingKey, raw: &str) -> Result<Self, SettingsError> {
        if key.is_text() {
            return Ok(SettingValue::Text(raw.to_string()));
        }
        match raw.trim().to_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(SettingValue::Bool(true)),
            "false" | "off" | "no" | "0" => Ok(SettingValue::Bool(false)),
            _ => Err(SettingsError::TypeMismatch { key, expected: "bool" }),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            SettingValue::Text(s) => f.write_str(s),
        }
    }
}

/// Presentation-relevant change produced by `SettingsStore::set`.
///
/// The store never touches the screen; whoever owns the screen applies these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsChange {
    Theme(String),
    FontSize(String),
    DarkMode(bool),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    UnknownKey(String),
    #[error("Setting '{key}' expects a {expected} value")]
    TypeMismatch { key: SettingKey, expected: &'static str },
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}

pub struct SettingsStore {
    store: Rc<dyn KeyValueStore>,
    settings: Settings,
}

impl SettingsStore {
    /// Load settings; with no usable record the defaults are used
    pub fn load(store: Rc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let settings = store::load_json(store.as_ref(), SETTINGS_KEY)?.unwrap_or_default();
        Ok(Self { store, settings })
    }

    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.settings = store::load_json(self.store.as_ref(), SETTINGS_KEY)?.unwrap_or_default();
        Ok(())
    }

    pub fn get_all(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        let s = &self.settings;
        match key {
            SettingKey::Theme => SettingValue::Text(s.theme.clone()),
            SettingKey::FontSize => SettingValue::Text(s.font_size.clone()),
            SettingKey::SortBy => SettingValue::Text(s.sort_by.clone()),
            SettingKey::PushNotifications => SettingValue::Bool(s.push_notifications),
            SettingKey::EmailReminders => SettingValue::Bool(s.email_reminders),
            SettingKey::SoundEffects => SettingValue::Bool(s.sound_effects),
            SettingKey::ShowCompletedTasks => SettingValue::Bool(s.show_completed_tasks),
            SettingKey::RecurringTasks => SettingValue::Bool(s.recurring_tasks),
            SettingKey::TwoFactor => SettingValue::Bool(s.two_factor),
            SettingKey::DarkMode => SettingValue::Bool(s.dark_mode),
        }
    }

    /// Write `key`, persist, and report the presentation change if the key
    /// has one (`theme`, `fontSize`, `darkMode`). Other keys are stored but
    /// inert.
    pub fn set(
        &mut self,
        key: SettingKey,
        value: SettingValue,
    ) -> Result<Option<SettingsChange>, SettingsError> {
        let s = &mut self.settings;
        let change = match (key, value) {
            (SettingKey::Theme, SettingValue::Text(v)) => {
                s.theme = v.clone();
                Some(SettingsChange::Theme(v))
            }
            (SettingKey::FontSize, SettingValue::Text(v)) => {
                s.font_size = v.clone();
                Some(SettingsChange::FontSize(v))
            }
            (SettingKey::SortBy, SettingValue::Text(v)) => {
                s.sort_by = v;
                None
            }
            (SettingKey::DarkMode, SettingValue::Bool(v)) => {
                s.dark_mode = v;
                Some(SettingsChange::DarkMode(v))
            }
            (SettingKey::PushNotifications, SettingValue::Bool(v)) => {
                s.push_notifications = v;
                None
            }
            (SettingKey::EmailReminders, SettingValue::Bool(v)) => {
                s.email_reminders = v;
                None
            }
            (SettingKey::SoundEffects, SettingValue::Bool(v)) => {
                s.sound_effects = v;
                None
            }
            (SettingKey::ShowCompletedTasks, SettingValue::Bool(v)) => {
                s.show_completed_tasks = v;
                None
            }
            (SettingKey::RecurringTasks, SettingValue::Bool(v)) => {
                s.recurring_tasks = v;
                None
            }
            (SettingKey::TwoFactor, SettingValue::Bool(v)) => {
                s.two_factor = v;
                None
            }
            (key, _) => {
                let expected = if key.is_text() { "string" } else { "bool" };
                return Err(SettingsError::TypeMismatch { key, expected });
            }
        };
        store::save_json(self.store.as_ref(), SETTINGS_KEY, &self.settings)?;
        log::info!("event=setting_set key={}", key);
        Ok(change)
    }

    /// Restore and persist the defaults
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.settings = Settings::default();
        store::save_json(self.store.as_ref(), SETTINGS_KEY, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn every_key_round_trips_through_its_name() {
        for key in SettingKey::ALL {
            assert_eq!(key.name().parse::<SettingKey>().unwrap(), key);
        }
        assert!("colour".parse::<SettingKey>().is_err());
    }

    #[test]
    fn defaults_serialize_to_exactly_ten_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 10);
        for key in SettingKey::ALL {
            assert!(obj.contains_key(key.name()), "missing {}", key);
        }
    }

    #[test]
    fn partial_record_is_filled_with_defaults() {
        let store = Rc::new(MemoryStore::new());
        store.set(SETTINGS_KEY, r#"{"theme":"dark","extra":1}"#).unwrap();
        let settings = SettingsStore::load(store).unwrap();
        assert_eq!(settings.get_all().theme, "dark");
        assert_eq!(settings.get_all().font_size, "medium");
        assert!(!settings.get_all().dark_mode);
    }

    #[test]
    fn mismatched_value_leaves_state_untouched() {
        let store = Rc::new(MemoryStore::new());
        let mut settings = SettingsStore::load(store.clone()).unwrap();
        let err = settings
            .set(SettingKey::DarkMode, SettingValue::Text("yes".into()))
            .unwrap_err();
        assert!(matches!(err, SettingsError::TypeMismatch { .. }));
        assert_eq!(store.write_count(), 0);
        assert_eq!(settings.get(SettingKey::DarkMode), SettingValue::Bool(false));
    }

    #[test]
    fn only_presentation_keys_emit_changes() {
        let store = Rc::new(MemoryStore::new());
        let mut settings = SettingsStore::load(store).unwrap();
        assert_eq!(
            settings.set(SettingKey::DarkMode, SettingValue::Bool(true)).unwrap(),
            Some(SettingsChange::DarkMode(true))
        );
        assert_eq!(
            settings.set(SettingKey::SoundEffects, SettingValue::Bool(false)).unwrap(),
            None
        );
        assert_eq!(settings.get(SettingKey::SoundEffects), SettingValue::Bool(false));
    }

    #[test]
    fn parse_for_switches_accepts_on_off() {
        assert_eq!(
            SettingValue::parse_for(SettingKey::TwoFactor, "on").unwrap(),
            SettingValue::Bool(true)
        );
        assert!(SettingValue::parse_for(SettingKey::TwoFactor, "maybe").is_err());
        assert_eq!(
            SettingValue::parse_for(SettingKey::Theme, "dark").unwrap(),
            SettingValue::Text("dark".into())
        );
    }
}
