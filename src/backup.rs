use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Task, UserProfile};
use crate::settings::Settings;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Failed to serialize backup: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Failed to write backup file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shape of the exported document
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub tasks: &'a [Task],
    pub settings: &'a Settings,
    pub user: &'a UserProfile,
}

impl ExportDocument<'_> {
    pub fn to_pretty_json(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `daily-routine-backup-<YYYY-MM-DD>.json`
pub fn backup_file_name(date: &str) -> String {
    format!("daily-routine-backup-{}.json", date)
}

/// Write `document` into `dir` under the dated backup name
pub fn write_backup(dir: &Path, date: &str, document: &ExportDocument<'_>) -> Result<PathBuf, BackupError> {
    let path = dir.join(backup_file_name(date));
    let json = document.to_pretty_json()?;
    fs::create_dir_all(dir).map_err(|source| BackupError::WriteError {
        path: dir.to_path_buf(),
        source,
    })?;
    fs::write(&path, json).map_err(|source| BackupError::WriteError {
        path: path.clone(),
        source,
    })?;
    log::info!("event=backup_export path={}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_embeds_date() {
        assert_eq!(backup_file_name("2024-05-06"), "daily-routine-backup-2024-05-06.json");
    }

    #[test]
    fn document_has_three_top_level_keys() {
        let settings = Settings::default();
        let user = UserProfile::new("2024-01-01".into());
        let doc = ExportDocument { tasks: &[], settings: &settings, user: &user };
        let value: serde_json::Value = serde_json::from_str(&doc.to_pretty_json().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj["tasks"].as_array().unwrap().is_empty());
        assert_eq!(obj["settings"]["theme"], "light");
        assert_eq!(obj["user"]["joinDate"], "2024-01-01");
    }
}
