use crate::config::app_dir;
use crate::error::AppError;
use crate::model::Record;
use crate::store::EntityStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "session.json";
const STORE_ENV_VAR: &str = "SCHOOLDESK_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    schema_version: u32,
    records: Vec<Record>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(STORE_FILE_NAME))
}

/// Records saved at `path`, or `None` when no session has been saved yet.
pub fn load_records(path: &Path) -> Result<Option<Vec<Record>>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredSession =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = stored
        .records
        .iter()
        .find(|record| !seen.insert(record.id.as_str()))
    {
        return Err(AppError::invalid_data(format!(
            "duplicate record id '{}'",
            duplicate.id
        )));
    }

    Ok(Some(stored.records))
}

/// A store rebuilt from the snapshot at `path`, or `None` when there is none.
pub fn load_store(path: &Path) -> Result<Option<EntityStore>, AppError> {
    match load_records(path)? {
        Some(records) => EntityStore::from_records(records).map(Some),
        None => Ok(None),
    }
}

pub fn save_store(path: &Path, store: &EntityStore) -> Result<(), AppError> {
    save_records(path, store.all_records().cloned().collect())
}

pub fn save_records(path: &Path, records: Vec<Record>) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredSession {
        schema_version: SCHEMA_VERSION,
        records,
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}

/// Deletes the snapshot so the next load starts from seed data.
pub fn clear(path: &Path) -> Result<bool, AppError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(AppError::io(err.to_string())),
    }
}
