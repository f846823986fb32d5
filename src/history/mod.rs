mod file;

pub use file::ConversationStore;

use chrono::{ DateTime, TimeZone };
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

const FILE_PREFIX: &str = "convo_";
const FILE_EXTENSION: &str = "json";

/// Save failure. Only ever logged; `ConversationStore::save` swallows it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to create conversations directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize conversation: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Load failure. Surfaced to the user.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid conversation file: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// `convo_YYYYMMDD_HHMMSS.json`. Second resolution, so two saves in the same
/// second share a name and the later one overwrites.
pub fn conversation_file_name<Tz>(timestamp: &DateTime<Tz>) -> String
    where Tz: TimeZone, Tz::Offset: Display
{
    format!("{}{}.{}", FILE_PREFIX, timestamp.format("%Y%m%d_%H%M%S"), FILE_EXTENSION)
}

pub fn is_conversation_file(path: &std::path::Path) -> bool {
    path.extension().map_or(false, |ext| ext == FILE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn file_name_uses_second_resolution_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(conversation_file_name(&ts), "convo_20250309_070501.json");
    }

    #[test]
    fn only_json_files_are_conversations() {
        assert!(is_conversation_file(std::path::Path::new("convo_1.json")));
        assert!(!is_conversation_file(std::path::Path::new("notes.txt")));
        assert!(!is_conversation_file(std::path::Path::new("json")));
    }
}
