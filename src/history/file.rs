use chrono::{ DateTime, Local, TimeZone };
use log::{ debug, warn };
use std::fmt::Display;
use std::fs;
use std::path::{ Path, PathBuf };

use super::{ conversation_file_name, LoadError, StoreError };
use crate::models::chat::Conversation;

/// Flat directory of JSON snapshots, one file per save.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    dir: PathBuf,
}

impl ConversationStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists with the current local time. Failures are logged, never
    /// returned: the chat must keep going even if the disk does not.
    pub fn save(&self, conversation: &Conversation) -> Option<PathBuf> {
        match self.try_save_at(conversation, &Local::now()) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to save conversation: {}", e);
                None
            }
        }
    }

    pub fn try_save_at<Tz>(
        &self,
        conversation: &Conversation,
        timestamp: &DateTime<Tz>
    ) -> Result<PathBuf, StoreError>
        where Tz: TimeZone, Tz::Offset: Display
    {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(conversation_file_name(timestamp));
        let json = serde_json::to_string_pretty(conversation)?;
        fs::write(&path, json).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        debug!("Saved {} turns to {}", conversation.len(), path.display());
        Ok(path)
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Conversation, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Turn;
    use chrono::Utc;

    #[test]
    fn writes_pretty_utf8_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConversationStore::new(dir.path().join("conversations"));
        let convo = Conversation::seeded("Quem é você?", "Eu sou Shibori.");
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        let path = store.try_save_at(&convo, &ts).unwrap();

        assert_eq!(path, dir.path().join("conversations").join("convo_20250102_030405.json"));
        let expected = "[\n  {\n    \"role\": \"user\",\n    \"content\": \"Quem é você?\"\n  },\n  {\n    \"role\": \"assistant\",\n    \"content\": \"Eu sou Shibori.\"\n  }\n]";
        assert_eq!(fs::read_to_string(&path).unwrap(), expected);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConversationStore::new(dir.path());
        let mut convo = Conversation::seeded("a", "b");
        convo.push(Turn::user("ção"));

        let path = store.save(&convo).unwrap();
        assert_eq!(store.load(&path).unwrap(), convo);
    }

    #[test]
    fn save_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();
        let store = ConversationStore::new(&blocker);

        assert_eq!(store.save(&Conversation::seeded("a", "b")), None);
        assert!(matches!(
            store.try_save_at(&Conversation::seeded("a", "b"), &Utc::now()),
            Err(StoreError::CreateDir { .. })
        ));
    }

    #[test]
    fn load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConversationStore::new(dir.path());

        let missing = store.load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, LoadError::Read { .. }));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(store.load(&bad).unwrap_err(), LoadError::Parse { .. }));
    }
}
