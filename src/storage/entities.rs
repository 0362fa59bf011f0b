use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// The document stored on disk for one user and one calendar day. Stored as
/// a single JSON file so an autosave overwrites the whole day atomically
/// under an exclusive lock, last write wins.
#[derive(PartialEq, Eq, Debug, Default, Serialize, Deserialize, Clone)]
pub struct DayContent {
    #[serde(default)]
    pub journal: Option<JournalEntry>,
    #[serde(default)]
    pub habits: BTreeMap<String, bool>,
    #[serde(default)]
    pub todos: Vec<TodoItem>,
}

impl DayContent {
    pub fn is_empty(&self) -> bool {
        self.journal.is_none() && self.habits.is_empty() && self.todos.is_empty()
    }
}

/// A single day's journal text together with the moment of the last save.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct JournalEntry {
    pub text: Arc<str>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub updated_at: DateTime<Utc>,
}

/// A todo item. Items live on the day they were created.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct TodoItem {
    pub title: Arc<str>,
    #[serde(default)]
    pub done: bool,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{DayContent, JournalEntry, TodoItem};

    #[test]
    fn empty_content_round_trips_from_empty_json() {
        let content: DayContent = serde_json::from_str("{}").unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn content_round_trips_through_json() {
        let mut content = DayContent::default();
        content.journal = Some(JournalEntry {
            text: "went for a run".into(),
            updated_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        });
        content.habits.insert("reading".into(), true);
        content.todos.push(TodoItem {
            title: "water the plants".into(),
            done: false,
            created_at: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
        });

        let raw = serde_json::to_string(&content).unwrap();
        let parsed: DayContent = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, content);
    }
}
