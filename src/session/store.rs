use std::{future::Future, io::ErrorKind, path::PathBuf, sync::Arc};

use anyhow::Result;
use chrono::{DateTime, Utc};
use fs4::tokio::AsyncFileExt;
use serde::{Deserialize, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};

/// The persisted session document. Timestamps cross this boundary exactly
/// once, as epoch seconds; everything in memory is a `DateTime<Utc>`.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct SessionState {
    pub authenticated: bool,
    #[serde(default)]
    pub display_name: Option<Arc<str>>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub last_active_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn logged_in(display_name: Arc<str>, now: DateTime<Utc>) -> Self {
        Self {
            authenticated: true,
            display_name: Some(display_name),
            last_active_at: Some(now),
        }
    }

    /// Name the user's content lives under. A session written by `login`
    /// always has one; a hand-edited file without it falls back to a
    /// shared default.
    pub fn user_name(&self) -> Arc<str> {
        self.display_name
            .clone()
            .unwrap_or_else(|| Arc::from("default"))
    }
}

/// Interface for abstracting where the session document lives. The tracker
/// only ever talks to this, which keeps it runnable against an in-memory
/// store in tests.
pub trait SessionStore {
    /// Reads the persisted session, `None` when no session was ever saved.
    fn load(&self) -> impl Future<Output = Result<Option<SessionState>>>;

    fn save(&self, state: &SessionState) -> impl Future<Output = Result<()>>;

    /// Removes the persisted session. Clearing an absent session is fine.
    fn clear(&self) -> impl Future<Output = Result<()>>;
}

/// The main realization of [SessionStore]: one JSON file in the
/// application directory.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<SessionState>> {
        let mut file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut raw = String::new();
        let result = file.read_to_string(&mut raw).await;
        file.unlock_async().await?;
        result?;

        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, state: &SessionState) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::overwrite(&mut file, state).await;
        file.unlock_async().await?;
        result
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl FileSessionStore {
    async fn overwrite(file: &mut File, state: &SessionState) -> Result<()> {
        let buffer = serde_json::to_vec(state)?;
        file.set_len(0).await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use super::{FileSessionStore, SessionState, SessionStore};

    #[tokio::test]
    async fn missing_file_loads_as_none() -> Result<()> {
        let dir = tempdir()?;
        let store = FileSessionStore::new(dir.path().join("session.json"));

        assert_eq!(store.load().await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn saved_state_loads_back() -> Result<()> {
        let dir = tempdir()?;
        let store = FileSessionStore::new(dir.path().join("session.json"));
        let state = SessionState::logged_in(
            "ann".into(),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        );

        store.save(&state).await?;

        assert_eq!(store.load().await?, Some(state));
        Ok(())
    }

    #[tokio::test]
    async fn state_without_timestamp_loads_as_never_recorded() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"authenticated":true,"display_name":"ann"}"#)?;
        let store = FileSessionStore::new(path);

        let state = store.load().await?.unwrap();
        assert!(state.authenticated);
        assert_eq!(state.last_active_at, None);
        Ok(())
    }

    #[tokio::test]
    async fn clear_removes_the_file_and_tolerates_absence() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.json");
        let store = FileSessionStore::new(path.clone());

        store
            .save(&SessionState::logged_in("ann".into(), Utc::now()))
            .await?;
        store.clear().await?;

        assert!(!path.exists());
        store.clear().await?;
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_state_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all")?;
        let store = FileSessionStore::new(path);

        assert!(store.load().await.is_err());
        Ok(())
    }
}
