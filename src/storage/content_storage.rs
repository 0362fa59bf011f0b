use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

use crate::utils::time::date_key;

use super::entities::DayContent;

/// Interface for abstracting storage of day documents. The autosave
/// pipeline and the direct CRUD commands both go through this.
pub trait ContentStorage {
    /// Loads the content for a user's day. A day that was never written
    /// loads as empty content, not as an error.
    fn load_day(
        &self,
        user: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<DayContent>>;

    /// Overwrites the stored content for a user's day with `content`.
    fn save_day(
        &self,
        user: &str,
        date: NaiveDate,
        content: &DayContent,
    ) -> impl Future<Output = Result<()>>;
}

/// The main realization of [ContentStorage]. One JSON document per user
/// per day under `<content_dir>/<user>/<YYYY-MM-DD>.json`.
pub struct ContentStorageImpl {
    content_dir: PathBuf,
}

impl ContentStorageImpl {
    pub fn new(content_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&content_dir)?;

        Ok(Self { content_dir })
    }

    fn day_path(&self, user: &str, date: NaiveDate) -> PathBuf {
        let mut path = self.content_dir.join(user);
        path.push(format!("{}.json", date_key(date)));
        path
    }

    async fn read_locked(path: &Path) -> std::result::Result<Option<String>, std::io::Error> {
        let mut file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        file.lock_shared()?;
        let mut raw = String::new();
        let result = file.read_to_string(&mut raw).await;
        file.unlock_async().await?;
        result?;
        Ok(Some(raw))
    }
}

impl ContentStorage for ContentStorageImpl {
    async fn load_day(&self, user: &str, date: NaiveDate) -> Result<DayContent> {
        let path = self.day_path(user, date);
        debug!("Loading day content from {path:?}");

        let Some(raw) = Self::read_locked(&path).await? else {
            return Ok(DayContent::default());
        };
        let content = serde_json::from_str(&raw)
            .with_context(|| format!("Day file {path:?} holds invalid content"))?;
        Ok(content)
    }

    async fn save_day(&self, user: &str, date: NaiveDate, content: &DayContent) -> Result<()> {
        let path = self.day_path(user, date);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::overwrite(&mut file, content).await;
        file.unlock_async().await?;
        result
    }
}

impl ContentStorageImpl {
    async fn overwrite(file: &mut File, content: &DayContent) -> Result<()> {
        let buffer = serde_json::to_vec(content)?;
        file.set_len(0).await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}
