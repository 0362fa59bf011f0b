use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    storage::{content_storage::ContentStorage, entities::JournalEntry},
    utils::clock::Clock,
};

/// The persist operation the autosave module invokes. Opaque to the
/// scheduler: implementations own their retry and error-surfacing policy,
/// the scheduler's job ends at invocation.
pub trait Persister {
    fn persist(&mut self, snapshot: Arc<str>) -> impl std::future::Future<Output = Result<()>>;
}

/// Persists journal snapshots into the day document, leaving habits and
/// todos on that day untouched.
pub struct JournalSaver<C> {
    storage: C,
    user: Arc<str>,
    date: NaiveDate,
    clock: Box<dyn Clock>,
}

impl<C: ContentStorage> JournalSaver<C> {
    pub fn new(storage: C, user: Arc<str>, date: NaiveDate, clock: Box<dyn Clock>) -> Self {
        Self {
            storage,
            user,
            date,
            clock,
        }
    }
}

impl<C: ContentStorage> Persister for JournalSaver<C> {
    async fn persist(&mut self, snapshot: Arc<str>) -> Result<()> {
        let mut content = self.storage.load_day(&self.user, self.date).await?;
        content.journal = Some(JournalEntry {
            text: snapshot,
            updated_at: self.clock.time(),
        });
        self.storage.save_day(&self.user, self.date, &content).await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        storage::content_storage::{ContentStorage, ContentStorageImpl},
        utils::clock::DefaultClock,
    };

    use super::{JournalSaver, Persister};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2018, 7, 4).unwrap();

    #[tokio::test]
    async fn persists_snapshot_without_touching_other_content() -> Result<()> {
        let dir = tempdir()?;
        let storage = ContentStorageImpl::new(dir.path().to_owned())?;

        let mut seeded = storage.load_day("ann", TEST_DATE).await?;
        seeded.habits.insert("reading".into(), true);
        storage.save_day("ann", TEST_DATE, &seeded).await?;

        let mut saver = JournalSaver::new(
            ContentStorageImpl::new(dir.path().to_owned())?,
            "ann".into(),
            TEST_DATE,
            Box::new(DefaultClock),
        );
        saver.persist("dear diary".into()).await?;

        let content = storage.load_day("ann", TEST_DATE).await?;
        assert_eq!(content.journal.unwrap().text.as_ref(), "dear diary");
        assert_eq!(content.habits.get("reading"), Some(&true));
        Ok(())
    }

    #[tokio::test]
    async fn later_persist_wins() -> Result<()> {
        let dir = tempdir()?;
        let storage = ContentStorageImpl::new(dir.path().to_owned())?;
        let mut saver = JournalSaver::new(
            ContentStorageImpl::new(dir.path().to_owned())?,
            "ann".into(),
            TEST_DATE,
            Box::new(DefaultClock),
        );

        saver.persist("draft A".into()).await?;
        saver.persist("draft A and B".into()).await?;

        let content = storage.load_day("ann", TEST_DATE).await?;
        assert_eq!(content.journal.unwrap().text.as_ref(), "draft A and B");
        Ok(())
    }
}
