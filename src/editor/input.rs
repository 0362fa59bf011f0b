use anyhow::Result;
use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::{
    autosave::EditEvent,
    session::{store::SessionStore, tracker::SessionTracker},
    utils::clock::Clock,
};

/// Where editor input comes from. The real editor reads the terminal;
/// tests feed scripted lines.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EditSource: Send + 'static {
    /// Next line of input, `None` once the input is exhausted.
    async fn next_line(&mut self) -> Result<Option<String>>;
}

pub struct StdinEditSource {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinEditSource {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinEditSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EditSource for StdinEditSource {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.next_line().await?)
    }
}

/// Turns raw input lines into content snapshots for the autosave module.
/// Every line is also evidence of a live user, so the session clock is
/// stamped along the way.
pub struct EditInputModule<S> {
    next: mpsc::Sender<EditEvent>,
    source: Box<dyn EditSource>,
    tracker: SessionTracker<S>,
    shutdown: CancellationToken,
    clock: Box<dyn Clock>,
    buffer: String,
}

impl<S: SessionStore> EditInputModule<S> {
    pub fn new(
        next: mpsc::Sender<EditEvent>,
        source: Box<dyn EditSource>,
        tracker: SessionTracker<S>,
        initial_text: String,
        shutdown: CancellationToken,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            source,
            tracker,
            shutdown,
            clock,
            buffer: initial_text,
        }
    }

    /// Executes the input event loop.
    pub async fn run(mut self) -> Result<()> {
        // Seed the pipeline with whatever already exists for the day.
        // Loading is not an edit, so this can never cause a persist.
        self.next
            .send(EditEvent::loaded(self.buffer.as_str()))
            .await
            .inspect_err(|e| error!("Autosave module hung up before the editor started {e:?}"))?;

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(());
                }
                line = self.source.next_line() => match line? {
                    Some(line) => self.append_line(line).await?,
                    // End of input; dropping the sender lets the autosave
                    // module flush and finish.
                    None => return Ok(()),
                }
            }
        }
    }

    async fn append_line(&mut self, line: String) -> Result<()> {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(&line);

        if let Err(e) = self.tracker.record_activity(self.clock.time()).await {
            warn!("Couldn't record editor activity {e:?}");
        }

        debug!("Sending snapshot of {} bytes", self.buffer.len());
        self.next
            .send(EditEvent::edited(self.buffer.as_str()))
            .await
            .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
        Ok(())
    }
}
