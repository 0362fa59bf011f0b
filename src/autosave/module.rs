use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::utils::clock::Clock;

use super::{debounce::DebounceState, saver::Persister, EditEvent};

/// Drives the debounce machine on the event loop. Receives snapshots from
/// the owning editor, coalesces each burst, and invokes the persister once
/// the quiet period runs out with the content still dirty.
///
/// Each editor owns exactly one of these; two editors never share state,
/// so one editor's countdown cannot delay another's persist.
///
/// Shutdown has two flavors. Closing the edit channel is the graceful end
/// of an editing session: a still-pending dirty snapshot is flushed before
/// the module returns. Cancelling the token is a teardown: the countdown
/// is dropped and nothing is persisted after it.
pub struct AutosaveModule<P> {
    edits: mpsc::Receiver<EditEvent>,
    persister: P,
    quiet_period: Duration,
    shutdown: CancellationToken,
    clock: Box<dyn Clock>,
    debounce: DebounceState<Arc<str>>,
    dirty: bool,
}

impl<P: Persister> AutosaveModule<P> {
    pub fn new(
        edits: mpsc::Receiver<EditEvent>,
        persister: P,
        shutdown: CancellationToken,
        quiet_period: Duration,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            edits,
            persister,
            quiet_period,
            shutdown,
            clock,
            debounce: DebounceState::new(),
            dirty: false,
        }
    }

    /// Executes the autosave event loop.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let deadline = self.debounce.deadline();

            tokio::select! {
                // Teardown wins over a simultaneous end of input.
                biased;

                _ = self.shutdown.cancelled() => {
                    self.debounce.cancel();
                    return Ok(());
                }
                event = self.edits.recv() => match event {
                    Some(event) => self.accept(event),
                    // Channel closed means the editor finished its input.
                    None => {
                        self.flush().await;
                        return Ok(());
                    }
                },
                _ = self.clock.sleep_until(deadline.unwrap_or_else(|| self.clock.instant())), if deadline.is_some() => {
                    self.fire().await;
                }
            }
        }
    }

    fn accept(&mut self, event: EditEvent) {
        debug!("Received snapshot of {} bytes, dirty: {}", event.snapshot.len(), event.dirty);
        self.dirty = event.dirty;
        if event.dirty {
            let now = self.clock.instant();
            self.debounce.schedule(event.snapshot, now, self.quiet_period);
        }
    }

    async fn fire(&mut self) {
        let Some(snapshot) = self.debounce.tick(self.clock.instant()) else {
            return;
        };
        if self.dirty {
            self.persist(snapshot).await;
        }
    }

    async fn flush(&mut self) {
        let Some(snapshot) = self.debounce.cancel() else {
            return;
        };
        if self.dirty {
            self.persist(snapshot).await;
        }
    }

    async fn persist(&mut self, snapshot: Arc<str>) {
        match self.persister.persist(snapshot.clone()).await {
            Ok(()) => {
                info!("Autosaved {} bytes", snapshot.len());
            }
            Err(e) => {
                error!("Autosave failed: {e:?}");
            }
        }
        // One invocation per scheduling cycle, whatever its outcome. A new
        // edit marks the content dirty again.
        self.dirty = false;
    }
}
