use std::{sync::Arc, time::Duration};

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::{
    autosave::{
        module::AutosaveModule,
        saver::{JournalSaver, Persister},
        EditEvent,
    },
    session::{store::SessionStore, tracker::SessionTracker},
    storage::content_storage::ContentStorage,
    utils::clock::{Clock, DefaultClock},
};

use input::{EditInputModule, EditSource, StdinEditSource};

pub mod input;
pub mod shutdown;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_secs(2);

/// Represents the starting point for an editing session: wires the input
/// module to the autosave module and runs both until the input ends or the
/// user interrupts.
pub async fn start_editor<C, S>(
    storage: C,
    tracker: SessionTracker<S>,
    user: Arc<str>,
    date: NaiveDate,
    quiet_period: Duration,
) -> Result<()>
where
    C: ContentStorage,
    S: SessionStore,
{
    let content = storage.load_day(&user, date).await?;
    let initial_text = content
        .journal
        .map(|entry| entry.text.to_string())
        .unwrap_or_default();

    let (sender, receiver) = mpsc::channel::<EditEvent>(10);
    let shutdown_token = CancellationToken::new();

    let input = create_input(
        sender,
        Box::new(StdinEditSource::new()),
        tracker,
        initial_text,
        &shutdown_token,
        DefaultClock,
    );
    let autosave = create_autosave(
        receiver,
        JournalSaver::new(storage, user, date, Box::new(DefaultClock)),
        &shutdown_token,
        quiet_period,
        DefaultClock,
    );

    let interrupt_watcher = tokio::spawn(shutdown::cancel_on_interrupt(shutdown_token.clone()));

    let (input_result, autosave_result) = tokio::join!(input.run(), autosave.run());

    interrupt_watcher.abort();

    if let Err(input_result) = input_result {
        error!("Input module got an error {:?}", input_result);
    }

    if let Err(autosave_result) = autosave_result {
        error!("Autosave module got an error {:?}", autosave_result);
    }

    Ok(())
}

fn create_input<S: SessionStore>(
    sender: mpsc::Sender<EditEvent>,
    source: Box<dyn EditSource>,
    tracker: SessionTracker<S>,
    initial_text: String,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
) -> EditInputModule<S> {
    EditInputModule::new(
        sender,
        source,
        tracker,
        initial_text,
        shutdown_token.clone(),
        Box::new(clock),
    )
}

fn create_autosave<P: Persister>(
    receiver: mpsc::Receiver<EditEvent>,
    persister: P,
    shutdown_token: &CancellationToken,
    quiet_period: Duration,
    clock: impl Clock,
) -> AutosaveModule<P> {
    AutosaveModule::new(
        receiver,
        persister,
        shutdown_token.clone(),
        quiet_period,
        Box::new(clock),
    )
}
