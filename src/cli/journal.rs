use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Subcommand;

use crate::{
    editor::{start_editor, DEFAULT_QUIET_PERIOD},
    session::{store::SessionStore, tracker::SessionTracker},
    storage::content_storage::{ContentStorage, ContentStorageImpl},
    utils::time::date_key,
};

use super::parse_date_arg;

#[derive(Subcommand, Debug)]
pub enum JournalCommand {
    #[command(
        about = "Write a day's entry. Reads lines from the terminal and autosaves after every pause; finish with Ctrl-D, discard the unsaved tail with Ctrl-C"
    )]
    Edit {
        #[arg(
            long,
            help = "Day to edit. Accepts \"yesterday\", \"15/03/2025\" and similar"
        )]
        date: Option<String>,
        #[arg(
            long = "autosave-secs",
            default_value_t = DEFAULT_QUIET_PERIOD.as_secs(),
            help = "Quiet seconds before an autosave fires"
        )]
        autosave_secs: u64,
    },
    #[command(about = "Print a day's entry")]
    Show {
        #[arg(
            long,
            help = "Day to show. Accepts \"yesterday\", \"15/03/2025\" and similar"
        )]
        date: Option<String>,
    },
}

pub async fn process_journal_command<S: SessionStore>(
    command: JournalCommand,
    tracker: SessionTracker<S>,
    user: Arc<str>,
    app_dir: &Path,
) -> Result<()> {
    let storage = ContentStorageImpl::new(app_dir.join("content"))?;

    match command {
        JournalCommand::Edit {
            date,
            autosave_secs,
        } => {
            let date = parse_date_arg(date.as_deref())?;
            println!(
                "Editing the entry for {}. Finish with Ctrl-D.",
                date_key(date)
            );
            start_editor(
                storage,
                tracker,
                user,
                date,
                Duration::from_secs(autosave_secs),
            )
            .await
        }
        JournalCommand::Show { date } => {
            let date = parse_date_arg(date.as_deref())?;
            let content = storage.load_day(&user, date).await?;
            match content.journal {
                Some(entry) => {
                    println!("{}", ansi_term::Style::new().bold().paint(date_key(date)));
                    println!("{}", entry.text);
                }
                None => println!("No entry for {}.", date_key(date)),
            }
            Ok(())
        }
    }
}
