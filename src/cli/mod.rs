pub mod habit;
pub mod journal;
pub mod todo;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use chrono_english::{parse_date_string, Dialect};
use clap::{CommandFactory, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    session::{
        liveness::LivenessEvaluator,
        store::{FileSessionStore, SessionStore},
        tracker::{Liveness, SessionTracker},
        DEFAULT_IDLE_THRESHOLD_DAYS,
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

use habit::{process_habit_command, HabitCommand};
use journal::{process_journal_command, JournalCommand};
use todo::{process_todo_command, TodoCommand};

#[derive(Parser, Debug)]
#[command(name = "Daybook", version, long_about = None)]
#[command(about = "Command line journal, habit tracker and todo list", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start a session for a user")]
    Login {
        #[arg(help = "User name. Letters, digits, '-' and '_' only")]
        name: String,
    },
    #[command(about = "End the current session")]
    Logout,
    #[command(about = "Show who is logged in and whether the session is still live")]
    Status,
    #[command(about = "Write and read daily journal entries")]
    Journal {
        #[command(subcommand)]
        command: JournalCommand,
    },
    #[command(about = "Track daily habits")]
    Habit {
        #[command(subcommand)]
        command: HabitCommand,
    },
    #[command(about = "Manage the daily todo list")]
    Todo {
        #[command(subcommand)]
        command: TodoCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let clock = DefaultClock;
    let tracker = SessionTracker::new(
        FileSessionStore::new(app_dir.join("session.json")),
        LivenessEvaluator::from_days(DEFAULT_IDLE_THRESHOLD_DAYS),
    );

    match args.commands {
        Commands::Login { name } => {
            validate_user_name(&name)?;
            tracker.login(name.as_str().into(), clock.time()).await?;
            println!("Logged in as {name}.");
            Ok(())
        }
        Commands::Logout => {
            tracker.logout().await?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Status => {
            print_status(tracker.check_liveness(clock.time()).await?);
            Ok(())
        }
        Commands::Journal { command } => {
            let user = require_live_session(&tracker, &clock).await?;
            process_journal_command(command, tracker, user, &app_dir).await
        }
        Commands::Habit { command } => {
            let user = require_live_session(&tracker, &clock).await?;
            process_habit_command(command, user, &app_dir).await
        }
        Commands::Todo { command } => {
            let user = require_live_session(&tracker, &clock).await?;
            process_todo_command(command, user, &app_dir, &clock).await
        }
    }
}

/// Gate for everything except login/logout/status. A passing check also
/// refreshes the liveness clock, so running any command counts as
/// activity.
async fn require_live_session<S: SessionStore>(
    tracker: &SessionTracker<S>,
    clock: &impl Clock,
) -> Result<Arc<str>> {
    match tracker.check_liveness(clock.time()).await? {
        Liveness::Live(state) => Ok(state.user_name()),
        Liveness::Expired => bail!(
            "Your session expired after {DEFAULT_IDLE_THRESHOLD_DAYS} days of inactivity. Run `daybook login <name>` to start over"
        ),
        Liveness::LoggedOut => bail!("Nobody is logged in. Run `daybook login <name>` first"),
    }
}

fn print_status(liveness: Liveness) {
    match liveness {
        Liveness::Live(state) => println!(
            "{} Logged in as {}",
            ansi_term::Colour::Green.paint("●"),
            state.user_name()
        ),
        Liveness::Expired => println!(
            "{} Session expired after {DEFAULT_IDLE_THRESHOLD_DAYS} days of inactivity",
            ansi_term::Colour::Red.paint("●")
        ),
        Liveness::LoggedOut => println!(
            "{} Not logged in",
            ansi_term::Colour::Yellow.paint("●")
        ),
    }
}

/// User names double as directory names under the content root.
fn validate_user_name(name: &str) -> Result<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        bail!("User names may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}

/// Parses a `--date` argument. Defaults to today; otherwise accepts the
/// formats chrono-english understands, like "yesterday" or "15/03/2025".
pub(crate) fn parse_date_arg(value: Option<&str>) -> Result<NaiveDate> {
    let now = Local::now();
    match value {
        None => Ok(now.date_naive()),
        Some(raw) => match parse_date_string(raw, now, Dialect::Uk) {
            Ok(v) => Ok(v.date_naive()),
            Err(e) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate date {raw}: {e}"),
                )
                .into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_date_arg, validate_user_name};

    #[test]
    fn plain_names_pass_validation() {
        assert!(validate_user_name("ann").is_ok());
        assert!(validate_user_name("ann_b-2").is_ok());
    }

    #[test]
    fn path_like_names_are_rejected() {
        assert!(validate_user_name("").is_err());
        assert!(validate_user_name("../etc").is_err());
        assert!(validate_user_name("ann/other").is_err());
        assert!(validate_user_name("ann b").is_err());
    }

    #[test]
    fn missing_date_defaults_to_today() {
        let today = chrono::Local::now().date_naive();
        assert_eq!(parse_date_arg(None).unwrap(), today);
    }

    #[test]
    fn explicit_dates_parse() {
        let date = parse_date_arg(Some("15/03/2025")).unwrap();
        assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn nonsense_dates_are_rejected() {
        assert!(parse_date_arg(Some("the day the music died")).is_err());
    }
}
