use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;

use crate::{
    storage::{
        content_storage::{ContentStorage, ContentStorageImpl},
        entities::DayContent,
    },
    utils::time::date_key,
};

use super::parse_date_arg;

#[derive(Subcommand, Debug)]
pub enum HabitCommand {
    #[command(about = "Mark a habit as done for the day")]
    Mark {
        name: String,
        #[arg(long, help = "Take the mark back")]
        undo: bool,
        #[arg(long, help = "Day to mark. Accepts \"yesterday\" and similar")]
        date: Option<String>,
    },
    #[command(about = "List the day's habits")]
    List {
        #[arg(long, help = "Day to list. Accepts \"yesterday\" and similar")]
        date: Option<String>,
    },
}

pub async fn process_habit_command(
    command: HabitCommand,
    user: Arc<str>,
    app_dir: &Path,
) -> Result<()> {
    let storage = ContentStorageImpl::new(app_dir.join("content"))?;

    match command {
        HabitCommand::Mark { name, undo, date } => {
            let date = parse_date_arg(date.as_deref())?;
            let mut content = storage.load_day(&user, date).await?;
            mark_habit(&mut content, &name, !undo);
            storage.save_day(&user, date, &content).await?;
            println!("{}", habit_line(&name, !undo));
            Ok(())
        }
        HabitCommand::List { date } => {
            let date = parse_date_arg(date.as_deref())?;
            let content = storage.load_day(&user, date).await?;
            if content.habits.is_empty() {
                println!("No habits recorded for {}.", date_key(date));
                return Ok(());
            }
            for (name, done) in &content.habits {
                println!("{}", habit_line(name, *done));
            }
            Ok(())
        }
    }
}

fn mark_habit(content: &mut DayContent, name: &str, done: bool) {
    content.habits.insert(name.to_string(), done);
}

fn habit_line(name: &str, done: bool) -> String {
    if done {
        format!("{} {name}", ansi_term::Colour::Green.paint("✓"))
    } else {
        format!("{} {name}", ansi_term::Colour::Red.paint("✗"))
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::entities::DayContent;

    use super::mark_habit;

    #[test]
    fn marking_sets_and_unsets_the_flag() {
        let mut content = DayContent::default();

        mark_habit(&mut content, "stretching", true);
        assert_eq!(content.habits.get("stretching"), Some(&true));

        mark_habit(&mut content, "stretching", false);
        assert_eq!(content.habits.get("stretching"), Some(&false));
    }

    #[test]
    fn marking_does_not_touch_other_habits() {
        let mut content = DayContent::default();
        mark_habit(&mut content, "reading", true);

        mark_habit(&mut content, "stretching", true);

        assert_eq!(content.habits.len(), 2);
        assert_eq!(content.habits.get("reading"), Some(&true));
    }
}
