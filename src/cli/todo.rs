use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Subcommand;

use crate::{
    storage::{
        content_storage::{ContentStorage, ContentStorageImpl},
        entities::{DayContent, TodoItem},
    },
    utils::{clock::Clock, time::date_key},
};

use super::parse_date_arg;

#[derive(Subcommand, Debug)]
pub enum TodoCommand {
    #[command(about = "Add a todo to the day's list")]
    Add {
        title: String,
        #[arg(long, help = "Day to add to. Accepts \"yesterday\" and similar")]
        date: Option<String>,
    },
    #[command(about = "Check off a todo by its list number")]
    Done {
        index: usize,
        #[arg(long, help = "Day the todo lives on. Accepts \"yesterday\" and similar")]
        date: Option<String>,
    },
    #[command(about = "List the day's todos")]
    List {
        #[arg(long, help = "Day to list. Accepts \"yesterday\" and similar")]
        date: Option<String>,
    },
}

pub async fn process_todo_command(
    command: TodoCommand,
    user: Arc<str>,
    app_dir: &Path,
    clock: &impl Clock,
) -> Result<()> {
    let storage = ContentStorageImpl::new(app_dir.join("content"))?;

    match command {
        TodoCommand::Add { title, date } => {
            let date = parse_date_arg(date.as_deref())?;
            let mut content = storage.load_day(&user, date).await?;
            add_todo(&mut content, &title, clock);
            storage.save_day(&user, date, &content).await?;
            println!("{}. {title}", content.todos.len());
            Ok(())
        }
        TodoCommand::Done { index, date } => {
            let date = parse_date_arg(date.as_deref())?;
            let mut content = storage.load_day(&user, date).await?;
            let title = complete_todo(&mut content, index)?;
            storage.save_day(&user, date, &content).await?;
            println!("Done: {title}");
            Ok(())
        }
        TodoCommand::List { date } => {
            let date = parse_date_arg(date.as_deref())?;
            let content = storage.load_day(&user, date).await?;
            if content.todos.is_empty() {
                println!("Nothing on the list for {}.", date_key(date));
                return Ok(());
            }
            for (position, item) in content.todos.iter().enumerate() {
                println!("{}", todo_line(position + 1, item));
            }
            Ok(())
        }
    }
}

fn add_todo(content: &mut DayContent, title: &str, clock: &impl Clock) {
    content.todos.push(TodoItem {
        title: title.into(),
        done: false,
        created_at: clock.time(),
    });
}

/// Checks off a todo by its 1-based list number and returns its title.
fn complete_todo(content: &mut DayContent, index: usize) -> Result<Arc<str>> {
    let item = index
        .checked_sub(1)
        .and_then(|i| content.todos.get_mut(i))
        .ok_or_else(|| anyhow!("No todo number {index} on this day"))?;
    item.done = true;
    Ok(item.title.clone())
}

fn todo_line(position: usize, item: &TodoItem) -> String {
    if item.done {
        format!(
            "{position}. {} {}",
            ansi_term::Colour::Green.paint("✓"),
            ansi_term::Style::new().strikethrough().paint(item.title.as_ref())
        )
    } else {
        format!("{position}. {}", item.title)
    }
}
