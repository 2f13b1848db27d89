//! Diary commands.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use colored::Colorize;

use crate::cli::{DiaryAction, DiaryCommand, NoteAction};
use crate::config::Config;
use myaii_core::diary::{format_date_label, format_relative, snippet, Diary, DiaryStore, Rating};

pub async fn execute(cmd: DiaryCommand, config: &Config) -> Result<()> {
    let store = DiaryStore::new(config.open_store()?);
    let mut diary = store.load()?;
    let today = Local::now().date_naive();

    match cmd.action {
        DiaryAction::Show { date } => show(&diary, date.unwrap_or(today), today),
        DiaryAction::Mood { rating, date } => {
            let date = date.unwrap_or(today);
            let mood = diary.toggle_mood(date, rating);
            store.save(&diary)?;
            println!("Mood for {}: {}", format_date_label(date, today), rating_label(mood));
        }
        DiaryAction::Sleep { rating, date } => {
            let date = date.unwrap_or(today);
            let sleep = diary.toggle_sleep(date, rating);
            store.save(&diary)?;
            println!("Sleep for {}: {}", format_date_label(date, today), rating_label(sleep));
        }
        DiaryAction::Note { action } => match action {
            NoteAction::Add { text, date } => {
                let date = date.unwrap_or(today);
                let id = diary
                    .add_note(date, &text, Utc::now())
                    .context("Note was not saved")?
                    .id
                    .clone();
                store.save(&diary)?;
                println!("{} Note saved ({})", "✓".green(), short_id(&id).dimmed());
            }
            NoteAction::Edit { id, text } => {
                let Some(full_id) = resolve_note_id(&diary, &id) else {
                    bail!("No note with id {}", id);
                };
                diary
                    .edit_note(&full_id, &text)
                    .context("Note was not updated")?;
                store.save(&diary)?;
                println!("{} Note updated", "✓".green());
            }
        },
        DiaryAction::Notes { limit } => {
            let notes = diary.recent_notes(limit);
            if notes.is_empty() {
                println!("{}", "No notes yet.".dimmed());
            }
            let now = Utc::now();
            for note in notes {
                println!(
                    "  {}  {}  {}",
                    short_id(&note.id).dimmed(),
                    format_relative(now, note.created_at).cyan(),
                    snippet(&note.text)
                );
            }
        }
    }

    Ok(())
}

fn show(diary: &Diary, date: NaiveDate, today: NaiveDate) {
    println!("{}", format_date_label(date, today).cyan().bold());
    println!("{}", "─".repeat(40));

    let entry = diary.entry(date);
    println!("  Mood:  {}", rating_label(entry.and_then(|e| e.mood)));
    println!("  Sleep: {}", rating_label(entry.and_then(|e| e.sleep)));

    match diary.latest_note_for(date) {
        Some(note) => println!(
            "  Note:  {} {}",
            snippet(&note.text),
            format!("({})", format_relative(Utc::now(), note.created_at)).dimmed()
        ),
        None => println!("  Note:  {}", "-".dimmed()),
    }
}

fn rating_label(rating: Option<Rating>) -> String {
    match rating {
        Some(r) => format!("{} {}", r.emoji(), r),
        None => "-".to_string(),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Accept a full note id or a unique prefix of one.
fn resolve_note_id(diary: &Diary, id: &str) -> Option<String> {
    let mut matches = diary
        .recent_notes(usize::MAX)
        .into_iter()
        .filter(|n| n.id.starts_with(id));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_note_id_by_prefix() {
        let mut diary = Diary::new();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let id = diary.add_note(date, "a", Utc::now()).unwrap().id.clone();

        assert_eq!(resolve_note_id(&diary, &id[..8]), Some(id.clone()));
        assert_eq!(resolve_note_id(&diary, &id), Some(id));
        assert_eq!(resolve_note_id(&diary, "zzzz"), None);
    }

    #[tokio::test]
    async fn test_failed_note_commands_are_errors() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.paths.data_dir = temp.path().to_path_buf();

        let add_empty = DiaryCommand {
            action: DiaryAction::Note {
                action: NoteAction::Add {
                    text: "   ".to_string(),
                    date: None,
                },
            },
        };
        assert!(execute(add_empty, &config).await.is_err());

        let edit_missing = DiaryCommand {
            action: DiaryAction::Note {
                action: NoteAction::Edit {
                    id: "deadbeef".to_string(),
                    text: "x".to_string(),
                },
            },
        };
        assert!(execute(edit_missing, &config).await.is_err());
    }

    #[test]
    fn test_rating_label() {
        assert_eq!(rating_label(None), "-");
        assert_eq!(rating_label(Some(Rating::Good)), "🙂 good");
    }
}
