//! Diary: daily mood/sleep ratings and quick notes.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::{get_json, set_json, KeyValueStore};

/// Storage key of the diary document
pub const DIARY_KEY: &str = "myaii:diary";

/// Notes longer than this are cut in previews
const SNIPPET_CHARS: usize = 60;

const WEEKDAYS: [&str; 7] = ["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
];

/// Five-step rating used for mood and sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Awful,
    Bad,
    Ok,
    Good,
    Great,
}

impl Rating {
    pub const ALL: [Rating; 5] = [
        Rating::Awful,
        Rating::Bad,
        Rating::Ok,
        Rating::Good,
        Rating::Great,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            Rating::Awful => "😣",
            Rating::Bad => "🙁",
            Rating::Ok => "😐",
            Rating::Good => "🙂",
            Rating::Great => "😄",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rating::Awful => "awful",
            Rating::Bad => "bad",
            Rating::Ok => "ok",
            Rating::Good => "good",
            Rating::Great => "great",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Rating {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Rating::ALL
            .into_iter()
            .find(|r| r.to_string() == s.trim().to_lowercase())
            .ok_or_else(|| Error::validation(format!("unknown rating '{}'", s.trim())))
    }
}

/// Ratings recorded for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub mood: Option<Rating>,
    pub sleep: Option<Rating>,
}

impl DayEntry {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            mood: None,
            sleep: None,
        }
    }
}

/// A short free-text note attached to a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickNote {
    pub id: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

/// The whole diary document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diary {
    /// Day entries keyed by ISO date
    #[serde(default)]
    entries: BTreeMap<String, DayEntry>,
    /// Notes, newest first
    #[serde(default)]
    notes: Vec<QuickNote>,
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl Diary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `date`, if anything was recorded
    pub fn entry(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.entries.get(&date_key(date))
    }

    fn entry_mut(&mut self, date: NaiveDate) -> &mut DayEntry {
        self.entries
            .entry(date_key(date))
            .or_insert_with(|| DayEntry::empty(date))
    }

    /// Set the mood for `date`; choosing the current value clears it.
    pub fn toggle_mood(&mut self, date: NaiveDate, rating: Rating) -> Option<Rating> {
        let entry = self.entry_mut(date);
        entry.mood = toggled(entry.mood, rating);
        entry.mood
    }

    /// Set the sleep rating for `date`; choosing the current value clears it.
    pub fn toggle_sleep(&mut self, date: NaiveDate, rating: Rating) -> Option<Rating> {
        let entry = self.entry_mut(date);
        entry.sleep = toggled(entry.sleep, rating);
        entry.sleep
    }

    /// Add a note to `date`.
    pub fn add_note(&mut self, date: NaiveDate, text: &str, now: DateTime<Utc>) -> Result<&QuickNote> {
        let text = note_text(text)?;
        self.entry_mut(date);

        let note = QuickNote {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            created_at: now,
            text,
        };
        debug!(note_id = %note.id, "Diary note added");
        self.notes.insert(0, note);
        Ok(&self.notes[0])
    }

    /// Replace the text of an existing note.
    pub fn edit_note(&mut self, id: &str, text: &str) -> Result<&QuickNote> {
        let text = note_text(text)?;
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::NotFound(format!("diary note {}", id)))?;
        note.text = text;
        Ok(note)
    }

    /// Most recent note written for `date`
    pub fn latest_note_for(&self, date: NaiveDate) -> Option<&QuickNote> {
        self.notes
            .iter()
            .filter(|n| n.date == date)
            .max_by_key(|n| n.created_at)
    }

    /// Up to `limit` notes across all days, newest first
    pub fn recent_notes(&self, limit: usize) -> Vec<&QuickNote> {
        let mut notes: Vec<&QuickNote> = self.notes.iter().collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notes.truncate(limit);
        notes
    }
}

fn toggled(current: Option<Rating>, chosen: Rating) -> Option<Rating> {
    if current == Some(chosen) { None } else { Some(chosen) }
}

fn note_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Please enter a note first."));
    }
    Ok(trimmed.to_string())
}

/// Preview of a note: at most 60 characters, then an ellipsis.
pub fn snippet(text: &str) -> String {
    if text.chars().count() > SNIPPET_CHARS {
        let head: String = text.chars().take(SNIPPET_CHARS).collect();
        format!("{}…", head)
    } else {
        text.to_string()
    }
}

/// Relative age of `timestamp` as shown in the note list.
pub fn format_relative(now: DateTime<Utc>, timestamp: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "vor wenigen Sekunden".to_string()
    } else if minutes < 60 {
        format!("vor {} min", minutes)
    } else if hours < 24 {
        format!("vor {} h", hours)
    } else if days < 7 {
        format!("vor {} Tagen", days)
    } else {
        timestamp.format("%d.%m.%Y").to_string()
    }
}

/// Header label for a diary day, e.g. `Heute, Mo, 5. Jan 2026`.
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
    let month = MONTHS[date.month0() as usize];
    let label = format!("{}, {}. {} {}", weekday, date.day(), month, date.year());

    if date == today {
        format!("Heute, {}", label)
    } else {
        label
    }
}

/// Diary persistence on top of a key-value store.
#[derive(Clone)]
pub struct DiaryStore {
    store: Arc<dyn KeyValueStore>,
}

impl DiaryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the diary; an empty one when nothing was saved yet.
    pub fn load(&self) -> Result<Diary> {
        Ok(get_json(self.store.as_ref(), DIARY_KEY)?.unwrap_or_default())
    }

    pub fn save(&self, diary: &Diary) -> Result<()> {
        set_json(self.store.as_ref(), DIARY_KEY, diary)
    }
}
