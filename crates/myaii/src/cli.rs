//! CLI argument definitions using clap derive macros.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use myaii_core::diary::Rating;
use myaii_core::profile::Language;

/// MyAII companion CLI
///
/// Onboarding, avatar chat, diary and topics from the terminal.
#[derive(Parser, Debug)]
#[command(name = "myaii")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the local profile (name and mobile number)
    Onboard {
        /// Your name
        #[arg(short, long)]
        name: Option<String>,

        /// Your mobile number
        #[arg(short, long)]
        phone: Option<String>,
    },

    /// Talk to the streaming avatar
    Avatar(AvatarCommand),

    /// Profile management (show, set, clear)
    Profile(ProfileCommand),

    /// Mood, sleep and quick notes
    Diary(DiaryCommand),

    /// Conversation topics
    Topics(TopicsCommand),

    /// Print a random encouragement
    Greet,

    /// Run diagnostics
    Doctor,

    /// Show version
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Avatar Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct AvatarCommand {
    #[command(subcommand)]
    pub action: AvatarAction,
}

#[derive(Subcommand, Debug)]
pub enum AvatarAction {
    /// Open a session and chat line by line (`/quit` to leave)
    Chat {
        /// Avatar id (defaults to the configured avatar)
        #[arg(short, long)]
        avatar: Option<String>,

        /// Have the avatar repeat your text verbatim instead of answering
        #[arg(short, long)]
        repeat: bool,
    },

    /// Verify the API key by requesting a session token
    Check,
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub action: ProfileAction,
}

#[derive(Subcommand, Debug)]
pub enum ProfileAction {
    /// Show the stored profile
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Update profile fields
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Email address (empty string removes it)
        #[arg(long)]
        email: Option<String>,

        /// UI language (de, en)
        #[arg(long)]
        language: Option<Language>,
    },

    /// Log out: delete the local profile
    Clear {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Diary Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct DiaryCommand {
    #[command(subcommand)]
    pub action: DiaryAction,
}

#[derive(Subcommand, Debug)]
pub enum DiaryAction {
    /// Show one day (defaults to today)
    Show {
        /// Day as YYYY-MM-DD
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Rate your mood (choosing the current rating clears it)
    Mood {
        /// awful, bad, ok, good or great
        rating: Rating,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Rate your sleep (choosing the current rating clears it)
    Sleep {
        /// awful, bad, ok, good or great
        rating: Rating,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Quick notes
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// List recent notes across all days
    Notes {
        /// Maximum number of notes
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
pub enum NoteAction {
    /// Add a note
    Add {
        text: String,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Replace the text of a note
    Edit {
        /// Note id (as shown by `myaii diary notes`)
        id: String,

        text: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Topic Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct TopicsCommand {
    #[command(subcommand)]
    pub action: TopicsAction,
}

#[derive(Subcommand, Debug)]
pub enum TopicsAction {
    /// List all topics and mark the selected ones
    List,

    /// Select or deselect a topic
    Toggle {
        /// Topic label, case-insensitive
        topic: String,
    },
}
