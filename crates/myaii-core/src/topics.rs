//! Conversation topics the user wants to talk about.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::storage::{get_json, set_json, KeyValueStore};

/// Storage key of the selected topics
pub const TOPICS_KEY: &str = "myaii:topics";

/// Topic catalogue, in display order
pub const TOPICS: [&str; 10] = [
    "LIEBE & DATING",
    "SELBSTVERTRAUEN",
    "SCHULE",
    "STUDIUM & KARRIEREPLANUNG",
    "NEBENJOBS & GELDMANAGEMENT",
    "FREIZEIT & REISEN",
    "FITNESS & ERNÄHRUNG",
    "SOCIAL SKILLS & NETWORKING",
    "KREATIVITÄT & PROJEKTE",
    "ALLTAGSORGANISATION",
];

/// Resolve user input to a catalogue label, ignoring case and padding.
pub fn find_topic(input: &str) -> Option<&'static str> {
    let wanted = input.trim().to_uppercase();
    TOPICS.into_iter().find(|t| *t == wanted)
}

/// Set of selected topics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicSelection {
    selected: BTreeSet<String>,
}

impl TopicSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a topic on or off. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, topic: &str) -> Result<bool> {
        let label = find_topic(topic)
            .ok_or_else(|| Error::NotFound(format!("topic '{}'", topic.trim())))?;

        if self.selected.remove(label) {
            Ok(false)
        } else {
            self.selected.insert(label.to_string());
            Ok(true)
        }
    }

    pub fn is_selected(&self, topic: &str) -> bool {
        find_topic(topic).is_some_and(|label| self.selected.contains(label))
    }

    /// Selected topics in catalogue order
    pub fn selected(&self) -> Vec<&'static str> {
        TOPICS
            .into_iter()
            .filter(|t| self.selected.contains(*t))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Load the saved selection, empty when none was saved.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self> {
        let mut selection: Self = get_json(store, TOPICS_KEY)?.unwrap_or_default();
        selection.selected.retain(|t| TOPICS.contains(&t.as_str()));
        Ok(selection)
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        set_json(store, TOPICS_KEY, self)
    }
}
