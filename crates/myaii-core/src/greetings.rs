//! Short encouragements shown on the home screen and the avatar's opening line.

use rand::seq::SliceRandom;

pub const GREETINGS: &[&str] = &[
    "you look great today",
    "today is your day",
    "you're doing better than you think",
    "one small step at a time",
    "you've got this",
    "thanks for showing up today",
];

/// Pick one greeting at random
pub fn random_greeting() -> &'static str {
    GREETINGS.choose(&mut rand::thread_rng()).copied().unwrap_or_default()
}

/// First line the avatar speaks after a chat connects.
pub fn avatar_greeting(name: &str) -> String {
    format!("Hallo {}, worüber möchtest du heute sprechen?", name)
}
