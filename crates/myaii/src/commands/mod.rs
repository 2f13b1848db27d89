//! Command implementations for myaii CLI.
//!
//! Each submodule implements the logic for a command group.

pub mod avatar;
pub mod diary;
pub mod doctor;
pub mod greet;
pub mod onboard;
pub mod profile;
pub mod topics;
