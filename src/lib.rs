pub mod checkpoints;
pub mod commands;
pub mod completions;
pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod notify;
pub mod prompt;
pub mod schedule;
pub mod utils;
