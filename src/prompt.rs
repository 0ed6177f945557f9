//! Yes/no confirmation capability.
//!
//! Destructive operations ask a [`Confirm`] implementation instead of reading
//! the terminal directly, so automation and tests can answer deterministically.

use anyhow::Context;
use std::io::{stdin, stdout, BufRead, Write};

use crate::error::Result;

pub trait Confirm {
    /// Ask `question`; true means proceed.
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Reads the answer from stdin. Anything other than `y`/`yes` declines,
/// including EOF.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str) -> Result<bool> {
        let mut out = stdout();
        write!(out, "{question} [y/N]: ").context("Failed to write prompt")?;
        out.flush().context("Failed to flush prompt")?;

        let mut input = String::new();
        stdin()
            .lock()
            .read_line(&mut input)
            .context("Failed to read confirmation response")?;

        Ok(is_yes(&input))
    }
}

/// Answers every question with a fixed value (`--yes`, tests, automation).
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl FixedAnswer {
    pub const YES: FixedAnswer = FixedAnswer(true);
    pub const NO: FixedAnswer = FixedAnswer(false);
}

impl Confirm for FixedAnswer {
    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(self.0)
    }
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
