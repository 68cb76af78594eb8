//! Line-oriented user input.
//!
//! Interactive flows read through [`Prompter`] so they can be driven by a
//! scripted implementation in tests.

use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;

/// Answers accepted as "yes" by confirmations.
const AFFIRMATIVE: &[&str] = &["s", "sim", "y", "yes"];

pub trait Prompter {
    /// Read one line. Empty input is allowed and returned trimmed.
    fn input(&mut self, label: &str) -> anyhow::Result<String>;

    /// Read one line, returning `default` for empty input.
    fn input_or(&mut self, label: &str, default: &str) -> anyhow::Result<String> {
        let answer = self.input(&format!("{label} [{default}]"))?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// `s/N` confirmation; anything but an affirmative answer is "no".
    fn confirm(&mut self, label: &str) -> anyhow::Result<bool> {
        let answer = self.input(&format!("{label} (s/N)"))?;
        Ok(is_affirmative(&answer))
    }
}

#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    AFFIRMATIVE.contains(&answer.trim().to_lowercase().as_str())
}

/// Positive integer from user input, or `default` for anything else.
#[must_use]
pub fn positive_or(answer: &str, default: u32) -> u32 {
    answer
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// Prompts on the controlling terminal.
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, label: &str) -> anyhow::Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }
}
