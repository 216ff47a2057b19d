//! Platform abstraction layer
//!
//! The round lifecycle only needs one thing from the window: a yes/no
//! "play again?" dialog and a way to close. Terminal and scripted
//! implementations live here.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Window/dialog capability consumed at round end
pub trait Prompt {
    /// Ask a yes/no question, returns true for yes
    fn ask_yes_no(&mut self, message: &str) -> bool;

    /// Close the window (the player declined to continue)
    fn close(&mut self) {}
}

/// Interactive prompt on stdin/stdout
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask_yes_no(&mut self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                log::warn!("Failed to read answer: {}", e);
                false
            }
        }
    }

    fn close(&mut self) {
        log::info!("Window closed");
    }
}

/// Prompt that replays canned answers (headless runs and tests)
///
/// Answers "no" once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    /// Every message shown, in order
    pub asked: Vec<String>,
    pub closed: bool,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
            closed: false,
        }
    }

    /// Say yes `rounds - 1` times, then no
    pub fn for_rounds(rounds: u32) -> Self {
        Self::new((1..rounds).map(|_| true))
    }
}

impl Prompt for ScriptedPrompt {
    fn ask_yes_no(&mut self, message: &str) -> bool {
        self.asked.push(message.to_string());
        self.answers.pop_front().unwrap_or(false)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
