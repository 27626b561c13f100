#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use kiln::error::{Error, Result};
use kiln::prompt::{Prompt, Prompter};

/// Prompter that replays canned answers instead of asking a terminal.
pub struct ScriptedPrompter {
    pub interactive: bool,
    pub overwrite: bool,
    answers: RefCell<VecDeque<serde_json::Value>>,
    pub asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<serde_json::Value>) -> Self {
        Self {
            interactive: true,
            overwrite: true,
            answers: RefCell::new(answers.into()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// A prompter that behaves like a run without a terminal.
    pub fn detached() -> Self {
        Self { interactive: false, ..Self::new(Vec::new()) }
    }

    pub fn declining() -> Self {
        Self { overwrite: false, ..Self::new(Vec::new()) }
    }
}

impl Prompter for ScriptedPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        self.asked.borrow_mut().push(prompt);
        Ok(self.overwrite)
    }

    fn answer(&self, prompt: &Prompt) -> Result<serde_json::Value> {
        self.asked.borrow_mut().push(prompt.display_title());
        self.answers.borrow_mut().pop_front().ok_or(Error::NotInteractiveError)
    }
}
