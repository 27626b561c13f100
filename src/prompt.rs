//! Interactive prompts for values the parameter document leaves open.
//! Prompts can be answered upfront (`--prompt-value name=value`); whatever
//! is left goes through a [`Prompter`], by default backed by dialoguer.

use std::fmt;
use std::io::IsTerminal;
use std::str::FromStr;

use dialoguer::{Confirm, Editor, Input, Select};
use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};

/// Prompt kinds, in the order they are listed to users. The first one is the default.
pub const SUPPORTED_PROMPT_KINDS: [&str; 4] = ["input", "text", "select", "confirm"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptKind {
    /// Single line of text.
    #[default]
    Input,
    /// Multi-line text.
    Text,
    /// One of a fixed set of options.
    Select,
    /// Yes/no.
    Confirm,
}

impl PromptKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptKind::Input => "input",
            PromptKind::Text => "text",
            PromptKind::Select => "select",
            PromptKind::Confirm => "confirm",
        }
    }
}

impl FromStr for PromptKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "input" => Ok(PromptKind::Input),
            "text" => Ok(PromptKind::Text),
            "select" => Ok(PromptKind::Select),
            "confirm" => Ok(PromptKind::Confirm),
            _ => Err(()),
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One choice of a `select` prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub title: String,
    pub value: serde_json::Value,
}

/// Kind-specific payload of a prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PromptSpecific {
    #[default]
    None,
    Select { options: Vec<SelectOption> },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub name: String,
    /// Empty means "use the default title".
    pub title: String,
    pub specific: PromptSpecific,
    /// Answer given ahead of time, if any.
    pub value: Option<serde_json::Value>,
}

impl Prompt {
    /// The title shown to the user.
    pub fn display_title(&self) -> String {
        if self.title.is_empty() {
            format!("Value for '{}':", self.name)
        } else {
            self.title.clone()
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        match &self.specific {
            PromptSpecific::Select { options } => options,
            PromptSpecific::None => &[],
        }
    }

    /// Fills the prompt from a raw upfront string, converting it for the kind.
    ///
    /// # Errors
    /// * `Error::PrefillError` if `raw` matches no `select` option title
    ///   or is not a boolean for `confirm`
    pub fn try_prefill(&mut self, raw: &str) -> Result<()> {
        let value = match self.kind {
            PromptKind::Input | PromptKind::Text => serde_json::Value::String(raw.to_string()),
            PromptKind::Select => self
                .options()
                .iter()
                .find(|option| option.title == raw)
                .map(|option| option.value.clone())
                .ok_or_else(|| self.prefill_error(
                    raw,
                    "Given value for `select` prompt does not correspond to one of the options. (Needs to match the title)",
                ))?,
            PromptKind::Confirm => parse_bool(raw)
                .map(serde_json::Value::Bool)
                .ok_or_else(|| self.prefill_error(raw, "value is not a boolean"))?,
        };

        self.value = Some(value);
        Ok(())
    }

    fn prefill_error(&self, raw: &str, reason: &str) -> Error {
        Error::PrefillError {
            name: self.name.clone(),
            value: raw.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Parses the usual boolean spellings: `1 t T true TRUE True` and their negatives.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Source of answers and confirmations.
pub trait Prompter {
    /// Whether a user can be asked anything at all.
    fn is_interactive(&self) -> bool;

    /// Asks a yes/no question; returns `true` right away when `skip` is set.
    fn confirm(&self, skip: bool, prompt: String) -> Result<bool>;

    /// Collects the answer to a single prompt.
    fn answer(&self, prompt: &Prompt) -> Result<serde_json::Value>;
}

/// Terminal prompter built on dialoguer.
#[derive(Debug, Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal()
    }

    fn confirm(&self, skip: bool, prompt: String) -> Result<bool> {
        if skip {
            return Ok(true);
        }
        if !self.is_interactive() {
            return Err(Error::NotInteractiveError);
        }

        Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
    }

    fn answer(&self, prompt: &Prompt) -> Result<serde_json::Value> {
        let title = prompt.display_title();

        let value = match prompt.kind {
            PromptKind::Input => {
                let input: String =
                    Input::new().with_prompt(title).allow_empty(true).interact_text()?;
                serde_json::Value::String(input)
            }
            PromptKind::Text => {
                eprintln!("{title}");
                let text = Editor::new().edit("")?.unwrap_or_default();
                serde_json::Value::String(text)
            }
            PromptKind::Select => {
                let options = prompt.options();
                let selection = Select::new()
                    .with_prompt(title)
                    .default(0)
                    .items(options.iter().map(|option| option.title.as_str()))
                    .interact()?;
                options[selection].value.clone()
            }
            PromptKind::Confirm => {
                serde_json::Value::Bool(Confirm::new().with_prompt(title).interact()?)
            }
        };

        Ok(value)
    }
}

/// Resolves every prompt to a value, keyed by prompt name.
///
/// # Arguments
/// * `prompts` - Prompt specifications, already expanded
/// * `upfront` - Raw answers given ahead of time, by prompt name
/// * `prompter` - Used for whatever `upfront` does not cover
///
/// # Returns
/// * `Result<IndexMap<String, serde_json::Value>>` - Answers in prompt order
///
/// # Errors
/// * `Error::PrefillError` if an upfront value does not fit its prompt
/// * `Error::NotInteractiveError` if some prompt still needs an answer and
///   `prompter` cannot ask
pub fn resolve_prompts(
    prompts: &mut [Prompt],
    upfront: &IndexMap<String, String>,
    prompter: &dyn Prompter,
) -> Result<IndexMap<String, serde_json::Value>> {
    for prompt in prompts.iter_mut() {
        if let Some(raw) = upfront.get(&prompt.name) {
            prompt.try_prefill(raw)?;
            debug!("Prompt '{}' answered upfront.", prompt.name);
        }
    }

    let pending = prompts.iter().filter(|prompt| prompt.value.is_none()).count();
    if pending > 0 && !prompter.is_interactive() {
        return Err(Error::NotInteractiveError);
    }

    let mut answers = IndexMap::new();
    for prompt in prompts.iter() {
        let value = match &prompt.value {
            Some(value) => value.clone(),
            None => prompter.answer(prompt)?,
        };
        answers.insert(prompt.name.clone(), value);
    }

    Ok(answers)
}

/// Writes `answers` into `data`, replacing values of the same name.
pub fn merge_answers(
    data: &mut serde_json::Map<String, serde_json::Value>,
    answers: IndexMap<String, serde_json::Value>,
) {
    for (name, value) in answers {
        data.insert(name, value);
    }
}
