//! Error handling for kiln.
//! Defines the crate-wide error type and the process-boundary handler.

use std::io;
use thiserror::Error;

use crate::params::errors::ParamError;

/// Environment variables that switch the top-level handler to debug output.
pub const DEBUG_ENV_VARS: [&str; 2] = ["KILN_DEBUG", "DEBUG"];

/// Custom error types for kiln operations.
///
/// Decode, shape, expansion, resolution and I/O failures each get their own
/// variant so callers can tell a malformed document from a declined overwrite.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    #[error("Failed to decode TOML document: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Failed to decode YAML/JSON document: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Could not guess params format from file name: {path}")]
    UnknownFormatError { path: String },

    #[error("Unrecognized format '{0}'. Expected 'toml', 'yaml' or 'json'.")]
    InvalidFormatError(String),

    /// The document decoded fine but a field has the wrong shape.
    #[error(transparent)]
    ParamError(#[from] ParamError),

    /// A placeholder string failed to parse or render.
    #[error("Failed to expand '{name}': {source}")]
    ExpansionError {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Template error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Invalid value for `case`: '{0}'. Expected 'turkish' or 'azeri' (or empty).")]
    InvalidCaseError(String),

    #[error("Output filename has only prefix.")]
    NoLeafError,

    #[error("Missing template file path.")]
    MissingTemplateError,

    /// The user declined to overwrite an existing file.
    #[error("Aborted by user.")]
    AbortedError,

    #[error("Tried to prompt while not connected to a terminal.")]
    NotInteractiveError,

    #[error("Failed to prefill prompt '{name}' with '{value}': {reason}")]
    PrefillError { name: String, value: String, reason: String },

    #[error("Prompt error: {0}")]
    PromptError(#[from] dialoguer::Error),

    #[error("Failed to fetch '{url}': {source}")]
    HttpError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid path '{path}': {reason}")]
    PathError { path: String, reason: String },

    /// Attributes a failure to one orchestration step (and pair, if several).
    #[error("Failed to {stage}: {source}")]
    RenderError {
        stage: String,
        #[source]
        source: Box<Error>,
    },

    /// Attributes a failure to one parameter document of a batch.
    #[error("{path}: {source}")]
    DocumentError {
        path: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wraps `self` with the name of the orchestration step that failed.
    pub fn at_stage<S: Into<String>>(self, stage: S) -> Self {
        Error::RenderError { stage: stage.into(), source: Box::new(self) }
    }

    /// True when the user cancelled, looking through attribution wrappers.
    pub fn is_aborted(&self) -> bool {
        match self {
            Error::AbortedError => true,
            Error::RenderError { source, .. } | Error::DocumentError { source, .. } => {
                source.is_aborted()
            }
            _ => false,
        }
    }
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns true when one of [`DEBUG_ENV_VARS`] is set to a non-empty value.
pub fn debug_enabled() -> bool {
    DEBUG_ENV_VARS
        .iter()
        .any(|name| std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false))
}

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to report
///
/// # Behavior
/// Prints the error message to stderr (the `Debug` form when debugging is
/// enabled) and exits with status code 1
pub fn default_error_handler<E: std::fmt::Display + std::fmt::Debug>(err: E) -> ! {
    if debug_enabled() {
        eprintln!("{err:?}");
    } else {
        eprintln!("{err}");
    }
    std::process::exit(1);
}
