//! Output locations: a directory prefix (stem) and a file name (leaf)
//! layered from several sources, and opening the final destination.

use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::loader::{is_explicit_dir, is_stdio, parse_url};
use crate::prompt::Prompter;

/// Where a rendered template goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputLocation {
    pub stem: Option<String>,
    pub leaf: Option<String>,
}

impl OutputLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers `path` on top: a path ending in `/` replaces the stem,
    /// anything else replaces the leaf. Empty paths are skipped.
    pub fn add(&mut self, path: &str) -> &mut Self {
        if path.is_empty() {
            return self;
        }
        if is_prefix(path) {
            self.stem = Some(path.to_string());
        } else {
            self.leaf = Some(path.to_string());
        }
        self
    }

    /// Final path. An absolute leaf ignores the stem; `-` is kept as-is.
    ///
    /// # Errors
    /// * `Error::NoLeafError` if no leaf was ever added
    pub fn path(&self) -> Result<String> {
        let leaf = self.leaf.as_deref().ok_or(Error::NoLeafError)?;

        if is_stdio(leaf) || Path::new(leaf).is_absolute() {
            return Ok(leaf.to_string());
        }

        match self.stem.as_deref() {
            Some(stem) => Ok(Path::new(stem).join(leaf).to_string_lossy().into_owned()),
            None => Ok(leaf.to_string()),
        }
    }
}

/// True when `path` only names a directory prefix.
pub fn is_prefix(path: &str) -> bool {
    is_explicit_dir(path)
}

/// Opens `path` for writing, creating parent directories as needed.
///
/// An existing file is only replaced when `overwrite` is set or the user
/// agrees through `prompter`.
///
/// # Errors
/// * `Error::PathError` for URLs and directory paths
/// * `Error::AbortedError` if the user declines to overwrite
pub fn open_output(
    path: &str,
    overwrite: bool,
    prompter: &dyn Prompter,
) -> Result<Box<dyn Write>> {
    if is_stdio(path) {
        return Ok(Box::new(std::io::stdout()));
    }
    if parse_url(path).is_some() {
        return Err(Error::PathError {
            path: path.to_string(),
            reason: "cannot write to a URL".into(),
        });
    }
    if path.is_empty() || is_explicit_dir(path) {
        return Err(Error::PathError {
            path: path.to_string(),
            reason: "output must name a file".into(),
        });
    }

    let target = Path::new(path);
    if target.exists() && !target.is_dir() {
        let confirmed =
            prompter.confirm(overwrite, format!("File '{path}' already exists. Overwrite?"))?;
        if !confirmed {
            return Err(Error::AbortedError);
        }
    }

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    debug!("Writing to '{path}'.");
    Ok(Box::new(fs::File::create(target)?))
}
