//! Opening parameter documents and templates.
//! A source is a local file, `-` for standard input, or an http(s) URL.
use crate::error::{Error, Result};
use log::debug;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use url::Url;

/// Path that stands for standard input or standard output.
pub const STDIO_PATH: &str = "-";

/// Represents the location a document or template is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Standard input
    Stdin,
    /// http(s) URL
    Http(Url),
    /// Local filesystem path
    FileSystem(PathBuf),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Stdin => write!(f, "standard input"),
            Source::Http(url) => write!(f, "URL: '{url}'"),
            Source::FileSystem(path) => write!(f, "local path: '{}'", path.display()),
        }
    }
}

/// Returns the URL if `s` is an http(s) URL.
pub fn parse_url(s: &str) -> Option<Url> {
    Url::parse(s).ok().filter(|url| matches!(url.scheme(), "http" | "https"))
}

pub fn is_stdio(s: &str) -> bool {
    s == STDIO_PATH
}

/// A path ending in a separator names a directory, never a file.
pub fn is_explicit_dir(s: &str) -> bool {
    s.ends_with('/') || s.ends_with(std::path::MAIN_SEPARATOR)
}

impl Source {
    /// Creates a Source from a path or URL.
    ///
    /// # Errors
    /// * `Error::PathError` if `s` is empty or names a directory
    pub fn from_string(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::PathError { path: s.to_string(), reason: "path is empty".into() });
        }
        if is_stdio(s) {
            return Ok(Self::Stdin);
        }
        if let Some(url) = parse_url(s) {
            return Ok(Self::Http(url));
        }
        if is_explicit_dir(s) {
            return Err(Error::PathError {
                path: s.to_string(),
                reason: "path names a directory".into(),
            });
        }
        Ok(Self::FileSystem(PathBuf::from(s)))
    }
}

/// Trait for opening sources of different kinds.
pub trait SourceLoader {
    /// Opens the source for reading.
    fn open(&self) -> Result<Box<dyn Read>>;
}

pub struct StdinLoader;

impl SourceLoader for StdinLoader {
    fn open(&self) -> Result<Box<dyn Read>> {
        Ok(Box::new(std::io::stdin()))
    }
}

pub struct LocalLoader {
    path: PathBuf,
}

impl LocalLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SourceLoader for LocalLoader {
    fn open(&self) -> Result<Box<dyn Read>> {
        Ok(Box::new(fs::File::open(&self.path)?))
    }
}

pub struct HttpLoader {
    url: Url,
}

impl HttpLoader {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

impl SourceLoader for HttpLoader {
    fn open(&self) -> Result<Box<dyn Read>> {
        debug!("Fetching '{}'.", self.url);
        let http_error = |source| Error::HttpError { url: self.url.to_string(), source };

        let response = reqwest::blocking::get(self.url.clone())
            .and_then(|response| response.error_for_status())
            .map_err(http_error)?;
        Ok(Box::new(response))
    }
}

/// Opens `path` for reading.
pub fn open_source(path: &str) -> Result<Box<dyn Read>> {
    let source = Source::from_string(path)?;
    debug!("Reading from {source}.");

    let loader: Box<dyn SourceLoader> = match source {
        Source::Stdin => Box::new(StdinLoader),
        Source::Http(url) => Box::new(HttpLoader::new(url)),
        Source::FileSystem(path) => Box::new(LocalLoader::new(path)),
    };

    loader.open()
}

/// Reads the whole of `path` as UTF-8 text.
pub fn read_source(path: &str) -> Result<String> {
    let mut content = String::new();
    open_source(path)?.read_to_string(&mut content)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kinds() {
        assert_eq!(Source::from_string("-").unwrap(), Source::Stdin);
        assert!(matches!(Source::from_string("https://example.com/p.toml"), Ok(Source::Http(_))));
        assert_eq!(
            Source::from_string("dir/p.toml").unwrap(),
            Source::FileSystem(PathBuf::from("dir/p.toml"))
        );
    }

    #[test]
    fn test_rejects_empty_and_directories() {
        assert!(matches!(Source::from_string(""), Err(Error::PathError { .. })));
        assert!(matches!(Source::from_string("templates/"), Err(Error::PathError { .. })));
    }

    #[test]
    fn test_only_http_schemes_are_urls() {
        assert!(parse_url("http://example.com/a").is_some());
        assert!(parse_url("c:/windows/p.toml").is_none());
        assert!(parse_url("file.toml").is_none());
    }
}
