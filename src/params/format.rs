//! Parameter document formats and decoding into a JSON-shaped tree.

use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::error::{Error, Result};

/// Decoded document root.
pub type Data = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsFormat {
    Toml,
    /// YAML, which also covers JSON.
    Yaml,
}

impl fmt::Display for ParamsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsFormat::Toml => f.write_str("toml"),
            ParamsFormat::Yaml => f.write_str("yaml/json"),
        }
    }
}

impl FromStr for ParamsFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "toml" => Ok(ParamsFormat::Toml),
            "yaml" | "yml" | "json" => Ok(ParamsFormat::Yaml),
            other => Err(Error::InvalidFormatError(other.to_string())),
        }
    }
}

impl ParamsFormat {
    /// Guesses the format from the extension of `path`.
    pub fn guess(path: &str) -> Option<Self> {
        let (_, ext) = path.rsplit_once('.')?;
        ext.parse().ok()
    }

    /// Uses `explicit` when given, otherwise guesses from `path`.
    ///
    /// # Errors
    /// * `Error::UnknownFormatError` if nothing is given and the extension is unknown
    pub fn resolve(explicit: Option<ParamsFormat>, path: &str) -> Result<Self> {
        match explicit {
            Some(format) => Ok(format),
            None => Self::guess(path)
                .ok_or_else(|| Error::UnknownFormatError { path: path.to_string() }),
        }
    }

    /// Decodes `content` into a mapping.
    ///
    /// An empty YAML document decodes to an empty mapping.
    pub fn decode(self, content: &str) -> Result<Data> {
        debug!("Decoding parameters as {self}.");
        match self {
            ParamsFormat::Toml => {
                let table: toml::Table = toml::from_str(content)?;
                Ok(table.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect())
            }
            ParamsFormat::Yaml => {
                let data: Option<Data> = serde_yaml::from_str(content)?;
                Ok(data.unwrap_or_default())
            }
        }
    }
}

/// Converts a TOML value, rendering datetimes as their TOML text.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::from(i),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table.into_iter().map(|(k, v)| (k, toml_to_json(v))).collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_format() {
        assert_eq!(ParamsFormat::guess("a/params.toml"), Some(ParamsFormat::Toml));
        assert_eq!(ParamsFormat::guess("params.yaml"), Some(ParamsFormat::Yaml));
        assert_eq!(ParamsFormat::guess("params.json"), Some(ParamsFormat::Yaml));
        assert_eq!(ParamsFormat::guess("params.ini"), None);
        assert_eq!(ParamsFormat::guess("-"), None);
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        assert_eq!(
            ParamsFormat::resolve(Some(ParamsFormat::Toml), "-").unwrap(),
            ParamsFormat::Toml
        );
        assert!(matches!(
            ParamsFormat::resolve(None, "params.txt"),
            Err(Error::UnknownFormatError { .. })
        ));
    }

    #[test]
    fn test_decode_toml_datetime_as_string() {
        let data = ParamsFormat::Toml.decode("when = 1979-05-27\nn = 3").unwrap();
        assert_eq!(data["when"], serde_json::json!("1979-05-27"));
        assert_eq!(data["n"], serde_json::json!(3));
    }

    #[test]
    fn test_decode_empty_yaml() {
        assert!(ParamsFormat::Yaml.decode("").unwrap().is_empty());
    }
}
