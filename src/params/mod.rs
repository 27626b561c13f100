//! Parameter documents: the data a template is rendered with, plus the
//! `meta` section telling kiln which templates to render, where to, and
//! what to ask the user first.

use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::error::Result;
use crate::field_path::FieldPath;
use crate::loader;
use crate::prompt::{Prompt, PromptKind, PromptSpecific, SelectOption};

pub mod errors;
pub mod expand;
pub mod format;

use errors::{
    ParamError, ParamErrorKind, PathValueErrors, PAIR_OUTPUT_ERRORS, PAIR_TEMPLATE_ERRORS,
    ROOT_OUTPUT_ERRORS, ROOT_TEMPLATE_ERRORS,
};
pub use format::{Data, ParamsFormat};

/// Default key of the meta section.
pub const DEFAULT_META_KEY: &str = "meta";

/// What a relative path is relative to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParamsPathFrom {
    /// The process working directory.
    #[default]
    Cwd,
    /// The directory containing the parameter document.
    Params,
}

/// A path declared in the document. An empty `path` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamsPath {
    pub path: String,
    pub from: ParamsPathFrom,
}

impl ParamsPath {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Resolves the path given where the parameter document lives.
    ///
    /// An empty path resolves to an empty string.
    pub fn resolve(&self, params_path: &str) -> String {
        if self.is_empty() {
            return String::new();
        }

        match self.from {
            ParamsPathFrom::Cwd => self.path.clone(),
            ParamsPathFrom::Params => {
                if let Some(url) = loader::parse_url(params_path) {
                    if let Ok(joined) = url.join(&self.path) {
                        return joined.to_string();
                    }
                }
                let params_dir = Path::new(params_path).parent().unwrap_or(Path::new(""));
                params_dir.join(&self.path).to_string_lossy().into_owned()
            }
        }
    }
}

/// One template to render and where to write it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamsPair {
    pub template: ParamsPath,
    pub output: ParamsPath,
    /// Where the pair was declared (`meta` or `meta.pairs[i]`).
    pub path: FieldPath,
}

#[derive(Debug, Clone, Default)]
pub struct ParseParamsOptions {
    /// Key of the meta section; empty means [`DEFAULT_META_KEY`].
    pub meta_key: String,
}

impl ParseParamsOptions {
    pub fn meta_key(&self) -> &str {
        if self.meta_key.is_empty() {
            DEFAULT_META_KEY
        } else {
            &self.meta_key
        }
    }
}

/// A parsed parameter document.
#[derive(Debug, Clone, Default)]
pub struct Params {
    pub data: Data,
    pub pairs: Vec<ParamsPair>,
    pub prompts: Vec<Prompt>,

    pub template_left_delim: Option<String>,
    pub template_right_delim: Option<String>,
    pub template_case: Option<String>,
}

/// Parses a parameter document.
///
/// # Arguments
/// * `content` - Raw document text
/// * `format` - Document format
/// * `opts` - Parsing options (meta key)
///
/// # Errors
/// * Decode errors from the format library, as-is
/// * `Error::ParamError` when the meta section is malformed
pub fn parse_params(content: &str, format: ParamsFormat, opts: &ParseParamsOptions) -> Result<Params> {
    let mut params = Params { data: format.decode(content)?, ..Params::default() };
    params.parse_meta(opts.meta_key())?;
    Ok(params)
}

impl Params {
    fn parse_meta(&mut self, meta_key: &str) -> std::result::Result<(), ParamError> {
        let Some(meta) = self.data.get(meta_key) else {
            debug!("No '{meta_key}' section, nothing to render.");
            return Ok(());
        };

        let path = FieldPath::root(meta_key);
        let meta = meta
            .as_object()
            .ok_or_else(|| ParamError::new(ParamErrorKind::MetaWrongType, path.clone()))?;

        let pairs = parse_meta_pairs(meta, &path)?;
        let prompts = parse_meta_prompts(meta, &path)?;

        let left_delim =
            optional_string(meta, &path, "left_delim", ParamErrorKind::LeftDelimWrongType)?;
        let right_delim =
            optional_string(meta, &path, "right_delim", ParamErrorKind::RightDelimWrongType)?;
        let case = optional_string(meta, &path, "case", ParamErrorKind::CaseWrongType)?;

        self.pairs = pairs;
        self.prompts = prompts;
        self.template_left_delim = left_delim;
        self.template_right_delim = right_delim;
        self.template_case = case;
        Ok(())
    }
}

type Table = serde_json::Map<String, Value>;

fn optional_string(
    table: &Table,
    path: &FieldPath,
    key: &str,
    wrong_type: ParamErrorKind,
) -> std::result::Result<Option<String>, ParamError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ParamError::new(wrong_type, path.join(key))),
    }
}

fn required_string(
    table: &Table,
    path: &FieldPath,
    key: &str,
    missing: ParamErrorKind,
    wrong_type: ParamErrorKind,
) -> std::result::Result<String, ParamError> {
    optional_string(table, path, key, wrong_type)?
        .ok_or_else(|| ParamError::new(missing, path.join(key)))
}

/// Parses a path value: either a bare string or `{ path, from }`.
pub fn parse_path_value(
    value: &Value,
    path: &FieldPath,
    errors: PathValueErrors,
) -> std::result::Result<ParamsPath, ParamError> {
    let table = match value {
        Value::String(s) => return Ok(ParamsPath { path: s.clone(), from: ParamsPathFrom::Cwd }),
        Value::Object(table) => table,
        _ => return Err(ParamError::new(errors.wrong_type, path.clone())),
    };

    let target =
        required_string(table, path, "path", errors.path_missing, errors.path_wrong_type)?;

    let from = match optional_string(table, path, "from", errors.from_wrong_type)?.as_deref() {
        None | Some("cwd") => ParamsPathFrom::Cwd,
        Some("params") => ParamsPathFrom::Params,
        Some(_) => return Err(ParamError::new(errors.from_invalid, path.join("from"))),
    };

    Ok(ParamsPath { path: target, from })
}

fn parse_meta_pairs(
    meta: &Table,
    path: &FieldPath,
) -> std::result::Result<Vec<ParamsPair>, ParamError> {
    let mut pairs = Vec::new();

    let root_template = meta
        .get("template")
        .map(|v| parse_path_value(v, &path.join("template"), ROOT_TEMPLATE_ERRORS))
        .transpose()?
        .unwrap_or_default();
    let root_output = meta
        .get("output")
        .map(|v| parse_path_value(v, &path.join("output"), ROOT_OUTPUT_ERRORS))
        .transpose()?
        .unwrap_or_default();

    if !root_template.is_empty() || !root_output.is_empty() {
        pairs.push(ParamsPair { template: root_template, output: root_output, path: path.clone() });
    }

    if let Some(entries) = meta.get("pairs") {
        let entries = entries.as_array().ok_or_else(|| {
            ParamError::new(ParamErrorKind::PairsWrongType, path.join("pairs"))
        })?;

        for (i, entry) in entries.iter().enumerate() {
            let entry_path = path.join("pairs").join(i);
            let entry = entry.as_object().ok_or_else(|| {
                ParamError::new(ParamErrorKind::PairWrongType, entry_path.clone())
            })?;
            pairs.push(parse_meta_pair(entry, entry_path)?);
        }
    }

    // With several outputs one value can no longer stand in for the other.
    if pairs.len() > 1 {
        let first = &pairs[0];
        if first.template.is_empty() {
            return Err(ParamError::new(
                ParamErrorKind::RootTemplateMissingInMultiple,
                first.path.join("template"),
            ));
        }
        if first.output.is_empty() {
            return Err(ParamError::new(
                ParamErrorKind::RootOutputMissingInMultiple,
                first.path.join("output"),
            ));
        }
    }

    Ok(pairs)
}

fn parse_meta_pair(entry: &Table, path: FieldPath) -> std::result::Result<ParamsPair, ParamError> {
    let template = entry.get("template").ok_or_else(|| {
        ParamError::new(ParamErrorKind::PairTemplateMissing, path.join("template"))
    })?;
    let template = parse_path_value(template, &path.join("template"), PAIR_TEMPLATE_ERRORS)?;

    let output = entry.get("output").ok_or_else(|| {
        ParamError::new(ParamErrorKind::PairOutputMissing, path.join("output"))
    })?;
    let output = parse_path_value(output, &path.join("output"), PAIR_OUTPUT_ERRORS)?;

    Ok(ParamsPair { template, output, path })
}

fn parse_meta_prompts(
    meta: &Table,
    path: &FieldPath,
) -> std::result::Result<Vec<Prompt>, ParamError> {
    let Some(entries) = meta.get("prompts") else {
        return Ok(Vec::new());
    };

    let entries = entries
        .as_array()
        .ok_or_else(|| ParamError::new(ParamErrorKind::PromptsWrongType, path.join("prompts")))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let entry_path = path.join("prompts").join(i);
            let entry = entry.as_object().ok_or_else(|| {
                ParamError::new(ParamErrorKind::PromptWrongType, entry_path.clone())
            })?;
            parse_meta_prompt(entry, &entry_path)
        })
        .collect()
}

fn parse_meta_prompt(entry: &Table, path: &FieldPath) -> std::result::Result<Prompt, ParamError> {
    let name = required_string(
        entry,
        path,
        "name",
        ParamErrorKind::PromptNameMissing,
        ParamErrorKind::PromptNameWrongType,
    )?;

    let kind = match optional_string(entry, path, "kind", ParamErrorKind::PromptKindWrongType)? {
        None => PromptKind::default(),
        Some(kind) => kind.parse::<PromptKind>().map_err(|_| {
            ParamError::new(ParamErrorKind::PromptKindInvalid, path.join("kind"))
        })?,
    };

    let title = optional_string(entry, path, "title", ParamErrorKind::PromptTitleWrongType)?
        .unwrap_or_default();

    let specific = match kind {
        PromptKind::Select => PromptSpecific::Select { options: parse_select_options(entry, path)? },
        _ => PromptSpecific::None,
    };

    Ok(Prompt { kind, name, title, specific, value: None })
}

fn parse_select_options(
    entry: &Table,
    path: &FieldPath,
) -> std::result::Result<Vec<SelectOption>, ParamError> {
    let options_path = path.join("options");
    let options = entry
        .get("options")
        .ok_or_else(|| ParamError::new(ParamErrorKind::PromptOptionsMissing, options_path.clone()))?
        .as_array()
        .ok_or_else(|| {
            ParamError::new(ParamErrorKind::PromptOptionsWrongType, options_path.clone())
        })?;

    options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let option_path = options_path.join(i);
            match option {
                Value::String(s) => {
                    Ok(SelectOption { title: s.clone(), value: Value::String(s.clone()) })
                }
                Value::Object(table) => {
                    let title = required_string(
                        table,
                        &option_path,
                        "title",
                        ParamErrorKind::PromptOptionTitleMissing,
                        ParamErrorKind::PromptOptionTitleWrongType,
                    )?;
                    let value =
                        table.get("value").cloned().unwrap_or_else(|| Value::String(title.clone()));
                    Ok(SelectOption { title, value })
                }
                _ => Err(ParamError::new(ParamErrorKind::PromptOptionWrongType, option_path)),
            }
        })
        .collect()
}
