//! Template expansion engine for kiln.
//! Wraps a MiniJinja environment configured with the document's delimiters
//! and case folding, the helper function library and builtin sub-templates.

use std::io::Write;

use log::debug;
use minijinja::syntax::SyntaxConfig;
use minijinja::value::{Value, ValueKind};
use minijinja::{escape_formatter, AutoEscape, Environment, Output, State, UndefinedBehavior};

use crate::cases::CaseFolding;
use crate::error::{Error, Result};

pub mod builtins;
pub mod functions;

pub const DEFAULT_LEFT_DELIM: &str = "{{";
pub const DEFAULT_RIGHT_DELIM: &str = "}}";

/// Engine settings for one parameter document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub left_delim: String,
    pub right_delim: String,
    pub case: CaseFolding,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            left_delim: DEFAULT_LEFT_DELIM.to_string(),
            right_delim: DEFAULT_RIGHT_DELIM.to_string(),
            case: CaseFolding::default(),
        }
    }
}

fn first_non_empty<'a>(flag: Option<&'a str>, document: Option<&'a str>) -> Option<&'a str> {
    flag.filter(|s| !s.is_empty()).or(document.filter(|s| !s.is_empty()))
}

impl EngineConfig {
    /// Builds the configuration from command-line and document values.
    /// Command-line values win; empty values count as absent.
    ///
    /// # Errors
    /// * `Error::InvalidCaseError` if the chosen case name is unknown
    pub fn resolve(
        flag_left: Option<&str>,
        flag_right: Option<&str>,
        flag_case: Option<&str>,
        doc_left: Option<&str>,
        doc_right: Option<&str>,
        doc_case: Option<&str>,
    ) -> Result<Self> {
        let defaults = Self::default();
        let case = match first_non_empty(flag_case, doc_case) {
            Some(name) => name.parse::<CaseFolding>()?,
            None => defaults.case,
        };

        Ok(Self {
            left_delim: first_non_empty(flag_left, doc_left)
                .map(str::to_string)
                .unwrap_or(defaults.left_delim),
            right_delim: first_non_empty(flag_right, doc_right)
                .map(str::to_string)
                .unwrap_or(defaults.right_delim),
            case,
        })
    }

    /// Block delimiters: `{%`/`%}` shaped, built from the outer characters
    /// of the variable delimiters.
    pub fn block_delimiters(&self) -> (String, String) {
        derived_delimiters(&self.left_delim, &self.right_delim, '%')
    }

    /// Comment delimiters, built like [`EngineConfig::block_delimiters`] with `#`.
    pub fn comment_delimiters(&self) -> (String, String) {
        derived_delimiters(&self.left_delim, &self.right_delim, '#')
    }

    fn syntax(&self) -> Result<SyntaxConfig> {
        let (block_left, block_right) = self.block_delimiters();
        let (comment_left, comment_right) = self.comment_delimiters();
        Ok(SyntaxConfig::builder()
            .variable_delimiters(self.left_delim.clone(), self.right_delim.clone())
            .block_delimiters(block_left, block_right)
            .comment_delimiters(comment_left, comment_right)
            .build()?)
    }
}

/// `{{`/`}}` with `%` gives `{%`/`%}`; `<<`/`>>` gives `<%`/`%>`.
fn derived_delimiters(left: &str, right: &str, marker: char) -> (String, String) {
    let mut open = String::new();
    open.extend(left.chars().next());
    open.push(marker);

    let mut close = String::new();
    close.push(marker);
    close.extend(right.chars().next_back());

    (open, close)
}

/// Writes booleans as `true`/`false`; everything else as MiniJinja would.
pub(crate) fn format_value(
    out: &mut Output,
    state: &State,
    value: &Value,
) -> std::result::Result<(), minijinja::Error> {
    if value.kind() == ValueKind::Bool {
        out.write_str(if value.is_true() { "true" } else { "false" })?;
        return Ok(());
    }
    escape_formatter(out, state, value)
}

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Expands placeholders in a single string.
    ///
    /// # Arguments
    /// * `name` - Label used in error messages (field path or flag name)
    /// * `content` - String to expand; empty input yields empty output
    /// * `data` - Root context
    ///
    /// # Errors
    /// * `Error::ExpansionError` if `content` fails to parse or render
    fn expand(&self, name: &str, content: &str, data: &serde_json::Value) -> Result<String>;

    /// Parses a full template body, ready to be executed later.
    fn parse(&self, name: &str, body: String) -> Result<ParsedTemplate>;
}

/// A template body that parsed successfully.
pub struct ParsedTemplate {
    env: Environment<'static>,
    name: String,
}

impl ParsedTemplate {
    /// Executes the template and writes the result into `out`.
    pub fn render_to(&self, data: &serde_json::Value, out: &mut dyn Write) -> Result<()> {
        let template = self.env.get_template(&self.name)?;
        let rendered = template.render(data)?;
        out.write_all(rendered.as_bytes())?;
        Ok(())
    }
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// Base environment every expansion and template starts from
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a renderer for `config`.
    ///
    /// # Errors
    /// * `Error::MinijinjaError` if the delimiters are unusable
    pub fn new(config: &EngineConfig) -> Result<Self> {
        debug!(
            "Template engine: delimiters '{}' '{}', case folding {:?}.",
            config.left_delim, config.right_delim, config.case
        );

        let mut env = Environment::new();
        env.set_syntax(config.syntax()?);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(UndefinedBehavior::Lenient);
        env.set_formatter(format_value);

        functions::register(&mut env, config.case);
        builtins::register(&mut env, config)?;

        Ok(Self { env })
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn expand(&self, name: &str, content: &str, data: &serde_json::Value) -> Result<String> {
        if content.is_empty() {
            return Ok(String::new());
        }

        self.env
            .render_named_str(name, content, data)
            .map_err(|source| Error::ExpansionError { name: name.to_string(), source })
    }

    fn parse(&self, name: &str, body: String) -> Result<ParsedTemplate> {
        let mut env = self.env.clone();
        env.add_template_owned(name.to_string(), body)?;
        Ok(ParsedTemplate { env, name: name.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renderer() -> MiniJinjaRenderer {
        MiniJinjaRenderer::new(&EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_expand_without_placeholders_is_identity() {
        let out = renderer().expand("x", "plain text", &json!({})).unwrap();
        assert_eq!(out, "plain text");
    }

    #[test]
    fn test_expand_empty() {
        assert_eq!(renderer().expand("x", "", &json!({})).unwrap(), "");
    }

    #[test]
    fn test_expand_reports_name() {
        let err = renderer().expand("--output", "{{ unclosed", &json!({})).unwrap_err();
        assert!(err.to_string().contains("--output"));
    }

    #[test]
    fn test_custom_delimiters() {
        let config = EngineConfig::resolve(Some("<<"), Some(">>"), None, None, None, None).unwrap();
        let renderer = MiniJinjaRenderer::new(&config).unwrap();
        let out = renderer
            .expand("x", "<% if on %><< name >><% endif %><# note #>{{ raw }}", &json!({"on": true, "name": "a"}))
            .unwrap();
        assert_eq!(out, "a{{ raw }}");
    }

    #[test]
    fn test_default_block_and_comment_delimiters() {
        let config = EngineConfig::default();
        assert_eq!(config.block_delimiters(), ("{%".to_string(), "%}".to_string()));
        assert_eq!(config.comment_delimiters(), ("{#".to_string(), "#}".to_string()));

        let out = renderer()
            .expand("x", "{# hidden #}{% for x in xs %}[{{ x }}]{% endfor %}", &json!({"xs": [1, 2]}))
            .unwrap();
        assert_eq!(out, "[1][2]");
    }

    #[test]
    fn test_booleans_render_lowercase() {
        let out = renderer()
            .expand("x", "{{ on }} {{ off }} {{ ismap(m) }}", &json!({"on": true, "off": false, "m": {}}))
            .unwrap();
        assert_eq!(out, "true false true");
    }

    #[test]
    fn test_flag_wins_over_document() {
        let config =
            EngineConfig::resolve(Some("[["), None, None, Some("<<"), Some("]]"), Some("turkish"))
                .unwrap();
        assert_eq!(config.left_delim, "[[");
        assert_eq!(config.right_delim, "]]");
        assert_eq!(config.case, CaseFolding::Turkish);
    }

    #[test]
    fn test_invalid_case() {
        assert!(matches!(
            EngineConfig::resolve(None, None, Some("klingon"), None, None, None),
            Err(Error::InvalidCaseError(_))
        ));
    }

    #[test]
    fn test_turkish_case_folding_reaches_functions() {
        let config = EngineConfig::resolve(None, None, Some("turkish"), None, None, None).unwrap();
        let renderer = MiniJinjaRenderer::new(&config).unwrap();
        assert_eq!(renderer.expand("x", "{{ uppercase('istanbul') }}", &json!({})).unwrap(), "İSTANBUL");
    }

    #[test]
    fn test_join_builtin() {
        let source = concat!(
            "{% macro line(x) %}<{{ x }}>{% endmacro %}",
            "{% with items=xs, sep=\", \", preamble=\": \" %}{% include \"join\" %}{% endwith %}",
        );
        let out = renderer().expand("x", source, &json!({"xs": ["a", "b"]})).unwrap();
        assert_eq!(out, ": <a>, <b>");

        let empty = renderer().expand("x", source, &json!({"xs": []})).unwrap();
        assert_eq!(empty, "");
    }

    #[test]
    fn test_parsed_template_keeps_trailing_newline() {
        let parsed = renderer().parse("t.tmpl", "Hi {{ name }}\n".to_string()).unwrap();
        let mut out = Vec::new();
        parsed.render_to(&json!({"name": "Ann"}), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hi Ann\n");
    }
}
