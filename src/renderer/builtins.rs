//! Named sub-templates available to every template.
//!
//! Sources are written with the default `{{ }}` / `{% %}` / `{# #}` syntax
//! and translated to the configured delimiters when registered.

use minijinja::Environment;

use super::EngineConfig;
use crate::error::Result;

/// Renders `items` separated by `sep` (newline by default), calling the
/// caller's `line` macro per item. `preamble` is emitted first when there
/// is at least one item.
const JOIN: &str = concat!(
    "{%- for item in items -%}",
    "{%- if loop.first %}{{ preamble }}{% else %}{{ sep if sep is defined else \"\\n\" }}{% endif -%}",
    "{{ line(item) }}",
    "{%- endfor -%}",
);

const BUILTINS: [(&str, &str); 1] = [("join", JOIN)];

/// Registers every builtin sub-template on `env`.
pub fn register(env: &mut Environment<'static>, config: &EngineConfig) -> Result<()> {
    for (name, source) in BUILTINS {
        env.add_template_owned(name, translate(source, config))?;
    }
    Ok(())
}

/// Rewrites default-syntax delimiters to the ones `config` uses.
pub fn translate(source: &str, config: &EngineConfig) -> String {
    let (block_left, block_right) = config.block_delimiters();
    let (comment_left, comment_right) = config.comment_delimiters();
    let mut translated = String::with_capacity(source.len());
    let mut rest = source;

    while !rest.is_empty() {
        let replacement = match rest.get(..2) {
            Some("{{") => Some(config.left_delim.as_str()),
            Some("}}") => Some(config.right_delim.as_str()),
            Some("{%") => Some(block_left.as_str()),
            Some("%}") => Some(block_right.as_str()),
            Some("{#") => Some(comment_left.as_str()),
            Some("#}") => Some(comment_right.as_str()),
            _ => None,
        };

        match replacement {
            Some(replacement) => {
                translated.push_str(replacement);
                rest = &rest[2..];
            }
            None => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    translated.push(c);
                }
                rest = chars.as_str();
            }
        }
    }

    translated
}
