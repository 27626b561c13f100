//! Placeholder expansion over a parsed document.
//!
//! Expansion is single pass: every string is rendered against a snapshot
//! of the data taken before the pass, so text produced by one placeholder
//! is never rendered again.

use log::debug;
use serde_json::Value;

use super::{Data, Params, ParamsPath};
use crate::error::Result;
use crate::field_path::FieldPath;
use crate::renderer::TemplateRenderer;

/// Expands prompt names and titles against the decoded data.
/// Runs before prompting; kinds and options are left alone.
pub fn expand_prompt_params(
    params: &mut Params,
    meta_key: &str,
    renderer: &dyn TemplateRenderer,
) -> Result<()> {
    let context = Value::Object(params.data.clone());
    let prompts_path = FieldPath::root(meta_key).join("prompts");

    for (i, prompt) in params.prompts.iter_mut().enumerate() {
        let path = prompts_path.join(i);
        prompt.name = renderer.expand(&path.join("name").to_string(), &prompt.name, &context)?;
        prompt.title = renderer.expand(&path.join("title").to_string(), &prompt.title, &context)?;
    }

    Ok(())
}

/// Expands every string in the data, then every pair path.
///
/// The meta section is left as parsed; its fields are expanded by their
/// own passes. Pair paths see the data as it is after expansion.
pub fn expand_params(
    params: &mut Params,
    meta_key: &str,
    renderer: &dyn TemplateRenderer,
) -> Result<()> {
    let snapshot = Value::Object(params.data.clone());
    let data = std::mem::take(&mut params.data);
    params.data = data
        .into_iter()
        .map(|(key, value)| {
            if key == meta_key {
                return Ok((key, value));
            }
            let path = FieldPath::root(key.as_str());
            let expanded = expand_value(value, &path, &snapshot, renderer)?;
            Ok((key, expanded))
        })
        .collect::<Result<Data>>()?;
    debug!("Expanded document data.");

    let context = Value::Object(params.data.clone());
    for pair in params.pairs.iter_mut() {
        expand_path(&mut pair.template, &pair.path.join("template"), &context, renderer)?;
        expand_path(&mut pair.output, &pair.path.join("output"), &context, renderer)?;
    }

    Ok(())
}

fn expand_path(
    path: &mut ParamsPath,
    label: &FieldPath,
    context: &Value,
    renderer: &dyn TemplateRenderer,
) -> Result<()> {
    path.path = renderer.expand(&label.to_string(), &path.path, context)?;
    Ok(())
}

fn expand_map(
    map: Data,
    path: &FieldPath,
    context: &Value,
    renderer: &dyn TemplateRenderer,
) -> Result<Data> {
    map.into_iter()
        .map(|(key, value)| {
            let child = path.join(key.as_str());
            Ok((key, expand_value(value, &child, context, renderer)?))
        })
        .collect()
}

fn expand_value(
    value: Value,
    path: &FieldPath,
    context: &Value,
    renderer: &dyn TemplateRenderer,
) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(renderer.expand(&path.to_string(), &s, context)?)),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| expand_value(item, &path.join(i), context, renderer))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => expand_map(map, path, context, renderer).map(Value::Object),
        other => Ok(other),
    }
}
