//! Drives one parameter document from source to rendered files.
//!
//! Order matters: prompt labels are expanded before prompting, answers are
//! merged before the rest of the document is expanded, and every pair is
//! rendered against the fully expanded data.

use std::io::Write;

use indexmap::IndexMap;
use log::{debug, error, warn};

use crate::error::{Error, Result};
use crate::loader;
use crate::output::{is_prefix, open_output, OutputLocation};
use crate::params::expand::{expand_params, expand_prompt_params};
use crate::params::{parse_params, ParamsFormat, ParseParamsOptions};
use crate::prompt::{merge_answers, resolve_prompts, Prompter};
use crate::renderer::{EngineConfig, MiniJinjaRenderer, TemplateRenderer};

/// Everything needed to render one parameter document.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub params_path: String,
    /// Guessed from `params_path` when absent.
    pub params_format: Option<ParamsFormat>,
    /// `--template` value; empty when not given.
    pub template_path: String,
    /// `--output` value; empty when not given.
    pub output_path: String,
    pub meta_key: String,
    pub prompt_values: IndexMap<String, String>,
    pub overwrite: bool,

    pub left_delim: Option<String>,
    pub right_delim: Option<String>,
    pub case: Option<String>,
}

/// A template written to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPair {
    pub template: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The document declares no pairs.
    NothingToDo,
    Rendered(Vec<RenderedPair>),
}

/// Renders every pair declared by the document at `opts.params_path`.
///
/// # Errors
/// Any failure is returned wrapped in `Error::RenderError` naming the step
/// (and the pair index when there are several pairs).
pub fn render(opts: &RenderOptions, prompter: &dyn Prompter) -> Result<RenderOutcome> {
    let params_path = opts.params_path.as_str();
    let format = ParamsFormat::resolve(opts.params_format, params_path)?;

    let content =
        loader::read_source(params_path).map_err(|e| e.at_stage("open parameter file"))?;
    let parse_opts = ParseParamsOptions { meta_key: opts.meta_key.clone() };
    let mut params = parse_params(&content, format, &parse_opts)
        .map_err(|e| e.at_stage("parse parameter file"))?;

    if params.pairs.is_empty() {
        eprintln!("Nothing to do.");
        return Ok(RenderOutcome::NothingToDo);
    }

    let config = EngineConfig::resolve(
        opts.left_delim.as_deref(),
        opts.right_delim.as_deref(),
        opts.case.as_deref(),
        params.template_left_delim.as_deref(),
        params.template_right_delim.as_deref(),
        params.template_case.as_deref(),
    )?;
    let renderer = MiniJinjaRenderer::new(&config)?;

    expand_prompt_params(&mut params, parse_opts.meta_key(), &renderer)
        .map_err(|e| e.at_stage("expand prompts"))?;
    let answers = resolve_prompts(&mut params.prompts, &opts.prompt_values, prompter)
        .map_err(|e| e.at_stage("run prompts"))?;
    debug!("Collected {} prompt answer(s).", answers.len());
    merge_answers(&mut params.data, answers);

    expand_params(&mut params, parse_opts.meta_key(), &renderer)
        .map_err(|e| e.at_stage("expand parameters"))?;
    let context = serde_json::Value::Object(params.data.clone());

    let single = params.pairs.len() == 1;
    let (template_flag, output_flag) = if single {
        (
            renderer
                .expand("--template", &opts.template_path, &context)
                .map_err(|e| e.at_stage("expand template path"))?,
            renderer
                .expand("--output", &opts.output_path, &context)
                .map_err(|e| e.at_stage("expand output path"))?,
        )
    } else {
        if !opts.template_path.is_empty() {
            warn!("Ignoring template flag for multiple pairs.");
        }
        let output_flag = if opts.output_path.is_empty() || is_prefix(&opts.output_path) {
            opts.output_path.clone()
        } else {
            warn!("Ignoring non-prefix output flag for multiple pairs.");
            String::new()
        };
        (String::new(), output_flag)
    };

    let mut rendered = Vec::with_capacity(params.pairs.len());
    for (i, pair) in params.pairs.iter().enumerate() {
        let stage = |step: &str| {
            if single {
                step.to_string()
            } else {
                format!("{step} for pair #{i}")
            }
        };

        let template_path = if template_flag.is_empty() {
            pair.template.resolve(params_path)
        } else {
            template_flag.clone()
        };
        if template_path.is_empty() {
            return Err(Error::MissingTemplateError.at_stage(stage("find template file")));
        }

        let body = loader::read_source(&template_path)
            .map_err(|e| e.at_stage(stage("open template file")))?;
        let template = renderer
            .parse(&template_path, body)
            .map_err(|e| e.at_stage(stage("parse template")))?;

        let mut location = OutputLocation::new();
        location.add(&pair.output.resolve(params_path)).add(&output_flag);
        let output_path =
            location.path().map_err(|e| e.at_stage(stage("generate output path")))?;

        let mut output = open_output(&output_path, opts.overwrite, prompter)
            .map_err(|e| e.at_stage(stage("create output file")))?;
        template
            .render_to(&context, &mut output)
            .and_then(|()| output.flush().map_err(Error::from))
            .map_err(|e| e.at_stage(stage("execute template")))?;

        if single {
            eprintln!("{template_path} -> {output_path}");
        } else {
            eprintln!("{i} {template_path} -> {output_path}");
        }
        rendered.push(RenderedPair { template: template_path, output: output_path });
    }

    Ok(RenderOutcome::Rendered(rendered))
}

/// Renders several documents with the same options, one after another.
///
/// A failing document does not stop the rest; each result is returned
/// with its document path, failures wrapped in `Error::DocumentError`.
pub fn render_batch(
    params_paths: &[String],
    opts: &RenderOptions,
    prompter: &dyn Prompter,
) -> Vec<(String, Result<RenderOutcome>)> {
    params_paths
        .iter()
        .map(|path| {
            let doc_opts = RenderOptions { params_path: path.clone(), ..opts.clone() };
            let result = render(&doc_opts, prompter).map_err(|e| {
                error!("{path}: {e}");
                Error::DocumentError { path: path.clone(), source: Box::new(e) }
            });
            (path.clone(), result)
        })
        .collect()
}
