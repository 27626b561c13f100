//! Command-line interface implementation for kiln.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use indexmap::IndexMap;

use crate::params::{ParamsFormat, DEFAULT_META_KEY};
use crate::render::RenderOptions;

/// Command-line arguments structure for kiln.
#[derive(Parser, Debug)]
#[command(author, version, about = "kiln: generate files from templates and a parameter document", long_about = None)]
pub struct Args {
    /// Parameter documents (TOML, YAML or JSON), `-` for stdin, or http(s) URLs
    #[arg(value_name = "PARAMS_FILE", required = true)]
    pub params_files: Vec<String>,

    /// Template file; overrides the document. Ignored for multiple pairs
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<String>,

    /// Output file, or directory prefix ending in `/`; `-` for stdout.
    /// For multiple pairs only a prefix is honoured
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Answer a prompt ahead of time. Can be repeated
    #[arg(short = 'p', long = "prompt-value", value_name = "KEY=VAL", value_parser = parse_key_val)]
    pub prompt_values: Vec<(String, String)>,

    /// Key of the section holding kiln directives
    #[arg(short, long, value_name = "KEY", default_value = DEFAULT_META_KEY)]
    pub meta: String,

    /// Left template delimiter
    #[arg(short, long, value_name = "DELIM")]
    pub left_delim: Option<String>,

    /// Right template delimiter
    #[arg(short, long, value_name = "DELIM")]
    pub right_delim: Option<String>,

    /// Case folding used by case conversion helpers
    #[arg(short, long, value_parser = ["turkish", "azeri"])]
    pub case: Option<String>,

    /// Parameter document format; guessed from the extension by default
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<ParamsFormat>,

    /// Overwrite existing files without asking
    #[arg(short = 'y', long)]
    pub overwrite: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid KEY=VAL: no `=` found in `{s}`"))
}

fn parse_format(s: &str) -> Result<ParamsFormat, String> {
    s.parse().map_err(|e: crate::error::Error| e.to_string())
}

impl Args {
    /// Options shared by every document on the command line.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            params_path: self.params_files.first().cloned().unwrap_or_default(),
            params_format: self.format,
            template_path: self.template.clone().unwrap_or_default(),
            output_path: self.output.clone().unwrap_or_default(),
            meta_key: self.meta.clone(),
            prompt_values: self.prompt_values.iter().cloned().collect::<IndexMap<_, _>>(),
            overwrite: self.overwrite,
            left_delim: self.left_delim.clone(),
            right_delim: self.right_delim.clone(),
            case: self.case.clone(),
        }
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
