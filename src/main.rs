//! kiln's main application entry point.
//! Parses arguments, sets up logging and renders every parameter document.

use kiln::{
    cli::{get_args, Args},
    error::{default_error_handler, Error},
    prompt::DialoguerPrompter,
    render::{render, render_batch},
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(err) = run(args) {
        if err.downcast_ref::<Error>().is_some_and(Error::is_aborted) {
            eprintln!("{}", Error::AbortedError);
            std::process::exit(1);
        }
        default_error_handler(err);
    }
}

/// Renders the documents named on the command line.
///
/// A single document fails the whole run on error. With several documents
/// each one is rendered regardless of earlier failures, and the run fails
/// at the end if any of them did.
fn run(args: Args) -> anyhow::Result<()> {
    let prompter = DialoguerPrompter::new();
    let opts = args.render_options();

    if args.params_files.len() == 1 {
        render(&opts, &prompter)?;
        return Ok(());
    }

    let results = render_batch(&args.params_files, &opts, &prompter);
    let failed: Vec<&str> =
        results.iter().filter(|(_, r)| r.is_err()).map(|(path, _)| path.as_str()).collect();

    if !failed.is_empty() {
        anyhow::bail!(
            "{} of {} parameter files failed: {}",
            failed.len(),
            results.len(),
            failed.join(", ")
        );
    }
    Ok(())
}
