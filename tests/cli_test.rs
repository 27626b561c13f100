use clap::Parser;
use kiln::cli::Args;
use kiln::params::ParamsFormat;
use std::ffi::OsString;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("kiln")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let parsed = Args::try_parse_from(make_args(&["params.toml"])).unwrap();

    assert_eq!(parsed.params_files, ["params.toml"]);
    assert_eq!(parsed.template, None);
    assert_eq!(parsed.output, None);
    assert_eq!(parsed.meta, "meta");
    assert!(parsed.prompt_values.is_empty());
    assert!(!parsed.overwrite);
    assert!(!parsed.verbose);
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--template",
        "t.tmpl",
        "--output",
        "out/",
        "--prompt-value",
        "name=Ann",
        "--prompt-value",
        "go=true",
        "--meta",
        "kiln",
        "--left-delim",
        "<<",
        "--right-delim",
        ">>",
        "--case",
        "azeri",
        "--format",
        "yaml",
        "--overwrite",
        "--verbose",
        "a.yaml",
        "b.yaml",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.params_files, ["a.yaml", "b.yaml"]);
    assert_eq!(parsed.template.as_deref(), Some("t.tmpl"));
    assert_eq!(parsed.output.as_deref(), Some("out/"));
    assert_eq!(
        parsed.prompt_values,
        [("name".to_string(), "Ann".to_string()), ("go".to_string(), "true".to_string())]
    );
    assert_eq!(parsed.meta, "kiln");
    assert_eq!(parsed.left_delim.as_deref(), Some("<<"));
    assert_eq!(parsed.right_delim.as_deref(), Some(">>"));
    assert_eq!(parsed.case.as_deref(), Some("azeri"));
    assert_eq!(parsed.format, Some(ParamsFormat::Yaml));
    assert!(parsed.overwrite);
    assert!(parsed.verbose);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-t", "t", "-o", "-", "-p", "k=v", "-m", "m", "-f", "toml", "-y", "-v", "-"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.params_files, ["-"]);
    assert_eq!(parsed.output.as_deref(), Some("-"));
    assert_eq!(parsed.format, Some(ParamsFormat::Toml));
    assert!(parsed.overwrite);
    assert!(parsed.verbose);
}

#[test]
fn test_url_params_file() {
    let parsed =
        Args::try_parse_from(make_args(&["https://example.com/kits/params.toml"])).unwrap();
    assert_eq!(parsed.params_files, ["https://example.com/kits/params.toml"]);
}

#[test]
fn test_missing_args() {
    assert!(Args::try_parse_from(make_args(&[])).is_err());
}

#[test]
fn test_malformed_prompt_value() {
    assert!(Args::try_parse_from(make_args(&["-p", "novalue", "params.toml"])).is_err());
}

#[test]
fn test_unknown_format() {
    assert!(Args::try_parse_from(make_args(&["-f", "ini", "params.toml"])).is_err());
}
