use std::io;

use kiln::error::Error;
use kiln::field_path::FieldPath;
use kiln::params::errors::{ParamError, ParamErrorKind};

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    assert_eq!(Error::NoLeafError.to_string(), "Output filename has only prefix.");
    assert_eq!(Error::AbortedError.to_string(), "Aborted by user.");
    assert_eq!(
        Error::InvalidCaseError("klingon".to_string()).to_string(),
        "Invalid value for `case`: 'klingon'. Expected 'turkish' or 'azeri' (or empty)."
    );
}

#[test]
fn test_param_error_is_transparent() {
    let err: Error =
        ParamError::new(ParamErrorKind::MetaWrongType, FieldPath::root("meta")).into();
    assert_eq!(err.to_string(), "`meta` field present but does not contain a table.");
}

#[test]
fn test_stage_attribution() {
    let err = Error::NoLeafError.at_stage("generate output path for pair #1");
    assert_eq!(
        err.to_string(),
        "Failed to generate output path for pair #1: Output filename has only prefix."
    );
}

#[test]
fn test_aborted_is_seen_through_wrappers() {
    let err = Error::DocumentError {
        path: "doc.toml".to_string(),
        source: Box::new(Error::AbortedError.at_stage("create output file")),
    };
    assert!(err.is_aborted());
    assert!(!Error::NoLeafError.at_stage("x").is_aborted());
}
