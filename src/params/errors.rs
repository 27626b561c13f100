//! Shape errors for the `meta` section of a parameter document.
//!
//! Every field and every way it can be malformed has its own
//! [`ParamErrorKind`], so callers (and tests) can match on the exact
//! condition while users get the offending field path in the message.

use thiserror::Error;

use crate::field_path::FieldPath;
use crate::prompt::SUPPORTED_PROMPT_KINDS;

const NOT_A_TABLE: &str = "field present but does not contain a table.";
const NOT_A_STRING: &str = "field present but does not contain a string.";
const NOT_AN_ARRAY: &str = "field present but does not contain an array.";
const NOT_A_PATH: &str = "field present but contains neither a string nor a table.";
const MISSING: &str = "missing required field.";
const MISSING_IN_MULTIPLE: &str = "required field is required for multiple files but is missing.";
const FROM_INVALID: &str = "field does not contain one of the allowed values: [cwd params].";

/// A malformed field, located by its path in the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{path}` {}", .kind.reason())]
pub struct ParamError {
    pub path: FieldPath,
    pub kind: ParamErrorKind,
}

impl ParamError {
    pub fn new(kind: ParamErrorKind, path: FieldPath) -> Self {
        Self { path, kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamErrorKind {
    MetaWrongType,

    RootTemplateWrongType,
    RootTemplatePathMissing,
    RootTemplatePathWrongType,
    RootTemplateFromWrongType,
    RootTemplateFromInvalid,
    RootTemplateMissingInMultiple,

    RootOutputWrongType,
    RootOutputPathMissing,
    RootOutputPathWrongType,
    RootOutputFromWrongType,
    RootOutputFromInvalid,
    RootOutputMissingInMultiple,

    PairsWrongType,
    PairWrongType,

    PairTemplateMissing,
    PairTemplateWrongType,
    PairTemplatePathMissing,
    PairTemplatePathWrongType,
    PairTemplateFromWrongType,
    PairTemplateFromInvalid,

    PairOutputMissing,
    PairOutputWrongType,
    PairOutputPathMissing,
    PairOutputPathWrongType,
    PairOutputFromWrongType,
    PairOutputFromInvalid,

    PromptsWrongType,
    PromptWrongType,
    PromptNameMissing,
    PromptNameWrongType,
    PromptKindWrongType,
    PromptKindInvalid,
    PromptTitleWrongType,
    PromptOptionsMissing,
    PromptOptionsWrongType,
    PromptOptionWrongType,
    PromptOptionTitleMissing,
    PromptOptionTitleWrongType,

    LeftDelimWrongType,
    RightDelimWrongType,
    CaseWrongType,
}

impl ParamErrorKind {
    /// Human-readable reason, appended after the field path.
    pub fn reason(self) -> String {
        use ParamErrorKind::*;

        match self {
            MetaWrongType | PairWrongType | PromptWrongType => NOT_A_TABLE.to_string(),

            RootTemplateWrongType | RootOutputWrongType | PairTemplateWrongType
            | PairOutputWrongType => NOT_A_PATH.to_string(),

            RootTemplatePathMissing | RootOutputPathMissing | PairTemplateMissing
            | PairTemplatePathMissing | PairOutputMissing | PairOutputPathMissing
            | PromptNameMissing | PromptOptionTitleMissing => MISSING.to_string(),

            RootTemplatePathWrongType | RootTemplateFromWrongType | RootOutputPathWrongType
            | RootOutputFromWrongType | PairTemplatePathWrongType | PairTemplateFromWrongType
            | PairOutputPathWrongType | PairOutputFromWrongType | PromptNameWrongType
            | PromptKindWrongType | PromptTitleWrongType | PromptOptionTitleWrongType
            | LeftDelimWrongType | RightDelimWrongType | CaseWrongType => NOT_A_STRING.to_string(),

            RootTemplateFromInvalid | RootOutputFromInvalid | PairTemplateFromInvalid
            | PairOutputFromInvalid => FROM_INVALID.to_string(),

            RootTemplateMissingInMultiple | RootOutputMissingInMultiple => {
                MISSING_IN_MULTIPLE.to_string()
            }

            PairsWrongType | PromptsWrongType | PromptOptionsWrongType => NOT_AN_ARRAY.to_string(),

            PromptKindInvalid => format!(
                "field does not contain one of the allowed values: [{}].",
                SUPPORTED_PROMPT_KINDS.join(" ")
            ),
            PromptOptionsMissing => "required field for `select` is missing.".to_string(),
            PromptOptionWrongType => {
                "field present but contains neither a string nor a table.".to_string()
            }
        }
    }
}

/// The error kinds a path value reports, one bundle per call site.
#[derive(Debug, Clone, Copy)]
pub struct PathValueErrors {
    pub wrong_type: ParamErrorKind,
    pub path_missing: ParamErrorKind,
    pub path_wrong_type: ParamErrorKind,
    pub from_wrong_type: ParamErrorKind,
    pub from_invalid: ParamErrorKind,
}

pub const ROOT_TEMPLATE_ERRORS: PathValueErrors = PathValueErrors {
    wrong_type: ParamErrorKind::RootTemplateWrongType,
    path_missing: ParamErrorKind::RootTemplatePathMissing,
    path_wrong_type: ParamErrorKind::RootTemplatePathWrongType,
    from_wrong_type: ParamErrorKind::RootTemplateFromWrongType,
    from_invalid: ParamErrorKind::RootTemplateFromInvalid,
};

pub const ROOT_OUTPUT_ERRORS: PathValueErrors = PathValueErrors {
    wrong_type: ParamErrorKind::RootOutputWrongType,
    path_missing: ParamErrorKind::RootOutputPathMissing,
    path_wrong_type: ParamErrorKind::RootOutputPathWrongType,
    from_wrong_type: ParamErrorKind::RootOutputFromWrongType,
    from_invalid: ParamErrorKind::RootOutputFromInvalid,
};

pub const PAIR_TEMPLATE_ERRORS: PathValueErrors = PathValueErrors {
    wrong_type: ParamErrorKind::PairTemplateWrongType,
    path_missing: ParamErrorKind::PairTemplatePathMissing,
    path_wrong_type: ParamErrorKind::PairTemplatePathWrongType,
    from_wrong_type: ParamErrorKind::PairTemplateFromWrongType,
    from_invalid: ParamErrorKind::PairTemplateFromInvalid,
};

pub const PAIR_OUTPUT_ERRORS: PathValueErrors = PathValueErrors {
    wrong_type: ParamErrorKind::PairOutputWrongType,
    path_missing: ParamErrorKind::PairOutputPathMissing,
    path_wrong_type: ParamErrorKind::PairOutputPathWrongType,
    from_wrong_type: ParamErrorKind::PairOutputFromWrongType,
    from_invalid: ParamErrorKind::PairOutputFromInvalid,
};
