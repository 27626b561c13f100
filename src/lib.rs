//! kiln generates files from templates driven by a parameter document.
//! The document supplies template data plus a `meta` section naming the
//! templates to render, their destinations and the prompts to ask first.

/// String case conversions with optional Turkish/Azeri case folding
pub mod cases;

/// Command-line interface module for the kiln application
pub mod cli;

/// Error types and handling for the kiln application
pub mod error;

/// Paths into a parameter document, for error messages and labels
pub mod field_path;

/// Opening documents and templates from files, stdin or http(s)
pub mod loader;

/// Output locations and opening destinations for writing
pub mod output;

/// Parameter document parsing and placeholder expansion
pub mod params;

/// User input and interaction handling
pub mod prompt;

/// End-to-end rendering of parameter documents
pub mod render;

/// Template engine configuration, helper functions and builtins
pub mod renderer;
