/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template parsing.

use thiserror::Error;

/// Error raised when a template source cannot be parsed.
///
/// The display form mirrors Go's `text/template/parse` diagnostics:
/// `template: <name>:<line>: <message>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template: {name}:{line}: {message}")]
pub struct ParseError {
    /// Name of the tree being parsed when the error occurred.
    pub name: String,
    /// 1-based line of the offending action.
    pub line: usize,
    /// Human-readable diagnostic.
    pub message: String,
}

impl ParseError {
    pub fn new(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line,
            message: message.into(),
        }
    }
}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;
