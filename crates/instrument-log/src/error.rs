// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for instrument-log

use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

/// Fatal errors at the log reader boundary
///
/// These abort the whole log. Per-line problems are reported as
/// [`ParseError`] instead and never stop parsing.
#[derive(Debug, Error)]
pub enum TestsError {
    /// Error reading the instrumentation log
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The log exceeded the configured line limit
    #[error("Log exceeds the limit of {limit} lines")]
    LogTooLarge {
        /// The configured maximum number of lines
        limit: usize,
    },

    /// Error serializing results
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A problem with a single log line
///
/// Parsing continues after any of these.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A status code or test name arrived without an open class/test context
    #[error("Malformed sequence: {context}")]
    MalformedSequence {
        /// What was missing when the line arrived
        context: String,
    },

    /// The status code payload is not an integer
    #[error("Invalid status code {payload:?}: {source}")]
    InvalidStatusCode {
        /// The raw payload after the status code prefix
        payload: String,
        /// The underlying integer parse failure
        source: ParseIntError,
    },

    /// The line looks like instrumentation output but matches no known tag
    #[error("Unrecognized line: {line}")]
    UnrecognizedLine {
        /// The raw line text
        line: String,
    },
}

impl ParseError {
    pub(crate) fn malformed(context: impl Into<String>) -> Self {
        Self::MalformedSequence {
            context: context.into(),
        }
    }

    /// Whether this error is only a diagnostic (an unknown line) rather than
    /// a structural problem
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::UnrecognizedLine { .. })
    }
}

/// A [`ParseError`] located in the log
#[derive(Debug)]
pub struct LineError {
    /// 1-based line number
    pub line_number: usize,
    /// The raw (trimmed) line
    pub line: String,
    /// What went wrong
    pub error: ParseError,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} [{}]", self.line_number, self.error, self.line)
    }
}

impl std::error::Error for LineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Errors computing aggregate statistics
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    /// Neither passing nor failing tests were recorded, so a success
    /// percentage is undefined
    #[error("No tests executed in {scope}")]
    NoTestsExecuted {
        /// The suite or module the statistic was requested for
        scope: String,
    },
}
