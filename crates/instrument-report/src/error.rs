// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for instrument-report

use std::path::PathBuf;

use thiserror::Error;

/// Errors writing a report
#[derive(Debug, Error)]
pub enum EmitError {
    /// Error writing a report file
    #[error("IO error writing {path}: {source}")]
    Io {
        /// The file being written
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JUnit XML serialization error
    #[error("JUnit serialization error: {0}")]
    Junit(String),
}

/// Errors reporting one job log
#[derive(Debug, Error)]
pub enum ReportError {
    /// The log could not be read or was rejected
    #[error("Failed to parse log: {0}")]
    Tests(#[from] instrument_log::TestsError),

    /// The log could not be opened
    #[error("Failed to open log {path}: {source}")]
    OpenLog {
        /// The log path
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// The log never declared a test class
    #[error("No test run found in log for job {job}")]
    NoTestRun {
        /// The job number
        job: usize,
    },

    /// A report could not be written
    #[error("Failed to write report: {0}")]
    Emit(#[from] EmitError),
}
