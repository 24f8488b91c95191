// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! instrument-log: Android instrumentation log parsing
//!
//! This library crate reconstructs module → suite → test results from the
//! line-oriented output of an Android instrumentation test runner, and
//! aggregates them into pass/fail statistics and sanitized failure excerpts
//! for the instrument-report CLI.
//!
//! # Example
//!
//! ```
//! use instrument_log::{InstrumentationParser, summarize};
//!
//! let mut parser = InstrumentationParser::new("storage");
//! for line in [
//!     "INSTRUMENTATION_STATUS: class=com.amplifyframework.storage.FooTest",
//!     "INSTRUMENTATION_STATUS: test=bar",
//!     "INSTRUMENTATION_STATUS_CODE: 0",
//! ] {
//!     parser.process_line(line).unwrap();
//! }
//!
//! let run = parser.finish().unwrap();
//! let summary = summarize(&run);
//! assert_eq!(summary.success_percentage(), Ok(1.0));
//! ```

pub mod aggregate;
pub mod error;
pub mod line;
pub mod model;
pub mod parser;
pub mod result;

pub use aggregate::{FailureSample, RunSummary, SuiteSummary, TestCaseResult, summarize};
pub use error::{AggregateError, LineError, ParseError, TestsError};
pub use line::{DEFAULT_NAMESPACE_PREFIX, LogLine, classify};
pub use model::{Test, TestRun, TestSuite};
pub use parser::{
    InstrumentationParser, ParseOptions, ParsedLog, ParserCursor, TestCompletion, parse_log,
    parse_reader,
};
pub use result::{InstrumentationStatus, TestOutcome};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::aggregate::{RunSummary, summarize};
    pub use crate::error::{ParseError, TestsError};
    pub use crate::parser::{InstrumentationParser, ParseOptions, parse_reader};
    pub use crate::result::TestOutcome;
}
