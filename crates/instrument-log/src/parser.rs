// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Streaming instrumentation log parser
//!
//! [`InstrumentationParser`] folds classified lines into a [`TestRun`] one line
//! at a time, in input order, without lookahead. All in-progress state lives
//! in a [`ParserCursor`] owned by the parser, so independent logs can be
//! parsed side by side.
//!
//! # Example
//!
//! ```
//! use instrument_log::parser::parse_log;
//!
//! let log = "INSTRUMENTATION_STATUS: class=com.amplifyframework.storage.FooTest
//! INSTRUMENTATION_STATUS: test=bar
//! INSTRUMENTATION_STATUS_CODE: 0";
//!
//! let parsed = parse_log("storage", log);
//! let run = parsed.run.expect("a class was declared");
//! assert_eq!(run.suite("FooTest").map(|s| s.passing_tests), Some(1));
//! ```

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{LineError, ParseError, TestsError};
use crate::line::{DEFAULT_NAMESPACE_PREFIX, LogLine, classify};
use crate::model::TestRun;
use crate::result::InstrumentationStatus;

const STACK_TRACE_JOINER: &str = " // ";
const ERROR_IN_PREFIX: &str = "Error in ";

// ============================================================================
// Cursor and events
// ============================================================================

/// In-progress parser state: where the next line applies
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserCursor {
    /// Class of the most recent class declaration
    pub class_name: Option<String>,
    /// Test of the most recent test declaration
    pub test_name: Option<String>,
    /// Stream/stack payload accumulated for the current test
    pub stack_trace: String,
    /// Declared index of the running test
    pub current_index: Option<u32>,
    /// Declared number of tests in the run
    pub num_tests: Option<u32>,
}

/// A status code that was applied to a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCompletion {
    /// Suite (class) name
    pub suite: String,
    /// Test (method) name
    pub test: String,
    /// The raw status code
    pub status_code: i32,
}

// ============================================================================
// Streaming parser
// ============================================================================

/// A streaming parser for instrumentation logs
#[derive(Debug)]
pub struct InstrumentationParser {
    module: String,
    namespace_prefix: String,
    run: Option<TestRun>,
    pending_execution_time: Option<String>,
    cursor: ParserCursor,
    lines: usize,
}

impl InstrumentationParser {
    /// Create a parser for a module's log
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            run: None,
            pending_execution_time: None,
            cursor: ParserCursor::default(),
            lines: 0,
        }
    }

    /// Use a different class namespace prefix
    ///
    /// The prefix is stripped from class names and makes continuation lines
    /// that mention it part of the stack trace.
    #[must_use]
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }

    /// Process a single line of output
    ///
    /// Returns the completed test when the line is a status code.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing what was wrong with this line. The
    /// parser stays usable and later lines are processed normally.
    pub fn process_line(&mut self, line: &str) -> Result<Option<TestCompletion>, ParseError> {
        self.lines += 1;

        match classify(line, &self.namespace_prefix) {
            LogLine::ClassDeclaration(class) => {
                self.enter_class(class);
                Ok(None)
            }
            LogLine::TestNameDeclaration(test) => {
                self.enter_test(test)?;
                Ok(None)
            }
            LogLine::StreamChunk(text) | LogLine::StackTraceChunk(text) => {
                self.cursor.stack_trace = text.to_string();
                Ok(None)
            }
            LogLine::StackTraceContinuation(text) => {
                self.continue_stack_trace(text);
                Ok(None)
            }
            LogLine::StatusCode(payload) => self.record_status(payload).map(Some),
            LogLine::ExecutionTime(time) => {
                info!(module = %self.module, execution_time = %time, "Test run execution time");
                match self.run.as_mut() {
                    Some(run) => run.execution_time = Some(time),
                    None => self.pending_execution_time = Some(time),
                }
                Ok(None)
            }
            LogLine::CurrentTestIndex(index) => {
                self.cursor.current_index = index.trim().parse().ok();
                debug!(
                    current = ?self.cursor.current_index,
                    total = ?self.cursor.num_tests,
                    "Test index"
                );
                Ok(None)
            }
            LogLine::NumTests(count) => {
                self.cursor.num_tests = count.trim().parse().ok();
                Ok(None)
            }
            LogLine::IgnorableKnown => Ok(None),
            LogLine::Unrecognized(text) => {
                warn!(module = %self.module, line = %text, "Unrecognized instrumentation line");
                Err(ParseError::UnrecognizedLine {
                    line: text.to_string(),
                })
            }
        }
    }

    /// The run built so far, if any class has been declared
    #[must_use]
    pub fn run(&self) -> Option<&TestRun> {
        self.run.as_ref()
    }

    /// The current cursor
    #[must_use]
    pub fn cursor(&self) -> &ParserCursor {
        &self.cursor
    }

    /// Number of lines processed so far
    #[must_use]
    pub fn lines_processed(&self) -> usize {
        self.lines
    }

    /// Finish parsing and return the run
    ///
    /// Returns `None` when the log never declared a test class.
    #[must_use]
    pub fn finish(self) -> Option<TestRun> {
        self.run
    }

    fn enter_class(&mut self, class: &str) {
        let run = self.run.get_or_insert_with(|| {
            debug!(module = %self.module, "Starting test run");
            let mut run = TestRun::new(self.module.clone());
            run.execution_time = self.pending_execution_time.take();
            run
        });

        if run.suite(class).is_none() {
            debug!(suite = %class, "New test suite");
        }
        run.suite_or_insert(class);
        self.cursor.class_name = Some(class.to_string());
    }

    fn enter_test(&mut self, test: &str) -> Result<(), ParseError> {
        let test = test.trim();
        let suite = match (self.cursor.class_name.as_deref(), self.run.as_mut()) {
            (Some(class), Some(run)) => run.suite_mut(class),
            _ => None,
        };

        let Some(suite) = suite else {
            self.cursor.test_name = None;
            return Err(ParseError::malformed(format!(
                "test `{test}` declared before any test class"
            )));
        };

        suite.test_or_insert(test);
        self.cursor.test_name = Some(test.to_string());
        Ok(())
    }

    fn continue_stack_trace(&mut self, text: &str) {
        if !self.is_relevant(text) {
            return;
        }

        if self.cursor.stack_trace.trim().is_empty() {
            self.cursor.stack_trace = text
                .strip_prefix(ERROR_IN_PREFIX)
                .unwrap_or(text)
                .to_string();
        } else {
            self.cursor.stack_trace.push_str(STACK_TRACE_JOINER);
            self.cursor.stack_trace.push_str(text);
        }
    }

    fn is_relevant(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        lower.contains("error")
            || lower.contains("exception")
            || (!self.namespace_prefix.is_empty()
                && lower.contains(&self.namespace_prefix.to_lowercase()))
    }

    fn record_status(&mut self, payload: &str) -> Result<TestCompletion, ParseError> {
        // The status line closes the test whether or not it can be applied
        let stack_trace = std::mem::take(&mut self.cursor.stack_trace);

        let payload = payload.trim();
        let code: i32 = payload
            .parse()
            .map_err(|source| ParseError::InvalidStatusCode {
                payload: payload.to_string(),
                source,
            })?;

        let (Some(class), Some(test_name)) = (
            self.cursor.class_name.as_deref(),
            self.cursor.test_name.as_deref(),
        ) else {
            return Err(ParseError::malformed(format!(
                "status code {code} without an open test"
            )));
        };
        let suite = self
            .run
            .as_mut()
            .and_then(|run| run.suite_mut(class))
            .ok_or_else(|| {
                ParseError::malformed(format!("status code {code} for unknown class `{class}`"))
            })?;
        let test = suite.tests.get_mut(test_name).ok_or_else(|| {
            ParseError::malformed(format!(
                "status code {code} for unknown test `{class}#{test_name}`"
            ))
        })?;

        test.status_code = code;
        match InstrumentationStatus::from_code(code) {
            Some(InstrumentationStatus::Ok) => {
                suite.passing_tests += 1;
                test.stack_trace = None;
            }
            Some(InstrumentationStatus::Failure) => {
                suite.failing_tests += 1;
                warn!(
                    module = %self.module,
                    class = %class,
                    test = %test_name,
                    stack_trace = %stack_trace,
                    "Test failed"
                );
                test.stack_trace = Some(stack_trace);
            }
            Some(InstrumentationStatus::Error) => {
                warn!(
                    module = %self.module,
                    class = %class,
                    test = %test_name,
                    stack_trace = %stack_trace,
                    "Test errored"
                );
                test.stack_trace = Some(stack_trace);
            }
            // Only the latest status describes the test
            _ => test.stack_trace = None,
        }

        Ok(TestCompletion {
            suite: class.to_string(),
            test: test_name.to_string(),
            status_code: code,
        })
    }

    fn process_recording(&mut self, line: &str, errors: &mut Vec<LineError>) {
        if let Err(error) = self.process_line(line) {
            errors.push(LineError {
                line_number: self.lines,
                line: line.trim().to_string(),
                error,
            });
        }
    }
}

// ============================================================================
// Whole-log parsing
// ============================================================================

/// Options for [`parse_reader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Class namespace prefix
    pub namespace_prefix: String,
    /// Abort when the log has more lines than this
    pub max_lines: Option<usize>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            max_lines: None,
        }
    }
}

impl ParseOptions {
    /// Limit the number of lines read
    #[must_use]
    pub fn with_max_lines(mut self, limit: usize) -> Self {
        self.max_lines = Some(limit);
        self
    }

    /// Use a different class namespace prefix
    #[must_use]
    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefix = prefix.into();
        self
    }
}

/// Result of parsing a complete log
#[derive(Debug)]
pub struct ParsedLog {
    /// The reconstructed run, `None` if no test class was declared
    pub run: Option<TestRun>,
    /// Per-line problems, in log order
    pub errors: Vec<LineError>,
    /// Number of lines read
    pub lines: usize,
}

impl ParsedLog {
    /// Per-line errors that indicate a structural problem (everything except
    /// unrecognized lines)
    pub fn structural_errors(&self) -> impl Iterator<Item = &LineError> {
        self.errors.iter().filter(|e| !e.error.is_diagnostic())
    }
}

/// Parse a complete log held in memory
#[must_use]
pub fn parse_log(module: &str, input: &str) -> ParsedLog {
    let mut parser = InstrumentationParser::new(module);
    let mut errors = Vec::new();
    for line in input.lines() {
        parser.process_recording(line, &mut errors);
    }
    let lines = parser.lines_processed();
    ParsedLog {
        run: parser.finish(),
        errors,
        lines,
    }
}

/// Parse a log from a reader, one line at a time
///
/// Invalid UTF-8 is replaced rather than rejected.
///
/// # Errors
///
/// Returns `TestsError::Io` if reading fails and `TestsError::LogTooLarge` if
/// the log exceeds `options.max_lines`. In both cases nothing parsed so far is
/// returned.
pub fn parse_reader<R: BufRead>(
    module: &str,
    mut reader: R,
    options: &ParseOptions,
) -> Result<ParsedLog, TestsError> {
    let mut parser =
        InstrumentationParser::new(module).with_namespace_prefix(options.namespace_prefix.clone());
    let mut errors = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if let Some(limit) = options.max_lines {
            if parser.lines_processed() >= limit {
                return Err(TestsError::LogTooLarge { limit });
            }
        }
        let line = String::from_utf8_lossy(&buf);
        parser.process_recording(&line, &mut errors);
    }

    let lines = parser.lines_processed();
    Ok(ParsedLog {
        run: parser.finish(),
        errors,
        lines,
    })
}
