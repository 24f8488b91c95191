// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Result aggregation
//!
//! Turns a finished [`TestRun`] into pass/fail statistics, per-test report
//! results and sanitized failure excerpts.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AggregateError, TestsError};
use crate::model::{TestRun, TestSuite};
use crate::result::TestOutcome;

/// Maximum number of characters kept from a stack trace in a failure excerpt
pub const EXCERPT_LIMIT: usize = 500;

/// Replacement for runtime object hash codes in failure excerpts
pub const HASH_CODE_PLACEHOLDER: &str = "@[MASKED]";

static HASH_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\w{7}\b").expect("hash code pattern is valid"));

// ============================================================================
// Summary types
// ============================================================================

/// Report view of a single test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// Test method name
    pub name: String,
    /// Raw status code
    pub status_code: i32,
    /// Report classification
    pub outcome: TestOutcome,
    /// Captured stack trace or output
    pub output: Option<String>,
}

/// Statistics and results for one suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSummary {
    /// Suite (class) name
    pub name: String,
    /// Passing tests
    pub passing_tests: usize,
    /// Failing tests
    pub failing_tests: usize,
    /// Per-test results
    pub tests: Vec<TestCaseResult>,
}

impl SuiteSummary {
    /// Fraction of passing tests among passing and failing ones
    ///
    /// # Errors
    ///
    /// Returns `AggregateError::NoTestsExecuted` when nothing passed or failed.
    pub fn success_percentage(&self) -> Result<f64, AggregateError> {
        success_percentage(&self.name, self.passing_tests, self.failing_tests)
    }

    /// Results classified as [`TestOutcome::Failed`] or [`TestOutcome::Error`]
    pub fn unsuccessful(&self) -> impl Iterator<Item = &TestCaseResult> {
        self.tests.iter().filter(|t| t.outcome != TestOutcome::Passed)
    }
}

/// A sanitized failure excerpt, tagged for use as metric dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSample {
    /// Module of the run
    pub module: String,
    /// Suite (class) name
    pub suite: String,
    /// Test method name
    pub test: String,
    /// Escaped, truncated, hash-masked stack trace
    pub excerpt: String,
}

/// Statistics and results for a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Module of the run
    pub module: String,
    /// Per-suite summaries, ordered by suite name
    pub suites: Vec<SuiteSummary>,
    /// Passing tests across all suites
    pub passing_tests: usize,
    /// Failing tests across all suites
    pub failing_tests: usize,
    /// Execution time reported by the runner, as text
    pub execution_time: Option<String>,
    /// Failure excerpts from suites that did not fully pass
    pub failures: Vec<FailureSample>,
}

impl RunSummary {
    /// Fraction of passing tests across the run
    ///
    /// # Errors
    ///
    /// Returns `AggregateError::NoTestsExecuted` when nothing passed or failed.
    pub fn success_percentage(&self) -> Result<f64, AggregateError> {
        success_percentage(&self.module, self.passing_tests, self.failing_tests)
    }

    /// Execution time in seconds, if the runner reported a numeric value
    #[must_use]
    pub fn execution_time_secs(&self) -> Option<f64> {
        self.execution_time.as_deref()?.trim().parse().ok()
    }

    /// Whether any test failed or errored
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.suites.iter().any(|s| s.unsuccessful().next().is_some())
    }

    /// Serialize the summary as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns `TestsError::Json` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, TestsError> {
        serde_json::to_string_pretty(self).map_err(TestsError::from)
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Compute `passing / (passing + failing)`
///
/// # Errors
///
/// Returns `AggregateError::NoTestsExecuted` for `scope` when both counts are
/// zero.
pub fn success_percentage(
    scope: &str,
    passing: usize,
    failing: usize,
) -> Result<f64, AggregateError> {
    let executed = passing + failing;
    if executed == 0 {
        return Err(AggregateError::NoTestsExecuted {
            scope: scope.to_string(),
        });
    }
    Ok(passing as f64 / executed as f64)
}

/// Summarize a finished run
#[must_use]
pub fn summarize(run: &TestRun) -> RunSummary {
    let mut suites = Vec::with_capacity(run.suites.len());
    let mut failures = Vec::new();

    for suite in run.suites.values() {
        let summary = summarize_suite(suite);
        let fully_passed = matches!(summary.success_percentage(), Ok(p) if p >= 1.0);
        if !fully_passed {
            failures.extend(failure_samples(&run.module, suite));
        }
        suites.push(summary);
    }

    RunSummary {
        module: run.module.clone(),
        passing_tests: suites.iter().map(|s| s.passing_tests).sum(),
        failing_tests: suites.iter().map(|s| s.failing_tests).sum(),
        suites,
        execution_time: run.execution_time.clone(),
        failures,
    }
}

/// Summarize one suite
#[must_use]
pub fn summarize_suite(suite: &TestSuite) -> SuiteSummary {
    SuiteSummary {
        name: suite.name.clone(),
        passing_tests: suite.passing_tests,
        failing_tests: suite.failing_tests,
        tests: suite
            .tests
            .values()
            .map(|test| TestCaseResult {
                name: test.name.clone(),
                status_code: test.status_code,
                outcome: test.outcome(),
                output: test.stack_trace.clone(),
            })
            .collect(),
    }
}

/// Failure excerpts for every failed or errored test in a suite
#[must_use]
pub fn failure_samples(module: &str, suite: &TestSuite) -> Vec<FailureSample> {
    suite
        .tests
        .values()
        .filter(|test| test.is_failure_or_error())
        .map(|test| FailureSample {
            module: module.to_string(),
            suite: suite.name.clone(),
            test: test.name.clone(),
            excerpt: sanitize_stack_trace(test.stack_trace.as_deref().unwrap_or_default()),
        })
        .collect()
}

/// Make a stack trace comparable across runs
///
/// Keeps the first [`EXCERPT_LIMIT`] characters, escapes anything that is not
/// printable, and masks `@` followed by exactly seven word characters (object
/// hash codes) with [`HASH_CODE_PLACEHOLDER`].
///
/// The limit applies before escaping, so an excerpt with control characters
/// or quotes can be longer than [`EXCERPT_LIMIT`].
#[must_use]
pub fn sanitize_stack_trace(trace: &str) -> String {
    let truncated: String = trace.chars().take(EXCERPT_LIMIT).collect();
    let escaped = truncated.escape_debug().to_string();
    HASH_CODE
        .replace_all(&escaped, HASH_CODE_PLACEHOLDER)
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Test;
    use similar_asserts::assert_eq;

    fn suite_with(name: &str, tests: &[(&str, i32, Option<&str>)]) -> TestSuite {
        let mut suite = TestSuite::new(name);
        for (test_name, code, trace) in tests {
            let test = suite.test_or_insert(test_name);
            test.status_code = *code;
            test.stack_trace = trace.map(str::to_string);
            match code {
                0 => suite.passing_tests += 1,
                -2 => suite.failing_tests += 1,
                _ => {}
            }
        }
        suite
    }

    #[test]
    fn test_success_percentage() {
        assert_eq!(success_percentage("s", 3, 1), Ok(0.75));
        assert_eq!(success_percentage("s", 2, 0), Ok(1.0));
        assert_eq!(success_percentage("s", 0, 4), Ok(0.0));
    }

    #[test]
    fn test_success_percentage_no_tests() {
        assert_eq!(
            success_percentage("EmptyTest", 0, 0),
            Err(AggregateError::NoTestsExecuted {
                scope: "EmptyTest".to_string()
            })
        );
    }

    #[test]
    fn test_sanitize_masks_hash_codes() {
        let sanitized = sanitize_stack_trace("at com.foo.Bar@1a2b3c4 more text");
        assert_eq!(sanitized, "at com.foo.Bar@[MASKED] more text");
    }

    #[test]
    fn test_sanitize_masks_only_seven_character_hash_codes() {
        assert_eq!(
            sanitize_stack_trace("Foo@1a2b3c4d tail"),
            "Foo@1a2b3c4d tail"
        );
        assert_eq!(
            sanitize_stack_trace("Foo@1a2b3c4.run(Foo.java:3)"),
            "Foo@[MASKED].run(Foo.java:3)"
        );
    }

    #[test]
    fn test_sanitize_escaping_can_exceed_limit() {
        let sanitized = sanitize_stack_trace(&"\n".repeat(EXCERPT_LIMIT));
        assert_eq!(sanitized.chars().count(), EXCERPT_LIMIT * 2);
    }

    #[test]
    fn test_sanitize_escapes_control_characters() {
        let sanitized = sanitize_stack_trace("line one\n\tline two");
        assert_eq!(sanitized, "line one\\n\\tline two");
    }

    #[test]
    fn test_sanitize_truncates_before_masking() {
        // The hash code straddles the cut, so only "@12" survives truncation
        let trace = format!("{}@1234567 tail", "x".repeat(EXCERPT_LIMIT - 3));
        let sanitized = sanitize_stack_trace(&trace);
        assert_eq!(sanitized.chars().count(), EXCERPT_LIMIT);
        assert!(sanitized.ends_with("@12"));
        assert!(!sanitized.contains(HASH_CODE_PLACEHOLDER));
    }

    #[test]
    fn test_summarize_collects_failures_only_for_imperfect_suites() {
        let mut run = TestRun::new("storage");
        run.suites.insert(
            "GoodTest".to_string(),
            suite_with("GoodTest", &[("a", 0, None), ("b", -3, None)]),
        );
        run.suites.insert(
            "BadTest".to_string(),
            suite_with(
                "BadTest",
                &[
                    ("c", 0, None),
                    ("d", -2, Some("java.lang.AssertionError at Foo@abcdef1")),
                    ("e", -1, Some("boom")),
                    ("f", 1, None),
                ],
            ),
        );
        run.execution_time = Some("12.5".to_string());

        let summary = summarize(&run);
        assert_eq!(summary.module, "storage");
        assert_eq!(summary.passing_tests, 2);
        assert_eq!(summary.failing_tests, 1);
        assert_eq!(summary.success_percentage(), Ok(2.0 / 3.0));
        assert_eq!(summary.execution_time_secs(), Some(12.5));
        assert!(summary.has_failures());

        let names: Vec<&str> = summary.suites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["BadTest", "GoodTest"]);

        assert_eq!(
            summary.failures,
            vec![
                FailureSample {
                    module: "storage".to_string(),
                    suite: "BadTest".to_string(),
                    test: "d".to_string(),
                    excerpt: "java.lang.AssertionError at Foo@[MASKED]".to_string(),
                },
                FailureSample {
                    module: "storage".to_string(),
                    suite: "BadTest".to_string(),
                    test: "e".to_string(),
                    excerpt: "boom".to_string(),
                },
            ]
        );

        let bad = &summary.suites[0];
        let outcomes: Vec<TestOutcome> = bad.tests.iter().map(|t| t.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                TestOutcome::Passed,
                TestOutcome::Failed,
                TestOutcome::Error,
                TestOutcome::Failed
            ]
        );
        assert_eq!(bad.unsuccessful().count(), 3);
    }

    #[test]
    fn test_failure_samples_without_trace() {
        let mut suite = TestSuite::new("T");
        suite.tests.insert(
            "t".to_string(),
            Test {
                name: "t".to_string(),
                status_code: -1,
                stack_trace: None,
            },
        );
        let samples = failure_samples("m", &suite);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].excerpt, "");
    }

    #[test]
    fn test_summary_of_empty_run() {
        let summary = summarize(&TestRun::new("empty"));
        assert!(summary.suites.is_empty());
        assert!(matches!(
            summary.success_percentage(),
            Err(AggregateError::NoTestsExecuted { .. })
        ));
        assert!(!summary.has_failures());
    }
}
