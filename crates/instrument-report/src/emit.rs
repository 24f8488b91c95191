// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report emitters
//!
//! A [`ReportEmitter`] receives the summary of one job and turns it into
//! output: console statistics, JUnit XML files per suite, or a JSON summary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use instrument_log::{RunSummary, SuiteSummary, TestCaseResult, TestOutcome};
use quick_junit::{NonSuccessKind, Report, TestCase, TestCaseStatus, TestSuite};
use serde::Serialize;
use tracing::info;

use crate::error::EmitError;

/// What an emitter needs to know about the job being reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobContext {
    /// Module name
    pub module: String,
    /// Job number (position of the log on the command line)
    pub job: usize,
    /// Link to the run's logs, if known
    pub run_url: Option<String>,
}

impl JobContext {
    /// Name of a suite's report for this job
    #[must_use]
    pub fn suite_report_name(&self, suite: &str) -> String {
        format!("{suite}-{}", self.job)
    }

    /// Text pointing readers at the detailed run logs
    #[must_use]
    pub fn debug_message(&self) -> Option<String> {
        self.run_url
            .as_deref()
            .map(|url| format!("You can find the detailed logs and output files at {url}"))
    }
}

/// Consumer of finished job summaries
pub trait ReportEmitter {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Emit the report for one job
    ///
    /// # Errors
    ///
    /// Returns `EmitError` if the report cannot be written.
    fn emit(&mut self, job: &JobContext, summary: &RunSummary) -> Result<(), EmitError>;
}

fn write_file(path: &Path, contents: &str) -> Result<(), EmitError> {
    fs::write(path, contents).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Console statistics
// ============================================================================

/// Logs suite and run statistics
#[derive(Debug, Default)]
pub struct ConsoleEmitter;

impl ReportEmitter for ConsoleEmitter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn emit(&mut self, job: &JobContext, summary: &RunSummary) -> Result<(), EmitError> {
        info!(job = job.job, "Test suite statistics");
        for suite in &summary.suites {
            info!(
                name = %suite.name,
                passing = suite.passing_tests,
                failing = suite.failing_tests,
                success_percentage = %percentage_text(suite.success_percentage().ok()),
                "Test suite"
            );
        }

        info!(
            run = %summary.module,
            successes = summary.passing_tests,
            failures = summary.failing_tests,
            success_percentage = %percentage_text(summary.success_percentage().ok()),
            execution_time = summary.execution_time.as_deref().unwrap_or("unknown"),
            "Test run statistics"
        );
        Ok(())
    }
}

fn percentage_text(percentage: Option<f64>) -> String {
    percentage.map_or_else(|| "n/a".to_string(), |p| p.to_string())
}

// ============================================================================
// JUnit XML
// ============================================================================

/// Writes one JUnit XML file per suite, named `<Suite>-<job>.xml`
#[derive(Debug)]
pub struct JunitEmitter {
    output_dir: PathBuf,
}

impl JunitEmitter {
    /// Create an emitter writing into `output_dir`
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl ReportEmitter for JunitEmitter {
    fn name(&self) -> &'static str {
        "junit"
    }

    fn emit(&mut self, job: &JobContext, summary: &RunSummary) -> Result<(), EmitError> {
        let timestamp = Utc::now();
        for suite in &summary.suites {
            let report_name = job.suite_report_name(&suite.name);
            let mut report = Report::new(report_name.as_str());
            report.set_timestamp(timestamp);
            report.add_test_suite(junit_suite(job, suite));

            let xml = report
                .to_string()
                .map_err(|e| EmitError::Junit(e.to_string()))?;
            let path = self.output_dir.join(format!("{report_name}.xml"));
            info!(suite = %suite.name, path = %path.display(), "Saving test suite report");
            write_file(&path, &xml)?;
        }
        Ok(())
    }
}

/// Build the JUnit suite for one test class
#[must_use]
pub fn junit_suite(job: &JobContext, suite: &SuiteSummary) -> TestSuite {
    let mut testsuite = TestSuite::new(job.suite_report_name(&suite.name));
    for test in &suite.tests {
        testsuite.add_test_case(junit_case(job, &suite.name, test));
    }
    testsuite
}

fn junit_case(job: &JobContext, suite: &str, test: &TestCaseResult) -> TestCase {
    let trace = test.output.as_deref().unwrap_or_default();

    let status = match test.outcome {
        TestOutcome::Passed => TestCaseStatus::success(),
        TestOutcome::Failed => non_success(NonSuccessKind::Failure, test, trace),
        TestOutcome::Error => non_success(NonSuccessKind::Error, test, trace),
    };

    let mut testcase = TestCase::new(test.name.as_str(), status);
    testcase.set_classname(suite);

    let system_out: Vec<String> = job
        .debug_message()
        .into_iter()
        .chain((!trace.is_empty()).then(|| trace.to_string()))
        .collect();
    if !system_out.is_empty() {
        testcase.set_system_out(system_out.join("\n"));
    }
    testcase
}

fn non_success(kind: NonSuccessKind, test: &TestCaseResult, trace: &str) -> TestCaseStatus {
    let mut status = TestCaseStatus::non_success(kind);
    status.set_type(format!("status {}", test.status_code));
    if let Some(first_line) = trace.split(" // ").next().filter(|l| !l.is_empty()) {
        status.set_message(first_line);
        status.set_description(trace);
    }
    status
}

// ============================================================================
// JSON summary
// ============================================================================

#[derive(Serialize)]
struct SummaryFile<'a> {
    generated_at: DateTime<Utc>,
    job: usize,
    run_url: Option<&'a str>,
    success_percentage: Option<f64>,
    suite_success_percentages: BTreeMap<&'a str, Option<f64>>,
    #[serde(flatten)]
    summary: &'a RunSummary,
}

/// Writes the run summary as `summary-<job>.json`
#[derive(Debug)]
pub struct SummaryEmitter {
    output_dir: PathBuf,
}

impl SummaryEmitter {
    /// Create an emitter writing into `output_dir`
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Path of the summary for a job
    #[must_use]
    pub fn path_for(&self, job: usize) -> PathBuf {
        self.output_dir.join(format!("summary-{job}.json"))
    }
}

impl ReportEmitter for SummaryEmitter {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn emit(&mut self, job: &JobContext, summary: &RunSummary) -> Result<(), EmitError> {
        let file = SummaryFile {
            generated_at: Utc::now(),
            job: job.job,
            run_url: job.run_url.as_deref(),
            success_percentage: summary.success_percentage().ok(),
            suite_success_percentages: summary
                .suites
                .iter()
                .map(|s| (s.name.as_str(), s.success_percentage().ok()))
                .collect(),
            summary,
        };
        let json = serde_json::to_string_pretty(&file)?;
        write_file(&self.path_for(job.job), &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instrument_log::{parse_log, summarize};

    const LOG: &str = "INSTRUMENTATION_STATUS: class=com.amplifyframework.api.QueryTest
INSTRUMENTATION_STATUS: test=listsItems
INSTRUMENTATION_STATUS_CODE: 0
INSTRUMENTATION_STATUS: test=rejectsBadQuery
INSTRUMENTATION_STATUS: stream=java.lang.AssertionError: bad
INSTRUMENTATION_STATUS_CODE: -2
INSTRUMENTATION_STATUS: test=crashes
INSTRUMENTATION_STATUS: stack=java.lang.NullPointerException
INSTRUMENTATION_STATUS_CODE: -1";

    fn context(run_url: Option<&str>) -> JobContext {
        JobContext {
            module: "api".to_string(),
            job: 1,
            run_url: run_url.map(str::to_string),
        }
    }

    #[test]
    fn test_suite_report_name() {
        assert_eq!(context(None).suite_report_name("QueryTest"), "QueryTest-1");
    }

    #[test]
    fn test_debug_message() {
        assert_eq!(context(None).debug_message(), None);
        assert_eq!(
            context(Some("https://example.test/run")).debug_message(),
            Some(
                "You can find the detailed logs and output files at https://example.test/run"
                    .to_string()
            )
        );
    }

    #[test]
    fn test_junit_suite_counts() {
        let summary = summarize(&parse_log("api", LOG).run.expect("run"));
        let suite = junit_suite(&context(None), &summary.suites[0]);
        assert_eq!(suite.name.as_str(), "QueryTest-1");
        assert_eq!(suite.tests, 3);
        assert_eq!(suite.failures, 1);
        assert_eq!(suite.errors, 1);
    }

    #[test]
    fn test_junit_xml_contents() {
        let summary = summarize(&parse_log("api", LOG).run.expect("run"));
        let mut report = Report::new("QueryTest-1");
        report.add_test_suite(junit_suite(
            &context(Some("https://example.test/run")),
            &summary.suites[0],
        ));
        let xml = report.to_string().expect("serialize");

        assert!(xml.contains("<testsuite name=\"QueryTest-1\""));
        assert!(xml.contains("classname=\"QueryTest\""));
        assert!(xml.contains("<failure"));
        assert!(xml.contains("<error"));
        assert!(xml.contains("java.lang.AssertionError: bad"));
        assert!(xml.contains("java.lang.NullPointerException"));
        assert!(xml.contains("https://example.test/run"));
    }

    #[test]
    fn test_percentage_text() {
        assert_eq!(percentage_text(Some(0.75)), "0.75");
        assert_eq!(percentage_text(None), "n/a");
    }
}
