// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report orchestration
//!
//! The [`Reporter`] parses one instrumentation log per device job, hands each
//! summary to its emitters and collects metrics across all jobs.
//!
//! # Example
//!
//! ```no_run
//! use instrument_log::ParseOptions;
//! use instrument_report::emit::JunitEmitter;
//! use instrument_report::report::Reporter;
//!
//! let mut reporter = Reporter::new("storage", ParseOptions::default())
//!     .with_emitter(Box::new(JunitEmitter::new("build/test-results")));
//!
//! let stats = reporter
//!     .report_path(0, "instrument.log".as_ref())
//!     .expect("report job");
//! println!("{} passing, {} failing", stats.passing_tests, stats.failing_tests);
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use instrument_log::{ParseOptions, parse_reader, summarize};
use tracing::{debug, error, info, warn};

use crate::config::{Config, is_stdin};
use crate::emit::{ConsoleEmitter, JobContext, JunitEmitter, ReportEmitter, SummaryEmitter};
use crate::error::ReportError;
use crate::metrics::MetricSet;

const DEVICEFARM_CONSOLE: &str = "https://us-west-2.console.aws.amazon.com/devicefarm/home";

/// Console URL for a Device Farm run
///
/// The last `:` field of the ARN holds `<project>/<run>`. Anything else
/// yields `None`.
#[must_use]
pub fn devicefarm_run_url(run_arn: &str) -> Option<String> {
    let (_, resource) = run_arn.rsplit_once(':')?;
    let (project, run) = resource.split_once('/')?;
    if project.is_empty() || run.is_empty() || run.contains('/') {
        return None;
    }
    Some(format!(
        "{DEVICEFARM_CONSOLE}#/mobile/projects/{project}/runs/{run}/jobs/00000"
    ))
}

// ============================================================================
// Statistics
// ============================================================================

/// Statistics for one reported job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Job number
    pub job: usize,
    /// Lines read from the log
    pub lines: usize,
    /// Number of suites in the run
    pub suites: usize,
    /// Passing tests
    pub passing_tests: usize,
    /// Failing tests
    pub failing_tests: usize,
    /// Structural errors skipped while parsing
    pub line_errors: usize,
    /// Whether any test failed or errored
    pub has_failures: bool,
}

/// Statistics across all jobs of an invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportStats {
    /// Jobs whose reports were written
    pub jobs_reported: usize,
    /// Jobs that could not be reported
    pub jobs_failed: usize,
    /// Passing tests
    pub passing_tests: usize,
    /// Failing tests
    pub failing_tests: usize,
    /// Structural errors skipped while parsing
    pub line_errors: usize,
    /// Whether any test failed or errored
    pub has_failures: bool,
}

impl ReportStats {
    /// Add a reported job
    pub fn add_job(&mut self, job: &JobStats) {
        self.jobs_reported += 1;
        self.passing_tests += job.passing_tests;
        self.failing_tests += job.failing_tests;
        self.line_errors += job.line_errors;
        self.has_failures |= job.has_failures;
    }
}

// ============================================================================
// Reporter
// ============================================================================

/// Reports device jobs of one module
pub struct Reporter {
    module: String,
    options: ParseOptions,
    run_url: Option<String>,
    emitters: Vec<Box<dyn ReportEmitter>>,
    metrics: MetricSet,
}

impl Reporter {
    /// Create a reporter with no emitters
    #[must_use]
    pub fn new(module: impl Into<String>, options: ParseOptions) -> Self {
        Self {
            module: module.into(),
            options,
            run_url: None,
            emitters: Vec::new(),
            metrics: MetricSet::new(crate::config::DEFAULT_METRICS_NAMESPACE),
        }
    }

    /// Create a reporter with the console, JUnit and summary emitters
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let output = config.output_path.as_path();
        let run_url = config.run_arn.as_deref().and_then(|arn| {
            let url = devicefarm_run_url(arn);
            if url.is_none() {
                warn!(run_arn = %arn, "Run ARN has no project/run id, omitting log links");
            }
            url
        });

        Self::new(config.module_name.clone(), config.parse_options())
            .with_run_url(run_url)
            .with_metrics_namespace(config.metrics_namespace.clone())
            .with_emitter(Box::new(ConsoleEmitter))
            .with_emitter(Box::new(JunitEmitter::new(output)))
            .with_emitter(Box::new(SummaryEmitter::new(output)))
    }

    /// Set the run URL placed in every report
    #[must_use]
    pub fn with_run_url(mut self, run_url: Option<String>) -> Self {
        self.run_url = run_url;
        self
    }

    /// Set the metric namespace
    #[must_use]
    pub fn with_metrics_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metrics.namespace = namespace.into();
        self
    }

    /// Add an emitter
    #[must_use]
    pub fn with_emitter(mut self, emitter: Box<dyn ReportEmitter>) -> Self {
        self.emitters.push(emitter);
        self
    }

    /// Metrics collected so far
    #[must_use]
    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    /// Consume the reporter, returning its metrics
    #[must_use]
    pub fn into_metrics(self) -> MetricSet {
        self.metrics
    }

    /// Report the log at `path`, reading stdin for `-`
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be opened or reported. See
    /// [`Reporter::report_job`].
    pub fn report_path(&mut self, job: usize, path: &Path) -> Result<JobStats, ReportError> {
        info!(job, log = %path.display(), "Reporting job");
        if is_stdin(path) {
            return self.report_job(job, std::io::stdin().lock());
        }
        match File::open(path) {
            Ok(file) => self.report_job(job, BufReader::new(file)),
            Err(source) => {
                let e = ReportError::OpenLog {
                    path: path.to_path_buf(),
                    source,
                };
                self.metrics.record_reporting_error(&e);
                Err(e)
            }
        }
    }

    /// Parse one job's log and emit its reports
    ///
    /// Failures of individual lines are logged and skipped. A job that fails
    /// as a whole is recorded as a reporting error metric.
    ///
    /// Emitters run in order and stop at the first error. Files written by
    /// earlier emitters, or for earlier suites, are left in place even though
    /// the job counts as failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be read, declares no test class, or
    /// a report cannot be written.
    pub fn report_job<R: BufRead>(&mut self, job: usize, reader: R) -> Result<JobStats, ReportError> {
        let result = self.process_job(job, reader);
        if let Err(e) = &result {
            self.metrics.record_reporting_error(e);
        }
        result
    }

    fn process_job<R: BufRead>(&mut self, job: usize, reader: R) -> Result<JobStats, ReportError> {
        let parsed = parse_reader(&self.module, reader, &self.options)?;

        let mut line_errors = 0;
        for e in parsed.structural_errors() {
            line_errors += 1;
            warn!(
                job,
                line_number = e.line_number,
                line = %e.line,
                error = %e.error,
                "Skipping log line"
            );
        }

        let run = parsed.run.ok_or(ReportError::NoTestRun { job })?;
        let summary = summarize(&run);
        debug!(job, suites = summary.suites.len(), "Parsed test run");

        let context = JobContext {
            module: self.module.clone(),
            job,
            run_url: self.run_url.clone(),
        };
        for emitter in &mut self.emitters {
            debug!(job, emitter = emitter.name(), "Emitting report");
            emitter.emit(&context, &summary)?;
        }

        self.metrics.record_summary(&summary);
        if let Err(e) = summary.success_percentage() {
            warn!(job, error = %e, "No tests executed");
            self.metrics.record_reporting_error(&e);
        }

        Ok(JobStats {
            job,
            lines: parsed.lines,
            suites: summary.suites.len(),
            passing_tests: summary.passing_tests,
            failing_tests: summary.failing_tests,
            line_errors,
            has_failures: summary.has_failures(),
        })
    }

    /// Report every log in order, continuing past jobs that fail
    pub fn report_all<P: AsRef<Path>>(&mut self, logs: &[P]) -> ReportStats {
        let mut stats = ReportStats::default();
        for (job, log) in logs.iter().enumerate() {
            match self.report_path(job, log.as_ref()) {
                Ok(job_stats) => stats.add_job(&job_stats),
                Err(e) => {
                    error!(job, log = %log.as_ref().display(), error = %e, "Failed to report job");
                    stats.jobs_failed += 1;
                }
            }
        }
        stats
    }
}

/// Report every log named by the configuration and write the metrics payload
///
/// # Errors
///
/// Returns an error only if the metrics payload cannot be written. Jobs that
/// fail are counted in [`ReportStats::jobs_failed`].
pub fn run(config: &Config) -> Result<ReportStats, ReportError> {
    let mut reporter = Reporter::from_config(config);
    let stats = reporter.report_all(&config.logs);

    if let Some(path) = config.metrics_path() {
        let metrics = reporter.into_metrics();
        info!(path = %path.display(), metrics = metrics.len(), "Writing metrics");
        metrics.write(&path)?;
    }

    info!(
        jobs = stats.jobs_reported,
        failed_jobs = stats.jobs_failed,
        passing = stats.passing_tests,
        failing = stats.failing_tests,
        "Report complete"
    );
    Ok(stats)
}
