//! Configuration for the instrument-report CLI
//!
//! This module provides the command line / environment configuration,
//! including log inputs, output locations, metric options and logging levels.

use std::path::{Path, PathBuf};

use clap::Parser;
use instrument_log::{DEFAULT_NAMESPACE_PREFIX, ParseOptions};

/// Default directory for generated reports
pub const DEFAULT_OUTPUT_PATH: &str = "build/test-results";

/// Default namespace for the metric payload
pub const DEFAULT_METRICS_NAMESPACE: &str = "AmplifyAndroidV2-IntegTests";

/// Path that stands for standard input
pub const STDIN_PATH: &str = "-";

/// Instrument Report - JUnit and metric reports from Android instrumentation logs
#[derive(Parser, Debug, Clone)]
#[command(name = "instrument-report")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Instrumentation logs, one per device job
    ///
    /// The position of a log on the command line is its job number,
    /// starting at 0. Use `-` to read a log from stdin.
    #[arg(required = true)]
    pub logs: Vec<PathBuf>,

    /// Module name for the test run
    #[arg(short, long, env = "INSTRUMENT_REPORT_MODULE")]
    pub module_name: String,

    /// Directory for the generated reports
    #[arg(short, long, env = "INSTRUMENT_REPORT_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: PathBuf,

    /// Device Farm run ARN
    ///
    /// Used to link each test case to the run's logs in the Device Farm
    /// console.
    #[arg(short, long, env = "INSTRUMENT_REPORT_RUN_ARN")]
    pub run_arn: Option<String>,

    /// Namespace prefix stripped from test class names
    #[arg(long, default_value = DEFAULT_NAMESPACE_PREFIX)]
    pub namespace_prefix: String,

    /// Namespace written into the metrics payload
    #[arg(long, default_value = DEFAULT_METRICS_NAMESPACE)]
    pub metrics_namespace: String,

    /// Do not write metrics.json
    #[arg(long, default_value = "false")]
    pub no_metrics: bool,

    /// Abort a log that has more than this many lines
    #[arg(long)]
    pub max_lines: Option<usize>,

    /// Exit with status 2 when any test failed or errored
    #[arg(long, default_value = "false")]
    pub fail_on_test_failure: bool,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs: Vec::new(),
            module_name: String::new(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            run_arn: None,
            namespace_prefix: DEFAULT_NAMESPACE_PREFIX.to_string(),
            metrics_namespace: DEFAULT_METRICS_NAMESPACE.to_string(),
            no_metrics: false,
            max_lines: None,
            fail_on_test_failure: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Options for the log parser
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        let options = ParseOptions::default().with_namespace_prefix(self.namespace_prefix.clone());
        match self.max_lines {
            Some(limit) => options.with_max_lines(limit),
            None => options,
        }
    }

    /// Path of the combined metrics payload, `None` when metrics are disabled
    #[must_use]
    pub fn metrics_path(&self) -> Option<PathBuf> {
        (!self.no_metrics).then(|| self.output_path.join("metrics.json"))
    }

    /// Validate the configuration
    ///
    /// Creates the output directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The module name is empty
    /// - A log file does not exist
    /// - The output path exists but is not a directory, or cannot be created
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.module_name.trim().is_empty() {
            return Err(ConfigError::EmptyModuleName);
        }

        for log in &self.logs {
            if !is_stdin(log) && !log.is_file() {
                return Err(ConfigError::LogNotFound(log.clone()));
            }
        }

        if self.output_path.exists() {
            if !self.output_path.is_dir() {
                return Err(ConfigError::OutputNotDirectory(self.output_path.clone()));
            }
        } else {
            std::fs::create_dir_all(&self.output_path).map_err(|e| {
                ConfigError::OutputDirectoryCreateFailed(self.output_path.clone(), e)
            })?;
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Whether a log path refers to standard input
#[must_use]
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Module name is empty
    #[error("Module name must not be empty")]
    EmptyModuleName,

    /// Log file not found
    #[error("Log file not found: {0}")]
    LogNotFound(PathBuf),

    /// Output path is not a directory
    #[error("Output path is not a directory: {0}")]
    OutputNotDirectory(PathBuf),

    /// Failed to create output directory
    #[error("Failed to create output directory {0}: {1}")]
    OutputDirectoryCreateFailed(PathBuf, std::io::Error),
}
