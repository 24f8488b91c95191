// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Metric records for test results
//!
//! Metrics are collected into a [`MetricSet`] whose JSON form matches the
//! CloudWatch `PutMetricData` request body, so an external publisher can send
//! it as is (for example with `aws cloudwatch put-metric-data --cli-input-json`).

use std::path::Path;

use instrument_log::{FailureSample, RunSummary, SuiteSummary};
use serde::{Deserialize, Serialize};

use crate::error::EmitError;

/// Success percentage of a suite or module
pub const SUCCESS_PERCENTAGE: &str = "Test Success Percentage";
/// Passing test count
pub const TESTS_SUCCEEDED: &str = "Tests Succeeded";
/// Failing test count
pub const TESTS_FAILED: &str = "Tests Failed";
/// Module execution time
pub const EXECUTION_TIME: &str = "Execution Time";
/// One failed or errored test
pub const TEST_FAILURE: &str = "Test Failure";
/// A job that could not be reported
pub const REPORTING_ERROR: &str = "Test Run Reporting Error";

/// CloudWatch rejects longer dimension values
const DIMENSION_VALUE_LIMIT: usize = 1024;
const EMPTY_DIMENSION_VALUE: &str = "unknown";

/// Unit of a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    /// A plain count or ratio
    Count,
    /// A duration in seconds
    Seconds,
}

/// A metric dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    /// Dimension name
    pub name: String,
    /// Dimension value
    pub value: String,
}

impl Dimension {
    /// Create a dimension, clipping the value to what CloudWatch accepts
    #[must_use]
    pub fn new(name: impl Into<String>, value: &str) -> Self {
        let value = if value.is_empty() {
            EMPTY_DIMENSION_VALUE.to_string()
        } else {
            value.chars().take(DIMENSION_VALUE_LIMIT).collect()
        };
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A single metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDatum {
    /// Metric name
    pub metric_name: String,
    /// Dimensions
    pub dimensions: Vec<Dimension>,
    /// Value
    pub value: f64,
    /// Unit
    pub unit: MetricUnit,
}

impl MetricDatum {
    /// Create a metric
    #[must_use]
    pub fn new(name: &str, dimensions: Vec<Dimension>, value: f64, unit: MetricUnit) -> Self {
        Self {
            metric_name: name.to_string(),
            dimensions,
            value,
            unit,
        }
    }

    /// Value of the named dimension, if present
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }
}

/// Metrics to publish under one namespace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricSet {
    /// Metric namespace
    pub namespace: String,
    /// Collected metrics
    pub metric_data: Vec<MetricDatum>,
}

impl MetricSet {
    /// Create an empty set
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_data: Vec::new(),
        }
    }

    /// Add metrics for one job's summary
    ///
    /// Suites and the module as a whole get success percentage, success and
    /// failure counts. Suites or modules without executed tests get no
    /// percentage. The module also gets its execution time when it is numeric,
    /// and every failure sample becomes a failure metric.
    pub fn record_summary(&mut self, summary: &RunSummary) {
        for suite in &summary.suites {
            self.record_suite(&summary.module, suite);
        }
        for sample in &summary.failures {
            self.record_failure(sample);
        }

        let dimensions = || vec![Dimension::new("Module", &summary.module)];
        if let Ok(percentage) = summary.success_percentage() {
            self.push(SUCCESS_PERCENTAGE, dimensions(), percentage, MetricUnit::Count);
        }
        self.push(
            TESTS_SUCCEEDED,
            dimensions(),
            summary.passing_tests as f64,
            MetricUnit::Count,
        );
        self.push(
            TESTS_FAILED,
            dimensions(),
            summary.failing_tests as f64,
            MetricUnit::Count,
        );
        if let Some(seconds) = summary.execution_time_secs() {
            self.push(EXECUTION_TIME, dimensions(), seconds, MetricUnit::Seconds);
        }
    }

    fn record_suite(&mut self, module: &str, suite: &SuiteSummary) {
        let dimensions = || {
            vec![
                Dimension::new("Module", module),
                Dimension::new("Test Suite", &suite.name),
            ]
        };
        if let Ok(percentage) = suite.success_percentage() {
            self.push(SUCCESS_PERCENTAGE, dimensions(), percentage, MetricUnit::Count);
        }
        self.push(
            TESTS_SUCCEEDED,
            dimensions(),
            suite.passing_tests as f64,
            MetricUnit::Count,
        );
        self.push(
            TESTS_FAILED,
            dimensions(),
            suite.failing_tests as f64,
            MetricUnit::Count,
        );
    }

    fn record_failure(&mut self, sample: &FailureSample) {
        let dimensions = vec![
            Dimension::new("Module", &sample.module),
            Dimension::new("Test Suite", &sample.suite),
            Dimension::new("Test", &sample.test),
            Dimension::new("Exception", &sample.excerpt),
        ];
        self.push(TEST_FAILURE, dimensions, 1.0, MetricUnit::Count);
    }

    /// Record that a job could not be reported
    pub fn record_reporting_error(&mut self, error: &dyn std::error::Error) {
        let dimensions = vec![Dimension::new("Exception", &error.to_string())];
        self.push(REPORTING_ERROR, dimensions, 1.0, MetricUnit::Count);
    }

    fn push(&mut self, name: &str, dimensions: Vec<Dimension>, value: f64, unit: MetricUnit) {
        self.metric_data
            .push(MetricDatum::new(name, dimensions, value, unit));
    }

    /// Metrics with the given name
    pub fn named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MetricDatum> + 'a {
        self.metric_data.iter().filter(move |m| m.metric_name == name)
    }

    /// Number of collected metrics
    #[must_use]
    pub fn len(&self) -> usize {
        self.metric_data.len()
    }

    /// Whether nothing has been collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metric_data.is_empty()
    }

    /// Write the set as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns `EmitError` if serialization or writing fails.
    pub fn write(&self, path: &Path) -> Result<(), EmitError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| EmitError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
