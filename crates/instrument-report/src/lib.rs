// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! instrument-report library
//!
//! This module exports the report generation behind the `instrument-report`
//! binary: configuration, report emitters, metric payloads and the
//! [`report::Reporter`] that ties them to parsed instrumentation logs.

pub mod config;
pub mod emit;
pub mod error;
pub mod metrics;
pub mod report;

pub use config::{Config, ConfigError};
pub use emit::{ConsoleEmitter, JobContext, JunitEmitter, ReportEmitter, SummaryEmitter};
pub use error::{EmitError, ReportError};
pub use metrics::{Dimension, MetricDatum, MetricSet, MetricUnit};
pub use report::{JobStats, ReportStats, Reporter, devicefarm_run_url, run};
