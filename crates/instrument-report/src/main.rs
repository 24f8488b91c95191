// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! instrument-report: JUnit and metric reports from Android instrumentation logs
//!
//! Parses one instrumentation log per Device Farm job and writes JUnit XML,
//! a JSON summary per job and a combined metrics payload.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use instrument_report::Config;

/// Exit status when `--fail-on-test-failure` is set and a test failed
const TEST_FAILURE_EXIT: u8 = 2;

fn main() -> ExitCode {
    let config = Config::parse();

    // Logs go to stderr, stdout may carry a piped log
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&config) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{e:#}"), "instrument-report failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> anyhow::Result<ExitCode> {
    config.validate().context("invalid configuration")?;

    info!(
        module = %config.module_name,
        jobs = config.logs.len(),
        output = %config.output_path.display(),
        "Starting instrument-report"
    );

    let stats = instrument_report::run(config).context("failed to write reports")?;

    if config.fail_on_test_failure && stats.has_failures {
        info!(failing = stats.failing_tests, "Test failures found");
        return Ok(ExitCode::from(TEST_FAILURE_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}
