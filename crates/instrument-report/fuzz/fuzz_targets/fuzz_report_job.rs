#![no_main]

//! Fuzz target for reporting a single job
//!
//! Feeds arbitrary bytes through the reporter (without emitters) and checks
//! that the collected metrics always serialize.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use instrument_log::ParseOptions;
use instrument_report::report::Reporter;

#[derive(Arbitrary, Debug)]
struct ReportInput {
    log: Vec<u8>,
    namespace_prefix: String,
    max_lines: Option<u16>,
}

fuzz_target!(|input: ReportInput| {
    let mut options = ParseOptions::default().with_namespace_prefix(input.namespace_prefix);
    if let Some(limit) = input.max_lines {
        options = options.with_max_lines(usize::from(limit));
    }

    let mut reporter = Reporter::new("fuzz", options);
    let result = reporter.report_job(0, input.log.as_slice());

    if let Ok(stats) = &result {
        assert!(stats.lines <= input.log.len() + 1);
    }
    // A failed job is recorded as a reporting error
    if result.is_err() {
        assert!(!reporter.metrics().is_empty());
    }
    serde_json::to_string(reporter.metrics()).expect("metrics serialize");
});
