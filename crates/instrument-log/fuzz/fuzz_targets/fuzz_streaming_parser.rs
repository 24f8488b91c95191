// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the streaming parser
//!
//! This fuzzes the `InstrumentationParser` and the aggregation that runs on
//! whatever it produces.

#![no_main]

use libfuzzer_sys::fuzz_target;

use instrument_log::{InstrumentationParser, ParseOptions, parse_reader, summarize};

fuzz_target!(|data: &[u8]| {
    // Raw bytes go through the lossy reader path
    if let Ok(parsed) = parse_reader("fuzz", data, &ParseOptions::default()) {
        if let Some(run) = parsed.run {
            let _ = summarize(&run).success_percentage();
        }
    }

    if let Ok(input) = std::str::from_utf8(data) {
        let mut parser = InstrumentationParser::new("fuzz");

        // Process each line - parser should never panic
        for line in input.lines() {
            let _ = parser.process_line(line);
        }

        // Finalize should never panic
        if let Some(run) = parser.finish() {
            let _ = summarize(&run);
        }
    }
});
