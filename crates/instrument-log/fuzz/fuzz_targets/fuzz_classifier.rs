// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for line classification and stack trace sanitizing

#![no_main]

use libfuzzer_sys::fuzz_target;

use instrument_log::aggregate::sanitize_stack_trace;
use instrument_log::{DEFAULT_NAMESPACE_PREFIX, classify};

fuzz_target!(|input: &str| {
    let _ = classify(input, DEFAULT_NAMESPACE_PREFIX);
    let _ = sanitize_stack_trace(input);
});
