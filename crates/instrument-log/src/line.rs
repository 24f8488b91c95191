// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Instrumentation log line classification
//!
//! Each raw line of `am instrument -r` output encodes at most one structural
//! field. [`classify`] figures out which one by searching for a fixed set of
//! tags in priority order. Matching is substring based rather than anchored at
//! the start of the line, because device logs are noisy and a payload can
//! itself contain another tag as text; the first tag in the list wins.

/// Namespace stripped from class names unless configured otherwise
pub const DEFAULT_NAMESPACE_PREFIX: &str = "com.amplifyframework.";

const CLASS: &str = "INSTRUMENTATION_STATUS: class=";
const CURRENT: &str = "INSTRUMENTATION_STATUS: current=";
const NUM_TESTS: &str = "INSTRUMENTATION_STATUS: numtests=";
const STREAM: &str = "INSTRUMENTATION_STATUS: stream=";
const STACK: &str = "INSTRUMENTATION_STATUS: stack=";
const TEST: &str = "INSTRUMENTATION_STATUS: test=";
const STATUS_CODE: &str = "INSTRUMENTATION_STATUS_CODE:";
const TIME: &str = "Time: ";
const IGNORABLE: [&str; 3] = [
    "INSTRUMENTATION_STATUS: id=",
    "INSTRUMENTATION_RESULT: stream=",
    "INSTRUMENTATION_CODE:",
];
const INSTRUMENTATION_MARKER: &str = "INSTRUMENTATION_";

/// The structural field a log line encodes, borrowing its payload from the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine<'a> {
    /// A test class; the payload is already reduced to the simple class name
    ClassDeclaration(&'a str),
    /// Index of the test about to run
    CurrentTestIndex(&'a str),
    /// Number of tests in the run
    NumTests(&'a str),
    /// Output stream of the current test
    StreamChunk(&'a str),
    /// Stack trace of the current test
    StackTraceChunk(&'a str),
    /// A test method name
    TestNameDeclaration(&'a str),
    /// Terminal (or progress) status code, still unparsed
    StatusCode(&'a str),
    /// Total execution time, thousands separators stripped
    ExecutionTime(String),
    /// Known tag that carries nothing of interest
    IgnorableKnown,
    /// Free text continuing the previous stream/stack payload
    StackTraceContinuation(&'a str),
    /// Instrumentation output that matches no known tag
    Unrecognized(&'a str),
}

/// Classify one raw log line
///
/// The line is trimmed before matching. `namespace_prefix` is removed from
/// class declarations before the simple class name is taken.
#[must_use]
pub fn classify<'a>(line: &'a str, namespace_prefix: &str) -> LogLine<'a> {
    let line = line.trim();

    if let Some(class) = payload_after(line, CLASS) {
        return LogLine::ClassDeclaration(simple_class_name(class, namespace_prefix));
    }
    if let Some(index) = payload_after(line, CURRENT) {
        return LogLine::CurrentTestIndex(index);
    }
    if let Some(count) = payload_after(line, NUM_TESTS) {
        return LogLine::NumTests(count);
    }
    if let Some(stream) = payload_after(line, STREAM) {
        return LogLine::StreamChunk(stream);
    }
    if let Some(stack) = payload_after(line, STACK) {
        return LogLine::StackTraceChunk(stack);
    }
    if let Some(test) = payload_after(line, TEST) {
        return LogLine::TestNameDeclaration(test);
    }
    if let Some(code) = payload_after(line, STATUS_CODE) {
        return LogLine::StatusCode(code);
    }
    if let Some(time) = payload_after(line, TIME) {
        return LogLine::ExecutionTime(time.replace(',', "").trim().to_string());
    }
    if IGNORABLE.iter().any(|tag| line.contains(tag)) {
        return LogLine::IgnorableKnown;
    }
    if !line.contains(INSTRUMENTATION_MARKER) {
        return LogLine::StackTraceContinuation(line);
    }

    LogLine::Unrecognized(line)
}

/// Reduce a dotted class name to its last segment
///
/// `com.amplifyframework.storage.s3.StorageTest` becomes `StorageTest`.
#[must_use]
pub fn simple_class_name<'a>(class: &'a str, namespace_prefix: &str) -> &'a str {
    let class = class.trim();
    let class = if namespace_prefix.is_empty() {
        class
    } else {
        class.strip_prefix(namespace_prefix).unwrap_or(class)
    };
    class.rsplit('.').next().unwrap_or(class)
}

fn payload_after<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    line.find(tag).map(|idx| &line[idx + tag.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn classify_default(line: &str) -> LogLine<'_> {
        classify(line, DEFAULT_NAMESPACE_PREFIX)
    }

    #[test]
    fn test_class_declaration_strips_namespace() {
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS: class=com.amplifyframework.storage.FooTest"),
            LogLine::ClassDeclaration("FooTest")
        );
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS: class=org.example.BarTest"),
            LogLine::ClassDeclaration("BarTest")
        );
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS: class=PlainTest"),
            LogLine::ClassDeclaration("PlainTest")
        );
    }

    #[test]
    fn test_simple_tags() {
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS: current=3"),
            LogLine::CurrentTestIndex("3")
        );
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS: numtests=12"),
            LogLine::NumTests("12")
        );
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS: stream=boom"),
            LogLine::StreamChunk("boom")
        );
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS: stack=java.lang.AssertionError"),
            LogLine::StackTraceChunk("java.lang.AssertionError")
        );
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS: test=uploadFile"),
            LogLine::TestNameDeclaration("uploadFile")
        );
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS_CODE: -2"),
            LogLine::StatusCode(" -2")
        );
    }

    #[test]
    fn test_execution_time_strips_commas() {
        assert_eq!(
            classify_default("Time: 1,234.567"),
            LogLine::ExecutionTime("1234.567".to_string())
        );
    }

    #[test]
    fn test_ignorable_known() {
        for line in [
            "INSTRUMENTATION_STATUS: id=AndroidJUnitRunner",
            "INSTRUMENTATION_RESULT: stream=",
            "INSTRUMENTATION_CODE: -1",
        ] {
            assert_eq!(classify_default(line), LogLine::IgnorableKnown, "{line}");
        }
    }

    #[test]
    fn test_continuation_and_unrecognized() {
        assert_eq!(
            classify_default("\tat com.amplifyframework.Foo.bar(Foo.java:12)  "),
            LogLine::StackTraceContinuation("at com.amplifyframework.Foo.bar(Foo.java:12)")
        );
        assert_eq!(classify_default(""), LogLine::StackTraceContinuation(""));
        assert_eq!(
            classify_default("INSTRUMENTATION_ABORTED: System has crashed."),
            LogLine::Unrecognized("INSTRUMENTATION_ABORTED: System has crashed.")
        );
    }

    #[test]
    fn test_priority_order_first_match_wins() {
        // A stream payload that quotes a test declaration is still a stream
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS: stream=INSTRUMENTATION_STATUS: test=x"),
            LogLine::StreamChunk("INSTRUMENTATION_STATUS: test=x")
        );
        // A class tag anywhere in the line beats everything else
        assert_eq!(
            classify_default("noise INSTRUMENTATION_STATUS: class=a.b.CTest"),
            LogLine::ClassDeclaration("CTest")
        );
        // Status code beats the time tag
        assert_eq!(
            classify_default("INSTRUMENTATION_STATUS_CODE: 0 Time: 5"),
            LogLine::StatusCode(" 0 Time: 5")
        );
    }

    #[test]
    fn test_custom_namespace_prefix() {
        assert_eq!(simple_class_name("org.acme.pkg.WidgetTest", "org.acme."), "WidgetTest");
        assert_eq!(simple_class_name("WidgetTest", ""), "WidgetTest");
    }
}
