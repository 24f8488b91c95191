// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test run hierarchy reconstructed from an instrumentation log
//!
//! A [`TestRun`] owns its [`TestSuite`]s, which own their [`Test`]s. Suites and
//! tests are looked up by name and created on first sight; later declarations
//! with the same name resume the existing entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::result::{InstrumentationStatus, TestOutcome};

/// One test-execution session for a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRun {
    /// Module the run belongs to
    pub module: String,
    /// Suites by class name
    pub suites: BTreeMap<String, TestSuite>,
    /// Execution time reported by the runner, as text
    pub execution_time: Option<String>,
}

impl TestRun {
    /// Create an empty run for a module
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            suites: BTreeMap::new(),
            execution_time: None,
        }
    }

    /// Look up a suite by class name
    #[must_use]
    pub fn suite(&self, name: &str) -> Option<&TestSuite> {
        self.suites.get(name)
    }

    /// Look up a suite by class name for mutation
    pub fn suite_mut(&mut self, name: &str) -> Option<&mut TestSuite> {
        self.suites.get_mut(name)
    }

    /// Get the suite with this name, creating it if absent
    pub fn suite_or_insert(&mut self, name: &str) -> &mut TestSuite {
        self.suites
            .entry(name.to_string())
            .or_insert_with(|| TestSuite::new(name))
    }

    /// Passing tests across all suites
    #[must_use]
    pub fn passing_tests(&self) -> usize {
        self.suites.values().map(|s| s.passing_tests).sum()
    }

    /// Failing tests across all suites
    #[must_use]
    pub fn failing_tests(&self) -> usize {
        self.suites.values().map(|s| s.failing_tests).sum()
    }
}

/// One test class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Simple class name
    pub name: String,
    /// Tests by method name
    pub tests: BTreeMap<String, Test>,
    /// Number of `OK` status codes recorded
    pub passing_tests: usize,
    /// Number of `Failure` status codes recorded
    pub failing_tests: usize,
}

impl TestSuite {
    /// Create an empty suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: BTreeMap::new(),
            passing_tests: 0,
            failing_tests: 0,
        }
    }

    /// Look up a test by method name
    #[must_use]
    pub fn test(&self, name: &str) -> Option<&Test> {
        self.tests.get(name)
    }

    /// Get the test with this name, creating it with the start status if absent
    pub fn test_or_insert(&mut self, name: &str) -> &mut Test {
        self.tests
            .entry(name.to_string())
            .or_insert_with(|| Test::new(name))
    }
}

/// One test method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    /// Method name
    pub name: String,
    /// Raw status code, [`InstrumentationStatus::START_CODE`] until a status
    /// line closes the test
    pub status_code: i32,
    /// Stack trace captured for failures and errors
    pub stack_trace: Option<String>,
}

impl Test {
    /// Create a test in the start state
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status_code: InstrumentationStatus::START_CODE,
            stack_trace: None,
        }
    }

    /// The status code as a known status, if it is one
    #[must_use]
    pub fn status(&self) -> Option<InstrumentationStatus> {
        InstrumentationStatus::from_code(self.status_code)
    }

    /// Report classification of the status code
    #[must_use]
    pub fn outcome(&self) -> TestOutcome {
        TestOutcome::from_status_code(self.status_code)
    }

    /// Whether the test ended in a failure or an error
    #[must_use]
    pub fn is_failure_or_error(&self) -> bool {
        matches!(
            self.status(),
            Some(InstrumentationStatus::Failure | InstrumentationStatus::Error)
        )
    }
}
