//! Status codes and test outcome classification

use serde::{Deserialize, Serialize};

/// Status code reported by the instrumentation runner for a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentationStatus {
    /// Test started (the default until a terminal code arrives)
    Start,
    /// Test still running
    InProgress,
    /// An assumption failed; the test did not really run
    AssumptionFailed,
    /// Test was ignored
    Ignored,
    /// Assertion failure
    Failure,
    /// Unexpected error
    Error,
    /// Test passed
    Ok,
}

impl InstrumentationStatus {
    /// Status code assigned to a test that has not finished yet
    pub const START_CODE: i32 = 1;

    /// Map a raw status code to a known status
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Start),
            2 => Some(Self::InProgress),
            -4 => Some(Self::AssumptionFailed),
            -3 => Some(Self::Ignored),
            -2 => Some(Self::Failure),
            -1 => Some(Self::Error),
            0 => Some(Self::Ok),
            _ => None,
        }
    }

    /// The raw status code
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Start => 1,
            Self::InProgress => 2,
            Self::AssumptionFailed => -4,
            Self::Ignored => -3,
            Self::Failure => -2,
            Self::Error => -1,
            Self::Ok => 0,
        }
    }
}

/// Outcome of a test as it appears in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestOutcome {
    /// OK, ignored, or assumption failed
    Passed,
    /// Anything that is neither passed nor an error, including tests that
    /// never finished
    Failed,
    /// The runner reported an error
    Error,
}

impl TestOutcome {
    /// Classify a raw status code
    #[must_use]
    pub fn from_status_code(code: i32) -> Self {
        match InstrumentationStatus::from_code(code) {
            Some(
                InstrumentationStatus::Ok
                | InstrumentationStatus::Ignored
                | InstrumentationStatus::AssumptionFailed,
            ) => Self::Passed,
            Some(InstrumentationStatus::Error) => Self::Error,
            _ => Self::Failed,
        }
    }

    /// Label used in reports
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        for code in [-4, -3, -2, -1, 0, 1, 2] {
            let status = InstrumentationStatus::from_code(code).expect("known code");
            assert_eq!(status.code(), code);
        }
        assert_eq!(InstrumentationStatus::from_code(3), None);
        assert_eq!(InstrumentationStatus::from_code(-5), None);
    }

    #[test]
    fn test_outcome_classification() {
        assert_eq!(TestOutcome::from_status_code(0), TestOutcome::Passed);
        assert_eq!(TestOutcome::from_status_code(-3), TestOutcome::Passed);
        assert_eq!(TestOutcome::from_status_code(-4), TestOutcome::Passed);
        assert_eq!(TestOutcome::from_status_code(-1), TestOutcome::Error);
        assert_eq!(TestOutcome::from_status_code(-2), TestOutcome::Failed);
        assert_eq!(TestOutcome::from_status_code(1), TestOutcome::Failed);
        assert_eq!(TestOutcome::from_status_code(2), TestOutcome::Failed);
        assert_eq!(TestOutcome::from_status_code(42), TestOutcome::Failed);
    }

    #[test]
    fn test_outcome_serializes_uppercase() {
        let json = serde_json::to_string(&TestOutcome::Error).expect("serialize");
        assert_eq!(json, "\"ERROR\"");
        assert_eq!(TestOutcome::Passed.as_str(), "PASSED");
    }
}
