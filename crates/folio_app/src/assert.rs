//! Assertion helpers for headless scenario checks.

use crate::app::{MountPhase, PortfolioApp};
use folio_core::{Target, Value};

/// Assertion result with structured failure details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionResult {
    Passed,
    Failed { code: String, message: String },
}

pub fn evaluate_assert_phase(expected: MountPhase, app: &PortfolioApp) -> AssertionResult {
    let actual = app.phase();
    if actual == expected {
        AssertionResult::Passed
    } else {
        AssertionResult::Failed {
            code: "phase_mismatch".to_string(),
            message: format!("expected phase {expected:?}, got {actual:?}"),
        }
    }
}

pub fn evaluate_assert_property(
    id: &str,
    property: &str,
    expected: &str,
    tolerance: f32,
    app: &PortfolioApp,
) -> AssertionResult {
    let Ok(expected_value) = expected.parse::<Value>() else {
        return AssertionResult::Failed {
            code: "invalid_expectation".to_string(),
            message: format!("{id}.{property}: cannot parse expected value '{expected}'"),
        };
    };
    let Some(node) = app.page().node(id) else {
        return AssertionResult::Failed {
            code: "missing_element".to_string(),
            message: format!("{id}: element not found"),
        };
    };
    let Some(actual) = node.borrow().get(property) else {
        return AssertionResult::Failed {
            code: "missing_property".to_string(),
            message: format!("{id}.{property}: never written"),
        };
    };

    if actual.approx_eq(&expected_value, tolerance.max(f32::EPSILON)) {
        AssertionResult::Passed
    } else {
        AssertionResult::Failed {
            code: "value_mismatch".to_string(),
            message: format!("{id}.{property}: expected {expected_value}, got {actual}"),
        }
    }
}
