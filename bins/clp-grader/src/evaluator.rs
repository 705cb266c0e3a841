//! Grading logic: output normalization, per-case comparison, tallying.
//!
//! Pure functions; nothing here knows about HTTP, retries, or pacing.
//! Normalization trims the ends, folds CR-LF to LF, and collapses every
//! internal whitespace run to a single space, so cosmetic differences in
//! line endings or spacing never fail a test case.

use clp_common::types::{TestCase, TestCaseResult};
use serde::Serialize;

/// Normalize program output for comparison. Idempotent.
pub fn normalize_output(raw: &str) -> String {
    // split_whitespace folds CR-LF, trims, and collapses runs in one pass
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Grade one test case against the raw output the program produced.
/// Hidden cases are flagged but still fully computed.
pub fn evaluate_case(case: &TestCase, raw_output: &str) -> TestCaseResult {
    let actual = normalize_output(raw_output);
    let expected = normalize_output(&case.expected_output);
    let is_correct = actual == expected;

    TestCaseResult {
        input: case.input_data.clone(),
        expected,
        actual,
        is_correct,
        hidden: case.hidden,
    }
}

/// Tallied outcome of one evaluation run.
///
/// Invariants: `score == passed * 10`, `correct == (passed == total)`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EvaluationSummary {
    pub total: u32,
    pub passed: u32,
    pub score: u32,
    pub correct: bool,
}

pub fn summarize(results: &[TestCaseResult]) -> EvaluationSummary {
    let total = results.len() as u32;
    let passed = results.iter().filter(|r| r.is_correct).count() as u32;

    EvaluationSummary {
        total,
        passed,
        score: passed * 10,
        correct: passed == total,
    }
}
