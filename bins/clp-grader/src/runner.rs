//! Submission run orchestration.
//!
//! Drives the retrying invoker across a question's test cases strictly
//! in order, with an unconditional pause after every case to keep the
//! request rate against the shared execution service bounded. Grading
//! and persistence stay in their own modules; this is the glue layer.

use crate::backend::{BackendClient, BackendError};
use crate::evaluator::{self, EvaluationSummary};
use crate::executor::{CompilerClient, ExecutionError, RunRequest};
use crate::retry::RetryPolicy;
use clp_common::types::{Language, Question, SubmissionOutcome, TestCaseResult};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Everything one evaluation run produced, for display. If the final
/// save failed the results are still returned, marked unsaved.
#[derive(Debug)]
pub struct EvaluationReport {
    pub run_id: Uuid,
    pub question_id: u64,
    pub results: Vec<TestCaseResult>,
    pub summary: EvaluationSummary,
    pub persist_error: Option<BackendError>,
}

impl EvaluationReport {
    pub fn saved(&self) -> bool {
        self.persist_error.is_none()
    }
}

pub struct SubmissionRunner<'a> {
    compiler: &'a CompilerClient,
    backend: &'a BackendClient,
    retry: RetryPolicy,
    case_delay: Duration,
}

impl<'a> SubmissionRunner<'a> {
    pub fn new(
        compiler: &'a CompilerClient,
        backend: &'a BackendClient,
        retry: RetryPolicy,
        case_delay: Duration,
    ) -> Self {
        Self {
            compiler,
            backend,
            retry,
            case_delay,
        }
    }

    /// Grade `code` against every test case of `question`, then persist
    /// the outcome.
    ///
    /// Test cases run sequentially, never in parallel. A terminal
    /// executor failure aborts the whole run and nothing is persisted;
    /// failing test cases are normal graded outcomes, not errors. A
    /// failed persistence call is reported on the returned report, not
    /// retried.
    pub async fn run(
        &self,
        question: &Question,
        code: &str,
        language: Language,
    ) -> Result<EvaluationReport, ExecutionError> {
        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            question_id = question.id,
            language = %language,
            test_cases = question.test_cases.len(),
            "Starting submission evaluation"
        );

        let mut results = Vec::with_capacity(question.test_cases.len());
        for (idx, case) in question.test_cases.iter().enumerate() {
            let request = RunRequest::new(code, language, case.input_data.as_str());
            let raw = self.compiler.run_with_retry(&request, &self.retry).await?;

            let result = evaluator::evaluate_case(case, &raw);
            debug!(
                run_id = %run_id,
                case = idx + 1,
                passed = result.is_correct,
                hidden = result.hidden,
                "Test case evaluated"
            );
            results.push(result);

            // Unconditional throttle, applied whatever the case outcome
            tokio::time::sleep(self.case_delay).await;
        }

        let summary = evaluator::summarize(&results);
        info!(
            run_id = %run_id,
            passed = summary.passed,
            total = summary.total,
            score = summary.score,
            correct = summary.correct,
            "Evaluation complete"
        );

        let outcome = SubmissionOutcome {
            question_id: question.id,
            code: code.to_string(),
            total_test_cases: summary.total,
            passed_test_cases: summary.passed,
            score: summary.score,
            correct: summary.correct,
        };

        // Single save, never retried; failure keeps the results local
        let persist_error = match self.backend.submit(&outcome).await {
            Ok(_) => {
                info!(run_id = %run_id, "Submission persisted");
                None
            }
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "Failed to persist submission, results kept locally");
                Some(e)
            }
        };

        Ok(EvaluationReport {
            run_id,
            question_id: question.id,
            results,
            summary,
            persist_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clp_common::types::TestCase;
    use mockito::Matcher;
    use serde_json::json;

    fn question(cases: Vec<TestCase>) -> Question {
        Question {
            id: 7,
            title: "Echo".to_string(),
            description: String::new(),
            sample_input: String::new(),
            sample_output: String::new(),
            test_cases: cases,
        }
    }

    fn case(input: &str, expected: &str, hidden: bool) -> TestCase {
        TestCase {
            input_data: input.to_string(),
            expected_output: expected.to_string(),
            hidden,
        }
    }

    fn runner<'a>(
        compiler: &'a CompilerClient,
        backend: &'a BackendClient,
    ) -> SubmissionRunner<'a> {
        // Millisecond pacing keeps the tests fast; the schedule itself is
        // covered by the retry and config tests
        SubmissionRunner::new(
            compiler,
            backend,
            RetryPolicy {
                max_attempts: 5,
                backoff_unit: Duration::from_millis(1),
            },
            Duration::from_millis(1),
        )
    }

    fn clients(url: &str) -> (CompilerClient, BackendClient) {
        (
            CompilerClient::new(url, Duration::from_secs(5)).unwrap(),
            BackendClient::new(url, Duration::from_secs(5)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_partial_pass_scores_and_persists() {
        let mut server = mockito::Server::new_async().await;

        for (stdin, output) in [("1", "one"), ("2", "wrong"), ("3", "three")] {
            server
                .mock("POST", "/compiler/run")
                .match_body(Matcher::PartialJson(json!({ "stdin": stdin })))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(json!({ "output": output }).to_string())
                .create_async()
                .await;
        }

        let submit = server
            .mock("POST", "/coding/submit")
            .match_body(Matcher::PartialJson(json!({
                "questionId": 7,
                "totalTestCases": 3,
                "passedTestCases": 2,
                "score": 20,
                "correct": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":99}"#)
            .expect(1)
            .create_async()
            .await;

        let (compiler, backend) = clients(&server.url());
        let q = question(vec![
            case("1", "one", false),
            case("2", "two", false),
            case("3", "three", true),
        ]);

        let report = runner(&compiler, &backend)
            .run(&q, "print(x)", Language::Python3)
            .await
            .unwrap();

        assert_eq!(report.summary.passed, 2);
        assert_eq!(report.summary.score, 20);
        assert!(!report.summary.correct);
        assert!(report.saved());
        assert_eq!(report.results.len(), 3);
        assert!(report.results[0].is_correct);
        assert!(!report.results[1].is_correct);
        assert!(report.results[2].is_correct);
        assert!(report.results[2].hidden);
        submit.assert_async().await;
    }

    #[tokio::test]
    async fn test_fully_correct_submission() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/compiler/run")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"output":"ok\n"}"#)
            .expect(2)
            .create_async()
            .await;
        server
            .mock("POST", "/coding/submit")
            .match_body(Matcher::PartialJson(json!({
                "passedTestCases": 2,
                "score": 20,
                "correct": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let (compiler, backend) = clients(&server.url());
        let q = question(vec![case("a", "ok", false), case("b", " ok ", false)]);

        let report = runner(&compiler, &backend)
            .run(&q, "code", Language::Cpp)
            .await
            .unwrap();

        assert!(report.summary.correct);
        assert_eq!(report.summary.score, 20);
        assert!(report.saved());
    }

    #[tokio::test]
    async fn test_infrastructure_failure_aborts_without_persisting() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/compiler/run")
            .with_status(500)
            .create_async()
            .await;
        let submit = server
            .mock("POST", "/coding/submit")
            .expect(0)
            .create_async()
            .await;

        let (compiler, backend) = clients(&server.url());
        let q = question(vec![case("a", "ok", false)]);

        let err = runner(&compiler, &backend)
            .run(&q, "code", Language::Java)
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::Service { status: 500 }));
        submit.assert_async().await;
    }

    #[tokio::test]
    async fn test_persistence_failure_keeps_results_unsaved() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/compiler/run")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"output":"ok"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/coding/submit")
            .with_status(503)
            .create_async()
            .await;

        let (compiler, backend) = clients(&server.url());
        let q = question(vec![case("a", "ok", false)]);

        let report = runner(&compiler, &backend)
            .run(&q, "code", Language::Nodejs)
            .await
            .unwrap();

        assert!(!report.saved());
        assert_eq!(report.summary.score, 10);
        assert!(matches!(
            report.persist_error,
            Some(BackendError::Status { status: 503 })
        ));
    }

    #[tokio::test]
    async fn test_empty_suite_submits_vacuous_outcome() {
        let mut server = mockito::Server::new_async().await;
        let submit = server
            .mock("POST", "/coding/submit")
            .match_body(Matcher::PartialJson(json!({
                "totalTestCases": 0,
                "score": 0,
                "correct": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;

        let (compiler, backend) = clients(&server.url());
        let report = runner(&compiler, &backend)
            .run(&question(vec![]), "code", Language::C)
            .await
            .unwrap();

        assert_eq!(report.summary.total, 0);
        assert!(report.saved());
        submit.assert_async().await;
    }
}
