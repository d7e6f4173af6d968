//! Request dispatch.
//!
//! Decodes one protocol line, runs the matching operation and always
//! produces a [`Response`]; nothing here can stop the server.

use crate::scoring::Submission;

use super::requests::Request;
use super::responses::{ErrorBody, Response, SubmitSummary};
use super::types::AppState;

/// Dispatches decoded requests against the shared state.
#[derive(Debug, Clone)]
pub struct RequestHandler {
    state: AppState,
}

impl RequestHandler {
    /// Create a handler over `state`.
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    /// The shared state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Decode and handle a single line.
    pub async fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "malformed request line");
                Response::error(ErrorBody::bad_request(e.to_string()))
            }
        }
    }

    /// Handle a decoded request.
    pub async fn handle(&self, request: Request) -> Response {
        tracing::debug!(
            op = request.op(),
            learner_id = request.learner_id(),
            "handling request"
        );

        match request {
            Request::Enroll { learner_id } => {
                match self.state.storage.enroll_learner(&learner_id).await {
                    Ok(profile) => Response::learner(profile),
                    Err(e) => Response::error(ErrorBody::from(&e)),
                }
            }
            Request::GetLearner { learner_id } => {
                match self.state.storage.get_learner(&learner_id).await {
                    Ok(Some(profile)) => Response::learner(profile),
                    Ok(None) => Response::error(ErrorBody::new(
                        "not_found",
                        format!("Learner not found: {learner_id}"),
                    )),
                    Err(e) => Response::error(ErrorBody::from(&e)),
                }
            }
            Request::Submit {
                learner_id,
                assessment_type,
                answers,
                score,
            } => {
                let score = score.as_ref().map(|s| s.as_text());
                let submission = Submission::from_request(
                    &learner_id,
                    assessment_type.as_deref(),
                    answers.as_deref(),
                    score.as_deref(),
                );

                let result = match submission {
                    Ok(submission) => self.state.recorder.record_submission(&submission).await,
                    Err(e) => Err(e),
                };

                match result {
                    Ok(outcome) => Response::submitted(SubmitSummary::from(&outcome)),
                    Err(e) => {
                        tracing::warn!(learner_id = %learner_id, error = %e, "submission rejected");
                        Response::error(ErrorBody::from(&e))
                    }
                }
            }
        }
    }
}
