//! Score-delta answer oracle.
//!
//! The API never reveals which option is correct. The only observable signal
//! is the quiz score, so each candidate is submitted in turn and the score is
//! re-read; the first option that moves it by exactly one point wins.

use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::model::{Attempt, OptionKey, Question, Score};
use crate::traits::QuizApi;

/// Terminal outcome of probing one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// This option raised the score by one.
    Correct(OptionKey),
    /// No candidate raised the score.
    NotFound,
}

/// Probe the question's options in order against `baseline`, the quiz score
/// before any answer to this question was submitted.
///
/// Each submission is followed by a score read before the next option is
/// tried. Any error stops probing this question. A score that moves by
/// anything other than zero or one point is reported as a protocol error
/// since it cannot be attributed to the option just submitted.
#[instrument(skip(api, question), fields(question_id = question.id))]
pub async fn discover_answer(
    api: &dyn QuizApi,
    quiz_id: u64,
    question: &Question,
    baseline: Score,
) -> Result<Probe, ApiError> {
    for option in question.candidate_keys() {
        let attempt = Attempt {
            quiz_id,
            question_id: question.id,
            option,
        };
        api.submit_answer(&attempt).await?;
        let observed = api.quiz_score(quiz_id).await?;

        match observed - baseline {
            0 => debug!(%option, observed, "option did not score"),
            1 => {
                debug!(%option, observed, "option scored");
                return Ok(Probe::Correct(option));
            }
            delta => {
                return Err(ApiError::Protocol(format!(
                    "ambiguous score delta {delta} after answering question {} with '{option}' \
                     (expected {baseline} or {}, observed {observed})",
                    question.id,
                    baseline + 1
                )));
            }
        }
    }

    Ok(Probe::NotFound)
}
