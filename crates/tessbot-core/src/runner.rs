//! Drives the oracle across every question of one quiz.

use tracing::{info, warn};

use crate::error::ApiError;
use crate::model::{Quiz, Score, Topic};
use crate::oracle::{discover_answer, Probe};
use crate::report::{Answer, QuestionRecord, QuizTranscript};
use crate::traits::QuizApi;
use crate::traversal::ProgressReporter;

/// Sequences the oracle over a quiz while keeping a running score that
/// mirrors the server's.
pub struct QuizRunner<'a> {
    api: &'a dyn QuizApi,
}

impl<'a> QuizRunner<'a> {
    pub fn new(api: &'a dyn QuizApi) -> Self {
        Self { api }
    }

    /// Answer every question of a freshly created quiz.
    ///
    /// A non-fatal error on one question is recorded as [`Answer::Failed`];
    /// the running score only moves if the server's score has moved with it.
    /// Fatal errors end the quiz.
    pub async fn run(
        &self,
        topic: &Topic,
        quiz: &Quiz,
        progress: &dyn ProgressReporter,
    ) -> Result<QuizTranscript, ApiError> {
        let mut score: Score = 0;
        let mut questions = Vec::with_capacity(quiz.questions.len());

        for question in &quiz.questions {
            let answer = match discover_answer(self.api, quiz.id, question, score).await {
                Ok(Probe::Correct(option)) => {
                    score += 1;
                    Answer::Correct(option)
                }
                Ok(Probe::NotFound) => {
                    warn!(quiz_id = quiz.id, question_id = question.id, "no option scored");
                    Answer::NotFound
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(
                        quiz_id = quiz.id,
                        question_id = question.id,
                        "question failed: {e}"
                    );
                    score = self.resync(quiz.id, score).await?;
                    Answer::Failed(e.to_string())
                }
            };

            let record = QuestionRecord {
                question_id: question.id,
                text: question.text.clone(),
                options: question.options.clone(),
                answer,
            };
            progress.on_question(topic, &record);
            questions.push(record);
        }

        info!(
            quiz_id = quiz.id,
            topic_id = topic.id,
            score,
            total = quiz.questions.len(),
            "quiz finished"
        );

        Ok(QuizTranscript {
            quiz_id: quiz.id,
            questions,
            final_score: score,
        })
    }

    /// Re-read the score after a failed question.
    ///
    /// A probe whose score read was lost may still have scored on the server,
    /// so the server may be at most one point ahead. Any other difference is a
    /// protocol error. If the re-read fails too, the running score is kept.
    async fn resync(&self, quiz_id: u64, running: Score) -> Result<Score, ApiError> {
        match self.api.quiz_score(quiz_id).await {
            Ok(server) => match server - running {
                0 => Ok(running),
                1 => {
                    warn!(quiz_id, running, server, "running score out of sync, adopting server score");
                    Ok(server)
                }
                delta => Err(ApiError::Protocol(format!(
                    "ambiguous score delta {delta} on resync of quiz {quiz_id} \
                     (expected {running} or {}, observed {server})",
                    running + 1
                ))),
            },
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(quiz_id, "score resync failed: {e}");
                Ok(running)
            }
        }
    }
}
