//! The remote API seam.
//!
//! Implemented by `HttpQuizClient` and `MockQuizApi` in `tessbot-client`.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{Attempt, Quiz, Score, Topic, Unit};

/// The six calls the answer-discovery workflow needs from the quiz API.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// List the units of a subject.
    async fn subject_units(&self, subject_id: u64) -> Result<Vec<Unit>, ApiError>;

    /// List every topic of a unit, with or without a quiz.
    async fn unit_topics(&self, unit_id: u64) -> Result<Vec<Topic>, ApiError>;

    /// Whether the topic's quiz already carries a completion badge.
    async fn quiz_completed(&self, topic_id: u64) -> Result<bool, ApiError>;

    /// Create a fresh quiz for the topic, questions included.
    async fn create_quiz(&self, topic_id: u64) -> Result<Quiz, ApiError>;

    /// Submit one answer. Changes the stored score if the answer is correct.
    async fn submit_answer(&self, attempt: &Attempt) -> Result<(), ApiError>;

    /// Read the quiz's current score.
    async fn quiz_score(&self, quiz_id: u64) -> Result<Score, ApiError>;
}
