//! Tesseract API client over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use tessbot_core::model::{Attempt, Quiz, Score, Topic, Unit};
use tessbot_core::{ApiError, QuizApi};

use crate::config::TessbotConfig;
use crate::retry::RetryPolicy;
use crate::wire::{
    parse_payload, AnswerRequest, CreateQuizPayload, ResultPayload, ScorePayload, ScoreRequest,
    TopicsPayload, WireUnit,
};

pub const DEFAULT_BASE_URL: &str = "https://api.tesseractonline.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Authenticated client for the quiz endpoints.
pub struct HttpQuizClient {
    base_url: String,
    authorization: String,
    client: reqwest::Client,
    retry: RetryPolicy,
    timeout: Duration,
}

impl std::fmt::Debug for HttpQuizClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpQuizClient")
            .field("base_url", &self.base_url)
            .field("authorization", &"***")
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The `Authorization` header value for a token, with or without its
/// `Bearer ` prefix.
pub fn authorization_value(token: &str) -> String {
    let token = token.trim();
    match token.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => {
            format!("Bearer {}", token[7..].trim_start())
        }
        _ => format!("Bearer {token}"),
    }
}

impl HttpQuizClient {
    pub fn new(
        token: &str,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            authorization: authorization_value(token),
            client,
            retry: RetryPolicy::default(),
            timeout,
        })
    }

    /// Build a client from configuration and a resolved access token.
    pub fn from_config(config: &TessbotConfig, token: &str) -> Result<Self, ApiError> {
        Ok(Self::new(
            token,
            Some(config.base_url.clone()),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_retry(config.retry_policy()))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, "application/json")
    }

    fn post<B: serde::Serialize>(&self, path: &str, body: &B) -> RequestBuilder {
        // `json` sets Content-Type: application/json.
        self.client
            .post(self.url(path))
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, "application/json")
            .json(body)
    }

    /// Send with retries and return the body of a 2xx response.
    async fn send<F>(&self, label: &str, build: F) -> Result<String, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        self.retry
            .run(label, || {
                let request = build();
                async move { self.send_once(request).await }
            })
            .await
    }

    async fn send_once(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;
        debug!(status, bytes = body.len(), "response received");

        match status {
            200..=299 => Ok(body),
            401 | 403 => Err(ApiError::Auth {
                status,
                message: truncate(&body),
            }),
            _ => Err(ApiError::Status {
                status,
                message: truncate(&body),
            }),
        }
    }

    async fn fetch<T, F>(&self, label: &str, build: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let body = self.send(label, build).await?;
        parse_payload(&body)
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[async_trait]
impl QuizApi for HttpQuizClient {
    #[instrument(skip(self))]
    async fn subject_units(&self, subject_id: u64) -> Result<Vec<Unit>, ApiError> {
        let path = format!("studentmaster/get-subject-units/{subject_id}");
        let units: Vec<WireUnit> = self.fetch("subject-units", || self.get(&path)).await?;
        Ok(units.into_iter().map(Unit::from).collect())
    }

    #[instrument(skip(self))]
    async fn unit_topics(&self, unit_id: u64) -> Result<Vec<Topic>, ApiError> {
        let path = format!("studentmaster/get-topics-unit/{unit_id}");
        let payload: TopicsPayload = self.fetch("unit-topics", || self.get(&path)).await?;
        Ok(payload
            .topics
            .into_iter()
            .map(|t| t.into_topic(unit_id))
            .collect())
    }

    #[instrument(skip(self))]
    async fn quiz_completed(&self, topic_id: u64) -> Result<bool, ApiError> {
        let path = format!("quizattempts/quiz-result/{topic_id}");
        let payload: ResultPayload = self.fetch("quiz-result", || self.get(&path)).await?;
        Ok(payload.is_completed())
    }

    #[instrument(skip(self))]
    async fn create_quiz(&self, topic_id: u64) -> Result<Quiz, ApiError> {
        let path = format!("quizattempts/create-quiz/{topic_id}");
        let payload: CreateQuizPayload = self.fetch("create-quiz", || self.get(&path)).await?;
        payload.into_quiz(topic_id)
    }

    #[instrument(
        skip(self, attempt),
        fields(
            quiz_id = attempt.quiz_id,
            question_id = attempt.question_id,
            option = %attempt.option
        )
    )]
    async fn submit_answer(&self, attempt: &Attempt) -> Result<(), ApiError> {
        let body = AnswerRequest {
            quiz_id: attempt.quiz_id,
            question_id: attempt.question_id,
            user_answer: attempt.option,
        };
        self.send("save-answer", || {
            self.post("quizquestionattempts/save-user-quiz-answer", &body)
        })
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn quiz_score(&self, quiz_id: u64) -> Result<Score, ApiError> {
        let body = ScoreRequest { quiz_id };
        let payload: ScorePayload = self
            .fetch("submit-quiz", || self.post("quizattempts/submit-quiz", &body))
            .await?;
        Ok(payload.score)
    }
}
