//! Wire shapes of the Tesseract API.
//!
//! Every response wraps its data in a `payload` envelope. Field names follow
//! the API's camelCase.

use std::collections::BTreeMap;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use tessbot_core::model::{OptionKey, Question, Quiz, Score, Topic, Unit};
use tessbot_core::ApiError;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    payload: Option<T>,
}

/// Parse a response body and unwrap its payload.
pub(crate) fn parse_payload<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(body)
        .map_err(|e| ApiError::Protocol(format!("unexpected response shape: {e}")))?;
    envelope.payload.ok_or_else(|| {
        ApiError::Protocol("response has no payload (is the access token valid?)".into())
    })
}

/// Ids arrive as JSON numbers, occasionally as numeric strings.
fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }
    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n),
        RawId::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid id: {s:?}"))),
    }
}

/// `contentFlag` is a boolean on some deployments and 0/1 on others. The
/// field itself is required; only an explicit `null` reads as `false`.
fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        serde_json::Value::Null => Ok(false),
        other => Err(de::Error::custom(format!("invalid flag: {other}"))),
    }
}

/// `Option::deserialize` routed through `deserialize_with`, so that a missing
/// `badge` is an error while `null` still reads as `None`.
fn de_badge<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Option::<i64>::deserialize(deserializer)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScorePayload {
    pub score: Score,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopicsPayload {
    pub topics: Vec<WireTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireTopic {
    #[serde(deserialize_with = "de_id")]
    id: u64,
    name: String,
    #[serde(deserialize_with = "de_flag")]
    content_flag: bool,
}

impl WireTopic {
    pub fn into_topic(self, unit_id: u64) -> Topic {
        Topic {
            id: self.id,
            name: self.name,
            unit_id,
            has_quiz: self.content_flag,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultPayload {
    /// Required, but `null` on quizzes never attempted.
    #[serde(deserialize_with = "de_badge")]
    badge: Option<i64>,
}

impl ResultPayload {
    pub fn is_completed(&self) -> bool {
        self.badge == Some(1)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateQuizPayload {
    #[serde(deserialize_with = "de_id")]
    quiz_id: u64,
    questions: Vec<WireQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuestion {
    #[serde(deserialize_with = "de_id")]
    question_id: u64,
    question: String,
    #[serde(default)]
    options: BTreeMap<String, Option<String>>,
}

impl CreateQuizPayload {
    pub fn into_quiz(self, topic_id: u64) -> Result<Quiz, ApiError> {
        let questions = self
            .questions
            .into_iter()
            .map(|q| {
                let options = q
                    .options
                    .into_iter()
                    .map(|(key, text)| {
                        let key = key.parse::<OptionKey>().map_err(|e| {
                            ApiError::Protocol(format!("question {}: {e}", q.question_id))
                        })?;
                        Ok((key, text.unwrap_or_default()))
                    })
                    .collect::<Result<BTreeMap<_, _>, ApiError>>()?;
                Ok(Question {
                    id: q.question_id,
                    text: q.question,
                    options,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(Quiz {
            id: self.quiz_id,
            topic_id,
            questions,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireUnit {
    #[serde(deserialize_with = "de_id")]
    unit_id: u64,
    unit_name: String,
}

impl From<WireUnit> for Unit {
    fn from(unit: WireUnit) -> Self {
        Unit {
            id: unit.unit_id,
            name: unit.unit_name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreRequest {
    pub quiz_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnswerRequest {
    pub quiz_id: u64,
    pub question_id: u64,
    pub user_answer: OptionKey,
}
