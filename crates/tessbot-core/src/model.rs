//! Core data model types for tessbot.
//!
//! Every entity here is fetched from the remote API for the duration of a
//! single topic and then dropped; nothing is persisted apart from the report.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A container of topics, as listed for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: u64,
    pub name: String,
}

/// A content unit that may carry a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Server-assigned topic id.
    pub id: u64,
    /// Human-readable topic name.
    pub name: String,
    /// Unit this topic belongs to.
    pub unit_id: u64,
    /// Whether the topic carries a quiz (`contentFlag` on the wire).
    pub has_quiz: bool,
}

/// One answer option key. The API only ever offers `a` through `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    /// All keys in probing order.
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKey::A => "a",
            OptionKey::B => "b",
            OptionKey::C => "c",
            OptionKey::D => "d",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" => Ok(OptionKey::A),
            "b" => Ok(OptionKey::B),
            "c" => Ok(OptionKey::C),
            "d" => Ok(OptionKey::D),
            other => Err(format!("unknown option key: {other}")),
        }
    }
}

/// A multiple-choice question inside a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u64,
    pub text: String,
    /// Option texts keyed by option letter.
    #[serde(default)]
    pub options: BTreeMap<OptionKey, String>,
}

impl Question {
    /// Option keys to probe, in canonical order.
    ///
    /// A question that lists no options is probed with every key.
    pub fn candidate_keys(&self) -> Vec<OptionKey> {
        if self.options.is_empty() {
            OptionKey::ALL.to_vec()
        } else {
            // BTreeMap iterates in key order, which is the probing order.
            self.options.keys().copied().collect()
        }
    }
}

/// A quiz created on demand for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Server-assigned quiz id, distinct from the topic id.
    pub id: u64,
    pub topic_id: u64,
    pub questions: Vec<Question>,
}

/// A single side-effecting answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub quiz_id: u64,
    pub question_id: u64,
    pub option: OptionKey,
}

/// A quiz score as reported by the server.
pub type Score = i64;
