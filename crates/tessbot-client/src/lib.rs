//! tessbot-client: HTTP access to the Tesseract quiz API.
//!
//! Implements the `QuizApi` trait over reqwest, with retry on transient
//! failures, plus an in-memory server used by tests.

pub mod config;
pub mod http;
pub mod mock;
pub mod retry;
mod wire;

pub use config::{load_config, load_config_from, TessbotConfig};
pub use http::HttpQuizClient;
pub use mock::{MockQuizApi, MockTopic};
pub use retry::RetryPolicy;
