//! tessbot-core: data model, answer oracle, and traversal engine.
//!
//! This crate defines the entities fetched from the quiz API, the `QuizApi`
//! seam the HTTP client implements, the score-delta oracle, and the runner and
//! traversal that drive it across units and topics.

pub mod error;
pub mod model;
pub mod oracle;
pub mod report;
pub mod runner;
pub mod traits;
pub mod traversal;

#[cfg(test)]
mod testing;

pub use error::ApiError;
pub use traits::QuizApi;
