pub mod openai;
pub mod prompts;
pub mod verdict;

pub use openai::OpenAiOracle;
pub use verdict::Verdict;

use crate::error::OracleError;
use async_trait::async_trait;

/// External decision-maker consulted once per traversal step
///
/// Receives the fixed instruction and the current page's content (filtered links
/// or markdown) and returns its raw answer, which the caller parses as a `Verdict`.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn decide(&self, instruction: &str, content: &str) -> Result<String, OracleError>;
}
