//! Chat-completion models.
pub mod gemini;
pub mod mock;

use thiserror::Error;

use crate::gemini::GeminiError;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("generation request failed: {0}")]
    Remote(#[from] GeminiError),

    #[error("model returned no candidates")]
    NoCandidates,

    #[error("model returned an empty reply (finish reason: {})", .0.as_deref().unwrap_or("none"))]
    EmptyReply(Option<String>),

    #[error("generation blocked: {0}")]
    Blocked(String),

    #[error("{0}")]
    Other(String),
}

/// Sampling settings sent with every prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.5,
            max_output_tokens: 512,
        }
    }
}

/// A model that turns one rendered prompt into one complete reply.
pub trait ChatModel: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
