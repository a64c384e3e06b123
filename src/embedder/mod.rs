/// Embedder trait and shared types for text embedding.
pub mod gemini;
pub mod mock;

use thiserror::Error;

use crate::gemini::GeminiError;

/// Errors that can occur during embedding operations.
#[derive(Error, Debug)]
pub enum EmbedderError {
    #[error("embedding request failed: {0}")]
    Remote(#[from] GeminiError),

    #[error("embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for text embedding implementations.
///
/// All implementations must be `Send + Sync` to allow shared use
/// behind `Arc`.
pub trait Embedder: Send + Sync {
    /// Embed a search query into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError>;

    /// Return the dimensionality of the embedding vectors.
    fn dimensions(&self) -> usize;
}
