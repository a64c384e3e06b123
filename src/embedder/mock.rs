/// Deterministic offline embedder.
///
/// Each component is derived from a hash of the text and the component
/// index, so equal texts map to equal unit vectors without any network call.
use std::hash::{DefaultHasher, Hash, Hasher};

use super::{Embedder, EmbedderError};

pub struct MockEmbedder {
    pub dimensions: usize,
}

impl MockEmbedder {
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self { dimensions: 768 }
    }
}

impl Embedder for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let mut embedding: Vec<f32> = (0..self.dimensions)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                (text, i).hash(&mut hasher);
                // Map the top 24 bits to [-1, 1)
                ((hasher.finish() >> 40) as f32 / (1u64 << 23) as f32) - 1.0
            })
            .collect();

        let norm_sq: f32 = embedding.iter().map(|v| v * v).sum();
        if norm_sq > 0.0 {
            let inv = 1.0 / norm_sq.sqrt();
            for v in &mut embedding {
                *v *= inv;
            }
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_embed_dimensions() {
        let embedder = MockEmbedder::new(16);
        assert_eq!(embedder.embed("hello world").unwrap().len(), 16);
        assert_eq!(MockEmbedder::default().dimensions(), 768);
    }

    #[test]
    fn test_mock_embed_deterministic() {
        let embedder = MockEmbedder::new(64);
        let a = embedder.embed("What is diabetes?").unwrap();
        let b = embedder.embed("What is diabetes?").unwrap();
        assert_eq!(a, b, "same input should produce same output");

        let c = embedder.embed("What is asthma?").unwrap();
        assert_ne!(a, c, "different inputs should produce different outputs");
    }

    #[test]
    fn test_mock_embed_normalized() {
        let embedder = MockEmbedder::new(64);
        let vec = embedder.embed("test normalization").unwrap();
        let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!(
            (norm - 1.0).abs() < 0.01,
            "vector should be approximately unit length, got {norm}"
        );
    }
}
