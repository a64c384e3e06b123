/// Remote embedder backed by the Gemini `embedContent` endpoint.
use serde::Deserialize;
use serde_json::json;

use super::{Embedder, EmbedderError};
use crate::gemini::{GeminiClient, model_resource};

/// Task hint sent with search queries.
const TASK_QUERY: &str = "RETRIEVAL_QUERY";

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

pub struct GeminiEmbedder {
    client: GeminiClient,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    /// `model` may be given with or without the `models/` prefix.
    #[must_use]
    pub fn new(client: GeminiClient, model: &str, dimensions: usize) -> Self {
        Self {
            client,
            model: model_resource(model),
            dimensions,
        }
    }

    fn request(&self, text: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "content": { "parts": [{ "text": text }] },
            "taskType": TASK_QUERY,
        })
    }

    fn check(&self, values: Vec<f32>) -> Result<Vec<f32>, EmbedderError> {
        if values.len() != self.dimensions {
            return Err(EmbedderError::DimensionMismatch {
                expected: self.dimensions,
                actual: values.len(),
            });
        }
        Ok(values)
    }
}

impl Embedder for GeminiEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let url = self.client.method_url(&self.model, "embedContent");
        let resp: EmbedContentResponse = self.client.post(&url, &self.request(text))?;
        self.check(resp.embedding.values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
