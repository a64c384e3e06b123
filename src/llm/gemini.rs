/// Gemini `generateContent` chat model.
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{ChatModel, GenerationConfig, LlmError};
use crate::gemini::{GeminiClient, model_resource};

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

pub struct GeminiChat {
    client: GeminiClient,
    model: String,
    config: GenerationConfig,
}

impl GeminiChat {
    #[must_use]
    pub fn new(client: GeminiClient, model: &str, config: GenerationConfig) -> Self {
        Self {
            client,
            model: model_resource(model),
            config,
        }
    }

    fn request(&self, prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.config.temperature,
                "maxOutputTokens": self.config.max_output_tokens,
            },
        })
    }
}

impl ChatModel for GeminiChat {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = self.client.method_url(&self.model, "generateContent");
        debug!(
            "Generating with {} ({} prompt bytes)",
            self.model,
            prompt.len()
        );

        let resp: GenerateContentResponse = self.client.post(&url, &self.request(prompt))?;
        extract_text(resp)
    }
}

/// Plain text of the first candidate: its text parts concatenated.
fn extract_text(resp: GenerateContentResponse) -> Result<String, LlmError> {
    let Some(candidate) = resp.candidates.into_iter().next() else {
        return match resp.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(LlmError::Blocked(reason)),
            None => Err(LlmError::NoCandidates),
        };
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            warn!("Generation finished with reason {reason}");
        }
    }

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if text.is_empty() {
        return Err(LlmError::EmptyReply(candidate.finish_reason));
    }

    Ok(text)
}
