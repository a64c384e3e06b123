//! Retrieval-augmented question answering.
//!
//! One [`RagChain::invoke`] runs retrieve → format → render → generate →
//! extract for a single question. Chains hold no per-question state and are
//! cheap to build, so callers may build one per request.
pub mod prompt;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::index::{IndexError, Passage, VectorIndex};
use crate::llm::{ChatModel, LlmError};

/// Number of passages retrieved per question.
pub const DEFAULT_TOP_K: usize = 3;

/// Separator placed between passages in the rendered context.
pub const PASSAGE_SEPARATOR: &str = "\n\n";

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] IndexError),

    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
}

/// Join passage texts with a blank line, keeping retrieval order.
#[must_use]
pub fn format_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join(PASSAGE_SEPARATOR)
}

pub struct RagChain {
    index: Arc<VectorIndex>,
    model: Arc<dyn ChatModel>,
    top_k: usize,
}

/// Build a chain over `index` that answers with `model`.
#[must_use]
pub fn build_chain(index: Arc<VectorIndex>, model: Arc<dyn ChatModel>, top_k: usize) -> RagChain {
    RagChain {
        index,
        model,
        top_k,
    }
}

impl RagChain {
    /// The prompt that would be sent for `question`, without calling the model.
    pub fn render_prompt(&self, question: &str) -> Result<String, ChainError> {
        let passages = self.index.similarity_search(question, self.top_k)?;
        let context = format_passages(&passages);
        debug!(
            "Context built from {} passages ({} bytes)",
            passages.len(),
            context.len()
        );

        Ok(prompt::question_answering(&context, question))
    }

    /// Answer `question` from the retrieved context.
    pub fn invoke(&self, question: &str) -> Result<String, ChainError> {
        let prompt = self.render_prompt(question)?;
        let answer = self.model.generate(&prompt)?;
        info!("Answered question ({} chars)", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(text: &str) -> Passage {
        Passage {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_passages_blank_line_separated() {
        let passages = [
            passage("Diabetes is..."),
            passage("Symptoms include..."),
            passage("Treatment involves..."),
        ];
        assert_eq!(
            format_passages(&passages),
            "Diabetes is...\n\nSymptoms include...\n\nTreatment involves..."
        );
    }

    #[test]
    fn test_format_passages_single_and_empty() {
        assert_eq!(format_passages(&[passage("only")]), "only");
        assert_eq!(format_passages(&[]), "");
    }

    #[test]
    fn test_format_passages_keeps_order() {
        let passages = [passage("b"), passage("a")];
        assert_eq!(format_passages(&passages), "b\n\na");
    }
}
