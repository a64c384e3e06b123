/// Scripted chat model for offline runs and tests.
///
/// Replies are served in order; once the script is exhausted the fallback
/// reply is returned. Every prompt received is recorded.
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{ChatModel, LlmError};

pub struct MockChatModel {
    replies: Mutex<VecDeque<Result<String, String>>>,
    fallback: String,
    prompts: Mutex<Vec<String>>,
}

impl MockChatModel {
    /// A model that always answers `reply`.
    #[must_use]
    pub fn new(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a reply for the next call.
    #[must_use]
    pub fn then_reply(self, reply: &str) -> Self {
        self.push(Ok(reply.to_string()));
        self
    }

    /// Queue a failure for the next call.
    #[must_use]
    pub fn then_fail(self, message: &str) -> Self {
        self.push(Err(message.to_string()));
        self
    }

    fn push(&self, item: Result<String, String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(item);
        }
    }

    /// Prompts received so far, oldest first.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl ChatModel for MockChatModel {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .map_err(|e| LlmError::Other(format!("lock poisoned: {e}")))?
            .push(prompt.to_string());

        let next = self
            .replies
            .lock()
            .map_err(|e| LlmError::Other(format!("lock poisoned: {e}")))?
            .pop_front();

        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(LlmError::Other(message)),
            None => Ok(self.fallback.clone()),
        }
    }
}
