//! Process-wide application state: configuration, the index cell and the
//! remote collaborators.
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::chain::{ChainError, build_chain};
use crate::config::Config;
use crate::embedder::Embedder;
use crate::embedder::gemini::GeminiEmbedder;
use crate::gemini::GeminiClient;
use crate::index::{IndexCell, IndexError, VectorIndex};
use crate::llm::ChatModel;
use crate::llm::gemini::GeminiChat;

pub struct App {
    config: Config,
    index: IndexCell,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn ChatModel>,
}

impl App {
    #[must_use]
    pub fn new(config: Config, embedder: Arc<dyn Embedder>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            config,
            index: IndexCell::new(),
            embedder,
            model,
        }
    }

    /// Wire the Gemini embedder and chat model from `config` and `$GOOGLE_API_KEY`.
    pub fn with_gemini(config: Config) -> Result<Self> {
        let client = GeminiClient::from_env(&config.api_base_url, config.request_timeout())
            .context("failed to set up Gemini client")?;

        let embedder = GeminiEmbedder::new(
            client.clone(),
            &config.embedding.model,
            config.embedding.dimensions,
        );
        let model = GeminiChat::new(client, &config.chat.model, config.generation());

        Ok(Self::new(config, Arc::new(embedder), Arc::new(model)))
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared index handle, opened on first access.
    pub fn index(&self) -> Result<Arc<VectorIndex>, IndexError> {
        self.index.get_or_try_init(|| {
            VectorIndex::open(
                &self.config.persist_path(),
                &self.config.collection_name,
                Arc::clone(&self.embedder),
            )
        })
    }

    /// Answer one question with a freshly built chain.
    pub fn answer(&self, question: &str) -> Result<String, ChainError> {
        let chain = build_chain(self.index()?, Arc::clone(&self.model), self.config.search_top_k);
        chain.invoke(question)
    }
}
