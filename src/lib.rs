//! # MediBot: retrieval-augmented chat over a persisted index
//!
//! Answers questions from passages stored in a local SQLite vector index,
//! using Gemini for both query embeddings and answer generation.
//!
//! ## Architecture
//!
//! - **[`config`]**: Configuration loading and validation
//! - **[`db`]**: SQLite + sqlite-vec passage store (collections, passages, search)
//! - **[`embedder`]**: Text embedding (Gemini remote, deterministic mock)
//! - **[`llm`]**: Chat-completion models (Gemini remote, scripted mock)
//! - **[`gemini`]**: Blocking HTTP client for the Generative Language API
//! - **[`index`]**: Read-only vector index handle and its construct-once cell
//! - **[`chain`]**: Retrieve → format → render → generate pipeline
//! - **[`session`]**: Transcript and per-turn driver
//! - **[`ui`]**: Terminal chat loop
//! - **[`app`]**: Process-wide state shared by every turn

pub mod app;
pub mod chain;
pub mod config;
pub mod db;
pub mod embedder;
pub mod gemini;
pub mod index;
pub mod llm;
pub mod session;
pub mod ui;
