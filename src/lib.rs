//! Syllabus - question answering over course materials
//!
//! Indexes course bundles into a semantic store and answers questions with
//! a tool-using LLM agent that searches the material and cites its sources.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt text
//! - `models` - Course, lesson, fragment and citation records
//! - `vector_store` - Catalog and fragment storage (SQLite or in-memory)
//! - `embedding` - Embedding generation
//! - `index` - Semantic search with course name resolution
//! - `ingest` - Loading course files into the index
//! - `llm` - Chat model abstraction (Anthropic, OpenAI)
//! - `agent` - Tools and the bounded tool-calling loop
//! - `rag` - Query entry point and session history
//! - `cli` - Command-line interface and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use syllabus::config::Settings;
//! use syllabus::rag::RagSystem;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let rag = RagSystem::new(&settings)?;
//!
//!     let answer = rag.query("What does lesson 2 cover?", None).await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod openai;
pub mod rag;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, SyllabusError};
