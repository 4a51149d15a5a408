//! Configuration module for Syllabus.
//!
//! Handles loading application settings and holds the fixed prompt text.

pub mod prompts;
mod settings;

pub use settings::{
    EmbeddingSettings, GeneralSettings, IndexSettings, LlmProvider, LlmSettings,
    ServerSettings, SessionSettings, Settings,
};
