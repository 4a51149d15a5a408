//! Pre-flight checks before expensive operations.
//!
//! Validates that the API keys the configured providers need are present
//! before starting work that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, SyllabusError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Answering questions needs the chat and embedding keys.
    Query,
    /// Ingestion needs the embedding key.
    Ingest,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    let embedding_key = embedding_key_var(&settings.embedding.provider);

    match operation {
        Operation::Query => {
            check_api_key(settings.llm.provider.api_key_var())?;
            if let Some(var) = embedding_key {
                check_api_key(var)?;
            }
        }
        Operation::Ingest => {
            if let Some(var) = embedding_key {
                check_api_key(var)?;
            }
        }
    }
    Ok(())
}

fn embedding_key_var(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

fn check_api_key(var: &str) -> Result<()> {
    validate_key(var, std::env::var(var).ok())
}

fn validate_key(var: &str, value: Option<String>) -> Result<()> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(()),
        Some(_) => Err(SyllabusError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            var, var
        ))),
        None => Err(SyllabusError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}
