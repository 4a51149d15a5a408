//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagSystem;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let rag = RagSystem::new(&settings)?;

    let spinner = Output::spinner("Searching course materials...");
    match rag.query(question, None).await {
        Ok(answer) => {
            spinner.finish_and_clear();
            println!("\n{}\n", answer.answer);
            Output::sources(&answer.sources);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
