//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::rag::RagSystem;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
///
/// Each line is a query in one session, so follow-up questions see the
/// last few exchanges.
pub async fn run_chat(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let rag = RagSystem::new(&settings)?;
    let mut session = rag.sessions().create_session();

    println!("\n{}", style("Syllabus Chat").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            rag.sessions().clear_session(&session);
            session = rag.sessions().create_session();
            Output::info("Conversation history cleared.");
            continue;
        }

        match rag.query(input, Some(&session)).await {
            Ok(answer) => {
                println!("\n{} {}", style("Syllabus:").cyan().bold(), answer.answer);
                Output::sources(&answer.sources);
                println!();
            }
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}
