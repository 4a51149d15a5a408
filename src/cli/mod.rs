//! CLI module for Syllabus.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Syllabus - ask questions about your course materials
///
/// Indexes course bundles into a local semantic store and answers questions
/// with a tool-using LLM agent that searches them and cites its sources.
#[derive(Parser, Debug)]
#[command(name = "syllabus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SYLLABUS_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question about the indexed courses
    ///
    /// Each call stands alone. Use `chat` or the HTTP API for follow-ups.
    Ask {
        /// The question to ask
        question: String,
    },

    /// Start an interactive chat session
    Chat,

    /// Index every course bundle in a folder
    Ingest {
        /// Folder containing course bundles (*.json)
        folder: String,

        /// Drop all indexed courses before ingesting
        #[arg(long)]
        clear: bool,
    },

    /// List indexed courses
    Courses,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
