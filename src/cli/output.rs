//! CLI output formatting utilities.

use crate::models::Citation;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print the sources an answer drew on.
    pub fn sources(sources: &[Citation]) {
        if sources.is_empty() {
            return;
        }
        Output::header("Sources");
        for source in sources {
            println!("  {} {}", style("*").cyan(), format_citation(source));
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(template);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// `Title - Lesson n (link)`, or just the text when there is no link.
fn format_citation(citation: &Citation) -> String {
    match &citation.link {
        Some(link) => format!("{} ({})", citation.text, link),
        None => citation.text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_citation() {
        assert_eq!(
            format_citation(&Citation::new("Course A - Lesson 1", Some("http://a/1".to_string()))),
            "Course A - Lesson 1 (http://a/1)"
        );
        assert_eq!(format_citation(&Citation::new("Course A", None)), "Course A");
    }
}
