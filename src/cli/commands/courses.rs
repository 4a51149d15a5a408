//! Courses command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::index::ContentIndex;
use anyhow::Result;

/// Run the courses command.
pub async fn run_courses(settings: Settings) -> Result<()> {
    let index = ContentIndex::from_settings(&settings)?;
    let titles = index.get_existing_course_titles().await;

    if titles.is_empty() {
        Output::info("No courses indexed yet. Use 'syllabus ingest <folder>' to add some.");
        return Ok(());
    }

    Output::header(&format!("Indexed Courses ({})", titles.len()));
    println!();
    for title in &titles {
        Output::list_item(title);
    }

    println!();
    Output::kv("Total courses", &titles.len().to_string());
    Output::kv("Total fragments", &index.get_fragment_count().await.to_string());
    Output::kv("Results per search", &index.max_results().to_string());

    Ok(())
}
