//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::index::ContentIndex;
use crate::ingest::{add_course_folder, JsonCourseLoader};
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(folder: &str, clear: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let folder = Settings::expand_path(folder);
    if !folder.is_dir() {
        Output::warning(&format!("Folder not found: {}", folder.display()));
        return Ok(());
    }

    let index = ContentIndex::from_settings(&settings)?;

    let spinner = Output::spinner(&format!("Indexing {}...", folder.display()));
    let result = add_course_folder(&index, &JsonCourseLoader, &folder, clear).await;
    spinner.finish_and_clear();

    let (courses, fragments) = result?;
    if courses == 0 {
        Output::info("No new courses found.");
    } else {
        Output::success(&format!(
            "Added {} course(s) with {} fragment(s)",
            courses, fragments
        ));
    }
    Output::kv("Total courses", &index.get_course_count().await.to_string());

    Ok(())
}
