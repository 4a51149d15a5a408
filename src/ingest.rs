//! Course loading.
//!
//! A [`CourseLoader`] turns a file into a course record plus its content
//! fragments. Parsing free-form documents and chunking them is left to
//! whatever produces the files; the shipped [`JsonCourseLoader`] reads
//! pre-chunked JSON bundles:
//!
//! ```json
//! {
//!   "title": "Building Towards Computer Use",
//!   "course_link": "https://example.com/cu",
//!   "instructor": "Ada Lovelace",
//!   "lessons": [
//!     {"lesson_number": 0, "title": "Introduction",
//!      "lesson_link": "https://example.com/cu/0",
//!      "chunks": ["first chunk", "second chunk"]}
//!   ]
//! }
//! ```

use crate::error::{Result, SyllabusError};
use crate::index::ContentIndex;
use crate::models::{ContentFragment, Course, Lesson};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Trait for course file loaders.
pub trait CourseLoader: Send + Sync {
    /// Whether this loader handles the file.
    fn supports(&self, path: &Path) -> bool;

    /// Parse a file into a course and its fragments.
    fn load(&self, path: &Path) -> Result<(Course, Vec<ContentFragment>)>;
}

#[derive(Debug, Deserialize)]
struct CourseBundle {
    title: String,
    #[serde(default)]
    course_link: Option<String>,
    #[serde(default)]
    instructor: Option<String>,
    #[serde(default)]
    lessons: Vec<LessonBundle>,
}

#[derive(Debug, Deserialize)]
struct LessonBundle {
    lesson_number: u32,
    title: String,
    #[serde(default)]
    lesson_link: Option<String>,
    #[serde(default)]
    chunks: Vec<String>,
}

/// Loader for `*.json` course bundles.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCourseLoader;

impl JsonCourseLoader {
    /// Parse bundle text.
    ///
    /// Chunk indices run across the whole course in lesson order. Blank
    /// chunks are dropped.
    pub fn parse(&self, text: &str) -> Result<(Course, Vec<ContentFragment>)> {
        let bundle: CourseBundle = serde_json::from_str(text)?;

        let title = bundle.title.trim().to_string();
        if title.is_empty() {
            return Err(SyllabusError::Ingest("course title is empty".to_string()));
        }

        let mut seen = HashSet::new();
        let mut lessons = Vec::with_capacity(bundle.lessons.len());
        let mut fragments = Vec::new();

        for lesson in bundle.lessons {
            if !seen.insert(lesson.lesson_number) {
                return Err(SyllabusError::Ingest(format!(
                    "duplicate lesson number {} in '{}'",
                    lesson.lesson_number, title
                )));
            }

            for chunk in lesson.chunks.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
                fragments.push(ContentFragment {
                    content: chunk.to_string(),
                    course_title: title.clone(),
                    lesson_number: Some(lesson.lesson_number),
                    chunk_index: fragments.len() as u32,
                });
            }

            lessons.push(Lesson {
                lesson_number: lesson.lesson_number,
                title: lesson.title,
                lesson_link: lesson.lesson_link,
            });
        }

        let course = Course {
            title,
            course_link: bundle.course_link,
            instructor: bundle.instructor,
            lessons,
        };
        Ok((course, fragments))
    }
}

impl CourseLoader for JsonCourseLoader {
    fn supports(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"))
    }

    fn load(&self, path: &Path) -> Result<(Course, Vec<ContentFragment>)> {
        let text = std::fs::read_to_string(path)?;
        self.parse(&text)
            .map_err(|e| SyllabusError::Ingest(format!("{}: {}", path.display(), e)))
    }
}

/// Load one course file into the index.
///
/// A file the loader rejects is logged and reported as `(None, 0)` without
/// touching the index.
#[instrument(skip(index, loader))]
pub async fn add_course_document(
    index: &ContentIndex,
    loader: &dyn CourseLoader,
    path: &Path,
) -> Result<(Option<Course>, usize)> {
    let (course, fragments) = match loader.load(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            return Ok((None, 0));
        }
    };

    index.add_course_metadata(&course).await?;
    let count = index.add_course_content(&fragments).await?;
    info!("Indexed '{}' with {} fragments", course.title, count);
    Ok((Some(course), count))
}

/// Load every supported file in a folder, skipping courses already in the
/// catalog. Returns `(courses_added, fragments_added)`; a missing folder
/// adds nothing.
#[instrument(skip(index, loader))]
pub async fn add_course_folder(
    index: &ContentIndex,
    loader: &dyn CourseLoader,
    folder: &Path,
    clear_existing: bool,
) -> Result<(usize, usize)> {
    if !folder.is_dir() {
        warn!("Folder {} does not exist", folder.display());
        return Ok((0, 0));
    }

    if clear_existing {
        info!("Clearing existing data for fresh rebuild");
        index.clear_all_data().await?;
    }

    let mut existing: HashSet<String> =
        index.get_existing_course_titles().await.into_iter().collect();

    let mut paths: Vec<_> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| loader.supports(p))
        .collect();
    paths.sort();

    let mut courses = 0;
    let mut fragments = 0;

    for path in paths {
        let (course, loaded) = match loader.load(&path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        if existing.contains(&course.title) {
            info!("Course already exists: {} - skipping", course.title);
            continue;
        }

        index.add_course_metadata(&course).await?;
        fragments += index.add_course_content(&loaded).await?;
        courses += 1;
        info!("Added new course: {} ({} fragments)", course.title, loaded.len());
        existing.insert(course.title);
    }

    Ok((courses, fragments))
}
