//! Vector store abstraction for Syllabus.
//!
//! Holds two collections: a catalog of course records used to resolve fuzzy
//! course names, and the content fragments that are searched for answers.
//! Backends only store and rank vectors; turning text into vectors is the
//! caller's job.

mod filter;
mod memory;
mod sqlite;

pub use filter::Filter;
pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::config::Settings;
use crate::error::{Result, SyllabusError};
use crate::models::{ContentFragment, Course, Lesson};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Catalog row for one course.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Course title, the catalog key.
    pub title: String,
    pub instructor: Option<String>,
    pub course_link: Option<String>,
    /// Serialized lesson list (see [`StoredLesson`]).
    pub lessons_json: String,
    pub lesson_count: u32,
    /// Embedding of the course title.
    pub embedding: Vec<f32>,
}

/// Lesson as serialized into [`CatalogEntry::lessons_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLesson {
    pub lesson_number: u32,
    pub lesson_title: String,
    pub lesson_link: Option<String>,
}

impl From<&Lesson> for StoredLesson {
    fn from(lesson: &Lesson) -> Self {
        Self {
            lesson_number: lesson.lesson_number,
            lesson_title: lesson.title.clone(),
            lesson_link: lesson.lesson_link.clone(),
        }
    }
}

impl From<StoredLesson> for Lesson {
    fn from(stored: StoredLesson) -> Self {
        Self {
            lesson_number: stored.lesson_number,
            title: stored.lesson_title,
            lesson_link: stored.lesson_link,
        }
    }
}

impl CatalogEntry {
    /// Build a catalog row from a course and the embedding of its title.
    pub fn from_course(course: &Course, embedding: Vec<f32>) -> Result<Self> {
        let lessons: Vec<StoredLesson> = course.lessons.iter().map(StoredLesson::from).collect();
        Ok(Self {
            title: course.title.clone(),
            instructor: course.instructor.clone(),
            course_link: course.course_link.clone(),
            lessons_json: serde_json::to_string(&lessons)?,
            lesson_count: lessons.len() as u32,
            embedding,
        })
    }

    /// Decode the stored lesson list.
    pub fn lessons(&self) -> Result<Vec<StoredLesson>> {
        Ok(serde_json::from_str(&self.lessons_json)?)
    }

    /// Rebuild the course record.
    pub fn to_course(&self) -> Result<Course> {
        Ok(Course {
            title: self.title.clone(),
            course_link: self.course_link.clone(),
            instructor: self.instructor.clone(),
            lessons: self.lessons()?.into_iter().map(Lesson::from).collect(),
        })
    }
}

/// Content row for one fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentRecord {
    /// Deterministic key, see [`ContentFragment::id`].
    pub id: String,
    pub content: String,
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub chunk_index: u32,
    pub embedding: Vec<f32>,
}

impl FragmentRecord {
    pub fn from_fragment(fragment: &ContentFragment, embedding: Vec<f32>) -> Self {
        Self {
            id: fragment.id(),
            content: fragment.content.clone(),
            course_title: fragment.course_title.clone(),
            lesson_number: fragment.lesson_number,
            chunk_index: fragment.chunk_index,
            embedding,
        }
    }
}

/// A fragment ranked against a query.
#[derive(Debug, Clone)]
pub struct RankedFragment {
    pub record: FragmentRecord,
    /// Cosine distance to the query (lower is closer).
    pub distance: f32,
}

/// A catalog entry ranked against a query.
#[derive(Debug, Clone)]
pub struct RankedCourse {
    pub title: String,
    pub distance: f32,
}

/// Trait for course store implementations.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Insert or replace a catalog entry, keyed by title.
    async fn upsert_course(&self, entry: &CatalogEntry) -> Result<()>;

    /// Insert or replace fragments, keyed by id.
    async fn upsert_fragments(&self, records: &[FragmentRecord]) -> Result<usize>;

    /// Nearest catalog entries to the query embedding.
    async fn nearest_courses(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<RankedCourse>>;

    /// Nearest fragments to the query embedding that satisfy the filter.
    async fn nearest_fragments(
        &self,
        query_embedding: &[f32],
        limit: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<RankedFragment>>;

    /// Fetch a catalog entry by exact title.
    async fn get_course(&self, title: &str) -> Result<Option<CatalogEntry>>;

    /// All catalog titles, in insertion order.
    async fn course_titles(&self) -> Result<Vec<String>>;

    /// Number of catalog entries.
    async fn course_count(&self) -> Result<usize>;

    /// Number of stored fragments.
    async fn fragment_count(&self) -> Result<usize>;

    /// Remove every catalog entry and fragment.
    async fn clear(&self) -> Result<()>;
}

/// Open the store backend named by `index.provider`.
pub fn create_store(settings: &Settings) -> Result<Arc<dyn CourseStore>> {
    match settings.index.provider.as_str() {
        "sqlite" => Ok(Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?)),
        "memory" => Ok(Arc::new(MemoryVectorStore::new())),
        other => Err(SyllabusError::Config(format!(
            "Unknown index provider: {}",
            other
        ))),
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance: `1 - similarity`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Sort candidates by ascending distance and keep the first `limit`.
///
/// The sort is stable so equally distant items keep insertion order.
pub(crate) fn rank<T>(mut items: Vec<(T, f32)>, limit: usize) -> Vec<(T, f32)> {
    items.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    items.truncate(limit);
    items
}
