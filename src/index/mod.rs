//! Content index: course catalog plus searchable fragments.
//!
//! Wraps a [`CourseStore`] with an [`Embedder`] so callers deal in text,
//! and turns backend failures into the messages the retrieval tool shows.

mod outcome;
mod resolver;

pub use crate::vector_store::Filter;
pub use outcome::{FragmentMetadata, SearchOutcome};
pub use resolver::CourseResolver;

use crate::config::Settings;
use crate::embedding::{create_embedder, Embedder};
use crate::error::Result;
use crate::models::{ContentFragment, Course};
use crate::vector_store::{
    create_store, CatalogEntry, CourseStore, FragmentRecord, RankedFragment,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Semantic index over course material.
#[derive(Clone)]
pub struct ContentIndex {
    store: Arc<dyn CourseStore>,
    embedder: Arc<dyn Embedder>,
    resolver: CourseResolver,
    max_results: usize,
}

impl ContentIndex {
    pub fn new(
        store: Arc<dyn CourseStore>,
        embedder: Arc<dyn Embedder>,
        max_results: usize,
    ) -> Self {
        if max_results == 0 {
            warn!("max_results is 0: searches without an explicit limit will return nothing");
        }
        let resolver = CourseResolver::new(store.clone(), embedder.clone());
        Self {
            store,
            embedder,
            resolver,
            max_results,
        }
    }

    /// Open the configured store and embedder.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            create_store(settings)?,
            create_embedder(&settings.embedding)?,
            settings.index.max_results,
        ))
    }

    /// Default number of fragments returned per search.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Search fragments, optionally scoped to a course and/or lesson.
    ///
    /// Never fails: an unresolvable course name or a backend fault comes
    /// back as [`SearchOutcome::error`].
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
        limit: Option<usize>,
    ) -> SearchOutcome {
        let course_title = match course_name {
            Some(name) => match self.resolver.resolve(name).await {
                Some(title) => Some(title),
                None => {
                    return SearchOutcome::failed(format!("No course found matching '{}'", name))
                }
            },
            None => None,
        };

        let filter = Filter::build(course_title.as_deref(), lesson_number);
        let limit = limit.unwrap_or(self.max_results);

        match self.nearest(query, limit, filter.as_ref()).await {
            Ok(ranked) => {
                debug!("Search returned {} fragments", ranked.len());
                SearchOutcome::from(ranked)
            }
            Err(e) => SearchOutcome::failed(format!("Search error: {}", e)),
        }
    }

    async fn nearest(
        &self,
        query: &str,
        limit: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<RankedFragment>> {
        let embedding = self.embedder.embed(query).await?;
        self.store.nearest_fragments(&embedding, limit, filter).await
    }

    /// Add or replace a course in the catalog.
    #[instrument(skip(self, course), fields(title = %course.title))]
    pub async fn add_course_metadata(&self, course: &Course) -> Result<()> {
        let embedding = self.embedder.embed(&course.title).await?;
        let entry = CatalogEntry::from_course(course, embedding)?;
        self.store.upsert_course(&entry).await?;
        debug!("Catalogued course with {} lessons", entry.lesson_count);
        Ok(())
    }

    /// Add or replace content fragments. Empty input is a no-op.
    #[instrument(skip(self, fragments), fields(count = fragments.len()))]
    pub async fn add_course_content(&self, fragments: &[ContentFragment]) -> Result<usize> {
        if fragments.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = fragments.iter().map(|f| f.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let records: Vec<FragmentRecord> = fragments
            .iter()
            .zip(embeddings)
            .map(|(fragment, embedding)| FragmentRecord::from_fragment(fragment, embedding))
            .collect();

        self.store.upsert_fragments(&records).await
    }

    /// Link for a lesson of a course, looked up by exact title.
    pub async fn get_lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        let entry = match self.store.get_course(course_title).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!("Failed to load course '{}': {}", course_title, e);
                return None;
            }
        };

        match entry.lessons() {
            Ok(lessons) => lessons
                .into_iter()
                .find(|l| l.lesson_number == lesson_number)
                .and_then(|l| l.lesson_link),
            Err(e) => {
                warn!("Corrupt lesson list for '{}': {}", course_title, e);
                None
            }
        }
    }

    /// Full course record for a (possibly partial) course name.
    pub async fn get_course_outline(&self, course_name: &str) -> Result<Option<Course>> {
        let Some(title) = self.resolver.resolve(course_name).await else {
            return Ok(None);
        };
        match self.store.get_course(&title).await? {
            Some(entry) => Ok(Some(entry.to_course()?)),
            None => Ok(None),
        }
    }

    /// Titles of every catalogued course.
    pub async fn get_existing_course_titles(&self) -> Vec<String> {
        self.store.course_titles().await.unwrap_or_else(|e| {
            warn!("Failed to list course titles: {}", e);
            Vec::new()
        })
    }

    /// Number of catalogued courses.
    pub async fn get_course_count(&self) -> usize {
        self.store.course_count().await.unwrap_or_else(|e| {
            warn!("Failed to count courses: {}", e);
            0
        })
    }

    /// Number of stored fragments.
    pub async fn get_fragment_count(&self) -> usize {
        self.store.fragment_count().await.unwrap_or_else(|e| {
            warn!("Failed to count fragments: {}", e);
            0
        })
    }

    /// Drop every course and fragment.
    pub async fn clear_all_data(&self) -> Result<()> {
        self.store.clear().await?;
        info!("Cleared content index");
        Ok(())
    }
}
