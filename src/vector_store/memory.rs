//! In-memory course store implementation.
//!
//! Useful for testing and small datasets.

use super::{
    cosine_distance, rank, CatalogEntry, CourseStore, Filter, FragmentRecord, RankedCourse,
    RankedFragment,
};
use crate::error::{Result, SyllabusError};
use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Collections {
    courses: Vec<CatalogEntry>,
    fragments: Vec<FragmentRecord>,
}

/// In-memory course store.
pub struct MemoryVectorStore {
    inner: RwLock<Collections>,
}

impl MemoryVectorStore {
    /// Create a new in-memory course store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.inner
            .read()
            .map_err(|e| SyllabusError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.inner
            .write()
            .map_err(|e| SyllabusError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CourseStore for MemoryVectorStore {
    async fn upsert_course(&self, entry: &CatalogEntry) -> Result<()> {
        let mut store = self.write()?;
        match store.courses.iter_mut().find(|c| c.title == entry.title) {
            Some(existing) => *existing = entry.clone(),
            None => store.courses.push(entry.clone()),
        }
        Ok(())
    }

    async fn upsert_fragments(&self, records: &[FragmentRecord]) -> Result<usize> {
        let mut store = self.write()?;
        for record in records {
            match store.fragments.iter_mut().find(|f| f.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => store.fragments.push(record.clone()),
            }
        }
        Ok(records.len())
    }

    async fn nearest_courses(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<RankedCourse>> {
        let store = self.read()?;
        let scored = store
            .courses
            .iter()
            .map(|c| (c.title.clone(), cosine_distance(query_embedding, &c.embedding)))
            .collect();

        Ok(rank(scored, limit)
            .into_iter()
            .map(|(title, distance)| RankedCourse { title, distance })
            .collect())
    }

    async fn nearest_fragments(
        &self,
        query_embedding: &[f32],
        limit: usize,
        filter: Option<&Filter>,
    ) -> Result<Vec<RankedFragment>> {
        let store = self.read()?;
        let scored = store
            .fragments
            .iter()
            .filter(|f| filter.map_or(true, |flt| flt.matches(f)))
            .map(|f| (f.clone(), cosine_distance(query_embedding, &f.embedding)))
            .collect();

        Ok(rank(scored, limit)
            .into_iter()
            .map(|(record, distance)| RankedFragment { record, distance })
            .collect())
    }

    async fn get_course(&self, title: &str) -> Result<Option<CatalogEntry>> {
        let store = self.read()?;
        Ok(store.courses.iter().find(|c| c.title == title).cloned())
    }

    async fn course_titles(&self) -> Result<Vec<String>> {
        let store = self.read()?;
        Ok(store.courses.iter().map(|c| c.title.clone()).collect())
    }

    async fn course_count(&self) -> Result<usize> {
        Ok(self.read()?.courses.len())
    }

    async fn fragment_count(&self) -> Result<usize> {
        Ok(self.read()?.fragments.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut store = self.write()?;
        store.courses.clear();
        store.fragments.clear();
        Ok(())
    }
}
