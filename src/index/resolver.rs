//! Resolves a partial or fuzzy course name to a catalog title.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::CourseStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// One-nearest-neighbour lookup against the course catalog.
///
/// The closest catalog title is always accepted, however distant: the only
/// way to get no match is an empty catalog (or a failing backend).
#[derive(Clone)]
pub struct CourseResolver {
    store: Arc<dyn CourseStore>,
    embedder: Arc<dyn Embedder>,
}

impl CourseResolver {
    pub fn new(store: Arc<dyn CourseStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Best matching catalog title for `name`, if any.
    pub async fn resolve(&self, name: &str) -> Option<String> {
        match self.nearest(name).await {
            Ok(title) => title,
            Err(e) => {
                warn!("Course name resolution failed for '{}': {}", name, e);
                None
            }
        }
    }

    async fn nearest(&self, name: &str) -> Result<Option<String>> {
        let embedding = self.embedder.embed(name).await?;
        let candidate = self.store.nearest_courses(&embedding, 1).await?.into_iter().next();

        if let Some(c) = &candidate {
            debug!("Resolved '{}' to '{}' (distance {:.3})", name, c.title, c.distance);
        }
        Ok(candidate.map(|c| c.title))
    }
}
