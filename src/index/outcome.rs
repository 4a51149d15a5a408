//! Search results as seen by the retrieval tool.

use crate::vector_store::RankedFragment;

/// Metadata attached to a search hit.
///
/// Fields are optional because hits are rendered defensively: a missing
/// course title is shown as `unknown` rather than treated as a fault.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentMetadata {
    pub course_title: Option<String>,
    pub lesson_number: Option<u32>,
    pub chunk_index: Option<u32>,
}

/// Outcome of a content search.
///
/// Emptiness and failure are independent: an outcome can be empty without
/// an error (nothing matched) or carry an error. Callers check
/// [`error`](Self::error) first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Fragment texts, closest first.
    pub documents: Vec<String>,
    /// Metadata, parallel to `documents`.
    pub metadata: Vec<FragmentMetadata>,
    /// Cosine distances, parallel to `documents`.
    pub distances: Vec<f32>,
    /// Terminal error message, if the search failed.
    pub error: Option<String>,
}

impl SearchOutcome {
    /// An empty outcome carrying an error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Whether no documents were returned.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate `(text, metadata)` pairs in rank order.
    pub fn hits(&self) -> impl Iterator<Item = (&str, &FragmentMetadata)> {
        self.documents
            .iter()
            .map(String::as_str)
            .zip(self.metadata.iter())
    }
}

impl From<Vec<RankedFragment>> for SearchOutcome {
    fn from(ranked: Vec<RankedFragment>) -> Self {
        let mut outcome = SearchOutcome::default();
        for hit in ranked {
            outcome.distances.push(hit.distance);
            outcome.metadata.push(FragmentMetadata {
                course_title: Some(hit.record.course_title),
                lesson_number: hit.record.lesson_number,
                chunk_index: Some(hit.record.chunk_index),
            });
            outcome.documents.push(hit.record.content);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::FragmentRecord;

    #[test]
    fn test_failed_outcome_is_empty() {
        let outcome = SearchOutcome::failed("Test error message");
        assert!(outcome.is_empty());
        assert_eq!(outcome.error.as_deref(), Some("Test error message"));
    }

    #[test]
    fn test_from_ranked() {
        let ranked = vec![RankedFragment {
            record: FragmentRecord {
                id: "Course_0".to_string(),
                content: "Doc 1".to_string(),
                course_title: "Course".to_string(),
                lesson_number: Some(2),
                chunk_index: 0,
                embedding: vec![1.0],
            },
            distance: 0.1,
        }];

        let outcome = SearchOutcome::from(ranked);
        assert!(!outcome.is_empty());
        assert!(outcome.error.is_none());
        assert_eq!(outcome.documents, vec!["Doc 1"]);
        assert_eq!(outcome.distances, vec![0.1]);
        assert_eq!(outcome.metadata[0].lesson_number, Some(2));

        let (text, meta) = outcome.hits().next().unwrap();
        assert_eq!(text, "Doc 1");
        assert_eq!(meta.course_title.as_deref(), Some("Course"));
    }

    #[test]
    fn test_default_is_empty_without_error() {
        let outcome = SearchOutcome::default();
        assert!(outcome.is_empty());
        assert!(outcome.error.is_none());
    }
}
