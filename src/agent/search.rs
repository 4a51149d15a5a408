//! Retrieval tool over course content.

use super::tools::{parse_args, SourceSlot, Tool, ToolError};
use crate::index::{ContentIndex, SearchOutcome};
use crate::llm::ToolDefinition;
use crate::models::Citation;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub const SEARCH_TOOL_NAME: &str = "search_course_content";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    course_name: Option<String>,
    #[serde(default)]
    lesson_number: Option<u32>,
}

/// Searches course fragments and remembers what it cited.
pub struct CourseSearchTool {
    index: ContentIndex,
    sources: SourceSlot,
}

impl CourseSearchTool {
    pub fn new(index: ContentIndex) -> Self {
        Self {
            index,
            sources: SourceSlot::default(),
        }
    }

    /// Tool output for a search outcome. An error wins over any documents
    /// and leaves the held citations untouched.
    async fn render(
        &self,
        outcome: &SearchOutcome,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> String {
        if let Some(error) = &outcome.error {
            return error.clone();
        }
        if outcome.is_empty() {
            return no_content_message(course_name, lesson_number);
        }
        self.format_results(outcome).await
    }

    /// Render hits as `[Title - Lesson n]` blocks and record a citation
    /// for each.
    async fn format_results(&self, outcome: &SearchOutcome) -> String {
        let mut blocks = Vec::with_capacity(outcome.documents.len());
        let mut sources = Vec::with_capacity(outcome.documents.len());

        for (text, meta) in outcome.hits() {
            let course_title = meta.course_title.as_deref().unwrap_or("unknown");

            let (label, link) = match meta.lesson_number {
                Some(n) => (
                    format!("{} - Lesson {}", course_title, n),
                    self.index.get_lesson_link(course_title, n).await,
                ),
                None => (course_title.to_string(), None),
            };

            blocks.push(format!("[{}]\n{}", label, text));
            sources.push(Citation::new(label, link));
        }

        self.sources.replace(sources);
        blocks.join("\n\n")
    }
}

fn no_content_message(course_name: Option<&str>, lesson_number: Option<u32>) -> String {
    let mut message = String::from("No relevant content found");
    if let Some(name) = course_name {
        message.push_str(&format!(" in course '{}'", name));
    }
    if let Some(n) = lesson_number {
        message.push_str(&format!(" in lesson {}", n));
    }
    message.push('.');
    message
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: SEARCH_TOOL_NAME.to_string(),
            description: "Search course materials with smart course name matching and lesson filtering"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let args: SearchArgs = parse_args(SEARCH_TOOL_NAME, args)?;
        // Blank names count as no course filter.
        let course_name = args.course_name.as_deref().filter(|s| !s.trim().is_empty());

        let outcome = self
            .index
            .search(&args.query, course_name, args.lesson_number, None)
            .await;

        Ok(self.render(&outcome, course_name, args.lesson_number).await)
    }

    fn last_sources(&self) -> Vec<Citation> {
        self.sources.get()
    }

    fn reset_sources(&self) {
        self.sources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FragmentMetadata;
    use crate::test_support::{sample_index, FailingStore, KeywordEmbedder};
    use crate::vector_store::MemoryVectorStore;
    use std::sync::Arc;

    #[test]
    fn test_no_content_messages() {
        assert_eq!(no_content_message(None, None), "No relevant content found.");
        assert_eq!(
            no_content_message(Some("MCP"), None),
            "No relevant content found in course 'MCP'."
        );
        assert_eq!(
            no_content_message(None, Some(3)),
            "No relevant content found in lesson 3."
        );
        assert_eq!(
            no_content_message(Some("MCP"), Some(3)),
            "No relevant content found in course 'MCP' in lesson 3."
        );
    }

    #[tokio::test]
    async fn test_execute_formats_hits_and_citations() {
        let tool = CourseSearchTool::new(sample_index(5).await);
        let result = tool
            .execute(&json!({"query": "neural networks", "course_name": "machine learning"}))
            .await
            .unwrap();

        assert!(result.starts_with("[Introduction to Machine Learning - Lesson 2]\n"));
        assert!(result.contains("neural networks"));

        let sources = tool.last_sources();
        assert_eq!(sources.len(), result.split("\n\n").count());
        assert_eq!(sources[0].text, "Introduction to Machine Learning - Lesson 2");
        assert_eq!(sources[0].link.as_deref(), Some("https://example.com/ml/2"));
    }

    #[tokio::test]
    async fn test_format_without_lesson_or_title() {
        let tool = CourseSearchTool::new(sample_index(5).await);
        let outcome = SearchOutcome {
            documents: vec!["General content".to_string(), "Orphan".to_string()],
            metadata: vec![
                FragmentMetadata {
                    course_title: Some("General Course".to_string()),
                    ..FragmentMetadata::default()
                },
                FragmentMetadata {
                    lesson_number: Some(1),
                    ..FragmentMetadata::default()
                },
            ],
            distances: vec![0.1, 0.2],
            error: None,
        };

        let result = tool.format_results(&outcome).await;
        assert_eq!(result, "[General Course]\nGeneral content\n\n[unknown - Lesson 1]\nOrphan");

        let sources = tool.last_sources();
        assert_eq!(sources[0], Citation::new("General Course", None));
        assert_eq!(sources[1], Citation::new("unknown - Lesson 1", None));
    }

    #[tokio::test]
    async fn test_error_returned_verbatim() {
        let empty = crate::index::ContentIndex::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(KeywordEmbedder::default()),
            5,
        );
        let tool = CourseSearchTool::new(empty);
        let result = tool
            .execute(&json!({"query": "x", "course_name": "Nonexistent"}))
            .await
            .unwrap();
        assert_eq!(result, "No course found matching 'Nonexistent'");
        assert!(tool.last_sources().is_empty());

        let failing = crate::index::ContentIndex::new(
            Arc::new(FailingStore),
            Arc::new(KeywordEmbedder::default()),
            5,
        );
        let tool = CourseSearchTool::new(failing);
        let result = tool.execute(&json!({"query": "x"})).await.unwrap();
        assert!(result.starts_with("Search error: "));
    }

    #[tokio::test]
    async fn test_empty_results_with_filters() {
        let tool = CourseSearchTool::new(sample_index(0).await);
        let result = tool
            .execute(&json!({"query": "x", "course_name": "machine", "lesson_number": 1}))
            .await
            .unwrap();
        assert_eq!(result, "No relevant content found in course 'machine' in lesson 1.");
    }

    #[tokio::test]
    async fn test_new_search_replaces_citations() {
        let tool = CourseSearchTool::new(sample_index(1).await);
        tool.execute(&json!({"query": "neural networks"})).await.unwrap();
        tool.execute(&json!({"query": "screenshots computer"})).await.unwrap();

        let sources = tool.last_sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].text, "Building Towards Computer Use - Lesson 1");

        tool.reset_sources();
        assert!(tool.last_sources().is_empty());
    }

    #[tokio::test]
    async fn test_blank_course_name_means_no_filter() {
        let tool = CourseSearchTool::new(sample_index(5).await);
        let unscoped = tool
            .execute(&json!({"query": "screenshots computer"}))
            .await
            .unwrap();
        let blank = tool
            .execute(&json!({"query": "screenshots computer", "course_name": ""}))
            .await
            .unwrap();
        let spaces = tool
            .execute(&json!({"query": "screenshots computer", "course_name": "  "}))
            .await
            .unwrap();

        assert!(unscoped.starts_with("[Building Towards Computer Use - Lesson 1]"));
        assert_eq!(blank, unscoped);
        assert_eq!(spaces, unscoped);

        let tool = CourseSearchTool::new(sample_index(0).await);
        let result = tool
            .execute(&json!({"query": "x", "course_name": ""}))
            .await
            .unwrap();
        assert_eq!(result, "No relevant content found.");
    }

    #[tokio::test]
    async fn test_error_wins_over_documents() {
        let tool = CourseSearchTool::new(sample_index(5).await);
        tool.execute(&json!({"query": "neural networks"})).await.unwrap();
        let before = tool.last_sources();
        assert!(!before.is_empty());

        let outcome = SearchOutcome {
            documents: vec!["Stray content".to_string()],
            metadata: vec![FragmentMetadata {
                course_title: Some("General Course".to_string()),
                lesson_number: Some(1),
                ..FragmentMetadata::default()
            }],
            distances: vec![0.1],
            error: Some("Search error: index offline".to_string()),
        };

        let result = tool.render(&outcome, Some("General"), Some(1)).await;
        assert_eq!(result, "Search error: index offline");
        assert_eq!(tool.last_sources(), before);
    }

    #[test]
    fn test_definition_schema() {
        let index = crate::index::ContentIndex::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(KeywordEmbedder::default()),
            5,
        );
        let definition = CourseSearchTool::new(index).definition();
        assert_eq!(definition.name, "search_course_content");
        assert_eq!(definition.input_schema["required"], json!(["query"]));
        assert!(definition.input_schema["properties"]["lesson_number"].is_object());
    }
}
