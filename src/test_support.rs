//! Deterministic fakes shared by unit tests.

use crate::embedding::Embedder;
use crate::error::{Result, SyllabusError};
use crate::index::ContentIndex;
use crate::llm::{ChatModel, ContentBlock, ModelRequest, ModelResponse, StopReason};
use crate::models::{ContentFragment, Course, Lesson};
use crate::vector_store::{
    CatalogEntry, CourseStore, Filter, FragmentRecord, MemoryVectorStore, RankedCourse,
    RankedFragment,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const DIMENSIONS: usize = 1024;

/// Bag-of-words embedder: each lowercase word hashes to one dimension.
#[derive(Debug, Default)]
pub struct KeywordEmbedder;

fn bucket(word: &str) -> usize {
    // FNV-1a
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % DIMENSIONS as u64) as usize
}

impl KeywordEmbedder {
    fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[bucket(&word.to_lowercase())] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIMENSIONS
    }
}

/// Store whose every operation fails.
pub struct FailingStore;

fn unavailable<T>() -> Result<T> {
    Err(SyllabusError::VectorStore("store unavailable".to_string()))
}

#[async_trait]
impl CourseStore for FailingStore {
    async fn upsert_course(&self, _entry: &CatalogEntry) -> Result<()> {
        unavailable()
    }

    async fn upsert_fragments(&self, _records: &[FragmentRecord]) -> Result<usize> {
        unavailable()
    }

    async fn nearest_courses(&self, _query: &[f32], _limit: usize) -> Result<Vec<RankedCourse>> {
        unavailable()
    }

    async fn nearest_fragments(
        &self,
        _query: &[f32],
        _limit: usize,
        _filter: Option<&Filter>,
    ) -> Result<Vec<RankedFragment>> {
        unavailable()
    }

    async fn get_course(&self, _title: &str) -> Result<Option<CatalogEntry>> {
        unavailable()
    }

    async fn course_titles(&self) -> Result<Vec<String>> {
        unavailable()
    }

    async fn course_count(&self) -> Result<usize> {
        unavailable()
    }

    async fn fragment_count(&self) -> Result<usize> {
        unavailable()
    }

    async fn clear(&self) -> Result<()> {
        unavailable()
    }
}

/// Two courses with lessons, links and a handful of fragments.
pub fn sample_courses() -> Vec<(Course, Vec<ContentFragment>)> {
    let ml = Course {
        title: "Introduction to Machine Learning".to_string(),
        course_link: Some("https://example.com/ml".to_string()),
        instructor: Some("Ada Lovelace".to_string()),
        lessons: vec![
            Lesson::new(1, "What is ML").with_link("https://example.com/ml/1"),
            Lesson::new(2, "Neural networks").with_link("https://example.com/ml/2"),
        ],
    };
    let cu = Course {
        title: "Building Towards Computer Use".to_string(),
        course_link: Some("https://example.com/cu".to_string()),
        instructor: None,
        lessons: vec![Lesson::new(1, "Overview").with_link("https://example.com/cu/1")],
    };

    let fragment = |course: &Course, lesson: u32, index: u32, text: &str| ContentFragment {
        content: text.to_string(),
        course_title: course.title.clone(),
        lesson_number: Some(lesson),
        chunk_index: index,
    };

    let ml_fragments = vec![
        fragment(&ml, 1, 0, "Lesson 1 content: machine learning finds patterns in data"),
        fragment(&ml, 2, 1, "Lesson 2 content: neural networks stack layers of weights"),
        fragment(&ml, 2, 2, "Lesson 2 content: training neural networks uses gradient descent"),
    ];
    let cu_fragments = vec![fragment(
        &cu,
        1,
        0,
        "Lesson 1 content: the model operates a computer through screenshots",
    )];

    vec![(ml, ml_fragments), (cu, cu_fragments)]
}

/// Memory-backed index loaded with [`sample_courses`].
pub async fn sample_index(max_results: usize) -> ContentIndex {
    let index = ContentIndex::new(
        Arc::new(MemoryVectorStore::new()),
        Arc::new(KeywordEmbedder),
        max_results,
    );
    for (course, fragments) in sample_courses() {
        index.add_course_metadata(&course).await.unwrap();
        index.add_course_content(&fragments).await.unwrap();
    }
    index
}

/// A direct text answer.
pub fn answer(text: &str) -> ModelResponse {
    ModelResponse {
        content: vec![ContentBlock::text(text)],
        stop_reason: StopReason::EndTurn,
    }
}

/// A single tool-use request.
pub fn tool_use(id: &str, name: &str, input: Value) -> ModelResponse {
    tool_uses(vec![(id, name, input)])
}

/// Several tool-use requests in one turn, preceded by a text block.
pub fn tool_uses(calls: Vec<(&str, &str, Value)>) -> ModelResponse {
    let mut content = vec![ContentBlock::text("Let me search.")];
    content.extend(calls.into_iter().map(|(id, name, input)| ContentBlock::ToolUse {
        id: id.to_string(),
        name: name.to_string(),
        input,
    }));
    ModelResponse {
        content,
        stop_reason: StopReason::ToolUse,
    }
}

/// Chat model replaying a fixed script and recording every request.
///
/// Errors once the script runs out, unless built with [`repeating`](Self::repeating).
#[derive(Default)]
pub struct ScriptedModel {
    script: Mutex<VecDeque<ModelResponse>>,
    repeat: Option<ModelResponse>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new(script: Vec<ModelResponse>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn repeating(response: ModelResponse) -> Self {
        Self {
            repeat: Some(response),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn create(&self, request: &ModelRequest) -> Result<ModelResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.repeat.clone())
            .ok_or_else(|| SyllabusError::Llm("script exhausted".to_string()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
