//! End-to-end query flow over an in-memory index.

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use syllabus::config::Settings;
use syllabus::embedding::Embedder;
use syllabus::index::ContentIndex;
use syllabus::llm::{ChatModel, ContentBlock, ModelRequest, ModelResponse, StopReason};
use syllabus::rag::RagSystem;
use syllabus::vector_store::MemoryVectorStore;
use syllabus::{Result, SyllabusError};

/// Counts letters a-z; close enough for tests that share vocabulary.
struct LetterEmbedder;

fn letters(text: &str) -> Vec<f32> {
    let mut v = vec![0.0; 26];
    for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
        v[(c as u8 - b'a') as usize] += 1.0;
    }
    v
}

#[async_trait]
impl Embedder for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(letters(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| letters(t)).collect())
    }

    fn dimensions(&self) -> usize {
        26
    }
}

#[derive(Default)]
struct Script {
    responses: Mutex<VecDeque<ModelResponse>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl Script {
    fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        }
    }
}

#[async_trait]
impl ChatModel for Script {
    async fn create(&self, request: &ModelRequest) -> Result<ModelResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SyllabusError::Llm("no more responses".to_string()))
    }

    fn name(&self) -> &str {
        "script"
    }
}

fn search_call(id: &str, input: serde_json::Value) -> ModelResponse {
    ModelResponse {
        content: vec![ContentBlock::ToolUse {
            id: id.to_string(),
            name: "search_course_content".to_string(),
            input,
        }],
        stop_reason: StopReason::ToolUse,
    }
}

fn reply(text: &str) -> ModelResponse {
    ModelResponse {
        content: vec![ContentBlock::text(text)],
        stop_reason: StopReason::EndTurn,
    }
}

fn write_course(dir: &std::path::Path) {
    let bundle = json!({
        "title": "Prompt Compression and Query Optimization",
        "course_link": "https://example.com/pc",
        "instructor": "Richmond Alake",
        "lessons": [
            {"lesson_number": 1, "title": "Vector search", "lesson_link": "https://example.com/pc/1",
             "chunks": ["Vector search finds nearby embeddings."]},
            {"lesson_number": 2, "title": "Prompt compression", "lesson_link": "https://example.com/pc/2",
             "chunks": ["Prompt compression reduces tokens sent to the model."]}
        ]
    });
    std::fs::write(dir.join("compression.json"), bundle.to_string()).unwrap();
}

#[tokio::test]
async fn test_ingest_then_answer_with_citations() {
    let dir = tempfile::tempdir().unwrap();
    write_course(dir.path());

    let index = ContentIndex::new(
        Arc::new(MemoryVectorStore::new()),
        Arc::new(LetterEmbedder),
        5,
    );
    let model = Arc::new(Script::new(vec![
        search_call(
            "call_1",
            json!({"query": "prompt compression", "course_name": "Prompt Compression", "lesson_number": 2}),
        ),
        reply("It reduces the tokens sent to the model."),
    ]));
    let rag = RagSystem::from_parts(index, model.clone(), &Settings::default());

    let (courses, fragments) = rag.add_course_folder(dir.path(), false).await.unwrap();
    assert_eq!((courses, fragments), (1, 2));

    let session = rag.sessions().create_session();
    let answer = rag
        .query("What does prompt compression do?", Some(&session))
        .await
        .unwrap();

    assert_eq!(answer.answer, "It reduces the tokens sent to the model.");
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(
        answer.sources[0].text,
        "Prompt Compression and Query Optimization - Lesson 2"
    );
    assert_eq!(answer.sources[0].link.as_deref(), Some("https://example.com/pc/2"));

    let requests = model.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);

    let tool_result = requests[1]
        .messages
        .last()
        .unwrap()
        .content
        .iter()
        .find_map(|block| match block {
            ContentBlock::ToolResult { content, .. } => Some(content.clone()),
            _ => None,
        })
        .unwrap();
    assert!(tool_result.starts_with("[Prompt Compression and Query Optimization - Lesson 2]\n"));
    assert!(tool_result.contains("reduces tokens"));

    let history = rag.sessions().get_conversation_history(&session).unwrap();
    assert!(history.starts_with("User: What does prompt compression do?"));
}

#[tokio::test]
async fn test_unknown_course_reaches_model_as_tool_output() {
    let index = ContentIndex::new(
        Arc::new(MemoryVectorStore::new()),
        Arc::new(LetterEmbedder),
        5,
    );
    let model = Arc::new(Script::new(vec![
        search_call("call_1", json!({"query": "anything", "course_name": "Nonexistent"})),
        reply("I could not find that course."),
    ]));
    let rag = RagSystem::from_parts(index, model.clone(), &Settings::default());

    let answer = rag.query("Tell me about Nonexistent", None).await.unwrap();
    assert!(answer.sources.is_empty());

    let requests = model.requests.lock().unwrap();
    let last = requests[1].messages.last().unwrap();
    assert!(matches!(
        &last.content[0],
        ContentBlock::ToolResult { content, .. } if content == "No course found matching 'Nonexistent'"
    ));
}
