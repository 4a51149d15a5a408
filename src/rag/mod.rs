//! Query entry point for answering questions about course material.
//!
//! [`RagSystem`] ties the content index, the agent, the tools and the
//! session history together, and drives course ingestion.

pub mod session;

pub use session::SessionManager;

use crate::agent::{Agent, CourseOutlineTool, CourseSearchTool, ToolRegistry};
use crate::config::{prompts, Settings};
use crate::error::Result;
use crate::index::ContentIndex;
use crate::ingest::{self, JsonCourseLoader};
use crate::llm::{create_chat_model, ChatModel};
use crate::models::{Citation, Course};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Answer to a query with the material it drew on.
#[derive(Debug, Clone, Serialize)]
pub struct QueryAnswer {
    pub answer: String,
    pub sources: Vec<Citation>,
}

/// Catalog summary.
#[derive(Debug, Clone, Serialize)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

pub struct RagSystem {
    index: ContentIndex,
    agent: Agent,
    sessions: SessionManager,
}

impl RagSystem {
    /// Build the system from settings: store, embedder and chat backend.
    pub fn new(settings: &Settings) -> Result<Self> {
        let index = ContentIndex::from_settings(settings)?;
        let model = create_chat_model(&settings.llm)?;
        info!(
            "Using {} index with {} ({})",
            settings.index.provider,
            model.name(),
            settings.llm.model
        );
        Ok(Self::from_parts(index, model, settings))
    }

    /// Build the system from ready-made parts.
    pub fn from_parts(index: ContentIndex, model: Arc<dyn ChatModel>, settings: &Settings) -> Self {
        Self {
            index,
            agent: Agent::new(model, &settings.llm),
            sessions: SessionManager::new(settings.session.max_history),
        }
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Fresh tool instances for one query, so concurrent queries never share
    /// a citation list.
    fn tools(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(CourseSearchTool::new(self.index.clone())));
        registry.register(Arc::new(CourseOutlineTool::new(self.index.clone())));
        registry
    }

    /// Answer a question, reading and extending the session history when a
    /// session id is given.
    #[instrument(skip(self, query))]
    pub async fn query(&self, query: &str, session_id: Option<&str>) -> Result<QueryAnswer> {
        let history = session_id.and_then(|id| self.sessions.get_conversation_history(id));
        let tools = self.tools();

        let response = self
            .agent
            .run(&prompts::query_prompt(query), history.as_deref(), &tools)
            .await?;
        debug!(
            "Answered with {} model calls and {} tool calls",
            response.model_calls,
            response.tool_calls.len()
        );

        let sources = tools.last_sources();
        tools.reset_sources();

        if let Some(id) = session_id {
            self.sessions.add_exchange(id, query, &response.content);
        }

        Ok(QueryAnswer {
            answer: response.content,
            sources,
        })
    }

    /// Load one course bundle into the index.
    pub async fn add_course_document(&self, path: &Path) -> Result<(Option<Course>, usize)> {
        ingest::add_course_document(&self.index, &JsonCourseLoader, path).await
    }

    /// Load every supported file in a folder. See [`ingest::add_course_folder`].
    pub async fn add_course_folder(
        &self,
        folder: &Path,
        clear_existing: bool,
    ) -> Result<(usize, usize)> {
        ingest::add_course_folder(&self.index, &JsonCourseLoader, folder, clear_existing).await
    }

    /// Number and titles of catalogued courses.
    pub async fn course_analytics(&self) -> CourseAnalytics {
        let course_titles = self.index.get_existing_course_titles().await;
        CourseAnalytics {
            total_courses: self.index.get_course_count().await,
            course_titles,
        }
    }
}
