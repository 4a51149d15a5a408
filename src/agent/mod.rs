//! Tool-using agent.
//!
//! The [`Agent`] drives a bounded loop against a chat model, dispatching
//! tool-use requests through a [`ToolRegistry`]. Two tools are shipped:
//! content search and course outlines.

mod outline;
mod runner;
mod search;
mod tools;

pub use outline::{CourseOutlineTool, OUTLINE_TOOL_NAME};
pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use search::{CourseSearchTool, SEARCH_TOOL_NAME};
pub use tools::{parse_args, validate_arguments, SourceSlot, Tool, ToolError, ToolRegistry};
pub use crate::llm::ToolDefinition;
