//! Course outline tool.

use super::tools::{parse_args, SourceSlot, Tool, ToolError};
use crate::index::ContentIndex;
use crate::llm::ToolDefinition;
use crate::models::{Citation, Course};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

pub const OUTLINE_TOOL_NAME: &str = "get_course_outline";

#[derive(Debug, Deserialize)]
struct OutlineArgs {
    course_name: String,
}

pub struct CourseOutlineTool {
    index: ContentIndex,
    sources: SourceSlot,
}

impl CourseOutlineTool {
    pub fn new(index: ContentIndex) -> Self {
        Self {
            index,
            sources: SourceSlot::default(),
        }
    }
}

fn render_outline(course: &Course) -> String {
    let mut lines = vec![format!("Course: {}", course.title)];
    if let Some(link) = &course.course_link {
        lines.push(format!("Course Link: {}", link));
    }
    if let Some(instructor) = &course.instructor {
        lines.push(format!("Instructor: {}", instructor));
    }
    lines.push(format!("Lessons ({}):", course.lessons.len()));
    for lesson in &course.lessons {
        lines.push(format!("Lesson {}: {}", lesson.lesson_number, lesson.title));
    }
    lines.join("\n")
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: OUTLINE_TOOL_NAME.to_string(),
            description: "Get a course's title, link, instructor and complete lesson list".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work)"
                    }
                },
                "required": ["course_name"]
            }),
        }
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let args: OutlineArgs = parse_args(OUTLINE_TOOL_NAME, args)?;

        let course = self
            .index
            .get_course_outline(&args.course_name)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        let Some(course) = course else {
            return Ok(format!("No course found matching '{}'", args.course_name));
        };

        self.sources
            .replace(vec![Citation::new(course.title.clone(), course.course_link.clone())]);
        Ok(render_outline(&course))
    }

    fn last_sources(&self) -> Vec<Citation> {
        self.sources.get()
    }

    fn reset_sources(&self) {
        self.sources.clear();
    }
}
