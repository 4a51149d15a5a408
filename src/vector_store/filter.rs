//! Equality filters over content fragments.

use super::FragmentRecord;
use rusqlite::types::Value;
use serde_json::json;

/// Exact-match constraint on fragment metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `course_title == value`
    CourseTitle(String),
    /// `lesson_number == value`
    LessonNumber(u32),
    /// Every inner filter must hold.
    And(Vec<Filter>),
}

impl Filter {
    /// Compose the filter for an optional course title and lesson number.
    ///
    /// Returns `None` when neither is given, a single constraint when one
    /// is given, and a conjunction when both are.
    pub fn build(course_title: Option<&str>, lesson_number: Option<u32>) -> Option<Filter> {
        match (course_title, lesson_number) {
            (None, None) => None,
            (Some(title), None) => Some(Filter::CourseTitle(title.to_string())),
            (None, Some(lesson)) => Some(Filter::LessonNumber(lesson)),
            (Some(title), Some(lesson)) => Some(Filter::And(vec![
                Filter::CourseTitle(title.to_string()),
                Filter::LessonNumber(lesson),
            ])),
        }
    }

    /// Evaluate the filter against a stored fragment.
    pub fn matches(&self, record: &FragmentRecord) -> bool {
        match self {
            Filter::CourseTitle(title) => record.course_title == *title,
            Filter::LessonNumber(lesson) => record.lesson_number == Some(*lesson),
            Filter::And(filters) => filters.iter().all(|f| f.matches(record)),
        }
    }

    /// Compile to a SQL boolean expression with positional parameters.
    pub(crate) fn to_sql(&self, params: &mut Vec<Value>) -> String {
        match self {
            Filter::CourseTitle(title) => {
                params.push(Value::Text(title.clone()));
                "course_title = ?".to_string()
            }
            Filter::LessonNumber(lesson) => {
                params.push(Value::Integer(i64::from(*lesson)));
                "lesson_number = ?".to_string()
            }
            Filter::And(filters) if filters.is_empty() => "1 = 1".to_string(),
            Filter::And(filters) => {
                let clauses: Vec<String> = filters
                    .iter()
                    .map(|f| format!("({})", f.to_sql(params)))
                    .collect();
                clauses.join(" AND ")
            }
        }
    }

    /// JSON form used when logging or exporting filters.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Filter::CourseTitle(title) => json!({ "course_title": title }),
            Filter::LessonNumber(lesson) => json!({ "lesson_number": lesson }),
            Filter::And(filters) => {
                json!({ "$and": filters.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
