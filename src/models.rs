//! Course data model shared by ingestion, the content index and the tools.

use serde::{Deserialize, Serialize};

/// A lesson within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    /// Lesson number, unique within its course.
    pub lesson_number: u32,
    /// Lesson title.
    pub title: String,
    /// Link to the lesson material.
    #[serde(default)]
    pub lesson_link: Option<String>,
}

impl Lesson {
    /// Create a lesson without a link.
    pub fn new(lesson_number: u32, title: impl Into<String>) -> Self {
        Self {
            lesson_number,
            title: title.into(),
            lesson_link: None,
        }
    }

    /// Attach a link to the lesson.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.lesson_link = Some(link.into());
        self
    }
}

/// A course: identity record for everything indexed under its title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Course title. Unique key in the catalog.
    pub title: String,
    #[serde(default)]
    pub course_link: Option<String>,
    #[serde(default)]
    pub instructor: Option<String>,
    /// Lessons in presentation order.
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Create a course with no lessons.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            course_link: None,
            instructor: None,
            lessons: Vec::new(),
        }
    }

    /// Find a lesson by number.
    pub fn lesson(&self, lesson_number: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.lesson_number == lesson_number)
    }
}

/// A searchable fragment of course text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentFragment {
    /// Fragment text.
    pub content: String,
    /// Title of the owning course.
    pub course_title: String,
    /// Lesson this fragment belongs to, if any.
    #[serde(default)]
    pub lesson_number: Option<u32>,
    /// Ordinal of this fragment within the course.
    pub chunk_index: u32,
}

impl ContentFragment {
    /// Stable identity key derived from the course title and ordinal.
    ///
    /// Re-ingesting the same material produces the same key, so fragments
    /// are overwritten rather than duplicated.
    pub fn id(&self) -> String {
        fragment_id(&self.course_title, self.chunk_index)
    }
}

/// Build a fragment key from its course title and ordinal.
///
/// Spaces become underscores and nothing else is escaped, so titles that
/// differ only by space versus underscore ("A B", "A_B") share keys and
/// overwrite each other's fragments.
pub fn fragment_id(course_title: &str, chunk_index: u32) -> String {
    format!("{}_{}", course_title.replace(' ', "_"), chunk_index)
}

/// A pointer back to the material an answer was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Display text, e.g. "Course A - Lesson 1".
    pub text: String,
    /// Link to the source, when known.
    pub link: Option<String>,
}

impl Citation {
    pub fn new(text: impl Into<String>, link: Option<String>) -> Self {
        Self {
            text: text.into(),
            link,
        }
    }
}
