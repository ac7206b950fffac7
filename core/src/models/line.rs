use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::marker::{looks_like_header, strip_header_marker};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Line {
    pub id: String,
    pub content: String,
    pub indent_level: usize,
    pub completed: bool,
    pub is_header: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Line {
    /// Create a new line with the given content and indent
    pub fn new(content: String, indent_level: usize) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content,
            indent_level,
            completed: false,
            is_header: false,
            time_spent: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Create a new header line
    pub fn new_header(content: String, indent_level: usize) -> Self {
        let mut line = Self::new(content, indent_level);
        line.is_header = true;
        line
    }

    /// Create an empty line, as inserted by pressing enter
    pub fn blank(indent_level: usize) -> Self {
        Self::new(String::new(), indent_level)
    }

    /// Create a line from a stash entry.
    ///
    /// Stashed text is classified with the loose heuristic (leading `>` or
    /// trailing `:`) rather than the sticky per-keystroke rule.
    pub fn from_stash(text: &str, indent_level: usize) -> Self {
        let is_header = looks_like_header(text);
        let mut line = Self::new(strip_header_marker(text).to_string(), indent_level);
        line.is_header = is_header;
        line
    }

    /// Update the modified timestamp
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    /// Add whole seconds to the time spent on this line
    pub fn add_time(&mut self, seconds: u64) {
        let total = self.time_spent.unwrap_or(0).saturating_add(seconds);
        self.time_spent = Some(total);
        self.touch();
    }

    /// Time spent formatted as `"{m}m {s}s"`, or `None` if nothing was accrued
    pub fn format_time_spent(&self) -> Option<String> {
        match self.time_spent {
            Some(secs) if secs > 0 => Some(format!("{}m {}s", secs / 60, secs % 60)),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.is_empty()
    }
}
