use std::sync::mpsc::Receiver;

use log::debug;

use crate::models::{classify_edit, seed_lines, Line};
use crate::notify::{Change, Notifier};

/// The outline document together with its active pointer, stash and view flags.
///
/// The line sequence encodes the hierarchy: a line's parent is the nearest
/// preceding line with a strictly smaller indent. The document is never
/// empty and the active pointer always indexes an existing line.
#[derive(Debug)]
pub struct OutlineStore {
    lines: Vec<Line>,
    active: usize,
    stash: Vec<String>,
    focus_mode: bool,
    show_time_spent: bool,
    notifier: Notifier,
}

impl Default for OutlineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineStore {
    /// Create a store holding the seed document
    pub fn new() -> Self {
        Self::from_lines(seed_lines())
    }

    /// Create a store from existing lines. An empty list yields one blank line.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let lines = if lines.is_empty() {
            vec![Line::blank(0)]
        } else {
            lines
        };
        Self {
            lines,
            active: 0,
            stash: Vec::new(),
            focus_mode: false,
            show_time_spent: false,
            notifier: Notifier::new(),
        }
    }

    /// Receive a `Change` after every committed mutation
    pub fn subscribe(&mut self) -> Receiver<Change> {
        self.notifier.subscribe()
    }

    pub(crate) fn publish(&mut self, change: Change) {
        self.notifier.publish(change);
    }

    // --- Reads ---

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Never true: the document always holds at least one line
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_line(&self) -> &Line {
        &self.lines[self.active]
    }

    /// Lines enclosing the active line, outermost first.
    ///
    /// Walks backwards from the active line and keeps every line that is
    /// shallower than the shallowest one collected so far.
    pub fn active_line_ancestors(&self) -> Vec<&Line> {
        let mut current = self.active_line().indent_level;
        let mut ancestors = Vec::new();
        for line in self.lines[..self.active].iter().rev() {
            if current == 0 {
                break;
            }
            if line.indent_level < current {
                ancestors.push(line);
                current = line.indent_level;
            }
        }
        ancestors.reverse();
        ancestors
    }

    pub fn stash(&self) -> &[String] {
        &self.stash
    }

    pub fn is_focus_mode(&self) -> bool {
        self.focus_mode
    }

    pub fn shows_time_spent(&self) -> bool {
        self.show_time_spent
    }

    // --- Mutations ---

    /// Replace a line's content with raw editor text, applying marker rules
    pub fn update_content(&mut self, id: &str, raw: &str) {
        let Some(line) = self.lines.iter_mut().find(|l| l.id == id) else {
            debug!("update_content: no line with id {}", id);
            return;
        };

        let (content, is_header) = classify_edit(line.is_header, raw);
        if line.content == content && line.is_header == is_header {
            return;
        }
        line.content = content;
        line.is_header = is_header;
        line.touch();
        self.publish(Change::Lines);
    }

    /// Insert a blank line after `index` and make it active.
    ///
    /// The new line takes the reference line's indent, one deeper when the
    /// reference line is a header. Returns the index of the new line.
    pub fn insert_after(&mut self, index: usize) -> usize {
        let indent = match self.lines.get(index) {
            Some(reference) if reference.is_header => reference.indent_level + 1,
            Some(reference) => reference.indent_level,
            None => 0,
        };
        let position = index.saturating_add(1).min(self.lines.len());

        self.lines.insert(position, Line::blank(indent));
        self.publish(Change::Lines);
        self.set_active(position);
        position
    }

    /// Remove the line at `index`. The last remaining line is never removed.
    pub fn delete(&mut self, index: usize) {
        if self.lines.len() <= 1 {
            debug!("delete: refusing to remove the last line");
            return;
        }
        if index >= self.lines.len() {
            debug!("delete: index {} out of range", index);
            return;
        }

        self.lines.remove(index);
        self.publish(Change::Lines);

        let mut active = self.active;
        if active >= index && active > 0 {
            active -= 1;
        }
        active = active.min(self.lines.len() - 1);
        if active != self.active {
            self.active = active;
            self.publish(Change::Active { index: active });
        }
    }

    /// Move the active pointer. Out-of-range indices are ignored.
    pub fn set_active(&mut self, index: usize) {
        if index >= self.lines.len() {
            debug!("set_active: index {} out of range", index);
            return;
        }
        if index != self.active {
            self.active = index;
            self.publish(Change::Active { index });
        }
    }

    /// Indent or outdent a single line. Children keep their own indent.
    pub fn reindent(&mut self, index: usize, deeper: bool) {
        let Some(line) = self.lines.get_mut(index) else {
            debug!("reindent: index {} out of range", index);
            return;
        };

        let level = if deeper {
            line.indent_level + 1
        } else {
            line.indent_level.saturating_sub(1)
        };
        if level == line.indent_level {
            return;
        }
        line.indent_level = level;
        line.touch();
        self.publish(Change::Lines);
    }

    pub fn toggle_focus_mode(&mut self) {
        self.focus_mode = !self.focus_mode;
        self.publish(Change::FocusMode(self.focus_mode));
    }

    /// Mark the active line completed; this also ends focus mode
    pub fn complete_active(&mut self) {
        self.set_active_completed(true);
        if self.focus_mode {
            self.focus_mode = false;
            self.publish(Change::FocusMode(false));
        }
    }

    pub fn uncomplete_active(&mut self) {
        self.set_active_completed(false);
    }

    fn set_active_completed(&mut self, completed: bool) {
        let line = &mut self.lines[self.active];
        if line.completed == completed {
            return;
        }
        line.completed = completed;
        line.touch();
        self.publish(Change::Lines);
    }

    /// Append a capture to the stash. Empty text is ignored.
    pub fn add_to_stash(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            debug!("add_to_stash: ignoring empty capture");
            return;
        }
        self.stash.push(text);
        self.publish(Change::Stash);
    }

    /// Move a stash entry into the document right after the active line
    pub fn pop_from_stash(&mut self, index: usize) {
        if index >= self.stash.len() {
            debug!("pop_from_stash: index {} out of range", index);
            return;
        }

        let text = self.stash.remove(index);
        self.publish(Change::Stash);

        let indent = self.active_line().indent_level;
        let position = self.active + 1;
        self.lines.insert(position, Line::from_stash(&text, indent));
        self.publish(Change::Lines);
        self.set_active(position);
    }

    /// Attribute elapsed seconds to a line
    pub fn accrue_time(&mut self, id: &str, seconds: u64) {
        if seconds == 0 {
            return;
        }
        let Some(line) = self.lines.iter_mut().find(|l| l.id == id) else {
            debug!("accrue_time: line {} no longer exists", id);
            return;
        };
        line.add_time(seconds);
        self.publish(Change::Lines);
    }

    pub fn toggle_show_time_spent(&mut self) {
        self.set_show_time_spent(!self.show_time_spent);
    }

    pub fn set_show_time_spent(&mut self, show: bool) {
        if self.show_time_spent != show {
            self.show_time_spent = show;
            self.publish(Change::TimeView(show));
        }
    }
}
