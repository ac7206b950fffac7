use anyhow::Result;
use linestream_core::{Change, FocusTimer, Line, OutlineStore, Session, SystemClock};
use log::debug;
use ratatui::layout::Rect;
use std::sync::mpsc::Receiver;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::Config;
use crate::keymap::Bindings;

/// What the keyboard is currently talking to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Typing edits the active line
    Editing,
    /// Quick capture prompt for a new stash entry
    StashCapture,
    /// Choosing a stash entry to move into the document
    StashPicker,
    /// `MM:SS` prompt for the focus timer
    TimerEdit,
    Help,
}

/// Application state
pub struct App {
    pub should_quit: bool,
    pub session: Session<SystemClock>,
    pub config: Config,
    pub bindings: Bindings,
    pub mode: InputMode,
    /// Content of the active line as shown in the editor
    pub edit_buffer: String,
    /// Cursor position in graphemes
    pub edit_cursor: usize,
    pub prompt_buffer: String,
    pub stash_selection: usize,
    pub scroll_offset: usize,
    pub status_message: Option<String>,
    /// Where the outline rows were last drawn, for mouse hit-testing
    pub outline_area: Rect,
    changes: Receiver<Change>,
    editing_line: String,
}

impl App {
    /// Create a new App instance
    pub fn new(config: Config) -> Result<Self> {
        let bindings = Bindings::from_keymap(&config.keymap)?;
        let timer = FocusTimer::new(config.timer_minutes());
        let mut session = Session::with_clock(OutlineStore::new(), timer, SystemClock);
        session.set_show_time_spent(config.show_time_spent);
        let changes = session.subscribe();

        let mut app = Self {
            should_quit: false,
            session,
            config,
            bindings,
            mode: InputMode::Editing,
            edit_buffer: String::new(),
            edit_cursor: 0,
            prompt_buffer: String::new(),
            stash_selection: 0,
            scroll_offset: 0,
            status_message: None,
            outline_area: Rect::default(),
            changes,
            editing_line: String::new(),
        };
        app.load_active_line();
        Ok(app)
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn active_line(&self) -> &Line {
        self.session.store().active_line()
    }

    /// Called on every event-loop timeout
    pub fn tick(&mut self) {
        let was_running = self.session.timer().is_running();
        self.session.tick();
        if was_running && !self.session.timer().is_running() {
            self.status_message = Some("Focus timer finished".to_string());
        }
        self.sync();
    }

    /// Drain pending change notifications and refresh the editor from the
    /// store. Returns whether anything changed.
    pub fn sync(&mut self) -> bool {
        let mut changed = false;
        for change in self.changes.try_iter() {
            debug!("change: {:?}", change);
            changed = true;
        }
        if changed {
            self.refresh_edit_buffer();
        }
        changed
    }

    fn refresh_edit_buffer(&mut self) {
        let line = self.session.store().active_line();
        if line.id != self.editing_line {
            self.load_active_line();
        } else if line.content != self.edit_buffer {
            self.edit_buffer = line.content.clone();
            self.edit_cursor = self.edit_cursor.min(grapheme_len(&self.edit_buffer));
        }
        let len = self.session.store().stash().len();
        self.stash_selection = self.stash_selection.min(len.saturating_sub(1));
    }

    fn load_active_line(&mut self) {
        let line = self.session.store().active_line();
        self.editing_line = line.id.clone();
        self.edit_buffer = line.content.clone();
        self.edit_cursor = grapheme_len(&self.edit_buffer);
    }

    /// Send raw editor text to the store and pick up the classified result.
    ///
    /// `cursor` is where the cursor would sit in `raw`; it moves back by one
    /// when a leading marker was stripped.
    fn commit_raw(&mut self, raw: String, cursor: usize) {
        let id = self.editing_line.clone();
        self.session.update_content(&id, &raw);
        let content = self.session.store().active_line().content.clone();
        let stripped = grapheme_len(&raw).saturating_sub(grapheme_len(&content));
        self.edit_cursor = cursor.saturating_sub(stripped).min(grapheme_len(&content));
        self.edit_buffer = content;
        self.sync();
    }

    // --- Editing ---

    pub fn insert_char(&mut self, c: char) {
        let at = byte_offset(&self.edit_buffer, self.edit_cursor);
        let mut raw = self.edit_buffer.clone();
        raw.insert(at, c);
        // A combining character merges into the previous grapheme
        let cursor = grapheme_len(&raw[..at + c.len_utf8()]);
        self.commit_raw(raw, cursor);
    }

    /// Outdent at the start of an indented line, delete an empty line,
    /// otherwise remove the grapheme before the cursor.
    pub fn backspace(&mut self) {
        let index = self.session.store().active_index();
        let indent = self.active_line().indent_level;

        if self.edit_cursor == 0 && indent > 0 {
            self.session.reindent(index, false);
            self.sync();
        } else if self.edit_buffer.is_empty() {
            self.session.delete(index);
            self.sync();
        } else if self.edit_cursor > 0 {
            let from = byte_offset(&self.edit_buffer, self.edit_cursor - 1);
            let to = byte_offset(&self.edit_buffer, self.edit_cursor);
            let mut raw = self.edit_buffer.clone();
            raw.replace_range(from..to, "");
            self.commit_raw(raw, self.edit_cursor - 1);
        }
    }

    pub fn cursor_left(&mut self) {
        self.edit_cursor = self.edit_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.edit_cursor = (self.edit_cursor + 1).min(grapheme_len(&self.edit_buffer));
    }

    pub fn cursor_home(&mut self) {
        self.edit_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.edit_cursor = grapheme_len(&self.edit_buffer);
    }

    // --- Outline ---

    pub fn move_up(&mut self) {
        let index = self.session.store().active_index();
        if index > 0 {
            self.session.set_active(index - 1);
            self.sync();
        }
    }

    pub fn move_down(&mut self) {
        let index = self.session.store().active_index();
        self.session.set_active(index + 1);
        self.sync();
    }

    pub fn new_line(&mut self) {
        let index = self.session.store().active_index();
        self.session.insert_after(index);
        self.sync();
    }

    pub fn indent(&mut self) {
        let index = self.session.store().active_index();
        self.session.reindent(index, true);
        self.sync();
    }

    pub fn outdent(&mut self) {
        let index = self.session.store().active_index();
        self.session.reindent(index, false);
        self.sync();
    }

    /// Enter focus mode, or complete the active line when already focused
    pub fn focus_or_complete(&mut self) {
        if self.session.store().is_focus_mode() {
            self.session.complete_active();
        } else {
            self.session.toggle_focus_mode();
        }
        self.sync();
    }

    pub fn uncomplete(&mut self) {
        self.session.uncomplete_active();
        self.sync();
    }

    pub fn exit_focus(&mut self) {
        if self.session.store().is_focus_mode() {
            self.session.toggle_focus_mode();
            self.sync();
        }
    }

    /// Select the outline row drawn at terminal row `row`
    pub fn click_row(&mut self, column: u16, row: u16) {
        let area = self.outline_area;
        if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return;
        }
        let index = self.scroll_offset + (row - area.y) as usize;
        self.session.set_active(index);
        self.sync();
    }

    /// Keep the active line inside a viewport of `height` rows
    pub fn ensure_visible(&mut self, height: usize) {
        let active = self.session.store().active_index();
        if height == 0 {
            return;
        }
        if active < self.scroll_offset {
            self.scroll_offset = active;
        } else if active >= self.scroll_offset + height {
            self.scroll_offset = active + 1 - height;
        }
    }

    // --- Stash ---

    pub fn open_stash_capture(&mut self) {
        self.prompt_buffer.clear();
        self.mode = InputMode::StashCapture;
    }

    pub fn commit_stash_capture(&mut self) {
        let text = std::mem::take(&mut self.prompt_buffer);
        self.session.add_to_stash(text.trim());
        self.mode = InputMode::Editing;
        self.sync();
    }

    pub fn open_stash_picker(&mut self) {
        if self.session.store().stash().is_empty() {
            self.status_message = Some("Stash is empty".to_string());
            return;
        }
        self.stash_selection = 0;
        self.mode = InputMode::StashPicker;
    }

    pub fn stash_picker_up(&mut self) {
        self.stash_selection = self.stash_selection.saturating_sub(1);
    }

    pub fn stash_picker_down(&mut self) {
        let len = self.session.store().stash().len();
        if self.stash_selection + 1 < len {
            self.stash_selection += 1;
        }
    }

    /// Move the selected stash entry into the document
    pub fn commit_stash_pick(&mut self) {
        self.session.pop_from_stash(self.stash_selection);
        self.mode = InputMode::Editing;
        self.sync();
    }

    // --- Timer ---

    pub fn toggle_timer(&mut self) {
        self.session.toggle_timer();
        if !self.session.timer().is_running() && self.session.timer().remaining_secs() == 0 {
            self.status_message = Some("Timer is at 00:00, reset it first".to_string());
        }
        self.sync();
    }

    pub fn reset_timer(&mut self) {
        self.session.reset_timer();
        self.sync();
    }

    pub fn open_timer_edit(&mut self) {
        if self.session.timer().is_running() {
            self.status_message = Some("Pause the timer before editing it".to_string());
            return;
        }
        self.prompt_buffer = self.session.timer().format_remaining();
        self.mode = InputMode::TimerEdit;
    }

    pub fn commit_timer_edit(&mut self) {
        match parse_timer_input(&self.prompt_buffer) {
            Some((minutes, seconds)) => {
                self.session.set_timer_remaining(minutes, seconds);
                self.status_message = None;
            }
            None => {
                self.status_message = Some(format!("Not a time: {:?}", self.prompt_buffer));
            }
        }
        self.prompt_buffer.clear();
        self.mode = InputMode::Editing;
        self.sync();
    }

    // --- View ---

    pub fn toggle_time_view(&mut self) {
        self.session.toggle_show_time_spent();
        self.sync();
    }

    pub fn open_help(&mut self) {
        self.mode = InputMode::Help;
    }

    /// Leave any prompt or overlay without applying it
    pub fn close_overlay(&mut self) {
        self.prompt_buffer.clear();
        self.mode = InputMode::Editing;
    }
}

/// Accepts `MM:SS`, `MM:` or a bare number of minutes
pub fn parse_timer_input(input: &str) -> Option<(u32, u32)> {
    let input = input.trim();
    match input.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes = if minutes.trim().is_empty() { 0 } else { minutes.trim().parse().ok()? };
            let seconds = if seconds.trim().is_empty() { 0 } else { seconds.trim().parse().ok()? };
            Some((minutes, seconds))
        }
        None => Some((input.parse().ok()?, 0)),
    }
}

fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte offset of the grapheme at `index`, or the end of the text
fn byte_offset(text: &str, index: usize) -> usize {
    text.grapheme_indices(true)
        .nth(index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Config::default()).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.insert_char(c);
        }
    }

    #[test]
    fn test_app_starts_on_first_line() {
        let app = app();
        assert_eq!(app.edit_buffer, "Project Alpha");
        assert_eq!(app.edit_cursor, "Project Alpha".len());
        assert_eq!(app.mode, InputMode::Editing);
    }

    #[test]
    fn test_typing_updates_the_store() {
        let mut app = app();
        app.new_line();
        type_text(&mut app, "write docs");

        assert_eq!(app.active_line().content, "write docs");
        assert_eq!(app.edit_buffer, "write docs");
        assert_eq!(app.edit_cursor, 10);
    }

    #[test]
    fn test_typing_header_marker_reclassifies() {
        let mut app = app();
        app.new_line();
        type_text(&mut app, ">Ideas");

        assert_eq!(app.active_line().content, "Ideas");
        assert!(app.active_line().is_header);
        assert_eq!(app.edit_cursor, 5);
    }

    #[test]
    fn test_marker_typed_at_start_of_existing_text() {
        let mut app = app();
        app.move_down();
        app.cursor_home();
        app.insert_char('>');

        assert_eq!(app.edit_buffer, "setup repo");
        assert!(app.active_line().is_header);
        assert_eq!(app.edit_cursor, 0);
    }

    #[test]
    fn test_backspace_outdents_then_deletes() {
        let mut app = app();
        app.new_line();
        assert_eq!(app.active_line().indent_level, 1);

        app.backspace();
        assert_eq!(app.active_line().indent_level, 0);
        assert_eq!(app.session.store().len(), 4);

        app.backspace();
        assert_eq!(app.session.store().len(), 3);
        assert_eq!(app.session.store().active_index(), 0);
        assert_eq!(app.edit_buffer, "Project Alpha");
    }

    #[test]
    fn test_backspace_removes_grapheme() {
        let mut app = app();
        app.new_line();
        app.outdent();
        type_text(&mut app, "cafe\u{301}s");

        app.cursor_left();
        app.backspace();

        assert_eq!(app.edit_buffer, "cafs");
        assert_eq!(app.edit_cursor, 3);
    }

    #[test]
    fn test_focus_then_complete() {
        let mut app = app();
        app.move_down();
        app.focus_or_complete();
        assert!(app.session.store().is_focus_mode());

        app.focus_or_complete();
        assert!(!app.session.store().is_focus_mode());
        assert!(app.active_line().completed);

        app.uncomplete();
        assert!(!app.active_line().completed);
    }

    #[test]
    fn test_stash_capture_and_pick() {
        let mut app = app();
        app.open_stash_capture();
        app.prompt_buffer.push_str("  call bob ");
        app.commit_stash_capture();
        assert_eq!(app.session.store().stash(), &["call bob".to_string()]);

        app.open_stash_picker();
        assert_eq!(app.mode, InputMode::StashPicker);
        app.commit_stash_pick();

        assert!(app.session.store().stash().is_empty());
        assert_eq!(app.edit_buffer, "call bob");
        assert_eq!(app.session.store().active_index(), 1);
    }

    #[test]
    fn test_whitespace_capture_is_not_stashed() {
        let mut app = app();
        app.open_stash_capture();
        app.prompt_buffer.push_str("   ");
        app.commit_stash_capture();
        assert!(app.session.store().stash().is_empty());
        assert_eq!(app.mode, InputMode::Editing);
    }

    #[test]
    fn test_empty_stash_picker_does_not_open() {
        let mut app = app();
        app.open_stash_picker();
        assert_eq!(app.mode, InputMode::Editing);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_timer_edit() {
        let mut app = app();
        app.open_timer_edit();
        assert_eq!(app.prompt_buffer, "25:00");
        app.prompt_buffer = "10:30".to_string();
        app.commit_timer_edit();

        assert_eq!(app.session.timer().remaining_secs(), 630);
        assert_eq!(app.mode, InputMode::Editing);
    }

    #[test]
    fn test_timer_edit_blocked_while_running() {
        let mut app = app();
        app.toggle_timer();
        app.open_timer_edit();
        assert_eq!(app.mode, InputMode::Editing);
    }

    #[test]
    fn test_moving_lines_resets_running_timer() {
        let mut app = app();
        app.toggle_timer();
        assert!(app.session.timer().is_running());

        app.move_down();

        assert!(!app.session.timer().is_running());
    }

    #[test]
    fn test_parse_timer_input() {
        assert_eq!(parse_timer_input("05:30"), Some((5, 30)));
        assert_eq!(parse_timer_input("15"), Some((15, 0)));
        assert_eq!(parse_timer_input("7:"), Some((7, 0)));
        assert_eq!(parse_timer_input(":45"), Some((0, 45)));
        assert_eq!(parse_timer_input("abc"), None);
    }

    #[test]
    fn test_ensure_visible() {
        let mut app = app();
        for _ in 0..10 {
            app.new_line();
        }
        app.ensure_visible(5);
        assert_eq!(app.scroll_offset, 6);

        app.session.set_active(2);
        app.ensure_visible(5);
        assert_eq!(app.scroll_offset, 2);
    }

    #[test]
    fn test_click_row_selects_line() {
        let mut app = app();
        app.outline_area = Rect::new(5, 3, 40, 10);

        app.click_row(10, 5);
        assert_eq!(app.session.store().active_index(), 2);
        assert_eq!(app.edit_buffer, "install dependencies");

        app.click_row(1, 4);
        assert_eq!(app.session.store().active_index(), 2);
    }
}
