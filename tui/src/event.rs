use anyhow::Result;
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::time::Duration;

use crate::app::{App, InputMode};
use crate::keymap::Action;

/// Terminal events
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// Key press event
    Key(KeyEvent),
    /// Terminal tick event
    Tick,
    /// Mouse event
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize,
}

/// Event handler for the terminal
pub struct EventHandler {
    /// Tick rate in milliseconds
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                CEvent::Key(key) => return Ok(Event::Key(key)),
                CEvent::Mouse(m) => return Ok(Event::Mouse(m)),
                CEvent::Resize(_, _) => return Ok(Event::Resize),
                _ => {}
            }
        }
        Ok(Event::Tick)
    }
}

/// True for plain typing, including AltGr combinations (CONTROL+ALT)
fn is_text_input(key: &KeyEvent) -> bool {
    !key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT)
}

/// Handle key events for the application
pub fn handle_key_event(key: KeyEvent, app: &mut App) {
    // On Windows, crossterm reports both key press and release events.
    // We only want to handle press events to avoid duplicates.
    if key.kind != KeyEventKind::Press {
        return;
    }

    app.status_message = None;

    match app.mode {
        InputMode::Help => match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter => app.close_overlay(),
            _ => {}
        },
        InputMode::StashCapture => handle_prompt_input(key, app, App::commit_stash_capture),
        InputMode::TimerEdit => handle_prompt_input(key, app, App::commit_timer_edit),
        InputMode::StashPicker => handle_stash_picker_input(key, app),
        InputMode::Editing => handle_editing_input(key, app),
    }
}

/// Handle key events while editing the active line
fn handle_editing_input(key: KeyEvent, app: &mut App) {
    if let Some(action) = app.bindings.action_for(&key) {
        match action {
            Action::Quit => app.quit(),
            Action::Help => app.open_help(),
            Action::LineUp => app.move_up(),
            Action::LineDown => app.move_down(),
            Action::NewLine => app.new_line(),
            Action::Indent => app.indent(),
            Action::Outdent => app.outdent(),
            Action::FocusOrComplete => app.focus_or_complete(),
            Action::Uncomplete => app.uncomplete(),
            Action::ExitFocus => app.exit_focus(),
            Action::StashCapture => app.open_stash_capture(),
            Action::StashPicker => app.open_stash_picker(),
            Action::ToggleTimer => app.toggle_timer(),
            Action::ResetTimer => app.reset_timer(),
            Action::EditTimer => app.open_timer_edit(),
            Action::ToggleTimeView => app.toggle_time_view(),
        }
        return;
    }

    match key.code {
        KeyCode::Backspace => app.backspace(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) if is_text_input(&key) => app.insert_char(c),
        _ => {}
    }
}

/// Handle key events for a single-line prompt
fn handle_prompt_input(key: KeyEvent, app: &mut App, commit: fn(&mut App)) {
    match key.code {
        KeyCode::Esc => app.close_overlay(),
        KeyCode::Enter => commit(app),
        KeyCode::Backspace => {
            app.prompt_buffer.pop();
        }
        KeyCode::Char(c) if is_text_input(&key) => app.prompt_buffer.push(c),
        _ => {}
    }
}

/// Handle key events when the stash picker is open
fn handle_stash_picker_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.close_overlay(),
        KeyCode::Up => app.stash_picker_up(),
        KeyCode::Down => app.stash_picker_down(),
        KeyCode::Enter => app.commit_stash_pick(),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if index < app.session.store().stash().len() {
                app.stash_selection = index;
                app.commit_stash_pick();
            }
        }
        _ => {}
    }
}

/// Handle mouse events: click selects a line, the wheel moves the active line
pub fn handle_mouse_event(mouse: MouseEvent, app: &mut App) {
    if app.mode != InputMode::Editing {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.click_row(mouse.column, mouse.row),
        MouseEventKind::ScrollUp => app.move_up(),
        MouseEventKind::ScrollDown => app.move_down(),
        _ => {}
    }
}
