use crate::app::{App, InputMode};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use super::{
    render_focus_overlay, render_header, render_help_screen, render_outline, render_prompt_overlay,
    render_stash_panel, render_stash_picker, render_status_bar,
};

/// Render the complete UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let size = frame.size();

    // Create main layout: header, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Outline
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_header(frame, app, chunks[0]);
    render_outline(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if app.session.store().is_focus_mode() {
        render_focus_overlay(frame, app, chunks[1]);
    } else if !app.session.store().stash().is_empty() && app.mode != InputMode::StashPicker {
        render_stash_panel(frame, app, chunks[1]);
    }

    // Overlays (drawn last)
    match app.mode {
        InputMode::StashCapture => {
            render_prompt_overlay(frame, " Quick Stash (Enter:Save | Esc:Cancel) ", &app.prompt_buffer, size)
        }
        InputMode::TimerEdit => {
            render_prompt_overlay(frame, " Set Timer MM:SS (Enter:Save | Esc:Cancel) ", &app.prompt_buffer, size)
        }
        InputMode::StashPicker => render_stash_picker(frame, app, size),
        InputMode::Help => render_help_screen(frame, app, size),
        InputMode::Editing => {}
    }
}
