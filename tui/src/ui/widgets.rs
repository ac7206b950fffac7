use crate::app::{App, InputMode};
use crate::keymap::Action;
use linestream_core::models::marker_for;
use linestream_core::TimerState;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Render the header with title and key hints
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let b = &app.bindings;
    let key_hints = match app.mode {
        InputMode::StashCapture | InputMode::TimerEdit => " [Enter:Save] [Esc:Cancel] ".to_string(),
        InputMode::StashPicker => " [↑/↓:Select] [Enter:Insert] [1-9:Pick] [Esc:Close] ".to_string(),
        InputMode::Help => " [Esc:Close Help] ".to_string(),
        InputMode::Editing if app.session.store().is_focus_mode() => format!(
            " [{}:Complete] [{}:Exit Focus] [{}:Timer] ",
            b.label(Action::FocusOrComplete),
            b.label(Action::ExitFocus),
            b.label(Action::ToggleTimer),
        ),
        InputMode::Editing => format!(
            " [{}:Focus] [{}:Stash] [{}:Unstash] [{}:Timer] [{}:Time View] [{}:Help] [{}:Quit] ",
            b.label(Action::FocusOrComplete),
            b.label(Action::StashCapture),
            b.label(Action::StashPicker),
            b.label(Action::ToggleTimer),
            b.label(Action::ToggleTimeView),
            b.label(Action::Help),
            b.label(Action::Quit),
        ),
    };

    let header_spans = vec![
        Span::styled(
            " linestream ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(key_hints, Style::default().fg(Color::DarkGray)),
    ];

    let header = Paragraph::new(Line::from(header_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    frame.render_widget(header, area);
}

/// Render the outline view
pub fn render_outline(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Outline ")
        .title_alignment(Alignment::Left);
    let inner = block.inner(area);
    app.outline_area = inner;
    app.ensure_visible(inner.height as usize);

    let store = app.session.store();
    let active = store.active_index();
    let gutter = store.len().to_string().len();
    let dimmed = store.is_focus_mode();

    let mut lines: Vec<Line> = Vec::new();
    for (i, line) in store
        .lines()
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(inner.height as usize)
    {
        let is_active = i == active;
        let content = if is_active { app.edit_buffer.as_str() } else { line.content.as_str() };

        let marker = if !content.is_empty() || line.is_header {
            marker_for(line.is_header)
        } else {
            ' '
        };
        let marker_style = if line.is_header {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let content_style = if line.completed {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
        } else if line.is_header {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let number_style = if is_active {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut spans = vec![
            Span::styled(format!("{:>width$} ", i + 1, width = gutter), number_style),
            Span::raw("  ".repeat(line.indent_level)),
            Span::styled(format!("{} ", marker), marker_style),
            Span::styled(content.to_string(), content_style),
        ];

        if store.shows_time_spent() {
            if let Some(spent) = line.format_time_spent() {
                spans.push(Span::styled(format!("  {}", spent), Style::default().fg(Color::DarkGray)));
            }
        }

        let mut row = Line::from(spans);
        if is_active {
            row = row.style(Style::default().bg(Color::Rgb(40, 44, 52)));
        }
        if dimmed {
            row = row.style(Style::default().fg(Color::DarkGray));
        }
        lines.push(row);
    }

    let outline = Paragraph::new(lines).block(block);
    frame.render_widget(outline, area);

    // Terminal cursor inside the active line
    if app.mode == InputMode::Editing && !dimmed && active >= app.scroll_offset {
        let row = (active - app.scroll_offset) as u16;
        let indent = store.active_line().indent_level as u16 * 2;
        let before_cursor: String = app.edit_buffer.graphemes(true).take(app.edit_cursor).collect();
        let x = inner.x + gutter as u16 + 1 + indent + 2 + before_cursor.width() as u16;
        if row < inner.height && x < inner.x + inner.width {
            frame.set_cursor(x, inner.y + row);
        }
    }
}

/// Render the focus overlay: ancestor breadcrumbs, the active line and the timer
pub fn render_focus_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let store = app.session.store();
    let timer = app.session.timer();

    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().borders(Borders::ALL).title(" Focus "), area);

    let mut breadcrumb = Vec::new();
    for ancestor in store.active_line_ancestors() {
        breadcrumb.push(Span::styled(ancestor.content.clone(), Style::default().fg(Color::Magenta)));
        breadcrumb.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let active = store.active_line();
    let line_style = if active.completed {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT | Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let timer_color = match timer.state() {
        TimerState::Running => Color::Green,
        TimerState::Idle => Color::Yellow,
        TimerState::Expired => Color::Red,
    };

    let b = &app.bindings;
    let text = vec![
        Line::from(breadcrumb),
        Line::from(""),
        Line::from(Span::styled(active.content.clone(), line_style)),
        Line::from(""),
        Line::from(vec![
            Span::styled(timer.format_remaining(), Style::default().fg(timer_color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", timer.state().label()), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} to Complete   {} to Exit   {} Start/Pause   {} Reset",
                b.label(Action::FocusOrComplete),
                b.label(Action::ExitFocus),
                b.label(Action::ToggleTimer),
                b.label(Action::ResetTimer),
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let height = text.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, chunks[1]);
}

/// Render the stash panel in the bottom-right corner of `area`
pub fn render_stash_panel(frame: &mut Frame, app: &App, area: Rect) {
    if area.height < 3 || area.width < 3 {
        return;
    }
    let stash = app.session.store().stash();
    let width = 36.min(area.width);
    let height = (stash.len() as u16 + 2).min(area.height / 2).max(3);
    let panel = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height + 1),
        width,
        height,
    )
    .intersection(area);

    let items: Vec<ListItem> = stash
        .iter()
        .enumerate()
        .map(|(i, entry)| ListItem::new(format!("{}. {}", i + 1, entry)).style(Style::default().fg(Color::Green)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Stash ")
            .style(Style::default().fg(Color::Magenta)),
    );

    frame.render_widget(Clear, panel);
    frame.render_widget(list, panel);
}

/// Render the stash picker popup
pub fn render_stash_picker(frame: &mut Frame, app: &App, area: Rect) {
    let stash = app.session.store().stash();
    let popup_area = centered_popup(60, stash.len() as u16 + 2, area);

    let items: Vec<ListItem> = stash
        .iter()
        .enumerate()
        .map(|(i, entry)| ListItem::new(format!("{}. {}", i + 1, entry)))
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.stash_selection));

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Unstash (Enter:Insert after active line | Esc:Close) ")
                .style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    frame.render_widget(Clear, popup_area);
    frame.render_stateful_widget(list, popup_area, &mut state);
}

/// Render a one-line input prompt
pub fn render_prompt_overlay(frame: &mut Frame, title: &str, input: &str, area: Rect) {
    let popup_area = centered_popup(60, 5, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let inner = Rect {
        x: popup_area.x + 1,
        y: popup_area.y + 2,
        width: popup_area.width.saturating_sub(2),
        height: 1,
    }
    .intersection(popup_area);

    let text = format!("{}▊", input);
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::Yellow));

    frame.render_widget(paragraph, inner);
}

/// Render the status bar
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let store = app.session.store();
    let timer = app.session.timer();

    let status_text = if let Some(message) = &app.status_message {
        format!(" {} ", message)
    } else {
        format!(
            " line {}/{} | stash {} | timer {} ({}){} ",
            store.active_index() + 1,
            store.len(),
            store.stash().len(),
            timer.format_remaining(),
            timer.state().label(),
            if store.shows_time_spent() { " | time view" } else { "" },
        )
    };

    let status_bar = Paragraph::new(status_text)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .alignment(Alignment::Center);

    frame.render_widget(status_bar, area);
}

/// Render the help screen overlay
pub fn render_help_screen(frame: &mut Frame, app: &App, size: Rect) {
    let b = &app.bindings;
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)))
    };
    let entry = |action: Action, description: &str| Line::from(format!("{:<14}{}", b.label(action), description));

    let help_text = vec![
        Line::from(""),
        heading("Navigation"),
        entry(Action::LineUp, "Previous line"),
        entry(Action::LineDown, "Next line"),
        Line::from(format!("{:<14}{}", "Click", "Select line")),
        Line::from(""),
        heading("Editing"),
        entry(Action::NewLine, "New line (nested under headers)"),
        entry(Action::Indent, "Indent line"),
        entry(Action::Outdent, "Outdent line"),
        Line::from(format!("{:<14}{}", "Backspace", "At line start: outdent, on empty line: delete")),
        Line::from(format!("{:<14}{}", ">text", "Make the line a header")),
        Line::from(format!("{:<14}{}", "-text", "Make the line a detail")),
        Line::from(""),
        heading("Focus"),
        entry(Action::FocusOrComplete, "Enter focus / complete line"),
        entry(Action::Uncomplete, "Uncomplete line"),
        entry(Action::ExitFocus, "Leave focus mode"),
        entry(Action::ToggleTimer, "Start / pause timer"),
        entry(Action::ResetTimer, "Reset timer"),
        entry(Action::EditTimer, "Set timer (MM:SS)"),
        entry(Action::ToggleTimeView, "Show time spent per line"),
        Line::from(""),
        heading("Stash"),
        entry(Action::StashCapture, "Stash an idea"),
        entry(Action::StashPicker, "Insert a stashed idea"),
        Line::from(""),
        entry(Action::Quit, "Quit"),
        Line::from(""),
        Line::from(Span::styled("Press Esc to close", Style::default().fg(Color::DarkGray))),
    ];

    let popup_width = 70.min(size.width);
    let popup_area = centered_popup(popup_width, help_text.len() as u16 + 2, size);

    let block = Block::default()
        .title(" Help - Keyboard Shortcuts ")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let inner = Rect {
        x: popup_area.x + 1,
        y: popup_area.y + 1,
        width: popup_area.width.saturating_sub(2),
        height: popup_area.height.saturating_sub(2),
    };

    let paragraph = Paragraph::new(help_text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, inner);
}

/// A popup of at most `width` x `height`, centered in `area` and never larger than it
fn centered_popup(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height).intersection(area)
}
