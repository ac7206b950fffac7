use crate::config::Keymap;
use crate::error::{Error, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Everything a configurable key can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    LineUp,
    LineDown,
    NewLine,
    Indent,
    Outdent,
    FocusOrComplete,
    Uncomplete,
    ExitFocus,
    StashCapture,
    StashPicker,
    ToggleTimer,
    ResetTimer,
    EditTimer,
    ToggleTimeView,
}

/// A single key combination such as `ctrl-f` or `shift-tab`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let (code, modifiers) = normalize(code, modifiers);
        Self { code, modifiers }
    }

    /// Parse `[ctrl-][alt-][shift-]key`. Returns `None` for unknown keys.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim().to_lowercase();
        let (prefix, key) = match spec.rsplit_once('-') {
            // "ctrl--" binds the minus key
            Some((prefix, "")) => (prefix.strip_suffix('-')?, "-"),
            Some((prefix, key)) => (prefix, key),
            None => ("", spec.as_str()),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in prefix.split('-').filter(|p| !p.is_empty()) {
            modifiers |= match part {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" | "meta" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let code = match key {
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "insert" => KeyCode::Insert,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            f if f.len() > 1 && f.starts_with('f') => KeyCode::F(f[1..].parse().ok()?),
            c if c.chars().count() == 1 => KeyCode::Char(c.chars().next()?),
            _ => return None,
        };

        Some(Self::new(code, modifiers))
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        normalize(key.code, key.modifiers) == (self.code, self.modifiers)
    }

    /// Human readable form used in hints, e.g. `Ctrl+F`
    pub fn label(&self) -> String {
        let mut label = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            label.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            label.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            label.push_str("Shift+");
        }
        let key = match self.code {
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "Shift+Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            other => format!("{:?}", other),
        };
        label.push_str(&key);
        label
    }
}

/// Bring equivalent key reports to one form: letters lowercase with an
/// explicit shift flag, shift dropped from symbols and back-tab.
fn normalize(code: KeyCode, modifiers: KeyModifiers) -> (KeyCode, KeyModifiers) {
    let mut modifiers = modifiers & (KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT);
    let code = match code {
        KeyCode::Char(c) if c.is_ascii_alphabetic() => {
            if c.is_ascii_uppercase() {
                modifiers |= KeyModifiers::SHIFT;
            }
            KeyCode::Char(c.to_ascii_lowercase())
        }
        KeyCode::Char(c) => {
            modifiers.remove(KeyModifiers::SHIFT);
            KeyCode::Char(c)
        }
        KeyCode::BackTab => {
            modifiers.remove(KeyModifiers::SHIFT);
            KeyCode::BackTab
        }
        other => other,
    };
    (code, modifiers)
}

/// Resolved key bindings, checked in keymap order
#[derive(Debug, Clone)]
pub struct Bindings {
    entries: Vec<(KeyBinding, Action)>,
}

impl Bindings {
    pub fn from_keymap(keymap: &Keymap) -> Result<Self> {
        let specs = [
            ("quit", &keymap.quit, Action::Quit),
            ("help", &keymap.help, Action::Help),
            ("line_up", &keymap.line_up, Action::LineUp),
            ("line_down", &keymap.line_down, Action::LineDown),
            ("new_line", &keymap.new_line, Action::NewLine),
            ("indent", &keymap.indent, Action::Indent),
            ("outdent", &keymap.outdent, Action::Outdent),
            ("focus_or_complete", &keymap.focus_or_complete, Action::FocusOrComplete),
            ("uncomplete", &keymap.uncomplete, Action::Uncomplete),
            ("exit_focus", &keymap.exit_focus, Action::ExitFocus),
            ("stash_capture", &keymap.stash_capture, Action::StashCapture),
            ("stash_picker", &keymap.stash_picker, Action::StashPicker),
            ("toggle_timer", &keymap.toggle_timer, Action::ToggleTimer),
            ("reset_timer", &keymap.reset_timer, Action::ResetTimer),
            ("edit_timer", &keymap.edit_timer, Action::EditTimer),
            ("toggle_time_view", &keymap.toggle_time_view, Action::ToggleTimeView),
        ];

        let entries = specs
            .into_iter()
            .map(|(name, spec, action)| {
                KeyBinding::parse(spec)
                    .map(|binding| (binding, action))
                    .ok_or_else(|| Error::InvalidBinding {
                        action: name.to_string(),
                        binding: spec.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        self.entries
            .iter()
            .find(|(binding, _)| binding.matches(key))
            .map(|(_, action)| *action)
    }

    pub fn label(&self, action: Action) -> String {
        self.entries
            .iter()
            .find(|(_, a)| *a == action)
            .map(|(binding, _)| binding.label())
            .unwrap_or_default()
    }
}

impl Default for Bindings {
    fn default() -> Self {
        // The default keymap only contains valid bindings
        Self::from_keymap(&Keymap::default()).unwrap_or(Self { entries: Vec::new() })
    }
}
