//! Key bindings loaded from `shortcut.toml`.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All key bindings, grouped by screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortcuts {
    pub global: GlobalShortcuts,
    pub form: FormShortcuts,
    pub photos: PhotoShortcuts,
    pub about: AboutShortcuts,
    pub settings: SettingsShortcuts,
    pub input_box: InputBoxShortcuts,
}

/// Active on every screen while no input box is open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalShortcuts {
    pub quit: Vec<String>,
    pub form: Vec<String>,
    pub breakdown: Vec<String>,
    pub photos: Vec<String>,
    pub about: Vec<String>,
    pub settings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormShortcuts {
    pub up: Vec<String>,
    pub down: Vec<String>,
    /// Open the input box, cycle a select, or flip a toggle.
    pub edit: Vec<String>,
    pub next_option: Vec<String>,
    pub prev_option: Vec<String>,
    pub submit: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoShortcuts {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub add: Vec<String>,
    /// Drop the current set and attach new files.
    pub replace: Vec<String>,
    pub remove: Vec<String>,
    pub clear: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AboutShortcuts {
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsShortcuts {
    pub cancel: Vec<String>,
    pub save: Vec<String>,
    pub endpoint: Vec<String>,
    pub outbox: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputBoxShortcuts {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub backspace: Vec<String>,
    pub delete: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub home: Vec<String>,
    pub end: Vec<String>,
    pub clear_line: Vec<String>,
}

impl Shortcuts {
    /// Read from TOML, falling back to defaults when the file is absent.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }
}

fn keys(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            global: GlobalShortcuts {
                quit: keys(&["q"]),
                form: keys(&["1"]),
                breakdown: keys(&["2"]),
                photos: keys(&["3"]),
                about: keys(&["4"]),
                settings: keys(&["5"]),
            },
            form: FormShortcuts {
                up: keys(&["Up", "k"]),
                down: keys(&["Down", "j"]),
                edit: keys(&["Enter", "Space"]),
                next_option: keys(&["Right", "l"]),
                prev_option: keys(&["Left", "h"]),
                submit: keys(&["s", "Ctrl+s"]),
            },
            photos: PhotoShortcuts {
                up: keys(&["Up", "k"]),
                down: keys(&["Down", "j"]),
                add: keys(&["a"]),
                replace: keys(&["r"]),
                remove: keys(&["d", "Delete"]),
                clear: keys(&["x"]),
            },
            about: AboutShortcuts {
                next: keys(&["Right", "n", "PageDown"]),
                prev: keys(&["Left", "p", "PageUp"]),
            },
            settings: SettingsShortcuts {
                cancel: keys(&["Esc"]),
                save: keys(&["Enter"]),
                endpoint: keys(&["e"]),
                outbox: keys(&["o"]),
            },
            input_box: InputBoxShortcuts {
                confirm: keys(&["Enter"]),
                cancel: keys(&["Esc"]),
                backspace: keys(&["Backspace"]),
                delete: keys(&["Delete"]),
                left: keys(&["Left"]),
                right: keys(&["Right"]),
                home: keys(&["Home"]),
                end: keys(&["End"]),
                clear_line: keys(&["Ctrl+u"]),
            },
        }
    }
}

/// Whether the key event matches any of the binding strings.
pub fn matches_shortcut(key: &KeyEvent, shortcuts: &[String]) -> bool {
    shortcuts.iter().any(|s| matches_single_shortcut(key, s))
}

/// Binding format: optional `Ctrl+`/`Alt+`/`Shift+` prefixes and a key name
/// or single character, e.g. `Ctrl+s`, `PageDown`, `q`.
fn matches_single_shortcut(key: &KeyEvent, shortcut: &str) -> bool {
    let mut parts: Vec<&str> = shortcut.split('+').collect();
    // "Ctrl++" style bindings split into an empty tail; treat it as '+'.
    if parts.len() > 1 && parts.last() == Some(&"") {
        parts.pop();
        if let Some(last) = parts.last_mut() {
            if last.is_empty() {
                *last = "+";
            } else {
                parts.push("+");
            }
        }
    }
    let Some((key_str, modifier_strs)) = parts.split_last() else {
        return false;
    };

    let mut expected = KeyModifiers::empty();
    for m in modifier_strs {
        match m.to_ascii_lowercase().as_str() {
            "ctrl" => expected |= KeyModifiers::CONTROL,
            "alt" => expected |= KeyModifiers::ALT,
            "shift" => expected |= KeyModifiers::SHIFT,
            _ => return false,
        }
    }
    if key.modifiers != expected {
        return false;
    }

    match key_str.to_ascii_lowercase().as_str() {
        "enter" => key.code == KeyCode::Enter,
        "esc" => key.code == KeyCode::Esc,
        "tab" => key.code == KeyCode::Tab,
        "space" => key.code == KeyCode::Char(' '),
        "backspace" => key.code == KeyCode::Backspace,
        "delete" => key.code == KeyCode::Delete,
        "up" => key.code == KeyCode::Up,
        "down" => key.code == KeyCode::Down,
        "left" => key.code == KeyCode::Left,
        "right" => key.code == KeyCode::Right,
        "home" => key.code == KeyCode::Home,
        "end" => key.code == KeyCode::End,
        "pageup" => key.code == KeyCode::PageUp,
        "pagedown" => key.code == KeyCode::PageDown,
        _ => {
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => key.code == KeyCode::Char(c),
                _ => false,
            }
        }
    }
}
