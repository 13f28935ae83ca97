use serde::{Deserialize, Serialize};

/// User settings, read from settings.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub spellcheck_enabled: bool,
    /// Keyboard shortcuts shown in the help panel, in display order
    #[serde(default = "default_hotkeys")]
    pub hotkeys: Vec<Hotkey>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            spellcheck_enabled: false,
            hotkeys: default_hotkeys(),
        }
    }
}

impl Settings {
    pub fn toggle_spellcheck(&mut self) {
        self.spellcheck_enabled = !self.spellcheck_enabled;
    }

    /// Rebind the combo for `action`. Unknown actions are ignored.
    /// Returns whether a hotkey was changed.
    pub fn update_hotkey(&mut self, action: &str, combo: &str) -> bool {
        match self.hotkeys.iter_mut().find(|h| h.action == action) {
            Some(hotkey) => {
                hotkey.combo = combo.to_string();
                true
            }
            None => false,
        }
    }

    pub fn hotkey(&self, action: &str) -> Option<&Hotkey> {
        self.hotkeys.iter().find(|h| h.action == action)
    }
}

/// A display-only shortcut entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotkey {
    pub action: String,
    pub combo: String,
}

impl Hotkey {
    pub fn new(action: &str, combo: &str) -> Self {
        Hotkey {
            action: action.to_string(),
            combo: combo.to_string(),
        }
    }
}

fn default_hotkeys() -> Vec<Hotkey> {
    vec![
        Hotkey::new("Add New Task", "Enter"),
        Hotkey::new("New Line", "Shift+Enter"),
        Hotkey::new("Toggle Complete", "Ctrl+Enter"),
        Hotkey::new("Navigate", "Arrow Up / Down"),
        Hotkey::new("Delete Task", "Backspace / Delete"),
        Hotkey::new("Reorder Task", "Ctrl+Arrow Up / Down"),
    ]
}
