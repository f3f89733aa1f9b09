//! Keyboard shortcuts of the demo.
//!
//! Single source of truth for the help bar and for the key dispatch in the
//! app loop.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Primary key for this shortcut
    pub key: KeyCode,
    /// Alternative key
    pub alt_key: Option<KeyCode>,
    /// Whether Ctrl has to be held
    pub ctrl: bool,
    pub action: Action,
    /// Human-readable description of what this shortcut does
    pub description: &'static str,
    pub category: ShortcutCategory,
    /// Context where this shortcut is active
    pub context: ShortcutContext,
}

/// What a shortcut does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TapCta,
    /// Tap the step with this index
    TapStep(usize),
    Restart,
}

/// Categories for organizing shortcuts, in help bar order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShortcutCategory {
    General,
    Navigation,
    Actions,
}

/// Contexts where shortcuts are active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutContext {
    /// A step is expanded and takes input
    Form,
    /// The form was submitted
    Completed,
}

impl ShortcutCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutCategory::General => "General",
            ShortcutCategory::Navigation => "Navigation",
            ShortcutCategory::Actions => "Actions",
        }
    }
}

impl Shortcut {
    /// Format key for display (e.g., "Esc", "Ctrl+n", "q/Esc")
    pub fn key_display(&self) -> String {
        let primary = format_keycode(&self.key);
        let primary = if self.ctrl {
            format!("Ctrl+{primary}")
        } else {
            primary
        };
        match &self.alt_key {
            Some(alt) => format!("{}/{}", primary, format_keycode(alt)),
            None => primary,
        }
    }

    /// Whether `key` triggers this shortcut
    pub fn matches(&self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl != self.ctrl {
            return false;
        }
        key.code == self.key || self.alt_key == Some(key.code)
    }
}

/// Format a KeyCode for display
fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        _ => format!("{key:?}"),
    }
}

const fn tap_step(index: usize, f: u8) -> Shortcut {
    Shortcut {
        key: KeyCode::F(f),
        alt_key: None,
        ctrl: false,
        action: Action::TapStep(index),
        description: "Open step",
        category: ShortcutCategory::Navigation,
        context: ShortcutContext::Form,
    }
}

/// Static registry of all keyboard shortcuts
pub static SHORTCUTS: &[Shortcut] = &[
    // === Form Context ===
    Shortcut {
        key: KeyCode::Esc,
        alt_key: None,
        ctrl: false,
        action: Action::Quit,
        description: "Quit",
        category: ShortcutCategory::General,
        context: ShortcutContext::Form,
    },
    Shortcut {
        key: KeyCode::Char('c'),
        alt_key: None,
        ctrl: true,
        action: Action::Quit,
        description: "Quit",
        category: ShortcutCategory::General,
        context: ShortcutContext::Form,
    },
    Shortcut {
        key: KeyCode::Char('n'),
        alt_key: None,
        ctrl: true,
        action: Action::TapCta,
        description: "Press the CTA button",
        category: ShortcutCategory::Actions,
        context: ShortcutContext::Form,
    },
    tap_step(0, 1),
    tap_step(1, 2),
    tap_step(2, 3),
    tap_step(3, 4),
    // === Completed Context ===
    Shortcut {
        key: KeyCode::Char('r'),
        alt_key: None,
        ctrl: false,
        action: Action::Restart,
        description: "Start over",
        category: ShortcutCategory::Actions,
        context: ShortcutContext::Completed,
    },
    Shortcut {
        key: KeyCode::Char('q'),
        alt_key: Some(KeyCode::Esc),
        ctrl: false,
        action: Action::Quit,
        description: "Quit",
        category: ShortcutCategory::General,
        context: ShortcutContext::Completed,
    },
];

/// Get all shortcuts for a given context
pub fn shortcuts_for_context(context: ShortcutContext) -> impl Iterator<Item = &'static Shortcut> {
    SHORTCUTS.iter().filter(move |s| s.context == context)
}

/// First shortcut in `context` triggered by `key`
pub fn action_for(context: ShortcutContext, key: &KeyEvent) -> Option<Action> {
    shortcuts_for_context(context)
        .find(|s| s.matches(key))
        .map(|s| s.action)
}

/// One-line help for the status bar, skipping per-step entries beyond `steps`
pub fn help_line(context: ShortcutContext, steps: usize) -> String {
    let mut parts: Vec<(ShortcutCategory, String)> = Vec::new();
    let mut step_keys: Vec<String> = Vec::new();
    for shortcut in shortcuts_for_context(context) {
        match shortcut.action {
            Action::TapStep(index) if index < steps => step_keys.push(format_keycode(&shortcut.key)),
            Action::TapStep(_) => {}
            // Esc already quits
            Action::Quit if shortcut.ctrl => {}
            _ => parts.push((
                shortcut.category,
                format!("{} {}", shortcut.key_display(), shortcut.description),
            )),
        }
    }
    if let (Some(first), Some(last)) = (step_keys.first(), step_keys.last()) {
        parts.push((ShortcutCategory::Navigation, format!("{first}-{last} Open step")));
    }
    parts.sort_by_key(|(category, _)| *category);
    parts
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join("  ")
}
