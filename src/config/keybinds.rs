//! Keyboard shortcut definitions

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keyboard shortcut configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    // Global
    pub quit: KeyBind,
    pub help: KeyBind,
    pub refresh: KeyBind,

    // Tab navigation
    pub next_tab: KeyBind,
    pub prev_tab: KeyBind,

    // List and tree navigation (arrow keys primary, vi alternative)
    pub up: KeyBind,
    pub down: KeyBind,
    pub expand: KeyBind,
    pub collapse: KeyBind,
    pub toggle: KeyBind,

    // Actions
    pub select: KeyBind,
    pub cancel: KeyBind,
    pub search: KeyBind,
    pub choose_root: KeyBind,
    pub details: KeyBind,
    pub assign: KeyBind,
    pub next_page: KeyBind,
    pub prev_page: KeyBind,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            // Global
            quit: KeyBind::new(KeyCode::Char('q'), KeyModifiers::NONE),
            help: KeyBind::new(KeyCode::Char('?'), KeyModifiers::NONE),
            refresh: KeyBind::new(KeyCode::Char('r'), KeyModifiers::NONE),

            // Tab navigation
            next_tab: KeyBind::new(KeyCode::Tab, KeyModifiers::NONE),
            prev_tab: KeyBind::new(KeyCode::BackTab, KeyModifiers::SHIFT),

            // Navigation
            up: KeyBind::new(KeyCode::Up, KeyModifiers::NONE),
            down: KeyBind::new(KeyCode::Down, KeyModifiers::NONE),
            expand: KeyBind::new(KeyCode::Right, KeyModifiers::NONE),
            collapse: KeyBind::new(KeyCode::Left, KeyModifiers::NONE),
            toggle: KeyBind::new(KeyCode::Char(' '), KeyModifiers::NONE),

            // Actions
            select: KeyBind::new(KeyCode::Enter, KeyModifiers::NONE),
            cancel: KeyBind::new(KeyCode::Esc, KeyModifiers::NONE),
            search: KeyBind::new(KeyCode::Char('/'), KeyModifiers::NONE),
            choose_root: KeyBind::new(KeyCode::Char('c'), KeyModifiers::NONE),
            details: KeyBind::new(KeyCode::Char('i'), KeyModifiers::NONE),
            assign: KeyBind::new(KeyCode::Char('a'), KeyModifiers::NONE),
            next_page: KeyBind::new(KeyCode::Char(']'), KeyModifiers::NONE),
            prev_page: KeyBind::new(KeyCode::Char('['), KeyModifiers::NONE),
        }
    }
}

/// A single key binding
#[derive(Debug, Clone)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        self.code == code && self.modifiers == modifiers
    }

    pub fn matches_event(&self, event: &KeyEvent) -> bool {
        self.matches(event.code, event.modifiers)
    }
}
