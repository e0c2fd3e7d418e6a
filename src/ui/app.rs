//! Main TUI application

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame, Terminal,
};
use tokio::sync::{broadcast, mpsc};

use crate::app::events::{is_quit, tab_delta, tab_number, AppEvent, EventHandler};
use crate::app::notifications::{Toast, ToastLevel};
use crate::app::state::{AppMessage, AppState, UiUpdateSignal};
use crate::config::KeyBindings;
use crate::ui::layout::{AppLayout, DialogLayout};
use crate::ui::tabs::{
    annotations::AnnotationsTab, categories::CategoriesTab, pechas::PechasTab,
};
use crate::ui::theme::Theme;
use crate::ui::widgets::statusbar::{build_status_line, StatusItem};
use crate::utils::{format_timestamp, truncate};

/// Tab identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabId {
    Pechas = 0,
    Categories = 1,
    Annotations = 2,
}

impl TabId {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Pechas => "Pechas",
            Self::Categories => "Categories",
            Self::Annotations => "Annotations",
        }
    }

    pub fn all() -> &'static [TabId] {
        &[Self::Pechas, Self::Categories, Self::Annotations]
    }
}

/// Values shown in the status bar, read without blocking the draw
struct StatusSnapshot {
    target: Option<String>,
    last_refresh: Option<String>,
    loading: bool,
    toast: Option<Toast>,
}

/// Main TUI application
pub struct TuiApp {
    state: Arc<AppState>,
    state_tx: mpsc::Sender<AppMessage>,
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
    ui_update_rx: broadcast::Receiver<UiUpdateSignal>,
    keys: KeyBindings,

    // UI state
    current_tab: usize,
    theme: Theme,
    show_help: bool,

    // Tabs
    pechas_tab: PechasTab,
    categories_tab: CategoriesTab,
    annotations_tab: AnnotationsTab,
}

impl TuiApp {
    pub fn new(state: Arc<AppState>, state_tx: mpsc::Sender<AppMessage>) -> Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let ui_update_rx = state.ui_update_tx.subscribe();
        let theme = Theme::by_name(&state.settings.theme);

        Ok(Self {
            pechas_tab: PechasTab::new(&state, &state_tx),
            categories_tab: CategoriesTab::new(&state),
            annotations_tab: AnnotationsTab::new(),

            state,
            state_tx,
            terminal,
            event_handler: EventHandler::new(Duration::from_millis(100)),
            ui_update_rx,
            keys: KeyBindings::default(),

            current_tab: 0,
            theme,
            show_help: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            // Drain update signals; caches are version-checked below
            loop {
                match self.ui_update_rx.try_recv() {
                    Ok(UiUpdateSignal::CategoryAssigned { pecha_id, category_id }) => {
                        tracing::debug!("UI saw assignment {} -> {}", pecha_id, category_id);
                    }
                    Ok(_) => {}
                    Err(broadcast::error::TryRecvError::Lagged(n)) => {
                        tracing::debug!("UI skipped {} update signals", n);
                    }
                    Err(_) => break,
                }
            }

            self.update_tab_caches().await;

            self.draw()?;

            if let Some(event) = self.event_handler.next() {
                match event {
                    AppEvent::Key(key) => {
                        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
                            break;
                        }

                        if self.show_help {
                            self.show_help = false;
                            continue;
                        }

                        let tab = TabId::all()[self.current_tab];
                        if !self.tab_capturing_input(tab) {
                            if is_quit(&key) {
                                break;
                            }

                            if self.keys.help.matches_event(&key) || key.code == KeyCode::F(1) {
                                self.show_help = true;
                                continue;
                            }

                            if let Some(tab) = tab_number(&key) {
                                if tab < TabId::all().len() {
                                    self.current_tab = tab;
                                }
                                continue;
                            }

                            if let Some(delta) = tab_delta(&key) {
                                let len = TabId::all().len() as i32;
                                self.current_tab =
                                    ((self.current_tab as i32 + delta).rem_euclid(len)) as usize;
                                continue;
                            }
                        }

                        match tab {
                            TabId::Pechas => {
                                self.pechas_tab
                                    .handle_key(key, &self.state, &self.state_tx, &self.keys)
                                    .await
                            }
                            TabId::Categories => {
                                self.categories_tab
                                    .handle_key(key, &self.state, &self.state_tx, &self.keys)
                                    .await
                            }
                            TabId::Annotations => {
                                self.annotations_tab
                                    .handle_key(key, &self.state, &self.state_tx, &self.keys)
                                    .await
                            }
                        }
                    }
                    AppEvent::Resize(_, _) => {}
                    AppEvent::Tick => {
                        if self.state.expire_toasts(Utc::now()).await {
                            self.state.notify_ui(UiUpdateSignal::ToastsUpdated);
                        }
                    }
                }
            }
        }

        tracing::info!("Shutting down");
        Ok(())
    }

    fn tab_capturing_input(&self, tab: TabId) -> bool {
        match tab {
            TabId::Pechas => self.pechas_tab.capturing_input(),
            TabId::Categories => self.categories_tab.capturing_input(),
            TabId::Annotations => self.annotations_tab.capturing_input(),
        }
    }

    async fn update_tab_caches(&mut self) {
        self.pechas_tab.update_cache(&self.state).await;
        self.categories_tab.update_cache(&self.state).await;
        self.annotations_tab.update_cache(&self.state).await;
    }

    fn status_snapshot(&self) -> StatusSnapshot {
        let policy = &self.state.settings.languages;
        let target = self
            .state
            .target
            .try_read()
            .ok()
            .and_then(|t| t.as_ref().map(|p| p.to_option(policy).label));
        let last_refresh = self
            .state
            .last_refresh
            .try_read()
            .ok()
            .and_then(|t| t.as_ref().map(format_timestamp));
        let loading = self
            .state
            .loading
            .try_read()
            .map(|l| !l.is_empty())
            .unwrap_or(false);
        let toast = self
            .state
            .toasts
            .try_read()
            .ok()
            .and_then(|t| t.back().cloned());

        StatusSnapshot {
            target,
            last_refresh,
            loading,
            toast,
        }
    }

    fn draw(&mut self) -> Result<()> {
        let status = self.status_snapshot();
        let theme = &self.theme;
        let current_tab = self.current_tab;
        let show_help = self.show_help;
        let backend_url = self.state.api.base_url().to_string();

        self.terminal.draw(|frame| {
            let layout = AppLayout::new(frame.area());

            // Tab bar
            let tab_titles: Vec<Line> = TabId::all()
                .iter()
                .enumerate()
                .map(|(i, tab)| {
                    let style = if i == current_tab {
                        theme.tab_active()
                    } else {
                        theme.tab_inactive()
                    };
                    Line::from(Span::styled(format!(" {} {} ", i + 1, tab.title()), style))
                })
                .collect();

            let tabs = Tabs::new(tab_titles)
                .select(current_tab)
                .highlight_style(theme.tab_active())
                .divider("|");

            frame.render_widget(tabs, layout.tabs);

            // Content
            let content_block = Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border())
                .title(format!(" {} ", TabId::all()[current_tab].title()));

            let inner = content_block.inner(layout.content);
            frame.render_widget(content_block, layout.content);

            match TabId::all()[current_tab] {
                TabId::Pechas => self.pechas_tab.render(frame, inner, theme),
                TabId::Categories => self.categories_tab.render(frame, inner, theme),
                TabId::Annotations => self.annotations_tab.render(frame, inner, theme),
            }

            // Status bar
            let width = layout.status.width as usize;
            let items = vec![
                StatusItem::new(
                    "Target",
                    &truncate(status.target.as_deref().unwrap_or("none"), width / 3),
                )
                .with_style(theme.highlight()),
                StatusItem::new("API", &backend_url).with_style(theme.accent()),
                StatusItem::new(
                    "Refreshed",
                    status.last_refresh.as_deref().unwrap_or("never"),
                )
                .with_style(theme.normal()),
                if status.loading {
                    StatusItem::new("", "loading…").with_style(theme.warning())
                } else {
                    StatusItem::new("", "idle").with_style(theme.dim())
                },
                StatusItem::new("", "?=help q=quit").with_style(theme.dim()),
            ];
            frame.render_widget(Paragraph::new(build_status_line(items, "│")), layout.status);

            if let Some(toast) = &status.toast {
                render_toast(frame, layout.content, toast, theme);
            }

            // Help overlay
            if show_help {
                render_help(frame, theme);
            }
        })?;

        Ok(())
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Newest toast, drawn in the bottom-right corner of the content area
fn render_toast(frame: &mut Frame, content: Rect, toast: &Toast, theme: &Theme) {
    let (style, icon) = match toast.level {
        ToastLevel::Info => (theme.info(), "ℹ"),
        ToastLevel::Success => (theme.success(), "✓"),
        ToastLevel::Error => (theme.error(), "✗"),
    };
    let text = format!(" {} {} ", icon, toast.message);
    let width = (text.chars().count() as u16 + 2).min(content.width.saturating_sub(2));
    if width < 4 || content.height < 4 {
        return;
    }
    let area = Rect::new(
        content.x + content.width - width - 1,
        content.y + content.height - 4,
        width,
        3,
    );

    frame.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).border_style(style);
    frame.render_widget(Paragraph::new(text).style(style).block(block), area);
}

fn render_help(frame: &mut Frame, theme: &Theme) {
    let area = frame.area();
    let help_area = DialogLayout::centered(area, 64, 26).dialog;

    let help_text = [
        "",
        "  Pecha Admin - Keyboard Shortcuts",
        "  ────────────────────────────────",
        "",
        "  Global:",
        "    1-3, Tab      Switch tabs",
        "    r             Refresh current tab",
        "    ?             This help",
        "    q, Ctrl-C     Quit",
        "",
        "  Lists and search:",
        "    ↑/↓, j/k      Navigate",
        "    Enter, /      Open search",
        "    Esc           Close search",
        "    [ ]           Previous/next page of pechas",
        "",
        "  Categories:",
        "    c             Choose root category",
        "    ←/→, Space    Collapse/expand",
        "    i             Category details",
        "    Enter, a      Assign to target pecha",
        "",
        "  Press any key to close",
    ];

    let help_block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(theme.border_focused())
        .style(theme.normal());

    let help_content = Paragraph::new(help_text.join("\n"))
        .block(help_block)
        .style(theme.normal());

    frame.render_widget(Clear, help_area);
    frame.render_widget(help_content, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_order_matches_number_keys() {
        let titles: Vec<&str> = TabId::all().iter().map(|t| t.title()).collect();
        assert_eq!(titles, vec!["Pechas", "Categories", "Annotations"]);
        for (i, tab) in TabId::all().iter().enumerate() {
            assert_eq!(*tab as usize, i);
        }
    }
}
