//! Terminal view for the demo loop using ratatui.
//!
//! `FrameSnapshot` is captured from the manager after the frame's queries so
//! rendering never touches binding state; `TerminalView` owns raw mode and
//! the alternate screen.

use crate::binding::BindKind;
use crate::error::{BindError, Result};
use crate::manager::Manager;
use crate::poll::InputPoller;
use ratatui::crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame, Terminal,
};
use std::collections::HashSet;
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// One row of the bindings table.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRow {
    pub handle: String,
    pub kind: Option<BindKind>,
    pub control: String,
    pub value: String,
    pub active: bool,
}

/// Everything the view needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub profiles: Vec<String>,
    pub active_index: Option<usize>,
    pub rows: Vec<ActionRow>,
    pub status: Option<String>,
    pub release_events: bool,
}

impl FrameSnapshot {
    /// Query every action of the active profile, in declaration order.
    pub fn capture(manager: &Manager, poller: &dyn InputPoller, frame: u64) -> Self {
        let mut rows = Vec::new();
        if let Some(profile) = manager.get_active_profile() {
            let mut seen = HashSet::new();
            for spec in profile.specs() {
                if !seen.insert(spec.handle.as_str()) {
                    continue;
                }
                rows.push(match profile.binding(&spec.handle) {
                    Some(binding) => {
                        let control = binding
                            .physical_control()
                            .map(|control| control.to_string())
                            .or_else(|| binding.axis_name().map(str::to_string))
                            .unwrap_or_else(|| "unbound".to_string());
                        let (value, active) = if manager.is_axis(&spec.handle) {
                            let smoothed = manager.get_axis(poller, &spec.handle);
                            let raw = manager.get_axis_raw(poller, &spec.handle);
                            (format!("{smoothed:+.2} (raw {raw:+.0})"), raw != 0.0)
                        } else if manager.get_button_down(poller, &spec.handle) {
                            ("down".to_string(), true)
                        } else if manager.get_button_up(poller, &spec.handle) {
                            ("up".to_string(), false)
                        } else if manager.get_button(poller, &spec.handle) {
                            ("held".to_string(), true)
                        } else {
                            ("-".to_string(), false)
                        };
                        ActionRow {
                            handle: spec.handle.clone(),
                            kind: Some(binding.kind()),
                            control,
                            value,
                            active,
                        }
                    }
                    None => ActionRow {
                        handle: spec.handle.clone(),
                        kind: None,
                        control: "-".to_string(),
                        value: "unresolved".to_string(),
                        active: false,
                    },
                });
            }
        }

        Self {
            frame,
            profiles: manager
                .profiles()
                .iter()
                .map(|profile| profile.name().to_string())
                .collect(),
            active_index: manager.active_index(),
            rows,
            status: None,
            release_events: false,
        }
    }
}

/// Colors for the demo view.
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub active_profile: Style,
    pub inactive_profile: Style,
    pub row_active: Style,
    pub row_idle: Style,
    pub status_bg: Color,
    pub status_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header: Style::default().add_modifier(Modifier::BOLD),
            active_profile: Style::default().fg(Color::Black).bg(Color::Yellow),
            inactive_profile: Style::default().fg(Color::DarkGray),
            row_active: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            row_idle: Style::default(),
            status_bg: Color::Blue,
            status_fg: Color::White,
        }
    }
}

/// Terminal session: raw mode, alternate screen, mouse and focus reporting.
pub struct TerminalView {
    terminal: Option<CrosstermTerminal>,
    theme: Theme,
    // Setup steps taken so far, so a partial initialize is still undone.
    raw_mode: bool,
    alternate_screen: bool,
    keyboard_enhanced: bool,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::with_theme(Theme::default())
    }

    pub fn with_theme(theme: Theme) -> Self {
        Self {
            terminal: None,
            theme,
            raw_mode: false,
            alternate_screen: false,
            keyboard_enhanced: false,
        }
    }

    /// Enter the alternate screen. Returns whether the terminal will report
    /// key releases.
    pub fn initialize(&mut self) -> Result<bool> {
        enable_raw_mode().map_err(|err| BindError::terminal("enable raw mode", err))?;
        self.raw_mode = true;

        let mut stdout = io::stdout();
        self.alternate_screen = true;
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;

        if supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
            self.keyboard_enhanced = true;
        }

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);

        Ok(self.keyboard_enhanced)
    }

    pub fn render(&mut self, snapshot: &FrameSnapshot) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            let theme = &self.theme;
            terminal.draw(move |frame| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Min(0),
                        Constraint::Length(1),
                    ])
                    .split(frame.size());

                Self::render_profiles(frame, chunks[0], snapshot, theme);
                Self::render_bindings(frame, chunks[1], snapshot, theme);
                Self::render_status(frame, chunks[2], snapshot, theme);
            })?;
        }
        Ok(())
    }

    fn render_profiles(frame: &mut Frame, area: Rect, snapshot: &FrameSnapshot, theme: &Theme) {
        let mut spans = vec![Span::styled("Profiles: ", theme.header)];
        for (index, name) in snapshot.profiles.iter().enumerate() {
            let style = if snapshot.active_index == Some(index) {
                theme.active_profile
            } else {
                theme.inactive_profile
            };
            spans.push(Span::styled(format!(" {name} "), style));
            spans.push(Span::raw(" "));
        }
        if snapshot.active_index.is_none() {
            spans.push(Span::styled("(no active profile)", theme.inactive_profile));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_bindings(frame: &mut Frame, area: Rect, snapshot: &FrameSnapshot, theme: &Theme) {
        let rows = snapshot.rows.iter().map(|row| {
            let kind = match row.kind {
                Some(BindKind::Digital) => "digital",
                Some(BindKind::Analog) => "analog",
                None => "?",
            };
            let style = if row.active {
                theme.row_active
            } else {
                theme.row_idle
            };
            Row::new(vec![
                row.handle.clone(),
                kind.to_string(),
                row.control.clone(),
                row.value.clone(),
            ])
            .style(style)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(14),
                Constraint::Length(9),
                Constraint::Length(16),
                Constraint::Min(10),
            ],
        )
        .header(Row::new(vec!["Action", "Kind", "Control", "Value"]).style(theme.header))
        .block(Block::default().borders(Borders::ALL).title("Bindings"));

        frame.render_widget(table, area);
    }

    fn render_status(frame: &mut Frame, area: Rect, snapshot: &FrameSnapshot, theme: &Theme) {
        let releases = if snapshot.release_events {
            "key releases reported"
        } else {
            "key releases simulated"
        };
        let status_text = format!(
            "frame {} | {} | {}",
            snapshot.frame,
            releases,
            snapshot.status.as_deref().unwrap_or("Tab: next profile")
        );
        let status_style = Style::default().bg(theme.status_bg).fg(theme.status_fg);
        frame.render_widget(Paragraph::new(status_text).style(status_style), area);
    }

    /// Undo every setup step that took effect. Later steps still run when an
    /// earlier one fails; the first error is returned.
    pub fn cleanup(&mut self) -> Result<()> {
        self.terminal = None;
        let mut stdout = io::stdout();
        let mut result = Ok(());

        if std::mem::take(&mut self.keyboard_enhanced) {
            result = result.and(execute!(stdout, PopKeyboardEnhancementFlags).map_err(BindError::from));
        }
        if std::mem::take(&mut self.raw_mode) {
            result = result.and(
                disable_raw_mode().map_err(|err| BindError::terminal("disable raw mode", err)),
            );
        }
        if std::mem::take(&mut self.alternate_screen) {
            result = result.and(
                execute!(
                    stdout,
                    LeaveAlternateScreen,
                    DisableMouseCapture,
                    DisableFocusChange
                )
                .map_err(BindError::from),
            );
        }
        result
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalView {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
