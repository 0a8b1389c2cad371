//! Terminal user interface for the recorder.
//!
//! Draws the live waveform, the countdown and recording indicator, the status
//! line and the clip list from a [`RecorderView`], and turns key presses into
//! [`UserCommand`]s.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, List, ListItem, ListState, Padding, Paragraph,
    },
};
use std::io::{self, Stdout};
use std::time::Duration;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use super::binding::{ControlMode, Severity};
use super::view::RecorderView;
use super::visualizations::{StrokeColor, WaveformFrame};

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const TRACE_IDLE: Color = Color::Rgb(206, 224, 220);
const TRACE_ACTIVE: Color = Color::Rgb(244, 67, 54);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);
const HELP_FG: Color = Color::Rgb(100, 100, 100);
const SUCCESS_FG: Color = Color::Rgb(76, 175, 80);

/// User input during a recorder session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// Start or stop recording (r or Enter)
    ToggleRecord,
    /// Switch to the next microphone (→)
    NextDevice,
    /// Switch to the previous microphone (←)
    PreviousDevice,
    /// Move the clip cursor down (↓)
    NextClip,
    /// Move the clip cursor up (↑)
    PreviousClip,
    /// Play the highlighted clip (p)
    PlayClip,
    /// Save the highlighted clip to the download directory (s)
    SaveClip,
    /// Delete the highlighted clip (x or Delete)
    DeleteClip,
    /// Duration field changed (digits, Backspace)
    DurationEdited,
    /// Leave the recorder (q, Escape or Ctrl+C)
    Quit,
}

/// Terminal front end of the recorder.
pub struct ClipdeckTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    duration: Input,
    cleaned_up: bool,
}

impl ClipdeckTui {
    /// Creates the UI and enters alternate screen mode.
    ///
    /// # Errors
    /// - If raw mode cannot be enabled
    /// - If the alternate screen cannot be entered
    pub fn new(default_duration_secs: u32) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            duration: Input::default().with_value(default_duration_secs.to_string()),
            cleaned_up: false,
        })
    }

    /// Raw contents of the duration field.
    pub fn duration_input(&self) -> &str {
        self.duration.value()
    }

    /// Reads every pending key press without blocking.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn drain_input(&mut self) -> Result<Vec<UserCommand>> {
        let mut commands = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(command) = self.handle_key(key) {
                    commands.push(command);
                }
            }
        }
        Ok(commands)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<UserCommand> {
        if key.kind != event::KeyEventKind::Press {
            return None;
        }
        let command = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                UserCommand::Quit
            }
            KeyCode::Char('q') | KeyCode::Esc => UserCommand::Quit,
            KeyCode::Char('r') | KeyCode::Enter => UserCommand::ToggleRecord,
            KeyCode::Right => UserCommand::NextDevice,
            KeyCode::Left => UserCommand::PreviousDevice,
            KeyCode::Down => UserCommand::NextClip,
            KeyCode::Up => UserCommand::PreviousClip,
            KeyCode::Char('p') => UserCommand::PlayClip,
            KeyCode::Char('s') => UserCommand::SaveClip,
            KeyCode::Char('x') | KeyCode::Delete => UserCommand::DeleteClip,
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if self.duration.value().len() < 4 {
                    self.duration.handle_event(&Event::Key(key));
                }
                UserCommand::DurationEdited
            }
            KeyCode::Backspace => {
                self.duration.handle_event(&Event::Key(key));
                UserCommand::DurationEdited
            }
            _ => return None,
        };
        tracing::trace!("Key {:?} -> {:?}", key.code, command);
        Some(command)
    }

    /// Draws one frame.
    ///
    /// `waveform` is asked for a frame sized to the waveform panel.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw<F>(&mut self, view: &RecorderView, waveform: F) -> Result<()>
    where
        F: FnOnce(f64, f64) -> Option<WaveformFrame>,
    {
        let duration_value = self.duration.value().to_string();
        let mut list_state = ListState::default().with_selected(view.clip_cursor());

        self.terminal.draw(|frame| {
            let area = frame.area();
            let padding = Block::default()
                .padding(Padding::horizontal(1))
                .style(Style::default().bg(BG).fg(FG));
            frame.render_widget(&padding, area);
            let inner = padding.inner(area);

            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(6),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Percentage(30),
                    Constraint::Length(1),
                ])
                .split(inner);

            Self::render_device_line(frame, layout[0], view);

            let wave_block = Block::default().borders(Borders::ALL).title(" Input ");
            let wave_area = wave_block.inner(layout[1]);
            frame.render_widget(wave_block, layout[1]);
            if let Some(trace) = waveform(wave_area.width as f64, wave_area.height as f64) {
                Self::render_waveform(frame, wave_area, &trace);
            }

            Self::render_transport(frame, layout[2], view, &duration_value);
            Self::render_status(frame, layout[3], view);
            Self::render_clips(frame, layout[4], view, &mut list_state);

            let help = Paragraph::new(
                "r record/stop · 0-9 duration · ←→ mic · ↑↓ clip · p play · s save · x delete · q quit",
            )
            .alignment(Alignment::Center)
            .style(Style::default().fg(HELP_FG));
            frame.render_widget(help, layout[5]);
        })?;

        Ok(())
    }

    fn render_device_line(frame: &mut Frame, area: Rect, view: &RecorderView) {
        let label = view.selected_device_label().unwrap_or("no microphone");
        let count = view.devices.len();
        let line = Line::from(vec![
            Span::styled("Microphone: ", Style::default().fg(HELP_FG)),
            Span::raw(format!("◀ {label} ▶")),
            Span::styled(format!("  ({count} available)"), Style::default().fg(HELP_FG)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_waveform(frame: &mut Frame, area: Rect, trace: &WaveformFrame) {
        let color = match trace.stroke {
            StrokeColor::Active => TRACE_ACTIVE,
            StrokeColor::Neutral => TRACE_IDLE,
        };
        let height = trace.height;
        let canvas = Canvas::default()
            .marker(Marker::Braille)
            .background_color(BG)
            .x_bounds([0.0, trace.width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for segment in trace.points.windows(2) {
                    let (x1, y1) = segment[0];
                    let (x2, y2) = segment[1];
                    // Canvas y grows upwards; trace y grows downwards.
                    ctx.draw(&CanvasLine::new(x1, height - y1, x2, height - y2, color));
                }
            });
        frame.render_widget(canvas, area);
    }

    fn render_transport(frame: &mut Frame, area: Rect, view: &RecorderView, duration: &str) {
        let indicator = match view.mode {
            ControlMode::Stop => Span::styled("● REC ", Style::default().fg(Color::Red)),
            ControlMode::Record => Span::styled("○ READY ", Style::default().fg(HELP_FG)),
        };

        let action = match (view.mode, view.record_enabled) {
            (ControlMode::Stop, _) => Span::styled(
                "[r] Stop",
                Style::default().fg(FG).bg(Color::Red),
            ),
            (ControlMode::Record, true) => Span::styled("[r] Record", Style::default().fg(FG)),
            (ControlMode::Record, false) => {
                Span::styled("[r] Record", Style::default().fg(HELP_FG))
            }
        };

        let line = Line::from(vec![
            indicator,
            Span::raw(view.countdown.clone()),
            Span::raw("   Duration: "),
            Span::styled(format!("{duration:>3}"), Style::default().bg(HIGHLIGHT_BG)),
            Span::raw("s   "),
            action,
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_status(frame: &mut Frame, area: Rect, view: &RecorderView) {
        let Some((message, severity)) = &view.status else {
            return;
        };
        let style = match severity {
            Severity::Error => Style::default().fg(FG).bg(Color::Rgb(255, 0, 0)),
            Severity::Success => Style::default().fg(SUCCESS_FG),
            Severity::Neutral => Style::default().fg(HELP_FG),
        };
        frame.render_widget(Paragraph::new(message.as_str()).style(style), area);
    }

    fn render_clips(frame: &mut Frame, area: Rect, view: &RecorderView, state: &mut ListState) {
        let items: Vec<ListItem> = view
            .clips
            .iter()
            .map(|clip| {
                let kib = clip.size_bytes as f64 / 1024.0;
                ListItem::new(Line::from(vec![
                    Span::raw(clip.name.clone()),
                    Span::styled(
                        format!("  {}s · {kib:.0} KiB", clip.duration_secs),
                        Style::default().fg(HELP_FG),
                    ),
                ]))
            })
            .collect();

        let title = format!(" Clips ({}) ", view.clips.len());
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().bg(HIGHLIGHT_BG).fg(FG))
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, state);
    }

    /// Restores the terminal.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled
    /// - If the cursor cannot be shown
    pub fn cleanup(&mut self) -> Result<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;

        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ClipdeckTui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
