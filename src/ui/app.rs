//! Main TUI application state and logic

use crate::snapshot::{Playback, PlaybackError, Step};
use crate::ui::panes::{self, SourceScrollState};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tracing::debug;

/// Delay between automatic steps while playing
const PLAY_INTERVAL: Duration = Duration::from_millis(600);

fn previous_step(playback: &Playback) -> Option<&Step> {
    playback
        .position()
        .checked_sub(1)
        .and_then(|index| playback.trace().get(index))
}

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Output,
    Variables,
    CallStack,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> output -> variables -> call stack)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::CallStack,
            FocusedPane::CallStack => FocusedPane::Source,
        }
    }

    /// Move focus to the previous pane (counter-clockwise)
    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::CallStack,
            FocusedPane::Output => FocusedPane::Source,
            FocusedPane::Variables => FocusedPane::Output,
            FocusedPane::CallStack => FocusedPane::Variables,
        }
    }
}

/// The main application state
pub struct App {
    /// Cursor over the recorded trace
    pub playback: Playback,

    /// The source code that was traced
    pub source_code: String,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    /// Per-pane scroll offsets
    pub source_scroll: SourceScrollState,
    pub variables_scroll: usize,
    pub call_stack_scroll: usize,
    pub output_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Option<Instant>,
}

impl App {
    /// Create a new app positioned at the first step
    pub fn new(playback: Playback, source_code: String) -> Self {
        let status_message = if playback.is_empty() {
            "Nothing to replay: no steps were recorded".to_string()
        } else {
            "Ready!".to_string()
        };

        App {
            playback,
            source_code,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            variables_scroll: 0,
            call_stack_scroll: 0,
            output_scroll: usize::MAX,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: None,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                self.advance_playback();
            }

            // Poll with a timeout so auto-play keeps ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn advance_playback(&mut self) {
        match self.playback.step_forward() {
            Ok(_) => {
                self.status_message = "Playing...".to_string();
                self.output_scroll = usize::MAX;
            }
            Err(_) => {
                self.is_playing = false;
                self.status_message = "Playback complete".to_string();
            }
        }
        self.last_play_time = Instant::now();
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        // 4 panes in 2 columns, plus status bar at bottom
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Source (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Variables (top) | Call stack (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[1]);

        let step = self.playback.current();
        let previous = previous_step(&self.playback);
        let current_line = step.map_or(0, |s| s.line);

        panes::render_source_pane(
            frame,
            left_rows[0],
            &self.source_code,
            current_line,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let output = self.playback.output_until_current();
        panes::render_output_pane(
            frame,
            left_rows[1],
            &output,
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        panes::render_variables_pane(
            frame,
            right_rows[0],
            step,
            previous,
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        panes::render_call_stack_pane(
            frame,
            right_rows[1],
            step,
            self.focused_pane == FocusedPane::CallStack,
            &mut self.call_stack_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.playback.position(),
            self.playback.len(),
            self.is_playing,
        );
    }

    /// Report the outcome of a cursor move in the status bar
    fn apply_move(&mut self, result: Result<usize, PlaybackError>, done: &str) {
        match result {
            Ok(index) => {
                debug!(step = index, "moved playback cursor");
                self.status_message = done.to_string();
                self.output_scroll = usize::MAX;
            }
            Err(e) => {
                self.status_message = format!("Cannot move: {}", e);
            }
        }
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let stepped = (0..n).take_while(|_| self.playback.step_forward().is_ok()).count();
                self.status_message = format!("Stepped forward {} step(s)", stepped);
                self.output_scroll = usize::MAX;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::BackTab => {
                self.focused_pane = self.focused_pane.prev();
            }
            KeyCode::Left => {
                self.is_playing = false;
                let result = self.playback.step_backward().map(|s| s.step_index);
                self.apply_move(result, "Stepped backward");
            }
            KeyCode::Right => {
                self.is_playing = false;
                let result = self.playback.step_forward().map(|s| s.step_index);
                self.apply_move(result, "Stepped forward");
            }
            KeyCode::Char('s') => {
                self.is_playing = false;
                let result = self.playback.step_over().map(|s| s.step_index);
                self.apply_move(result, "Stepped over");
            }
            KeyCode::Up => self.scroll_focused(-1),
            KeyCode::Down => self.scroll_focused(1),
            KeyCode::Char(' ') => {
                // Toggle auto-play, debounced against key repeat
                let debounced = self
                    .last_space_press
                    .is_some_and(|t| t.elapsed() < Duration::from_millis(200));
                if !debounced {
                    self.last_space_press = Some(Instant::now());
                    self.toggle_play();
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                let result = self.playback.jump_to_end().map(|s| s.step_index);
                self.apply_move(result, "Jumped to end");
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                let result = self.playback.rewind_to_start().map(|s| s.step_index);
                self.apply_move(result, "Jumped to start");
            }
            _ => {}
        }
    }

    fn toggle_play(&mut self) {
        self.is_playing = !self.is_playing;
        if self.is_playing {
            // Take the first automatic step on the next tick
            self.last_play_time = Instant::now()
                .checked_sub(PLAY_INTERVAL)
                .unwrap_or_else(Instant::now);
            self.status_message = "Playing...".to_string();
        } else {
            self.status_message = "Paused".to_string();
        }
    }

    fn scroll_focused(&mut self, delta: isize) {
        let scroll = |offset: &mut usize| {
            *offset = if delta < 0 {
                offset.saturating_sub(1)
            } else {
                offset.saturating_add(1)
            };
        };

        match self.focused_pane {
            FocusedPane::Source => {
                // Scrolling down moves the current line up visually
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row = Some(if delta < 0 {
                        row.saturating_add(1)
                    } else {
                        row.saturating_sub(1)
                    });
                }
            }
            FocusedPane::Variables => scroll(&mut self.variables_scroll),
            FocusedPane::CallStack => scroll(&mut self.call_stack_scroll),
            FocusedPane::Output => scroll(&mut self.output_scroll),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Limits;
    use crate::snapshot::Trace;
    use crate::trace_source;
    use ratatui::backend::TestBackend;

    const SOURCE: &str = "package main

import \"fmt\"

func double(n int) int {
	return n * 2
}

func main() {
	x := double(3)
	fmt.Println(x)
}
";

    fn app() -> App {
        let trace = trace_source(SOURCE, Limits::default()).unwrap();
        App::new(Playback::new(trace), SOURCE.to_string())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::from(code));
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = app();
        let total = app.playback.len();

        press(&mut app, KeyCode::Right);
        assert_eq!(app.playback.position(), 1);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.playback.position(), 0);

        press(&mut app, KeyCode::Left);
        assert!(app.status_message.starts_with("Cannot move"));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.playback.position(), total - 1);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.playback.position(), 0);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.playback.position(), 3);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_step_over_skips_callee() {
        let mut app = app();
        // Step 0 is the func_call inside main; the callee's steps are deeper
        assert_eq!(app.playback.current().unwrap().function_name, "main");
        press(&mut app, KeyCode::Char('s'));
        let step = app.playback.current().unwrap();
        assert_eq!(step.function_name, "main");
        assert!(step.step_index > 1);
    }

    #[test]
    fn test_focus_cycles() {
        let mut app = app();
        for _ in 0..4 {
            press(&mut app, KeyCode::Tab);
        }
        assert_eq!(app.focused_pane, FocusedPane::Source);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focused_pane, FocusedPane::CallStack);
    }

    #[test]
    fn test_renders_without_panicking() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        press(&mut app, KeyCode::Enter);
        terminal.draw(|f| app.render(f)).unwrap();

        let mut empty = App::new(Playback::new(Trace::default()), String::new());
        terminal.draw(|f| empty.render(f)).unwrap();
        assert!(empty.status_message.starts_with("Nothing to replay"));
    }
}
