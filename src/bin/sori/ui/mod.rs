//! Terminal front end: draws the shown instrument and turns key events into
//! session input.

mod hold;
mod keys;
mod state;
mod transport;
mod waveform;

use std::{
    io,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use color_eyre::eyre::{eyre, Result as EyreResult};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use sori::{router::key_binding, session::spawn_loader, Action, Error, InputEvent, Instrument, Outcome, Session};
use tracing::{error, info, warn};

use hold::KeyHold;
pub use state::Snapshot;

use keys::render_keys;
use transport::{render_transport, AudioStats};
use waveform::render_waveform;

/// Samples shown by the oscilloscope
const VIS_BUFFER_SIZE: usize = 1024;

const HELP: &str = " [1/2/3 Tab] page  [Space] metronome  [←/→] tempo ±1  [↓/↑] ±10  \
                    [R] record  [Y] play take  [L] save take  [Esc] quit";

pub struct UiApp {
    session: Arc<Mutex<Session>>,
    scope_rx: Consumer<f32>,
    scope: Vec<f32>,
    /// Held keys, for terminals without release events.
    hold: KeyHold,
    releases_reported: bool,
    loader_started: bool,
    status: String,
    should_quit: bool,
}

impl UiApp {
    pub fn new(session: Arc<Mutex<Session>>, scope_rx: Consumer<f32>, key_timeout: Duration) -> Self {
        Self {
            session,
            scope_rx,
            scope: vec![0.0; VIS_BUFFER_SIZE],
            hold: KeyHold::new(key_timeout),
            releases_reported: false,
            loader_started: false,
            status: String::new(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.releases_reported = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if self.releases_reported {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        } else {
            info!("terminal does not report key releases, holding keys on a timeout");
        }

        let result = self.event_loop(terminal);

        if self.releases_reported {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
        }
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_scope();
            self.release_expired();

            let snapshot = {
                let session = self
                    .session
                    .lock()
                    .map_err(|_| eyre!("session lock poisoned"))?;
                Snapshot::capture(&session)
            };
            terminal.draw(|frame| self.render(frame, &snapshot))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn poll_scope(&mut self) {
        let mut fresh = Vec::new();
        while let Ok(sample) = self.scope_rx.pop() {
            fresh.push(sample);
        }
        if fresh.is_empty() {
            return;
        }

        self.scope.extend(fresh);
        if self.scope.len() > VIS_BUFFER_SIZE {
            let excess = self.scope.len() - VIS_BUFFER_SIZE;
            self.scope.drain(0..excess);
        }
    }

    fn release_expired(&mut self) {
        if self.releases_reported {
            return;
        }
        for key in self.hold.expired(Instant::now()) {
            self.send(InputEvent::KeyUp(key));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            if let KeyCode::Char(c) = key.code {
                self.send(InputEvent::KeyUp(c));
            }
            return;
        }
        // only tempo keys auto-repeat; held notes are filtered by the router
        if key.kind == KeyEventKind::Repeat
            && !matches!(key.code, KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down)
        {
            return;
        }

        self.ensure_loading();

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char(c @ '1'..='3') => {
                let page = Instrument::ALL[c as usize - '1' as usize];
                self.show_page(page);
            }
            KeyCode::Tab => {
                if let Some(page) = self.with_session(|session| session.page()) {
                    let next = Instrument::ALL
                        .iter()
                        .position(|&i| i == page)
                        .map_or(0, |i| (i + 1) % Instrument::ALL.len());
                    self.show_page(Instrument::ALL[next]);
                }
            }
            KeyCode::Char(' ') => self.on_page(Action::ToggleMetronome),
            KeyCode::Left => self.on_page(|page| Action::NudgeTempo(page, -1)),
            KeyCode::Right => self.on_page(|page| Action::NudgeTempo(page, 1)),
            KeyCode::Down => self.on_page(|page| Action::NudgeTempo(page, -10)),
            KeyCode::Up => self.on_page(|page| Action::NudgeTempo(page, 10)),
            KeyCode::Char('r' | 'R') => self.on_page(Action::ToggleRecording),
            KeyCode::Char('y' | 'Y') => self.on_page(Action::PlayRecording),
            KeyCode::Char('l' | 'L') => self.on_page(Action::DownloadRecording),
            KeyCode::Char(c) => {
                if !self.releases_reported && key_binding(c).is_some() {
                    self.hold.press(c.to_ascii_lowercase(), Instant::now());
                }
                self.send(InputEvent::KeyDown(c));
            }
            _ => {}
        }
    }

    /// Load samples on the first key press.
    fn ensure_loading(&mut self) {
        if !self.loader_started {
            self.loader_started = true;
            spawn_loader(Arc::clone(&self.session));
        }
    }

    fn show_page(&mut self, page: Instrument) {
        self.send(InputEvent::ShowPage(page));
    }

    /// Dispatch an action aimed at the shown instrument.
    fn on_page(&mut self, action: impl FnOnce(Instrument) -> Action) {
        let result = self.with_session(|session| {
            let action = action(session.page());
            session.dispatch(action)
        });
        if let Some(result) = result {
            self.report(result);
        }
    }

    fn send(&mut self, event: InputEvent) {
        if let Some(result) = self.with_session(|session| session.handle_input(event)) {
            self.report(result);
        }
    }

    fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        match self.session.lock() {
            Ok(mut session) => Some(f(&mut session)),
            Err(_) => {
                error!("session lock poisoned");
                None
            }
        }
    }

    fn report(&mut self, result: sori::Result<Outcome>) {
        match result {
            Ok(Outcome::Saved(path)) => {
                self.status = format!("saved {}", path.display());
            }
            Ok(_) => {}
            Err(Error::SampleNotLoaded(instrument)) => {
                warn!(%instrument, "sample not loaded, attempting to load");
                self.status = format!("{instrument} sample not loaded, attempting to load");
                spawn_loader(Arc::clone(&self.session));
            }
            Err(err) => {
                warn!(%err, "action failed");
                self.status = err.to_string();
            }
        }
    }

    fn render(&self, frame: &mut Frame, state: &Snapshot) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(6),    // Note buttons
                Constraint::Length(8), // Waveform
                Constraint::Length(1), // Status
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.scope);
        render_transport(frame, chunks[0], state, &stats);
        render_keys(frame, chunks[1], state);
        render_waveform(frame, chunks[2], &self.scope, state.recording);

        let status = Paragraph::new(format!(" {}", self.status)).style(Style::default().fg(Color::Yellow));
        frame.render_widget(status, chunks[3]);

        let help = Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
