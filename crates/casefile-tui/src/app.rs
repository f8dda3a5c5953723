use crate::theme::Theme;
use casefile_core::{format_time, NotApplicable, Outcome, Phase, PieceId, Session};
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

/// Result of handling a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// The main application state
pub struct App {
    /// Current session
    pub session: Session,
    /// Piece picked up and waiting for a slot
    pub selected: Option<PieceId>,
    /// Color theme
    pub theme: Theme,
    /// Message to display
    pub message: Option<String>,
    /// Message timer (ticks remaining)
    message_timer: u32,
    /// Outcome of the last finished round, shown until the next one starts
    pub last_outcome: Option<Outcome>,
    /// Clock origin for the session's millisecond timestamps
    epoch: Instant,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            selected: None,
            theme: Theme::dark(),
            message: None,
            message_timer: 0,
            last_outcome: None,
            epoch: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    pub fn get_tick_rate(&self) -> Duration {
        Duration::from_millis(self.session.config().tick_interval_ms)
    }

    /// Update timers (called every tick)
    pub fn tick(&mut self) {
        let now = self.now_ms();
        self.tick_at(now);
    }

    pub fn tick_at(&mut self, now_ms: u64) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        let was_playing = self.session.is_playing();
        self.session.tick(now_ms);
        if was_playing && !self.session.is_playing() {
            self.selected = None;
            self.last_outcome = self.session.history().last().map(|r| r.outcome);
        }
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 30; // ~3 seconds at 100ms ticks
    }

    /// Remaining time as `MM:SS.d`
    pub fn timer_string(&self) -> String {
        format_time(self.session.timer(self.now_ms()).remaining_ms)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        let now = self.now_ms();
        self.handle_key_at(key, now)
    }

    pub fn handle_key_at(&mut self, key: KeyEvent, now_ms: u64) -> AppAction {
        if key.code == KeyCode::Char('q') {
            return AppAction::Quit;
        }
        match self.session.phase() {
            Phase::Idle => self.handle_title_key(key, now_ms),
            Phase::Playing => self.handle_playing_key(key, now_ms),
            Phase::Resolved(_) => self.handle_resolved_key(key, now_ms),
            Phase::GameOver(_) => self.handle_game_over_key(key),
        }
        AppAction::Continue
    }

    fn handle_title_key(&mut self, key: KeyEvent, now_ms: u64) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) && self.session.start(now_ms).is_ok() {
            self.last_outcome = None;
            self.show_message("Investigation opened");
        }
    }

    fn handle_playing_key(&mut self, key: KeyEvent, now_ms: u64) {
        match key.code {
            // Pick up a piece
            KeyCode::Char(c @ 'a'..='i') => {
                let id = (c as u8 - b'a') as usize;
                match self.session.round().piece(id).map(|p| p.used) {
                    Some(true) => self.show_message("That piece is already on the board"),
                    Some(false) => self.selected = Some(id),
                    None => {}
                }
            }

            // Drop the selected piece, or take a piece back off the slot
            KeyCode::Char(c @ '1'..='9') => {
                let slot = (c as u8 - b'1') as usize;
                match self.selected.take() {
                    Some(piece) => {
                        if let Err(reason) = self.session.place_piece(piece, slot) {
                            self.show_message(&format!("Rejected: {}", reason));
                        }
                    }
                    None => {
                        if self.session.remove_piece(slot).is_some() {
                            self.show_message("Evidence returned");
                        }
                    }
                }
            }

            KeyCode::Esc => self.selected = None,

            KeyCode::Enter => {
                let result = self.session.request_indict(now_ms);
                self.after_decision(result);
            }

            KeyCode::Char('x') => {
                let result = self.session.request_dismiss(now_ms);
                self.after_decision(result);
            }

            KeyCode::Char('r') => match self.session.reinvestigate(now_ms) {
                Ok(changed) => {
                    self.selected = None;
                    let penalty = self.session.config().reinvestigate_penalty_ms;
                    if penalty > 0 {
                        self.show_message(&format!("{} piece(s) re-examined, +{}ms", changed, penalty));
                    } else {
                        self.show_message(&format!("{} piece(s) re-examined", changed));
                    }
                }
                Err(reason) => self.show_message(&capitalize(&reason.to_string())),
            },

            _ => {}
        }
    }

    fn handle_resolved_key(&mut self, key: KeyEvent, now_ms: u64) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n'))
            && self.session.advance_stage(now_ms).is_ok()
        {
            self.last_outcome = None;
            self.show_message(&format!("Stage {}", self.session.stage()));
        }
    }

    fn handle_game_over_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r')) {
            self.session.reset_session();
            self.last_outcome = None;
            self.selected = None;
        }
    }

    fn after_decision(&mut self, result: Result<Outcome, NotApplicable>) {
        match result {
            Ok(outcome) => {
                self.selected = None;
                self.last_outcome = Some(outcome);
            }
            Err(reason) => self.show_message(&capitalize(&reason.to_string())),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
