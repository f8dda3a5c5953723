//! View models handed to the page as plain JS objects

use casefile_core::{evidence, format_time, NotApplicable, Outcome, Piece, Session, Slot, TimerState};
use serde::Serialize;

/// Countdown as the page displays it
#[derive(Debug, Clone, Serialize)]
pub struct TimerView {
    pub remaining_ms: u64,
    pub expired: bool,
    pub display: String,
}

impl From<TimerState> for TimerView {
    fn from(timer: TimerState) -> Self {
        Self {
            remaining_ms: timer.remaining_ms,
            expired: timer.expired,
            display: format_time(timer.remaining_ms),
        }
    }
}

/// A piece with its display label
#[derive(Debug, Clone, Serialize)]
pub struct PieceView {
    pub id: usize,
    pub value: u8,
    pub label: &'static str,
    pub color: &'static str,
    pub used: bool,
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        Self {
            id: piece.id,
            value: piece.value,
            label: evidence::label(piece.value),
            color: piece.color,
            used: piece.used,
        }
    }
}

/// A slot with the label of the evidence it asks for
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub index: usize,
    pub required_value: u8,
    pub hint: &'static str,
    pub occupant: Option<usize>,
}

impl From<&Slot> for SlotView {
    fn from(slot: &Slot) -> Self {
        Self {
            index: slot.index,
            required_value: slot.required_value,
            hint: evidence::label(slot.required_value),
            occupant: slot.occupant,
        }
    }
}

/// Board state for a redraw
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub stage: u32,
    pub score: u64,
    pub playing: bool,
    pub game_over: bool,
    pub timer: TimerView,
    pub slots: Vec<SlotView>,
    pub pieces: Vec<PieceView>,
}

impl BoardView {
    pub fn new(session: &Session, now_ms: u64) -> Self {
        let round = session.round();
        Self {
            stage: session.stage(),
            score: session.score(),
            playing: session.is_playing(),
            game_over: session.is_game_over(),
            timer: session.timer(now_ms).into(),
            slots: round.slots().iter().map(SlotView::from).collect(),
            pieces: round.pieces().iter().map(PieceView::from).collect(),
        }
    }
}

/// Result modal contents after indict or dismiss
#[derive(Debug, Clone, Serialize)]
pub struct DecisionView {
    pub outcome: Option<Outcome>,
    pub title: String,
    pub message: String,
    pub elapsed: String,
    /// Set when the command did nothing
    pub not_applicable: Option<String>,
}

impl DecisionView {
    pub fn new(result: Result<Outcome, NotApplicable>, session: &Session) -> Self {
        match result {
            Ok(outcome) => {
                let elapsed_ms = session.history().last().map(|r| r.elapsed_ms).unwrap_or(0);
                let (title, message) = outcome.verdict_text(session.round().solvable());
                Self {
                    outcome: Some(outcome),
                    title: title.to_string(),
                    message: message.to_string(),
                    elapsed: format!("Elapsed: {}", format_time(elapsed_ms)),
                    not_applicable: None,
                }
            }
            Err(reason) => Self {
                outcome: None,
                title: String::new(),
                message: String::new(),
                elapsed: String::new(),
                not_applicable: Some(reason.to_string()),
            },
        }
    }
}

/// Result of a reinvestigation request
#[derive(Debug, Clone, Serialize)]
pub struct ReinvestigateView {
    /// Pieces that changed, 0 when nothing happened
    pub changed: usize,
    /// Set when the command did nothing
    pub not_applicable: Option<String>,
}

impl From<Result<usize, NotApplicable>> for ReinvestigateView {
    fn from(result: Result<usize, NotApplicable>) -> Self {
        match result {
            Ok(changed) => Self {
                changed,
                not_applicable: None,
            },
            Err(reason) => Self {
                changed: 0,
                not_applicable: Some(reason.to_string()),
            },
        }
    }
}
