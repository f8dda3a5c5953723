//! Turning elapsed time and decisions into score deltas
//!
//! The score is a time-penalty total in milliseconds: lower is better.

use crate::config::SessionConfig;
use crate::round::{GameOverReason, Phase, Verdict};
use serde::Serialize;

/// Result of a decision or of the countdown running out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum Outcome {
    Indicted,
    Dismissed,
    GameOver(GameOverReason),
}

impl Outcome {
    /// Phase a round settles in after this outcome
    pub fn phase(self) -> Phase {
        match self {
            Outcome::Indicted => Phase::Resolved(Verdict::Indicted),
            Outcome::Dismissed => Phase::Resolved(Verdict::Dismissed),
            Outcome::GameOver(reason) => Phase::GameOver(reason),
        }
    }

    pub fn is_game_over(self) -> bool {
        matches!(self, Outcome::GameOver(_))
    }

    /// Title and message shown to the player when the round ends
    pub fn verdict_text(self, solvable: bool) -> (&'static str, &'static str) {
        match self {
            Outcome::Indicted => ("Indicted", "Well done! You completed the case file."),
            Outcome::Dismissed if dismissal_was_correct(solvable) => {
                ("Dismissed", "Correct! This case could not be completed.")
            }
            Outcome::Dismissed => ("Dismissed", "Too bad! This case could have been completed."),
            Outcome::GameOver(GameOverReason::InvestigatedTooLittle) => {
                ("Game over", "You dismissed the case without investigating long enough.")
            }
            Outcome::GameOver(GameOverReason::LeftPlaceableEvidence) => {
                ("Game over", "You dismissed the case while evidence could still be placed.")
            }
            Outcome::GameOver(GameOverReason::Timeout) => ("Game over", "Time ran out."),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Indicted => write!(f, "indicted"),
            Outcome::Dismissed => write!(f, "dismissed"),
            Outcome::GameOver(reason) => write!(f, "game over: {}", reason),
        }
    }
}

/// Score added when a round ends
pub fn score_delta(outcome: Outcome, elapsed_ms: u64, solvable: bool, config: &SessionConfig) -> u64 {
    match outcome {
        Outcome::Indicted => elapsed_ms,
        Outcome::Dismissed if solvable => elapsed_ms + config.wrong_dismissal_penalty_ms,
        Outcome::Dismissed => elapsed_ms,
        Outcome::GameOver(_) => 0,
    }
}

/// Whether the player's dismissal was the right call
pub fn dismissal_was_correct(solvable: bool) -> bool {
    !solvable
}

/// Summary of a finished round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub stage: u32,
    pub outcome: Outcome,
    pub elapsed_ms: u64,
    pub score_delta: u64,
    pub solvable: bool,
    pub reinvestigations: u32,
}
