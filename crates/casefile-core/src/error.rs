use thiserror::Error;

/// Why a placement was refused. State is unchanged whenever one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("slot is already occupied")]
    SlotOccupied,
    #[error("piece does not match the slot's evidence")]
    ValueMismatch,
    #[error("piece is already placed")]
    PieceAlreadyUsed,
    #[error("no slot with index {0}")]
    UnknownSlot(usize),
    #[error("no piece with id {0}")]
    UnknownPiece(usize),
    #[error("the round is not being played")]
    NotPlaying,
}

/// A command that has no effect in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotApplicable {
    #[error("the board is not complete")]
    BoardIncomplete,
    #[error("every piece is already placed")]
    NoUnusedPieces,
    #[error("the round is not being played")]
    NotPlaying,
    #[error("the round has already started")]
    AlreadyStarted,
    #[error("the round has not been resolved")]
    NotResolved,
}

/// Invalid configuration or fixture data
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("time limit must be positive")]
    ZeroTimeLimit,
    #[error("minimum investigation time {min_ms}ms must be below the time limit {limit_ms}ms")]
    MinInvestigationTooLong { min_ms: u64, limit_ms: u64 },
    #[error("solvable percentage {0} exceeds 100")]
    PercentOutOfRange(u8),
    #[error("expected {expected} values, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("value {0} is outside the evidence domain")]
    OutOfDomain(u8),
    #[error("required values must be distinct, {0} repeats")]
    DuplicateRequired(u8),
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
}
