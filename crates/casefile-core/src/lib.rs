//! Evidence-matching puzzle engine
//!
//! A round offers nine evidence pieces against nine hint slots. The player
//! places matching pieces, then either indicts (submits a complete board) or
//! dismisses the case as unsolvable before the countdown runs out. This crate
//! holds the generator, the placement ledger and the timed state machine;
//! rendering and input belong to the front-ends.

pub mod config;
pub mod error;
pub mod evidence;
pub mod generator;
pub mod round;
pub mod sampler;
pub mod scoring;
pub mod session;
pub mod time;

pub use config::{InputModality, SessionConfig, SolvabilityRule};
pub use error::{ConfigError, NotApplicable, RejectReason};
pub use evidence::{Evidence, DOMAIN_SIZE, EVIDENCE, PALETTE};
pub use generator::Generator;
pub use round::{GameOverReason, Phase, Piece, PieceId, Round, Slot, Verdict, SLOT_COUNT};
pub use sampler::{sample_k, SimpleRng};
pub use scoring::{Outcome, RoundReport};
pub use session::{Session, SessionSnapshot, TimerState};
pub use time::format_time;
