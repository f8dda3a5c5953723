//! Session state machine: phases, countdown, scoring
//!
//! The session never reads a clock. Every time-dependent command takes the
//! caller's monotonic `now_ms`, and the countdown is checked before anything
//! else on those calls: a round that has run out of time ends in a timeout
//! even if the board was filled since the last tick.

use crate::config::SessionConfig;
use crate::error::{ConfigError, NotApplicable, RejectReason};
use crate::generator::Generator;
use crate::round::{GameOverReason, Phase, Piece, PieceId, Round, Slot};
use crate::scoring::{score_delta, Outcome, RoundReport};
use serde::Serialize;
use tracing::{debug, info};

/// Countdown reading returned from [`Session::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerState {
    pub remaining_ms: u64,
    pub elapsed_ms: u64,
    pub expired: bool,
}

/// A play session: stage counter, running score and the current round
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    generator: Generator,
    stage: u32,
    score: u64,
    round: Round,
    /// Reinvestigations used in the current round
    reinvestigations: u32,
    history: Vec<RoundReport>,
}

impl Session {
    /// Create a session sitting on the title screen (round idle)
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut generator = match config.seed {
            Some(seed) => Generator::with_seed(seed),
            None => Generator::new(),
        }
        .with_rule(config.solvability);
        let round = generator.generate();

        Ok(Self {
            config,
            generator,
            stage: 1,
            score: 0,
            round,
            reinvestigations: 0,
            history: Vec::new(),
        })
    }

    /// Create a session and start its first round at `now_ms`
    pub fn start_session(config: SessionConfig, now_ms: u64) -> Result<Self, ConfigError> {
        let mut session = Self::new(config)?;
        // A fresh session is always idle, so starting cannot fail
        let _ = session.start(now_ms);
        Ok(session)
    }

    /// Swap in a prepared round (fixtures, replays). The round starts idle.
    pub fn with_round(mut self, mut round: Round) -> Self {
        round.phase = Phase::Idle;
        round.started_at = None;
        round.stopped_elapsed = None;
        self.round = round;
        self.reinvestigations = 0;
        self
    }

    /// Start the countdown of an idle round
    pub fn start(&mut self, now_ms: u64) -> Result<(), NotApplicable> {
        if self.round.phase != Phase::Idle {
            return Err(NotApplicable::AlreadyStarted);
        }
        self.round.phase = Phase::Playing;
        self.round.started_at = Some(now_ms);
        info!(stage = self.stage, time_limit_ms = self.config.time_limit_ms, "round started");
        Ok(())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn phase(&self) -> Phase {
        self.round.phase
    }

    pub fn history(&self) -> &[RoundReport] {
        &self.history
    }

    pub fn reinvestigations(&self) -> u32 {
        self.reinvestigations
    }

    pub fn is_playing(&self) -> bool {
        self.round.phase == Phase::Playing
    }

    /// Front-ends poll this before committing a drag
    pub fn is_game_over(&self) -> bool {
        matches!(self.round.phase, Phase::GameOver(_))
    }

    /// Drop a piece onto a slot. Placement does not read the countdown: a
    /// board filled after the deadline still ends in a timeout on the next
    /// tick or decision.
    pub fn place_piece(&mut self, piece_id: PieceId, slot_index: usize) -> Result<(), RejectReason> {
        if !self.is_playing() {
            return Err(RejectReason::NotPlaying);
        }
        self.round.place(slot_index, piece_id).inspect_err(|reason| {
            debug!(piece = piece_id, slot = slot_index, %reason, "placement rejected");
        })
    }

    /// Take a piece back off the board. Ignored outside play.
    pub fn remove_piece(&mut self, slot_index: usize) -> Option<PieceId> {
        if !self.is_playing() {
            return None;
        }
        self.round.remove(slot_index)
    }

    /// Submit the filled board
    pub fn request_indict(&mut self, now_ms: u64) -> Result<Outcome, NotApplicable> {
        if let Some(outcome) = self.expire_if_due(now_ms) {
            return Ok(outcome);
        }
        if !self.is_playing() {
            return Err(NotApplicable::NotPlaying);
        }
        if !self.round.is_complete() {
            return Err(NotApplicable::BoardIncomplete);
        }
        debug_assert!(self.round.is_correct());
        Ok(self.finish(Outcome::Indicted, now_ms))
    }

    /// Declare the case unsolvable
    pub fn request_dismiss(&mut self, now_ms: u64) -> Result<Outcome, NotApplicable> {
        if let Some(outcome) = self.expire_if_due(now_ms) {
            return Ok(outcome);
        }
        if !self.is_playing() {
            return Err(NotApplicable::NotPlaying);
        }

        let elapsed = self.round.elapsed_at(now_ms);
        let outcome = if elapsed < self.config.min_investigation_ms {
            Outcome::GameOver(GameOverReason::InvestigatedTooLittle)
        } else if self.round.can_still_progress() {
            Outcome::GameOver(GameOverReason::LeftPlaceableEvidence)
        } else {
            Outcome::Dismissed
        };
        Ok(self.finish(outcome, now_ms))
    }

    /// Re-roll a few unused pieces. Returns how many changed.
    pub fn reinvestigate(&mut self, now_ms: u64) -> Result<usize, NotApplicable> {
        self.expire_if_due(now_ms);
        if !self.is_playing() {
            return Err(NotApplicable::NotPlaying);
        }
        let changed = self.round.reroll_unused(self.generator.rng_mut());
        if changed == 0 {
            return Err(NotApplicable::NoUnusedPieces);
        }
        self.reinvestigations += 1;
        self.score += self.config.reinvestigate_penalty_ms;
        info!(
            stage = self.stage,
            changed,
            penalty_ms = self.config.reinvestigate_penalty_ms,
            "reinvestigated"
        );
        Ok(changed)
    }

    /// Advance the countdown. A complete board is indicted on the first tick
    /// that sees it; a countdown at zero ends the game.
    pub fn tick(&mut self, now_ms: u64) -> TimerState {
        if self.expire_if_due(now_ms).is_none() && self.is_playing() && self.round.is_complete() {
            self.finish(Outcome::Indicted, now_ms);
        }
        self.timer(now_ms)
    }

    /// Countdown reading without advancing anything
    pub fn timer(&self, now_ms: u64) -> TimerState {
        let limit = self.config.time_limit_ms;
        let elapsed_ms = self.round.elapsed_at(now_ms).min(limit);
        TimerState {
            remaining_ms: limit - elapsed_ms,
            elapsed_ms,
            expired: self.round.phase == Phase::GameOver(GameOverReason::Timeout),
        }
    }

    /// Move on from a resolved round to a fresh one, already running
    pub fn advance_stage(&mut self, now_ms: u64) -> Result<&Round, NotApplicable> {
        if !matches!(self.round.phase, Phase::Resolved(_)) {
            return Err(NotApplicable::NotResolved);
        }
        self.stage += 1;
        self.round = self.generator.generate();
        self.reinvestigations = 0;
        self.start(now_ms)?;
        Ok(&self.round)
    }

    /// Back to stage 1 with a zero score and an idle round
    pub fn reset_session(&mut self) -> &Session {
        self.stage = 1;
        self.score = 0;
        self.history.clear();
        self.round = self.generator.generate();
        self.reinvestigations = 0;
        info!("session reset");
        self
    }

    /// Read-only view for front-ends
    pub fn snapshot(&self, now_ms: u64) -> SessionSnapshot {
        let phase = self.round.phase;
        SessionSnapshot {
            stage: self.stage,
            score: self.score,
            phase,
            timer: self.timer(now_ms),
            slots: self.round.slots().to_vec(),
            pieces: self.round.pieces().to_vec(),
            complete: self.round.is_complete(),
            reinvestigations: self.reinvestigations,
            solvable: phase.is_terminal().then_some(self.round.solvable()),
            history: self.history.clone(),
        }
    }

    fn expire_if_due(&mut self, now_ms: u64) -> Option<Outcome> {
        if self.is_playing() && self.round.elapsed_at(now_ms) >= self.config.time_limit_ms {
            Some(self.finish(Outcome::GameOver(GameOverReason::Timeout), now_ms))
        } else {
            None
        }
    }

    /// Stop the timer, settle the score and record the round
    fn finish(&mut self, outcome: Outcome, now_ms: u64) -> Outcome {
        let elapsed_ms = self.round.elapsed_at(now_ms).min(self.config.time_limit_ms);
        let solvable = self.round.solvable();
        let delta = score_delta(outcome, elapsed_ms, solvable, &self.config);

        self.round.stopped_elapsed = Some(elapsed_ms);
        self.round.phase = outcome.phase();
        self.score += delta;

        self.history.push(RoundReport {
            stage: self.stage,
            outcome,
            elapsed_ms,
            score_delta: delta,
            solvable,
            reinvestigations: self.reinvestigations,
        });
        info!(
            stage = self.stage,
            %outcome,
            elapsed_ms,
            score_delta = delta,
            score = self.score,
            solvable,
            "round finished"
        );
        outcome
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub stage: u32,
    pub score: u64,
    pub phase: Phase,
    pub timer: TimerState,
    pub slots: Vec<Slot>,
    pub pieces: Vec<Piece>,
    pub complete: bool,
    pub reinvestigations: u32,
    /// Only revealed once the round is over
    pub solvable: Option<bool>,
    pub history: Vec<RoundReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::{Verdict, SLOT_COUNT};

    const ONE_TO_NINE: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];
    const FOUR_TO_TWELVE: [u8; 9] = [4, 5, 6, 7, 8, 9, 10, 11, 12];

    fn session_with(required: &[u8], offered: &[u8]) -> Session {
        let round = Round::from_sets(required, offered).unwrap();
        let mut session = Session::new(SessionConfig::default().with_seed(7))
            .unwrap()
            .with_round(round);
        session.start(0).unwrap();
        session
    }

    fn place_all_matches(session: &mut Session) {
        let pairs: Vec<(PieceId, usize)> = session
            .round()
            .pieces()
            .iter()
            .filter_map(|p| {
                session
                    .round()
                    .slots()
                    .iter()
                    .find(|s| s.required_value == p.value)
                    .map(|s| (p.id, s.index))
            })
            .collect();
        for (piece, slot) in pairs {
            session.place_piece(piece, slot).unwrap();
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new(SessionConfig::default()).unwrap();
        assert_eq!(session.stage(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.timer(5_000).remaining_ms, SessionConfig::POINTER_TIME_LIMIT_MS);
    }

    #[test]
    fn test_start_session_plays() {
        let mut session = Session::start_session(SessionConfig::touch(), 1_000).unwrap();
        assert!(session.is_playing());
        assert_eq!(session.round().started_at(), Some(1_000));
        assert_eq!(session.start(2_000), Err(NotApplicable::AlreadyStarted));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SessionConfig {
            time_limit_ms: 0,
            ..SessionConfig::default()
        };
        assert!(Session::new(config).is_err());
    }

    #[test]
    fn test_place_rejected_when_idle() {
        let session = Session::new(SessionConfig::default()).unwrap();
        let mut session = session.with_round(Round::from_sets(&ONE_TO_NINE, &ONE_TO_NINE).unwrap());
        assert_eq!(session.place_piece(0, 0), Err(RejectReason::NotPlaying));
    }

    #[test]
    fn test_solvable_round_indicted() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        assert!(session.round().solvable());
        assert_eq!(session.request_indict(1_000), Err(NotApplicable::BoardIncomplete));

        place_all_matches(&mut session);
        assert!(session.round().is_complete());
        assert!(session.round().is_correct());

        assert_eq!(session.request_indict(20_000), Ok(Outcome::Indicted));
        assert_eq!(session.phase(), Phase::Resolved(Verdict::Indicted));
        assert_eq!(session.score(), 20_000);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].score_delta, 20_000);
    }

    #[test]
    fn test_tick_indicts_complete_board() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        place_all_matches(&mut session);
        let timer = session.tick(15_000);
        assert_eq!(session.phase(), Phase::Resolved(Verdict::Indicted));
        assert_eq!(session.score(), 15_000);
        assert!(!timer.expired);
        assert_eq!(timer.remaining_ms, SessionConfig::POINTER_TIME_LIMIT_MS - 15_000);
    }

    #[test]
    fn test_unsolvable_round_dismissed_without_penalty() {
        let mut session = session_with(&ONE_TO_NINE, &FOUR_TO_TWELVE);
        assert!(!session.round().solvable());
        place_all_matches(&mut session);
        assert!(!session.round().is_complete());
        assert!(!session.round().can_still_progress());

        assert_eq!(session.request_dismiss(12_000), Ok(Outcome::Dismissed));
        assert_eq!(session.phase(), Phase::Resolved(Verdict::Dismissed));
        assert_eq!(session.score(), 12_000);
    }

    #[test]
    fn test_dismissing_solvable_round_is_penalised() {
        // Solvable at generation, then the last piece changed so nothing fits
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        for slot in 0..8 {
            session.place_piece(slot, slot).unwrap();
        }
        session.round.set_piece_value(8, 12);
        assert!(session.round().solvable());
        assert!(!session.round().can_still_progress());

        assert_eq!(session.request_dismiss(11_000), Ok(Outcome::Dismissed));
        assert_eq!(session.score(), 11_000 + 30_000);
    }

    #[test]
    fn test_dismiss_too_early_is_game_over() {
        for board_filled in [false, true] {
            let mut session = session_with(&ONE_TO_NINE, &FOUR_TO_TWELVE);
            if board_filled {
                place_all_matches(&mut session);
            }
            assert_eq!(
                session.request_dismiss(9_999),
                Ok(Outcome::GameOver(GameOverReason::InvestigatedTooLittle))
            );
            assert!(session.is_game_over());
            assert_eq!(session.score(), 0);
        }
    }

    #[test]
    fn test_dismiss_with_placeable_evidence_is_game_over() {
        let mut session = session_with(&ONE_TO_NINE, &FOUR_TO_TWELVE);
        assert_eq!(
            session.request_dismiss(10_000),
            Ok(Outcome::GameOver(GameOverReason::LeftPlaceableEvidence))
        );
        assert_eq!(session.place_piece(0, 3), Err(RejectReason::NotPlaying));
    }

    #[test]
    fn test_timeout() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        let timer = session.tick(59_900);
        assert!(!timer.expired);
        assert_eq!(timer.remaining_ms, 100);

        let timer = session.tick(60_000);
        assert!(timer.expired);
        assert_eq!(timer.remaining_ms, 0);
        assert_eq!(session.phase(), Phase::GameOver(GameOverReason::Timeout));

        // Frozen after the stop
        let later = session.tick(90_000);
        assert_eq!(later, timer);
    }

    #[test]
    fn test_late_command_times_out_first() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        place_all_matches(&mut session);
        assert_eq!(
            session.request_indict(61_000),
            Ok(Outcome::GameOver(GameOverReason::Timeout))
        );
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_timer_frozen_after_resolution() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        place_all_matches(&mut session);
        session.request_indict(30_000).unwrap();
        assert_eq!(session.tick(50_000).elapsed_ms, 30_000);
        assert_eq!(session.request_indict(50_000), Err(NotApplicable::NotPlaying));
    }

    #[test]
    fn test_reinvestigate() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        let changed = session.reinvestigate(1_000).unwrap();
        assert!((1..=3).contains(&changed));
        assert!(session.round().solvable());
        assert_eq!(session.reinvestigations(), 1);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_reinvestigate_penalty_flag() {
        let round = Round::from_sets(&ONE_TO_NINE, &ONE_TO_NINE).unwrap();
        let config = SessionConfig {
            reinvestigate_penalty_ms: 10_000,
            ..SessionConfig::default().with_seed(2)
        };
        let mut session = Session::new(config).unwrap().with_round(round);
        session.start(0).unwrap();
        session.reinvestigate(1_000).unwrap();
        session.reinvestigate(2_000).unwrap();
        assert_eq!(session.score(), 20_000);
    }

    #[test]
    fn test_reinvestigate_after_deadline_times_out() {
        let round = Round::from_sets(&ONE_TO_NINE, &ONE_TO_NINE).unwrap();
        let config = SessionConfig {
            reinvestigate_penalty_ms: 10_000,
            ..SessionConfig::default().with_seed(2)
        };
        let mut session = Session::new(config).unwrap().with_round(round);
        session.start(0).unwrap();

        assert_eq!(session.reinvestigate(70_000), Err(NotApplicable::NotPlaying));
        assert_eq!(session.phase(), Phase::GameOver(GameOverReason::Timeout));
        assert_eq!(session.reinvestigations(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_reinvestigate_without_unused_pieces() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        place_all_matches(&mut session);
        assert_eq!(session.reinvestigate(5_000), Err(NotApplicable::NoUnusedPieces));
        assert_eq!(session.reinvestigations(), 0);
    }

    #[test]
    fn test_remove_piece_only_while_playing() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        session.place_piece(0, 0).unwrap();
        assert_eq!(session.remove_piece(0), Some(0));
        session.place_piece(0, 0).unwrap();
        session.request_dismiss(1_000).unwrap();
        assert_eq!(session.remove_piece(0), None);
        assert_eq!(session.round().slots()[0].occupant, Some(0));
    }

    #[test]
    fn test_advance_stage() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        assert_eq!(session.advance_stage(0).err(), Some(NotApplicable::NotResolved));

        place_all_matches(&mut session);
        session.request_indict(20_000).unwrap();

        let round = session.advance_stage(25_000).unwrap();
        assert_eq!(round.phase(), Phase::Playing);
        assert_eq!(round.started_at(), Some(25_000));
        assert_eq!(round.filled_count(), 0);

        // The fresh round is the seeded generator's next draw, not the fixture
        let mut expected = Generator::with_seed(7).with_rule(SessionConfig::default().solvability);
        expected.generate();
        let next = expected.generate();
        assert_eq!(round.required(), next.required());
        assert_eq!(round.offered(), next.offered());
        assert_eq!(session.stage(), 2);
        assert_eq!(session.score(), 20_000);
    }

    #[test]
    fn test_game_over_cannot_advance_but_can_reset() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        session.request_dismiss(500).unwrap();
        assert!(session.is_game_over());
        assert_eq!(session.advance_stage(1_000).err(), Some(NotApplicable::NotResolved));

        let reset = session.reset_session();
        assert_eq!(reset.stage(), 1);
        assert_eq!(reset.score(), 0);
        assert!(reset.history().is_empty());
        assert_eq!(reset.phase(), Phase::Idle);
    }

    #[test]
    fn test_snapshot_hides_solvable_during_play() {
        let mut session = session_with(&ONE_TO_NINE, &ONE_TO_NINE);
        let snapshot = session.snapshot(1_000);
        assert_eq!(snapshot.solvable, None);
        assert_eq!(snapshot.slots.len(), SLOT_COUNT);
        assert_eq!(snapshot.pieces.len(), SLOT_COUNT);

        session.request_dismiss(2_000).unwrap();
        let snapshot = session.snapshot(3_000);
        assert_eq!(snapshot.solvable, Some(true));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"]["phase"], "game_over");
        assert_eq!(json["phase"]["detail"], "investigated_too_little");
        assert_eq!(json["history"][0]["outcome"]["outcome"], "game_over");
    }

    #[test]
    fn test_seeded_sessions_match() {
        let a = Session::new(SessionConfig::default().with_seed(5)).unwrap();
        let b = Session::new(SessionConfig::default().with_seed(5)).unwrap();
        assert_eq!(a.round().required(), b.round().required());
        assert_eq!(a.round().offered(), b.round().offered());
    }
}
