//! A single round: required slots, offered pieces and the placement ledger

use crate::error::{ConfigError, RejectReason};
use crate::evidence::{self, DOMAIN_SIZE, PALETTE};
use crate::sampler::SimpleRng;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Slots on the board (3x3)
pub const SLOT_COUNT: usize = 9;

/// Most pieces a single reinvestigation re-rolls
pub const MAX_REROLLS: u32 = 3;

pub type PieceId = usize;

/// An evidence tile the player can drag onto a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Piece {
    pub id: PieceId,
    pub value: u8,
    pub color: &'static str,
    pub used: bool,
}

/// A hint slot on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub index: usize,
    pub required_value: u8,
    /// Id of the piece sitting in this slot
    pub occupant: Option<PieceId>,
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Verdict of a resolved round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Indicted,
    Dismissed,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    InvestigatedTooLittle,
    LeftPlaceableEvidence,
    Timeout,
}

impl std::fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::InvestigatedTooLittle => "investigated too little",
            Self::LeftPlaceableEvidence => "left placeable evidence",
            Self::Timeout => "timeout",
        };
        write!(f, "{}", text)
    }
}

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "detail")]
pub enum Phase {
    /// Generated, timer not started
    Idle,
    Playing,
    Resolved(Verdict),
    GameOver(GameOverReason),
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Resolved(_) | Phase::GameOver(_))
    }
}

/// One playable puzzle instance
#[derive(Debug, Clone)]
pub struct Round {
    required: Vec<u8>,
    slots: Vec<Slot>,
    pieces: Vec<Piece>,
    solvable: bool,
    pub(crate) phase: Phase,
    /// Timestamp the countdown started at
    pub(crate) started_at: Option<u64>,
    /// Elapsed time frozen at the terminal transition
    pub(crate) stopped_elapsed: Option<u64>,
}

impl Round {
    /// Build a round from already-drawn sets. `solvable` is fixed here.
    pub(crate) fn build(required: Vec<u8>, offered: &[u8]) -> Self {
        let slots = required
            .iter()
            .enumerate()
            .map(|(index, &required_value)| Slot {
                index,
                required_value,
                occupant: None,
            })
            .collect();

        let pieces = offered
            .iter()
            .enumerate()
            .map(|(id, &value)| Piece {
                id,
                value,
                color: PALETTE[id % PALETTE.len()],
                used: false,
            })
            .collect();

        let required_set: BTreeSet<u8> = required.iter().copied().collect();
        let offered_set: BTreeSet<u8> = offered.iter().copied().collect();
        let solvable = required_set == offered_set;

        Self {
            required,
            slots,
            pieces,
            solvable,
            phase: Phase::Idle,
            started_at: None,
            stopped_elapsed: None,
        }
    }

    /// Build a round from explicit sets (fixtures, replays)
    pub fn from_sets(required: &[u8], offered: &[u8]) -> Result<Self, ConfigError> {
        for set in [required, offered] {
            if set.len() != SLOT_COUNT {
                return Err(ConfigError::WrongLength {
                    expected: SLOT_COUNT,
                    actual: set.len(),
                });
            }
            if let Some(&bad) = set.iter().find(|v| !evidence::in_domain(**v)) {
                return Err(ConfigError::OutOfDomain(bad));
            }
        }
        let mut seen = BTreeSet::new();
        for &value in required {
            if !seen.insert(value) {
                return Err(ConfigError::DuplicateRequired(value));
            }
        }
        Ok(Self::build(required.to_vec(), offered))
    }

    pub fn required(&self) -> &[u8] {
        &self.required
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id)
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Current offered values, in piece order
    pub fn offered(&self) -> Vec<u8> {
        self.pieces.iter().map(|p| p.value).collect()
    }

    /// Whether the offered pieces matched the required set at generation time
    pub fn solvable(&self) -> bool {
        self.solvable
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started_at(&self) -> Option<u64> {
        self.started_at
    }

    /// Elapsed milliseconds at `now_ms`, frozen once the round has ended
    pub fn elapsed_at(&self, now_ms: u64) -> u64 {
        match (self.stopped_elapsed, self.started_at) {
            (Some(frozen), _) => frozen,
            (None, Some(start)) => now_ms.saturating_sub(start),
            (None, None) => 0,
        }
    }

    /// Put a piece into a slot
    pub fn place(&mut self, slot_index: usize, piece_id: PieceId) -> Result<(), RejectReason> {
        let slot = self
            .slots
            .get(slot_index)
            .ok_or(RejectReason::UnknownSlot(slot_index))?;
        let piece = self
            .pieces
            .get(piece_id)
            .ok_or(RejectReason::UnknownPiece(piece_id))?;

        if !slot.is_empty() {
            return Err(RejectReason::SlotOccupied);
        }
        if piece.used {
            return Err(RejectReason::PieceAlreadyUsed);
        }
        if piece.value != slot.required_value {
            return Err(RejectReason::ValueMismatch);
        }

        self.slots[slot_index].occupant = Some(piece_id);
        self.pieces[piece_id].used = true;
        debug!(slot = slot_index, piece = piece_id, "placed evidence");
        Ok(())
    }

    /// Clear a slot, returning the freed piece
    pub fn remove(&mut self, slot_index: usize) -> Option<PieceId> {
        let piece_id = self.slots.get_mut(slot_index)?.occupant.take()?;
        if let Some(piece) = self.pieces.get_mut(piece_id) {
            piece.used = false;
        }
        debug!(slot = slot_index, piece = piece_id, "removed evidence");
        Some(piece_id)
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| !s.is_empty())
    }

    /// Every occupant matches its slot. Placement only accepts matches, so
    /// this holds whenever the board is complete.
    pub fn is_correct(&self) -> bool {
        self.slots.iter().all(|slot| {
            slot.occupant
                .and_then(|id| self.pieces.get(id))
                .is_some_and(|piece| piece.value == slot.required_value)
        })
    }

    /// Some unused piece still fits some empty slot
    pub fn can_still_progress(&self) -> bool {
        self.unused_pieces()
            .any(|piece| self.empty_slots().any(|slot| slot.required_value == piece.value))
    }

    pub fn unused_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| !p.used)
    }

    pub fn empty_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.is_empty())
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    /// Empty slots that would accept the given piece
    pub fn placeable_slots(&self, piece_id: PieceId) -> Vec<usize> {
        match self.pieces.get(piece_id) {
            Some(piece) if !piece.used => self
                .empty_slots()
                .filter(|slot| slot.required_value == piece.value)
                .map(|slot| slot.index)
                .collect(),
            _ => Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_piece_value(&mut self, piece_id: PieceId, value: u8) {
        self.pieces[piece_id].value = value;
    }

    /// Re-roll one to three distinct unused pieces with fresh values and
    /// colours. Returns how many pieces changed; `solvable` is untouched.
    pub fn reroll_unused(&mut self, rng: &mut SimpleRng) -> usize {
        let mut unused: Vec<PieceId> = self.unused_pieces().map(|p| p.id).collect();
        if unused.is_empty() {
            return 0;
        }

        let count = (rng.next_in_range(1, MAX_REROLLS) as usize).min(unused.len());
        rng.shuffle(&mut unused);

        for &id in &unused[..count] {
            let piece = &mut self.pieces[id];
            piece.value = rng.next_in_range(1, u32::from(DOMAIN_SIZE)) as u8;
            piece.color = PALETTE[rng.next_below(PALETTE.len() as u32) as usize];
            debug!(piece = id, value = piece.value, "re-rolled evidence");
        }
        count
    }
}
