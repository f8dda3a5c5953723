use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// How the player drives the board. Chosen by the front-end, never detected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputModality {
    /// Mouse drag and drop
    #[default]
    Pointer,
    /// Touch screen dragging
    Touch,
}

/// How a round decides whether it can be completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SolvabilityRule {
    /// Required and offered sets are drawn independently; the round is
    /// solvable exactly when the two sets happen to coincide
    #[default]
    Emergent,
    /// A biased coin picks the target first, then the offered set is built
    /// to hit (or miss) the required set
    Biased { solvable_percent: u8 },
}

/// Configuration for a play session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Countdown length per round
    pub time_limit_ms: u64,
    /// Dismissing earlier than this ends the game
    pub min_investigation_ms: u64,
    /// Added when a solvable case is dismissed
    pub wrong_dismissal_penalty_ms: u64,
    /// Added on every reinvestigation
    pub reinvestigate_penalty_ms: u64,
    /// How often front-ends are expected to tick
    pub tick_interval_ms: u64,
    /// Rule used by the puzzle generator
    pub solvability: SolvabilityRule,
    /// Fixed RNG seed for reproducible sessions
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::pointer()
    }
}

impl SessionConfig {
    pub const POINTER_TIME_LIMIT_MS: u64 = 60_000;
    pub const TOUCH_TIME_LIMIT_MS: u64 = 90_000;

    pub fn pointer() -> Self {
        Self {
            time_limit_ms: Self::POINTER_TIME_LIMIT_MS,
            min_investigation_ms: 10_000,
            wrong_dismissal_penalty_ms: 30_000,
            reinvestigate_penalty_ms: 0,
            tick_interval_ms: 100,
            solvability: SolvabilityRule::Emergent,
            seed: None,
        }
    }

    pub fn touch() -> Self {
        Self {
            time_limit_ms: Self::TOUCH_TIME_LIMIT_MS,
            ..Self::pointer()
        }
    }

    pub fn for_modality(modality: InputModality) -> Self {
        match modality {
            InputModality::Pointer => Self::pointer(),
            InputModality::Touch => Self::touch(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a JSON override document. Missing fields keep their pointer defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit_ms == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        if self.min_investigation_ms >= self.time_limit_ms {
            return Err(ConfigError::MinInvestigationTooLong {
                min_ms: self.min_investigation_ms,
                limit_ms: self.time_limit_ms,
            });
        }
        if let SolvabilityRule::Biased { solvable_percent } = self.solvability {
            if solvable_percent > 100 {
                return Err(ConfigError::PercentOutOfRange(solvable_percent));
            }
        }
        Ok(())
    }
}
