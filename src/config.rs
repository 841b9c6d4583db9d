// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::scenario::ScenarioAction;

/// How often a block is added to the chain, in milliseconds.
pub const HASH_RATE_MS: u64 = 3000;
/// Coins created each block.
pub const COINS_PER_BLOCK: f64 = 100.0;
/// Emit a snapshot every this many blocks.
pub const SNAPSHOT_RATE: u64 = 1;
pub const STARTING_USERS: usize = 10;
pub const STARTING_PROBLEMS: usize = 10;
/// 100 creates nothing; every point above 100 is one percent per user per block.
pub const RATE_OF_PROBLEM_CREATION: u32 = 105;
/// Share of a user's expected earnings paid to the company to attempt a problem.
pub const PROBLEM_PURCHASE_RATE: f64 = 0.10;
pub const STARTING_BALANCE: f64 = 10.0;
/// Ceiling for configured coin amounts and difficulties. Fee and share
/// products are taken in `Decimal` (max ~7.9e28), so this leaves headroom.
pub const MAX_AMOUNT: f64 = 1e14;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("tick interval must be non-zero")]
    ZeroTickInterval,

    #[error("snapshot interval must be non-zero")]
    ZeroSnapshotInterval,

    #[error("{field} must be finite and within [0, {max}], got {value}", max = MAX_AMOUNT)]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("purchase rate must lie in [0, 1], got {0}")]
    PurchaseRateOutOfRange(f64),

    #[error("scenario at tick {tick}: {reason}")]
    InvalidScenario { tick: u64, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Overlap policy
// ---------------------------------------------------------------------------

/// What the clock does when a tick runs past the next scheduled slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Drop the slots that were missed and realign to the schedule.
    #[default]
    Skip,
    /// Run every missed slot back to back until caught up.
    Queue,
}

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub tick_interval_ms: u64,
    pub coins_per_block: f64,
    pub snapshot_interval: u64,
    pub initial_users: usize,
    pub initial_problems: usize,
    pub problem_creation_rate: u32,
    pub purchase_rate: f64,
    pub starting_balance: f64,
    pub seed: u64,
    pub overlap_policy: OverlapPolicy,
    pub scenarios: BTreeMap<u64, Vec<ScenarioAction>>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let mut scenarios = BTreeMap::new();
        // A user who publishes a problem and pretends it took a long time.
        scenarios.insert(
            1,
            vec![ScenarioAction::FalseDifficulty {
                name: Some("Chris".to_string()),
                level: -1,
                claimed_difficulty: 10.0,
            }],
        );
        scenarios.insert(
            7,
            vec![ScenarioAction::AddUser {
                name: Some("Huan".to_string()),
                level: None,
            }],
        );

        Self {
            tick_interval_ms: HASH_RATE_MS,
            coins_per_block: COINS_PER_BLOCK,
            snapshot_interval: SNAPSHOT_RATE,
            initial_users: STARTING_USERS,
            initial_problems: STARTING_PROBLEMS,
            problem_creation_rate: RATE_OF_PROBLEM_CREATION,
            purchase_rate: PROBLEM_PURCHASE_RATE,
            starting_balance: STARTING_BALANCE,
            seed: 0,
            overlap_policy: OverlapPolicy::Skip,
            scenarios,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.snapshot_interval == 0 {
            return Err(ConfigError::ZeroSnapshotInterval);
        }
        check_amount("coins_per_block", self.coins_per_block)?;
        check_amount("starting_balance", self.starting_balance)?;
        if !(0.0..=1.0).contains(&self.purchase_rate) {
            return Err(ConfigError::PurchaseRateOutOfRange(self.purchase_rate));
        }
        for (&tick, actions) in &self.scenarios {
            for action in actions {
                action
                    .validate()
                    .map_err(|reason| ConfigError::InvalidScenario { tick, reason })?;
            }
        }
        Ok(())
    }

    /// Per-user, per-block chance of publishing a new problem.
    pub fn problem_creation_probability(&self) -> f64 {
        (f64::from(self.problem_creation_rate.saturating_sub(100)) / 100.0).min(1.0)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

fn check_amount(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=MAX_AMOUNT).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidAmount { field, value })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
