// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Identifiers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(pub u32);

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// Highest skill level a generated user can draw.
pub const MAX_SKILL_LEVEL: i32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Generated users sit in 0..=10; scripted users may go below zero.
    pub level: i32,
    pub wallet: f64,
}

impl User {
    /// Level used as a divisor. Never below one.
    pub fn effective_level(&self) -> i32 {
        self.level.max(1)
    }
}

// ─── Problem ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: ProblemId,
    pub creator: UserId,
    /// Starts at 1: the creator's own solve seeds the average.
    pub times_solved: u32,
    pub average_time_to_solve: f64,
}

impl Problem {
    pub fn new(id: ProblemId, creator: UserId, average_time_to_solve: f64) -> Self {
        Self {
            id,
            creator,
            times_solved: 1,
            average_time_to_solve,
        }
    }

    /// A user only attempts problems strictly below their level.
    pub fn is_answerable_by(&self, user: &User) -> bool {
        self.average_time_to_solve < f64::from(user.level)
    }
}

// ─── SolvedProblem ───────────────────────────────────────────────────────────

/// One match made during a tick. The difficulty is captured at match time
/// and is what both the payout and the statistics update read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedProblem {
    pub problem: ProblemId,
    pub creator: UserId,
    pub solver: UserId,
    pub solver_level: i32,
    pub recorded_difficulty: f64,
}

impl SolvedProblem {
    pub fn record(problem: &Problem, solver: &User) -> Self {
        Self {
            problem: problem.id,
            creator: problem.creator,
            solver: solver.id,
            solver_level: solver.level,
            recorded_difficulty: problem.average_time_to_solve,
        }
    }
}

// ─── BlockContext ────────────────────────────────────────────────────────────

/// Scratch state for a single tick. Dropped once rewards are paid.
///
/// The block owns its solved records together with their applied flags, so
/// a copied record carries no statistics state with it.
#[derive(Debug, Default)]
pub struct BlockContext {
    pub tick: u64,
    pub total_time_spent: f64,
    solved: Vec<SolvedProblem>,
    applied: Vec<bool>,
}

impl BlockContext {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    pub fn push(&mut self, record: SolvedProblem) {
        self.solved.push(record);
        self.applied.push(false);
    }

    pub fn solved(&self) -> &[SolvedProblem] {
        &self.solved
    }

    pub fn len(&self) -> usize {
        self.solved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solved.is_empty()
    }

    pub fn is_applied(&self, index: usize) -> bool {
        self.applied.get(index).copied().unwrap_or(false)
    }

    /// Flip a record to applied. False if it already was, or does not exist.
    pub(crate) fn mark_applied(&mut self, index: usize) -> bool {
        match self.applied.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    /// Fold every recorded difficulty into the block's total time.
    pub fn accumulate(&mut self) -> f64 {
        self.total_time_spent = self.solved.iter().map(|s| s.recorded_difficulty).sum();
        self.total_time_spent
    }

    pub fn into_solved(self) -> Vec<SolvedProblem> {
        self.solved
    }
}

// ─── TickResult ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct TickResult {
    pub tick: u64,
    pub new_problems: usize,
    pub matches: usize,
    pub fees_collected: f64,
    pub coins_paid_out: f64,
    pub block_total_time: f64,
    pub payment_skipped: bool,
    pub payout_skipped: bool,
    pub snapshot_emitted: bool,
    /// Every match made this block, in matching order.
    pub solved: Vec<SolvedProblem>,
}

// ─── SimStats ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimStats {
    pub tick: u64,
    pub user_count: usize,
    pub problem_count: usize,
    pub company_wallet: f64,
    pub total_emitted: f64,
    pub total_fees: f64,
    pub total_starting_balance: f64,
    pub total_value_leaked: f64,
    pub mean_wallet: f64,
    pub min_wallet: f64,
    pub max_wallet: f64,
    pub wealth_gini: f64,
    pub mean_difficulty: f64,
    pub total_matches: u64,
}
