// Run Report Types
// Structured output for analysing a finished run

use learncoin_arena::clock::ClockReport;
use learncoin_arena::{SimStats, Simulation, UserId};
use serde::Serialize;
use std::time::Duration;

// ─── Problem Summary ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ProblemSummary {
    pub problem_id: u32,
    pub creator: UserId,
    pub times_solved: u32,
    pub average_time_to_solve: f64,
}

// ─── Wallet Summary ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct WalletSummary {
    pub user: UserId,
    pub name: Option<String>,
    pub level: i32,
    pub wallet: f64,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub elapsed_ms: u128,
    pub clock: Option<ClockReport>,
    pub stats: SimStats,
    pub richest: Vec<WalletSummary>,
    pub most_solved: Vec<ProblemSummary>,
}

impl RunReport {
    pub fn new(sim: &Simulation, clock: Option<ClockReport>, elapsed: Duration) -> Self {
        let mut wallets: Vec<WalletSummary> = sim
            .users()
            .iter()
            .map(|u| WalletSummary {
                user: u.id,
                name: u.name.clone(),
                level: u.level,
                wallet: u.wallet,
            })
            .collect();
        wallets.sort_by(|a, b| b.wallet.total_cmp(&a.wallet));
        wallets.truncate(5);

        let mut problems: Vec<ProblemSummary> = sim
            .problems()
            .iter()
            .map(|p| ProblemSummary {
                problem_id: p.id.0,
                creator: p.creator,
                times_solved: p.times_solved,
                average_time_to_solve: p.average_time_to_solve,
            })
            .collect();
        problems.sort_by(|a, b| b.times_solved.cmp(&a.times_solved));
        problems.truncate(5);

        Self {
            seed: sim.config().seed,
            elapsed_ms: elapsed.as_millis(),
            clock,
            stats: sim.stats(),
            richest: wallets,
            most_solved: problems,
        }
    }
}
