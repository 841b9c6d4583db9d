// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Reward distribution -- purchase fees in, block emission out.
//!
//! Two phases run every block. While users are being matched, each match
//! charges the solver a purchase fee proportional to what the problem is
//! expected to earn, measured against the previous block's total time. Once
//! all matches are known, the block's fresh coins are split across the
//! solved records in proportion to their recorded difficulty: the solver
//! takes 90% of a record's share and the problem's creator 10%.
//!
//! Share arithmetic is done in `Decimal` so the split sums exactly to the
//! emission; wallets themselves stay in `f64`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::population::Population;
use crate::types::{SolvedProblem, User, UserId};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RewardError {
    #[error("block total time is {0}; proportional shares are undefined")]
    DegenerateBlockTime(f64),

    #[error("{0} overflowed the decimal range")]
    Overflow(&'static str),
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Convert f64 to Decimal (lossy but sufficient for simulation).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Like [`to_decimal`], but a value outside the decimal range is an error
/// instead of zero.
fn checked_decimal(v: f64, what: &'static str) -> Result<Decimal, RewardError> {
    Decimal::from_f64(v).ok_or(RewardError::Overflow(what))
}

pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

fn checked_total(total: f64) -> Result<Decimal, RewardError> {
    let d = to_decimal(total);
    if !total.is_finite() || d <= Decimal::ZERO {
        return Err(RewardError::DegenerateBlockTime(total));
    }
    Ok(d)
}

// ---------------------------------------------------------------------------
// Company wallet
// ---------------------------------------------------------------------------

/// Process-wide balance that collects purchase fees. Only this module credits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyWallet(f64);

impl CompanyWallet {
    pub fn balance(&self) -> f64 {
        self.0
    }

    fn credit(&mut self, amount: f64) {
        self.0 += amount;
    }
}

// ---------------------------------------------------------------------------
// Payment phase
// ---------------------------------------------------------------------------

/// Fee a user pays to attempt a problem:
/// `(difficulty / previous_block_time) * coins_per_block * purchase_rate`.
pub fn purchase_fee(
    difficulty: f64,
    previous_block_time: f64,
    coins_per_block: f64,
    purchase_rate: f64,
) -> Result<f64, RewardError> {
    let total = checked_total(previous_block_time)?;
    let fee = checked_decimal(difficulty, "difficulty")?
        .checked_div(total)
        .and_then(|share| share.checked_mul(to_decimal(coins_per_block)))
        .and_then(|expected| expected.checked_mul(to_decimal(purchase_rate)))
        .ok_or(RewardError::Overflow("purchase fee"))?;
    Ok(from_decimal(fee))
}

/// Move a purchase fee from the user's wallet into the company wallet.
pub fn charge_purchase(user: &mut User, company: &mut CompanyWallet, fee: f64) {
    user.wallet -= fee;
    company.credit(fee);
}

// ---------------------------------------------------------------------------
// Payout phase
// ---------------------------------------------------------------------------

/// A single credit produced by the payout phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub user: UserId,
    pub amount: f64,
    pub kind: PayoutKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutKind {
    Solver,
    Royalty,
}

/// Stateless splitter holding the solver/creator ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardDistributor {
    /// Fraction of a record's share paid to the solver (default 0.90).
    pub solver_share: Decimal,
    /// Fraction of a record's share paid to the creator (default 0.10).
    pub creator_share: Decimal,
}

impl Default for RewardDistributor {
    fn default() -> Self {
        Self {
            solver_share: dec!(0.90),
            creator_share: dec!(0.10),
        }
    }
}

impl RewardDistributor {
    /// Compute the payouts for one block. `block_time` must be the sum of the
    /// records' recorded difficulties.
    pub fn distribute(
        &self,
        solved: &[SolvedProblem],
        block_time: f64,
        emission: f64,
    ) -> Result<Vec<Payout>, RewardError> {
        if solved.is_empty() {
            return Ok(Vec::new());
        }
        let total = checked_total(block_time)?;
        let emission = checked_decimal(emission, "emission")?;
        let share_of = |contribution: Decimal, fraction: Decimal| {
            contribution
                .checked_mul(fraction)
                .and_then(|d| d.checked_mul(emission))
                .map(from_decimal)
                .ok_or(RewardError::Overflow("payout share"))
        };

        let mut payouts = Vec::with_capacity(solved.len() * 2);
        for record in solved {
            let contribution = checked_decimal(record.recorded_difficulty, "recorded difficulty")?
                .checked_div(total)
                .ok_or(RewardError::Overflow("block contribution"))?;
            payouts.push(Payout {
                user: record.solver,
                amount: share_of(contribution, self.solver_share)?,
                kind: PayoutKind::Solver,
            });
            payouts.push(Payout {
                user: record.creator,
                amount: share_of(contribution, self.creator_share)?,
                kind: PayoutKind::Royalty,
            });
        }
        Ok(payouts)
    }
}

/// Credit payouts to wallets. Returns the amount actually credited; payouts
/// to ids not in the population are dropped.
pub fn apply_payouts(population: &mut Population, payouts: &[Payout]) -> f64 {
    let mut credited = 0.0;
    for payout in payouts {
        match population.get_mut(payout.user) {
            Some(user) => {
                user.wallet += payout.amount;
                credited += payout.amount;
            }
            None => log::warn!("payout of {} to unknown user {} dropped", payout.amount, payout.user),
        }
    }
    credited
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProblemId;

    fn record(problem: u32, creator: u32, solver: u32, difficulty: f64) -> SolvedProblem {
        SolvedProblem {
            problem: ProblemId(problem),
            creator: UserId(creator),
            solver: UserId(solver),
            solver_level: 10,
            recorded_difficulty: difficulty,
        }
    }

    #[test]
    fn purchase_fee_matches_formula() {
        let fee = purchase_fee(3.0, 30.0, 100.0, 0.10).unwrap();
        assert!((fee - 1.0).abs() < 1e-9);
    }

    #[test]
    fn purchase_fee_zero_time_is_degenerate() {
        assert_eq!(
            purchase_fee(3.0, 0.0, 100.0, 0.10),
            Err(RewardError::DegenerateBlockTime(0.0))
        );
        assert!(purchase_fee(3.0, f64::INFINITY, 100.0, 0.10).is_err());
        assert!(purchase_fee(3.0, f64::NAN, 100.0, 0.10).is_err());
    }

    #[test]
    fn purchase_fee_overflow_is_an_error() {
        assert_eq!(
            purchase_fee(10.0, 1.0, 1e28, 0.1),
            Err(RewardError::Overflow("purchase fee"))
        );
        assert_eq!(
            purchase_fee(1e30, 1.0, 100.0, 0.1),
            Err(RewardError::Overflow("difficulty"))
        );
    }

    #[test]
    fn charge_moves_coins_to_company() {
        let mut user = User { id: UserId(0), name: None, level: 5, wallet: 10.0 };
        let mut company = CompanyWallet::default();
        charge_purchase(&mut user, &mut company, 2.5);
        assert_eq!(user.wallet, 7.5);
        assert_eq!(company.balance(), 2.5);
        // Wallets may go negative.
        charge_purchase(&mut user, &mut company, 10.0);
        assert_eq!(user.wallet, -2.5);
    }

    #[test]
    fn split_sums_to_emission() {
        let solved = vec![record(0, 1, 2, 2.0), record(1, 3, 4, 3.0), record(0, 1, 5, 2.0)];
        let total: f64 = solved.iter().map(|r| r.recorded_difficulty).sum();
        let payouts = RewardDistributor::default().distribute(&solved, total, 100.0).unwrap();
        assert_eq!(payouts.len(), 6);
        let sum: f64 = payouts.iter().map(|p| p.amount).sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum {}", sum);

        let solver_2 = payouts.iter().find(|p| p.user == UserId(2)).unwrap();
        assert_eq!(solver_2.kind, PayoutKind::Solver);
        assert!((solver_2.amount - 2.0 / 7.0 * 90.0).abs() < 1e-9);
        let royalty_3 = payouts.iter().find(|p| p.user == UserId(3)).unwrap();
        assert_eq!(royalty_3.kind, PayoutKind::Royalty);
        assert!((royalty_3.amount - 3.0 / 7.0 * 10.0).abs() < 1e-9);
    }

    #[test]
    fn self_solve_earns_both_shares() {
        let solved = vec![record(0, 1, 1, 4.0)];
        let payouts = RewardDistributor::default().distribute(&solved, 4.0, 100.0).unwrap();
        let total_to_1: f64 = payouts.iter().filter(|p| p.user == UserId(1)).map(|p| p.amount).sum();
        assert!((total_to_1 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn no_records_no_payouts() {
        let payouts = RewardDistributor::default().distribute(&[], 0.0, 100.0).unwrap();
        assert!(payouts.is_empty());
    }

    #[test]
    fn zero_block_time_with_records_is_degenerate() {
        let solved = vec![record(0, 1, 2, 0.0)];
        let err = RewardDistributor::default().distribute(&solved, 0.0, 100.0).unwrap_err();
        assert_eq!(err, RewardError::DegenerateBlockTime(0.0));
    }

    #[test]
    fn emission_outside_decimal_range_is_an_error() {
        let solved = vec![record(0, 1, 2, 4.0)];
        let err = RewardDistributor::default().distribute(&solved, 4.0, 1e30).unwrap_err();
        assert_eq!(err, RewardError::Overflow("emission"));
    }

    #[test]
    fn payouts_to_unknown_users_are_dropped() {
        let mut population = Population::new();
        let known = population.spawn(None, 5, 0.0);
        let payouts = vec![
            Payout { user: known, amount: 9.0, kind: PayoutKind::Solver },
            Payout { user: UserId(42), amount: 1.0, kind: PayoutKind::Royalty },
        ];
        let credited = apply_payouts(&mut population, &payouts);
        assert_eq!(credited, 9.0);
        assert_eq!(population.get(known).unwrap().wallet, 9.0);
    }
}
