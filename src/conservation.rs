// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Conservation Logic

use serde::{Deserialize, Serialize};

/// Absolute error below this threshold is considered balanced.
const TOLERANCE: f64 = 1e-6;

/// Compute the conservation error (value leaked).
///
/// Coins only enter the economy as starting balances and block emission;
/// purchase fees move coins from users to the company. So in a closed system:
///   starting_balances + emitted = user_wealth + company_wallet
pub fn compute_conservation(
    starting_balances: f64,
    emitted: f64,
    user_wealth: f64,
    company_wallet: f64,
) -> f64 {
    ((starting_balances + emitted) - (user_wealth + company_wallet)).abs()
}

/// Outcome of one per-block check.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct ConservationResult {
    pub balanced: bool,
    pub error: f64,
}

/// Tracks running totals of coins created and the worst error seen.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Ledger {
    pub total_emitted: f64,
    pub total_fees: f64,
    pub max_error: f64,
    pub violations: u32,
}

impl Ledger {
    pub fn record_fee(&mut self, fee: f64) {
        self.total_fees += fee;
    }

    pub fn record_emission(&mut self, credited: f64) {
        self.total_emitted += credited;
    }

    pub fn verify(
        &mut self,
        starting_balances: f64,
        user_wealth: f64,
        company_wallet: f64,
    ) -> ConservationResult {
        let error =
            compute_conservation(starting_balances, self.total_emitted, user_wealth, company_wallet);
        // Relative slack for long runs where balances grow large.
        let scale = (starting_balances + self.total_emitted).abs().max(1.0);
        let balanced = error < TOLERANCE * scale;
        if !balanced {
            self.violations += 1;
            log::warn!("conservation off by {:.9} ({} violations)", error, self.violations);
        }
        self.max_error = self.max_error.max(error);
        ConservationResult { balanced, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_system_balances() {
        let mut ledger = Ledger::default();
        ledger.record_fee(3.0);
        ledger.record_emission(100.0);
        // 100 starting, 100 emitted; 3 moved to the company.
        let result = ledger.verify(100.0, 197.0, 3.0);
        assert!(result.balanced);
        assert_eq!(result.error, 0.0);
        assert_eq!(ledger.violations, 0);
    }

    #[test]
    fn leak_is_detected() {
        let mut ledger = Ledger::default();
        ledger.record_emission(100.0);
        let result = ledger.verify(100.0, 150.0, 0.0);
        assert!(!result.balanced);
        assert_eq!(result.error, 50.0);
        assert_eq!(ledger.violations, 1);
        assert_eq!(ledger.max_error, 50.0);
    }
}
