// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Simulation Core

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

use crate::config::{ConfigError, SimConfig};
use crate::conservation::Ledger;
use crate::matching;
use crate::population::{self, World};
use crate::rewards::{self, CompanyWallet, RewardDistributor};
use crate::scenario::{ScenarioHandler, ScenarioTable};
use crate::snapshot::{SnapshotSink, SnapshotView};
use crate::statistics;
use crate::types::*;

// ─── Simulation struct ───────────────────────────────────────────────────────

/// One independent LearnCoin economy. Every block is advanced by
/// [`tick_core`](Self::tick_core); nothing here is shared between instances.
#[wasm_bindgen]
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) world: World,
    pub(crate) company: CompanyWallet,
    pub(crate) ledger: Ledger,
    pub(crate) distributor: RewardDistributor,
    pub(crate) scenarios: ScenarioTable,
    pub(crate) sinks: Vec<Box<dyn SnapshotSink>>,
    pub(crate) rng: ChaCha8Rng,

    pub(crate) tick_index: u64,
    // Total time of the last block, the denominator for purchase fees.
    pub(crate) previous_block_time: f64,
    pub(crate) total_matches: u64,
}

// ─── Construction ────────────────────────────────────────────────────────────

impl Simulation {
    /// Validate the config, then seed users and problems from its RNG seed.
    pub fn with_config(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut world = World::new();
        population::create_users(&mut world, config.initial_users, config.starting_balance, &mut rng);
        population::create_initial_problems(&mut world, config.initial_problems, &mut rng);
        Ok(Self::assemble(config, world, rng))
    }

    /// Start from a prepared world instead of generating one.
    pub fn from_world(config: SimConfig, world: World) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Ok(Self::assemble(config, world, rng))
    }

    fn assemble(config: SimConfig, world: World, rng: ChaCha8Rng) -> Self {
        let scenarios = ScenarioTable::from_actions(&config.scenarios, config.starting_balance);
        // Seed the first block's fee denominator with the initial averages.
        let previous_block_time = world.problems.total_difficulty();
        Self {
            config,
            world,
            company: CompanyWallet::default(),
            ledger: Ledger::default(),
            distributor: RewardDistributor::default(),
            scenarios,
            sinks: Vec::new(),
            rng,
            tick_index: 0,
            previous_block_time,
            total_matches: 0,
        }
    }

    pub fn add_sink<S: SnapshotSink + 'static>(&mut self, sink: S) {
        self.sinks.push(Box::new(sink));
    }

    pub fn register_scenario<H: ScenarioHandler + 'static>(&mut self, tick: u64, handler: H) {
        self.scenarios.register(tick, handler);
    }

    /// Rebuild from the same config. Sinks survive; custom scenario handlers do not.
    pub fn restart(&mut self) -> Result<(), ConfigError> {
        let fresh = Self::with_config(self.config.clone())?;
        let sinks = std::mem::take(&mut self.sinks);
        *self = fresh;
        self.sinks = sinks;
        Ok(())
    }
}

// ─── Tick ────────────────────────────────────────────────────────────────────

impl Simulation {
    pub fn tick_core(&mut self) -> TickResult {
        let tick = self.tick_index;
        let mut block = BlockContext::new(tick);
        let mut result = TickResult { tick, ..Default::default() };

        // 1. Some users publish new problems every block.
        result.new_problems = population::grow_problems(
            &mut self.world,
            self.config.problem_creation_probability(),
            &mut self.rng,
        );

        // 2. Snapshot
        if tick % self.config.snapshot_interval == 0 {
            self.emit_snapshot(tick);
            result.snapshot_emitted = true;
        }

        if !self.world.problems.is_empty() {
            // 3. Scripted perturbations land before anyone picks a problem.
            self.scenarios.run(tick, &mut self.world, &mut self.rng);

            // 4. Match and charge
            self.solve_problems(&mut block, &mut result);

            // 5. Difficulty estimates
            statistics::adjust_average_solution_times(&mut self.world, &mut block);

            // 6. Block emission
            self.distribute_coins(&mut block, &mut result);
        }

        self.previous_block_time = block.total_time_spent;
        self.tick_index += 1;
        result.solved = block.into_solved();

        self.ledger.verify(
            self.world.total_starting_balance,
            self.world.population.total_wealth(),
            self.company.balance(),
        );
        log::debug!(
            "tick {}: {} matches, fees {:.4}, paid {:.4}, block time {:.4}",
            tick, result.matches, result.fees_collected, result.coins_paid_out, result.block_total_time
        );
        result
    }

    fn emit_snapshot(&mut self, tick: u64) {
        let view = SnapshotView {
            tick,
            company_wallet: self.company.balance(),
            users: self.world.population.users(),
            problems: self.world.problems.problems(),
        };
        for sink in self.sinks.iter_mut() {
            sink.emit(&view);
        }
    }

    /// Every user tries to find a problem; each match pays a purchase fee
    /// priced against the previous block.
    fn solve_problems(&mut self, block: &mut BlockContext, result: &mut TickResult) {
        for idx in 0..self.world.population.len() {
            let user = &self.world.population.users()[idx];
            let record = match matching::choose_problem(user, self.world.problems.problems(), &mut self.rng) {
                Some(problem) => SolvedProblem::record(problem, user),
                None => continue,
            };

            match rewards::purchase_fee(
                record.recorded_difficulty,
                self.previous_block_time,
                self.config.coins_per_block,
                self.config.purchase_rate,
            ) {
                Ok(fee) => {
                    let user = &mut self.world.population.users_mut()[idx];
                    rewards::charge_purchase(user, &mut self.company, fee);
                    self.ledger.record_fee(fee);
                    result.fees_collected += fee;
                }
                Err(e) => {
                    if !result.payment_skipped {
                        log::warn!("tick {}: purchase fees skipped: {}", block.tick, e);
                    }
                    result.payment_skipped = true;
                }
            }
            block.push(record);
        }
        result.matches = block.len();
        self.total_matches += block.len() as u64;
    }

    /// Split this block's fresh coins over the solved records.
    fn distribute_coins(&mut self, block: &mut BlockContext, result: &mut TickResult) {
        result.block_total_time = block.accumulate();
        match self.distributor.distribute(block.solved(), block.total_time_spent, self.config.coins_per_block) {
            Ok(payouts) => {
                let credited = rewards::apply_payouts(&mut self.world.population, &payouts);
                self.ledger.record_emission(credited);
                result.coins_paid_out = credited;
            }
            Err(e) => {
                log::warn!("tick {}: payout skipped: {}", block.tick, e);
                result.payout_skipped = true;
            }
        }
    }
}

// ─── Accessors ───────────────────────────────────────────────────────────────

impl Simulation {
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn users(&self) -> &[User] {
        self.world.population.users()
    }

    pub fn problems(&self) -> &[Problem] {
        self.world.problems.problems()
    }

    pub fn company_wallet(&self) -> f64 {
        self.company.balance()
    }

    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    pub fn previous_block_time(&self) -> f64 {
        self.previous_block_time
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn snapshot_view(&self) -> SnapshotView<'_> {
        SnapshotView {
            tick: self.tick_index,
            company_wallet: self.company.balance(),
            users: self.world.population.users(),
            problems: self.world.problems.problems(),
        }
    }

    pub fn stats(&self) -> SimStats {
        let wallets: Vec<f64> = self.world.population.iter().map(|u| u.wallet).collect();
        let user_wealth: f64 = wallets.iter().sum();
        let n = wallets.len();
        let mean_wallet = if n > 0 { user_wealth / n as f64 } else { 0.0 };
        let problem_count = self.world.problems.len();
        let mean_difficulty = if problem_count > 0 {
            self.world.problems.total_difficulty() / problem_count as f64
        } else {
            0.0
        };

        SimStats {
            tick: self.tick_index,
            user_count: n,
            problem_count,
            company_wallet: self.company.balance(),
            total_emitted: self.ledger.total_emitted,
            total_fees: self.ledger.total_fees,
            total_starting_balance: self.world.total_starting_balance,
            total_value_leaked: crate::conservation::compute_conservation(
                self.world.total_starting_balance,
                self.ledger.total_emitted,
                user_wealth,
                self.company.balance(),
            ),
            mean_wallet,
            min_wallet: if n > 0 { wallets.iter().cloned().fold(f64::INFINITY, f64::min) } else { 0.0 },
            max_wallet: if n > 0 { wallets.iter().cloned().fold(f64::NEG_INFINITY, f64::max) } else { 0.0 },
            wealth_gini: compute_gini(&wallets),
            mean_difficulty,
            total_matches: self.total_matches,
        }
    }
}

// ─── Wealth Inequality ───────────────────────────────────────────────────────

/// Gini coefficient of a wealth distribution. Zero for an empty or
/// non-positive total; can exceed one once wallets go negative.
pub(crate) fn compute_gini(values: &[f64]) -> f64 {
    let n = values.len();
    let total: f64 = values.iter().sum();
    if n < 2 || total <= 0.0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| (2.0 * (i as f64 + 1.0) - n as f64 - 1.0) * x)
        .sum();
    weighted / (n as f64 * total)
}
