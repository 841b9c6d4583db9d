// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Scenario Injection

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::MAX_AMOUNT;
use crate::population::{random_level, World};

/// Anything that can perturb the world at a given block, between problem
/// growth and matching.
pub trait ScenarioHandler {
    fn apply(&self, world: &mut World, rng: &mut dyn RngCore);

    fn describe(&self) -> String {
        "custom scenario".to_string()
    }
}

impl<F> ScenarioHandler for F
where
    F: Fn(&mut World, &mut dyn RngCore),
{
    fn apply(&self, world: &mut World, rng: &mut dyn RngCore) {
        self(world, rng)
    }
}

// ─── Built-in actions ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioAction {
    /// A new user joins. Without a level one is drawn like any other user.
    AddUser {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        level: Option<i32>,
    },
    /// A low skill user publishes a problem and claims it took a long time
    /// to solve, without ever solving it. Inflates that problem's reward
    /// weight until real solves pull the average back down.
    FalseDifficulty {
        #[serde(default)]
        name: Option<String>,
        level: i32,
        claimed_difficulty: f64,
    },
}

impl ScenarioAction {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::AddUser { .. } => Ok(()),
            Self::FalseDifficulty { claimed_difficulty, .. } => {
                if (0.0..=MAX_AMOUNT).contains(claimed_difficulty) {
                    Ok(())
                } else {
                    Err(format!("claimed difficulty {} is not a valid time", claimed_difficulty))
                }
            }
        }
    }
}

/// A built-in action bound to the wallet new users start with.
#[derive(Debug, Clone)]
pub struct BoundAction {
    pub action: ScenarioAction,
    pub starting_balance: f64,
}

impl ScenarioHandler for BoundAction {
    fn apply(&self, world: &mut World, rng: &mut dyn RngCore) {
        match &self.action {
            ScenarioAction::AddUser { name, level } => {
                let level = level.unwrap_or_else(|| random_level(rng));
                let id = world.add_user(name.clone(), level, self.starting_balance);
                log::info!("scenario: user {} joined at level {}", id, level);
            }
            ScenarioAction::FalseDifficulty { name, level, claimed_difficulty } => {
                let attacker = world.add_user(name.clone(), *level, self.starting_balance);
                let problem = world.problems.publish(attacker, *claimed_difficulty);
                log::info!(
                    "scenario: user {} (level {}) published {} claiming difficulty {}",
                    attacker, level, problem, claimed_difficulty
                );
            }
        }
    }

    fn describe(&self) -> String {
        format!("{:?}", self.action)
    }
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// Block index to handlers. Handlers registered for the same block run in
/// registration order.
#[derive(Default)]
pub struct ScenarioTable {
    entries: BTreeMap<u64, Vec<Box<dyn ScenarioHandler>>>,
}

impl ScenarioTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_actions(actions: &BTreeMap<u64, Vec<ScenarioAction>>, starting_balance: f64) -> Self {
        let mut table = Self::new();
        for (&tick, list) in actions {
            for action in list {
                table.register(
                    tick,
                    BoundAction { action: action.clone(), starting_balance },
                );
            }
        }
        table
    }

    pub fn register<H: ScenarioHandler + 'static>(&mut self, tick: u64, handler: H) {
        self.entries.entry(tick).or_default().push(Box::new(handler));
    }

    /// Run everything registered for `tick`. Returns how many handlers ran.
    pub fn run(&self, tick: u64, world: &mut World, rng: &mut dyn RngCore) -> usize {
        match self.entries.get(&tick) {
            Some(handlers) => {
                for handler in handlers {
                    log::debug!("tick {}: running {}", tick, handler.describe());
                    handler.apply(world, rng);
                }
                handlers.len()
            }
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ScenarioTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(tick, hs)| (tick, hs.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn false_difficulty_adds_attacker_and_problem() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut world = World::new();
        let handler = BoundAction {
            action: ScenarioAction::FalseDifficulty {
                name: Some("Chris".into()),
                level: -1,
                claimed_difficulty: 10.0,
            },
            starting_balance: 10.0,
        };
        handler.apply(&mut world, &mut rng);

        assert_eq!(world.population.len(), 1);
        let attacker = &world.population.users()[0];
        assert_eq!(attacker.level, -1);
        assert_eq!(attacker.name.as_deref(), Some("Chris"));
        let problem = &world.problems.problems()[0];
        assert_eq!(problem.creator, attacker.id);
        assert_eq!(problem.average_time_to_solve, 10.0);
        assert_eq!(problem.times_solved, 1);
    }

    #[test]
    fn add_user_draws_level_when_unset() {
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let mut world = World::new();
        let handler = BoundAction {
            action: ScenarioAction::AddUser { name: Some("Huan".into()), level: None },
            starting_balance: 10.0,
        };
        handler.apply(&mut world, &mut rng);
        let user = &world.population.users()[0];
        assert!((0..=10).contains(&user.level));
        assert_eq!(world.total_starting_balance, 10.0);
    }

    #[test]
    fn table_runs_only_matching_tick_in_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let mut world = World::new();
        let mut table = ScenarioTable::new();
        table.register(4, |w: &mut World, _: &mut dyn RngCore| {
            w.add_user(Some("first".into()), 3, 0.0);
        });
        table.register(4, |w: &mut World, _: &mut dyn RngCore| {
            w.add_user(Some("second".into()), 3, 0.0);
        });
        table.register(5, |w: &mut World, _: &mut dyn RngCore| {
            w.add_user(None, 3, 0.0);
        });

        assert_eq!(table.run(3, &mut world, &mut rng), 0);
        assert!(world.population.is_empty());
        assert_eq!(table.run(4, &mut world, &mut rng), 2);
        let names: Vec<_> = world.population.iter().map(|u| u.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn negative_claim_is_invalid() {
        let action = ScenarioAction::FalseDifficulty { name: None, level: 0, claimed_difficulty: -1.0 };
        assert!(action.validate().is_err());
        let action = ScenarioAction::FalseDifficulty { name: None, level: 0, claimed_difficulty: 1e30 };
        assert!(action.validate().is_err());
        let action = ScenarioAction::AddUser { name: None, level: Some(3) };
        assert!(action.validate().is_ok());
    }
}
