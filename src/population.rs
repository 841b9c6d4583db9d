// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Population & Problem Set

use rand::Rng;
use std::collections::HashMap;

use crate::types::*;

// ─── Population ──────────────────────────────────────────────────────────────

/// Append-only user registry. Ids are handed out sequentially and resolve
/// to a slot in the backing vector.
#[derive(Debug, Clone, Default)]
pub struct Population {
    users: Vec<User>,
    slots: HashMap<UserId, usize>,
    next_id: u32,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, name: Option<String>, level: i32, wallet: f64) -> UserId {
        let id = UserId(self.next_id);
        self.next_id += 1;
        self.slots.insert(id, self.users.len());
        self.users.push(User { id, name, level, wallet });
        id
    }

    pub fn get(&self, id: UserId) -> Option<&User> {
        self.slots.get(&id).map(|&slot| &self.users[slot])
    }

    pub fn get_mut(&mut self, id: UserId) -> Option<&mut User> {
        match self.slots.get(&id) {
            Some(&slot) => self.users.get_mut(slot),
            None => None,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Wallets and names may change; the slice cannot grow or shrink.
    pub fn users_mut(&mut self) -> &mut [User] {
        &mut self.users
    }

    pub fn iter(&self) -> std::slice::Iter<'_, User> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn total_wealth(&self) -> f64 {
        self.users.iter().map(|u| u.wallet).sum()
    }
}

// ─── ProblemSet ──────────────────────────────────────────────────────────────

/// Append-only problem registry, same layout as [`Population`].
#[derive(Debug, Clone, Default)]
pub struct ProblemSet {
    problems: Vec<Problem>,
    slots: HashMap<ProblemId, usize>,
    next_id: u32,
}

impl ProblemSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, creator: UserId, difficulty: f64) -> ProblemId {
        let id = ProblemId(self.next_id);
        self.next_id += 1;
        self.slots.insert(id, self.problems.len());
        self.problems.push(Problem::new(id, creator, difficulty));
        id
    }

    pub fn get(&self, id: ProblemId) -> Option<&Problem> {
        self.slots.get(&id).map(|&slot| &self.problems[slot])
    }

    pub fn get_mut(&mut self, id: ProblemId) -> Option<&mut Problem> {
        match self.slots.get(&id) {
            Some(&slot) => self.problems.get_mut(slot),
            None => None,
        }
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn total_difficulty(&self) -> f64 {
        self.problems.iter().map(|p| p.average_time_to_solve).sum()
    }
}

// ─── World ───────────────────────────────────────────────────────────────────

/// The mutable population and problem set that growth and scenarios append to.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub population: Population,
    pub problems: ProblemSet,
    /// Sum of starting balances handed to every user ever created.
    pub total_starting_balance: f64,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user and record their starting balance in the ledger.
    pub fn add_user(&mut self, name: Option<String>, level: i32, wallet: f64) -> UserId {
        self.total_starting_balance += wallet;
        self.population.spawn(name, level, wallet)
    }
}

// ─── Generation ──────────────────────────────────────────────────────────────

pub fn random_level<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(0..=MAX_SKILL_LEVEL)
}

/// Low level creators can only write easy problems; a high level creator can
/// write anything up to their own level. Levels below one clamp to one.
pub fn draw_difficulty<R: Rng + ?Sized>(rng: &mut R, creator_level: i32) -> f64 {
    f64::from(rng.gen_range(1..=creator_level.max(1)))
}

pub fn create_users<R: Rng + ?Sized>(
    world: &mut World,
    count: usize,
    starting_balance: f64,
    rng: &mut R,
) -> Vec<UserId> {
    (0..count)
        .map(|_| {
            let level = random_level(rng);
            world.add_user(None, level, starting_balance)
        })
        .collect()
}

/// Seed the problem set. Creates `count + 1` problems, each attributed to a
/// uniformly chosen existing user. Nothing is created without users.
pub fn create_initial_problems<R: Rng + ?Sized>(
    world: &mut World,
    count: usize,
    rng: &mut R,
) -> usize {
    if world.population.is_empty() {
        return 0;
    }
    for _ in 0..=count {
        let idx = rng.gen_range(0..world.population.len());
        let creator = &world.population.users()[idx];
        let difficulty = draw_difficulty(rng, creator.level);
        world.problems.publish(creator.id, difficulty);
    }
    count + 1
}

/// Each user independently publishes one problem with `probability`.
pub fn grow_problems<R: Rng + ?Sized>(world: &mut World, probability: f64, rng: &mut R) -> usize {
    if probability <= 0.0 {
        return 0;
    }
    let probability = probability.min(1.0);
    let mut created = 0;
    for user in world.population.iter() {
        if rng.gen_bool(probability) {
            let difficulty = draw_difficulty(rng, user.level);
            world.problems.publish(user.id, difficulty);
            created += 1;
        }
    }
    created
}

// ─── Tests ───────────────────────────────────────────────────────────────────
