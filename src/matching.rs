// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Problem Matching

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::{Problem, User};

/// Pick a problem the user can answer, uniformly among every problem whose
/// average time to solve sits strictly below the user's level.
///
/// Returns `None` when nothing qualifies, which is common early on and for
/// low level users. Matches are not exclusive: several users may land on the
/// same problem in one block.
pub fn choose_problem<'a, R: Rng + ?Sized>(
    user: &User,
    problems: &'a [Problem],
    rng: &mut R,
) -> Option<&'a Problem> {
    let answerable: Vec<&Problem> = problems
        .iter()
        .filter(|p| p.is_answerable_by(user))
        .collect();
    answerable.choose(rng).copied()
}
