// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Rolling Difficulty Statistics

use crate::population::World;
use crate::types::{BlockContext, ProblemId, UserId};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StatisticsError {
    #[error("solved record for {0} was already applied this block")]
    AlreadyApplied(ProblemId),

    #[error("solved record references unknown problem {0}")]
    UnknownProblem(ProblemId),

    #[error("solved record references unknown solver {0}")]
    UnknownSolver(UserId),

    #[error("block has no solved record at index {0}")]
    UnknownRecord(usize),
}

/// Time the solver "really" took, corrected for their level:
/// `10 * difficulty / level`. Levels below one count as one.
pub fn adjusted_time_to_solve(recorded_difficulty: f64, solver_level: i32) -> f64 {
    10.0 * (recorded_difficulty / f64::from(solver_level.max(1)))
}

/// Running weighted mean with the new sample folded in.
pub fn fold_average(times_solved: u32, average: f64, sample: f64) -> f64 {
    let n = f64::from(times_solved);
    (n * average + sample) / (n + 1.0)
}

/// Fold the block's `index`th solved record into its problem's average and
/// bump the solve count. A record updates its problem exactly once; reapplying
/// it is an error and leaves the problem untouched.
pub fn apply_solved(world: &mut World, block: &mut BlockContext, index: usize) -> Result<f64, StatisticsError> {
    let record = block
        .solved()
        .get(index)
        .cloned()
        .ok_or(StatisticsError::UnknownRecord(index))?;
    if block.is_applied(index) {
        return Err(StatisticsError::AlreadyApplied(record.problem));
    }
    let level = world
        .population
        .get(record.solver)
        .map(|u| u.level)
        .ok_or(StatisticsError::UnknownSolver(record.solver))?;
    let problem = world
        .problems
        .get_mut(record.problem)
        .ok_or(StatisticsError::UnknownProblem(record.problem))?;

    let adjusted = adjusted_time_to_solve(record.recorded_difficulty, level);
    problem.average_time_to_solve =
        fold_average(problem.times_solved, problem.average_time_to_solve, adjusted);
    problem.times_solved += 1;
    block.mark_applied(index);
    Ok(problem.average_time_to_solve)
}

/// Apply every record of a block. Failures are logged and skipped.
pub fn adjust_average_solution_times(world: &mut World, block: &mut BlockContext) -> usize {
    let mut applied = 0;
    for index in 0..block.len() {
        match apply_solved(world, block, index) {
            Ok(_) => applied += 1,
            Err(e) => log::warn!("skipping statistics update: {}", e),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Problem, SolvedProblem};

    fn world_with(level: i32, difficulty: f64) -> (World, BlockContext) {
        let mut world = World::new();
        let creator = world.add_user(None, 10, 10.0);
        let solver = world.add_user(None, level, 10.0);
        let pid = world.problems.publish(creator, difficulty);
        let problem = world.problems.get(pid).unwrap().clone();
        let user = world.population.get(solver).unwrap().clone();
        let mut block = BlockContext::new(0);
        block.push(SolvedProblem::record(&problem, &user));
        (world, block)
    }

    fn problem(world: &World, id: ProblemId) -> &Problem {
        world.problems.get(id).unwrap()
    }

    #[test]
    fn adjusted_time_scales_with_level() {
        assert_eq!(adjusted_time_to_solve(4.0, 8), 5.0);
        assert_eq!(adjusted_time_to_solve(4.0, 10), 4.0);
        assert_eq!(adjusted_time_to_solve(4.0, 0), 40.0);
        assert_eq!(adjusted_time_to_solve(4.0, -1), 40.0);
    }

    #[test]
    fn update_is_bounded_and_increments_once() {
        let (mut world, mut block) = world_with(8, 4.0);
        let pid = block.solved()[0].problem;
        let old = problem(&world, pid).average_time_to_solve;
        let adjusted = adjusted_time_to_solve(4.0, 8);

        let new = apply_solved(&mut world, &mut block, 0).unwrap();
        let p = problem(&world, pid);
        assert_eq!(p.times_solved, 2);
        assert!((new - 4.5).abs() < 1e-12);
        assert!(new > old.min(adjusted) && new < old.max(adjusted));
    }

    #[test]
    fn reapplying_a_record_is_rejected() {
        let (mut world, mut block) = world_with(5, 3.0);
        let pid = block.solved()[0].problem;
        apply_solved(&mut world, &mut block, 0).unwrap();
        let after_first = problem(&world, pid).clone();

        let err = apply_solved(&mut world, &mut block, 0).unwrap_err();
        assert_eq!(err, StatisticsError::AlreadyApplied(pid));
        let after_second = problem(&world, pid);
        assert_eq!(after_second.times_solved, after_first.times_solved);
        assert_eq!(after_second.average_time_to_solve, after_first.average_time_to_solve);
    }

    #[test]
    fn copied_record_cannot_reapply() {
        let (mut world, mut block) = world_with(5, 3.0);
        let pid = block.solved()[0].problem;
        let copy = block.solved()[0].clone();
        apply_solved(&mut world, &mut block, 0).unwrap();

        // A copy carries no applied state; the owning block still refuses it.
        assert_eq!(block.solved()[0], copy);
        let err = apply_solved(&mut world, &mut block, 0).unwrap_err();
        assert_eq!(err, StatisticsError::AlreadyApplied(pid));
        assert_eq!(
            apply_solved(&mut world, &mut block, 1).unwrap_err(),
            StatisticsError::UnknownRecord(1)
        );
        assert_eq!(problem(&world, pid).times_solved, 2);
    }

    #[test]
    fn zero_level_solver_does_not_divide_by_zero() {
        let (mut world, mut block) = world_with(0, 10.0);
        let new = apply_solved(&mut world, &mut block, 0).unwrap();
        assert!(new.is_finite());
        assert_eq!(new, 55.0);
    }

    #[test]
    fn batch_skips_unknown_and_repeated_records() {
        let (mut world, mut block) = world_with(6, 3.0);
        let mut bogus = block.solved()[0].clone();
        bogus.problem = ProblemId(999);
        block.push(bogus);
        assert_eq!(adjust_average_solution_times(&mut world, &mut block), 1);
        assert_eq!(adjust_average_solution_times(&mut world, &mut block), 0);
        assert!(block.is_applied(0));
        assert!(!block.is_applied(1));
        assert_eq!(problem(&world, block.solved()[0].problem).times_solved, 2);
    }
}
