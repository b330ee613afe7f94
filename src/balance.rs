use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::roster::{Player, Position};
use crate::skill::{AttributeProfile, team_skill_average};

/// Dealing order; the round-robin cursor carries over between families.
const DEAL_ORDER: [Position; 3] = [Position::Defender, Position::Midfielder, Position::Attacker];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("team balancing supports 2 or 3 teams, got {0}")]
    UnsupportedTeamCount(usize),
    #[error("at least one trial is required")]
    NoTrials,
}

/// Best partition found by the search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceOutcome {
    /// Player names per team, in dealing order.
    pub teams: Vec<Vec<String>>,
    /// Same partition as indices into the input pool.
    #[serde(skip)]
    pub members: Vec<Vec<usize>>,
    /// Mean weighted skill per team; `None` for a team left empty.
    pub averages: Vec<Option<f64>>,
    pub disparity: f64,
    /// Zero-based index of the trial that produced this partition.
    pub trial: usize,
    pub trials: usize,
}

impl BalanceOutcome {
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    /// `pool` must be the slice the search ran on. Indices it does not
    /// cover are skipped.
    pub fn profiles(&self, pool: &[Player]) -> Vec<Option<AttributeProfile>> {
        self.members
            .iter()
            .map(|team| {
                AttributeProfile::of(
                    team.iter()
                        .filter_map(|&idx| pool.get(idx))
                        .map(|p| &p.attributes),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct TrialResult {
    members: Vec<Vec<usize>>,
    averages: Vec<Option<f64>>,
    disparity: f64,
    trial: usize,
}

pub fn check_team_count(num_teams: usize) -> Result<(), BalanceError> {
    match num_teams {
        2 | 3 => Ok(()),
        n => Err(BalanceError::UnsupportedTeamCount(n)),
    }
}

/// Imbalance between team averages: |a-b| for two teams, the norm of the
/// three pairwise gaps for three. An empty team makes the partition
/// unusable, reported as infinity.
pub fn disparity(averages: &[Option<f64>]) -> Result<f64, BalanceError> {
    check_team_count(averages.len())?;
    let Some(avgs) = averages.iter().copied().collect::<Option<Vec<f64>>>() else {
        return Ok(f64::INFINITY);
    };
    let out = match avgs.as_slice() {
        [a, b] => (a - b).abs(),
        [a, b, c] => {
            let ab = (a - b).abs();
            let ac = (a - c).abs();
            let bc = (b - c).abs();
            (ab * ab + ac * ac + bc * bc).sqrt()
        }
        _ => return Err(BalanceError::UnsupportedTeamCount(avgs.len())),
    };
    Ok(out)
}

/// One randomized deal: shuffle each position family, then hand players out
/// round-robin. Returns indices into `pool` per team.
pub fn deal_teams<R: Rng + ?Sized>(pool: &[Player], num_teams: usize, rng: &mut R) -> Vec<Vec<usize>> {
    let mut teams: Vec<Vec<usize>> = vec![Vec::new(); num_teams];
    if num_teams == 0 {
        return teams;
    }
    let mut cursor = 0usize;
    for position in DEAL_ORDER {
        let mut bucket: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, p)| p.primary == position)
            .map(|(idx, _)| idx)
            .collect();
        bucket.shuffle(rng);
        for idx in bucket {
            teams[cursor].push(idx);
            cursor = (cursor + 1) % num_teams;
        }
    }
    teams
}

fn run_trial<R: Rng + ?Sized>(pool: &[Player], num_teams: usize, trial: usize, rng: &mut R) -> Result<TrialResult, BalanceError> {
    let members = deal_teams(pool, num_teams, rng);
    let averages: Vec<Option<f64>> = members
        .iter()
        .map(|team| team_skill_average(team.iter().map(|&idx| &pool[idx].attributes)))
        .collect();
    let disparity = disparity(&averages)?;
    Ok(TrialResult {
        members,
        averages,
        disparity,
        trial,
    })
}

/// Runs `trials` random deals and keeps the one with the lowest disparity.
/// Ties keep the earliest trial, so more trials never make the result worse.
pub fn balance_teams<R: Rng + ?Sized>(
    pool: &[Player],
    num_teams: usize,
    trials: usize,
    rng: &mut R,
) -> Result<BalanceOutcome, BalanceError> {
    check_team_count(num_teams)?;
    if trials == 0 {
        return Err(BalanceError::NoTrials);
    }

    let mut best: Option<TrialResult> = None;
    for trial in 0..trials {
        let result = run_trial(pool, num_teams, trial, rng)?;
        let better = match best.as_ref() {
            Some(current) => result.disparity < current.disparity,
            None => true,
        };
        if better {
            best = Some(result);
        }
    }

    let best = best.ok_or(BalanceError::NoTrials)?;
    log::debug!(
        "balanced {} players into {} teams: disparity {:.4} at trial {}/{}",
        pool.len(),
        num_teams,
        best.disparity,
        best.trial + 1,
        trials
    );
    Ok(into_outcome(pool, best, trials))
}

/// Trials spread over the rayon pool. Each trial draws from its own RNG
/// seeded by `(seed, trial)` and the minimum is taken on `(disparity, trial)`,
/// so the result is the same for any thread count.
pub fn balance_teams_parallel(
    pool: &[Player],
    num_teams: usize,
    trials: usize,
    seed: u64,
) -> Result<BalanceOutcome, BalanceError> {
    check_team_count(num_teams)?;
    if trials == 0 {
        return Err(BalanceError::NoTrials);
    }

    let results = (0..trials)
        .into_par_iter()
        .map(|trial| {
            let mut rng = trial_rng(seed, trial);
            run_trial(pool, num_teams, trial, &mut rng)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let best = results
        .into_iter()
        .min_by(|a, b| {
            a.disparity
                .total_cmp(&b.disparity)
                .then(a.trial.cmp(&b.trial))
        })
        .ok_or(BalanceError::NoTrials)?;
    Ok(into_outcome(pool, best, trials))
}

/// RNG for one trial of a parallel search.
pub fn trial_rng(seed: u64, trial: usize) -> StdRng {
    let mixed = seed ^ (trial as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    StdRng::seed_from_u64(mixed)
}

fn into_outcome(pool: &[Player], best: TrialResult, trials: usize) -> BalanceOutcome {
    let teams = best
        .members
        .iter()
        .map(|team| team.iter().map(|&idx| pool[idx].name.clone()).collect())
        .collect();
    BalanceOutcome {
        teams,
        members: best.members,
        averages: best.averages,
        disparity: best.disparity,
        trial: best.trial,
        trials,
    }
}
