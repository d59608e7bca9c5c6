/*
 * Batch Module
 *
 * Runs several independent flocks side by side, one per seed, using rayon.
 * Each flock is still stepped sequentially on its own thread; parallelism
 * only ever spans separate simulations, never agents within one tick.
 */

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FlockError;
use crate::model::{Flock, FlockStats};
use crate::params::FlockParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub stats: FlockStats,
}

// Run one flock for `ticks` steps (or until it halts) and summarise it
pub fn run_one(params: FlockParams, ticks: u64) -> Result<RunSummary, FlockError> {
    let mut flock = Flock::new(params)?;
    let mut completed = 0;
    while completed < ticks && flock.step() {
        completed += 1;
    }

    Ok(RunSummary {
        seed: flock.seed(),
        ticks: completed,
        stats: flock.stats(),
    })
}

/// Run one flock per seed in parallel; results come back in seed order.
pub fn run_many(params: &FlockParams, seeds: &[u64], ticks: u64) -> Result<Vec<RunSummary>, FlockError> {
    params.validate()?;
    info!(runs = seeds.len(), ticks, "starting batch");

    seeds
        .par_iter()
        .map(|&seed| {
            run_one(
                FlockParams {
                    seed: Some(seed),
                    ..params.clone()
                },
                ticks,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> FlockParams {
        FlockParams {
            population: 15,
            width: 30.0,
            height: 30.0,
            toroidal: true,
            ..FlockParams::default()
        }
    }

    #[test]
    fn batch_matches_sequential_runs() {
        let seeds = [3, 1, 4, 1, 5];
        let batch = run_many(&small(), &seeds, 25).unwrap();
        assert_eq!(batch.len(), seeds.len());

        for (summary, &seed) in batch.iter().zip(&seeds) {
            let alone = run_one(
                FlockParams {
                    seed: Some(seed),
                    ..small()
                },
                25,
            )
            .unwrap();
            assert_eq!(summary, &alone);
            assert_eq!(summary.seed, seed);
            assert_eq!(summary.ticks, 25);
        }
    }

    #[test]
    fn invalid_params_fail_before_running() {
        let params = FlockParams {
            speed: -1.0,
            ..small()
        };
        assert!(matches!(run_many(&params, &[1, 2], 10), Err(FlockError::Config(_))));
    }
}
