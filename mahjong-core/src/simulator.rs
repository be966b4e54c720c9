//! Batch self-play with rayon parallelism.
//!
//! Runs N complete bot games, each in its own room, on a dedicated rayon
//! ThreadPool. Used for soak testing and throughput benchmarks.

use mahjong_engine::errors::RoomResult;
use mahjong_engine::event::GameOverKind;
use mahjong_engine::rule::GameRule;
use mahjong_engine::types::Seat;
use rayon::prelude::*;

use crate::game_loop::{FirstActionSelector, GameRunner};

/// Configuration for a batch simulation run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub num_games: usize,
    /// Each game gets `base_seed + game_index`. None = entropy.
    pub base_seed: Option<u64>,
    /// None = rayon default (num CPUs).
    pub num_threads: Option<usize>,
    pub rule: GameRule,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_games: 100,
            base_seed: None,
            num_threads: None,
            rule: GameRule::default(),
        }
    }
}

/// Result from a single completed game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// None if the step limit was hit first.
    pub outcome: Option<GameOverKind>,
    pub winner: Option<Seat>,
    pub fan: Option<u32>,
    pub total_actions: u32,
    pub wall_remaining: usize,
    pub seed: Option<u64>,
}

/// Plays one game with first-legal-intent bots.
pub fn simulate_single_game(seed: Option<u64>, rule: GameRule) -> RoomResult<GameResult> {
    let mut runner = GameRunner::new(seed, rule)?;
    runner.run_to_completion(&mut FirstActionSelector)?;

    let fan = runner
        .room()
        .game_over
        .as_ref()
        .and_then(|over| over.fan.as_ref())
        .map(|fan| fan.total);
    Ok(GameResult {
        outcome: runner.outcome(),
        winner: runner.winner(),
        fan,
        total_actions: runner.total_actions(),
        wall_remaining: runner.room().wall.len(),
        seed,
    })
}

fn run_games(config: &BatchConfig) -> RoomResult<Vec<GameResult>> {
    let base_seed = config.base_seed;
    let rule = config.rule;
    (0..config.num_games)
        .into_par_iter()
        .map(|i| {
            let seed = base_seed.map(|s| s.wrapping_add(i as u64));
            simulate_single_game(seed, rule)
        })
        .collect()
}

/// Parallel batch simulator using a dedicated rayon ThreadPool.
pub struct BatchSimulator {
    pool: rayon::ThreadPool,
}

impl BatchSimulator {
    pub fn new(num_threads: Option<usize>) -> anyhow::Result<Self> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = num_threads {
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))?;
        Ok(Self { pool })
    }

    /// Runs every game; the first engine error aborts the batch.
    pub fn run_batch(&self, config: &BatchConfig) -> anyhow::Result<Vec<GameResult>> {
        Ok(self.pool.install(|| run_games(config))?)
    }
}

/// Convenience: run a batch on rayon's global pool.
pub fn run_batch_simple(config: &BatchConfig) -> anyhow::Result<Vec<GameResult>> {
    Ok(run_games(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_game_completes() {
        let result = simulate_single_game(Some(42), GameRule::default()).unwrap();
        assert!(result.total_actions > 0);
        assert!(result.outcome.is_some());
    }

    #[test]
    fn draws_empty_the_wall() {
        for seed in 0..16u64 {
            let result = simulate_single_game(Some(seed), GameRule::default()).unwrap();
            match result.outcome {
                Some(GameOverKind::Draw) => {
                    assert_eq!(result.wall_remaining, 0);
                    assert!(result.winner.is_none() && result.fan.is_none());
                }
                Some(GameOverKind::Win) => {
                    assert!(result.winner.is_some());
                    assert!(result.fan.unwrap_or(0) >= 1);
                }
                None => panic!("seed {seed} hit the step limit"),
            }
        }
    }

    #[test]
    fn batch_returns_correct_count() {
        let config = BatchConfig {
            num_games: 4,
            base_seed: Some(100),
            ..Default::default()
        };
        let results = run_batch_simple(&config).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[3].seed, Some(103));
    }

    #[test]
    fn seeded_games_are_deterministic() {
        let r1 = simulate_single_game(Some(999), GameRule::default()).unwrap();
        let r2 = simulate_single_game(Some(999), GameRule::default()).unwrap();
        assert_eq!(r1, r2);
    }

    #[test]
    fn batch_simulator_with_threads() {
        let sim = BatchSimulator::new(Some(2)).unwrap();
        let config = BatchConfig {
            num_games: 4,
            base_seed: Some(500),
            rule: GameRule::precedence(),
            ..Default::default()
        };
        let results = sim.run_batch(&config).unwrap();
        assert_eq!(results.len(), 4);
        for r in &results {
            assert!(r.total_actions > 0);
        }
    }
}
