use des::EventLoop;

use crate::params::{ConfigError, ModelParams};
use crate::system::{ElectionSystem, SimulationError};
use crate::{ElectionStats, Event, Stats};

/// Configuration for a simulation scenario
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Name of the scenario
    pub name: String,
    /// Model parameters
    pub params: ModelParams,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl ScenarioConfig {
    /// Plurality elections, fixed coalition quota
    pub fn detailed(seed: u64) -> Self {
        ScenarioConfig {
            name: "Plurality / fixed quota".to_string(),
            params: ModelParams::detailed(),
            seed,
        }
    }

    /// Coalition-quota elections, observed-support inclusion
    pub fn coalition(seed: u64) -> Self {
        ScenarioConfig {
            name: "Coalition quota / observed support".to_string(),
            params: ModelParams::coalition(),
            seed,
        }
    }

    /// Coalition elections where only the public/private split evolves
    pub fn fixed_policy(seed: u64) -> Self {
        ScenarioConfig {
            name: "Coalition quota / fixed policy".to_string(),
            params: ModelParams {
                mutate_ideology: false,
                ..ModelParams::coalition()
            },
            seed,
        }
    }

    pub fn all(seed: u64) -> Vec<Self> {
        vec![
            Self::detailed(seed),
            Self::coalition(seed),
            Self::fixed_policy(seed),
        ]
    }
}

/// Why a scenario produced no result
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("run halted after {completed} generations: {source}")]
    Halted {
        completed: usize,
        source: SimulationError,
    },
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    /// Scenario configuration
    pub config: ScenarioConfig,
    /// Election statistics at end of run
    pub stats: ElectionStats,
}

impl ScenarioResult {
    /// Print the final generation's outcome
    pub fn print_summary(&self) {
        println!("\n=== {} ===", self.config.name);
        println!("Generations completed: {}", self.stats.generations_completed);
        if let Some(last) = self.stats.history.last() {
            println!("Final winner policy: {:.2}", last.winner_ideology);
            println!(
                "Final winner alpha (public/private split): {:.2}",
                last.winner_alpha
            );
            println!("Final sizes: {:?}", last.sizes);
        }
    }
}

/// Run a single scenario and return results
pub fn run_scenario(config: ScenarioConfig) -> Result<ScenarioResult, ScenarioError> {
    let system = ElectionSystem::new(config.params.clone(), config.name.clone(), config.seed)?;

    log::info!(
        "{}: {} voters, {} candidates, {} generations, rule {}, seed {}",
        config.name,
        config.params.n_voters,
        config.params.n_candidates,
        config.params.n_generations,
        config.params.selection_rule,
        config.seed
    );

    let initial_events = if config.params.n_generations > 0 {
        vec![(0, Event::GenerationStart { generation: 0 })]
    } else {
        vec![(0, Event::RunEnd)]
    };
    let mut event_loop = EventLoop::new(initial_events, vec![Box::new(system)]);

    event_loop.run(config.params.n_generations);

    let stats = match event_loop.stats().into_iter().next() {
        Some(Stats::Election(s)) => s,
        None => unreachable!("event loop was built with one agent"),
    };

    if let Some(source) = stats.halted.clone() {
        return Err(ScenarioError::Halted {
            completed: stats.generations_completed,
            source,
        });
    }

    Ok(ScenarioResult { config, stats })
}

/// Run every preset scenario with the same seed
pub fn run_all_scenarios(seed: u64) -> Vec<Result<ScenarioResult, ScenarioError>> {
    ScenarioConfig::all(seed).into_iter().map(run_scenario).collect()
}
