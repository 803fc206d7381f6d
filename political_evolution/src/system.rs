use des::{Agent, Response};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::candidate::{self, Candidate};
use crate::inclusion::{self, InclusionModel};
use crate::params::{ConfigError, ModelParams};
use crate::records::SimulationHistory;
use crate::tally::{argmax_first, tally};
use crate::voter::{self, Voter};
use crate::{ElectionStats, Event, Stats};

/// Everything one generation produced, in voter/candidate index order
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    pub generation: usize,
    /// The slate voters judged, with this generation's supporters and
    /// coalitions filled in
    pub contestants: Vec<Candidate>,
    pub ballots: Vec<usize>,
    /// utilities[voter][candidate]
    pub utilities: Vec<Vec<f64>>,
    /// included[voter][candidate]
    pub included: Vec<Vec<bool>>,
    pub counts: Vec<usize>,
    /// Size vector the winner was chosen on
    pub sizes: Vec<usize>,
    pub winner: usize,
}

/// Failures that end a run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("no candidates on the ballot")]
    NoCandidates,
    #[error("voter {voter} has non-finite utility {utility} for candidate {candidate}")]
    DegenerateUtility {
        voter: usize,
        candidate: usize,
        utility: f64,
    },
}

/// The generation loop. Owns the electorate, the current slate and the
/// run's only random number generator.
pub struct ElectionSystem {
    params: ModelParams,
    voters: Vec<Voter>,
    candidates: Vec<Candidate>,
    inclusion: Box<dyn InclusionModel>,
    rng: StdRng,
    scenario_name: String,
    history: SimulationHistory,
    generation: usize,
    halted: Option<SimulationError>,
}

impl ElectionSystem {
    /// Validate `params` and draw voters, then candidates, from `seed`
    pub fn new(params: ModelParams, scenario_name: String, seed: u64) -> Result<Self, ConfigError> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let voters = voter::populate(&params, &mut rng);
        let candidates = candidate::populate(&params, &mut rng);
        Ok(Self::assemble(params, voters, candidates, scenario_name, rng))
    }

    /// Start from a given electorate and slate; `seed` only drives
    /// coalition sampling and mutation
    pub fn with_population(
        params: ModelParams,
        voters: Vec<Voter>,
        candidates: Vec<Candidate>,
        scenario_name: String,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        if voters.len() != params.n_voters {
            return Err(ConfigError::PopulationMismatch {
                what: "voters",
                expected: params.n_voters,
                actual: voters.len(),
            });
        }
        if candidates.len() != params.n_candidates {
            return Err(ConfigError::PopulationMismatch {
                what: "candidates",
                expected: params.n_candidates,
                actual: candidates.len(),
            });
        }
        let rng = StdRng::seed_from_u64(seed);
        Ok(Self::assemble(params, voters, candidates, scenario_name, rng))
    }

    fn assemble(
        params: ModelParams,
        voters: Vec<Voter>,
        candidates: Vec<Candidate>,
        scenario_name: String,
        rng: StdRng,
    ) -> Self {
        let inclusion = inclusion::model_for(&params);
        log::debug!(
            "{}: {} rule, {} inclusion",
            scenario_name,
            params.selection_rule,
            inclusion.name()
        );
        ElectionSystem {
            params,
            voters,
            candidates,
            inclusion,
            rng,
            scenario_name,
            history: SimulationHistory::new(),
            generation: 0,
            halted: None,
        }
    }

    /// One election cycle: estimate coalitions, score every candidate for
    /// every voter, vote, tally, then replace the losers.
    pub fn run_generation(&mut self) -> Result<GenerationOutcome, SimulationError> {
        if self.candidates.is_empty() {
            return Err(SimulationError::NoCandidates);
        }
        let n_candidates = self.candidates.len();
        let n_voters = self.voters.len();

        let estimates: Vec<f64> = self
            .candidates
            .iter()
            .map(|c| self.inclusion.coalition_probability(c, n_voters))
            .collect();

        let mut ballots = Vec::with_capacity(n_voters);
        let mut utilities = Vec::with_capacity(n_voters);
        let mut included = Vec::with_capacity(n_voters);

        for (voter_id, voter) in self.voters.iter_mut().enumerate() {
            voter.reset_inclusion(n_candidates);
            let mut row = Vec::with_capacity(n_candidates);
            for (candidate_id, candidate) in self.candidates.iter().enumerate() {
                let is_included = voter.assess_inclusion(
                    candidate_id,
                    estimates[candidate_id],
                    candidate.ideology,
                    &self.params,
                );
                let utility = voter.utility(candidate, is_included, &self.params);
                if !utility.is_finite() {
                    return Err(SimulationError::DegenerateUtility {
                        voter: voter_id,
                        candidate: candidate_id,
                        utility,
                    });
                }
                row.push(utility);
            }
            let ballot = argmax_first(&row).ok_or(SimulationError::NoCandidates)?;
            ballots.push(ballot);
            included.push(voter.included().to_vec());
            utilities.push(row);
        }

        let outcome = tally(
            self.params.selection_rule,
            &ballots,
            &mut self.candidates,
            self.params.target_coalition_size,
            &mut self.rng,
        )
        .ok_or(SimulationError::NoCandidates)?;

        let contestants = self.candidates.clone();
        candidate::replace_losers(
            &mut self.candidates,
            outcome.winner,
            &self.params,
            &mut self.rng,
        );

        let generation = self.generation;
        self.generation += 1;

        Ok(GenerationOutcome {
            generation,
            contestants,
            ballots,
            utilities,
            included,
            counts: outcome.counts,
            sizes: outcome.sizes,
            winner: outcome.winner,
        })
    }

    /// Run a generation and append it to the history
    fn advance(&mut self) -> Result<(), SimulationError> {
        let outcome = self.run_generation()?;
        log::debug!(
            "{}: generation {} won by slot {} (ideology {:.2}, alpha {:.3}), sizes {:?}",
            self.scenario_name,
            outcome.generation,
            outcome.winner,
            outcome.contestants[outcome.winner].ideology,
            outcome.contestants[outcome.winner].alpha,
            outcome.sizes
        );
        self.history
            .record(&outcome, &self.voters, self.params.detailed_records);
        Ok(())
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn voters(&self) -> &[Voter] {
        &self.voters
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn history(&self) -> &SimulationHistory {
        &self.history
    }

    /// Number of generations completed
    pub fn generation(&self) -> usize {
        self.generation
    }
}

impl Agent<Event, Stats> for ElectionSystem {
    fn act(&mut self, current_t: usize, data: &Event) -> Response<Event, Stats> {
        match data {
            Event::GenerationStart { generation } => {
                if self.halted.is_some() || *generation >= self.params.n_generations {
                    return Response::new();
                }
                match self.advance() {
                    Ok(()) if generation + 1 < self.params.n_generations => Response::event(
                        current_t + 1,
                        Event::GenerationStart {
                            generation: generation + 1,
                        },
                    ),
                    Ok(()) => Response::event(current_t + 1, Event::RunEnd),
                    Err(e) => {
                        log::error!(
                            "{}: run halted at generation {}: {}",
                            self.scenario_name,
                            generation,
                            e
                        );
                        self.halted = Some(e);
                        Response::new()
                    }
                }
            }
            Event::RunEnd => {
                log::info!(
                    "{}: finished {} generations",
                    self.scenario_name,
                    self.generation
                );
                Response::new()
            }
        }
    }

    fn stats(&self) -> Stats {
        Stats::Election(ElectionStats {
            scenario_name: self.scenario_name.clone(),
            generations_completed: self.generation,
            history: self.history.clone(),
            candidates: self.candidates.clone(),
            halted: self.halted.clone(),
        })
    }
}
