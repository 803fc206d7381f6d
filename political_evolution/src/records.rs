//! Record streams handed to analysis and export.
//!
//! Everything here is built from a [`GenerationOutcome`]; the generation
//! loop never reads it back.

use serde::{Deserialize, Serialize};

use crate::system::GenerationOutcome;
use crate::voter::{RiskType, Voter};

/// One row per generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    /// Vote counts (plurality) or coalition sizes (coalition rule)
    pub sizes: Vec<usize>,
    pub winner: usize,
    pub winner_ideology: f64,
    pub winner_alpha: f64,
}

/// What one voter saw of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateView {
    pub ideology: f64,
    pub alpha: f64,
    pub included: bool,
    pub utility: f64,
}

/// One row per voter per generation (detailed mode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub generation: usize,
    pub voter_id: usize,
    pub risk_type: RiskType,
    pub ballot: usize,
    pub voter_ideology: f64,
    pub per_candidate: Vec<CandidateView>,
}

/// One row per candidate slot per generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub generation: usize,
    pub candidate_id: usize,
    pub ideology: f64,
    pub alpha: f64,
    pub is_winner: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationHistory {
    pub generations: Vec<GenerationRecord>,
    pub candidates: Vec<CandidateRecord>,
    pub voters: Vec<VoterRecord>,
}

impl SimulationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one generation. Candidate rows describe the slate voters
    /// judged, before losers were replaced.
    pub fn record(&mut self, outcome: &GenerationOutcome, voters: &[Voter], detailed: bool) {
        let generation = outcome.generation;
        let winner = &outcome.contestants[outcome.winner];

        self.generations.push(GenerationRecord {
            generation,
            sizes: outcome.sizes.clone(),
            winner: outcome.winner,
            winner_ideology: winner.ideology,
            winner_alpha: winner.alpha,
        });

        self.candidates
            .extend(
                outcome
                    .contestants
                    .iter()
                    .enumerate()
                    .map(|(candidate_id, c)| CandidateRecord {
                        generation,
                        candidate_id,
                        ideology: c.ideology,
                        alpha: c.alpha,
                        is_winner: candidate_id == outcome.winner,
                    }),
            );

        if detailed {
            for (voter_id, voter) in voters.iter().enumerate() {
                let per_candidate = outcome
                    .contestants
                    .iter()
                    .enumerate()
                    .map(|(cid, c)| CandidateView {
                        ideology: c.ideology,
                        alpha: c.alpha,
                        included: outcome.included[voter_id][cid],
                        utility: outcome.utilities[voter_id][cid],
                    })
                    .collect();
                self.voters.push(VoterRecord {
                    generation,
                    voter_id,
                    risk_type: voter.risk_type,
                    ballot: outcome.ballots[voter_id],
                    voter_ideology: voter.ideology,
                    per_candidate,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn last(&self) -> Option<&GenerationRecord> {
        self.generations.last()
    }

    /// Candidate rows of one generation, in slot order
    pub fn candidates_at(&self, generation: usize) -> impl Iterator<Item = &CandidateRecord> {
        self.candidates
            .iter()
            .filter(move |c| c.generation == generation)
    }

    pub fn winner_alphas(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.winner_alpha).collect()
    }

    pub fn winner_ideologies(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.winner_ideology).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;

    fn outcome() -> GenerationOutcome {
        GenerationOutcome {
            generation: 3,
            contestants: vec![Candidate::new(20.0, 0.2), Candidate::new(60.0, 0.8)],
            ballots: vec![1, 0, 1],
            utilities: vec![
                vec![-400.0, -10.0],
                vec![-1.0, -900.0],
                vec![-50.0, -5.0],
            ],
            included: vec![vec![false, true], vec![true, false], vec![false, false]],
            counts: vec![1, 2],
            sizes: vec![1, 2],
            winner: 1,
        }
    }

    fn voters() -> Vec<Voter> {
        vec![
            Voter::new(58.0, RiskType::Safe, 2),
            Voter::new(21.0, RiskType::Safe, 2),
            Voter::new(55.0, RiskType::Risk, 2),
        ]
    }

    #[test]
    fn summary_and_candidate_rows() {
        let mut history = SimulationHistory::new();
        history.record(&outcome(), &voters(), false);

        assert_eq!(history.len(), 1);
        let last = history.last().unwrap();
        assert_eq!(last.winner, 1);
        assert_eq!(last.winner_ideology, 60.0);
        assert_eq!(last.winner_alpha, 0.8);

        let rows: Vec<_> = history.candidates_at(3).collect();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].is_winner);
        assert!(rows[1].is_winner);
        assert!(history.voters.is_empty());
    }

    #[test]
    fn detailed_voter_rows() {
        let mut history = SimulationHistory::new();
        history.record(&outcome(), &voters(), true);

        assert_eq!(history.voters.len(), 3);
        let second = &history.voters[1];
        assert_eq!(second.voter_id, 1);
        assert_eq!(second.ballot, 0);
        assert_eq!(second.voter_ideology, 21.0);
        assert!(second.per_candidate[0].included);
        assert_eq!(second.per_candidate[1].utility, -900.0);
        assert_eq!(history.voters[2].risk_type, RiskType::Risk);
    }
}
