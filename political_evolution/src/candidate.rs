use std::collections::BTreeSet;

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::params::ModelParams;

/// Initial candidate ideology is drawn uniformly from [0, 100)
pub const CANDIDATE_IDEOLOGY_MAX: f64 = 100.0;

/// A platform: where the candidate stands and how it splits its resources
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub ideology: f64,
    /// Share of resources spent on public goods, in [0, 1]
    pub alpha: f64,
    /// Voters who cast a ballot for this candidate (coalition rule)
    pub supporters: BTreeSet<usize>,
    /// Supporters chosen to receive private goods (coalition rule)
    pub winning_coalition: BTreeSet<usize>,
}

impl Candidate {
    pub fn new(ideology: f64, alpha: f64) -> Self {
        Candidate {
            ideology,
            alpha,
            supporters: BTreeSet::new(),
            winning_coalition: BTreeSet::new(),
        }
    }

    /// Offspring of this candidate. Alpha is perturbed first, then ideology
    /// (only when `params.mutate_ideology`); both are clamped to their
    /// domains. The offspring starts without supporters or coalition.
    pub fn mutate<R: Rng>(&self, params: &ModelParams, rng: &mut R) -> Candidate {
        let alpha_shock: f64 = StandardNormal.sample(rng);
        let alpha = (self.alpha + params.public_goods_mut_std * alpha_shock).clamp(0.0, 1.0);

        let ideology = if params.mutate_ideology {
            let policy_shock: f64 = StandardNormal.sample(rng);
            self.ideology + params.policy_mut_std * policy_shock
        } else {
            self.ideology
        };

        Candidate::new(params.policy_domain.clamp(ideology), alpha)
    }
}

/// Draw the initial slate: ideology uniform on [0, 100), alpha uniform on [0, 1)
pub fn populate<R: Rng>(params: &ModelParams, rng: &mut R) -> Vec<Candidate> {
    (0..params.n_candidates)
        .map(|_| {
            let ideology = rng.random_range(0.0..CANDIDATE_IDEOLOGY_MAX);
            let alpha = rng.random_range(0.0..1.0);
            Candidate::new(ideology, alpha)
        })
        .collect()
}

/// Elitist replacement: the winner's slot is left untouched and every other
/// slot receives an independent mutation of the winner, in slot order.
pub fn replace_losers<R: Rng>(
    candidates: &mut [Candidate],
    winner: usize,
    params: &ModelParams,
    rng: &mut R,
) {
    let parent = candidates[winner].clone();
    for (slot, candidate) in candidates.iter_mut().enumerate() {
        if slot != winner {
            *candidate = parent.mutate(params, rng);
        }
    }
}
