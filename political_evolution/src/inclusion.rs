use crate::candidate::Candidate;
use crate::params::{InclusionPolicy, ModelParams};

/// Estimates how likely a voter is to land in a candidate's winning
/// coalition. The estimate is computed once per candidate per generation,
/// before any utility.
pub trait InclusionModel {
    fn coalition_probability(&self, candidate: &Candidate, n_voters: usize) -> f64;
    fn name(&self) -> &'static str;
}

/// Same estimate for everyone: quota / electorate
pub struct FixedQuota {
    pub target_coalition_size: usize,
}

impl InclusionModel for FixedQuota {
    fn coalition_probability(&self, _candidate: &Candidate, n_voters: usize) -> f64 {
        self.target_coalition_size as f64 / n_voters as f64
    }

    fn name(&self) -> &'static str {
        "FixedQuota"
    }
}

/// Estimate from the coalition the candidate formed last generation.
/// Candidates without one (fresh mutants, the first generation) get 1/N.
pub struct ObservedSupport;

impl InclusionModel for ObservedSupport {
    fn coalition_probability(&self, candidate: &Candidate, n_voters: usize) -> f64 {
        if candidate.winning_coalition.is_empty() {
            1.0 / n_voters as f64
        } else {
            candidate.winning_coalition.len() as f64 / n_voters as f64
        }
    }

    fn name(&self) -> &'static str {
        "ObservedSupport"
    }
}

pub fn model_for(params: &ModelParams) -> Box<dyn InclusionModel> {
    match params.inclusion_policy {
        InclusionPolicy::FixedQuota => Box::new(FixedQuota {
            target_coalition_size: params.target_coalition_size,
        }),
        InclusionPolicy::ObservedSupport => Box::new(ObservedSupport),
    }
}
