use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::candidate::Candidate;
use crate::params::{IdeologyTerm, ModelParams, RiskAssignment};

/// Voter ideology is drawn uniformly from [0, VOTER_IDEOLOGY_MAX)
pub const VOTER_IDEOLOGY_MAX: f64 = 100.0;

/// Risk disposition, decides how strong a coalition signal a voter needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
    Safe,
    Risk,
}

impl fmt::Display for RiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskType::Safe => write!(f, "safe"),
            RiskType::Risk => write!(f, "risk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Voter {
    pub ideology: f64,
    pub risk_type: RiskType,
    /// Per-candidate inclusion beliefs for the current generation only
    included: Vec<bool>,
}

impl Voter {
    pub fn new(ideology: f64, risk_type: RiskType, n_candidates: usize) -> Self {
        Voter {
            ideology,
            risk_type,
            included: vec![false; n_candidates],
        }
    }

    pub fn included(&self) -> &[bool] {
        &self.included
    }

    /// Clear last generation's beliefs
    pub fn reset_inclusion(&mut self, n_candidates: usize) {
        self.included.clear();
        self.included.resize(n_candidates, false);
    }

    /// Decide whether this voter expects to share in the candidate's private
    /// goods: the candidate must sit within `theta` and the coalition estimate
    /// must reach the voter's risk threshold.
    pub fn assess_inclusion(
        &mut self,
        candidate_id: usize,
        coalition_probability: f64,
        candidate_ideology: f64,
        params: &ModelParams,
    ) -> bool {
        let distance = (self.ideology - candidate_ideology).abs();
        let threshold = params.inclusion_threshold(self.risk_type);
        let included = distance <= params.theta && coalition_probability >= threshold;
        self.included[candidate_id] = included;
        included
    }

    /// Utility of `candidate` winning:
    ///
    ///   ±(v - c)² + α·R/N + [included] (1 - α)·R/K
    pub fn utility(&self, candidate: &Candidate, included: bool, params: &ModelParams) -> f64 {
        let squared_distance = (self.ideology - candidate.ideology).powi(2);
        let ideology_term = match params.ideology_term {
            IdeologyTerm::Loss => -squared_distance,
            IdeologyTerm::AdditiveCost => squared_distance,
        };
        let public = candidate.alpha * (params.resource_pool / params.n_voters as f64);
        let private = if included {
            (1.0 - candidate.alpha) * (params.resource_pool / params.private_goods_divisor())
        } else {
            0.0
        };
        ideology_term + public + private
    }
}

/// Draw the electorate. Ideologies are uniform on [0, 100); risk types
/// follow `params.risk_assignment`.
pub fn populate<R: Rng>(params: &ModelParams, rng: &mut R) -> Vec<Voter> {
    let n_safe = params.n_voters - params.n_risk_seeking();
    (0..params.n_voters)
        .map(|i| {
            let ideology = rng.random_range(0.0..VOTER_IDEOLOGY_MAX);
            let risk_type = match params.risk_assignment {
                RiskAssignment::Split if i < n_safe => RiskType::Safe,
                RiskAssignment::Split => RiskType::Risk,
                RiskAssignment::Random => {
                    if rng.random_bool(params.risk_seeking_ratio) {
                        RiskType::Risk
                    } else {
                        RiskType::Safe
                    }
                }
            };
            Voter::new(ideology, risk_type, params.n_candidates)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> ModelParams {
        ModelParams {
            n_voters: 100,
            n_candidates: 2,
            resource_pool: 1000.0,
            target_coalition_size: 25,
            theta: 15.0,
            tau: 0.6,
            phi: 0.3,
            ..ModelParams::detailed()
        }
    }

    #[test]
    fn inclusion_needs_proximity_and_signal() {
        let params = params();
        let mut safe = Voter::new(50.0, RiskType::Safe, 2);

        // Close enough, signal 0.4 >= phi 0.3
        assert!(safe.assess_inclusion(0, 0.4, 60.0, &params));
        // Too far
        assert!(!safe.assess_inclusion(1, 0.4, 70.0, &params));
        assert_eq!(safe.included(), &[true, false]);

        // Signal below phi
        assert!(!safe.assess_inclusion(0, 0.25, 50.0, &params));
    }

    #[test]
    fn risk_seekers_need_stronger_signal() {
        let params = params();
        let mut safe = Voter::new(50.0, RiskType::Safe, 1);
        let mut risky = Voter::new(50.0, RiskType::Risk, 1);

        assert!(safe.assess_inclusion(0, 0.5, 50.0, &params));
        assert!(!risky.assess_inclusion(0, 0.5, 50.0, &params));
        assert!(risky.assess_inclusion(0, 0.6, 50.0, &params));
    }

    #[test]
    fn distance_exactly_theta_is_included() {
        let params = params();
        let mut voter = Voter::new(10.0, RiskType::Safe, 1);
        assert!(voter.assess_inclusion(0, 1.0, 25.0, &params));
    }

    #[test]
    fn reset_clears_beliefs() {
        let params = params();
        let mut voter = Voter::new(50.0, RiskType::Safe, 2);
        voter.assess_inclusion(0, 1.0, 50.0, &params);
        voter.reset_inclusion(2);
        assert_eq!(voter.included(), &[false, false]);
    }

    #[test]
    fn utility_terms() {
        let params = params();
        let voter = Voter::new(40.0, RiskType::Safe, 1);
        let candidate = Candidate::new(50.0, 0.4);

        // -(10)^2 + 0.4 * 1000/100
        assert_relative_eq!(voter.utility(&candidate, false, &params), -100.0 + 4.0);
        // plus 0.6 * 1000/25
        assert_relative_eq!(
            voter.utility(&candidate, true, &params),
            -100.0 + 4.0 + 24.0
        );
    }

    #[test]
    fn additive_cost_flips_distance_sign() {
        let params = ModelParams {
            ideology_term: IdeologyTerm::AdditiveCost,
            ..params()
        };
        let voter = Voter::new(40.0, RiskType::Safe, 1);
        let candidate = Candidate::new(50.0, 1.0);
        assert_relative_eq!(voter.utility(&candidate, true, &params), 100.0 + 10.0);
    }

    #[test]
    fn zero_resources_leave_only_distance() {
        let params = ModelParams {
            resource_pool: 0.0,
            ..params()
        };
        let voter = Voter::new(30.0, RiskType::Risk, 1);
        let candidate = Candidate::new(33.0, 0.2);
        assert_relative_eq!(voter.utility(&candidate, true, &params), -9.0);
    }

    #[test]
    fn split_population() {
        let params = ModelParams {
            n_voters: 10,
            target_coalition_size: 5,
            risk_seeking_ratio: 0.3,
            risk_assignment: RiskAssignment::Split,
            ..params()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let voters = populate(&params, &mut rng);

        assert_eq!(voters.len(), 10);
        assert!(voters[..7].iter().all(|v| v.risk_type == RiskType::Safe));
        assert!(voters[7..].iter().all(|v| v.risk_type == RiskType::Risk));
        assert!(voters
            .iter()
            .all(|v| (0.0..VOTER_IDEOLOGY_MAX).contains(&v.ideology)));
        assert!(voters.iter().all(|v| v.included().len() == 2));
    }

    #[test]
    fn random_population_extremes() {
        let all_risk = ModelParams {
            risk_seeking_ratio: 1.0,
            risk_assignment: RiskAssignment::Random,
            ..params()
        };
        let mut rng = StdRng::seed_from_u64(7);
        assert!(populate(&all_risk, &mut rng)
            .iter()
            .all(|v| v.risk_type == RiskType::Risk));

        let all_safe = ModelParams {
            risk_seeking_ratio: 0.0,
            ..all_risk
        };
        assert!(populate(&all_safe, &mut rng)
            .iter()
            .all(|v| v.risk_type == RiskType::Safe));
    }
}
