use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::voter::RiskType;

/// How the generation's winner is chosen from the ballots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRule {
    /// Most votes wins; no coalitions are formed
    Plurality,
    /// Each candidate samples a quota-sized coalition from its supporters;
    /// the largest coalition wins
    CoalitionQuota,
}

impl fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionRule::Plurality => write!(f, "plurality"),
            SelectionRule::CoalitionQuota => write!(f, "coalition_quota"),
        }
    }
}

impl FromStr for SelectionRule {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "plurality" | "a" => Ok(SelectionRule::Plurality),
            "coalition_quota" | "coalition" | "b" => Ok(SelectionRule::CoalitionQuota),
            other => Err(ConfigError::UnknownSelectionRule(other.to_string())),
        }
    }
}

impl SelectionRule {
    /// Inclusion estimate this rule is run with: plurality never forms
    /// coalitions, so only the coalition rule can feed observed support
    pub fn paired_inclusion(self) -> InclusionPolicy {
        match self {
            SelectionRule::Plurality => InclusionPolicy::FixedQuota,
            SelectionRule::CoalitionQuota => InclusionPolicy::ObservedSupport,
        }
    }

    pub fn paired_divisor(self) -> PrivateGoodsDivisor {
        match self {
            SelectionRule::Plurality => PrivateGoodsDivisor::TargetCoalition,
            SelectionRule::CoalitionQuota => PrivateGoodsDivisor::VoterPopulation,
        }
    }
}

/// Source of a voter's estimate that they would share in a candidate's
/// private goods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InclusionPolicy {
    /// target_coalition_size / n_voters for every candidate
    FixedQuota,
    /// Size of the candidate's coalition from the previous generation
    ObservedSupport,
}

impl fmt::Display for InclusionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InclusionPolicy::FixedQuota => write!(f, "fixed_quota"),
            InclusionPolicy::ObservedSupport => write!(f, "observed_support"),
        }
    }
}

/// Divisor K of the private-goods payoff (1 - alpha) * R / K
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivateGoodsDivisor {
    VoterPopulation,
    TargetCoalition,
}

/// Sign of the squared ideological distance in the utility function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdeologyTerm {
    /// -(v - c)^2: distance lowers utility
    Loss,
    /// +(v - c)^2: distance added to the payoff terms as-is
    AdditiveCost,
}

/// Range candidate ideology is clamped to after mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDomain {
    /// [-100, 100]
    Signed,
    /// [0, 100]
    NonNegative,
}

impl PolicyDomain {
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            PolicyDomain::Signed => (-100.0, 100.0),
            PolicyDomain::NonNegative => (0.0, 100.0),
        }
    }

    pub fn clamp(&self, ideology: f64) -> f64 {
        let (min, max) = self.bounds();
        ideology.clamp(min, max)
    }

    pub fn contains(&self, ideology: f64) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&ideology)
    }
}

/// How risk types are handed out to the voter population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAssignment {
    /// Safe voters first, then floor(n_voters * risk_seeking_ratio) risk seekers
    Split,
    /// Each voter independently risk-seeking with probability risk_seeking_ratio
    Random,
}

/// Model parameters for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelParams {
    /// Number of voters (fixed for the run)
    pub n_voters: usize,
    /// Number of candidate slots
    pub n_candidates: usize,
    /// Election cycles to run
    pub n_generations: usize,
    /// Resources each candidate distributes
    pub resource_pool: f64,
    /// Std dev of the alpha mutation
    pub public_goods_mut_std: f64,
    /// Std dev of the ideology mutation
    pub policy_mut_std: f64,
    /// Max ideological distance at which a voter can expect inclusion
    pub theta: f64,
    /// Inclusion threshold for risk-seeking voters
    pub tau: f64,
    /// Inclusion threshold for safe voters
    pub phi: f64,
    /// Coalition quota (fixed-quota estimate, coalition sampling, private divisor)
    pub target_coalition_size: usize,
    /// Fraction of risk-seeking voters
    pub risk_seeking_ratio: f64,
    pub risk_assignment: RiskAssignment,
    pub selection_rule: SelectionRule,
    pub inclusion_policy: InclusionPolicy,
    pub private_goods_divisor: PrivateGoodsDivisor,
    pub ideology_term: IdeologyTerm,
    pub policy_domain: PolicyDomain,
    /// When false only alpha evolves
    pub mutate_ideology: bool,
    /// Record per-voter utilities and inclusion every generation
    pub detailed_records: bool,
    /// Accept a selection rule run with the other rule's inclusion policy
    pub allow_mixed_policies: bool,
}

impl ModelParams {
    /// Plurality elections with a fixed coalition quota of 25 out of 100
    /// voters. Half the electorate is risk-seeking.
    pub fn detailed() -> Self {
        ModelParams {
            n_voters: 100,
            n_candidates: 4,
            n_generations: 200,
            resource_pool: 1000.0,
            public_goods_mut_std: 0.05,
            policy_mut_std: 2.0,
            theta: 15.0,
            tau: 0.6,
            phi: 0.3,
            target_coalition_size: 25,
            risk_seeking_ratio: 0.5,
            risk_assignment: RiskAssignment::Split,
            selection_rule: SelectionRule::Plurality,
            inclusion_policy: InclusionPolicy::FixedQuota,
            private_goods_divisor: PrivateGoodsDivisor::TargetCoalition,
            ideology_term: IdeologyTerm::Loss,
            policy_domain: PolicyDomain::Signed,
            mutate_ideology: true,
            detailed_records: true,
            allow_mixed_policies: false,
        }
    }

    /// Coalition elections: supporters are sampled into a half-electorate
    /// coalition, and voters judge inclusion from last cycle's coalition.
    pub fn coalition() -> Self {
        ModelParams {
            n_generations: 2000,
            target_coalition_size: 50,
            risk_assignment: RiskAssignment::Random,
            selection_rule: SelectionRule::CoalitionQuota,
            inclusion_policy: InclusionPolicy::ObservedSupport,
            private_goods_divisor: PrivateGoodsDivisor::VoterPopulation,
            policy_domain: PolicyDomain::NonNegative,
            detailed_records: false,
            ..Self::detailed()
        }
    }

    /// Switch selection rule, taking the inclusion policy and private-goods
    /// divisor that go with it
    pub fn with_rule(self, rule: SelectionRule) -> Self {
        ModelParams {
            selection_rule: rule,
            inclusion_policy: rule.paired_inclusion(),
            private_goods_divisor: rule.paired_divisor(),
            ..self
        }
    }

    /// Divisor K of the private-goods payoff
    pub fn private_goods_divisor(&self) -> f64 {
        match self.private_goods_divisor {
            PrivateGoodsDivisor::VoterPopulation => self.n_voters as f64,
            PrivateGoodsDivisor::TargetCoalition => self.target_coalition_size as f64,
        }
    }

    /// Coalition estimate a voter of the given type must reach to expect inclusion
    pub fn inclusion_threshold(&self, risk_type: RiskType) -> f64 {
        match risk_type {
            RiskType::Risk => self.tau,
            RiskType::Safe => self.phi,
        }
    }

    /// Number of risk seekers under `RiskAssignment::Split`
    pub fn n_risk_seeking(&self) -> usize {
        ((self.n_voters as f64 * self.risk_seeking_ratio).floor() as usize).min(self.n_voters)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_voters < 1 {
            return Err(ConfigError::NoVoters);
        }
        if self.n_candidates < 1 {
            return Err(ConfigError::NoCandidates);
        }
        if !self.public_goods_mut_std.is_finite() || self.public_goods_mut_std < 0.0 {
            return Err(ConfigError::InvalidMutationStd {
                name: "public_goods_mut_std",
                value: self.public_goods_mut_std,
            });
        }
        if !self.policy_mut_std.is_finite() || self.policy_mut_std < 0.0 {
            return Err(ConfigError::InvalidMutationStd {
                name: "policy_mut_std",
                value: self.policy_mut_std,
            });
        }
        if self.theta.is_nan() || self.theta < 0.0 {
            return Err(ConfigError::NegativeTheta(self.theta));
        }
        if self.tau.is_nan() || self.phi.is_nan() {
            return Err(ConfigError::InvalidThreshold);
        }
        if self.target_coalition_size > self.n_voters {
            return Err(ConfigError::CoalitionTooLarge {
                target: self.target_coalition_size,
                n_voters: self.n_voters,
            });
        }
        if self.private_goods_divisor == PrivateGoodsDivisor::TargetCoalition
            && self.target_coalition_size == 0
        {
            return Err(ConfigError::ZeroPrivateDivisor);
        }
        if !(0.0..=1.0).contains(&self.risk_seeking_ratio) {
            return Err(ConfigError::InvalidRiskRatio(self.risk_seeking_ratio));
        }
        if !self.resource_pool.is_finite() {
            return Err(ConfigError::InvalidResourcePool(self.resource_pool));
        }
        if !self.allow_mixed_policies
            && self.inclusion_policy != self.selection_rule.paired_inclusion()
        {
            return Err(ConfigError::MismatchedInclusion {
                rule: self.selection_rule,
                policy: self.inclusion_policy,
            });
        }
        Ok(())
    }

    /// Parse and validate a TOML parameter file body. Missing keys take
    /// their value from `ModelParams::default()`, except that a file naming
    /// `selection_rule` gets that rule's inclusion policy and divisor unless
    /// it sets them too. Unknown keys are an error.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let mut params: ModelParams = toml::from_str(s)?;
        let keys: toml::Table = toml::from_str(s)?;
        if keys.contains_key("selection_rule") {
            let rule = params.selection_rule;
            if !keys.contains_key("inclusion_policy") {
                params.inclusion_policy = rule.paired_inclusion();
            }
            if !keys.contains_key("private_goods_divisor") {
                params.private_goods_divisor = rule.paired_divisor();
            }
        }
        params.validate()?;
        Ok(params)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let body = std::fs::read_to_string(path)?;
        Self::from_toml_str(&body)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams::detailed()
    }
}

/// Fatal configuration problems, reported before a run starts
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("n_voters must be at least 1")]
    NoVoters,
    #[error("n_candidates must be at least 1")]
    NoCandidates,
    #[error("{name} must be a finite, non-negative std dev (got {value})")]
    InvalidMutationStd { name: &'static str, value: f64 },
    #[error("theta must be non-negative (got {0})")]
    NegativeTheta(f64),
    #[error("tau and phi must be numbers")]
    InvalidThreshold,
    #[error("target coalition size {target} exceeds n_voters {n_voters}")]
    CoalitionTooLarge { target: usize, n_voters: usize },
    #[error("target coalition size must be positive when it divides private goods")]
    ZeroPrivateDivisor,
    #[error("risk_seeking_ratio must lie in [0, 1] (got {0})")]
    InvalidRiskRatio(f64),
    #[error("resource_pool must be finite (got {0})")]
    InvalidResourcePool(f64),
    #[error("expected {expected} {what}, got {actual}")]
    PopulationMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{rule} elections cannot run with {policy} inclusion (set allow_mixed_policies to force it)")]
    MismatchedInclusion {
        rule: SelectionRule,
        policy: InclusionPolicy,
    },
    #[error("unknown selection rule: {0}")]
    UnknownSelectionRule(String),
    #[error("failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse parameter file: {0}")]
    Parse(#[from] toml::de::Error),
}
