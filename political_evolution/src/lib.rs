//! Evolution of candidate platforms under repeated elections.
//!
//! Voters with fixed ideologies and risk dispositions vote for the candidate
//! that maximizes their utility: an ideological distance term, a public-goods
//! share every voter receives, and a private-goods share only voters who
//! expect to be in the winner's coalition receive. Each generation the
//! winner survives unchanged and every losing slot is refilled with a
//! mutated copy of the winner.
//!
//! Key pieces:
//! - `ElectionSystem`: runs generations, one `des` event per generation
//! - `tally`: plurality or coalition-quota winner selection
//! - `inclusion`: fixed-quota or observed-support coalition estimates
//! - `records` / `output`: per-generation, per-candidate and per-voter rows

pub mod analysis;
pub mod candidate;
pub mod inclusion;
pub mod output;
pub mod params;
pub mod records;
pub mod scenarios;
pub mod system;
pub mod tally;
pub mod voter;

pub use candidate::Candidate;
pub use params::{
    ConfigError, IdeologyTerm, InclusionPolicy, ModelParams, PolicyDomain, PrivateGoodsDivisor,
    RiskAssignment, SelectionRule,
};
pub use records::SimulationHistory;
pub use system::{ElectionSystem, GenerationOutcome, SimulationError};
pub use voter::{RiskType, Voter};

/// Events in the election simulation
#[derive(Debug, Clone)]
pub enum Event {
    /// Run one election cycle
    GenerationStart { generation: usize },
    /// All configured generations are done
    RunEnd,
}

/// Observable state of an election run
#[derive(Debug, Clone)]
pub struct ElectionStats {
    pub scenario_name: String,
    pub generations_completed: usize,
    pub history: SimulationHistory,
    /// Slate that would contest the next election
    pub candidates: Vec<Candidate>,
    /// Set when a generation failed and the run stopped early
    pub halted: Option<SimulationError>,
}

/// Combined stats enum for DES framework compatibility
#[derive(Debug, Clone)]
pub enum Stats {
    Election(ElectionStats),
}
