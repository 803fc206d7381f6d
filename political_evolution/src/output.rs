//! Data output and serialization for experimental analysis
//!
//! Writes the three record streams as CSV (one file each, ready for pandas
//! or any plotting tool) plus a JSON summary with the run's metadata.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::TrajectorySummary;
use crate::params::ModelParams;
use crate::records::SimulationHistory;
use crate::scenarios::ScenarioResult;

pub const SUMMARY_CSV: &str = "election_summary.csv";
pub const CANDIDATES_CSV: &str = "candidate_trajectory.csv";
pub const VOTES_CSV: &str = "vote_data.csv";
pub const SUMMARY_JSON: &str = "summary.json";

/// Metadata for reproducibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationMetadata {
    pub scenario_name: String,
    pub params: ModelParams,
    pub seed: u64,
    pub generations_completed: usize,
    pub timestamp: String,
}

/// Top-level container for simulation output
#[derive(Debug, Clone)]
pub struct SimulationOutput {
    pub metadata: SimulationMetadata,
    pub history: SimulationHistory,
    pub summary: TrajectorySummary,
}

#[derive(Serialize)]
struct SummaryDocument<'a> {
    metadata: &'a SimulationMetadata,
    summary: &'a TrajectorySummary,
}

impl SimulationOutput {
    pub fn from_result(result: &ScenarioResult) -> Self {
        let params = &result.config.params;
        SimulationOutput {
            metadata: SimulationMetadata {
                scenario_name: result.config.name.clone(),
                params: params.clone(),
                seed: result.config.seed,
                generations_completed: result.stats.generations_completed,
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            history: result.stats.history.clone(),
            summary: TrajectorySummary::from_history(&result.stats.history, params.n_voters),
        }
    }

    fn n_candidates(&self) -> usize {
        self.metadata.params.n_candidates
    }

    /// One row per generation: sizes, winner and the winner's platform
    pub fn write_summary_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;

        let mut header = vec!["generation".to_string()];
        header.extend((0..self.n_candidates()).map(|i| format!("size_{}", i)));
        header.extend([
            "winner_idx".to_string(),
            "winner_ideology".to_string(),
            "winner_alpha".to_string(),
        ]);
        wtr.write_record(&header)?;

        for record in &self.history.generations {
            let mut row = vec![record.generation.to_string()];
            row.extend(record.sizes.iter().map(|s| s.to_string()));
            row.extend([
                record.winner.to_string(),
                record.winner_ideology.to_string(),
                record.winner_alpha.to_string(),
            ]);
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// One row per candidate slot per generation
    pub fn write_candidates_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;

        wtr.write_record([
            "generation",
            "candidate_id",
            "ideology",
            "alpha",
            "is_winner",
        ])?;

        for record in &self.history.candidates {
            wtr.write_record(&[
                record.generation.to_string(),
                record.candidate_id.to_string(),
                record.ideology.to_string(),
                record.alpha.to_string(),
                record.is_winner.to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// One row per voter per generation, candidates spread across columns.
    /// Empty (header only) unless the run kept detailed records.
    pub fn write_votes_csv<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut wtr = csv::Writer::from_path(path)?;

        let mut header: Vec<String> = [
            "generation",
            "voter_id",
            "risk_type",
            "voted_for",
            "voter_ideology",
            "winner_idx",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for cid in 0..self.n_candidates() {
            for field in ["ideology", "alpha", "included", "utility"] {
                header.push(format!("cand{}_{}", cid, field));
            }
        }
        wtr.write_record(&header)?;

        for record in &self.history.voters {
            let winner = self
                .history
                .generations
                .get(record.generation)
                .map(|g| g.winner.to_string())
                .unwrap_or_default();
            let mut row = vec![
                record.generation.to_string(),
                record.voter_id.to_string(),
                record.risk_type.to_string(),
                record.ballot.to_string(),
                record.voter_ideology.to_string(),
                winner,
            ];
            for view in &record.per_candidate {
                row.push(view.ideology.to_string());
                row.push(view.alpha.to_string());
                row.push(view.included.to_string());
                row.push(view.utility.to_string());
            }
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write summary JSON with metadata and trajectory summary
    pub fn write_summary_json<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let document = SummaryDocument {
            metadata: &self.metadata,
            summary: &self.summary,
        };
        let json = serde_json::to_string_pretty(&document)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write all outputs to a directory
    ///
    /// Creates:
    /// - election_summary.csv
    /// - candidate_trajectory.csv
    /// - vote_data.csv
    /// - summary.json
    pub fn write_all<P: AsRef<Path>>(&self, dir: P) -> Result<(), Box<dyn std::error::Error>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        self.write_summary_csv(dir.join(SUMMARY_CSV))?;
        self.write_candidates_csv(dir.join(CANDIDATES_CSV))?;
        self.write_votes_csv(dir.join(VOTES_CSV))?;
        self.write_summary_json(dir.join(SUMMARY_JSON))?;

        log::info!("wrote results to {}", dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::{run_scenario, ScenarioConfig};

    fn small_result() -> ScenarioResult {
        let mut config = ScenarioConfig::detailed(42);
        config.params.n_voters = 12;
        config.params.n_candidates = 3;
        config.params.target_coalition_size = 3;
        config.params.n_generations = 5;
        run_scenario(config).unwrap()
    }

    #[test]
    fn writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = SimulationOutput::from_result(&small_result());

        output.write_all(dir.path()).unwrap();

        for name in [SUMMARY_CSV, CANDIDATES_CSV, VOTES_CSV, SUMMARY_JSON] {
            assert!(dir.path().join(name).exists(), "missing {}", name);
        }
    }

    #[test]
    fn csv_row_counts_and_headers() {
        let dir = tempfile::tempdir().unwrap();
        let output = SimulationOutput::from_result(&small_result());
        output.write_all(dir.path()).unwrap();

        let mut summary = csv::Reader::from_path(dir.path().join(SUMMARY_CSV)).unwrap();
        let headers = summary.headers().unwrap().clone();
        assert_eq!(headers.len(), 1 + 3 + 3);
        assert_eq!(&headers[1], "size_0");
        assert_eq!(summary.records().count(), 5);

        let mut candidates = csv::Reader::from_path(dir.path().join(CANDIDATES_CSV)).unwrap();
        assert_eq!(candidates.records().count(), 5 * 3);

        let mut votes = csv::Reader::from_path(dir.path().join(VOTES_CSV)).unwrap();
        let headers = votes.headers().unwrap().clone();
        assert_eq!(headers.len(), 6 + 4 * 3);
        assert_eq!(&headers[6], "cand0_ideology");
        assert_eq!(votes.records().count(), 5 * 12);
    }

    #[test]
    fn summary_json_carries_params() {
        let dir = tempfile::tempdir().unwrap();
        let output = SimulationOutput::from_result(&small_result());
        output.write_all(dir.path()).unwrap();

        let body = fs::read_to_string(dir.path().join(SUMMARY_JSON)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["metadata"]["seed"], 42);
        assert_eq!(value["metadata"]["params"]["n_voters"], 12);
        assert_eq!(value["metadata"]["params"]["selection_rule"], "plurality");
        assert_eq!(value["summary"]["generations"], 5);
    }
}
