use serde::{Deserialize, Serialize};

use crate::records::SimulationHistory;

/// Compute mean of a series
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compute (population) standard deviation of a series
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Where the winning platform ended up and how it got there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub generations: usize,
    pub final_winner_ideology: Option<f64>,
    pub final_winner_alpha: Option<f64>,
    pub mean_winner_ideology: f64,
    pub std_winner_ideology: f64,
    pub mean_winner_alpha: f64,
    pub std_winner_alpha: f64,
    /// Generations whose winner sat in a different slot than the previous winner
    pub winner_slot_changes: usize,
    /// Winner's size (votes or coalition) over the electorate, averaged
    pub mean_winner_share: f64,
    /// Share of voter-candidate pairs with an inclusion belief; only known
    /// when per-voter rows were recorded
    pub inclusion_rate: Option<f64>,
}

impl TrajectorySummary {
    pub fn from_history(history: &SimulationHistory, n_voters: usize) -> Self {
        let alphas = history.winner_alphas();
        let ideologies = history.winner_ideologies();

        let winner_slot_changes = history
            .generations
            .windows(2)
            .filter(|w| w[0].winner != w[1].winner)
            .count();

        let shares: Vec<f64> = history
            .generations
            .iter()
            .map(|g| g.sizes[g.winner] as f64 / n_voters as f64)
            .collect();

        let (included, pairs) = history
            .voters
            .iter()
            .flat_map(|v| v.per_candidate.iter())
            .fold((0usize, 0usize), |(inc, all), view| {
                (inc + usize::from(view.included), all + 1)
            });
        let inclusion_rate = (pairs > 0).then(|| included as f64 / pairs as f64);

        TrajectorySummary {
            generations: history.len(),
            final_winner_ideology: history.last().map(|g| g.winner_ideology),
            final_winner_alpha: history.last().map(|g| g.winner_alpha),
            mean_winner_ideology: mean(&ideologies),
            std_winner_ideology: std_dev(&ideologies),
            mean_winner_alpha: mean(&alphas),
            std_winner_alpha: std_dev(&alphas),
            winner_slot_changes,
            mean_winner_share: mean(&shares),
            inclusion_rate,
        }
    }

    pub fn print_summary(&self) {
        println!("Generations: {}", self.generations);
        if let (Some(ideology), Some(alpha)) = (self.final_winner_ideology, self.final_winner_alpha) {
            println!("Final winner policy: {:.2}", ideology);
            println!("Final winner alpha (public/private split): {:.2}", alpha);
        }
        println!(
            "Winner ideology: mean={:.2}, std={:.2}",
            self.mean_winner_ideology, self.std_winner_ideology
        );
        println!(
            "Winner alpha: mean={:.3}, std={:.3}",
            self.mean_winner_alpha, self.std_winner_alpha
        );
        println!("Winning slot changed {} times", self.winner_slot_changes);
        println!("Mean winner share: {:.1}%", self.mean_winner_share * 100.0);
        if let Some(rate) = self.inclusion_rate {
            println!("Inclusion beliefs: {:.1}% of voter-candidate pairs", rate * 100.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CandidateView, GenerationRecord, VoterRecord};
    use crate::voter::RiskType;
    use approx::assert_relative_eq;

    fn record(generation: usize, winner: usize, alpha: f64) -> GenerationRecord {
        GenerationRecord {
            generation,
            sizes: vec![6, 4],
            winner,
            winner_ideology: 50.0 + generation as f64,
            winner_alpha: alpha,
        }
    }

    #[test]
    fn mean_and_std() {
        assert_eq!(mean(&[]), 0.0);
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_relative_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
    }

    #[test]
    fn summary_of_short_history() {
        let mut history = SimulationHistory::new();
        history.generations = vec![record(0, 0, 0.2), record(1, 0, 0.4), record(2, 1, 0.6)];

        let summary = TrajectorySummary::from_history(&history, 10);

        assert_eq!(summary.generations, 3);
        assert_eq!(summary.final_winner_alpha, Some(0.6));
        assert_eq!(summary.final_winner_ideology, Some(52.0));
        assert_relative_eq!(summary.mean_winner_alpha, 0.4);
        assert_eq!(summary.winner_slot_changes, 1);
        // (0.6 + 0.6 + 0.4) / 3
        assert_relative_eq!(summary.mean_winner_share, 1.6 / 3.0);
        assert_eq!(summary.inclusion_rate, None);
    }

    #[test]
    fn inclusion_rate_from_voter_rows() {
        let view = |included| CandidateView {
            ideology: 0.0,
            alpha: 0.0,
            included,
            utility: 0.0,
        };
        let mut history = SimulationHistory::new();
        history.voters.push(VoterRecord {
            generation: 0,
            voter_id: 0,
            risk_type: RiskType::Safe,
            ballot: 0,
            voter_ideology: 0.0,
            per_candidate: vec![view(true), view(false), view(false), view(true)],
        });

        let summary = TrajectorySummary::from_history(&history, 1);
        assert_eq!(summary.inclusion_rate, Some(0.5));
        assert_eq!(summary.final_winner_alpha, None);
    }
}
