use rand::seq::IndexedRandom;
use rand::Rng;

use crate::candidate::Candidate;
use crate::params::SelectionRule;

/// Result of counting one generation's ballots
#[derive(Debug, Clone, PartialEq)]
pub struct TallyOutcome {
    /// Ballots per candidate
    pub counts: Vec<usize>,
    /// Size vector the winner was chosen on: the counts under plurality,
    /// coalition sizes under the coalition rule
    pub sizes: Vec<usize>,
    pub winner: usize,
}

/// Index of the largest value; the first one wins ties. `None` when empty.
pub fn argmax_first<T: PartialOrd + Copy>(values: &[T]) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((i, value)),
        }
    }
    best.map(|(i, _)| i)
}

pub fn count_ballots(ballots: &[usize], n_candidates: usize) -> Vec<usize> {
    let mut counts = vec![0; n_candidates];
    for &ballot in ballots {
        counts[ballot] += 1;
    }
    counts
}

/// Count ballots and pick the winner under `rule`.
///
/// Under `CoalitionQuota` each candidate's `supporters` and
/// `winning_coalition` are overwritten; the coalition is a uniform sample
/// without replacement of up to `target_coalition_size` supporters, drawn
/// from `rng` in candidate order.
///
/// Returns `None` only when there are no candidates.
pub fn tally<R: Rng>(
    rule: SelectionRule,
    ballots: &[usize],
    candidates: &mut [Candidate],
    target_coalition_size: usize,
    rng: &mut R,
) -> Option<TallyOutcome> {
    let counts = count_ballots(ballots, candidates.len());

    let sizes = match rule {
        SelectionRule::Plurality => counts.clone(),
        SelectionRule::CoalitionQuota => {
            for (id, candidate) in candidates.iter_mut().enumerate() {
                let supporters: Vec<usize> = ballots
                    .iter()
                    .enumerate()
                    .filter(|&(_, &ballot)| ballot == id)
                    .map(|(voter, _)| voter)
                    .collect();
                candidate.winning_coalition = supporters
                    .choose_multiple(rng, target_coalition_size)
                    .copied()
                    .collect();
                candidate.supporters = supporters.into_iter().collect();
            }
            candidates
                .iter()
                .map(|c| c.winning_coalition.len())
                .collect()
        }
    };

    let winner = argmax_first(&sizes)?;
    Some(TallyOutcome {
        counts,
        sizes,
        winner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn slate(n: usize) -> Vec<Candidate> {
        (0..n).map(|i| Candidate::new(i as f64 * 10.0, 0.5)).collect()
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax_first(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax_first(&[5, 5, 5]), Some(0));
        assert_eq!(argmax_first::<f64>(&[]), None);
        assert_eq!(argmax_first(&[-4.0, -1.0, -2.0]), Some(1));
    }

    #[test]
    fn plurality_counts_and_winner() {
        let mut candidates = slate(3);
        let ballots = vec![2, 0, 2, 1, 2, 0];
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = tally(
            SelectionRule::Plurality,
            &ballots,
            &mut candidates,
            2,
            &mut rng,
        )
        .unwrap();

        assert_eq!(outcome.counts, vec![2, 1, 3]);
        assert_eq!(outcome.sizes, outcome.counts);
        assert_eq!(outcome.winner, 2);
        assert!(candidates.iter().all(|c| c.winning_coalition.is_empty()));
    }

    #[test]
    fn plurality_tie_goes_to_lowest_index() {
        let mut candidates = slate(3);
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = tally(
            SelectionRule::Plurality,
            &[1, 2, 2, 1],
            &mut candidates,
            2,
            &mut rng,
        )
        .unwrap();
        assert_eq!(outcome.winner, 1);
    }

    #[test]
    fn coalition_sampled_from_supporters() {
        let mut candidates = slate(2);
        let ballots = vec![0, 1, 0, 0, 1, 0];
        let mut rng = StdRng::seed_from_u64(4);

        let outcome = tally(
            SelectionRule::CoalitionQuota,
            &ballots,
            &mut candidates,
            3,
            &mut rng,
        )
        .unwrap();

        assert_eq!(candidates[0].supporters, [0, 2, 3, 5].into_iter().collect());
        assert_eq!(candidates[1].supporters, [1, 4].into_iter().collect());
        assert_eq!(candidates[0].winning_coalition.len(), 3);
        assert!(candidates[0]
            .winning_coalition
            .is_subset(&candidates[0].supporters));
        // Fewer supporters than the quota: all of them
        assert_eq!(candidates[1].winning_coalition, candidates[1].supporters);
        assert_eq!(outcome.sizes, vec![3, 2]);
        assert_eq!(outcome.counts, vec![4, 2]);
        assert_eq!(outcome.winner, 0);
    }

    #[test]
    fn coalition_cap_can_tie_bigger_camp() {
        // Both camps exceed the quota, so coalitions tie and index 0 wins
        let mut candidates = slate(2);
        let ballots = vec![1, 1, 1, 1, 0, 0];
        let mut rng = StdRng::seed_from_u64(8);

        let outcome = tally(
            SelectionRule::CoalitionQuota,
            &ballots,
            &mut candidates,
            2,
            &mut rng,
        )
        .unwrap();

        assert_eq!(outcome.sizes, vec![2, 2]);
        assert_eq!(outcome.winner, 0);
    }

    #[test]
    fn coalition_sampling_is_seeded() {
        let ballots: Vec<usize> = (0..40).map(|v| v % 2).collect();
        let run = |seed| {
            let mut candidates = slate(2);
            let mut rng = StdRng::seed_from_u64(seed);
            tally(
                SelectionRule::CoalitionQuota,
                &ballots,
                &mut candidates,
                5,
                &mut rng,
            );
            candidates
        };
        assert_eq!(run(17), run(17));
    }

    #[test]
    fn empty_slate_has_no_winner() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(tally(SelectionRule::Plurality, &[], &mut [], 1, &mut rng).is_none());
    }
}
