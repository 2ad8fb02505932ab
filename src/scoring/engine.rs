use std::collections::BTreeMap;

use super::filter::{filter_by_level, LevelFilter};
use crate::model::{Criterion, CriterionId, EventState, Judge, JudgeId, Participant, Score};

/// A participant with its aggregated scores and leaderboard position
#[derive(Debug, Clone, PartialEq)]
pub struct RankedParticipant {
    pub participant: Participant,
    /// 1-based competition rank; equal totals share a rank
    pub rank: usize,
    pub total: Score,
    pub criterion_totals: BTreeMap<CriterionId, Score>,
    pub judge_totals: BTreeMap<JudgeId, Score>,
}

impl RankedParticipant {
    pub fn criterion_total(&self, criterion: CriterionId) -> Score {
        self.criterion_totals.get(&criterion).copied().unwrap_or(0)
    }

    pub fn judge_total(&self, judge: &str) -> Score {
        self.judge_totals.get(judge).copied().unwrap_or(0)
    }

    /// Recorded score of one cell, zero when missing
    pub fn score(&self, judge: &str, criterion: CriterionId) -> Score {
        self.participant.scores.score_or_zero(judge, criterion)
    }
}

struct Totals {
    total: Score,
    criterion_totals: BTreeMap<CriterionId, Score>,
    judge_totals: BTreeMap<JudgeId, Score>,
}

/// Sum every judge x criterion cell of the participant's bracket rubric.
/// Missing cells count as zero and every judge gets a total, even one that
/// has not scored anything yet. Sums saturate at the `Score` bounds.
fn aggregate(participant: &Participant, judges: &[Judge], criteria: &[&Criterion]) -> Totals {
    let mut judge_totals: BTreeMap<JudgeId, Score> =
        judges.iter().map(|j| (j.id.clone(), 0)).collect();
    let mut criterion_totals = BTreeMap::new();

    for criterion in criteria {
        let mut criterion_total: Score = 0;
        for judge in judges {
            let score = participant.scores.score_or_zero(&judge.id, criterion.id);
            criterion_total = criterion_total.saturating_add(score);
            let judge_total = judge_totals.entry(judge.id.clone()).or_insert(0);
            *judge_total = judge_total.saturating_add(score);
        }
        criterion_totals.insert(criterion.id, criterion_total);
    }

    Totals {
        total: judge_totals.values().fold(0, |sum: Score, v| sum.saturating_add(*v)),
        criterion_totals,
        judge_totals,
    }
}

/// Competition ranks ("1-2-2-4") for totals already sorted descending.
///
/// An entry shares the previous rank only when its total is exactly equal;
/// otherwise its rank is its 1-based position.
pub fn assign_ranks(sorted_totals: &[Score]) -> Vec<usize> {
    let mut ranks = Vec::with_capacity(sorted_totals.len());
    let mut previous: Option<(Score, usize)> = None;

    for (index, &total) in sorted_totals.iter().enumerate() {
        let rank = match previous {
            Some((prev_total, prev_rank)) if prev_total == total => prev_rank,
            _ => index + 1,
        };
        ranks.push(rank);
        previous = Some((total, rank));
    }
    ranks
}

/// Aggregate and rank a population of participants.
///
/// `criteria_for_level` supplies the flattened rubric of a bracket. Ranks are
/// relative to `participants` only: filter first, then rank. Ties keep input
/// order and are never broken by name or id.
pub fn rank<'r, F>(
    participants: &[Participant],
    judges: &[Judge],
    criteria_for_level: F,
) -> Vec<RankedParticipant>
where
    F: Fn(&str) -> Vec<&'r Criterion>,
{
    let mut scored: Vec<RankedParticipant> = participants
        .iter()
        .map(|participant| {
            let criteria = criteria_for_level(&participant.level);
            let totals = aggregate(participant, judges, &criteria);
            RankedParticipant {
                participant: participant.clone(),
                rank: 0,
                total: totals.total,
                criterion_totals: totals.criterion_totals,
                judge_totals: totals.judge_totals,
            }
        })
        .collect();

    // Stable: equal totals stay in input order
    scored.sort_by(|a, b| b.total.cmp(&a.total));

    let totals: Vec<Score> = scored.iter().map(|r| r.total).collect();
    for (ranked, rank) in scored.iter_mut().zip(assign_ranks(&totals)) {
        ranked.rank = rank;
    }
    scored
}

/// Leaderboard of the selected population of a state snapshot
pub fn leaderboard(state: &EventState, filter: &LevelFilter) -> Vec<RankedParticipant> {
    let population = filter_by_level(&state.participants, filter);
    rank(&population, &state.judges, |level| state.rubric.criteria_for(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Rubric, ScoreTable};

    fn criterion(id: CriterionId) -> Criterion {
        Criterion {
            id,
            name: format!("Criterion {}", id),
            scores: ScoreTable::new(),
        }
    }

    fn judges() -> Vec<Judge> {
        vec![Judge::new("j1", "Juri 1"), Judge::new("j2", "Juri 2")]
    }

    fn rubric() -> Rubric {
        let mut rubric = Rubric::new();
        rubric.insert_level(
            "SD",
            vec![Category {
                id: 1,
                name: "Dasar".to_string(),
                criteria: vec![criterion(1), criterion(2)],
            }],
        );
        rubric.insert_level(
            "SMP",
            vec![Category {
                id: 1,
                name: "Dasar".to_string(),
                criteria: vec![criterion(3)],
            }],
        );
        rubric
    }

    /// Participant whose grand total is `total`, recorded by j1 on criterion
    /// 1 (SD) or 3 (SMP)
    fn participant(id: &str, level: &str, total: Score) -> Participant {
        let mut p = Participant::new(id, id.to_uppercase(), level);
        let criterion = if level == "SD" { 1 } else { 3 };
        p.scores.set("j1", criterion, total);
        p
    }

    fn ranks_of(ranked: &[RankedParticipant]) -> Vec<(String, usize)> {
        ranked
            .iter()
            .map(|r| (r.participant.id.clone(), r.rank))
            .collect()
    }

    #[test]
    fn test_assign_ranks_with_ties() {
        assert_eq!(assign_ranks(&[100, 90, 90, 80]), vec![1, 2, 2, 4]);
        assert_eq!(assign_ranks(&[50, 50, 50]), vec![1, 1, 1]);
        assert_eq!(assign_ranks(&[]), Vec::<usize>::new());
    }

    #[test]
    fn test_assign_ranks_handles_negative_totals() {
        assert_eq!(assign_ranks(&[-1, -1, -5]), vec![1, 1, 3]);
    }

    #[test]
    fn test_totals_per_criterion_and_judge() {
        let rubric = rubric();
        let mut p = Participant::new("a", "A", "SD");
        p.scores.set("j1", 1, 40);
        p.scores.set("j1", 2, 45);
        p.scores.set("j2", 1, 60);

        let ranked = rank(&[p], &judges(), |level| rubric.criteria_for(level));
        let r = &ranked[0];

        assert_eq!(r.criterion_total(1), 100);
        assert_eq!(r.criterion_total(2), 45);
        assert_eq!(r.judge_total("j1"), 85);
        assert_eq!(r.judge_total("j2"), 60);
        assert_eq!(r.total, 145);
        assert_eq!(r.rank, 1);
    }

    #[test]
    fn test_unscored_judge_contributes_zero() {
        let rubric = rubric();
        let mut p = Participant::new("a", "A", "SD");
        p.scores.set("j1", 1, 70);

        let ranked = rank(&[p], &judges(), |level| rubric.criteria_for(level));
        let r = &ranked[0];

        assert_eq!(r.judge_totals.get("j2"), Some(&0));
        assert_eq!(r.total, 70);
    }

    #[test]
    fn test_scores_outside_bracket_rubric_are_ignored() {
        let rubric = rubric();
        let mut p = Participant::new("a", "A", "SD");
        p.scores.set("j1", 1, 50);
        // criterion 3 belongs to SMP, e.g. left over from a re-bracketing
        p.scores.set("j1", 3, 80);
        // removed judge
        p.scores.set("ghost", 1, 99);

        let ranked = rank(&[p], &judges(), |level| rubric.criteria_for(level));
        assert_eq!(ranked[0].total, 50);
        assert!(!ranked[0].criterion_totals.contains_key(&3));
    }

    #[test]
    fn test_extreme_scores_saturate() {
        let rubric = rubric();
        let mut high = Participant::new("high", "HIGH", "SD");
        high.scores.set("j1", 1, Score::MAX);
        high.scores.set("j2", 1, 1);
        high.scores.set("j2", 2, Score::MAX);
        let mut low = Participant::new("low", "LOW", "SD");
        low.scores.set("j1", 1, Score::MIN);
        low.scores.set("j2", 1, -1);

        let ranked = rank(&[low, high], &judges(), |level| rubric.criteria_for(level));

        assert_eq!(ranked[0].participant.id, "high");
        assert_eq!(ranked[0].criterion_total(1), Score::MAX);
        assert_eq!(ranked[0].judge_total("j2"), Score::MAX);
        assert_eq!(ranked[0].total, Score::MAX);
        assert_eq!(ranked[1].total, Score::MIN);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn test_unknown_bracket_scores_zero() {
        let rubric = rubric();
        let p = participant("a", "SLTA", 90);
        let ranked = rank(&[p], &judges(), |level| rubric.criteria_for(level));
        assert_eq!(ranked[0].total, 0);
        assert!(ranked[0].criterion_totals.is_empty());
    }

    #[test]
    fn test_rank_sorts_descending_with_shared_ranks() {
        let rubric = rubric();
        let participants = vec![
            participant("c", "SD", 90),
            participant("a", "SD", 100),
            participant("d", "SD", 80),
            participant("b", "SD", 90),
        ];

        let ranked = rank(&participants, &judges(), |level| rubric.criteria_for(level));
        assert_eq!(
            ranks_of(&ranked),
            vec![
                ("a".to_string(), 1),
                ("c".to_string(), 2),
                ("b".to_string(), 2),
                ("d".to_string(), 4),
            ]
        );
    }

    #[test]
    fn test_rank_is_relative_to_filtered_population() {
        let mut state = EventState::new();
        state.rubric = rubric();
        state.judges = judges();
        state.participants = vec![
            participant("a", "SD", 100),
            participant("b", "SMP", 200),
            participant("c", "SD", 100),
        ];

        let all = leaderboard(&state, &LevelFilter::All);
        assert_eq!(
            ranks_of(&all),
            vec![("b".to_string(), 1), ("a".to_string(), 2), ("c".to_string(), 2)]
        );

        let sd = leaderboard(&state, &LevelFilter::Level("SD".to_string()));
        assert_eq!(ranks_of(&sd), vec![("a".to_string(), 1), ("c".to_string(), 1)]);

        // Same as dropping non-SD rows from the full board and re-ranking them
        let retained: Vec<Score> = all
            .iter()
            .filter(|r| r.participant.level == "SD")
            .map(|r| r.total)
            .collect();
        let reranked = assign_ranks(&retained);
        assert_eq!(sd.iter().map(|r| r.rank).collect::<Vec<_>>(), reranked);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let rubric = rubric();
        let participants = vec![
            participant("a", "SD", 10),
            participant("b", "SMP", 10),
            participant("c", "SD", 30),
        ];
        let first = rank(&participants, &judges(), |level| rubric.criteria_for(level));
        let second = rank(&participants, &judges(), |level| rubric.criteria_for(level));
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_population() {
        let rubric = rubric();
        assert!(rank(&[], &judges(), |level| rubric.criteria_for(level)).is_empty());
    }
}
