use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type JudgeId = String;
pub type CriterionId = u32;
pub type Score = i64;

/// Sparse judge -> criterion -> score table of one participant.
///
/// A missing entry means "not scored yet", which is not the same as a recorded
/// zero. Readers that need a number use [`ScoreMatrix::score_or_zero`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreMatrix(BTreeMap<JudgeId, BTreeMap<CriterionId, Score>>);

impl ScoreMatrix {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Recorded score, if any
    pub fn get(&self, judge: &str, criterion: CriterionId) -> Option<Score> {
        self.0.get(judge).and_then(|scores| scores.get(&criterion)).copied()
    }

    pub fn score_or_zero(&self, judge: &str, criterion: CriterionId) -> Score {
        self.get(judge, criterion).unwrap_or(0)
    }

    pub fn set(&mut self, judge: impl Into<JudgeId>, criterion: CriterionId, score: Score) {
        self.0
            .entry(judge.into())
            .or_default()
            .insert(criterion, score);
    }

    /// All scores recorded by one judge
    pub fn judge_scores(&self, judge: &str) -> Option<&BTreeMap<CriterionId, Score>> {
        self.0.get(judge)
    }

    pub fn has_judge(&self, judge: &str) -> bool {
        self.judge_scores(judge).is_some()
    }

    pub fn judges(&self) -> impl Iterator<Item = &JudgeId> {
        self.0.keys()
    }

    /// Judges that recorded a score (zero included) for `criterion`
    pub fn judges_scoring(&self, criterion: CriterionId) -> impl Iterator<Item = &JudgeId> {
        self.0
            .iter()
            .filter(move |(_, scores)| scores.contains_key(&criterion))
            .map(|(judge, _)| judge)
    }

    /// Sum of everything a judge recorded, regardless of rubric
    ///
    /// This is the running total shown on a judge's score sheet. Leaderboard
    /// totals only count criteria of the participant's bracket; see
    /// `scoring::engine`.
    pub fn judge_total(&self, judge: &str) -> Score {
        self.judge_scores(judge)
            .map(|scores| scores.values().fold(0, |sum: Score, v| sum.saturating_add(*v)))
            .unwrap_or(0)
    }

    /// Number of recorded entries across all judges
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_is_not_zero() {
        let mut matrix = ScoreMatrix::new();
        matrix.set("juri-1", 1, 0);

        assert_eq!(matrix.get("juri-1", 1), Some(0));
        assert_eq!(matrix.get("juri-1", 2), None);
        assert_eq!(matrix.get("juri-2", 1), None);
        assert_eq!(matrix.score_or_zero("juri-2", 1), 0);
    }

    #[test]
    fn test_judge_total_sums_all_entries() {
        let mut matrix = ScoreMatrix::new();
        matrix.set("juri-1", 1, 40);
        matrix.set("juri-1", 2, 45);
        matrix.set("juri-2", 1, 80);

        assert_eq!(matrix.judge_total("juri-1"), 85);
        assert_eq!(matrix.judge_total("juri-2"), 80);
        assert_eq!(matrix.judge_total("juri-3"), 0);
        assert_eq!(matrix.len(), 3);
    }

    #[test]
    fn test_judge_total_saturates() {
        let mut matrix = ScoreMatrix::new();
        matrix.set("juri-1", 1, Score::MAX);
        matrix.set("juri-1", 2, 1);
        matrix.set("juri-2", 1, Score::MIN);
        matrix.set("juri-2", 2, -1);

        assert_eq!(matrix.judge_total("juri-1"), Score::MAX);
        assert_eq!(matrix.judge_total("juri-2"), Score::MIN);
    }

    #[test]
    fn test_judges_scoring_includes_zero_entries() {
        let mut matrix = ScoreMatrix::new();
        matrix.set("juri-1", 7, 0);
        matrix.set("juri-2", 7, 60);
        matrix.set("juri-3", 8, 60);

        let judges: Vec<&JudgeId> = matrix.judges_scoring(7).collect();
        assert_eq!(judges, vec!["juri-1", "juri-2"]);
    }

    #[test]
    fn test_json_shape_uses_string_keys() {
        let mut matrix = ScoreMatrix::new();
        matrix.set("juri-1", 12, 65);

        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json, serde_json::json!({ "juri-1": { "12": 65 } }));

        let parsed: ScoreMatrix = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, matrix);
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = ScoreMatrix::default();
        assert!(matrix.is_empty());
        assert_eq!(matrix.judges().count(), 0);
    }
}
