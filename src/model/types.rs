use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::matrix::{CriterionId, JudgeId, Score, ScoreMatrix};

pub type ParticipantId = String;
pub type PerformanceLevelId = String;
pub type CategoryId = u32;

/// Permitted scores of a criterion, keyed by performance level
pub type ScoreTable = BTreeMap<PerformanceLevelId, Vec<Score>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Competition bracket, e.g. "SD"
    pub level: String,
    #[serde(default)]
    pub scores: ScoreMatrix,
}

impl Participant {
    pub fn new(
        id: impl Into<ParticipantId>,
        name: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: level.into(),
            scores: ScoreMatrix::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judge {
    pub id: JudgeId,
    pub name: String,
}

impl Judge {
    pub fn new(id: impl Into<JudgeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Display colours of a performance level. Not used for scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelStyle {
    pub color: String,
    pub text_color: String,
}

/// Qualitative tier ("Good", "Excellent") that criteria map to numeric scores
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceLevel {
    pub id: PerformanceLevelId,
    pub name: String,
    #[serde(flatten)]
    pub style: LevelStyle,
}

/// A new performance level before an id is assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceLevelDraft {
    pub name: String,
    pub style: LevelStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: CriterionId,
    pub name: String,
    #[serde(default)]
    pub scores: ScoreTable,
}

impl Criterion {
    /// Sorted union of the values permitted under any performance level
    pub fn permitted_scores(&self) -> Vec<Score> {
        self.scores
            .values()
            .flatten()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn permits(&self, value: Score) -> bool {
        self.scores.values().any(|values| values.contains(&value))
    }

    /// Align the score table with the current performance levels.
    ///
    /// Every known level gets a (possibly empty) list, keys of unknown levels
    /// are dropped, and each list becomes an ascending set.
    pub fn normalized(mut self, levels: &[PerformanceLevel]) -> Self {
        let mut table = ScoreTable::new();
        for level in levels {
            let mut values = self.scores.remove(&level.id).unwrap_or_default();
            values.sort_unstable();
            values.dedup();
            table.insert(level.id.clone(), values);
        }
        self.scores = table;
        self
    }
}

/// A criterion submitted for creation; the id is allocated by the rubric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionDraft {
    pub name: String,
    pub scores: ScoreTable,
}

impl CriterionDraft {
    pub fn into_criterion(self, id: CriterionId) -> Criterion {
        Criterion {
            id,
            name: self.name,
            scores: self.scores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(id: &str) -> PerformanceLevel {
        PerformanceLevel {
            id: id.to_string(),
            name: id.to_uppercase(),
            style: LevelStyle::default(),
        }
    }

    fn criterion() -> Criterion {
        let mut scores = ScoreTable::new();
        scores.insert("level-1".to_string(), vec![50, 40, 45]);
        scores.insert("level-2".to_string(), vec![70, 60, 65, 60]);
        scores.insert("gone".to_string(), vec![99]);
        Criterion {
            id: 3,
            name: "Hormat".to_string(),
            scores,
        }
    }

    #[test]
    fn test_permitted_scores_is_sorted_union() {
        let c = criterion();
        assert_eq!(c.permitted_scores(), vec![40, 45, 50, 60, 65, 70, 99]);
        assert!(c.permits(65));
        assert!(!c.permits(66));
    }

    #[test]
    fn test_normalized_fills_and_drops_levels() {
        let levels = vec![level("level-1"), level("level-2"), level("level-3")];
        let c = criterion().normalized(&levels);

        assert_eq!(c.scores.len(), 3);
        assert_eq!(c.scores["level-1"], vec![40, 45, 50]);
        assert_eq!(c.scores["level-2"], vec![60, 65, 70]);
        assert!(c.scores["level-3"].is_empty());
        assert!(!c.scores.contains_key("gone"));
    }

    #[test]
    fn test_participant_without_scores_decodes() {
        let json = serde_json::json!({ "id": "tim-b", "name": "Tim B", "level": "SD" });
        let p: Participant = serde_json::from_value(json).unwrap();
        assert!(p.scores.is_empty());
    }

    #[test]
    fn test_performance_level_uses_document_field_names() {
        let json = serde_json::json!({
            "id": "level-1",
            "name": "CUKUP",
            "color": "bg-red-500",
            "textColor": "text-white"
        });
        let parsed: PerformanceLevel = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(parsed.style.color, "bg-red-500");
        assert_eq!(parsed.style.text_color, "text-white");
        assert_eq!(serde_json::to_value(&parsed).unwrap(), json);
    }
}
