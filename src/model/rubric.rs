use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::matrix::{CriterionId, Score};
use super::types::{Category, CategoryId, Criterion};

/// Bracket level -> ordered categories.
///
/// Each bracket edits its own criterion list, but criterion ids are unique
/// across the whole rubric because score matrices reference criteria by bare
/// id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rubric(BTreeMap<String, Vec<Category>>);

impl Rubric {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert_level(&mut self, level: impl Into<String>, categories: Vec<Category>) {
        self.0.insert(level.into(), categories);
    }

    pub fn levels(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn has_level(&self, level: &str) -> bool {
        self.0.contains_key(level)
    }

    /// Categories of a bracket; unknown brackets have none
    pub fn categories(&self, level: &str) -> &[Category] {
        self.0.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn category(&self, level: &str, category_id: CategoryId) -> Option<&Category> {
        self.categories(level).iter().find(|c| c.id == category_id)
    }

    /// Criteria of a bracket, flattened in category order
    pub fn criteria_for(&self, level: &str) -> Vec<&Criterion> {
        self.categories(level)
            .iter()
            .flat_map(|category| category.criteria.iter())
            .collect()
    }

    pub fn all_criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.0
            .values()
            .flatten()
            .flat_map(|category| category.criteria.iter())
    }

    pub fn max_criterion_id(&self) -> CriterionId {
        self.all_criteria().map(|c| c.id).max().unwrap_or(0)
    }

    /// Id for a new criterion in any bracket: one past the global maximum
    pub fn next_criterion_id(&self) -> CriterionId {
        self.max_criterion_id() + 1
    }

    /// Copy of the rubric where every criterion has an empty list for `level_id`
    pub fn with_performance_level(&self, level_id: &str) -> Rubric {
        self.map_criteria(|criterion| {
            criterion.scores.insert(level_id.to_string(), Vec::new());
        })
    }

    /// Copy of the rubric with `level_id` removed from every score table
    pub fn without_performance_level(&self, level_id: &str) -> Rubric {
        self.map_criteria(|criterion| {
            criterion.scores.remove(level_id);
        })
    }

    fn map_criteria<F>(&self, mut f: F) -> Rubric
    where
        F: FnMut(&mut Criterion),
    {
        let mut rubric = self.clone();
        for categories in rubric.0.values_mut() {
            for category in categories.iter_mut() {
                category.criteria.iter_mut().for_each(&mut f);
            }
        }
        rubric
    }
}

/// Parse a comma separated list of scores ("60, 70,65") into an ascending set.
/// Items that are not integers are ignored.
pub fn parse_score_list(input: &str) -> Vec<Score> {
    let mut values: Vec<Score> = input
        .split(',')
        .filter_map(|item| item.trim().parse().ok())
        .collect();
    values.sort_unstable();
    values.dedup();
    values
}
