use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

use super::rubric::Rubric;
use super::types::{Category, CategoryId, Criterion, Judge, Participant, PerformanceLevel};
use crate::store::Root;

/// Parts of the last rubric snapshot that could not be decoded.
///
/// A damaged part is missing from the local rubric, so writing it back would
/// erase the undecodable entries from the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RubricDamage {
    #[default]
    None,
    /// Brackets with at least one skipped category or criterion
    Brackets(BTreeSet<String>),
    /// The root itself was not a bracket map
    Root,
}

impl RubricDamage {
    pub fn is_intact(&self) -> bool {
        matches!(self, RubricDamage::None)
    }

    pub fn covers(&self, level: &str) -> bool {
        match self {
            RubricDamage::None => false,
            RubricDamage::Brackets(levels) => levels.contains(level),
            RubricDamage::Root => true,
        }
    }
}

/// Locally materialized copy of the shared event document.
///
/// It is only ever replaced from store snapshots; commands never edit it
/// directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventState {
    pub participants: Vec<Participant>,
    pub judges: Vec<Judge>,
    pub rubric: Rubric,
    pub performance_levels: Vec<PerformanceLevel>,
    pub rubric_damage: RubricDamage,
}

impl EventState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn judge(&self, id: &str) -> Option<&Judge> {
        self.judges.iter().find(|j| j.id == id)
    }

    pub fn performance_level(&self, id: &str) -> Option<&PerformanceLevel> {
        self.performance_levels.iter().find(|l| l.id == id)
    }

    pub fn participants_in<'a>(&'a self, level: &'a str) -> impl Iterator<Item = &'a Participant> {
        self.participants.iter().filter(move |p| p.level == level)
    }

    /// Replace one root from a full subtree snapshot. An absent snapshot
    /// empties that part of the state.
    pub fn apply_snapshot(&mut self, root: Root, snapshot: Option<&Value>) {
        debug!("Applying snapshot for {}", root.key());
        match root {
            Root::Participants => self.participants = decode_collection(root, snapshot),
            Root::Judges => self.judges = decode_collection(root, snapshot),
            Root::PerformanceLevels => {
                self.performance_levels = decode_collection(root, snapshot)
            }
            Root::CategoriesByLevel => {
                (self.rubric, self.rubric_damage) = decode_rubric(snapshot);
            }
        }
    }
}

/// Values of an id-keyed collection. Arrays are accepted too (holes are
/// skipped), since replicated document stores may hand back dense
/// integer-keyed objects as arrays. `None` for anything else.
fn collection_entries(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Object(map) => Some(map.values().collect()),
        Value::Array(items) => Some(items.iter().filter(|v| !v.is_null()).collect()),
        Value::Null => Some(Vec::new()),
        _ => None,
    }
}

/// Decode an id-keyed collection, skipping records that do not parse.
fn decode_collection<T: DeserializeOwned>(root: Root, snapshot: Option<&Value>) -> Vec<T> {
    let entries = match snapshot {
        None => Vec::new(),
        Some(value) => match collection_entries(value) {
            Some(entries) => entries,
            None => {
                warn!("Ignoring non-collection snapshot for {}: {}", root.key(), value);
                return Vec::new();
            }
        },
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<T>(entry.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed record under {}: {}", root.key(), e);
                None
            }
        })
        .collect()
}

/// Category record with its criteria left undecoded
#[derive(Deserialize)]
struct CategoryHeader {
    id: CategoryId,
    name: String,
    #[serde(default)]
    criteria: Value,
}

/// Decode the rubric bracket by bracket, skipping categories and criteria
/// that do not parse and remembering where that happened.
fn decode_rubric(snapshot: Option<&Value>) -> (Rubric, RubricDamage) {
    let brackets = match snapshot {
        None | Some(Value::Null) => return (Rubric::new(), RubricDamage::None),
        Some(Value::Object(brackets)) => brackets,
        Some(other) => {
            warn!("Ignoring malformed rubric snapshot: {}", other);
            return (Rubric::new(), RubricDamage::Root);
        }
    };

    let mut rubric = Rubric::new();
    let mut damaged = BTreeSet::new();
    for (level, value) in brackets {
        let (categories, intact) = decode_categories(level, value);
        if !intact {
            damaged.insert(level.clone());
        }
        rubric.insert_level(level.clone(), categories);
    }

    let damage = if damaged.is_empty() {
        RubricDamage::None
    } else {
        RubricDamage::Brackets(damaged)
    };
    (rubric, damage)
}

/// Categories of one bracket, and whether every entry decoded
fn decode_categories(level: &str, value: &Value) -> (Vec<Category>, bool) {
    let Some(entries) = collection_entries(value) else {
        warn!("Ignoring malformed rubric for {}: {}", level, value);
        return (Vec::new(), false);
    };

    let mut intact = true;
    let mut categories = Vec::with_capacity(entries.len());
    for entry in entries {
        let header = match serde_json::from_value::<CategoryHeader>(entry.clone()) {
            Ok(header) => header,
            Err(e) => {
                warn!("Skipping malformed category in {}: {}", level, e);
                intact = false;
                continue;
            }
        };

        let mut criteria = Vec::new();
        match collection_entries(&header.criteria) {
            Some(items) => {
                for item in items {
                    match serde_json::from_value::<Criterion>(item.clone()) {
                        Ok(criterion) => criteria.push(criterion),
                        Err(e) => {
                            warn!("Skipping malformed criterion in {}: {}", level, e);
                            intact = false;
                        }
                    }
                }
            }
            None => {
                warn!("Ignoring malformed criteria of {} category {}", level, header.id);
                intact = false;
            }
        }

        categories.push(Category {
            id: header.id,
            name: header.name,
            criteria,
        });
    }
    (categories, intact)
}
