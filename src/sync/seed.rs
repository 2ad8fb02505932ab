//! Default event document written into a fresh store.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{
    Category, Criterion, Judge, LevelStyle, Participant, PerformanceLevel, Rubric, ScoreTable,
};
use crate::store::Root;

pub const DEFAULT_BRACKETS: [&str; 3] = ["SD", "SMP", "SLTA"];

const DRILL_CRITERIA: [(u32, &str); 17] = [
    (1, "Sikap Sempurna"),
    (2, "Hormat"),
    (3, "Istirahat Ditempat"),
    (4, "Periksa Kerapihan"),
    (5, "Hitung"),
    (6, "Setengah Lengan Lencang Kanan"),
    (7, "Lencang Kanan"),
    (8, "Hadap Kanan"),
    (9, "Hadap Kiri"),
    (10, "Balik Kanan"),
    (11, "Jalan Ditempat"),
    (12, "Balik Kanan"),
    (18, "4 langkah ke kanan"),
    (19, "4 langkah ke kiri"),
    (20, "3 langkah ke belakang"),
    (21, "2 langkah ke depan"),
    (22, "Bubar"),
];

/// Id distance between brackets' copies of the drill criteria
const BRACKET_ID_SPAN: u32 = 22;

pub fn performance_levels() -> Vec<PerformanceLevel> {
    [
        ("level-1", "CUKUP", "bg-red-500"),
        ("level-2", "BAIK", "bg-orange-500"),
        ("level-3", "BAIK SEKALI", "bg-green-600"),
    ]
    .into_iter()
    .map(|(id, name, color)| PerformanceLevel {
        id: id.to_string(),
        name: name.to_string(),
        style: LevelStyle {
            color: color.to_string(),
            text_color: "text-white".to_string(),
        },
    })
    .collect()
}

fn default_scores() -> ScoreTable {
    let mut scores = ScoreTable::new();
    scores.insert("level-1".to_string(), vec![40, 45, 50]);
    scores.insert("level-2".to_string(), vec![60, 65, 70]);
    scores.insert("level-3".to_string(), vec![75, 80, 85]);
    scores
}

/// One category per bracket, each with its own copy of the drill criteria.
/// Every bracket gets a disjoint id range: SD keeps 1..=22, SMP 23..=44 and
/// SLTA 45..=66.
pub fn rubric() -> Rubric {
    let mut rubric = Rubric::new();
    for (index, bracket) in (0u32..).zip(DEFAULT_BRACKETS) {
        let offset = index * BRACKET_ID_SPAN;
        let criteria = DRILL_CRITERIA
            .iter()
            .map(|(id, name)| Criterion {
                id: offset + id,
                name: name.to_string(),
                scores: default_scores(),
            })
            .collect();
        rubric.insert_level(
            bracket,
            vec![Category {
                id: 1,
                name: format!("Kriteria Penilaian PBB - {}", bracket),
                criteria,
            }],
        );
    }
    rubric
}

pub fn judges() -> Vec<Judge> {
    (1..=3)
        .map(|n| Judge::new(format!("juri-{}", n), format!("Juri {}", n)))
        .collect()
}

/// Two demo teams; Tim A already has a few scores from the first judge
pub fn participants() -> Vec<Participant> {
    let rubric = rubric();
    let mut tim_a = Participant::new("tim-a", "Tim A", "SMP");
    for (n, criterion) in rubric.criteria_for("SMP").into_iter().take(4).enumerate() {
        let score = if n == 0 { 40 } else { 45 };
        tim_a.scores.set("juri-1", criterion.id, score);
    }
    let tim_b = Participant::new("tim-b", "Tim B", "SD");
    vec![tim_a, tim_b]
}

/// Default subtree for one top-level root
pub fn seed(root: Root) -> Result<Value> {
    let value = match root {
        Root::Participants => keyed(participants(), |p| p.id.clone())?,
        Root::Judges => keyed(judges(), |j| j.id.clone())?,
        Root::PerformanceLevels => keyed(performance_levels(), |l| l.id.clone())?,
        Root::CategoriesByLevel => serde_json::to_value(rubric())?,
    };
    Ok(value)
}

fn keyed<T, F>(records: Vec<T>, id: F) -> Result<Value>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    let mut map = Map::new();
    for record in records {
        let key = id(&record);
        let value = serde_json::to_value(&record)
            .with_context(|| format!("Failed to encode seed record {}", key))?;
        map.insert(key, value);
    }
    Ok(Value::Object(map))
}
