pub mod matrix;
pub mod rubric;
pub mod state;
pub mod types;

pub use matrix::{CriterionId, JudgeId, Score, ScoreMatrix};
pub use rubric::{parse_score_list, Rubric};
pub use state::{EventState, RubricDamage};
pub use types::{
    Category, CategoryId, Criterion, CriterionDraft, Judge, LevelStyle, Participant,
    ParticipantId, PerformanceLevel, PerformanceLevelDraft, PerformanceLevelId, ScoreTable,
};
