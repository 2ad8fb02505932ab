use crate::model::{
    CategoryId, Criterion, CriterionDraft, CriterionId, JudgeId, ParticipantId, PerformanceLevel,
    PerformanceLevelDraft, PerformanceLevelId, Score,
};

/// Mutation requested by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddParticipant {
        name: String,
        level: String,
    },
    UpdateParticipant {
        id: ParticipantId,
        name: String,
        level: String,
    },
    DeleteParticipant {
        id: ParticipantId,
    },
    AddJudge {
        name: String,
    },
    UpdateJudge {
        id: JudgeId,
        name: String,
    },
    DeleteJudge {
        id: JudgeId,
    },
    /// Record `score`, or retract it when the judge already recorded exactly it
    ToggleScore {
        participant: ParticipantId,
        judge: JudgeId,
        criterion: CriterionId,
        score: Score,
    },
    AddCriterion {
        level: String,
        category: CategoryId,
        draft: CriterionDraft,
    },
    UpdateCriterion {
        level: String,
        category: CategoryId,
        criterion: Criterion,
    },
    DeleteCriterion {
        level: String,
        category: CategoryId,
        criterion: CriterionId,
    },
    AddPerformanceLevel {
        draft: PerformanceLevelDraft,
    },
    UpdatePerformanceLevel {
        level: PerformanceLevel,
    },
    DeletePerformanceLevel {
        id: PerformanceLevelId,
    },
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddParticipant { .. } => "add-participant",
            Command::UpdateParticipant { .. } => "update-participant",
            Command::DeleteParticipant { .. } => "delete-participant",
            Command::AddJudge { .. } => "add-judge",
            Command::UpdateJudge { .. } => "update-judge",
            Command::DeleteJudge { .. } => "delete-judge",
            Command::ToggleScore { .. } => "toggle-score",
            Command::AddCriterion { .. } => "add-criterion",
            Command::UpdateCriterion { .. } => "update-criterion",
            Command::DeleteCriterion { .. } => "delete-criterion",
            Command::AddPerformanceLevel { .. } => "add-performance-level",
            Command::UpdatePerformanceLevel { .. } => "update-performance-level",
            Command::DeletePerformanceLevel { .. } => "delete-performance-level",
        }
    }
}

/// What a toggle resolves to against the current score cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreAction {
    Set { value: Score },
    Clear,
}

impl ScoreAction {
    pub fn decide(current: Option<Score>, value: Score) -> Self {
        if current == Some(value) {
            ScoreAction::Clear
        } else {
            ScoreAction::Set { value }
        }
    }
}

/// Identity assigned by an add command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    Participant(ParticipantId),
    Judge(JudgeId),
    Criterion(CriterionId),
    PerformanceLevel(PerformanceLevelId),
}
