use std::fmt;

use crate::model::{CriterionId, JudgeId, ParticipantId, PerformanceLevelId};

/// Top-level collections of the event document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Root {
    Participants,
    Judges,
    CategoriesByLevel,
    PerformanceLevels,
}

impl Root {
    pub const ALL: [Root; 4] = [
        Root::Participants,
        Root::Judges,
        Root::CategoriesByLevel,
        Root::PerformanceLevels,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Root::Participants => "participants",
            Root::Judges => "judges",
            Root::CategoriesByLevel => "categoriesByLevel",
            Root::PerformanceLevels => "performanceLevels",
        }
    }
}

/// Typed key path into the event document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorePath {
    Root(Root),
    Participant(ParticipantId),
    JudgeScores {
        participant: ParticipantId,
        judge: JudgeId,
    },
    Score {
        participant: ParticipantId,
        judge: JudgeId,
        criterion: CriterionId,
    },
    Judge(JudgeId),
    CategoriesForLevel(String),
    PerformanceLevel(PerformanceLevelId),
}

impl StorePath {
    pub fn root(&self) -> Root {
        match self {
            StorePath::Root(root) => *root,
            StorePath::Participant(_) | StorePath::JudgeScores { .. } | StorePath::Score { .. } => {
                Root::Participants
            }
            StorePath::Judge(_) => Root::Judges,
            StorePath::CategoriesForLevel(_) => Root::CategoriesByLevel,
            StorePath::PerformanceLevel(_) => Root::PerformanceLevels,
        }
    }

    pub fn segments(&self) -> Vec<String> {
        let root = self.root().key().to_string();
        match self {
            StorePath::Root(_) => vec![root],
            StorePath::Participant(id)
            | StorePath::Judge(id)
            | StorePath::CategoriesForLevel(id)
            | StorePath::PerformanceLevel(id) => vec![root, id.clone()],
            StorePath::JudgeScores { participant, judge } => vec![
                root,
                participant.clone(),
                "scores".to_string(),
                judge.clone(),
            ],
            StorePath::Score {
                participant,
                judge,
                criterion,
            } => vec![
                root,
                participant.clone(),
                "scores".to_string(),
                judge.clone(),
                criterion.to_string(),
            ],
        }
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}
