use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::model::Participant;

/// Population selected for a leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelFilter {
    All,
    Level(String),
}

impl LevelFilter {
    pub fn matches(&self, participant: &Participant) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Level(level) => participant.level == *level,
        }
    }
}

impl FromStr for LevelFilter {
    type Err = Infallible;

    /// "all" (any case) selects everyone, anything else is a bracket name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(LevelFilter::All)
        } else {
            Ok(LevelFilter::Level(s.to_string()))
        }
    }
}

impl fmt::Display for LevelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelFilter::All => write!(f, "all"),
            LevelFilter::Level(level) => write!(f, "{}", level),
        }
    }
}

/// Participants of the selected population, in their original order
pub fn filter_by_level(participants: &[Participant], filter: &LevelFilter) -> Vec<Participant> {
    participants
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}
