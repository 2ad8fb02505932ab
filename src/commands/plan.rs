//! Reconciliation rules: turn a command into the full set of store writes.
//!
//! Planning is pure. It reads the local snapshot, never mutates it, and
//! returns every write the command needs, cascades included. The writes are
//! independent; see `dispatch` for what happens when some of them fail.

use anyhow::{bail, Context, Result};
use log::debug;
use serde::Serialize;
use serde_json::Value;

use super::command::{Command, Created, ScoreAction};
use crate::model::{
    Category, CategoryId, Criterion, CriterionDraft, EventState, Judge, Participant,
    PerformanceLevel,
};
use crate::store::{Root, StorePath, Write};

/// Writes of one command, in issue order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub writes: Vec<Write>,
    pub created: Option<Created>,
}

impl Plan {
    fn noop(reason: &str) -> Self {
        debug!("Command is a no-op: {}", reason);
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Plan `command` against `state`.
///
/// `new_id` is only called by commands that create a participant, judge or
/// performance level. Blank names, blank brackets and references to records
/// that no longer exist produce an empty plan.
pub fn plan<F>(state: &EventState, command: &Command, new_id: F) -> Result<Plan>
where
    F: FnOnce() -> String,
{
    match command {
        Command::AddParticipant { name, level } => {
            let (Some(name), Some(level)) = (clean(name), clean(level)) else {
                return Ok(Plan::noop("participant needs a name and a bracket"));
            };
            let participant = Participant::new(new_id(), name, level);
            Ok(Plan {
                writes: vec![Write::set(
                    StorePath::Participant(participant.id.clone()),
                    to_value(&participant)?,
                )],
                created: Some(Created::Participant(participant.id)),
            })
        }

        Command::UpdateParticipant { id, name, level } => {
            let (Some(name), Some(level)) = (clean(name), clean(level)) else {
                return Ok(Plan::noop("participant needs a name and a bracket"));
            };
            let Some(existing) = state.participant(id) else {
                return Ok(Plan::noop("participant no longer exists"));
            };
            let record = Participant {
                name,
                level,
                ..existing.clone()
            };
            Ok(single(Write::set(StorePath::Participant(id.clone()), to_value(&record)?)))
        }

        Command::DeleteParticipant { id } => {
            if state.participant(id).is_none() {
                return Ok(Plan::noop("participant no longer exists"));
            }
            Ok(single(Write::delete(StorePath::Participant(id.clone()))))
        }

        Command::AddJudge { name } => {
            let Some(name) = clean(name) else {
                return Ok(Plan::noop("judge needs a name"));
            };
            let judge = Judge::new(new_id(), name);
            Ok(Plan {
                writes: vec![Write::set(StorePath::Judge(judge.id.clone()), to_value(&judge)?)],
                created: Some(Created::Judge(judge.id)),
            })
        }

        Command::UpdateJudge { id, name } => {
            let Some(name) = clean(name) else {
                return Ok(Plan::noop("judge needs a name"));
            };
            if state.judge(id).is_none() {
                return Ok(Plan::noop("judge no longer exists"));
            }
            let record = Judge::new(id.clone(), name);
            Ok(single(Write::set(StorePath::Judge(id.clone()), to_value(&record)?)))
        }

        Command::DeleteJudge { id } => {
            let mut writes = Vec::new();
            if state.judge(id).is_some() {
                writes.push(Write::delete(StorePath::Judge(id.clone())));
            }
            // Also sweeps scores left behind by an earlier, partially applied delete
            writes.extend(
                state
                    .participants
                    .iter()
                    .filter(|p| p.scores.has_judge(id))
                    .map(|p| {
                        Write::delete(StorePath::JudgeScores {
                            participant: p.id.clone(),
                            judge: id.clone(),
                        })
                    }),
            );
            if writes.is_empty() {
                return Ok(Plan::noop("judge and its scores are already gone"));
            }
            Ok(Plan {
                writes,
                created: None,
            })
        }

        Command::ToggleScore {
            participant,
            judge,
            criterion,
            score,
        } => {
            let Some(current) = state.participant(participant) else {
                return Ok(Plan::noop("participant no longer exists"));
            };
            let path = StorePath::Score {
                participant: participant.clone(),
                judge: judge.clone(),
                criterion: *criterion,
            };
            let write = match ScoreAction::decide(current.scores.get(judge, *criterion), *score) {
                ScoreAction::Set { value } => Write::set(path, Value::from(value)),
                ScoreAction::Clear => Write::delete(path),
            };
            Ok(single(write))
        }

        Command::AddCriterion {
            level,
            category,
            draft,
        } => {
            let Some(name) = clean(&draft.name) else {
                return Ok(Plan::noop("criterion needs a name"));
            };
            if state.rubric.category(level, *category).is_none() {
                return Ok(Plan::noop("bracket or category does not exist"));
            }
            ensure_bracket_intact(state, level)?;
            let id = state.rubric.next_criterion_id();
            let criterion = CriterionDraft {
                name,
                scores: draft.scores.clone(),
            }
            .into_criterion(id)
            .normalized(&state.performance_levels);

            let categories = edit_category(state, level, *category, |c| c.criteria.push(criterion));
            Ok(Plan {
                writes: vec![categories_write(level, &categories)?],
                created: Some(Created::Criterion(id)),
            })
        }

        Command::UpdateCriterion {
            level,
            category,
            criterion,
        } => {
            let Some(name) = clean(&criterion.name) else {
                return Ok(Plan::noop("criterion needs a name"));
            };
            let exists = state
                .rubric
                .category(level, *category)
                .is_some_and(|c| c.criteria.iter().any(|existing| existing.id == criterion.id));
            if !exists {
                return Ok(Plan::noop("criterion no longer exists"));
            }
            ensure_bracket_intact(state, level)?;
            let record = Criterion {
                name,
                ..criterion.clone()
            }
            .normalized(&state.performance_levels);

            let categories = edit_category(state, level, *category, |c| {
                for existing in c.criteria.iter_mut().filter(|e| e.id == record.id) {
                    *existing = record.clone();
                }
            });
            Ok(single(categories_write(level, &categories)?))
        }

        Command::DeleteCriterion {
            level,
            category,
            criterion,
        } => {
            let exists = state
                .rubric
                .category(level, *category)
                .is_some_and(|c| c.criteria.iter().any(|existing| existing.id == *criterion));
            if !exists {
                return Ok(Plan::noop("criterion no longer exists"));
            }
            ensure_bracket_intact(state, level)?;
            let categories = edit_category(state, level, *category, |c| {
                c.criteria.retain(|existing| existing.id != *criterion)
            });

            let mut writes = vec![categories_write(level, &categories)?];
            for participant in state.participants_in(level) {
                for judge in participant.scores.judges_scoring(*criterion) {
                    writes.push(Write::delete(StorePath::Score {
                        participant: participant.id.clone(),
                        judge: judge.clone(),
                        criterion: *criterion,
                    }));
                }
            }
            Ok(Plan {
                writes,
                created: None,
            })
        }

        Command::AddPerformanceLevel { draft } => {
            let Some(name) = clean(&draft.name) else {
                return Ok(Plan::noop("performance level needs a name"));
            };
            ensure_rubric_intact(state)?;
            let level = PerformanceLevel {
                id: new_id(),
                name,
                style: draft.style.clone(),
            };
            let rubric = state.rubric.with_performance_level(&level.id);
            Ok(Plan {
                writes: vec![
                    Write::set(StorePath::PerformanceLevel(level.id.clone()), to_value(&level)?),
                    Write::set(StorePath::Root(Root::CategoriesByLevel), to_value(&rubric)?),
                ],
                created: Some(Created::PerformanceLevel(level.id)),
            })
        }

        Command::UpdatePerformanceLevel { level } => {
            let Some(name) = clean(&level.name) else {
                return Ok(Plan::noop("performance level needs a name"));
            };
            if state.performance_level(&level.id).is_none() {
                return Ok(Plan::noop("performance level no longer exists"));
            }
            let record = PerformanceLevel {
                name,
                ..level.clone()
            };
            Ok(single(Write::set(
                StorePath::PerformanceLevel(level.id.clone()),
                to_value(&record)?,
            )))
        }

        Command::DeletePerformanceLevel { id } => {
            let mut writes = Vec::new();
            if state.performance_level(id).is_some() {
                writes.push(Write::delete(StorePath::PerformanceLevel(id.clone())));
            }
            let referenced = state
                .rubric
                .all_criteria()
                .any(|c| c.scores.contains_key(id));
            if referenced {
                ensure_rubric_intact(state)?;
                let rubric = state.rubric.without_performance_level(id);
                writes.push(Write::set(
                    StorePath::Root(Root::CategoriesByLevel),
                    to_value(&rubric)?,
                ));
            }
            if writes.is_empty() {
                return Ok(Plan::noop("performance level is already gone"));
            }
            Ok(Plan {
                writes,
                created: None,
            })
        }
    }
}

/// Rewriting a bracket whose snapshot had undecodable entries would erase them
fn ensure_bracket_intact(state: &EventState, level: &str) -> Result<()> {
    if state.rubric_damage.covers(level) {
        bail!(
            "The {} rubric has entries that could not be read; fix them in the store first",
            level
        );
    }
    Ok(())
}

fn ensure_rubric_intact(state: &EventState) -> Result<()> {
    if !state.rubric_damage.is_intact() {
        bail!("The rubric has entries that could not be read; fix them in the store first");
    }
    Ok(())
}

fn clean(input: &str) -> Option<String> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn single(write: Write) -> Plan {
    Plan {
        writes: vec![write],
        created: None,
    }
}

fn to_value<T: Serialize>(record: &T) -> Result<Value> {
    serde_json::to_value(record).context("Failed to encode record")
}

/// The bracket's category list with one category edited
fn edit_category<F>(state: &EventState, level: &str, category: CategoryId, edit: F) -> Vec<Category>
where
    F: FnOnce(&mut Category),
{
    let mut categories = state.rubric.categories(level).to_vec();
    if let Some(target) = categories.iter_mut().find(|c| c.id == category) {
        edit(target);
    }
    categories
}

fn categories_write(level: &str, categories: &[Category]) -> Result<Write> {
    Ok(Write::set(
        StorePath::CategoriesForLevel(level.to_string()),
        to_value(&categories)?,
    ))
}
