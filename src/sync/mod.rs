//! Client-side view of the shared event: a live local copy of the store plus
//! the command and ranking entry points the presentation layer uses.

pub mod seed;

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard};
use tokio::sync::watch;
use uuid::Uuid;

use crate::commands::{dispatch, plan, Command, Created, DispatchReport, RetryPolicy};
use crate::model::EventState;
use crate::scoring::{leaderboard, LevelFilter, RankedParticipant};
use crate::store::{Root, Snapshot, StorePath, SyncStore, Write};

/// Result of executing one command
#[derive(Debug)]
pub struct Outcome {
    pub created: Option<Created>,
    pub report: DispatchReport,
}

/// Shared scoreboard over a [`SyncStore`].
///
/// The local state is only replaced by store snapshots. Commands are planned
/// against it and written to the store; their effect shows up locally once
/// the store echoes the change back (through [`Scoreboard::sync`] or
/// [`Scoreboard::refresh`]).
pub struct Scoreboard<S: SyncStore + ?Sized> {
    store: Arc<S>,
    state: Arc<RwLock<EventState>>,
    observed: Arc<Mutex<HashSet<Root>>>,
    version: Arc<watch::Sender<u64>>,
    retry: RetryPolicy,
}

impl<S: SyncStore + ?Sized> Clone for Scoreboard<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
            observed: Arc::clone(&self.observed),
            version: Arc::clone(&self.version),
            retry: self.retry,
        }
    }
}

impl<S: SyncStore + ?Sized> Scoreboard<S> {
    pub fn new(store: Arc<S>, retry: RetryPolicy) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            store,
            state: Arc::new(RwLock::new(EventState::new())),
            observed: Arc::new(Mutex::new(HashSet::new())),
            version: Arc::new(version),
            retry,
        }
    }

    /// Copy of the current local state
    pub fn snapshot(&self) -> EventState {
        self.read().clone()
    }

    /// Counter bumped after every applied snapshot
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Read every root once and apply it, seeding roots that have never been
    /// seen and are absent from the store.
    pub async fn refresh(&self) -> Result<()> {
        for root in Root::ALL {
            let path = StorePath::Root(root);
            let mut snapshot = self.store.subscribe(&path).next().await.flatten();

            if snapshot.is_none() && self.first_observation(root) {
                self.seed_root(root).await?;
                snapshot = self.store.subscribe(&path).next().await.flatten();
            } else {
                self.first_observation(root);
            }
            self.apply(root, snapshot);
        }
        Ok(())
    }

    /// Follow all four roots until every subscription ends.
    ///
    /// The first snapshot of a root seeds it when absent; later absent
    /// snapshots just empty that part of the local state.
    pub async fn sync(&self) {
        let streams = Root::ALL.into_iter().map(|root| {
            self.store
                .subscribe(&StorePath::Root(root))
                .map(move |snapshot| (root, snapshot))
        });
        let mut merged = stream::select_all(streams);

        while let Some((root, snapshot)) = merged.next().await {
            if snapshot.is_none() && self.first_observation(root) {
                if let Err(e) = self.seed_root(root).await {
                    warn!("{:#}", e);
                }
                continue;
            }
            self.first_observation(root);
            self.apply(root, snapshot);
        }
        debug!("All subscriptions closed");
    }

    /// Plan `command` against the local state and write it to the store
    pub async fn execute(&self, command: Command) -> Result<Outcome> {
        let planned = {
            let state = self.read();
            plan(&state, &command, || Uuid::new_v4().to_string())?
        };
        if planned.is_noop() {
            debug!("{} produced no writes", command.name());
            return Ok(Outcome {
                created: None,
                report: DispatchReport::default(),
            });
        }

        for write in &planned.writes {
            debug!("{}: {}", command.name(), write);
        }
        let report = dispatch(self.store.as_ref(), planned.writes, &self.retry).await;
        if report.is_complete() {
            info!("{} applied {} write(s)", command.name(), report.applied.len());
        } else {
            warn!(
                "{} left {} of {} write(s) unapplied",
                command.name(),
                report.failed.len(),
                report.failed.len() + report.applied.len()
            );
        }
        Ok(Outcome {
            created: planned.created,
            report,
        })
    }

    /// Leaderboard of the local state
    pub fn rank(&self, filter: &LevelFilter) -> Vec<RankedParticipant> {
        leaderboard(&self.read(), filter)
    }

    fn read(&self) -> RwLockReadGuard<'_, EventState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(&self, root: Root, snapshot: Snapshot) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.apply_snapshot(root, snapshot.as_ref());
        }
        self.version.send_modify(|version| *version += 1);
    }

    /// True exactly once per root
    fn first_observation(&self, root: Root) -> bool {
        self.observed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(root)
    }

    async fn seed_root(&self, root: Root) -> Result<()> {
        info!("Seeding {} with default data", root.key());
        let write = Write::set(StorePath::Root(root), seed::seed(root)?);
        let report = dispatch(self.store.as_ref(), vec![write], &self.retry).await;
        match report.failed.into_iter().next() {
            None => Ok(()),
            Some((write, e)) => Err(anyhow!("Failed to seed {}: {}", write.path(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use serde_json::json;

    fn board(store: DocumentStore) -> Scoreboard<DocumentStore> {
        Scoreboard::new(Arc::new(store), RetryPolicy::none())
    }

    #[tokio::test]
    async fn test_refresh_seeds_empty_store() {
        let board = board(DocumentStore::in_memory());
        board.refresh().await.unwrap();

        let state = board.snapshot();
        assert_eq!(state.judges.len(), 3);
        assert_eq!(state.participants.len(), 2);
        assert_eq!(state.performance_levels.len(), 3);
        assert_eq!(state.rubric.criteria_for("SD").len(), 17);
    }

    #[tokio::test]
    async fn test_refresh_keeps_existing_roots() {
        let store = DocumentStore::with_document(json!({
            "judges": { "j": { "id": "j", "name": "Solo" } }
        }));
        let board = board(store);
        board.refresh().await.unwrap();

        let state = board.snapshot();
        assert_eq!(state.judges.len(), 1);
        assert_eq!(state.participants.len(), 2);
    }

    #[tokio::test]
    async fn test_execute_then_refresh_reflects_store() {
        let board = board(DocumentStore::in_memory());
        board.refresh().await.unwrap();

        let outcome = board
            .execute(Command::AddJudge {
                name: " Juri 4 ".to_string(),
            })
            .await
            .unwrap();
        assert!(outcome.report.is_complete());
        let Some(Created::Judge(id)) = outcome.created else {
            panic!("expected a judge id");
        };

        // Not visible until the store echoes it back
        assert!(board.snapshot().judge(&id).is_none());
        board.refresh().await.unwrap();
        assert_eq!(board.snapshot().judge(&id).unwrap().name, "Juri 4");
    }

    #[tokio::test]
    async fn test_noop_command_writes_nothing() {
        let board = board(DocumentStore::in_memory());
        board.refresh().await.unwrap();

        let outcome = board
            .execute(Command::DeleteParticipant {
                id: "missing".to_string(),
            })
            .await
            .unwrap();
        assert!(outcome.created.is_none());
        assert!(outcome.report.applied.is_empty());
    }

    #[tokio::test]
    async fn test_rank_uses_local_state() {
        let board = board(DocumentStore::in_memory());
        board.refresh().await.unwrap();

        let ranked = board.rank(&LevelFilter::All);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].participant.id, "tim-a");
        assert_eq!(ranked[0].total, 175);
        assert_eq!(ranked[1].rank, 2);
    }
}
