use log::{debug, warn};
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;

use crate::store::{StoreError, SyncStore, Write};

/// Retry behaviour for individual store writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries per write, first one included
    pub attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Single try, no backoff
    pub fn none() -> Self {
        Self {
            attempts: 1,
            ..Self::default()
        }
    }

    fn strategy(&self) -> impl Iterator<Item = Duration> {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX).max(1);
        ExponentialBackoff::from_millis(base_ms)
            .max_delay(self.max_delay)
            .take(self.attempts.saturating_sub(1))
    }
}

/// Outcome of issuing a plan's writes.
///
/// Writes are independent, so a command can land partially: `applied` went
/// through, `failed` did not even after retrying. Nothing is rolled back.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub applied: Vec<Write>,
    pub failed: Vec<(Write, StoreError)>,
}

impl DispatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Issue every write in order, retrying each one on its own.
///
/// A failing write never stops the remaining ones.
pub async fn dispatch<S>(store: &S, writes: Vec<Write>, policy: &RetryPolicy) -> DispatchReport
where
    S: SyncStore + ?Sized,
{
    let mut report = DispatchReport::default();

    for write in writes {
        let outcome = {
            let write = &write;
            Retry::spawn(policy.strategy(), move || async move {
                let result = match write {
                    Write::Set { path, value } => store.write(path, value.clone()).await,
                    Write::Delete { path } => store.delete(path).await,
                };
                if let Err(e) = &result {
                    debug!("Write {} failed, may retry: {}", write, e);
                }
                result
            })
            .await
        };

        match outcome {
            Ok(()) => report.applied.push(write),
            Err(e) => {
                warn!("Giving up on {}: {}", write, e);
                report.failed.push((write, e));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, Root, StorePath};
    use serde_json::json;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.strategy().count(), 2);
        assert_eq!(RetryPolicy::none().strategy().count(), 0);
    }

    #[test]
    fn test_strategy_respects_max_delay() {
        let policy = RetryPolicy {
            attempts: 6,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
        };
        assert!(policy.strategy().all(|d| d <= Duration::from_millis(250)));
    }

    #[tokio::test]
    async fn test_dispatch_applies_writes_in_order() {
        let store = DocumentStore::in_memory();
        let writes = vec![
            Write::set(
                StorePath::Judge("juri-1".into()),
                json!({ "id": "juri-1", "name": "Juri 1" }),
            ),
            Write::delete(StorePath::Judge("juri-1".into())),
            Write::set(
                StorePath::Judge("juri-2".into()),
                json!({ "id": "juri-2", "name": "Juri 2" }),
            ),
        ];

        let report = dispatch(&store, writes, &RetryPolicy::none()).await;

        assert!(report.is_complete());
        assert_eq!(report.applied.len(), 3);
        let document = store.document().unwrap();
        assert_eq!(
            document[Root::Judges.key()],
            json!({ "juri-2": { "id": "juri-2", "name": "Juri 2" } })
        );
    }

    #[tokio::test]
    async fn test_empty_plan_dispatches_nothing() {
        let store = DocumentStore::in_memory();
        let report = dispatch(&store, Vec::new(), &RetryPolicy::default()).await;
        assert!(report.is_complete());
        assert!(report.applied.is_empty());
    }
}
