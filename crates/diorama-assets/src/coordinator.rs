//! Batch load coordination
//!
//! A batch is N independently loading assets of one class. Loads run
//! concurrently and finish in any order; the batch settles exactly once,
//! either when every slot is filled or at the first failure.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, trace, warn};

use crate::descriptor::AssetDescriptor;
use crate::error::{AssetError, AssetLoadError};

/// How a batch settled.
#[derive(Debug)]
pub enum BatchOutcome<T> {
    /// Every asset loaded; results are in descriptor order
    Complete(Vec<T>),
    /// An asset failed. `loaded` holds the siblings that had already
    /// finished, in descriptor order.
    Failed { error: AssetLoadError, loaded: Vec<T> },
}

impl<T> BatchOutcome<T> {
    pub fn into_result(self) -> Result<Vec<T>, AssetLoadError> {
        match self {
            BatchOutcome::Complete(assets) => Ok(assets),
            BatchOutcome::Failed { error, .. } => Err(error),
        }
    }
}

/// Completion tracking for one batch.
///
/// Results are recorded by slot index. The outcome is handed out exactly
/// once; anything recorded after that is ignored.
#[derive(Debug)]
pub struct LoadBatch<T> {
    identifiers: Vec<String>,
    slots: Vec<Option<T>>,
    completed: usize,
    failure: Option<String>,
    settled: bool,
}

impl<T> LoadBatch<T> {
    pub fn new(identifiers: Vec<String>) -> Self {
        let slots = identifiers.iter().map(|_| None).collect();
        Self {
            identifiers,
            slots,
            completed: 0,
            failure: None,
            settled: false,
        }
    }

    pub fn total(&self) -> usize {
        self.identifiers.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Identifier of the asset that failed the batch, if any
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Record the result for slot `index`. Returns the outcome when this
    /// result settles the batch, and `None` otherwise.
    pub fn record(&mut self, index: usize, result: Result<T, AssetError>) -> Option<BatchOutcome<T>> {
        if self.settled {
            trace!("Ignoring late result for slot {} of a settled batch", index);
            return None;
        }

        match result {
            Ok(asset) => {
                let Some(slot) = self.slots.get_mut(index) else {
                    warn!("Load result for unknown slot {} ignored", index);
                    return None;
                };
                if slot.replace(asset).is_none() {
                    self.completed += 1;
                }
                if self.completed < self.total() {
                    return None;
                }
                self.settled = true;
                Some(BatchOutcome::Complete(self.take_loaded()))
            }
            Err(cause) => {
                let identifier = self
                    .identifiers
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("#{index}"));
                self.settled = true;
                self.failure = Some(identifier.clone());
                Some(BatchOutcome::Failed {
                    error: AssetLoadError { identifier, cause },
                    loaded: self.take_loaded(),
                })
            }
        }
    }

    fn take_loaded(&mut self) -> Vec<T> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}

/// Load every descriptor concurrently with `load_one` and report how the
/// batch settled. Loads still in flight when the batch fails are dropped.
pub async fn load_batch<'a, T, F, Fut>(descriptors: &'a [AssetDescriptor], mut load_one: F) -> BatchOutcome<T>
where
    F: FnMut(&'a AssetDescriptor) -> Fut,
    Fut: Future<Output = Result<T, AssetError>>,
{
    let mut batch = LoadBatch::new(descriptors.iter().map(|d| d.identifier.clone()).collect());

    let mut pending: FuturesUnordered<_> = descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| {
            let load = load_one(descriptor);
            async move { (index, load.await) }
        })
        .collect();

    while let Some((index, result)) = pending.next().await {
        if let Some(outcome) = batch.record(index, result) {
            if !pending.is_empty() {
                debug!("Dropping {} in-flight loads of a settled batch", pending.len());
            }
            return outcome;
        }
    }

    // Only an empty batch gets here.
    BatchOutcome::Complete(Vec::new())
}

/// Load every descriptor and return the assets in descriptor order, or the
/// first failure.
pub async fn await_all<'a, T, F, Fut>(descriptors: &'a [AssetDescriptor], load_one: F) -> Result<Vec<T>, AssetLoadError>
where
    F: FnMut(&'a AssetDescriptor) -> Fut,
    Fut: Future<Output = Result<T, AssetError>>,
{
    load_batch(descriptors, load_one).await.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use tokio::sync::oneshot;

    fn descriptors(ids: &[&str]) -> Vec<AssetDescriptor> {
        ids.iter()
            .map(|id| AssetDescriptor::new(*id, format!("{id}.glb")))
            .collect()
    }

    fn missing(id: &str) -> AssetError {
        AssetError::NotFound(PathBuf::from(format!("{id}.glb")))
    }

    #[test]
    fn batch_settles_once_on_success() {
        let mut batch = LoadBatch::new(vec!["a".into(), "b".into()]);
        assert!(batch.record(1, Ok("B")).is_none());
        assert_eq!(batch.completed(), 1);
        match batch.record(0, Ok("A")) {
            Some(BatchOutcome::Complete(assets)) => assert_eq!(assets, vec!["A", "B"]),
            other => panic!("expected completion, got {:?}", other),
        }
        assert!(batch.is_settled());
        assert!(batch.record(0, Ok("again")).is_none());
    }

    #[test]
    fn batch_settles_once_on_first_failure() {
        let mut batch = LoadBatch::new(vec!["a".into(), "b".into(), "c".into()]);
        assert!(batch.record(0, Ok(1)).is_none());
        match batch.record(1, Err(missing("b"))) {
            Some(BatchOutcome::Failed { error, loaded }) => {
                assert_eq!(error.identifier, "b");
                assert_eq!(loaded, vec![1]);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(batch.failure(), Some("b"));
        assert!(batch.record(2, Err(missing("c"))).is_none());
        assert!(batch.record(2, Ok(3)).is_none());
    }

    #[test]
    fn duplicate_slot_result_is_not_double_counted() {
        let mut batch = LoadBatch::new(vec!["a".into(), "b".into()]);
        assert!(batch.record(0, Ok(1)).is_none());
        assert!(batch.record(0, Ok(1)).is_none());
        assert_eq!(batch.completed(), 1);
    }

    #[tokio::test]
    async fn empty_batch_completes_immediately() {
        let calls = Cell::new(0);
        let result: Result<Vec<()>, _> = await_all(&[], |_| {
            calls.set(calls.get() + 1);
            async { Ok(()) }
        })
        .await;
        assert!(result.unwrap().is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn results_keep_input_order_despite_completion_order() {
        let descs = descriptors(&["Ground", "Skybox", "Fox", "IceTruck"]);
        let mut senders = HashMap::new();
        let mut receivers = HashMap::new();
        for d in &descs {
            let (tx, rx) = oneshot::channel::<()>();
            senders.insert(d.identifier.clone(), tx);
            receivers.insert(d.identifier.clone(), rx);
        }

        // Release the loads in reverse order from a separate task.
        let release = tokio::spawn(async move {
            for id in ["IceTruck", "Fox", "Skybox", "Ground"] {
                tokio::time::sleep(Duration::from_millis(2)).await;
                if let Some(tx) = senders.remove(id) {
                    let _ = tx.send(());
                }
            }
        });

        let completion_order = std::cell::RefCell::new(Vec::new());
        let result = await_all(&descs, |d| {
            let gate = receivers.remove(&d.identifier);
            let order = &completion_order;
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                order.borrow_mut().push(d.identifier.clone());
                Ok::<_, AssetError>(d.identifier.to_lowercase())
            }
        })
        .await
        .unwrap();

        release.await.unwrap();
        assert_eq!(result, vec!["ground", "skybox", "fox", "icetruck"]);
        assert_eq!(
            completion_order.into_inner(),
            vec!["IceTruck", "Fox", "Skybox", "Ground"]
        );
    }

    #[tokio::test]
    async fn first_failure_fails_the_aggregate_once() {
        let descs = descriptors(&["Fox", "Broken", "IceTruck"]);
        let result = await_all(&descs, |d| async move {
            if d.identifier == "Broken" {
                Err(missing("Broken"))
            } else {
                Ok(d.identifier.clone())
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.identifier, "Broken");
        assert!(matches!(err.cause, AssetError::NotFound(_)));
    }

    #[tokio::test]
    async fn failure_keeps_finished_siblings() {
        let descs = descriptors(&["Fast", "Broken", "Slow"]);
        let (slow_tx, slow_rx) = oneshot::channel::<()>();
        let mut slow_rx = Some(slow_rx);

        let outcome = load_batch(&descs, |d| {
            let gate = if d.identifier == "Slow" { slow_rx.take() } else { None };
            async move {
                match d.identifier.as_str() {
                    "Broken" => {
                        tokio::task::yield_now().await;
                        Err(missing("Broken"))
                    }
                    _ => {
                        if let Some(gate) = gate {
                            let _ = gate.await;
                        }
                        Ok(d.identifier.clone())
                    }
                }
            }
        })
        .await;

        match outcome {
            BatchOutcome::Failed { error, loaded } => {
                assert_eq!(error.identifier, "Broken");
                assert_eq!(loaded, vec!["Fast".to_string()]);
            }
            BatchOutcome::Complete(_) => panic!("batch should have failed"),
        }
        // The slow load was dropped with the batch.
        assert!(slow_tx.send(()).is_err());
    }
}
