//! Refresh loop for list views: `Idle → Loading → {Ready | Error}`.
//!
//! Each view owns exactly one in-memory record set; there is no cross-view
//! cache. A successful refresh replaces the whole set atomically so a view
//! never shows a mix of pre- and post-refresh rows, and a failed refresh
//! keeps the last good set visible alongside the error. A generation counter
//! guards overlapping refreshes: only the newest in-flight load may apply
//! its result, stale completions are dropped.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<T> {
    pub phase: Phase,
    pub records: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct Inner<T> {
    phase: Phase,
    records: Vec<T>,
    error: Option<String>,
}

pub struct ViewModel<T> {
    inner: Mutex<Inner<T>>,
    generation: AtomicU64,
}

impl<T: Clone> Default for ViewModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ViewModel<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                phase: Phase::Idle,
                records: Vec::new(),
                error: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        let inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        Snapshot {
            phase: inner.phase,
            records: inner.records.clone(),
            error: inner.error.clone(),
        }
    }

    /// Runs one load cycle. If a newer refresh starts while this one is in
    /// flight, this one's result is discarded on completion.
    pub async fn refresh<F, Fut>(&self, load: F) -> Snapshot<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, ServiceError>>,
    {
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            inner.phase = Phase::Loading;
        }

        let result = load().await;

        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if self.generation.load(Ordering::SeqCst) != my_generation {
            // A newer refresh superseded this one; leave its outcome alone.
            return Snapshot {
                phase: inner.phase,
                records: inner.records.clone(),
                error: inner.error.clone(),
            };
        }
        match result {
            Ok(records) => {
                inner.records = records;
                inner.error = None;
                inner.phase = Phase::Ready;
            }
            Err(err) => {
                // Last good data stays visible; the error rides alongside.
                inner.error = Some(err.to_string());
                inner.phase = Phase::Error;
            }
        }
        Snapshot {
            phase: inner.phase,
            records: inner.records.clone(),
            error: inner.error.clone(),
        }
    }
}

/// Cooperative chunking for large grids: maps `rows` through `map_fn`,
/// yielding to the scheduler between fixed-size batches so one big fetch
/// cannot monopolize a worker.
pub const CHUNK_SIZE: usize = 100;

pub async fn map_in_chunks<R, T, F>(rows: Vec<R>, map_fn: F) -> Vec<T>
where
    F: Fn(&R) -> Option<T>,
{
    let mut mapped = Vec::with_capacity(rows.len());
    for (i, chunk) in rows.chunks(CHUNK_SIZE).enumerate() {
        if i > 0 {
            tokio::task::yield_now().await;
        }
        mapped.extend(chunk.iter().filter_map(&map_fn));
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn successful_refresh_replaces_records() {
        let vm: ViewModel<u32> = ViewModel::new();
        let snap = vm.refresh(|| async { Ok(vec![1, 2, 3]) }).await;
        assert_eq!(snap.phase, Phase::Ready);
        assert_eq!(snap.records, vec![1, 2, 3]);

        let snap = vm.refresh(|| async { Ok(vec![9]) }).await;
        assert_eq!(snap.records, vec![9]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_good_data() {
        let vm: ViewModel<u32> = ViewModel::new();
        vm.refresh(|| async { Ok(vec![1, 2]) }).await;
        let snap = vm
            .refresh(|| async { Err(ServiceError::Network("down".into())) })
            .await;
        assert_eq!(snap.phase, Phase::Error);
        assert_eq!(snap.records, vec![1, 2]);
        assert!(snap.error.as_deref().unwrap_or("").contains("down"));
    }

    #[tokio::test]
    async fn stale_refresh_result_is_dropped() {
        let vm: Arc<ViewModel<u32>> = Arc::new(ViewModel::new());

        let slow_vm = vm.clone();
        let slow = tokio::spawn(async move {
            slow_vm
                .refresh(|| async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(vec![1])
                })
                .await
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let fast = vm.refresh(|| async { Ok(vec![2]) }).await;
        assert_eq!(fast.records, vec![2]);

        slow.await.expect("refresh task");
        // The slow (older) refresh completed after the fast one and must
        // not have overwritten it.
        assert_eq!(vm.snapshot().records, vec![2]);
        assert_eq!(vm.snapshot().phase, Phase::Ready);
    }

    #[tokio::test]
    async fn chunked_mapping_preserves_order_and_filters() {
        let rows: Vec<u32> = (0..250).collect();
        let mapped = map_in_chunks(rows, |n| if n % 2 == 0 { Some(*n) } else { None }).await;
        assert_eq!(mapped.len(), 125);
        assert_eq!(mapped[0], 0);
        assert_eq!(mapped[124], 248);
    }
}
