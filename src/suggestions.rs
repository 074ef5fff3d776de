//! Debounced autocomplete suggestions fetched from the AI backend while the
//! user types.
//!
//! Every fetch takes a monotonically increasing ticket. A call dispatches
//! only if it is still the newest ticket after the quiescence window, and a
//! resolved result is applied only if it is still the newest — the cache is
//! last-write-wins and never reflects a superseded request.
//!
//! Failures never propagate: a failed fetch logs and resolves to an empty
//! list, so typing can never break the primary input flow.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;

use crate::analysis::{AnalysisClient, AnalysisError};
use crate::config::EngineConfig;
use crate::models::SuggestionKind;

#[derive(Error, Debug)]
pub enum SuggestionFetchError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

pub struct SuggestionClient {
    analysis: std::sync::Arc<AnalysisClient>,
    count: usize,
    min_query_len: usize,
    debounce: Duration,
    /// Ticket of the newest fetch ever issued.
    latest: AtomicU64,
    cache: Mutex<Vec<String>>,
}

impl SuggestionClient {
    pub fn new(analysis: std::sync::Arc<AnalysisClient>, config: &EngineConfig) -> Self {
        Self {
            analysis,
            count: config.suggestion_count,
            min_query_len: config.min_query_len,
            debounce: config.debounce,
            latest: AtomicU64::new(0),
            cache: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the current suggestion cache.
    pub fn current(&self) -> Vec<String> {
        self.cache.lock().expect("suggestion cache lock").clone()
    }

    pub fn clear(&self) {
        // Invalidate any in-flight fetch before clearing, so a late
        // resolution cannot repopulate the cache.
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.cache.lock().expect("suggestion cache lock").clear();
    }

    /// Fetch suggestions for `partial`, debounced and superseding any
    /// earlier in-flight fetch. Returns the cache as of this call's
    /// resolution — which may be a newer request's result if this one was
    /// superseded.
    pub async fn fetch(&self, partial: &str, kind: SuggestionKind) -> Vec<String> {
        let trimmed = partial.trim();
        if trimmed.chars().count() < self.min_query_len {
            // Too short to be worth a round-trip.
            return Vec::new();
        }

        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            // A newer keystroke arrived during the quiescence window —
            // this call never reaches the network.
            return self.current();
        }

        match self.fetch_remote(kind, trimmed).await {
            Ok(items) => {
                let items = dedup_non_empty(items);
                let mut cache = self.cache.lock().expect("suggestion cache lock");
                if self.latest.load(Ordering::SeqCst) == ticket {
                    *cache = items;
                }
                cache.clone()
            }
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Suggestion fetch failed");
                let mut cache = self.cache.lock().expect("suggestion cache lock");
                if self.latest.load(Ordering::SeqCst) == ticket {
                    cache.clear();
                }
                Vec::new()
            }
        }
    }

    async fn fetch_remote(
        &self,
        kind: SuggestionKind,
        partial: &str,
    ) -> Result<Vec<String>, SuggestionFetchError> {
        let items = self
            .analysis
            .suggestion_candidates(kind, partial, self.count)
            .await?;
        Ok(items)
    }
}

/// Drop padding/empty entries and exact duplicates, preserving order.
fn dedup_non_empty(items: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if !item.is_empty() && !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
