//! Single-flight result cache for ranking passes.
//!
//! Keyed by a content hash of the full request (candidates, context,
//! weights, truncation). Concurrent readers of a ready entry never block
//! each other; concurrent computations for the same key serialize so at
//! most one pass per key is ever in flight. Errors are returned to the
//! caller and never cached. The cache must be invalidated by the caller
//! whenever the underlying candidate set changes.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock};

use sha2::{Digest, Sha256};

use crate::candidate::{Candidate, Context};
use crate::engine::RecommendationReport;
use crate::error::Result;
use crate::scoring::FactorWeights;

/// Single-flight cache of completed recommendation reports.
#[derive(Default)]
pub struct ResultCache {
    ready: RwLock<HashMap<String, Arc<RecommendationReport>>>,
    in_flight: Mutex<HashSet<String>>,
    done: Condvar,
}

impl ResultCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        ResultCache::default()
    }

    /// Content hash identifying one exact request.
    pub fn request_key(
        candidates: &[Candidate],
        context: &Context,
        weights: &FactorWeights,
        top_n: Option<usize>,
    ) -> Result<String> {
        let bytes = serde_json::to_vec(&(candidates, context, weights, top_n))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Look up a ready entry without blocking on writers for other keys.
    pub fn get(&self, key: &str) -> Option<Arc<RecommendationReport>> {
        self.ready
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Return the cached report for `key`, computing it at most once.
    ///
    /// If another thread is already computing the same key, this blocks
    /// until that computation finishes and then returns its result. A
    /// failed computation releases the key so the next caller retries.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Result<Arc<RecommendationReport>>
    where
        F: FnOnce() -> Result<RecommendationReport>,
    {
        loop {
            if let Some(hit) = self.get(key) {
                return Ok(hit);
            }

            let mut in_flight = self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // A computation may have finished between the read and the lock.
            if let Some(hit) = self.get(key) {
                return Ok(hit);
            }
            if in_flight.insert(key.to_string()) {
                break;
            }
            // Someone else owns this key; wait for them and re-check.
            let _guard = self
                .done
                .wait(in_flight)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let result = compute();

        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        in_flight.remove(key);
        let outcome = match result {
            Ok(report) => {
                let report = Arc::new(report);
                self.ready
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key.to_string(), Arc::clone(&report));
                Ok(report)
            }
            Err(err) => Err(err),
        };
        drop(in_flight);
        self.done.notify_all();
        outcome
    }

    /// Drop one entry.
    pub fn invalidate(&self, key: &str) {
        self.ready
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Drop everything; call when the underlying candidate set changes.
    pub fn clear(&self) {
        self.ready
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of ready entries.
    pub fn len(&self) -> usize {
        self.ready
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no ready entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
