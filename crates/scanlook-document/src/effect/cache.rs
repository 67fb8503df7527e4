// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-document effect cache.
//
// One cache lives for exactly one document's processing run. Once a
// (page content, configuration) key has been computed successfully, the
// wrapped engine never runs for it again, even when several page tasks of the
// same chunk ask for it concurrently. Failed computations are not stored.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use scanlook_core::error::{Result, ScanlookError};
use scanlook_core::types::{EffectConfig, RenderedPage};
use sha2::{Digest, Sha256};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::EffectEngine;

/// Content-plus-configuration fingerprint of one effect request.
///
/// SHA-256 over the encoded page bytes followed by the JSON encoding of the
/// configuration. Two pages with equal bytes under equal configurations share
/// a key; changing any configuration value changes the key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn derive(page: &RenderedPage, config: &EffectConfig) -> Result<Self> {
        let mut hasher = Sha256::new();
        hasher.update(page.data.as_ref());
        hasher.update(serde_json::to_vec(config)?);
        Ok(Self(hasher.finalize().into()))
    }

    /// Engine seed taken from the first eight bytes of the digest.
    pub fn seed(&self) -> u64 {
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&self.0[..8]);
        u64::from_le_bytes(prefix)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", &self.to_hex()[..12])
    }
}

/// Deduplicating wrapper around an [`EffectEngine`].
pub struct EffectCache {
    engine: Arc<dyn EffectEngine>,
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<RenderedPage>>>>,
    requests: AtomicU64,
    misses: AtomicU64,
}

impl EffectCache {
    pub fn new(engine: Arc<dyn EffectEngine>) -> Self {
        Self {
            engine,
            entries: Mutex::new(HashMap::new()),
            requests: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Apply the effect to `page`, computing it only if this key has not been
    /// computed (or is not being computed) already.
    ///
    /// The at-most-once guarantee covers successful computations only. A
    /// failed computation is not cached: every request that was waiting on it,
    /// and every later request, runs the engine again, so N concurrent
    /// requests for a failing key may invoke the engine up to N times.
    #[instrument(skip_all, fields(width = page.width, height = page.height))]
    pub async fn apply(&self, page: &RenderedPage, config: &EffectConfig) -> Result<RenderedPage> {
        let key = CacheKey::derive(page, config)?;
        self.requests.fetch_add(1, Ordering::Relaxed);

        // The map lock is released before any await.
        let cell = {
            let mut entries = self.entries.lock().map_err(|_| {
                ScanlookError::EffectComputation("effect cache lock poisoned".into())
            })?;
            Arc::clone(entries.entry(key).or_default())
        };

        let result = cell
            .get_or_try_init(|| async {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(?key, "Effect cache miss");

                let engine = Arc::clone(&self.engine);
                let page = page.clone();
                let config = config.clone();
                let seed = key.seed();
                tokio::task::spawn_blocking(move || engine.apply(&page, &config, seed))
                    .await
                    .map_err(|err| {
                        ScanlookError::EffectComputation(format!("effect task join error: {}", err))
                    })?
            })
            .await?;

        Ok(result.clone())
    }

    /// Requests served, hits and misses together.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Engine invocations.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Requests answered without invoking the engine.
    pub fn hits(&self) -> u64 {
        self.requests().saturating_sub(self.misses())
    }

    /// Number of distinct keys seen.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Engine that counts calls and sleeps long enough for requests to overlap.
    struct SlowCountingEngine {
        calls: AtomicUsize,
    }

    impl EffectEngine for SlowCountingEngine {
        fn apply(&self, page: &RenderedPage, _config: &EffectConfig, seed: u64) -> Result<RenderedPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(30));
            let mut data = page.data.to_vec();
            data.extend_from_slice(&seed.to_le_bytes());
            Ok(RenderedPage::new(data, page.width, page.height, page.dpi))
        }
    }

    struct FailingEngine;

    impl EffectEngine for FailingEngine {
        fn apply(&self, _: &RenderedPage, _: &EffectConfig, _: u64) -> Result<RenderedPage> {
            Err(ScanlookError::EffectComputation("boom".into()))
        }
    }

    fn counting() -> Arc<SlowCountingEngine> {
        Arc::new(SlowCountingEngine {
            calls: AtomicUsize::new(0),
        })
    }

    fn page(bytes: &[u8]) -> RenderedPage {
        RenderedPage::new(bytes.to_vec(), 10, 10, 72.0)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_requests_compute_once() {
        let engine = counting();
        let cache = Arc::new(EffectCache::new(engine.clone()));
        let config = EffectConfig::default();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let config = config.clone();
                tokio::spawn(async move { cache.apply(&page(b"same page"), &config).await })
            })
            .collect();

        let mut outputs = Vec::new();
        for task in tasks {
            outputs.push(task.await.unwrap().unwrap());
        }

        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
        assert!(outputs.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(cache.requests(), 8);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 7);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn different_configs_do_not_collide() {
        let engine = counting();
        let cache = EffectCache::new(engine.clone());
        let page = page(b"page one");

        let a = cache.apply(&page, &EffectConfig::default()).await.unwrap();
        let b = cache
            .apply(
                &page,
                &EffectConfig {
                    blur: 0.9,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
        assert_ne!(a.data, b.data);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn different_content_does_not_collide() {
        let engine = counting();
        let cache = EffectCache::new(engine.clone());
        let config = EffectConfig::default();

        cache.apply(&page(b"left"), &config).await.unwrap();
        cache.apply(&page(b"right"), &config).await.unwrap();
        cache.apply(&page(b"left"), &config).await.unwrap();

        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.hits(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = EffectCache::new(Arc::new(FailingEngine));
        let config = EffectConfig::default();
        assert!(cache.apply(&page(b"x"), &config).await.is_err());
        assert!(cache.apply(&page(b"x"), &config).await.is_err());
        assert_eq!(cache.misses(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn waiters_retry_after_a_failed_computation() {
        struct SlowFailing(AtomicUsize);

        impl EffectEngine for SlowFailing {
            fn apply(&self, _: &RenderedPage, _: &EffectConfig, _: u64) -> Result<RenderedPage> {
                self.0.fetch_add(1, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(20));
                Err(ScanlookError::EffectComputation("boom".into()))
            }
        }

        let engine = Arc::new(SlowFailing(AtomicUsize::new(0)));
        let cache = Arc::new(EffectCache::new(engine.clone()));
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.apply(&page(b"bad"), &EffectConfig::default()).await })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_err());
        }
        let calls = engine.0.load(Ordering::SeqCst);
        assert!((1..=4).contains(&calls), "engine ran {calls} times");
        assert_eq!(cache.misses() as usize, calls);
    }

    #[test]
    fn key_binds_content_and_config() {
        let config = EffectConfig::default();
        let a = CacheKey::derive(&page(b"abc"), &config).unwrap();
        let b = CacheKey::derive(&page(b"abc"), &config).unwrap();
        let c = CacheKey::derive(
            &page(b"abc"),
            &EffectConfig {
                border: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.seed(), b.seed());
        assert_eq!(a.to_hex().len(), 64);
    }
}
