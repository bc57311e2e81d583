#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use haqei_core::ReferenceCatalog;
use haqei_core::catalog::{LINE_COUNT, ProfileRecord, builtin};
use haqei_core::error::InitializationError;
use haqei_core::narrative::{RawCorpus, RawNarrative};
use haqei_core::source::ContentSource;
use haqei_core::{LeafCode, NarrativeCorpus};

/// Complete corpus whose texts are their own keys.
pub fn full_corpus() -> RawCorpus {
    let catalog = ReferenceCatalog::builtin();
    let mut raw = RawCorpus::new();
    for profile in catalog.iter() {
        for position in 1..=LINE_COUNT {
            for code in LeafCode::ALL {
                let key = NarrativeCorpus::format_key(profile, position, code).unwrap();
                raw.insert(key.clone(), RawNarrative::Text(key));
            }
        }
    }
    raw
}

/// Source that counts fetches, waits before answering and can fail a number
/// of initial attempts.
pub struct CountingSource {
    pub catalog_fetches: AtomicUsize,
    pub delay: Duration,
    failures_left: AtomicUsize,
    narratives: RawCorpus,
}

impl CountingSource {
    pub fn new(delay: Duration, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            catalog_fetches: AtomicUsize::new(0),
            delay,
            failures_left: AtomicUsize::new(failures),
            narratives: full_corpus(),
        })
    }

    pub fn fetches(&self) -> usize {
        self.catalog_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for CountingSource {
    fn describe(&self) -> String {
        "counting test source".to_string()
    }

    async fn fetch_catalog(&self) -> Result<Vec<ProfileRecord>, InitializationError> {
        self.catalog_fetches.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(InitializationError::Source("backing store unavailable".to_string()));
        }
        Ok(builtin::records())
    }

    async fn fetch_narratives(&self) -> Result<RawCorpus, InitializationError> {
        Ok(self.narratives.clone())
    }
}
