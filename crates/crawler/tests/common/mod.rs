//! Shared test doubles for crawler integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use pricewatch_crawler::{ExtractError, PageFetcher};
use pricewatch_storage::{LogStorage, ObjectVersion, StorageError, VersionedEntries};
use serde_json::Value;

/// Product page fixture with a single `CHF 105.00` price node.
pub const SHIRT_PAGE: &str = include_str!("../fixtures/shirt.html");

/// Selector of the price node in [`SHIRT_PAGE`].
pub const SHIRT_PRICE_SELECTOR: &str = "div.h-product-price > div";

// ---------------------------------------------------------------------------
// In-memory log storage with call counters
// ---------------------------------------------------------------------------

/// Each object carries a write counter used as its version.
#[derive(Default)]
pub struct CountingStorage {
    objects: Mutex<HashMap<String, (Vec<Value>, u64)>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
    conflicts: AtomicUsize,
    exists_calls: AtomicUsize,
}

impl CountingStorage {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Conditional saves rejected because the object moved on.
    pub fn conflicts(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.loads() + self.saves() + self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn object(&self, name: &str) -> Option<Vec<Value>> {
        self.objects
            .lock()
            .unwrap()
            .get(name)
            .map(|(entries, _)| entries.clone())
    }

    fn write(&self, name: &str, entries: &[Value]) {
        let mut objects = self.objects.lock().unwrap();
        let next = objects.get(name).map_or(1, |(_, version)| version + 1);
        objects.insert(name.to_string(), (entries.to_vec(), next));
    }
}

#[async_trait]
impl LogStorage for CountingStorage {
    async fn load(&self, name: &str) -> Result<Vec<Value>, StorageError> {
        Ok(self.load_versioned(name).await?.entries)
    }

    async fn save(&self, name: &str, entries: &[Value]) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.write(name, entries);
        Ok(())
    }

    async fn load_versioned(&self, name: &str) -> Result<VersionedEntries, StorageError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let current = self.objects.lock().unwrap().get(name).cloned();
        // Widen the read-modify-write window so unserialised writers would race.
        tokio::task::yield_now().await;
        Ok(match current {
            Some((entries, version)) => VersionedEntries {
                entries,
                version: Some(ObjectVersion(version.to_string())),
            },
            None => VersionedEntries::default(),
        })
    }

    async fn save_if(
        &self,
        name: &str,
        entries: &[Value],
        expected: Option<&ObjectVersion>,
    ) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut objects = self.objects.lock().unwrap();
        let current = objects
            .get(name)
            .map(|(_, version)| ObjectVersion(version.to_string()));
        if current.as_ref() != expected {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::Conflict {
                name: name.to_string(),
            });
        }
        let next = objects.get(name).map_or(1, |(_, version)| version + 1);
        objects.insert(name.to_string(), (entries.to_vec(), next));
        Ok(())
    }

    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.objects.lock().unwrap().contains_key(name))
    }
}

// ---------------------------------------------------------------------------
// Static page fetcher
// ---------------------------------------------------------------------------

/// Serves fixed pages by URL; unknown URLs fail like an HTTP 404.
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    fetches: AtomicUsize,
}

impl StaticFetcher {
    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ExtractError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .map(|body| body.as_bytes().to_vec())
            .ok_or_else(|| ExtractError::Fetch {
                url: url.to_string(),
                message: "HTTP 404".to_string(),
            })
    }
}
