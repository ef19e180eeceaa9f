//! An in-process object store.
//!
//! Backs the standalone runner and the tests. It counts every call so callers
//! can check that a request was rejected before touching the store, and it
//! can be told to start failing writes after a given number of them.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use super::ObjectStore;

type ObjectKey = (String, String);

#[derive(Debug)]
pub struct MemoryStore {
    objects: DashMap<ObjectKey, Bytes>,
    gets: AtomicUsize,
    puts: AtomicUsize,
    /// Number of further `put`s allowed to succeed.
    put_budget: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            objects: DashMap::new(),
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
            put_budget: AtomicUsize::new(usize::MAX),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object without counting it as a `put`.
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects
            .insert((bucket.to_string(), key.to_string()), body.into());
    }

    /// Read an object without counting it as a `get`.
    pub fn peek(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    /// Every key currently stored in `bucket`, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().0 == bucket)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Calls to [`ObjectStore::get`] so far, including failed ones.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Calls to [`ObjectStore::put`] so far, including failed ones.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Let the next `n` writes succeed and fail every one after that.
    pub fn fail_puts_after(&self, n: usize) {
        self.put_budget.store(n, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> anyhow::Result<Bytes> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.peek(bucket, key)
            .ok_or_else(|| anyhow!("no such object: {bucket}/{key}"))
    }

    async fn put(&self, bucket: &str, key: &str, body: Bytes) -> anyhow::Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let allowed = self
            .put_budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if !allowed {
            bail!("write rejected: {bucket}/{key}");
        }
        self.insert(bucket, key, body);
        Ok(())
    }
}
