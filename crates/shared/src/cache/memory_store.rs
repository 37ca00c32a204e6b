use crate::{
    abstract_trait::DistributedCacheTrait, cache::CacheCommand, errors::CacheError,
    utils::OpContext,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::warn;

enum Entry {
    Value {
        data: String,
        expires_at: Instant,
    },
    Set(HashSet<String>),
}

/// In-process stand-in for the Redis tier, used for local development and
/// tests. Batches are applied under a single write lock, and values honour
/// their TTL on read.
impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self, Entry::Value { expires_at, .. } if *expires_at <= now)
    }
}

#[derive(Clone)]
pub struct MemoryCacheStore {
    store: Arc<RwLock<HashMap<String, Entry>>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulates the shared tier going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Members of a set key, sorted; empty when the key is absent.
    pub async fn members(&self, key: &str) -> Vec<String> {
        let store = self.store.read().await;
        let mut members: Vec<String> = match store.get(key) {
            Some(Entry::Set(set)) => set.iter().cloned().collect(),
            _ => Vec::new(),
        };
        members.sort();
        members
    }

    fn ensure_available(&self) -> Result<(), CacheError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            warn!("Memory cache marked unavailable");
            Err(CacheError::Backend("memory cache unavailable".into()))
        }
    }
}

#[async_trait]
impl DistributedCacheTrait for MemoryCacheStore {
    async fn get(&self, ctx: &OpContext, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(reason) = ctx.interrupted() {
            return Err(reason.into());
        }
        self.ensure_available()?;

        let now = Instant::now();
        {
            let store = self.store.read().await;
            match store.get(key) {
                Some(entry) if entry.is_expired(now) => {}
                Some(Entry::Value { data, .. }) => return Ok(Some(data.clone())),
                Some(Entry::Set(_)) => {
                    return Err(CacheError::Backend(format!(
                        "WRONGTYPE key '{key}' holds a set"
                    )));
                }
                None => return Ok(None),
            }
        }

        let mut store = self.store.write().await;
        if store.get(key).is_some_and(|entry| entry.is_expired(now)) {
            store.remove(key);
        }
        Ok(None)
    }

    async fn exec_atomic(
        &self,
        ctx: &OpContext,
        commands: Vec<CacheCommand>,
    ) -> Result<(), CacheError> {
        if let Some(reason) = ctx.interrupted() {
            return Err(reason.into());
        }
        self.ensure_available()?;

        let mut store = self.store.write().await;
        let now = Instant::now();
        store.retain(|_, entry| !entry.is_expired(now));

        for command in commands {
            match command {
                CacheCommand::SetEx { key, value, ttl } => {
                    store.insert(
                        key,
                        Entry::Value {
                            data: value,
                            expires_at: Instant::now() + ttl,
                        },
                    );
                }
                CacheCommand::Del { key } => {
                    store.remove(&key);
                }
                CacheCommand::SAdd { key, member } => {
                    let entry = store
                        .entry(key)
                        .or_insert_with(|| Entry::Set(HashSet::new()));
                    if !matches!(entry, Entry::Set(_)) {
                        *entry = Entry::Set(HashSet::new());
                    }
                    if let Entry::Set(set) = entry {
                        set.insert(member);
                    }
                }
                CacheCommand::SRem { key, member } => {
                    let now_empty = match store.get_mut(&key) {
                        Some(Entry::Set(set)) => {
                            set.remove(&member);
                            set.is_empty()
                        }
                        _ => false,
                    };
                    if now_empty {
                        store.remove(&key);
                    }
                }
            }
        }

        Ok(())
    }
}
