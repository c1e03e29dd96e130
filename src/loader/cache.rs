//! Per-loader fragment cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

/// Fragment text keyed by component name.
///
/// Each name owns a slot that is filled at most once. Concurrent loads of
/// the same name wait on the slot instead of fetching again; a failed load
/// leaves the slot empty for the next caller.
#[derive(Default)]
pub struct ComponentCache {
    slots: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl ComponentCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, name: &str) -> Arc<OnceCell<String>> {
        let mut slots = self.slots.lock().await;
        slots
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Cached text for `name`, if a load has succeeded.
    pub async fn get(&self, name: &str) -> Option<String> {
        let slots = self.slots.lock().await;
        slots.get(name).and_then(|slot| slot.get().cloned())
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.get(name).await.is_some()
    }

    /// Return the cached text or run `load` to fill the slot.
    ///
    /// Only one `load` runs per name at a time.
    pub async fn get_or_try_load<F, Fut, E>(&self, name: &str, load: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, E>>,
    {
        let slot = self.slot(name).await;
        let html = slot.get_or_try_init(load).await?;
        Ok(html.clone())
    }

    /// Names with cached text, sorted.
    pub async fn names(&self) -> Vec<String> {
        let slots = self.slots.lock().await;
        let mut names: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        let slots = self.slots.lock().await;
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
