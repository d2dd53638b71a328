use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;
use std::future::Future;

use tracing::{debug, warn};

use crate::domain::{Account, Product};

/// Records addressable by a string key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Product {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Account {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, PartialEq)]
pub enum Lookup<'a, T> {
    Found(&'a T),
    Missing,
    Failed(&'a str),
}

/// Request-scoped, de-duplicating accumulator of IDs for one downstream
/// service. References are gathered first; [`flush`](Batch::flush) then
/// resolves every pending ID with a single batched call.
#[derive(Debug)]
pub struct Batch<T> {
    label: &'static str,
    pending: BTreeSet<String>,
    resolved: HashMap<String, T>,
    failed: HashMap<String, String>,
    calls: usize,
}

impl<T: Keyed> Batch<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            pending: BTreeSet::new(),
            resolved: HashMap::new(),
            failed: HashMap::new(),
            calls: 0,
        }
    }

    /// Queues `id` unless it is already pending or settled.
    pub fn request(&mut self, id: &str) {
        if !self.resolved.contains_key(id) && !self.failed.contains_key(id) {
            self.pending.insert(id.to_string());
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of downstream calls issued so far.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Resolves all pending IDs with one call to `fetch`. IDs absent from the
    /// result are settled as missing; a failed call marks every one of them
    /// failed with the call's error.
    pub async fn flush<F, Fut, E>(&mut self, fetch: F)
    where
        F: FnOnce(Vec<String>) -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: Display,
    {
        if self.pending.is_empty() {
            return;
        }
        let ids: Vec<String> = std::mem::take(&mut self.pending).into_iter().collect();
        debug!(batch = self.label, keys = ids.len(), "Flushing batch");
        self.calls += 1;

        match fetch(ids.clone()).await {
            Ok(found) => {
                for item in found {
                    self.resolved.insert(item.key().to_string(), item);
                }
            }
            Err(e) => {
                warn!(batch = self.label, error = %e, "Batched lookup failed");
                let reason = e.to_string();
                self.failed
                    .extend(ids.into_iter().map(|id| (id, reason.clone())));
            }
        }
    }

    pub fn lookup(&self, id: &str) -> Lookup<'_, T> {
        if let Some(item) = self.resolved.get(id) {
            Lookup::Found(item)
        } else if let Some(reason) = self.failed.get(id) {
            Lookup::Failed(reason)
        } else {
            Lookup::Missing
        }
    }
}

/// The per-request collectors. Never shared between requests.
#[derive(Debug)]
pub struct BatchCollector {
    pub accounts: Batch<Account>,
    pub products: Batch<Product>,
}

impl Default for BatchCollector {
    fn default() -> Self {
        Self {
            accounts: Batch::new("accounts"),
            products: Batch::new("products"),
        }
    }
}
