//! Feed registry - Whitelist of trusted price feeds
//!
//! Keeps an insertion-ordered list of feed identities plus one `FeedEntry`
//! per identity. Every read hands out owned snapshots.

mod ordered;

pub use ordered::OrderedIndex;

use std::collections::HashMap;
use tracing::info;

use crate::error::{OracleError, OracleResult};
use crate::types::{FeedEntry, FeedId, RemovalPolicy, Timestamp};

/// Default whitelist capacity
pub const DEFAULT_MAX_FEEDS: usize = 1000;

#[derive(Debug, Clone)]
pub struct Registry {
    order: OrderedIndex<FeedId>,
    entries: HashMap<FeedId, FeedEntry>,
    max_feeds: usize,
    removal: RemovalPolicy,
}

impl Registry {
    pub fn new(max_feeds: usize, removal: RemovalPolicy) -> Self {
        Self {
            order: OrderedIndex::new(),
            entries: HashMap::new(),
            max_feeds,
            removal,
        }
    }

    /// Whitelist a new feed.
    ///
    /// The capacity check only trips once the count already exceeds
    /// `max_feeds`, so the registry holds at most `max_feeds + 1` entries.
    pub fn add(&mut self, id: FeedId, name: impl Into<String>, now: Timestamp) -> OracleResult<()> {
        if self.order.len() > self.max_feeds {
            return Err(OracleError::CapacityExceeded {
                max: self.max_feeds,
            });
        }
        if self.order.contains(&id) {
            return Err(OracleError::AlreadyExists(id));
        }

        let entry = FeedEntry::new(name, now);
        info!(feed = %id, name = %entry.name, registered_at = now, "Feed added");
        self.order.insert(id.clone());
        self.entries.insert(id, entry);
        Ok(())
    }

    pub fn remove(&mut self, id: &FeedId) -> OracleResult<()> {
        if !self.order.contains(id) {
            return Err(OracleError::NotFound(id.clone()));
        }

        match self.removal {
            RemovalPolicy::PreserveOrder => self.order.remove(id),
            RemovalPolicy::SwapRemove => self.order.swap_remove(id),
        };
        self.entries.remove(id);
        info!(feed = %id, policy = %self.removal, "Feed removed");
        Ok(())
    }

    pub fn get(&self, id: &FeedId) -> OracleResult<FeedEntry> {
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| OracleError::NotFound(id.clone()))
    }

    /// Snapshot of every feed in storage order
    pub fn list(&self) -> Vec<(FeedId, FeedEntry)> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|e| (id.clone(), e.clone())))
            .collect()
    }

    /// Identities only, in storage order
    pub fn ids(&self) -> Vec<FeedId> {
        self.order.iter().cloned().collect()
    }

    pub fn contains(&self, id: &FeedId) -> bool {
        self.order.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn max_feeds(&self) -> usize {
        self.max_feeds
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.removal
    }

    /// Drop every feed. Used on uninstall.
    pub fn clear(&mut self) {
        let count = self.order.len();
        self.order.clear();
        self.entries.clear();
        info!(count, "Registry cleared");
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FEEDS, RemovalPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(registry: &Registry) -> Vec<String> {
        registry.ids().iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_add_and_get() {
        let mut registry = Registry::default();
        registry.add(FeedId::from("hx01"), "alpha", 1_000).unwrap();

        let entry = registry.get(&FeedId::from("hx01")).unwrap();
        assert_eq!(entry.name, "alpha");
        assert_eq!(entry.registered_at, 1_000);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_add_leaves_registry_unchanged() {
        let mut registry = Registry::default();
        registry.add(FeedId::from("hx01"), "alpha", 1_000).unwrap();

        let err = registry.add(FeedId::from("hx01"), "beta", 2_000).unwrap_err();
        assert_eq!(err, OracleError::AlreadyExists(FeedId::from("hx01")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&FeedId::from("hx01")).unwrap().name, "alpha");
    }

    #[test]
    fn test_remove_missing_feed() {
        let mut registry = Registry::default();
        registry.add(FeedId::from("hx01"), "alpha", 0).unwrap();

        let err = registry.remove(&FeedId::from("hx02")).unwrap_err();
        assert_eq!(err, OracleError::NotFound(FeedId::from("hx02")));
        assert_eq!(ids(&registry), vec!["hx01"]);
    }

    #[test]
    fn test_order_preserving_remove() {
        let mut registry = Registry::default();
        for id in ["A", "B", "C"] {
            registry.add(FeedId::from(id), id, 0).unwrap();
        }
        registry.remove(&FeedId::from("B")).unwrap();

        assert_eq!(ids(&registry), vec!["A", "C"]);
        assert!(registry.get(&FeedId::from("B")).is_err());
    }

    #[test]
    fn test_swap_remove_policy() {
        let mut registry = Registry::new(10, RemovalPolicy::SwapRemove);
        for id in ["A", "B", "C"] {
            registry.add(FeedId::from(id), id, 0).unwrap();
        }
        registry.remove(&FeedId::from("A")).unwrap();

        assert_eq!(ids(&registry), vec!["C", "B"]);
    }

    #[test]
    fn test_capacity_allows_one_past_max() {
        let mut registry = Registry::new(2, RemovalPolicy::PreserveOrder);
        registry.add(FeedId::from("A"), "a", 0).unwrap();
        registry.add(FeedId::from("B"), "b", 0).unwrap();
        registry.add(FeedId::from("C"), "c", 0).unwrap();

        let err = registry.add(FeedId::from("D"), "d", 0).unwrap_err();
        assert_eq!(err, OracleError::CapacityExceeded { max: 2 });
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_capacity_checked_before_duplicate() {
        let mut registry = Registry::new(0, RemovalPolicy::PreserveOrder);
        registry.add(FeedId::from("A"), "a", 0).unwrap();

        let err = registry.add(FeedId::from("A"), "a", 0).unwrap_err();
        assert_eq!(err.code(), "MAXIMUM_AMOUNT_OF_FEEDS_REACHED");
    }

    #[test]
    fn test_list_snapshot() {
        let mut registry = Registry::default();
        registry.add(FeedId::from("A"), "alpha", 10).unwrap();
        registry.add(FeedId::from("B"), "beta", 20).unwrap();

        let listed = registry.list();
        registry.clear();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].0, FeedId::from("A"));
        assert_eq!(listed[1].1, FeedEntry::new("beta", 20));
        assert!(registry.is_empty());
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_random_operations_never_duplicate() {
        use rand::{Rng, SeedableRng};

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut registry = Registry::new(5, RemovalPolicy::SwapRemove);

        for step in 0..500 {
            let id = FeedId::new(format!("feed-{}", rng.gen_range(0..12)));
            if rng.gen_bool(0.6) {
                let _ = registry.add(id, "f", step);
            } else {
                let _ = registry.remove(&id);
            }

            let mut listed = registry.ids();
            assert!(listed.len() <= registry.max_feeds() + 1);
            listed.sort();
            listed.dedup();
            assert_eq!(listed.len(), registry.len());
        }
    }
}
