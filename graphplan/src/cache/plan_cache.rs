// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Traversal plan caching to avoid recompilation

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::RwLock;

use crate::config::{PlanCacheConfig, PlannerConfig};
use crate::pattern::Pattern;
use crate::plan::traversal_plan::TraversalPlan;

/// Key for plan cache entries
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanCacheKey {
    pub pattern_hash: u64,       // Hash of the pattern structure
    pub schema_version: u64,     // Schema the plan was compiled against
    pub planner_options: String, // Settings that change the chosen plan
}

impl PlanCacheKey {
    pub fn new(pattern: &Pattern, schema_version: u64, config: &PlannerConfig) -> Self {
        let mut hasher = DefaultHasher::new();
        pattern.hash(&mut hasher);
        Self {
            pattern_hash: hasher.finish(),
            schema_version,
            planner_options: format!(
                "starts={};shard={}x{};infer={}",
                config.max_starting_points,
                config.sharding_threshold,
                config.shard_load_factor,
                config.infer_relation_types
            ),
        }
    }
}

/// Cached plan entry
#[derive(Debug, Clone)]
pub struct PlanCacheEntry {
    pub plan: Arc<TraversalPlan>,
    pub compilation_time: Duration,
    pub created_at: Instant,
    pub ttl: Duration,
    pub usage_count: u64,
    pub last_used: Instant,
    last_access: u64,
}

impl PlanCacheEntry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// Plan cache statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlanCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub compilations_saved: u64,
    pub total_compilation_time_saved_ms: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub current_entries: usize,
}

impl PlanCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn average_compilation_time_saved_ms(&self) -> f64 {
        if self.compilations_saved == 0 {
            0.0
        } else {
            self.total_compilation_time_saved_ms as f64 / self.compilations_saved as f64
        }
    }
}

/// Bounded LRU cache of compiled plans, safe to share between planners
pub struct PlanCache {
    entries: RwLock<HashMap<PlanCacheKey, PlanCacheEntry>>,
    max_entries: usize,
    stats: RwLock<PlanCacheStats>,
    default_ttl: Duration,
    clock: AtomicU64,
}

impl PlanCache {
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
            stats: RwLock::new(PlanCacheStats::default()),
            default_ttl,
            clock: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &PlanCacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl)
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Get cached plan if available
    pub fn get(&self, key: &PlanCacheKey) -> Option<Arc<TraversalPlan>> {
        let mut entries = self.entries.write();

        let expired = match entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                entry.usage_count += 1;
                entry.last_used = Instant::now();
                entry.last_access = self.tick();

                let mut stats = self.stats.write();
                stats.hits += 1;
                stats.compilations_saved += 1;
                stats.total_compilation_time_saved_ms += entry.compilation_time.as_millis() as u64;
                return Some(entry.plan.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
        }
        let mut stats = self.stats.write();
        stats.misses += 1;
        if expired {
            stats.expirations += 1;
        }
        stats.current_entries = entries.len();
        None
    }

    /// Insert plan into cache
    pub fn insert(&self, key: PlanCacheKey, plan: Arc<TraversalPlan>, compilation_time: Duration) {
        if self.max_entries == 0 {
            return;
        }
        let now = Instant::now();
        let entry = PlanCacheEntry {
            plan,
            compilation_time,
            created_at: now,
            ttl: self.default_ttl,
            usage_count: 0,
            last_used: now,
            last_access: self.tick(),
        };

        let mut entries = self.entries.write();
        if !entries.contains_key(&key) {
            self.evict_if_needed(&mut entries);
        }
        entries.insert(key, entry);
        self.stats.write().current_entries = entries.len();
    }

    fn evict_if_needed(&self, entries: &mut HashMap<PlanCacheKey, PlanCacheEntry>) {
        if entries.len() < self.max_entries {
            return;
        }

        // Least recently used first, then least used
        let mut candidates: Vec<(PlanCacheKey, u64, u64)> = entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.last_access, entry.usage_count))
            .collect();
        candidates.sort_by(|a, b| a.1.cmp(&b.1).then(a.2.cmp(&b.2)));

        let mut stats = self.stats.write();
        for (key, _, _) in candidates {
            if entries.len() < self.max_entries {
                break;
            }
            if entries.remove(&key).is_some() {
                debug!("Evicted cached plan {:x}", key.pattern_hash);
                stats.evictions += 1;
            }
        }
    }

    /// Invalidate plans compiled against a schema version
    pub fn invalidate_by_schema(&self, schema_version: u64) {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.schema_version != schema_version);
        debug!(
            "Invalidated {} cached plan(s) for schema version {}",
            before - entries.len(),
            schema_version
        );
        self.stats.write().current_entries = entries.len();
    }

    /// Get cache statistics
    pub fn stats(&self) -> PlanCacheStats {
        let mut stats = self.stats.read().clone();
        stats.current_entries = self.entries.read().len();
        stats
    }

    /// Clear all cached plans
    pub fn clear(&self) {
        self.entries.write().clear();
        self.stats.write().current_entries = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Conjunction, Statement};

    fn pattern(label: &str) -> Pattern {
        Pattern::from(Conjunction::new(vec![Statement::var("x").label(label)]))
    }

    fn key(label: &str, version: u64) -> PlanCacheKey {
        PlanCacheKey::new(&pattern(label), version, &PlannerConfig::default())
    }

    fn plan() -> Arc<TraversalPlan> {
        Arc::new(TraversalPlan::new(Vec::new(), None))
    }

    #[test]
    fn test_key_is_stable_for_equal_patterns() {
        assert_eq!(key("person", 1), key("person", 1));
        assert_ne!(key("person", 1), key("company", 1));
        assert_ne!(key("person", 1), key("person", 2));
    }

    #[test]
    fn test_key_depends_on_planner_options() {
        let minimal = PlanCacheKey::new(&pattern("person"), 1, &PlannerConfig::minimal());
        assert_ne!(minimal, key("person", 1));
    }

    #[test]
    fn test_hit_and_miss_are_counted() {
        let cache = PlanCache::new(10, Duration::from_secs(60));
        assert!(cache.get(&key("person", 1)).is_none());
        cache.insert(key("person", 1), plan(), Duration::from_millis(5));
        assert!(cache.get(&key("person", 1)).is_some());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.compilations_saved, 1);
        assert_eq!(stats.total_compilation_time_saved_ms, 5);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = PlanCache::new(2, Duration::from_secs(60));
        cache.insert(key("a", 1), plan(), Duration::ZERO);
        cache.insert(key("b", 1), plan(), Duration::ZERO);
        assert!(cache.get(&key("a", 1)).is_some());
        cache.insert(key("c", 1), plan(), Duration::ZERO);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a", 1)).is_some());
        assert!(cache.get(&key("b", 1)).is_none());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_expired_entry_is_removed() {
        let cache = PlanCache::new(10, Duration::ZERO);
        cache.insert(key("a", 1), plan(), Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(cache.get(&key("a", 1)).is_none());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_invalidate_by_schema() {
        let cache = PlanCache::new(10, Duration::from_secs(60));
        cache.insert(key("a", 1), plan(), Duration::ZERO);
        cache.insert(key("b", 2), plan(), Duration::ZERO);
        cache.invalidate_by_schema(1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("b", 2)).is_some());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().current_entries, 0);
    }
}
