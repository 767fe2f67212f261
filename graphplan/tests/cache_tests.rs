//! Compiled-plan cache tests through the planner

#[path = "testutils/mod.rs"]
mod testutils;

use std::sync::Arc;
use std::time::Duration;

use graphplan::{Conjunction, Pattern, PlanCache, PlannerConfig, Statement};
use testutils::fixture::PlannerFixture;

fn people() -> Pattern {
    Pattern::from(Conjunction::new(vec![
        Statement::var("t").label("person"),
        Statement::var("x").isa("t"),
    ]))
}

fn companies() -> Pattern {
    Pattern::from(Conjunction::new(vec![
        Statement::var("t").label("company"),
        Statement::var("x").isa("t"),
    ]))
}

#[test]
fn test_repeated_pattern_reuses_plan() {
    let fixture = PlannerFixture::new();
    let planner = fixture.planner();
    let cache = PlanCache::from_config(&planner.config().plan_cache);

    let first = planner.create_traversal_cached(&people(), &cache, 1).unwrap();
    let second = planner.create_traversal_cached(&people(), &cache, 1).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.current_entries, 1);
}

#[test]
fn test_cached_plan_matches_fresh_plan() {
    let fixture = PlannerFixture::new();
    let planner = fixture.planner();
    let cache = PlanCache::new(10, Duration::from_secs(60));

    let cached = planner.create_traversal_cached(&people(), &cache, 1).unwrap();
    let fresh = planner.create_traversal(&people()).unwrap();
    assert_eq!(cached.to_string(), fresh.to_string());
}

#[test]
fn test_schema_change_forces_recompilation() {
    let fixture = PlannerFixture::new();
    let planner = fixture.planner();
    let cache = PlanCache::new(10, Duration::from_secs(60));

    let before = planner.create_traversal_cached(&people(), &cache, 1).unwrap();
    cache.invalidate_by_schema(1);
    let after = planner.create_traversal_cached(&people(), &cache, 2).unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(cache.stats().hits, 0);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_distinct_patterns_are_cached_separately() {
    let fixture = PlannerFixture::new();
    let planner = fixture.planner();
    let cache = PlanCache::new(1, Duration::from_secs(60));

    planner.create_traversal_cached(&people(), &cache, 1).unwrap();
    planner.create_traversal_cached(&companies(), &cache, 1).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_disabled_cache_is_bypassed() {
    let fixture = PlannerFixture::new();
    let planner = fixture.planner_with(PlannerConfig::minimal());
    let cache = PlanCache::new(10, Duration::from_secs(60));

    planner.create_traversal_cached(&people(), &cache, 1).unwrap();
    planner.create_traversal_cached(&people(), &cache, 1).unwrap();
    assert!(cache.is_empty());
    assert_eq!(cache.stats().hits + cache.stats().misses, 0);
}

#[test]
fn test_cache_is_shared_across_threads() {
    let fixture = Arc::new(PlannerFixture::new());
    let cache = Arc::new(PlanCache::new(10, Duration::from_secs(60)));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let fixture = Arc::clone(&fixture);
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                fixture
                    .planner()
                    .create_traversal_cached(&people(), &cache, 1)
                    .map(|plan| plan.to_string())
            })
        })
        .collect();

    let plans: Vec<String> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    assert!(plans.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(cache.len(), 1);
}
