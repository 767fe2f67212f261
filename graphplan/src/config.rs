// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Planner configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::PlannerResult;

/// Configuration for traversal planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of fixed-cost fragments tried as arborescence roots
    pub max_starting_points: usize,

    /// Number of instances stored per type shard
    pub sharding_threshold: u64,

    /// Keeps the log instance count estimate away from ln(0)
    pub shard_load_factor: f64,

    /// Whether to infer relation types from typed role players
    pub infer_relation_types: bool,

    /// Compiled plan cache configuration
    pub plan_cache: PlanCacheConfig,
}

/// Configuration for the compiled plan cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanCacheConfig {
    /// Enable/disable plan caching
    pub enabled: bool,

    /// Maximum number of cached plans
    pub max_entries: usize,

    /// Time to live for a cached plan
    pub ttl: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_starting_points: 3,
            sharding_threshold: 10_000,
            shard_load_factor: 0.25,
            infer_relation_types: true,
            plan_cache: PlanCacheConfig::default(),
        }
    }
}

impl Default for PlanCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 1000,
            ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

impl PlannerConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults
    pub fn from_json_str(json: &str) -> PlannerResult<Self> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Configuration without plan caching or relation type inference
    pub fn minimal() -> Self {
        Self {
            infer_relation_types: false,
            plan_cache: PlanCacheConfig {
                enabled: false,
                ..PlanCacheConfig::default()
            },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PlannerConfig::from_json_str(r#"{"max_starting_points": 5}"#).unwrap();
        assert_eq!(config.max_starting_points, 5);
        assert_eq!(config.sharding_threshold, 10_000);
        assert!(config.plan_cache.enabled);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = PlannerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, crate::error::PlannerError::Config(_)));
    }
}
