// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Heuristic per-step costs used when no statistics are available
//!
//! Edge costs are `ln(1 + expected fan-out)`, so summing them along a path
//! approximates the log of the number of results. Node (filter) costs are
//! `-ln(1 / selectivity)`: negative because they shrink the result set.

use once_cell::sync::Lazy;

use crate::concept::ValueType;

pub static COST_INSTANCES_PER_TYPE: Lazy<f64> = Lazy::new(|| 1000f64.ln_1p());
pub static COST_SUBTYPES_PER_TYPE: Lazy<f64> = Lazy::new(|| 1.5f64.ln_1p());
pub static COST_RELATIONS_PER_INSTANCE: Lazy<f64> = Lazy::new(|| 0.5f64.ln_1p());
pub static COST_ROLE_PLAYERS_PER_RELATION: Lazy<f64> = Lazy::new(|| 2f64.ln_1p());
pub static COST_ROLE_PLAYERS_PER_ROLE: Lazy<f64> = Lazy::new(|| 1000f64.ln_1p());
pub static COST_TYPES_PER_ROLE: Lazy<f64> = Lazy::new(|| 2f64.ln_1p());
pub static COST_ROLES_PER_TYPE: Lazy<f64> = Lazy::new(|| 2f64.ln_1p());
pub static COST_ROLES_PER_RELATION: Lazy<f64> = Lazy::new(|| 2f64.ln_1p());
pub static COST_RELATION_TYPES_PER_ROLE: Lazy<f64> = Lazy::new(|| 1f64.ln_1p());

pub static COST_NODE_INDEX: Lazy<f64> = Lazy::new(|| -1000f64.ln());
pub static COST_NODE_INDEX_VALUE: Lazy<f64> = Lazy::new(|| -(1000f64 / 5f64).ln());
pub static COST_NODE_NEQ: Lazy<f64> = Lazy::new(|| -2f64.ln());
pub static COST_NODE_DATA_TYPE: Lazy<f64> =
    Lazy::new(|| -(ValueType::ALL.len() as f64 / 2f64).ln());
pub static COST_NODE_UNSPECIFIC_PREDICATE: Lazy<f64> = Lazy::new(|| -2f64.ln());
pub static COST_NODE_REGEX: Lazy<f64> = Lazy::new(|| -2f64.ln());
pub static COST_NODE_NOT_INTERNAL: Lazy<f64> = Lazy::new(|| -1.1f64.ln());
pub static COST_NODE_IS_ABSTRACT: Lazy<f64> = Lazy::new(|| -1.1f64.ln());

/// The previous step dominates, so this one adds nothing
pub static COST_SAME_AS_PREVIOUS: Lazy<f64> = Lazy::new(|| 1f64.ln());

/// Unique by construction: an id matches at most one concept
pub const COST_ID_AS_STARTING_POINT: f64 = 1.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_are_negative_and_edges_positive() {
        for cost in [
            *COST_NODE_INDEX,
            *COST_NODE_INDEX_VALUE,
            *COST_NODE_NEQ,
            *COST_NODE_DATA_TYPE,
            *COST_NODE_REGEX,
            *COST_NODE_NOT_INTERNAL,
            *COST_NODE_IS_ABSTRACT,
        ] {
            assert!(cost < 0.0);
        }
        for cost in [
            *COST_INSTANCES_PER_TYPE,
            *COST_RELATIONS_PER_INSTANCE,
            *COST_TYPES_PER_ROLE,
            *COST_ROLE_PLAYERS_PER_ROLE,
        ] {
            assert!(cost > 0.0);
        }
        assert_eq!(*COST_SAME_AS_PREVIOUS, 0.0);
    }

    #[test]
    fn test_index_is_more_selective_than_value_index() {
        assert!(*COST_NODE_INDEX < *COST_NODE_INDEX_VALUE);
        assert!(*COST_NODE_INDEX_VALUE < *COST_NODE_UNSPECIFIC_PREDICATE);
    }
}
