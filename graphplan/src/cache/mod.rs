// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Caching of compiled traversal plans
//!
//! Planning is pure given a pattern, the schema and the statistics, so a plan
//! can be reused until the schema changes or its time to live runs out.

pub mod plan_cache;

pub use plan_cache::{PlanCache, PlanCacheEntry, PlanCacheKey, PlanCacheStats};
