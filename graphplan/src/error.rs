// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for query planning

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error("Fragment {0} is not a fixed cost starting point")]
    NotFixedCostStartingPoint(String),

    #[error("Unsupported pattern: {0}")]
    UnsupportedPattern(String),

    #[error("Invalid regex: {0}")]
    InvalidRegex(String),

    #[error("Query planner exception: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for PlannerError {
    fn from(err: serde_json::Error) -> Self {
        PlannerError::Config(err.to_string())
    }
}

impl From<regex::Error> for PlannerError {
    fn from(err: regex::Error) -> Self {
        PlannerError::InvalidRegex(err.to_string())
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
