//! Test utilities for GraphPlan integration tests
//!
//! Tests share one schema: a small social network with people, companies,
//! employment and friendship relations, and name/age attributes.

#![allow(dead_code)]

pub mod fixture;
