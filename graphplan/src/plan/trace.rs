// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Plan tracing and explanation
//!
//! Captures what the planner did, step by step, and which fragments it
//! ordered how, for debugging and `EXPLAIN`-style output.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::PlannerResult;
use crate::plan::fragment::Fragment;
use crate::pattern::Variable;

/// Trace information for one compilation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTrace {
    pub steps: Vec<TraceStep>,
    pub total_duration: Duration,
    /// One ordered fragment list per conjunction
    pub conjunctions: Vec<Vec<FragmentTrace>>,
}

/// Individual step in the planning process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub phase: PlanningPhase,
    pub description: String,
    pub duration: Duration,
    pub metadata: TraceMetadata,
}

/// Planning phases for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanningPhase {
    FragmentGeneration,
    ComponentSplitting,
    CostEstimation,
    ArborescenceSelection,
    Ordering,
}

/// Additional metadata for trace steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceMetadata {
    pub fragment_count: Option<usize>,
    pub starting_points: Vec<String>,
    pub tree_weight: Option<f64>,
    pub variables_in_scope: Vec<String>,
    /// Fragments appended after the graph walk failed to reach them
    #[serde(default)]
    pub unplaced_fragments: Vec<String>,
}

/// One planned fragment as shown in a trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentTrace {
    pub fragment: String,
    pub cost: f64,
    pub fixed_cost: bool,
    pub accurate_cost: Option<f64>,
    /// Variables bound once this fragment has run
    pub bound_after: Vec<String>,
}

impl FragmentTrace {
    /// Trace an ordered plan, accumulating bound variables along the way
    pub fn from_plan(plan: &[Fragment]) -> Vec<FragmentTrace> {
        let mut bound: BTreeSet<Variable> = BTreeSet::new();
        plan.iter()
            .map(|fragment| {
                bound.extend(fragment.vars());
                FragmentTrace {
                    fragment: fragment.to_string(),
                    cost: fragment.fragment_cost(),
                    fixed_cost: fragment.has_fixed_fragment_cost(),
                    accurate_cost: fragment.accurate_fragment_cost(),
                    bound_after: bound
                        .iter()
                        .filter(|var| var.is_user_defined())
                        .map(|var| var.to_string())
                        .collect(),
                }
            })
            .collect()
    }
}

/// Builder for creating plan traces
pub struct PlanTracer {
    steps: Vec<TraceStep>,
    start_time: Instant,
    current_step_start: Option<Instant>,
}

impl Default for PlanTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanTracer {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            start_time: Instant::now(),
            current_step_start: None,
        }
    }

    /// Start timing a new planning step
    pub fn start_step(&mut self) {
        self.current_step_start = Some(Instant::now());
    }

    /// End the current step and record it
    pub fn end_step(&mut self, phase: PlanningPhase, description: String, metadata: TraceMetadata) {
        let duration = self
            .current_step_start
            .map(|start| start.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        self.steps.push(TraceStep {
            phase,
            description,
            duration,
            metadata,
        });
        self.current_step_start = None;
    }

    /// Record a step that was not timed
    pub fn trace_step(&mut self, phase: PlanningPhase, description: String, metadata: TraceMetadata) {
        self.start_step();
        self.end_step(phase, description, metadata);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Finalize the trace with the planned conjunctions
    pub fn finalize(self, plans: &[Vec<Fragment>]) -> PlanTrace {
        PlanTrace {
            steps: self.steps,
            total_duration: self.start_time.elapsed(),
            conjunctions: plans.iter().map(|plan| FragmentTrace::from_plan(plan)).collect(),
        }
    }
}

impl PlanTrace {
    /// Human-readable explanation
    pub fn format_plan(&self) -> String {
        let mut output = String::new();

        output.push_str("Traversal Plan\n");
        output.push_str(&"=".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "Conjunctions: {} | Planning Time: {:.3}ms\n\n",
            self.conjunctions.len(),
            self.total_duration.as_secs_f64() * 1000.0
        ));

        for (i, plan) in self.conjunctions.iter().enumerate() {
            output.push_str(&format!("Conjunction {}\n", i + 1));
            for (step, fragment) in plan.iter().enumerate() {
                let marker = if fragment.fixed_cost { "*" } else { " " };
                output.push_str(&format!(
                    "  {:>2}.{} {:<50} cost {:>8.3}\n",
                    step + 1,
                    marker,
                    fragment.fragment,
                    fragment.cost
                ));
            }
            output.push('\n');
        }

        if !self.steps.is_empty() {
            output.push_str("Planning Steps\n");
            output.push_str(&"-".repeat(50));
            output.push('\n');
            for step in &self.steps {
                output.push_str(&format!(
                    "  {:?}: {} ({:.3}ms)\n",
                    step.phase,
                    step.description,
                    step.duration.as_secs_f64() * 1000.0
                ));
            }
        }

        output
    }

    pub fn to_json(&self) -> PlannerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
