//! Plan ordering tests over the social-network fixture
//!
//! Covers connectedness, dependency ordering and determinism of compiled
//! plans, and the attribute lookup and inequality scenarios.

#[path = "testutils/mod.rs"]
mod testutils;

use std::collections::{BTreeSet, HashSet};

use graphplan::concept::Label;
use graphplan::pattern::{Comparator, Property, SubDepth, ValuePredicate};
use graphplan::plan::{FragmentKind, PlanningPhase};
use graphplan::{
    Conjunction, Fragment, Pattern, PlannerConfig, Statement, TraversalPlan, Variable,
};
use testutils::fixture::PlannerFixture;

fn var(name: &str) -> Variable {
    Variable::named(name)
}

fn pattern(statements: Vec<Statement>) -> Pattern {
    Pattern::from(Conjunction::new(statements))
}

/// `$x isa person; $x has name $n; $n == "Alice"`
fn alice() -> Pattern {
    pattern(vec![
        Statement::var("t").label("person"),
        Statement::var("x").isa("t").has("name", "n"),
        Statement::var("n").value(ValuePredicate::eq("Alice")),
    ])
}

fn employment() -> Pattern {
    pattern(vec![
        Statement::var("e").rel(None, "c").rel(None, "p"),
        Statement::var("c").isa("ct").has("name", "cn"),
        Statement::var("ct").label("company"),
        Statement::var("p").isa("pt"),
        Statement::var("pt").label("employee"),
        Statement::var("cn").value(ValuePredicate::eq("Acme")),
    ])
}

/// Every fragment after the first starts from a variable already bound
fn assert_connected(plan: &[Fragment]) {
    let mut bound = BTreeSet::new();
    for (i, fragment) in plan.iter().enumerate() {
        if i > 0 {
            assert!(
                bound.contains(fragment.start()),
                "{} restarts the traversal at position {}",
                fragment,
                i
            );
        }
        bound.extend(fragment.vars());
    }
}

fn assert_dependencies_bound(plan: &[Fragment]) {
    let mut bound = BTreeSet::new();
    for fragment in plan {
        for dependency in fragment.dependencies() {
            assert!(
                bound.contains(&dependency),
                "{} runs before {} is bound",
                fragment,
                dependency
            );
        }
        bound.extend(fragment.vars());
    }
}

fn render(plan: &[Fragment]) -> Vec<String> {
    plan.iter().map(|fragment| fragment.to_string()).collect()
}

#[test]
fn test_one_fragment_per_equivalent_set() {
    let fixture = PlannerFixture::new();
    let plan = fixture.plan(alice());

    let isa = plan
        .iter()
        .filter(|f| matches!(f.kind(), FragmentKind::InIsa { .. } | FragmentKind::OutIsa { .. }))
        .count();
    let attribute = plan
        .iter()
        .filter(|f| {
            matches!(
                f.kind(),
                FragmentKind::InAttribute(_) | FragmentKind::OutAttribute(_)
            )
        })
        .count();
    assert_eq!(isa, 1);
    assert_eq!(attribute, 1);
    assert!(plan
        .iter()
        .any(|f| matches!(f.kind(), FragmentKind::Value { .. })));
    assert_eq!(
        plan.iter().collect::<HashSet<_>>().len(),
        plan.len(),
        "no fragment is planned twice"
    );
}

#[test]
fn test_connected_patterns_never_restart() {
    let fixture = PlannerFixture::new();
    assert_connected(&fixture.plan(alice()));
    assert_connected(&fixture.plan(employment()));
}

#[test]
fn test_plan_starts_at_fixed_cost_fragment() {
    let fixture = PlannerFixture::new();
    for query in [alice(), employment()] {
        let plan = fixture.plan(query);
        assert!(plan[0].has_fixed_fragment_cost(), "{} is not indexed", plan[0]);
    }
}

#[test]
fn test_value_equality_is_a_starting_point() {
    let fixture = PlannerFixture::new();
    let value = Fragment::value(var("n"), ValuePredicate::eq("Alice"));
    assert!(value.has_fixed_fragment_cost());
    let estimate = value
        .estimated_cost_as_starting_point(&fixture.concepts, &fixture.statistics)
        .unwrap();
    let label = Fragment::label(var("t"), BTreeSet::from([Label::of("person")]))
        .estimated_cost_as_starting_point(&fixture.concepts, &fixture.statistics)
        .unwrap();
    assert!(estimate < label);

    // with a single root, the cheapest starting point wins
    let config = PlannerConfig {
        max_starting_points: 1,
        ..PlannerConfig::minimal()
    };
    let plan = fixture
        .planner_with(config)
        .create_traversal(&alice())
        .unwrap();
    let first = &plan.fragments()[0][0];
    assert_eq!(first.start(), &var("n"));
    assert!(first.has_fixed_fragment_cost());
}

#[test]
fn test_value_comparison_between_variables_waits_for_both() {
    let fixture = PlannerFixture::new();
    let plan = fixture.plan(pattern(vec![
        Statement::var("t").label("person"),
        Statement::var("a").isa("t").has("age", "x"),
        Statement::var("b").isa("t").has("age", "y"),
        Statement::var("x").value(ValuePredicate::with_variable(Comparator::Gt, var("y"))),
    ]));
    assert_dependencies_bound(&plan);
    assert_connected(&plan);
}

#[test]
fn test_not_equal_runs_after_both_sides_are_bound() {
    let fixture = PlannerFixture::new();
    let plan = fixture.plan(pattern(vec![
        Statement::var("t").label("person"),
        Statement::var("a").isa("t"),
        Statement::var("b").isa("t").neq("a"),
    ]));

    let position = plan
        .iter()
        .position(|f| matches!(f.kind(), FragmentKind::NotEqual { .. }))
        .expect("inequality is planned");
    let bound_before: BTreeSet<Variable> = plan[..position]
        .iter()
        .flat_map(|f| f.vars())
        .collect();
    assert!(bound_before.contains(&var("a")));
    assert!(bound_before.contains(&var("b")));
    assert_eq!(
        plan.iter()
            .filter(|f| matches!(f.kind(), FragmentKind::NotEqual { .. }))
            .count(),
        1
    );
    assert_dependencies_bound(&plan);
}

#[test]
fn test_distinct_castings_are_compared_after_binding() {
    let fixture = PlannerFixture::new();
    let plan = fixture.plan(employment());
    assert_dependencies_bound(&plan);
    assert_eq!(
        plan.iter()
            .filter(|f| matches!(f.kind(), FragmentKind::NotEqual { .. }))
            .count(),
        1
    );
}

#[test]
fn test_planning_is_deterministic() {
    let fixture = PlannerFixture::new();
    let first = fixture.plan(employment());
    for _ in 0..5 {
        assert_eq!(render(&fixture.plan(employment())), render(&first));
    }
}

#[test]
fn test_input_order_does_not_change_plan() {
    let fixture = PlannerFixture::new();
    let planner = fixture.planner_with(PlannerConfig::minimal());
    let label = Fragment::label(var("t"), BTreeSet::from([Label::of("person")]));
    let isa = Fragment::out_isa(var("x"), var("t"), false);
    let fragments = vec![label, isa.clone(), isa.get_inverse()];

    let forward = planner.plan_for_conjunction(fragments.clone()).unwrap();
    let mut reversed = fragments;
    reversed.reverse();
    let backward = planner.plan_for_conjunction(reversed).unwrap();
    assert_eq!(render(&forward), render(&backward));
}

#[test]
fn test_input_order_does_not_change_plan_for_payload_variants() {
    let fixture = PlannerFixture::new();
    let planner = fixture.planner_with(PlannerConfig::minimal());
    let label = Fragment::label(var("t"), BTreeSet::from([Label::of("person")]));
    let with_edges = Fragment::out_isa(var("x"), var("t"), true);
    let without_edges = Fragment::out_isa(var("x"), var("t"), false);
    let fragments = vec![
        label,
        with_edges.clone(),
        with_edges.get_inverse(),
        without_edges.clone(),
        without_edges.get_inverse(),
    ];

    let forward = planner.plan_for_conjunction(fragments.clone()).unwrap();
    let mut reversed = fragments;
    reversed.reverse();
    let backward = planner.plan_for_conjunction(reversed).unwrap();
    assert_eq!(forward, backward);
    assert_eq!(forward.len(), 3);
    assert_connected(&forward);
}

#[test]
fn test_sub_edges_of_different_depth_are_both_planned() {
    let fixture = PlannerFixture::new();
    let planner = fixture.planner();
    let compiled = planner
        .create_traversal(&pattern(vec![
            Statement::var("y").label("person"),
            Statement::var("x").sub("y").with(Property::Sub {
                super_var: var("y"),
                depth: SubDepth::Exactly(1),
            }),
        ]))
        .unwrap();
    let plan = &compiled.fragments()[0];

    let depth_of = |fragment: &Fragment| match fragment.kind() {
        FragmentKind::InSub { depth } | FragmentKind::OutSub { depth } => Some(*depth),
        _ => None,
    };
    let depths: Vec<SubDepth> = plan.iter().filter_map(depth_of).collect();
    assert_eq!(depths.len(), 2, "{:?}", render(plan));
    assert!(depths.contains(&SubDepth::Unlimited));
    assert!(depths.contains(&SubDepth::Exactly(1)));
    assert_eq!(plan.len(), 4);
    assert_connected(plan);

    let trace = compiled.trace().unwrap();
    for step in trace
        .steps
        .iter()
        .filter(|step| step.phase == PlanningPhase::Ordering)
    {
        assert!(
            step.metadata.unplaced_fragments.is_empty(),
            "appended without placement: {:?}",
            step.metadata.unplaced_fragments
        );
    }
}

#[test]
fn test_disconnected_conjunction_plans_every_component() {
    let fixture = PlannerFixture::new();
    let plan = fixture.plan(pattern(vec![
        Statement::var("t").label("person"),
        Statement::var("x").isa("t"),
        Statement::var("u").label("company"),
        Statement::var("y").isa("u"),
    ]));
    assert_eq!(plan.len(), 6);
    let labels = plan
        .iter()
        .filter(|f| matches!(f.kind(), FragmentKind::Label { .. }))
        .count();
    assert_eq!(labels, 2);
    assert_dependencies_bound(&plan);
}

#[test]
fn test_not_internal_alone_starts_its_own_component() {
    let fixture = PlannerFixture::new();
    let planner = fixture.planner_with(PlannerConfig::minimal());
    let isa = Fragment::out_isa(var("x"), var("t"), false);
    let not_internal = Fragment::not_internal(var("z"));
    let plan = planner
        .plan_for_conjunction(vec![
            not_internal.clone(),
            Fragment::label(var("t"), BTreeSet::from([Label::of("person")])),
            isa.clone(),
            isa.get_inverse(),
        ])
        .unwrap();

    assert_eq!(plan.len(), 3);
    assert_eq!(plan.last(), Some(&not_internal));
    assert_connected(&plan[..2]);

    let traversal = TraversalPlan::new(vec![plan], None)
        .graph_traversal(&fixture.concepts)
        .unwrap();
    let rendered = traversal.to_string();
    assert!(rendered.contains(".V().as(z)"), "{}", rendered);
}

#[test]
fn test_relation_type_is_inferred_from_players() {
    let fixture = PlannerFixture::new();
    let plan = fixture.plan(pattern(vec![
        Statement::var("e").rel(None, "c").rel(None, "p"),
        Statement::var("c").isa("ct"),
        Statement::var("ct").label("company"),
        Statement::var("p").isa("pt"),
        Statement::var("pt").label("employee"),
    ]));
    assert!(plan.iter().any(|f| matches!(
        f.kind(),
        FragmentKind::Label { labels } if labels.contains(&Label::of("employment"))
    )));

    let without_inference = fixture
        .planner_with(PlannerConfig::minimal())
        .create_traversal(&pattern(vec![
            Statement::var("e").rel(None, "c").rel(None, "p"),
            Statement::var("c").isa("ct"),
            Statement::var("ct").label("company"),
            Statement::var("p").isa("pt"),
            Statement::var("pt").label("employee"),
        ]))
        .unwrap();
    assert!(!without_inference.fragments()[0].iter().any(|f| matches!(
        f.kind(),
        FragmentKind::Label { labels } if labels.contains(&Label::of("employment"))
    )));
}

#[test]
fn test_empty_statistics_still_plan() {
    let fixture = PlannerFixture::empty();
    let plan = fixture.plan(employment());
    assert!(plan[0].has_fixed_fragment_cost());
    assert_connected(&plan);
}

#[test]
fn test_disjunction_plans_each_conjunction() {
    let fixture = PlannerFixture::new();
    let pattern = Pattern::new(vec![
        Conjunction::new(vec![
            Statement::var("t").label("person"),
            Statement::var("x").isa("t"),
        ]),
        Conjunction::new(vec![
            Statement::var("t").label("company"),
            Statement::var("x").isa("t"),
        ]),
    ]);
    let plan = fixture.planner().create_traversal(&pattern).unwrap();
    assert_eq!(plan.fragments().len(), 2);
    assert!(plan.to_string().contains(" } or { "));
}

#[test]
fn test_unknown_attribute_type_is_rejected() {
    let fixture = PlannerFixture::new();
    let result = fixture
        .planner()
        .create_traversal(&pattern(vec![Statement::var("x").has("salary", "s")]));
    assert!(matches!(
        result,
        Err(graphplan::PlannerError::UnknownLabel(label)) if label == "salary"
    ));
}
