//! Social-network schema fixture

use graphplan::concept::{InMemoryConceptManager, InMemoryStatistics, ValueType};
use graphplan::{Pattern, PlannerConfig, TraversalPlanner};

pub struct PlannerFixture {
    pub concepts: InMemoryConceptManager,
    pub statistics: InMemoryStatistics,
}

impl PlannerFixture {
    /// Schema with instance counts
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            concepts: social_network(),
            statistics: InMemoryStatistics::new()
                .with_count("person", 1_000)
                .with_count("employee", 200)
                .with_count("company", 50)
                .with_count("name", 1_050)
                .with_count("age", 900)
                .with_count("@has-name", 1_050)
                .with_count("@has-age", 900)
                .with_count("employment", 200)
                .with_count("friendship", 3_000),
        }
    }

    /// Schema with no instances at all
    pub fn empty() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            concepts: social_network(),
            statistics: InMemoryStatistics::new(),
        }
    }

    pub fn planner(&self) -> TraversalPlanner<'_> {
        self.planner_with(PlannerConfig::default())
    }

    pub fn planner_with(&self, config: PlannerConfig) -> TraversalPlanner<'_> {
        TraversalPlanner::new(&self.concepts, &self.statistics, config)
    }

    /// Compile `pattern` and return its single conjunction plan
    pub fn plan(&self, pattern: Pattern) -> Vec<graphplan::Fragment> {
        let plan = self
            .planner()
            .create_traversal(&pattern)
            .expect("planning failed");
        assert_eq!(plan.fragments().len(), 1);
        plan.fragments()[0].clone()
    }
}

pub fn social_network() -> InMemoryConceptManager {
    InMemoryConceptManager::new()
        .with_entity_type("person")
        .with_entity_type("employee")
        .with_supertype("employee", "person")
        .with_entity_type("company")
        .with_attribute_type("name", ValueType::String)
        .with_attribute_type("age", ValueType::Long)
        .with_has("person", "name")
        .with_has("person", "age")
        .with_has("company", "name")
        .with_relation_type("employment", &["employer", "employee-role"])
        .with_relation_type("friendship", &["friend"])
        .with_plays("company", "employer")
        .with_plays("employee", "employee-role")
        .with_plays("person", "friend")
}
