//! Property-based tests for plugin execution order
//!
//! For one event, enabled plugins run by priority descending and, among
//! equal priorities, in ascending registration order.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use routeforge_config::PluginSettings;
use routeforge_plugins::*;

struct Probe {
    name: String,
    trail: Arc<Mutex<Vec<String>>>,
}

impl Plugin for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn execute(&self, _ctx: &mut PluginContext) -> Result<()> {
        self.trail.lock().unwrap().push(self.name.clone());
        Ok(())
    }

    fn supported_events(&self) -> Vec<LifecycleEvent> {
        vec![LifecycleEvent::BeforeGeneration]
    }
}

fn priorities_strategy() -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(prop_oneof![Just(0), Just(5), Just(10), -3i32..20], 1..12)
}

fn expected_order(priorities: &[i32]) -> Vec<String> {
    let mut indexed: Vec<(usize, i32)> = priorities.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    indexed.into_iter().map(|(i, _)| format!("p{}", i)).collect()
}

#[test]
fn test_priority_ten_runs_before_five() {
    let trail = Arc::new(Mutex::new(Vec::new()));
    let manager = PluginManager::new(&PluginSettings::default());
    for (name, priority) in [("low", 5), ("high", 10)] {
        manager
            .register_with_priority(
                Arc::new(Probe {
                    name: name.to_string(),
                    trail: Arc::clone(&trail),
                }),
                priority,
            )
            .unwrap();
    }

    let mut ctx = PluginContext::new(LifecycleEvent::BeforeGeneration);
    manager
        .dispatch(LifecycleEvent::BeforeGeneration, &mut ctx)
        .unwrap();
    assert_eq!(*trail.lock().unwrap(), vec!["high", "low"]);
}

#[test]
fn test_equal_priority_keeps_registration_order() {
    let trail = Arc::new(Mutex::new(Vec::new()));
    let manager = PluginManager::new(&PluginSettings::default());
    for name in ["zulu", "alpha", "mike"] {
        manager
            .register(Arc::new(Probe {
                name: name.to_string(),
                trail: Arc::clone(&trail),
            }))
            .unwrap();
    }

    let mut ctx = PluginContext::new(LifecycleEvent::BeforeGeneration);
    manager
        .dispatch(LifecycleEvent::BeforeGeneration, &mut ctx)
        .unwrap();
    assert_eq!(*trail.lock().unwrap(), vec!["zulu", "alpha", "mike"]);
}

proptest! {
    #[test]
    fn prop_dispatch_follows_priority_then_order(priorities in priorities_strategy()) {
        let trail = Arc::new(Mutex::new(Vec::new()));
        let manager = PluginManager::new(&PluginSettings::default());
        for (i, priority) in priorities.iter().enumerate() {
            manager
                .register_with_priority(
                    Arc::new(Probe { name: format!("p{}", i), trail: Arc::clone(&trail) }),
                    *priority,
                )
                .unwrap();
        }

        let expected = expected_order(&priorities);
        prop_assert_eq!(
            manager.execution_order(LifecycleEvent::BeforeGeneration).unwrap(),
            expected.clone()
        );

        let mut ctx = PluginContext::new(LifecycleEvent::BeforeGeneration);
        let report = manager.dispatch(LifecycleEvent::BeforeGeneration, &mut ctx).unwrap();
        prop_assert_eq!(&report.executed, &expected);
        prop_assert_eq!(trail.lock().unwrap().clone(), expected);
    }

    #[test]
    fn prop_dispatch_is_reproducible(priorities in priorities_strategy()) {
        let run = || {
            let trail = Arc::new(Mutex::new(Vec::new()));
            let manager = PluginManager::new(&PluginSettings::default());
            for (i, priority) in priorities.iter().enumerate() {
                manager
                    .register_with_priority(
                        Arc::new(Probe { name: format!("p{}", i), trail: Arc::clone(&trail) }),
                        *priority,
                    )
                    .unwrap();
            }
            let mut ctx = PluginContext::new(LifecycleEvent::BeforeGeneration);
            manager.dispatch(LifecycleEvent::BeforeGeneration, &mut ctx).unwrap();
            let order = trail.lock().unwrap().clone();
            order
        };
        prop_assert_eq!(run(), run());
    }
}
