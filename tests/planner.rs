use ergo_harness::axes::{Axis, State};
use ergo_harness::planner::TransformationPlanner;
use ergo_harness::types::RatingVector;

fn vector(e: u8, d: u8, s: u8) -> RatingVector {
    RatingVector::from_states([
        State::new(e).unwrap(),
        State::new(d).unwrap(),
        State::new(s).unwrap(),
    ])
}

#[test]
fn planning_to_the_current_rating_is_an_empty_plan() {
    let planner = TransformationPlanner::new();
    for states in [[0, 0, 0], [1, 2, 3], [3, 3, 3], [2, 0, 1]] {
        let v = vector(states[0], states[1], states[2]);
        let plan = planner.plan(&v, &v).unwrap();
        assert!(plan.is_empty());
    }
}

// Worst-to-best across all axes: nine steps, grouped by the default
// priority, each axis walking 0 -> 1 -> 2 -> 3.
#[test]
fn worst_to_best_walks_nine_grouped_steps() {
    let planner = TransformationPlanner::new();
    let plan = planner.plan(&vector(0, 0, 0), &vector(3, 3, 3)).unwrap();

    assert_eq!(plan.len(), 9);

    let axes: Vec<Axis> = plan.iter().map(|s| s.axis).collect();
    assert_eq!(
        axes,
        vec![
            Axis::ErrorSurface,
            Axis::ErrorSurface,
            Axis::ErrorSurface,
            Axis::DependencyFlow,
            Axis::DependencyFlow,
            Axis::DependencyFlow,
            Axis::Expressiveness,
            Axis::Expressiveness,
            Axis::Expressiveness,
        ]
    );

    for group in plan.steps.chunks(3) {
        let from: Vec<u8> = group.iter().map(|s| s.from.index()).collect();
        let to: Vec<u8> = group.iter().map(|s| s.to.index()).collect();
        assert_eq!(from, vec![0, 1, 2]);
        assert_eq!(to, vec![1, 2, 3]);
    }
}

#[test]
fn every_step_moves_exactly_one_axis_by_exactly_one_state() {
    let planner = TransformationPlanner::new();
    for (current, target) in [
        (vector(0, 0, 0), vector(3, 3, 3)),
        (vector(2, 0, 3), vector(0, 3, 1)),
        (vector(1, 1, 1), vector(2, 2, 2)),
    ] {
        let plan = planner.plan(&current, &target).unwrap();
        for step in plan.iter() {
            let delta = (i16::from(step.to.index()) - i16::from(step.from.index())).abs();
            assert_eq!(delta, 1, "step {step:?} skips a state");
        }
    }
}

#[test]
fn within_an_axis_steps_chain_monotonically_toward_the_target() {
    let planner = TransformationPlanner::new();
    let plan = planner.plan(&vector(3, 0, 2), &vector(0, 2, 2)).unwrap();

    for axis in Axis::ALL {
        let steps: Vec<_> = plan.iter().filter(|s| s.axis == axis).collect();
        for pair in steps.windows(2) {
            assert_eq!(pair[0].to, pair[1].from, "chain broken on {axis}");
        }
    }
}

#[test]
fn default_priority_orders_error_surface_before_flow_before_expressiveness() {
    let planner = TransformationPlanner::new();
    let plan = planner.plan(&vector(0, 0, 0), &vector(1, 1, 1)).unwrap();
    let axes: Vec<Axis> = plan.iter().map(|s| s.axis).collect();
    assert_eq!(
        axes,
        vec![Axis::ErrorSurface, Axis::DependencyFlow, Axis::Expressiveness]
    );
}

#[test]
fn callers_may_front_load_expressiveness() {
    let planner = TransformationPlanner::new();
    let plan = planner
        .plan_with_priority(
            &vector(0, 0, 0),
            &vector(1, 1, 1),
            [Axis::Expressiveness, Axis::ErrorSurface, Axis::DependencyFlow],
        )
        .unwrap();
    let axes: Vec<Axis> = plan.iter().map(|s| s.axis).collect();
    assert_eq!(
        axes,
        vec![Axis::Expressiveness, Axis::ErrorSurface, Axis::DependencyFlow]
    );
}

#[test]
fn every_step_carries_a_rationale() {
    let planner = TransformationPlanner::new();
    let plan = planner.plan(&vector(0, 3, 1), &vector(3, 0, 3)).unwrap();
    assert!(!plan.is_empty());
    for step in plan.iter() {
        assert!(!step.rationale.is_empty());
    }
}

#[test]
fn plan_serialization_lists_symbol_records_in_order() {
    let planner = TransformationPlanner::new();
    let plan = planner.plan(&vector(0, 0, 0), &vector(0, 0, 2)).unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["from_symbol"], "S");
    assert_eq!(steps[0]["to_symbol"], "A");
    assert_eq!(steps[1]["from_symbol"], "A");
    assert_eq!(steps[1]["to_symbol"], "G");
}
