//! Property tests for the coordinate validator

use fencekit_core::{validate, Coordinate};
use proptest::prelude::*;
use serde_json::{json, Value};

fn raw_number() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-400.0f64..400.0).prop_map(|n| json!(n)),
        (-400i64..400).prop_map(|n| json!(n)),
        (-400.0f64..400.0).prop_map(|n| json!(n.to_string())),
        Just(json!("NaN")),
        Just(json!("bad")),
        Just(Value::Null),
    ]
}

fn raw_point() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (raw_number(), raw_number()).prop_map(|(a, b)| json!([a, b])),
        1 => (raw_number(), raw_number()).prop_map(|(a, b)| json!({"lng": a, "lat": b})),
        1 => raw_number().prop_map(|a| json!([a])),
        1 => (raw_number(), raw_number(), raw_number()).prop_map(|(a, b, c)| json!([a, b, c])),
        1 => Just(json!("10,10")),
    ]
}

fn raw_points() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(raw_point(), 0..24)
}

proptest! {
    #[test]
    fn validate_is_idempotent(raw in raw_points()) {
        let once = validate(&raw);
        let twice = validate(&once.to_values());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn validated_points_are_in_range(raw in raw_points()) {
        for c in validate(&raw).iter() {
            prop_assert!(c.longitude().is_finite() && c.latitude().is_finite());
            prop_assert!(c.longitude().abs() <= Coordinate::MAX_LONGITUDE);
            prop_assert!(c.latitude().abs() <= Coordinate::MAX_LATITUDE);
        }
    }

    #[test]
    fn validate_preserves_relative_order(raw in raw_points()) {
        let ring = validate(&raw);
        // Each surviving point must be found in the input after the previous one.
        let mut cursor = 0usize;
        for c in ring.iter() {
            let found = raw[cursor..]
                .iter()
                .position(|entry| fencekit_core::coerce_point(entry) == Some(*c));
            prop_assert!(found.is_some());
            cursor += found.unwrap_or(0) + 1;
        }
    }

    #[test]
    fn validated_ring_has_no_duplicates(raw in raw_points()) {
        let ring = validate(&raw);
        let points = ring.points();
        for (i, a) in points.iter().enumerate() {
            prop_assert!(!points[i + 1..].contains(a));
        }
    }
}
