//! Type dispatch and conversion through the registry.

use std::sync::Arc;

use obs_common::{ObsError, QueryOptions, RawValue};
use obs_values::{NoDataValues, TypeDispatchRegistry, ValueData, ValueKind};
use test_utils::{assert_decimal_str, quantity_series, series, DatasetBuilder};

fn registry() -> TypeDispatchRegistry {
    TypeDispatchRegistry::new(Arc::new(NoDataValues::new(["-9999"])))
}

#[test]
fn test_resolution_is_cached_by_identity() {
    let registry = registry();
    let first = registry.resolve("timeseries", "simple", "quantity").unwrap();
    let second = registry.resolve("timeseries", "simple", "quantity").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.cached(), 1);
}

#[test]
fn test_composite_keys_resolve_to_expected_kinds() {
    let registry = registry();
    let cases = [
        (("trajectory", "simple", "quantity"), ValueKind::Quantity),
        (("timeseries", "complex", "text"), ValueKind::Text),
        (("timeseries", "simple", "count"), ValueKind::Count),
        (("profile", "profile", "quantity"), ValueKind::Profile),
    ];
    for ((dataset_kind, observation_kind, value_kind), expected) in cases {
        let converter = registry
            .resolve(dataset_kind, observation_kind, value_kind)
            .unwrap();
        assert_eq!(converter.value_kind(), expected, "{}", value_kind);
    }
}

#[test]
fn test_unknown_type() {
    let registry = registry();
    let err = registry.resolve("timeseries", "complex", "quantity").unwrap_err();
    assert!(matches!(err, ObsError::UnknownType(ref key) if key == "quantity-complex"));
    assert!(!registry.is_known("timeseries", "complex", "quantity"));
    assert!(registry.is_known("trajectory", "", "count"));
    assert_eq!(registry.cached(), 0);
}

#[test]
fn test_known_types_are_base_kinds() {
    let registry = registry();
    let types: Vec<_> = registry.known_types().iter().map(String::as_str).collect();
    assert_eq!(types, vec!["count", "profile", "quantity", "text"]);
    // computed once
    assert!(std::ptr::eq(registry.known_types(), registry.known_types()));
}

#[test]
fn test_concurrent_resolution_yields_one_instance() {
    let registry = registry();
    let resolved: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| registry.resolve("timeseries", "simple", "text").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(resolved.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(registry.cached(), 1);
}

#[test]
fn test_end_to_end_half_up_rounding() {
    let registry = registry();
    let dataset = DatasetBuilder::new(1).decimals(2).build();
    let converter = registry.resolve_for(&dataset).unwrap();
    let observations = quantity_series(1, &[9.995, 12.345, -9999.0]);

    let values: Vec<_> = observations
        .iter()
        .map(|o| {
            converter
                .convert(Some(o), &dataset, &QueryOptions::default())
                .unwrap()
                .value
        })
        .collect();

    match &values[0] {
        Some(ValueData::Quantity(d)) => assert_decimal_str!(d, "10.00"),
        other => panic!("expected quantity, got {:?}", other),
    }
    match &values[1] {
        Some(ValueData::Quantity(d)) => assert_decimal_str!(d, "12.35"),
        other => panic!("expected quantity, got {:?}", other),
    }
    assert!(values[2].is_none());
}

#[test]
fn test_unrounded_without_decimals() {
    let registry = registry();
    let dataset = DatasetBuilder::new(1).build();
    let converter = registry.resolve_for(&dataset).unwrap();
    let obs = &quantity_series(1, &[12.345])[0];
    let value = converter
        .convert(Some(obs), &dataset, &QueryOptions::default())
        .unwrap()
        .value;
    assert_eq!(value.and_then(|v| v.as_decimal()).unwrap().to_string(), "12.345");
}

#[test]
fn test_count_sentinel_and_mismatch() {
    let registry = registry();
    let dataset = DatasetBuilder::new(1).value_kind("count").build();
    let converter = registry.resolve_for(&dataset).unwrap();
    let observations = series(
        1,
        [
            RawValue::Count(3),
            RawValue::Count(-9999),
            RawValue::Text("x".to_string()),
        ],
    );

    let values: Vec<_> = observations
        .iter()
        .map(|o| {
            converter
                .convert(Some(o), &dataset, &QueryOptions::default())
                .unwrap()
                .value
        })
        .collect();
    assert_eq!(values[0], Some(ValueData::Count(3)));
    assert!(values[1].is_none());
    assert!(values[2].is_none());
}

#[test]
fn test_text_sentinel_is_string_equality() {
    let registry = TypeDispatchRegistry::new(Arc::new(NoDataValues::new(["n/a"])));
    let dataset = DatasetBuilder::new(1).value_kind("text").build();
    let converter = registry.resolve_for(&dataset).unwrap();
    let observations = series(
        1,
        [RawValue::Text("n/a".to_string()), RawValue::Text("N/A".to_string())],
    );

    let first = converter
        .convert(Some(&observations[0]), &dataset, &QueryOptions::default())
        .unwrap();
    let second = converter
        .convert(Some(&observations[1]), &dataset, &QueryOptions::default())
        .unwrap();
    assert!(first.value.is_none());
    assert_eq!(second.value, Some(ValueData::Text("N/A".to_string())));
}
