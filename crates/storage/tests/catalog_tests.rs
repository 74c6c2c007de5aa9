//! Query composition evaluated against the sample catalog.

use std::collections::HashMap;

use obs_common::{Dimension, Geometry, Point};
use obs_query::{DbQuery, FilterComposer};
use storage::{DatasetRepository, EntityRepository, MemoryCatalog, ObservationRepository};
use test_utils::{bbox, entity, ids, time, DatasetBuilder, SAMPLE_CATALOG};

fn catalog() -> MemoryCatalog {
    MemoryCatalog::from_yaml_str(SAMPLE_CATALOG).expect("sample catalog parses")
}

fn query(pairs: &[(&str, &str)]) -> DbQuery {
    let params: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    DbQuery::from_params(&params).expect("valid query")
}

fn dataset_ids(catalog: &MemoryCatalog, query: &DbQuery) -> Vec<i64> {
    catalog
        .find_datasets(&FilterComposer::match_filters(query))
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect()
}

#[test]
fn test_empty_query_returns_visible_datasets() {
    let catalog = catalog();
    assert_eq!(
        dataset_ids(&catalog, &DbQuery::default()),
        vec![
            ids::TEMPERATURE_DATASET,
            ids::WEATHER_DATASET,
            ids::SHIP_DATASET,
            ids::BLOB_DATASET
        ]
    );
}

#[test]
fn test_unmatched_phenomenon_yields_empty_result() {
    let catalog = catalog();
    let q = query(&[("phenomena", &ids::WATER_LEVEL.to_string())]);
    assert!(dataset_ids(&catalog, &q).is_empty());
}

#[test]
fn test_malformed_identifier_yields_empty_result() {
    let catalog = catalog();
    let q = query(&[("phenomena", "1,temperature")]);
    assert!(dataset_ids(&catalog, &q).is_empty());
}

#[test]
fn test_domain_identifiers() {
    let catalog = catalog();
    let q = query(&[("phenomena", "air_temperature"), ("matchDomainIds", "true")]);
    assert_eq!(
        dataset_ids(&catalog, &q),
        vec![ids::TEMPERATURE_DATASET, ids::SHIP_DATASET]
    );
}

#[test]
fn test_bbox_filters_by_feature_geometry() {
    let catalog = catalog();
    assert_eq!(
        dataset_ids(&catalog, &query(&[("bbox", bbox::MUENSTER)])),
        vec![ids::TEMPERATURE_DATASET, ids::BLOB_DATASET]
    );
    assert!(dataset_ids(&catalog, &query(&[("bbox", bbox::PACIFIC)])).is_empty());
    assert_eq!(
        dataset_ids(&catalog, &query(&[("bbox", bbox::NRW)])),
        vec![
            ids::TEMPERATURE_DATASET,
            ids::WEATHER_DATASET,
            ids::SHIP_DATASET,
            ids::BLOB_DATASET
        ]
    );
}

#[test]
fn test_value_and_dataset_types() {
    let catalog = catalog();
    assert_eq!(
        dataset_ids(&catalog, &query(&[("valueTypes", "text")])),
        vec![ids::WEATHER_DATASET]
    );
    assert_eq!(
        dataset_ids(&catalog, &query(&[("datasetTypes", "trajectory")])),
        vec![ids::SHIP_DATASET]
    );
}

#[test]
fn test_reachable_offerings_under_phenomenon_filter() {
    let catalog = catalog();
    let q = query(&[("phenomena", &ids::WEATHER_STATE.to_string())]);
    let offerings = catalog
        .find_entities(
            Dimension::Offering,
            &FilterComposer::match_reachable(Dimension::Offering, &q),
        )
        .unwrap();
    let identifiers: Vec<_> = offerings.iter().map(|o| o.identifier.as_str()).collect();
    assert_eq!(identifiers, vec!["off-weather"]);
}

#[test]
fn test_reachable_phenomena_exclude_unused() {
    let catalog = catalog();
    let phenomena = catalog
        .find_entities(
            Dimension::Phenomenon,
            &FilterComposer::match_reachable(Dimension::Phenomenon, &DbQuery::default()),
        )
        .unwrap();
    assert!(phenomena.iter().all(|p| p.id != ids::WATER_LEVEL));
    assert_eq!(phenomena.len(), 2);
}

#[test]
fn test_timespan_restricts_observations() {
    let catalog = catalog();
    let dataset = catalog.find_dataset(ids::TEMPERATURE_DATASET).unwrap();
    let q = query(&[("timespan", time::FIRST_TWO_HOURS)]);
    let filter = FilterComposer::match_observations(&q);
    assert_eq!(catalog.count_observations(&dataset, &filter).unwrap(), 2);
}

#[test]
fn test_result_times_are_deduplicated() {
    let catalog = catalog();
    let dataset = catalog.find_dataset(ids::TEMPERATURE_DATASET).unwrap();
    let times = catalog.distinct_result_times(&dataset).unwrap();
    assert_eq!(times.len(), 1);
}

#[test]
fn test_bbox_follows_line_feature_geometry() {
    let river = entity(1, "river-gauge", "River Gauge").with_geometry(Geometry::LineString(vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(10.0, 10.0),
    ]));
    let catalog = MemoryCatalog::new()
        .with_entity(Dimension::Feature, river)
        .with_dataset(DatasetBuilder::new(1).build());

    // inside the line's bounds but away from the line itself
    assert!(dataset_ids(&catalog, &query(&[("bbox", "1,8,2,9")])).is_empty());
    assert_eq!(dataset_ids(&catalog, &query(&[("bbox", "9,4,11,5")])), vec![1]);
    assert_eq!(dataset_ids(&catalog, &query(&[("bbox", bbox::GLOBAL)])), vec![1]);
}
