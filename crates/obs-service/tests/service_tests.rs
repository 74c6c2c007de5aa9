//! End-to-end service behaviour over the sample catalog.

use std::collections::HashMap;
use std::sync::Arc;

use obs_common::{Dimension, ObsError, QueryOptions};
use obs_query::DbQuery;
use obs_service::{DaoConfig, ObservationService};
use obs_values::ValueData;
use storage::MemoryCatalog;
use test_utils::{assert_decimal_str, ids, time, SAMPLE_CATALOG, SAMPLE_NO_DATA};

fn service() -> ObservationService {
    let catalog = MemoryCatalog::from_yaml_str(SAMPLE_CATALOG).expect("sample catalog parses");
    let config = DaoConfig {
        no_data_values: vec![SAMPLE_NO_DATA.to_string()],
        ..DaoConfig::default()
    };
    ObservationService::new(config, Arc::new(catalog))
}

fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn quantity(value: &Option<ValueData>) -> String {
    match value {
        Some(ValueData::Quantity(d)) => d.to_string(),
        other => panic!("expected quantity, got {:?}", other),
    }
}

#[test]
fn test_quantity_values_are_rounded_half_up() {
    let data = service()
        .get_data(ids::TEMPERATURE_DATASET, &DbQuery::default())
        .unwrap();

    assert_eq!(data.values.len(), 4);
    assert_eq!(quantity(&data.values[0].value), "10.00");
    assert_eq!(quantity(&data.values[1].value), "12.35");
    assert!(data.values[2].value.is_none(), "sentinel becomes null");
    assert!(data.values[2].timestamp.is_some());
    assert_eq!(quantity(&data.values[3].value), "8.50");
}

#[test]
fn test_values_are_ordered_by_sampling_end() {
    let data = service()
        .get_data(ids::TEMPERATURE_DATASET, &DbQuery::default())
        .unwrap();
    let times: Vec<_> = data.values.iter().map(|v| v.timestamp).collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}

#[test]
fn test_timespan_limits_data() {
    let service = service();
    let query = service
        .query_from_params(&params(&[("timespan", time::FIRST_TWO_HOURS)]))
        .unwrap();
    let data = service.get_data(ids::TEMPERATURE_DATASET, &query).unwrap();
    assert_eq!(data.values.len(), 2);
}

#[test]
fn test_expanded_output_reports_distinct_result_time() {
    let service = service();
    let query = service
        .query_from_params(&params(&[("expanded", "true"), ("showTimeIntervals", "true")]))
        .unwrap();
    let data = service.get_data(ids::TEMPERATURE_DATASET, &query).unwrap();

    assert!(data.values[0].timestart.is_some());
    assert!(data.values[0].result_time.is_none());
    assert!(data.values[1].result_time.is_some());
    assert!(data.values[3].result_time.is_none(), "equal to sampling end");
}

#[test]
fn test_mobile_dataset_carries_geometry() {
    let data = service()
        .get_data(ids::SHIP_DATASET, &DbQuery::default())
        .unwrap();
    assert!(data.values.iter().all(|v| v.geometry.is_some()));
    assert_eq!(quantity(&data.values[1].value), "6.2");
}

#[test]
fn test_stationary_dataset_omits_geometry() {
    let data = service()
        .get_data(ids::WEATHER_DATASET, &DbQuery::default())
        .unwrap();
    assert!(data.values.iter().all(|v| v.geometry.is_none()));
    assert_eq!(data.values[0].value, Some(ValueData::Text("sunny".to_string())));
}

#[test]
fn test_unknown_value_kind_is_reported_for_data() {
    let err = service()
        .get_data(ids::BLOB_DATASET, &DbQuery::default())
        .unwrap_err();
    assert!(matches!(err, ObsError::UnknownType(ref key) if key == "blob"));
    assert!(err.is_recoverable());
}

#[test]
fn test_missing_dataset() {
    let err = service().get_data(42, &DbQuery::default()).unwrap_err();
    assert!(matches!(err, ObsError::NotFound(_)));
}

#[test]
fn test_hidden_datasets_are_not_served() {
    let service = service();
    for id in [ids::HIDDEN_DATASET, ids::FEATURELESS_DATASET] {
        let err = service.get_data(id, &DbQuery::default()).unwrap_err();
        assert!(matches!(err, ObsError::NotFound(_)), "data of dataset {}", id);

        let err = service.dataset_extras(id, &DbQuery::default()).unwrap_err();
        assert_eq!(err.http_status_code(), 404, "extras of dataset {}", id);
    }
}

#[test]
fn test_find_datasets_labels() {
    let service = service();
    let query = service
        .query_from_params(&params(&[("phenomena", "1"), ("locale", "de")]))
        .unwrap();
    let datasets = service.find_datasets(&query).unwrap();

    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0].label, "Lufttemperatur Thermometer, Muenster");
    assert_eq!(datasets[0].uom.as_deref(), Some("degC"));
    assert_eq!(datasets[1].dataset_type, "trajectory");
}

#[test]
fn test_find_datasets_with_unmatched_phenomenon_is_empty() {
    let service = service();
    let query = service
        .query_from_params(&params(&[("phenomena", &ids::WATER_LEVEL.to_string())]))
        .unwrap();
    assert!(service.find_datasets(&query).unwrap().is_empty());
}

#[test]
fn test_dataset_extras() {
    let service = service();
    let query = service
        .query_from_params(&params(&[("timespan", time::FIRST_TWO_HOURS)]))
        .unwrap();
    let extras = service
        .dataset_extras(ids::TEMPERATURE_DATASET, &query)
        .unwrap();

    assert_eq!(extras.result_times.as_ref().map(|t| t.len()), Some(1));
    let aggregation = extras.aggregation.expect("numeric aggregation");
    assert_eq!(aggregation.count, Some(2));
    assert_decimal_str!(aggregation.min.unwrap(), "10.00");
    assert_decimal_str!(aggregation.max.unwrap(), "12.35");
    assert_decimal_str!(aggregation.avg.unwrap(), "11.17");
}

#[test]
fn test_extras_of_unknown_type_degrade() {
    let extras = service()
        .dataset_extras(ids::BLOB_DATASET, &DbQuery::default())
        .unwrap();
    assert!(extras.aggregation.is_none());
    assert!(extras.result_times.is_none());
}

#[test]
fn test_extras_of_text_dataset_count_only() {
    let extras = service()
        .dataset_extras(ids::WEATHER_DATASET, &DbQuery::default())
        .unwrap();
    let json = serde_json::to_value(&extras).unwrap();
    assert_eq!(json["aggregation"], serde_json::json!({ "count": 2 }));
}

#[test]
fn test_hierarchical_extras_for_station_platform() {
    let extras = service()
        .hierarchical_extras(ids::STATION_PLATFORM, &QueryOptions::default())
        .unwrap();

    let procedures = &extras["procedures"];
    let domain_ids: Vec<_> = procedures.iter().map(|p| p.domain_id.as_str()).collect();
    assert_eq!(domain_ids, vec!["network", "array", "observer"]);
}

#[test]
fn test_hierarchical_extras_root_reports_itself() {
    let extras = service()
        .hierarchical_extras(ids::SHIP_PLATFORM, &QueryOptions::default())
        .unwrap();
    let procedures = &extras["procedures"];
    assert_eq!(procedures.len(), 1);
    assert_eq!(
        procedures.iter().next().unwrap().id,
        ids::OBSERVER.to_string()
    );
}

#[test]
fn test_hierarchical_extras_unknown_platform() {
    let err = service()
        .hierarchical_extras(99, &QueryOptions::default())
        .unwrap_err();
    assert!(matches!(err, ObsError::NotFound(_)));
}

#[test]
fn test_ancestors_reach_roots() {
    let service = service();
    let catalog = MemoryCatalog::from_yaml_str(SAMPLE_CATALOG).unwrap();
    let thermometer = storage::EntityRepository::find_entity(
        &catalog,
        Dimension::Procedure,
        ids::THERMOMETER,
    )
    .unwrap();
    let ancestors = service
        .hierarchy()
        .ancestors_of(Dimension::Procedure, &thermometer)
        .unwrap();
    let found: Vec<_> = ancestors.iter().map(|a| a.id).collect();
    assert_eq!(found, vec![ids::NETWORK, ids::ARRAY]);
}

#[test]
fn test_reachable_procedures() {
    let reachable = service()
        .reachable(Dimension::Procedure, &DbQuery::default())
        .unwrap();
    let domain_ids: Vec<_> = reachable.iter().map(|p| p.domain_id.as_str()).collect();
    assert_eq!(domain_ids, vec!["thermometer", "observer"]);
}

#[test]
fn test_known_types() {
    let service = service();
    let types: Vec<_> = service.known_types().iter().cloned().collect();
    assert_eq!(types, vec!["count", "profile", "quantity", "text"]);
}

#[test]
fn test_config_defaults_seed_query_options() {
    let catalog = MemoryCatalog::from_yaml_str(SAMPLE_CATALOG).unwrap();
    let config = DaoConfig {
        href_base: Some("http://localhost/api".to_string()),
        ..DaoConfig::default()
    };
    let service = ObservationService::new(config, Arc::new(catalog));
    let query = service.query_from_params(&HashMap::new()).unwrap();
    let datasets = service.find_datasets(&query).unwrap();
    assert_eq!(
        datasets[0].href.as_deref(),
        Some("http://localhost/api/datasets/1")
    );
}
