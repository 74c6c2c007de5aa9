//! Sample catalog used by storage, service and CLI tests.
//!
//! Contents:
//!
//! | dataset | kinds                       | notes                                   |
//! |---------|-----------------------------|-----------------------------------------|
//! | 1       | timeseries/simple/quantity  | Muenster air temperature, 2 decimals    |
//! | 2       | timeseries/simple/text      | Bonn weather state                      |
//! | 3       | trajectory/simple/quantity  | ship temperature, mobile                |
//! | 4       | timeseries/simple/quantity  | unpublished                             |
//! | 5       | timeseries/simple/blob      | no converter registered for "blob"      |
//! | 6       | timeseries/simple/count     | Muenster rain gauge tips, no feature    |
//!
//! Procedures form the hierarchy `10 <- 12 -> 11`; 13 has no parent.

/// Sentinel configured for the sample catalog.
pub const SAMPLE_NO_DATA: &str = "-9999";

pub mod ids {
    pub const TEMPERATURE_DATASET: i64 = 1;
    pub const WEATHER_DATASET: i64 = 2;
    pub const SHIP_DATASET: i64 = 3;
    pub const HIDDEN_DATASET: i64 = 4;
    pub const BLOB_DATASET: i64 = 5;
    pub const FEATURELESS_DATASET: i64 = 6;

    pub const AIR_TEMPERATURE: i64 = 1;
    pub const WEATHER_STATE: i64 = 2;
    pub const WATER_LEVEL: i64 = 3;

    pub const NETWORK: i64 = 10;
    pub const ARRAY: i64 = 11;
    pub const THERMOMETER: i64 = 12;
    pub const OBSERVER: i64 = 13;

    pub const STATION_PLATFORM: i64 = 1;
    pub const SHIP_PLATFORM: i64 = 2;
}

pub const SAMPLE_CATALOG: &str = r#"
offerings:
  - id: 1
    identifier: off-temperature
    name: Temperature
  - id: 2
    identifier: off-weather
    name: Weather

phenomena:
  - id: 1
    identifier: air_temperature
    name: Air Temperature
    translations:
      de: Lufttemperatur
  - id: 2
    identifier: weather_state
    name: Weather State
  - id: 3
    identifier: water_level
    name: Water Level

procedures:
  - id: 10
    identifier: network
    name: Sensor Network
  - id: 11
    identifier: array
    name: Sensor Array
  - id: 12
    identifier: thermometer
    name: Thermometer
    parents: [10, 11]
  - id: 13
    identifier: observer
    name: Human Observer

features:
  - id: 1
    identifier: station-muenster
    name: Muenster
    geometry:
      type: Point
      coordinates: { x: 7.6, y: 51.9 }
  - id: 2
    identifier: station-bonn
    name: Bonn
    geometry:
      type: Point
      coordinates: { x: 7.1, y: 50.7 }

categories:
  - id: 1
    identifier: meteorology
    name: Meteorology

platforms:
  - id: 1
    identifier: station
    name: Weather Station
  - id: 2
    identifier: ship
    name: Research Vessel

datasets:
  - id: 1
    identifier: muenster-air-temperature
    value_kind: quantity
    phenomenon: 1
    procedure: 12
    offering: 1
    category: 1
    platform: 1
    feature: 1
    published: true
    number_of_decimals: 2
    unit: degC
  - id: 2
    identifier: bonn-weather
    value_kind: text
    phenomenon: 2
    procedure: 13
    offering: 2
    category: 1
    platform: 1
    feature: 2
    published: true
  - id: 3
    identifier: ship-temperature
    dataset_kind: trajectory
    value_kind: quantity
    phenomenon: 1
    procedure: 13
    offering: 1
    category: 1
    platform: 2
    feature: 2
    published: true
    mobile: true
    number_of_decimals: 1
  - id: 4
    identifier: hidden-temperature
    value_kind: quantity
    phenomenon: 1
    procedure: 12
    offering: 1
    category: 1
    platform: 1
    feature: 1
    published: false
  - id: 5
    identifier: muenster-blob
    value_kind: blob
    phenomenon: 2
    procedure: 12
    offering: 2
    category: 1
    platform: 1
    feature: 1
    published: true
  - id: 6
    identifier: muenster-rain-gauge
    value_kind: count
    phenomenon: 2
    procedure: 10
    offering: 2
    category: 1
    platform: 1
    published: true

observations:
  - id: 100
    dataset: 1
    sampling_time_start: 2024-01-15T11:00:00Z
    sampling_time_end: 2024-01-15T12:00:00Z
    value: { kind: quantity, value: 9.995 }
  - id: 101
    dataset: 1
    sampling_time_start: 2024-01-15T12:00:00Z
    sampling_time_end: 2024-01-15T13:00:00Z
    result_time: 2024-01-15T13:30:00Z
    value: { kind: quantity, value: 12.345 }
  - id: 102
    dataset: 1
    sampling_time_start: 2024-01-15T13:00:00Z
    sampling_time_end: 2024-01-15T14:00:00Z
    result_time: 2024-01-15T13:30:00Z
    value: { kind: quantity, value: -9999.0 }
  - id: 103
    dataset: 1
    sampling_time_start: 2024-01-15T14:00:00Z
    sampling_time_end: 2024-01-15T15:00:00Z
    result_time: 2024-01-15T15:00:00Z
    value: { kind: quantity, value: 8.5 }
  - id: 200
    dataset: 2
    sampling_time_end: 2024-01-15T12:00:00Z
    value: { kind: text, value: sunny }
  - id: 201
    dataset: 2
    sampling_time_end: 2024-01-15T13:00:00Z
    value: { kind: text, value: cloudy }
  - id: 300
    dataset: 3
    sampling_time_end: 2024-01-15T12:00:00Z
    geometry:
      type: Point
      coordinates: { x: 3.2, y: 54.1 }
    value: { kind: quantity, value: 6.04 }
  - id: 301
    dataset: 3
    sampling_time_end: 2024-01-15T12:10:00Z
    geometry:
      type: Point
      coordinates: { x: 3.3, y: 54.2 }
    value: { kind: quantity, value: 6.15 }
  - id: 500
    dataset: 5
    sampling_time_end: 2024-01-15T12:00:00Z
    value: { kind: text, value: opaque }
"#;
