//! Observation CLI
//!
//! Runs dataset, data and extras queries against a YAML catalog and prints
//! the results as JSON.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use obs_common::{Dimension, EntityId};
use obs_service::{DaoConfig, ObservationService};
use storage::MemoryCatalog;

/// Observation CLI
#[derive(Parser, Debug)]
#[command(name = "obs-cli")]
#[command(about = "Query observation datasets from a YAML catalog")]
struct Args {
    /// Catalog file with entities, datasets and observations
    #[arg(short, long, env = "OBS_CATALOG")]
    catalog: PathBuf,

    /// Service configuration file
    #[arg(long, default_value = "config/obs.yaml", env = "OBS_CONFIG")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List datasets matching the filter parameters
    Datasets {
        /// Query parameters as key=value, e.g. phenomena=1,2
        #[arg(value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Converted observations of one dataset
    Data {
        dataset: EntityId,
        #[arg(value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Result times and aggregates of one dataset
    Extras {
        dataset: EntityId,
        #[arg(value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Parent procedures of the datasets on a platform
    Parents {
        platform: EntityId,
    },
    /// Entities reachable from the datasets matching the filter parameters
    Reachable {
        #[arg(value_enum)]
        collection: Collection,
        #[arg(value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Value types with a registered converter
    Types,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Collection {
    Offerings,
    Phenomena,
    Procedures,
    Features,
    Categories,
    Platforms,
}

impl From<Collection> for Dimension {
    fn from(collection: Collection) -> Self {
        match collection {
            Collection::Offerings => Dimension::Offering,
            Collection::Phenomena => Dimension::Phenomenon,
            Collection::Procedures => Dimension::Procedure,
            Collection::Features => Dimension::Feature,
            Collection::Categories => Dimension::Category,
            Collection::Platforms => Dimension::Platform,
        }
    }
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .json()
        .init();

    if let Err(e) = run(args) {
        tracing::error!("Command failed: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = DaoConfig::load(&args.config)?.with_env();
    config.validate()?;

    let catalog = MemoryCatalog::load(&args.catalog)
        .with_context(|| format!("Failed to open catalog {}", args.catalog.display()))?;
    let service = ObservationService::new(config, Arc::new(catalog));
    info!(catalog = %args.catalog.display(), "Service ready");

    match args.command {
        Command::Datasets { params } => {
            let query = service.query_from_params(&into_map(params))?;
            print_json(&service.find_datasets(&query)?)
        }
        Command::Data { dataset, params } => {
            let query = service.query_from_params(&into_map(params))?;
            print_json(&service.get_data(dataset, &query)?)
        }
        Command::Extras { dataset, params } => {
            let query = service.query_from_params(&into_map(params))?;
            print_json(&service.dataset_extras(dataset, &query)?)
        }
        Command::Parents { platform } => {
            let options = service.config().default_options();
            print_json(&service.hierarchical_extras(platform, &options)?)
        }
        Command::Reachable { collection, params } => {
            let query = service.query_from_params(&into_map(params))?;
            print_json(&service.reachable(collection.into(), &query)?)
        }
        Command::Types => print_json(service.known_types()),
    }
}

fn into_map(params: Vec<(String, String)>) -> HashMap<String, String> {
    params.into_iter().collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("bbox=7.5,51.8,7.7,52.0").unwrap(),
            ("bbox".to_string(), "7.5,51.8,7.7,52.0".to_string())
        );
        assert_eq!(
            parse_key_val("timespan=2024-01-15T12:00:00Z/2024-01-15T13:00:00Z")
                .unwrap()
                .1,
            "2024-01-15T12:00:00Z/2024-01-15T13:00:00Z"
        );
        assert!(parse_key_val("phenomena").is_err());
    }

    #[test]
    fn test_args_parse_datasets_command() {
        let args = Args::try_parse_from([
            "obs-cli",
            "--catalog",
            "catalog.yaml",
            "datasets",
            "phenomena=1,2",
            "expanded=true",
        ])
        .unwrap();

        match args.command {
            Command::Datasets { params } => {
                let params = into_map(params);
                assert_eq!(params["phenomena"], "1,2");
                assert_eq!(params["expanded"], "true");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_collection_maps_to_dimension() {
        assert_eq!(Dimension::from(Collection::Phenomena), Dimension::Phenomenon);
        assert_eq!(Dimension::from(Collection::Platforms), Dimension::Platform);
    }
}
