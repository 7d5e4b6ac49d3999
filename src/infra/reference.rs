//! Immutable reference tables, loaded once at startup.
//!
//! The four tables ship embedded in the binary; an operator can point the
//! process at a directory with the same file names to override them. A
//! missing or malformed table is fatal before any command logic runs.

use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::domain::entities::{LocalityEntry, PricingParameters, TariffEntry, Warehouse};
use crate::util::assets;

const TARIFFS_FILE: &str = "tariffs.json";
const ZONES_FILE: &str = "zones.json";
const PARAMETERS_FILE: &str = "parameters.json";
const WAREHOUSES_FILE: &str = "warehouses.json";

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to read reference file {name}: {source}")]
    Read {
        name: &'static str,
        source: io::Error,
    },
    #[error("failed to parse reference file {name}: {source}")]
    Parse {
        name: &'static str,
        source: serde_json::Error,
    },
    #[error("reference file {0} must contain exactly one parameter set")]
    MissingParameters(&'static str),
}

#[derive(Debug, Deserialize)]
struct WarehouseFile {
    warehouses: Vec<Warehouse>,
}

/// The in-memory reference store: tariffs, localities, pricing parameters,
/// and the warehouse directory.
#[derive(Clone, Debug)]
pub struct ReferenceData {
    tariffs: Vec<TariffEntry>,
    localities: Vec<LocalityEntry>,
    parameters: PricingParameters,
    warehouses: Vec<Warehouse>,
}

impl ReferenceData {
    /// Load all four tables, from `data_dir` when given, otherwise from the
    /// embedded copies.
    pub fn load(data_dir: Option<&Path>) -> Result<Self, ReferenceError> {
        let tariffs: Vec<TariffEntry> = read_table(data_dir, TARIFFS_FILE)?;
        let localities: Vec<LocalityEntry> = read_table(data_dir, ZONES_FILE)?;
        let parameter_rows: Vec<PricingParameters> = read_table(data_dir, PARAMETERS_FILE)?;
        let parameters = parameter_rows
            .into_iter()
            .next()
            .ok_or(ReferenceError::MissingParameters(PARAMETERS_FILE))?;
        let warehouses = read_table::<WarehouseFile>(data_dir, WAREHOUSES_FILE)?.warehouses;

        info!(
            tariffs = tariffs.len(),
            localities = localities.len(),
            warehouses = warehouses.len(),
            "reference data loaded"
        );

        Ok(Self {
            tariffs,
            localities,
            parameters,
            warehouses,
        })
    }

    pub fn warehouses(&self) -> &[Warehouse] {
        &self.warehouses
    }

    pub fn warehouse(&self, name: &str) -> Option<&Warehouse> {
        let name = name.trim();
        self.warehouses.iter().find(|w| w.name.trim() == name)
    }

    /// Sorted, deduplicated zone ids present in the locality directory.
    pub fn zone_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.localities.iter().map(|entry| entry.zone_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn zone_name(&self, zone_id: u32) -> Option<&str> {
        self.localities
            .iter()
            .find(|entry| entry.zone_id == zone_id)
            .map(|entry| entry.zone_name.as_str())
    }

    pub fn localities_in(&self, zone_id: u32) -> impl Iterator<Item = &LocalityEntry> {
        self.localities
            .iter()
            .filter(move |entry| entry.zone_id == zone_id)
    }

    /// Locality lookup by trimmed name, across all zones.
    pub fn locality(&self, name: &str) -> Option<&LocalityEntry> {
        let name = name.trim();
        self.localities.iter().find(|entry| entry.locality.trim() == name)
    }

    pub fn tariffs_in(&self, zone_id: u32) -> impl Iterator<Item = &TariffEntry> {
        self.tariffs
            .iter()
            .filter(move |entry| entry.zone_id == zone_id)
    }

    pub fn tariff(&self, zone_id: u32, cargo_class: &str) -> Option<&TariffEntry> {
        let cargo_class = cargo_class.trim();
        self.tariffs
            .iter()
            .find(|entry| entry.zone_id == zone_id && entry.cargo_class.trim() == cargo_class)
    }

    /// Surcharge for a locality; unknown names silently default to 0.
    pub fn surcharge(&self, locality: &str) -> f64 {
        self.locality(locality)
            .map(|entry| entry.surcharge)
            .unwrap_or(0.0)
    }

    pub fn parameters(&self) -> &PricingParameters {
        &self.parameters
    }
}

fn read_table<T: DeserializeOwned>(
    data_dir: Option<&Path>,
    name: &'static str,
) -> Result<T, ReferenceError> {
    let raw: Cow<'_, [u8]> = match data_dir {
        Some(dir) => Cow::Owned(
            fs::read(dir.join(name)).map_err(|source| ReferenceError::Read { name, source })?,
        ),
        None => assets::reference_file(name),
    };
    serde_json::from_slice(&raw).map_err(|source| ReferenceError::Parse { name, source })
}
