//! Loading the reference catalogs, from the embedded copy or a directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::Catalog;
use crate::util::assets;

const TRANSPORT_FILE: &str = "transport.json";
const FLIGHTS_FILE: &str = "flights.json";
const TRANSFERS_FILE: &str = "airport_transfers.json";
const ACCOMMODATION_FILE: &str = "accommodation.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file {0} is missing")]
    MissingAsset(String),
    #[error("catalog file {file} is malformed: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Catalogs compiled into the binary.
pub fn load_embedded() -> Result<Catalog, CatalogError> {
    let catalog = Catalog {
        transport: embedded(TRANSPORT_FILE)?,
        flights: embedded(FLIGHTS_FILE)?,
        airport_transfers: embedded(TRANSFERS_FILE)?,
        accommodation: embedded(ACCOMMODATION_FILE)?,
    };
    debug!(
        transport = catalog.transport.len(),
        flights = catalog.flights.len(),
        transfers = catalog.airport_transfers.len(),
        accommodation = catalog.accommodation.len(),
        "loaded embedded catalog"
    );
    Ok(catalog)
}

/// Catalogs from `dir`. A file that is absent yields an empty list so a
/// directory can override just part of the data.
pub fn load_dir(dir: &Path) -> Result<Catalog, CatalogError> {
    let catalog = Catalog {
        transport: from_file(dir, TRANSPORT_FILE)?,
        flights: from_file(dir, FLIGHTS_FILE)?,
        airport_transfers: from_file(dir, TRANSFERS_FILE)?,
        accommodation: from_file(dir, ACCOMMODATION_FILE)?,
    };
    info!(dir = %dir.display(), "loaded catalog from directory");
    Ok(catalog)
}

pub fn load(dir: Option<&Path>) -> Result<Catalog, CatalogError> {
    match dir {
        Some(dir) => load_dir(dir),
        None => load_embedded(),
    }
}

fn embedded<T: DeserializeOwned>(file: &str) -> Result<Vec<T>, CatalogError> {
    let path = format!("catalog/{file}");
    let bytes = assets::load(&path).ok_or_else(|| CatalogError::MissingAsset(path.clone()))?;
    serde_json::from_slice(&bytes).map_err(|source| CatalogError::Parse { file: path, source })
}

fn from_file<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, CatalogError> {
    let path = dir.join(file);
    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(CatalogError::Io { path, source }),
    };
    serde_json::from_str(&data).map_err(|source| CatalogError::Parse {
        file: path.display().to_string(),
        source,
    })
}
