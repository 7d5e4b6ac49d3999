//! Persistent on-disk cache of resolved driving distances.
//!
//! Physical distances do not change, so entries have no TTL and are never
//! invalidated. Writes go through immediately; an unreadable or corrupt
//! cache file degrades to a cold cache instead of failing the request.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::debug;

use crate::domain::entities::Coordinates;

const CACHE_FILENAME: &str = "distance_cache.json";

/// Cache key: the four coordinates in plain decimal formatting, fixed order.
/// The formatting must stay byte-stable across runs for hits to occur.
pub fn cache_key(origin: Coordinates, destination: Coordinates) -> String {
    format!(
        "{},{},{},{}",
        origin.latitude, origin.longitude, destination.latitude, destination.longitude
    )
}

#[derive(Clone, Debug)]
pub struct DistanceCache {
    path: PathBuf,
}

impl DistanceCache {
    /// Cache file in the app data directory (falls back to the working
    /// directory when no home is available).
    pub fn open_default() -> Self {
        let base = ProjectDirs::from("ar", "TransporteRioLavayen", "Cotizador")
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join(CACHE_FILENAME),
        }
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.load().get(key).copied()
    }

    /// Write-through insert: load, merge, persist.
    pub fn put(&self, key: &str, distance_km: f64) -> Result<(), io::Error> {
        let mut entries = self.load();
        entries.insert(key.to_string(), distance_km);
        self.save(&entries)
    }

    fn load(&self) -> HashMap<String, f64> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    debug!(%error, path = %self.path.display(), "distance cache unreadable, starting cold");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        }
    }

    fn save(&self, entries: &HashMap<String, f64>) -> Result<(), io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(entries)?;
        fs::write(&self.path, raw)
    }
}
