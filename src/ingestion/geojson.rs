use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SceneTilerError};
use crate::types::{FeatureCollection, ModelFeature};

/// Read a GeoJSON feature collection from disk.
pub fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            SceneTilerError::NotFound(format!("GeoJSON file {}", path.display()))
        }
        _ => SceneTilerError::Input(format!("Failed to open {}: {e}", path.display())),
    })?;

    let collection: FeatureCollection = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| {
            SceneTilerError::Input(format!("Failed to parse GeoJSON {}: {e}", path.display()))
        })?;

    debug!(path = %path.display(), features = collection.len(), "Read feature collection");
    Ok(collection)
}

/// Typed model rows of a collection, in collection order.
pub fn model_features(collection: &FeatureCollection) -> Result<Vec<ModelFeature>> {
    collection
        .features
        .iter()
        .map(ModelFeature::from_feature)
        .collect()
}
