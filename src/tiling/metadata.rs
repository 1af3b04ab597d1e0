use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::Map;
use tracing::debug;

use crate::error::{Result, SceneTilerError};
use crate::types::feature::{CENTER_X_KEY, CENTER_Y_KEY, N_MODELS_KEY, N_TRIANGLES_KEY};
use crate::types::{Feature, FeatureCollection, Geometry, TileMetadata};

/// Write a feature collection as pretty-printed GeoJSON.
pub fn write_feature_collection(path: &Path, collection: &FeatureCollection) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, collection).map_err(|e| {
        SceneTilerError::Output(format!("Failed to write GeoJSON {}: {e}", path.display()))
    })?;
    out.flush()?;
    debug!(path = %path.display(), features = collection.len(), "Wrote GeoJSON");
    Ok(())
}

/// One-feature collection describing a tile: bounding box polygon plus counts.
pub fn tile_metadata_collection(metadata: &TileMetadata) -> FeatureCollection {
    let mut properties = Map::new();
    properties.insert(CENTER_X_KEY.into(), metadata.center[0].into());
    properties.insert(CENTER_Y_KEY.into(), metadata.center[1].into());
    properties.insert(N_MODELS_KEY.into(), metadata.model_count.into());
    properties.insert(N_TRIANGLES_KEY.into(), metadata.triangle_count.into());

    let geometry = Geometry::Polygon {
        coordinates: vec![metadata.bounds.to_ring()],
    };
    FeatureCollection::new(vec![Feature::new(geometry, properties)])
}

/// Write the `<tile>_tileinfo.geojson` companion file.
pub fn write_tile_metadata(path: &Path, metadata: &TileMetadata) -> Result<()> {
    write_feature_collection(path, &tile_metadata_collection(metadata))
}
