use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::geojson;
use crate::config::{GEOJSON_EXTENSION, MESH_DIR_NAME, SCENE_EXTENSION, TILEINFO_MARKER};
use crate::error::{Result, SceneTilerError};
use crate::types::TileDescriptor;

/// Immutable index of the tiles found in a dataset directory.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    dataset_dir: PathBuf,
    mesh_dir: PathBuf,
    tiles: BTreeMap<String, TileDescriptor>,
}

impl TileCatalog {
    /// Scan the immediate entries of `dataset_dir` for tile definitions.
    ///
    /// A tile is a regular `.geojson` file whose stem does not contain the
    /// `tileinfo` marker.
    pub fn enumerate(dataset_dir: &Path) -> Result<Self> {
        if !dataset_dir.is_dir() {
            return Err(SceneTilerError::NotFound(format!(
                "Dataset directory {}",
                dataset_dir.display()
            )));
        }
        let dataset_dir = fs::canonicalize(dataset_dir)?;

        let mut tiles = BTreeMap::new();
        for entry in fs::read_dir(&dataset_dir)? {
            let path = entry?.path();
            let Some(descriptor) = describe_tile(&path) else {
                continue;
            };
            debug!(tile = %descriptor.name, "Found tile");
            tiles.insert(descriptor.name.clone(), descriptor);
        }

        info!(dataset = %dataset_dir.display(), tiles = tiles.len(), "{} scenes imported", tiles.len());

        Ok(Self {
            mesh_dir: dataset_dir.join(MESH_DIR_NAME),
            dataset_dir,
            tiles,
        })
    }

    pub fn dataset_dir(&self) -> &Path {
        &self.dataset_dir
    }

    pub fn mesh_dir(&self) -> &Path {
        &self.mesh_dir
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tile names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tiles.keys().map(String::as_str)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &TileDescriptor> {
        self.tiles.values()
    }

    /// Look up a tile; unknown names fail with the list of valid names.
    pub fn get(&self, name: &str) -> Result<&TileDescriptor> {
        self.tiles.get(name).ok_or_else(|| {
            let valid: Vec<&str> = self.names().collect();
            SceneTilerError::NotFound(format!(
                "Tile '{name}' is not one of the tiles in {}: {valid:?}",
                self.dataset_dir.display()
            ))
        })
    }

    /// Model ids of a tile, read from its geo-scene file.
    pub fn models(&self, name: &str) -> Result<Vec<String>> {
        let tile = self.get(name)?;
        let collection = geojson::read_feature_collection(&tile.geo_scene_path)?;
        Ok(geojson::model_features(&collection)?
            .into_iter()
            .map(|m| m.model_id)
            .collect())
    }
}

/// Build the descriptor for `path` if it is a tile definition file.
fn describe_tile(path: &Path) -> Option<TileDescriptor> {
    if !path.is_file() {
        return None;
    }
    if path.extension().and_then(|e| e.to_str()) != Some(GEOJSON_EXTENSION) {
        return None;
    }
    let name = path.file_stem()?.to_str()?;
    if name.contains(TILEINFO_MARKER) {
        return None;
    }

    Some(TileDescriptor {
        name: name.to_string(),
        tileinfo_path: path.with_file_name(tileinfo_file_name(name)),
        geo_scene_path: path.to_path_buf(),
        mi_scene_path: path.with_extension(SCENE_EXTENSION),
    })
}

/// `<tile>_tileinfo.geojson`
pub fn tileinfo_file_name(tile_name: &str) -> String {
    format!("{tile_name}_{TILEINFO_MARKER}.{GEOJSON_EXTENSION}")
}
