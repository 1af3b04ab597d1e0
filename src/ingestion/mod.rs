pub mod catalog;
pub mod geojson;
pub mod ply_loader;

use std::path::{Path, PathBuf};

use crate::config::MESH_EXTENSION;
use crate::error::Result;
use crate::types::IndexedMesh;

pub use catalog::TileCatalog;

/// `<mesh_dir>/<model_id>.ply`
pub fn model_mesh_path(mesh_dir: &Path, model_id: &str) -> PathBuf {
    mesh_dir.join(format!("{model_id}.{MESH_EXTENSION}"))
}

/// Load the precomputed mesh of a model. A missing file is `NotFound`.
pub fn load_model_mesh(mesh_dir: &Path, model_id: &str) -> Result<IndexedMesh> {
    ply_loader::load_ply(&model_mesh_path(mesh_dir, model_id))
}
