use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use super::ply_writer::{PlyEncoding, write_ply};
use super::progress::EtaTracker;
use super::simplifier::{cluster_vertices, smooth_simple};
use crate::config::{MESH_DIR_NAME, SimplifyConfig};
use crate::error::{Result, SceneTilerError};
use crate::ingestion::{TileCatalog, load_model_mesh, model_mesh_path};

/// Mesh totals before and after a simplified export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimplifyStats {
    pub models: usize,
    pub vertices_in: usize,
    pub triangles_in: usize,
    pub vertices_out: usize,
    pub triangles_out: usize,
    pub scene_path: PathBuf,
    pub geo_scene_path: PathBuf,
}

/// Whether two paths name the same directory.
fn same_location(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Copy a text file unchanged into `dir`, keeping its file name.
fn copy_text(source: &Path, dir: &Path) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        SceneTilerError::Input(format!("{} has no file name", source.display()))
    })?;
    let target = dir.join(file_name);
    let text = fs::read_to_string(source).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            SceneTilerError::NotFound(format!("Scene file {}", source.display()))
        }
        _ => e.into(),
    })?;
    fs::write(&target, text)?;
    Ok(target)
}

/// Export one tile with every model mesh simplified by vertex clustering.
///
/// The tile's scene and geo-scene files are copied unchanged; only meshes are
/// rewritten. Exporting into the dataset directory itself is refused.
pub fn simplify_tile(catalog: &TileCatalog, config: &SimplifyConfig) -> Result<SimplifyStats> {
    if same_location(&config.output, catalog.dataset_dir()) {
        return Err(SceneTilerError::AlreadyExists(format!(
            "{} is the source dataset; overwriting the original dataset is not supported",
            config.output.display()
        )));
    }
    if !(config.precision > 0.0) {
        return Err(SceneTilerError::Mesh(format!(
            "Precision must be positive, got {}",
            config.precision
        )));
    }

    let tile = catalog.get(&config.tile_name)?;
    let models = catalog.models(&tile.name)?;
    info!(
        tile = %tile.name,
        models = models.len(),
        precision = config.precision,
        smooth = config.smooth,
        "Simplifying tile"
    );

    let out_mesh_dir = config.output.join(MESH_DIR_NAME);
    fs::create_dir_all(&out_mesh_dir)?;

    let mut stats = SimplifyStats {
        models: models.len(),
        ..Default::default()
    };
    let mut eta = EtaTracker::new(models.len());
    for model_id in &models {
        let start = Instant::now();

        let mut mesh = load_model_mesh(catalog.mesh_dir(), model_id)?;
        stats.vertices_in += mesh.vertex_count();
        stats.triangles_in += mesh.triangle_count();

        if config.smooth {
            mesh = smooth_simple(&mesh, config.smooth_iterations);
        }
        let simplified = cluster_vertices(&mesh, config.precision)?;
        stats.vertices_out += simplified.vertex_count();
        stats.triangles_out += simplified.triangle_count();

        write_ply(
            &model_mesh_path(&out_mesh_dir, model_id),
            &simplified,
            PlyEncoding::Binary,
        )?;

        let progress = eta.record(start.elapsed());
        info!(
            "{}/{} ({:.1}%) elapsed {:.1?}, ETA {:.1?}",
            progress.done,
            progress.total,
            progress.percent(),
            progress.elapsed,
            progress.remaining
        );
    }

    stats.scene_path = copy_text(&tile.mi_scene_path, &config.output)?;
    stats.geo_scene_path = copy_text(&tile.geo_scene_path, &config.output)?;

    info!(
        tile = %tile.name,
        vertices_in = stats.vertices_in,
        triangles_in = stats.triangles_in,
        vertices_out = stats.vertices_out,
        triangles_out = stats.triangles_out,
        "Simplified tile"
    );
    Ok(stats)
}
