use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::ply_writer::{PlyEncoding, write_ply};
use crate::config::{ASCII_SUFFIX, MESH_EXTENSION};
use crate::error::{Result, SceneTilerError};
use crate::ingestion::ply_loader::load_ply;

/// Totals of an ASCII conversion batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsciiStats {
    pub files: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// `<dest_dir>/<stem>_ascii.ply`
pub fn ascii_mesh_path(dest_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    dest_dir.join(format!("{stem}{ASCII_SUFFIX}.{MESH_EXTENSION}"))
}

/// Rewrite every PLY mesh of `source_dir` as ASCII PLY into `dest_dir`.
///
/// The first mesh that fails to load or write aborts the batch.
pub fn convert_all(source_dir: &Path, dest_dir: &Path) -> Result<AsciiStats> {
    if !source_dir.is_dir() {
        return Err(SceneTilerError::NotFound(format!(
            "Mesh directory {}",
            source_dir.display()
        )));
    }

    // Snapshot the listing first: dest_dir may be source_dir
    let mut sources: Vec<PathBuf> = fs::read_dir(source_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    sources.retain(|p| {
        p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(MESH_EXTENSION)
    });
    sources.sort();

    fs::create_dir_all(dest_dir)?;

    let mut stats = AsciiStats::default();
    for source in &sources {
        let mesh = load_ply(source)?;
        let target = ascii_mesh_path(dest_dir, source);
        write_ply(&target, &mesh, PlyEncoding::Ascii)?;
        debug!(source = %source.display(), target = %target.display(), "Converted to ASCII");

        stats.files += 1;
        stats.vertices += mesh.vertex_count();
        stats.triangles += mesh.triangle_count();
    }

    info!(
        files = stats.files,
        dest = %dest_dir.display(),
        "ASCII conversion complete"
    );
    Ok(stats)
}
