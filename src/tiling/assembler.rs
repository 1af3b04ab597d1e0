use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use glam::{DMat4, DVec3};
use tracing::{debug, info, warn};

use super::metadata::{write_feature_collection, write_tile_metadata};
use super::ply_writer::{PlyEncoding, write_ply};
use super::progress::EtaTracker;
use super::scene_writer::write_scene;
use crate::config::{
    FRAME_SUFFIX, GEOJSON_EXTENSION, GROUND_PADDING, GROUND_TEMPLATE_NAME, MESH_DIR_NAME,
    MESH_EXTENSION, SCENE_EXTENSION,
};
use crate::error::{Result, SceneTilerError};
use crate::ingestion::catalog::tileinfo_file_name;
use crate::ingestion::{geojson, load_model_mesh, model_mesh_path, ply_loader};
use crate::transform::{self, LocalFrame};
use crate::types::feature::{CENTER_X_KEY, CENTER_Y_KEY};
use crate::types::{
    FeatureCollection, IndexedMesh, MaterialId, Placement, SceneDescription, TileMetadata,
};

/// Inputs of one tile assembly besides the features themselves.
#[derive(Debug, Clone)]
pub struct AssemblyRequest<'a> {
    pub tile_name: &'a str,
    /// Tile center in local coordinates; the bounding-box center when `None`.
    pub tile_center: Option<[f64; 2]>,
    /// Directory holding the model meshes and the ground template.
    pub mesh_dir: &'a Path,
    /// Directory receiving the scene, geo-scene and metadata files.
    pub output_dir: &'a Path,
}

/// Result of a tile assembly.
#[derive(Debug, Clone)]
pub struct AssembledTile {
    pub name: String,
    pub scene: SceneDescription,
    pub metadata: TileMetadata,
    pub scene_path: PathBuf,
    pub geo_scene_path: PathBuf,
    pub tileinfo_path: PathBuf,
    pub frame_mesh_path: PathBuf,
}

/// Placement transform of a model: move to its centroid, then shift the tile
/// so its own center becomes the origin.
pub fn model_transform(centroid: [f64; 2], tile_center: [f64; 2]) -> DMat4 {
    DMat4::from_translation(DVec3::new(centroid[0], centroid[1], 0.0))
        * DMat4::from_translation(DVec3::new(-tile_center[0], -tile_center[1], 0.0))
}

/// Ground mesh covering a tile of `tile_size`, padded against edge seams.
pub fn ground_frame(template: &IndexedMesh, tile_size: f64) -> IndexedMesh {
    let mut frame = template.clone();
    frame.scale_xy(tile_size / 2.0 + GROUND_PADDING);
    frame
}

/// Mesh file reference as written in the scene: relative to the scene
/// directory when the mesh lives below it.
fn mesh_reference(scene_dir: &Path, mesh_path: &Path) -> String {
    mesh_path
        .strip_prefix(scene_dir)
        .unwrap_or(mesh_path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn canonical_or_given(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Assemble one tile: reproject its features, place every model mesh and
/// write the scene file, the local geo-scene file and the tile metadata.
///
/// Every referenced mesh is loaded before anything is written, so a missing
/// mesh aborts the tile without output.
pub fn assemble(
    collection: &FeatureCollection,
    frame: &LocalFrame,
    request: &AssemblyRequest<'_>,
) -> Result<AssembledTile> {
    let name = request.tile_name;
    info!(tile = name, features = collection.len(), "Assembling tile");

    // 1. Local frame
    let mut local = transform::reproject_collection(collection, frame)?;
    let models = geojson::model_features(&local)?;

    // 2. Tile extent
    let bounds = transform::collection_bounds(&local);
    if bounds.is_empty() {
        return Err(SceneTilerError::Input(format!("Tile '{name}' has no geometry")));
    }
    let tile_size = bounds.width();
    info!(tile = name, "Scene size is {tile_size:.1}x{tile_size:.1} m");

    let tile_center = request.tile_center.unwrap_or_else(|| bounds.center());

    fs::create_dir_all(request.output_dir)?;
    let output_dir = canonical_or_given(request.output_dir);
    let mesh_dir = canonical_or_given(request.mesh_dir);

    // 3. Ground frame
    let template = ply_loader::load_ply(&mesh_dir.join(GROUND_TEMPLATE_NAME))?;
    let frame_mesh = ground_frame(&template, tile_size);
    let frame_mesh_path = output_dir
        .join(MESH_DIR_NAME)
        .join(format!("{name}{FRAME_SUFFIX}.{MESH_EXTENSION}"));
    let ground = Placement::translated(
        mesh_reference(&output_dir, &frame_mesh_path),
        MaterialId::MediumDryGround,
        DVec3::ZERO,
    );

    // 4. Fixed scene entries
    let mut scene = SceneDescription::new(ground);

    // 5. Model placements
    let mut eta = EtaTracker::new(models.len());
    let mut triangle_count = 0usize;
    for (feature, model) in local.features.iter_mut().zip(&models) {
        let start = Instant::now();

        let centroid = transform::centroid(&model.geometry).ok_or_else(|| {
            SceneTilerError::Input(format!("Model '{}' has an empty geometry", model.model_id))
        })?;
        feature.set_property(CENTER_X_KEY, centroid[0]);
        feature.set_property(CENTER_Y_KEY, centroid[1]);

        let mesh = load_model_mesh(&mesh_dir, &model.model_id)?;
        let placement = Placement {
            mesh: mesh_reference(&output_dir, &model_mesh_path(&mesh_dir, &model.model_id)),
            material: model.struct_type.material(),
            to_world: model_transform(centroid, tile_center),
        };
        if scene.insert_model(model.model_id.as_str(), placement)?.is_some() {
            warn!(tile = name, model = %model.model_id, "Duplicate model id, keeping the last placement");
        }
        triangle_count += mesh.triangle_count();

        let progress = eta.record(start.elapsed());
        debug!(
            tile = name,
            model = %model.model_id,
            done = progress.done,
            total = progress.total,
            "Placed model"
        );
        info!(
            "{}/{} ({:.1}%) elapsed {:.1?}, ETA {:.1?}",
            progress.done,
            progress.total,
            progress.percent(),
            progress.elapsed,
            progress.remaining
        );
    }

    let metadata = TileMetadata {
        bounds,
        center: tile_center,
        // Every feature row counts, duplicates included
        model_count: models.len(),
        triangle_count,
    };

    // 6. Outputs
    let scene_path = output_dir.join(format!("{name}.{SCENE_EXTENSION}"));
    let geo_scene_path = output_dir.join(format!("{name}.{GEOJSON_EXTENSION}"));
    let tileinfo_path = output_dir.join(tileinfo_file_name(name));

    write_ply(&frame_mesh_path, &frame_mesh, PlyEncoding::Binary)?;
    write_scene(&scene_path, &scene)?;
    write_feature_collection(&geo_scene_path, &local)?;
    write_tile_metadata(&tileinfo_path, &metadata)?;

    info!(
        tile = name,
        models = metadata.model_count,
        triangles = metadata.triangle_count,
        "Scene {name} imported"
    );

    Ok(AssembledTile {
        name: name.to_string(),
        scene,
        metadata,
        scene_path,
        geo_scene_path,
        tileinfo_path,
        frame_mesh_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn transform_is_centroid_minus_center() {
        let m = model_transform([120.0, -40.0], [100.0, 10.0]);
        let expected = DMat4::from_translation(DVec3::new(20.0, -50.0, 0.0));
        assert_eq!(m, expected);
    }

    #[test]
    fn zero_center_keeps_centroid() {
        let m = model_transform([3.5, 4.5], [0.0, 0.0]);
        assert_eq!(m.w_axis.truncate(), DVec3::new(3.5, 4.5, 0.0));
    }

    #[test]
    fn ground_frame_scaled_with_padding() {
        let template = IndexedMesh {
            positions: vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0, 1.0, 0.0, -1.0, 1.0, 0.0],
            indices: vec![0, 1, 2, 0, 2, 3],
            ..Default::default()
        };
        let frame = ground_frame(&template, 400.0);
        let (min, max) = frame.bounds().unwrap();
        assert_relative_eq!(min[0], -300.0);
        assert_relative_eq!(max[1], 300.0);
        assert_eq!(min[2], 0.0);
        assert_eq!(frame.indices, template.indices);
    }

    #[test]
    fn relative_mesh_reference() {
        assert_eq!(
            mesh_reference(Path::new("/data"), Path::new("/data/meshes/a.ply")),
            "meshes/a.ply"
        );
        assert_eq!(
            mesh_reference(Path::new("/out"), Path::new("/data/meshes/a.ply")),
            "/data/meshes/a.ply"
        );
    }
}
