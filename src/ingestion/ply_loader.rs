use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
use tracing::debug;

use crate::error::{Result, SceneTilerError};
use crate::types::IndexedMesh;

/// Load a building, ground-template or frame mesh from PLY.
///
/// Model meshes are exported per `Model_ID` in either PLY encoding, so both
/// ASCII and binary files are accepted. Only positions, optional normals and
/// optional RGB colors are kept; any alpha channel is dropped. Faces with
/// more than three corners are fan-triangulated so triangle counts match
/// what the renderer sees.
///
/// A missing file is `NotFound` (a model without its mesh aborts tile
/// assembly); a malformed file, or a face pointing past the vertex list,
/// is `Input`.
pub fn load_ply(path: &Path) -> Result<IndexedMesh> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            SceneTilerError::NotFound(format!("Mesh file {}", path.display()))
        }
        _ => SceneTilerError::Input(format!("Failed to open PLY {}: {e}", path.display())),
    })?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| {
        SceneTilerError::Input(format!("Failed to parse PLY {}: {e}", path.display()))
    })?;

    let vertices = ply.payload.get("vertex").ok_or_else(|| {
        SceneTilerError::Input(format!(
            "PLY file {} missing 'vertex' element",
            path.display()
        ))
    })?;

    debug!(vertex_count = vertices.len(), path = %path.display(), "Parsing PLY vertices");

    let mut positions = Vec::with_capacity(vertices.len() * 3);
    let mut normals = Vec::new();
    let mut colors = Vec::new();

    let has_normals = vertices
        .first()
        .map(|v| v.contains_key("nx"))
        .unwrap_or(false);
    let has_colors = vertices
        .first()
        .map(|v| v.contains_key("red") || v.contains_key("r"))
        .unwrap_or(false);

    if has_normals {
        normals.reserve(vertices.len() * 3);
    }
    if has_colors {
        colors.reserve(vertices.len() * 3);
    }

    for vertex in vertices {
        positions.push(get_float_property(vertex, "x")?);
        positions.push(get_float_property(vertex, "y")?);
        positions.push(get_float_property(vertex, "z")?);

        if has_normals {
            normals.push(get_float_property(vertex, "nx")?);
            normals.push(get_float_property(vertex, "ny")?);
            normals.push(get_float_property(vertex, "nz")?);
        }

        if has_colors {
            let (r, g, b) = get_color_property(vertex)?;
            colors.extend_from_slice(&[r, g, b]);
        }
    }

    let indices = match ply.payload.get("face") {
        Some(faces) => {
            debug!(face_count = faces.len(), "Parsing PLY faces");
            triangulate_faces(faces)?
        }
        None => Vec::new(),
    };
    check_indices(path, &indices, positions.len() / 3)?;

    Ok(IndexedMesh {
        positions,
        normals,
        colors,
        indices,
    })
}

/// Extract a float property, handling Float/Double/Int/Short types.
fn get_float_property(element: &DefaultElement, key: &str) -> Result<f32> {
    let prop = element.get(key).ok_or_else(|| {
        SceneTilerError::Input(format!("PLY vertex missing property '{key}'"))
    })?;

    match prop {
        Property::Float(v) => Ok(*v),
        Property::Double(v) => Ok(*v as f32),
        Property::Int(v) => Ok(*v as f32),
        Property::Short(v) => Ok(*v as f32),
        Property::UInt(v) => Ok(*v as f32),
        Property::UShort(v) => Ok(*v as f32),
        Property::Char(v) => Ok(*v as f32),
        Property::UChar(v) => Ok(*v as f32),
        _ => Err(SceneTilerError::Input(format!(
            "PLY property '{key}' has unsupported type"
        ))),
    }
}

/// Extract RGB color from a vertex, normalizing UChar 0-255 to f32 0.0-1.0.
fn get_color_property(element: &DefaultElement) -> Result<(f32, f32, f32)> {
    let r_key = if element.contains_key("red") { "red" } else { "r" };
    let g_key = if element.contains_key("green") { "green" } else { "g" };
    let b_key = if element.contains_key("blue") { "blue" } else { "b" };

    let r = normalize_color_value(element, r_key)?;
    let g = normalize_color_value(element, g_key)?;
    let b = normalize_color_value(element, b_key)?;

    Ok((r, g, b))
}

/// Normalize a single color channel: integers are 0-255, floats stay as-is.
fn normalize_color_value(element: &DefaultElement, key: &str) -> Result<f32> {
    let prop = element.get(key).ok_or_else(|| {
        SceneTilerError::Input(format!("PLY vertex missing color property '{key}'"))
    })?;

    match prop {
        Property::UChar(v) => Ok(*v as f32 / 255.0),
        Property::Float(v) => Ok(*v),
        Property::Double(v) => Ok(*v as f32),
        Property::Short(v) => Ok(*v as f32 / 255.0),
        Property::UShort(v) => Ok(*v as f32 / 255.0),
        Property::Int(v) => Ok(*v as f32 / 255.0),
        Property::UInt(v) => Ok(*v as f32 / 255.0),
        _ => Err(SceneTilerError::Input(format!(
            "PLY color property '{key}' has unsupported type"
        ))),
    }
}

/// Fan-triangulate every face; faces with fewer than three corners are skipped.
fn triangulate_faces(faces: &[DefaultElement]) -> Result<Vec<u32>> {
    let mut indices = Vec::with_capacity(faces.len() * 3);
    for face in faces {
        let corners = get_index_list(face)?;
        if let Some((&apex, rest)) = corners.split_first() {
            for pair in rest.windows(2) {
                indices.extend_from_slice(&[apex, pair[0], pair[1]]);
            }
        }
    }
    Ok(indices)
}

/// Every index must name an existing vertex, or the scene's triangle count
/// and later clustering would read out of bounds.
fn check_indices(path: &Path, indices: &[u32], vertex_count: usize) -> Result<()> {
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(bad) => Err(SceneTilerError::Input(format!(
            "PLY file {} references vertex {bad} but has {vertex_count} vertices",
            path.display()
        ))),
        None => Ok(()),
    }
}

/// Extract the index list from a face element.
fn get_index_list(face: &DefaultElement) -> Result<Vec<u32>> {
    let key = if face.contains_key("vertex_indices") {
        "vertex_indices"
    } else {
        "vertex_index"
    };

    let prop = face.get(key).ok_or_else(|| {
        SceneTilerError::Input("PLY face missing vertex_indices property".into())
    })?;

    match prop {
        Property::ListInt(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        Property::ListUInt(v) => Ok(v.clone()),
        Property::ListUChar(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        Property::ListShort(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        Property::ListUShort(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        _ => Err(SceneTilerError::Input(
            "PLY face vertex_indices has unsupported type".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_ascii_ply(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn load_ascii_ply_basic() {
        let ply_content = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0.0 0.0 0.0
1.0 0.0 0.0
0.0 1.0 0.0
3 0 1 2
";
        let file = write_ascii_ply(ply_content);
        let mesh = load_ply(file.path()).unwrap();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_normals());
        assert!(!mesh.has_colors());
    }

    #[test]
    fn load_ascii_ply_with_colors() {
        let ply_content = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
element face 1
property list uchar int vertex_indices
end_header
0.0 0.0 0.0 255 0 0
1.0 0.0 0.0 0 255 0
0.0 1.0 0.0 0 0 255
3 0 1 2
";
        let file = write_ascii_ply(ply_content);
        let mesh = load_ply(file.path()).unwrap();

        assert!(mesh.has_colors());
        assert_eq!(mesh.colors.len(), 9);
        assert!((mesh.colors[0] - 1.0).abs() < 1e-3);
        assert!((mesh.colors[1] - 0.0).abs() < 1e-3);
        assert!((mesh.colors[4] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn polygon_triangulation() {
        let ply_content = "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0.0 0.0 0.0
1.0 0.0 0.0
1.0 1.0 0.0
0.0 1.0 0.0
4 0 1 2 3
";
        let file = write_ascii_ply(ply_content);
        let mesh = load_ply(file.path()).unwrap();

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn out_of_range_index_rejected() {
        let ply_content = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0.0 0.0 0.0
1.0 0.0 0.0
0.0 1.0 0.0
3 0 1 7
";
        let file = write_ascii_ply(ply_content);
        let err = load_ply(file.path()).unwrap_err();
        assert!(matches!(err, SceneTilerError::Input(_)));
    }

    #[test]
    fn short_faces_skipped() {
        let face = |corners: Vec<u32>| {
            let mut element = DefaultElement::new();
            element.insert("vertex_indices".to_string(), Property::ListUInt(corners));
            element
        };
        let indices = triangulate_faces(&[face(vec![0, 1]), face(vec![0, 1, 2, 3, 4])]).unwrap();
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_ply(Path::new("/nonexistent/mesh.ply")).unwrap_err();
        assert!(matches!(err, SceneTilerError::NotFound(_)));
        assert!(err.to_string().contains("/nonexistent/mesh.ply"));
    }

    #[test]
    fn color_normalization_uchar() {
        let mut element = DefaultElement::new();
        element.insert("red".to_string(), Property::UChar(128));
        element.insert("green".to_string(), Property::UChar(0));
        element.insert("blue".to_string(), Property::UChar(255));

        let (r, g, b) = get_color_property(&element).unwrap();
        assert!((r - 128.0 / 255.0).abs() < 1e-3);
        assert!((g - 0.0).abs() < 1e-3);
        assert!((b - 1.0).abs() < 1e-3);
    }
}
