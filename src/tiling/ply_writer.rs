use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;
use tracing::debug;

use crate::error::{Result, SceneTilerError};
use crate::types::IndexedMesh;

/// On-disk PLY encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlyEncoding {
    #[default]
    Binary,
    Ascii,
}

fn scalar(name: &str, ty: ScalarType) -> PropertyDef {
    PropertyDef::new(name.to_string(), PropertyType::Scalar(ty))
}

/// Build the in-memory PLY document for a mesh.
fn build_ply(mesh: &IndexedMesh, encoding: PlyEncoding) -> Result<Ply<DefaultElement>> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = match encoding {
        PlyEncoding::Binary => Encoding::BinaryLittleEndian,
        PlyEncoding::Ascii => Encoding::Ascii,
    };

    let mut vertex_def = ElementDef::new("vertex".to_string());
    for key in ["x", "y", "z"] {
        vertex_def.properties.add(scalar(key, ScalarType::Float));
    }
    if mesh.has_normals() {
        for key in ["nx", "ny", "nz"] {
            vertex_def.properties.add(scalar(key, ScalarType::Float));
        }
    }
    if mesh.has_colors() {
        for key in ["red", "green", "blue"] {
            vertex_def.properties.add(scalar(key, ScalarType::UChar));
        }
    }
    ply.header.elements.add(vertex_def);

    let mut face_def = ElementDef::new("face".to_string());
    face_def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));
    ply.header.elements.add(face_def);

    let mut vertices = Vec::with_capacity(mesh.vertex_count());
    for i in 0..mesh.vertex_count() {
        let mut v = DefaultElement::new();
        for (axis, key) in ["x", "y", "z"].into_iter().enumerate() {
            v.insert(key.to_string(), Property::Float(mesh.positions[i * 3 + axis]));
        }
        if mesh.has_normals() {
            for (axis, key) in ["nx", "ny", "nz"].into_iter().enumerate() {
                v.insert(key.to_string(), Property::Float(mesh.normals[i * 3 + axis]));
            }
        }
        if mesh.has_colors() {
            for (channel, key) in ["red", "green", "blue"].into_iter().enumerate() {
                let c = (mesh.colors[i * 3 + channel] * 255.0).round().clamp(0.0, 255.0);
                v.insert(key.to_string(), Property::UChar(c as u8));
            }
        }
        vertices.push(v);
    }

    let faces = mesh
        .indices
        .chunks_exact(3)
        .map(|tri| {
            let mut f = DefaultElement::new();
            f.insert(
                "vertex_indices".to_string(),
                Property::ListInt(tri.iter().map(|&i| i as i32).collect()),
            );
            f
        })
        .collect();

    ply.payload.insert("vertex".to_string(), vertices);
    ply.payload.insert("face".to_string(), faces);
    ply.make_consistent()
        .map_err(|e| SceneTilerError::Output(format!("Inconsistent PLY document: {e:?}")))?;

    Ok(ply)
}

/// Write a mesh as a PLY file, creating parent directories.
pub fn write_ply(path: &Path, mesh: &IndexedMesh, encoding: PlyEncoding) -> Result<()> {
    if mesh.has_normals() && mesh.normals.len() != mesh.positions.len() {
        return Err(SceneTilerError::Output(format!(
            "Normal buffer of {} does not match its positions",
            path.display()
        )));
    }
    if mesh.has_colors() && mesh.colors.len() != mesh.positions.len() {
        return Err(SceneTilerError::Output(format!(
            "Color buffer of {} does not match its positions",
            path.display()
        )));
    }

    let mut ply = build_ply(mesh, encoding)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    let bytes = Writer::new().write_ply(&mut out, &mut ply)?;
    out.flush()?;

    debug!(
        path = %path.display(),
        bytes,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        ?encoding,
        "Wrote PLY"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::ply_loader::load_ply;
    use std::fs;

    fn colored_triangle() -> IndexedMesh {
        IndexedMesh {
            positions: vec![0.0, 0.0, 0.0, 1.5, 0.0, 0.0, 0.0, 2.25, -1.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            colors: vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn ascii_header_and_body() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tri.ply");
        write_ply(&path, &colored_triangle(), PlyEncoding::Ascii).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("ply\n"));
        assert!(text.contains("format ascii 1.0"));
        assert!(text.contains("element vertex 3"));
        assert!(text.contains("element face 1"));
        assert!(text.contains("property uchar red"));
    }

    #[test]
    fn binary_reloads() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("tri.ply");
        let mesh = colored_triangle();
        write_ply(&path, &mesh, PlyEncoding::Binary).unwrap();

        let header = fs::read(&path).unwrap();
        let header = String::from_utf8_lossy(&header[..64]);
        assert!(header.contains("binary_little_endian"));

        let loaded = load_ply(&path).unwrap();
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn mismatched_normals_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut mesh = colored_triangle();
        mesh.normals.truncate(3);
        let err = write_ply(&tmp.path().join("bad.ply"), &mesh, PlyEncoding::Ascii).unwrap_err();
        assert!(matches!(err, SceneTilerError::Output(_)));
    }
}
