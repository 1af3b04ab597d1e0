use std::collections::{HashMap, HashSet};

use crate::error::{Result, SceneTilerError};
use crate::types::IndexedMesh;

/// Simplify a mesh by merging all vertices that fall in the same voxel.
///
/// The voxel grid is anchored half a voxel below the mesh minimum. Merged
/// vertices take the mean position, color and (renormalized) normal of
/// their members. Triangles collapsing onto fewer than three vertices are
/// dropped, as are duplicates of an already emitted triangle.
pub fn cluster_vertices(mesh: &IndexedMesh, voxel_size: f32) -> Result<IndexedMesh> {
    if !(voxel_size > 0.0) || !voxel_size.is_finite() {
        return Err(SceneTilerError::Mesh(format!(
            "Voxel size must be a positive number, got {voxel_size}"
        )));
    }
    let Some((min, _)) = mesh.bounds() else {
        return Ok(IndexedMesh::default());
    };

    let voxel = voxel_size as f64;
    let anchor = min.map(|m| m as f64 - voxel * 0.5);

    // Voxel key -> new vertex index, old vertex -> new vertex
    let mut cells: HashMap<[i64; 3], u32> = HashMap::new();
    let mut remap = Vec::with_capacity(mesh.vertex_count());
    let mut members: Vec<u32> = Vec::new();

    for p in mesh.positions.chunks_exact(3) {
        let key = [0usize, 1, 2].map(|axis| ((p[axis] as f64 - anchor[axis]) / voxel).floor() as i64);
        let next = cells.len() as u32;
        let new_index = *cells.entry(key).or_insert(next);
        if new_index == next {
            members.push(0);
        }
        members[new_index as usize] += 1;
        remap.push(new_index);
    }

    let cluster_count = cells.len();
    let mut positions = vec![0.0f64; cluster_count * 3];
    let mut normals = vec![0.0f64; if mesh.has_normals() { cluster_count * 3 } else { 0 }];
    let mut colors = vec![0.0f64; if mesh.has_colors() { cluster_count * 3 } else { 0 }];

    for (old, &new) in remap.iter().enumerate() {
        let n = new as usize;
        for axis in 0..3 {
            positions[n * 3 + axis] += mesh.positions[old * 3 + axis] as f64;
            if mesh.has_normals() {
                normals[n * 3 + axis] += mesh.normals[old * 3 + axis] as f64;
            }
            if mesh.has_colors() {
                colors[n * 3 + axis] += mesh.colors[old * 3 + axis] as f64;
            }
        }
    }

    let mean = |sums: Vec<f64>| -> Vec<f32> {
        sums.chunks_exact(3)
            .zip(&members)
            .flat_map(|(s, &count)| s.iter().map(move |v| (v / count as f64) as f32))
            .collect()
    };
    let positions = mean(positions);
    let colors = mean(colors);
    let normals: Vec<f32> = normals
        .chunks_exact(3)
        .flat_map(|n| {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            let inv = if len > 0.0 { 1.0 / len } else { 0.0 };
            n.iter().map(|v| (v * inv) as f32).collect::<Vec<_>>()
        })
        .collect();

    let mut seen: HashSet<[u32; 3]> = HashSet::new();
    let mut indices = Vec::with_capacity(mesh.indices.len());
    for tri in mesh.indices.chunks_exact(3) {
        let t = [
            remap[tri[0] as usize],
            remap[tri[1] as usize],
            remap[tri[2] as usize],
        ];
        if t[0] == t[1] || t[1] == t[2] || t[0] == t[2] {
            continue;
        }
        let mut key = t;
        key.sort_unstable();
        if seen.insert(key) {
            indices.extend_from_slice(&t);
        }
    }

    Ok(IndexedMesh {
        positions,
        normals,
        colors,
        indices,
    })
}

/// Unique undirected edges of the mesh as per-vertex neighbour lists.
fn vertex_neighbours(mesh: &IndexedMesh) -> Vec<Vec<u32>> {
    let mut neighbours: Vec<HashSet<u32>> = vec![HashSet::new(); mesh.vertex_count()];
    for tri in mesh.indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            if a != b {
                neighbours[a as usize].insert(b);
                neighbours[b as usize].insert(a);
            }
        }
    }
    neighbours
        .into_iter()
        .map(|set| set.into_iter().collect())
        .collect()
}

/// Simple smoothing: each pass moves every vertex to the mean of itself and
/// its edge-adjacent neighbours. Topology is untouched.
pub fn smooth_simple(mesh: &IndexedMesh, iterations: usize) -> IndexedMesh {
    let mut out = mesh.clone();
    if iterations == 0 || mesh.is_empty() {
        return out;
    }

    let neighbours = vertex_neighbours(mesh);
    let mut next = out.positions.clone();
    for _ in 0..iterations {
        for (v, adjacent) in neighbours.iter().enumerate() {
            let weight = 1.0 / (adjacent.len() + 1) as f64;
            for axis in 0..3 {
                let sum: f64 = out.positions[v * 3 + axis] as f64
                    + adjacent
                        .iter()
                        .map(|&n| out.positions[n as usize * 3 + axis] as f64)
                        .sum::<f64>();
                next[v * 3 + axis] = (sum * weight) as f32;
            }
        }
        std::mem::swap(&mut out.positions, &mut next);
    }
    out
}
