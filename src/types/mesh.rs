/// Triangle mesh as stored in the dataset's PLY files.
///
/// All buffers are contiguous `Vec<f32>` / `Vec<u32>`; normals and colors are
/// either empty or carry one entry per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    /// Interleaved positions: [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Interleaved normals: [nx, ny, nz, ...] or empty
    pub normals: Vec<f32>,
    /// Interleaved vertex colors: [r, g, b, ...] in 0.0-1.0 or empty
    pub colors: Vec<f32>,
    /// Triangle indices into the vertex buffers
    pub indices: Vec<u32>,
}

impl IndexedMesh {
    /// Number of vertices (positions / 3).
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles (indices / 3).
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether normals are present.
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Whether vertex colors are present.
    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    /// Whether the mesh contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Minimum and maximum corner of the vertex positions.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut chunks = self.positions.chunks_exact(3);
        let first = chunks.next()?;
        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for p in chunks {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some((min, max))
    }

    /// Scale positions in the XY plane, leaving z untouched.
    pub fn scale_xy(&mut self, factor: f64) {
        for p in self.positions.chunks_exact_mut(3) {
            p[0] = ((p[0] as f64) * factor) as f32;
            p[1] = ((p[1] as f64) * factor) as f32;
        }
    }
}
