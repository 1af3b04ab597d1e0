use std::path::PathBuf;

/// Axis-aligned bounding box in the local XY plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BoundingBox {
    /// Empty box that any point extends.
    pub fn empty() -> Self {
        Self {
            min: [f64::INFINITY; 2],
            max: [f64::NEG_INFINITY; 2],
        }
    }

    /// Whether no point has been added yet.
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    /// Grow the box to include `p`.
    pub fn extend(&mut self, p: [f64; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    /// Centre point of the box.
    pub fn center(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        ]
    }

    /// Extent along X.
    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    /// Extent along Y.
    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Closed counter-clockwise ring of the box corners.
    pub fn to_ring(&self) -> Vec<Vec<f64>> {
        vec![
            vec![self.min[0], self.min[1]],
            vec![self.max[0], self.min[1]],
            vec![self.max[0], self.max[1]],
            vec![self.min[0], self.max[1]],
            vec![self.min[0], self.min[1]],
        ]
    }
}

/// File locations belonging to one catalogued tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDescriptor {
    pub name: String,
    /// `<tile>_tileinfo.geojson`
    pub tileinfo_path: PathBuf,
    /// `<tile>.geojson`
    pub geo_scene_path: PathBuf,
    /// `<tile>.xml`
    pub mi_scene_path: PathBuf,
}

/// Summary record written next to every assembled tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMetadata {
    pub bounds: BoundingBox,
    pub center: [f64; 2],
    pub model_count: usize,
    pub triangle_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_box() -> BoundingBox {
        let mut bb = BoundingBox::empty();
        bb.extend([-10.0, 4.0]);
        bb.extend([30.0, -6.0]);
        bb
    }

    #[test]
    fn empty_box() {
        let bb = BoundingBox::empty();
        assert!(bb.is_empty());
        assert!(!sample_box().is_empty());
    }

    #[test]
    fn bounding_box_extent() {
        let bb = sample_box();
        assert_eq!(bb.min, [-10.0, -6.0]);
        assert_eq!(bb.max, [30.0, 4.0]);
        assert!((bb.width() - 40.0).abs() < f64::EPSILON);
        assert!((bb.height() - 10.0).abs() < f64::EPSILON);
        assert_eq!(bb.center(), [10.0, -1.0]);
    }

    #[test]
    fn ring_is_closed() {
        let ring = sample_box().to_ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring[2], vec![30.0, 4.0]);
    }
}
