use geo::{BoundingRect, Centroid, MultiPolygon};

use crate::config::Units;
use crate::types::{BoundingBox, FeatureCollection, Geometry};

/// Return the multiplier to convert the given units to metres.
pub fn unit_scale_factor(units: Units) -> f64 {
    match units {
        Units::Meters => 1.0,
        Units::Feet => 0.3048,
        Units::UsSurveyFeet => 1200.0 / 3937.0,
    }
}

/// Bounding box of every footprint in the collection.
pub fn collection_bounds(collection: &FeatureCollection) -> BoundingBox {
    let mut bounds = BoundingBox::empty();
    for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
        if let Some(rect) = MultiPolygon::from(geometry).bounding_rect() {
            bounds.extend([rect.min().x, rect.min().y]);
            bounds.extend([rect.max().x, rect.max().y]);
        }
    }
    bounds
}

/// Area-weighted centroid of a polygonal geometry.
///
/// Zero-area footprints fall back to the centroid of their outline.
pub fn centroid(geometry: &Geometry) -> Option<[f64; 2]> {
    MultiPolygon::from(geometry)
        .centroid()
        .map(|p| [p.x(), p.y()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Feature;
    use crate::types::feature::Position;
    use approx::assert_relative_eq;
    use serde_json::Map;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Position> {
        vec![
            vec![x0, y0],
            vec![x1, y0],
            vec![x1, y1],
            vec![x0, y1],
            vec![x0, y0],
        ]
    }

    #[test]
    fn unit_factors() {
        assert_eq!(unit_scale_factor(Units::Meters), 1.0);
        assert_relative_eq!(unit_scale_factor(Units::Feet), 0.3048);
        assert_relative_eq!(unit_scale_factor(Units::UsSurveyFeet), 0.304_800_609_6, epsilon = 1e-10);
    }

    #[test]
    fn square_centroid() {
        let g = Geometry::Polygon {
            coordinates: vec![rect(0.0, 0.0, 4.0, 2.0)],
        };
        let c = centroid(&g).unwrap();
        assert_relative_eq!(c[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(c[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn clockwise_ring_same_centroid() {
        let mut ring = rect(10.0, 10.0, 12.0, 14.0);
        ring.reverse();
        let g = Geometry::Polygon {
            coordinates: vec![ring],
        };
        let c = centroid(&g).unwrap();
        assert_relative_eq!(c[0], 11.0, epsilon = 1e-9);
        assert_relative_eq!(c[1], 12.0, epsilon = 1e-9);
    }

    #[test]
    fn l_shape_centroid() {
        // 2x2 square plus 2x1 block to the right of its lower half
        let g = Geometry::Polygon {
            coordinates: vec![vec![
                vec![0.0, 0.0],
                vec![4.0, 0.0],
                vec![4.0, 1.0],
                vec![2.0, 1.0],
                vec![2.0, 2.0],
                vec![0.0, 2.0],
                vec![0.0, 0.0],
            ]],
        };
        let c = centroid(&g).unwrap();
        // (4 * (1, 1) + 2 * (3, 0.5)) / 6
        assert_relative_eq!(c[0], 10.0 / 6.0, epsilon = 1e-9);
        assert_relative_eq!(c[1], 5.0 / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn hole_shifts_centroid() {
        let g = Geometry::Polygon {
            coordinates: vec![rect(0.0, 0.0, 4.0, 4.0), rect(2.0, 0.0, 4.0, 4.0)],
        };
        let c = centroid(&g).unwrap();
        assert_relative_eq!(c[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(c[1], 2.0, epsilon = 1e-9);
    }

    #[test]
    fn multipolygon_weighted_by_area() {
        let g = Geometry::MultiPolygon {
            coordinates: vec![
                vec![rect(0.0, 0.0, 2.0, 2.0)],
                vec![rect(10.0, 0.0, 12.0, 2.0)],
            ],
        };
        let c = centroid(&g).unwrap();
        assert_relative_eq!(c[0], 6.0, epsilon = 1e-9);
        assert_relative_eq!(c[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_ring_uses_outline() {
        let g = Geometry::Polygon {
            coordinates: vec![vec![vec![0.0, 0.0], vec![2.0, 0.0], vec![4.0, 0.0]]],
        };
        let c = centroid(&g).unwrap();
        assert_relative_eq!(c[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(c[1], 0.0, epsilon = 1e-9);
        let empty = Geometry::Polygon {
            coordinates: vec![],
        };
        assert_eq!(centroid(&empty), None);
    }

    #[test]
    fn bounds_of_collection() {
        let fc = FeatureCollection::new(vec![
            Feature::new(
                Geometry::Polygon {
                    coordinates: vec![rect(-5.0, 0.0, 0.0, 3.0)],
                },
                Map::new(),
            ),
            Feature::new(
                Geometry::Polygon {
                    coordinates: vec![rect(10.0, -2.0, 12.0, 1.0)],
                },
                Map::new(),
            ),
        ]);
        let bb = collection_bounds(&fc);
        assert_eq!(bb.min, [-5.0, -2.0]);
        assert_eq!(bb.max, [12.0, 3.0]);
    }

    #[test]
    fn bounds_ignore_elevation_and_skip_bare_features() {
        let mut bare = Feature::new(
            Geometry::Polygon {
                coordinates: vec![rect(0.0, 0.0, 1.0, 1.0)],
            },
            Map::new(),
        );
        bare.geometry = None;
        let fc = FeatureCollection::new(vec![
            bare,
            Feature::new(
                Geometry::Polygon {
                    coordinates: vec![vec![
                        vec![3.0, 4.0, 50.0],
                        vec![6.0, 4.0, 50.0],
                        vec![6.0, 8.0, 50.0],
                        vec![3.0, 4.0, 50.0],
                    ]],
                },
                Map::new(),
            ),
        ]);
        let bb = collection_bounds(&fc);
        assert_eq!(bb.min, [3.0, 4.0]);
        assert_eq!(bb.max, [6.0, 8.0]);
    }
}
