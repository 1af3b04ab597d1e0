pub mod coordinates;
pub mod projection;

use std::time::Instant;

use tracing::info;

use crate::error::{Result, SceneTilerError};
use crate::types::FeatureCollection;

pub use coordinates::{centroid, collection_bounds};
pub use projection::LocalFrame;

/// Reproject a whole feature collection into the local frame.
///
/// Every position is mapped in one pass so the tile shares one frame.
/// Elevations (third ordinates) are carried through unchanged.
pub fn reproject_collection(
    collection: &FeatureCollection,
    frame: &LocalFrame,
) -> Result<FeatureCollection> {
    let start = Instant::now();
    let mut local = collection.clone();
    // Local coordinates no longer belong to the declared CRS
    local.crs = None;

    for feature in &mut local.features {
        let Some(geometry) = feature.geometry.as_mut() else {
            continue;
        };
        for ring in geometry.polygons_mut().iter_mut().flatten() {
            for position in ring.iter_mut() {
                if position.len() < 2 {
                    return Err(SceneTilerError::Input(format!(
                        "Position with {} ordinates",
                        position.len()
                    )));
                }
                let [x, y] = frame.to_local(position[0], position[1])?;
                position[0] = x;
                position[1] = y;
            }
        }
    }

    info!(
        features = local.len(),
        elapsed = ?start.elapsed(),
        "Converted features to local CRS"
    );
    Ok(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Feature, Geometry};
    use serde_json::{Map, json};

    fn collection() -> FeatureCollection {
        let mut fc = FeatureCollection::new(vec![Feature::new(
            Geometry::Polygon {
                coordinates: vec![vec![
                    vec![1000.0, 2000.0, 7.5],
                    vec![1010.0, 2000.0, 7.5],
                    vec![1010.0, 2010.0, 7.5],
                    vec![1000.0, 2000.0, 7.5],
                ]],
            },
            Map::new(),
        )]);
        fc.crs = Some(json!({"type": "name"}));
        fc
    }

    #[test]
    fn offsets_every_position() {
        let frame = LocalFrame::offset([1000.0, 2000.0], 1.0);
        let local = reproject_collection(&collection(), &frame).unwrap();
        let geom = local.features[0].geometry.as_ref().unwrap();
        let positions: Vec<_> = geom.positions().cloned().collect();
        assert_eq!(positions[0], vec![0.0, 0.0, 7.5]);
        assert_eq!(positions[2], vec![10.0, 10.0, 7.5]);
        assert!(local.crs.is_none());
    }

    #[test]
    fn scales_to_metres() {
        let frame = LocalFrame::offset([1000.0, 2000.0], 0.5);
        let local = reproject_collection(&collection(), &frame).unwrap();
        let bb = collection_bounds(&local);
        assert_eq!(bb.max, [5.0, 5.0]);
    }

    #[test]
    fn short_position_rejected() {
        let mut fc = collection();
        if let Some(Geometry::Polygon { coordinates }) = fc.features[0].geometry.as_mut() {
            coordinates[0][1] = vec![1.0];
        }
        let frame = LocalFrame::offset([0.0, 0.0], 1.0);
        assert!(matches!(
            reproject_collection(&fc, &frame),
            Err(SceneTilerError::Input(_))
        ));
    }
}
