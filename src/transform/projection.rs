use proj::Proj;
use tracing::debug;

use super::coordinates::unit_scale_factor;
use crate::config::LocalFrameConfig;
use crate::error::{Result, SceneTilerError};

/// Geographic CRS of the frame's geographic origin.
const GEOGRAPHIC_CRS: &str = "EPSG:4326";

fn create_projection(from: &str, to: &str) -> Result<Proj> {
    Proj::new_known_crs(from, to, None).map_err(|e| {
        SceneTilerError::Transform(format!("Failed to create projection from {from} to {to}: {e}"))
    })
}

fn convert(proj: &Proj, x: f64, y: f64) -> Result<(f64, f64)> {
    proj.convert((x, y))
        .map_err(|e| SceneTilerError::Transform(format!("Projection of ({x}, {y}) failed: {e}")))
}

/// Project a single point between two known CRSs.
///
/// Geographic coordinates are `(longitude, latitude)` in degrees.
pub fn project_point(from: &str, to: &str, x: f64, y: f64) -> Result<(f64, f64)> {
    convert(&create_projection(from, to)?, x, y)
}

/// Local planar frame: projected coordinates relative to a fixed origin, in metres.
pub struct LocalFrame {
    projection: Option<Proj>,
    origin: [f64; 2],
    scale: f64,
}

impl LocalFrame {
    /// Build the frame described by `config`.
    ///
    /// The projected origin is taken from the config or derived by projecting
    /// the geographic origin into the target CRS.
    pub fn from_config(config: &LocalFrameConfig) -> Result<Self> {
        let projection = if config.source_crs == config.target_crs {
            None
        } else {
            Some(create_projection(&config.source_crs, &config.target_crs)?)
        };

        let origin = match config.origin_projected {
            Some(origin) => origin,
            None => {
                let [lon, lat] = config.origin_geo;
                let (x, y) = project_point(GEOGRAPHIC_CRS, &config.target_crs, lon, lat)?;
                [x, y]
            }
        };

        debug!(
            source = %config.source_crs,
            target = %config.target_crs,
            origin_x = origin[0],
            origin_y = origin[1],
            units = %config.units,
            "Local frame"
        );

        Ok(Self {
            projection,
            origin,
            scale: unit_scale_factor(config.units),
        })
    }

    /// Frame for coordinates already in the projected CRS.
    pub fn offset(origin: [f64; 2], scale: f64) -> Self {
        Self {
            projection: None,
            origin,
            scale,
        }
    }

    /// Projected origin of the frame.
    pub fn origin(&self) -> [f64; 2] {
        self.origin
    }

    /// Map a source coordinate to local metres.
    pub fn to_local(&self, x: f64, y: f64) -> Result<[f64; 2]> {
        let (px, py) = match &self.projection {
            Some(proj) => convert(proj, x, y)?,
            None => (x, y),
        };
        Ok([
            (px - self.origin[0]) * self.scale,
            (py - self.origin[1]) * self.scale,
        ])
    }
}
