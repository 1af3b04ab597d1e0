use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::scene::MaterialId;
use crate::error::{Result, SceneTilerError};

/// Attribute holding the model identifier (mesh file stem).
pub const MODEL_ID_KEY: &str = "Model_ID";
/// Attribute holding the structure type.
pub const STRUCT_TYPE_KEY: &str = "StructType";
/// Local centroid / tile center X, in metres.
pub const CENTER_X_KEY: &str = "Centr_X_m";
/// Local centroid / tile center Y, in metres.
pub const CENTER_Y_KEY: &str = "Centr_Y_m";
pub const N_MODELS_KEY: &str = "n_models";
pub const N_TRIANGLES_KEY: &str = "n_triangles";

/// A GeoJSON position: `[x, y]` or `[x, y, z]`.
pub type Position = Vec<f64>;
/// Rings of one polygon; the first ring is the exterior.
pub type PolygonRings = Vec<Vec<Position>>;

/// Footprint geometry. Only areal geometries are meaningful for buildings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: PolygonRings },
    MultiPolygon { coordinates: Vec<PolygonRings> },
}

impl Geometry {
    /// Polygons making up the geometry.
    pub fn polygons(&self) -> &[PolygonRings] {
        match self {
            Geometry::Polygon { coordinates } => std::slice::from_ref(coordinates),
            Geometry::MultiPolygon { coordinates } => coordinates,
        }
    }

    pub fn polygons_mut(&mut self) -> &mut [PolygonRings] {
        match self {
            Geometry::Polygon { coordinates } => std::slice::from_mut(coordinates),
            Geometry::MultiPolygon { coordinates } => coordinates,
        }
    }

    /// Iterate over every position of every ring.
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.polygons().iter().flatten().flatten()
    }
}

fn line_string(ring: &[Position]) -> LineString<f64> {
    ring.iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect()
}

/// Planar view of the footprint. Rings are closed and z is dropped.
impl From<&Geometry> for MultiPolygon<f64> {
    fn from(geometry: &Geometry) -> Self {
        geometry
            .polygons()
            .iter()
            .filter_map(|rings| {
                let (exterior, holes) = rings.split_first()?;
                Some(Polygon::new(
                    line_string(exterior),
                    holes.iter().map(|h| line_string(h)).collect(),
                ))
            })
            .collect()
    }
}

fn feature_tag() -> String {
    "Feature".into()
}

fn collection_tag() -> String {
    "FeatureCollection".into()
}

/// A GeoJSON feature with free-form attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_tag")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    pub geometry: Option<Geometry>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self {
            kind: feature_tag(),
            id: None,
            properties: Some(properties),
            geometry: Some(geometry),
        }
    }

    /// Attribute lookup.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// Set an attribute, creating the attribute table if needed.
    pub fn set_property(&mut self, key: &str, value: impl Into<Value>) {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
    }
}

/// A GeoJSON feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_tag")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: collection_tag(),
            crs: None,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Structure type of a model. Walls render as brick, everything else as concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructType {
    Wall,
    #[default]
    Other,
}

impl StructType {
    /// Parse the `StructType` attribute; anything but `"Wall"` is `Other`.
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("Wall") => StructType::Wall,
            _ => StructType::Other,
        }
    }

    pub fn material(self) -> MaterialId {
        match self {
            StructType::Wall => MaterialId::Brick,
            StructType::Other => MaterialId::Concrete,
        }
    }
}

/// Typed view of one model row of a tile's feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFeature {
    pub model_id: String,
    pub struct_type: StructType,
    pub geometry: Geometry,
}

impl ModelFeature {
    pub fn from_feature(feature: &Feature) -> Result<Self> {
        let model_id = match feature.property(MODEL_ID_KEY) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(SceneTilerError::Input(format!(
                    "Feature is missing a '{MODEL_ID_KEY}' attribute"
                )));
            }
        };

        let struct_type =
            StructType::from_attribute(feature.property(STRUCT_TYPE_KEY).and_then(Value::as_str));

        let geometry = feature.geometry.clone().ok_or_else(|| {
            SceneTilerError::Input(format!("Model '{model_id}' has no geometry"))
        })?;

        Ok(Self {
            model_id,
            struct_type,
            geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(x0: f64, y0: f64, size: f64) -> Geometry {
        Geometry::Polygon {
            coordinates: vec![vec![
                vec![x0, y0],
                vec![x0 + size, y0],
                vec![x0 + size, y0 + size],
                vec![x0, y0 + size],
                vec![x0, y0],
            ]],
        }
    }

    #[test]
    fn struct_type_material_policy() {
        assert_eq!(StructType::from_attribute(Some("Wall")), StructType::Wall);
        assert_eq!(StructType::from_attribute(Some("Roof")), StructType::Other);
        assert_eq!(StructType::from_attribute(Some("wall")), StructType::Other);
        assert_eq!(StructType::from_attribute(None), StructType::Other);
        assert_eq!(StructType::Wall.material(), MaterialId::Brick);
        assert_eq!(StructType::Other.material(), MaterialId::Concrete);
    }

    #[test]
    fn parse_feature_collection() {
        let raw = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "Model_ID": "BLDG_0001", "StructType": "Wall" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                }
            }]
        });
        let fc: FeatureCollection = serde_json::from_value(raw).unwrap();
        assert_eq!(fc.len(), 1);

        let model = ModelFeature::from_feature(&fc.features[0]).unwrap();
        assert_eq!(model.model_id, "BLDG_0001");
        assert_eq!(model.struct_type, StructType::Wall);
        assert_eq!(model.geometry.positions().count(), 4);
    }

    #[test]
    fn numeric_model_id() {
        let mut props = Map::new();
        props.insert(MODEL_ID_KEY.into(), json!(42));
        let feature = Feature::new(square(0.0, 0.0, 1.0), props);
        let model = ModelFeature::from_feature(&feature).unwrap();
        assert_eq!(model.model_id, "42");
        assert_eq!(model.struct_type, StructType::Other);
    }

    #[test]
    fn missing_model_id_is_input_error() {
        let feature = Feature::new(square(0.0, 0.0, 1.0), Map::new());
        let err = ModelFeature::from_feature(&feature).unwrap_err();
        assert!(matches!(err, SceneTilerError::Input(_)));
        assert!(err.to_string().contains(MODEL_ID_KEY));
    }

    #[test]
    fn multipolygon_positions() {
        let Geometry::Polygon { coordinates: a } = square(0.0, 0.0, 1.0) else {
            unreachable!()
        };
        let Geometry::Polygon { coordinates: b } = square(5.0, 5.0, 1.0) else {
            unreachable!()
        };
        let geom = Geometry::MultiPolygon {
            coordinates: vec![a, b],
        };
        assert_eq!(geom.polygons().len(), 2);
        assert_eq!(geom.positions().count(), 10);
    }

    #[test]
    fn planar_view_drops_z_and_keeps_holes() {
        let geom = Geometry::Polygon {
            coordinates: vec![
                vec![vec![0.0, 0.0, 7.0], vec![4.0, 0.0, 7.0], vec![4.0, 4.0, 7.0], vec![0.0, 0.0, 7.0]],
                vec![vec![1.0, 1.0], vec![2.0, 1.0], vec![2.0, 2.0], vec![1.0, 1.0]],
            ],
        };
        let planar = MultiPolygon::from(&geom);
        assert_eq!(planar.0.len(), 1);
        assert_eq!(planar.0[0].exterior().0[1], Coord { x: 4.0, y: 0.0 });
        assert_eq!(planar.0[0].interiors().len(), 1);

        let empty = Geometry::MultiPolygon {
            coordinates: vec![vec![]],
        };
        assert!(MultiPolygon::from(&empty).0.is_empty());
    }

    #[test]
    fn set_property_on_bare_feature() {
        let mut feature = Feature {
            kind: "Feature".into(),
            id: None,
            properties: None,
            geometry: Some(square(0.0, 0.0, 1.0)),
        };
        feature.set_property(CENTER_X_KEY, 0.5);
        assert_eq!(feature.property(CENTER_X_KEY), Some(&json!(0.5)));
    }
}
