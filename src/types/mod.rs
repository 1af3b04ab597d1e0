pub mod feature;
pub mod mesh;
pub mod scene;
pub mod tile;

pub use feature::{Feature, FeatureCollection, Geometry, ModelFeature, StructType};
pub use mesh::IndexedMesh;
pub use scene::{Bsdf, Emitter, Integrator, Material, MaterialId, Placement, SceneDescription};
pub use tile::{BoundingBox, TileDescriptor, TileMetadata};
