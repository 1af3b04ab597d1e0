use glam::{DMat4, DVec3};
use indexmap::IndexMap;

use crate::error::{Result, SceneTilerError};

/// Scene-file ids of the fixed entries.
pub const INTEGRATOR_ID: &str = "integrator";
pub const LIGHT_ID: &str = "light";
pub const GROUND_ID: &str = "ground";

/// Named materials available to every tile scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialId {
    Brick,
    Concrete,
    MediumDryGround,
}

impl MaterialId {
    pub const ALL: [MaterialId; 3] = [
        MaterialId::Brick,
        MaterialId::Concrete,
        MaterialId::MediumDryGround,
    ];

    /// Identifier used for the BSDF in the scene file.
    pub fn id(self) -> &'static str {
        match self {
            MaterialId::Brick => "mat-itu_brick",
            MaterialId::Concrete => "mat-itu_concrete",
            MaterialId::MediumDryGround => "mat-itu_medium_dry_ground",
        }
    }

    /// Linear RGB diffuse reflectance.
    pub fn reflectance(self) -> [f64; 3] {
        match self {
            MaterialId::Brick => [0.401968, 0.111874, 0.086764],
            MaterialId::Concrete => [0.539479, 0.539479, 0.539480],
            MaterialId::MediumDryGround => [65.0 / 255.0, 60.0 / 255.0, 60.0 / 255.0],
        }
    }
}

/// Light transport algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Integrator {
    #[default]
    Path,
}

/// Scene illumination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emitter {
    #[default]
    Constant,
}

/// Scattering model of a material.
#[derive(Debug, Clone, PartialEq)]
pub enum Bsdf {
    TwoSided(Box<Bsdf>),
    Diffuse { reflectance: [f64; 3] },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub bsdf: Bsdf,
}

impl Material {
    /// Two-sided diffuse material with the id's reflectance.
    pub fn two_sided_diffuse(id: MaterialId) -> Self {
        Self {
            id,
            bsdf: Bsdf::TwoSided(Box::new(Bsdf::Diffuse {
                reflectance: id.reflectance(),
            })),
        }
    }
}

/// One mesh instance in a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Mesh file, relative to the scene file when possible.
    pub mesh: String,
    pub material: MaterialId,
    pub to_world: DMat4,
}

impl Placement {
    /// Place a mesh at `translation`.
    pub fn translated(mesh: impl Into<String>, material: MaterialId, translation: DVec3) -> Self {
        Self {
            mesh: mesh.into(),
            material,
            to_world: DMat4::from_translation(translation),
        }
    }

    /// Translation part of the placement transform.
    pub fn translation(&self) -> DVec3 {
        self.to_world.w_axis.truncate()
    }
}

/// Complete description of one tile scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescription {
    pub integrator: Integrator,
    pub light: Emitter,
    pub materials: Vec<Material>,
    pub ground: Placement,
    /// Model placements keyed by model id, in insertion order.
    pub models: IndexMap<String, Placement>,
}

impl SceneDescription {
    /// Scene with the fixed integrator, light and material set.
    pub fn new(ground: Placement) -> Self {
        Self {
            integrator: Integrator::default(),
            light: Emitter::default(),
            materials: MaterialId::ALL
                .into_iter()
                .map(Material::two_sided_diffuse)
                .collect(),
            ground,
            models: IndexMap::new(),
        }
    }

    /// Whether `id` names one of the fixed scene entries.
    pub fn is_reserved_id(id: &str) -> bool {
        [INTEGRATOR_ID, LIGHT_ID, GROUND_ID].contains(&id)
            || MaterialId::ALL.iter().any(|m| m.id() == id)
    }

    /// Insert a model, returning the placement it replaced.
    ///
    /// Ids shared with the fixed entries are rejected: the scene file needs
    /// every id to be unique.
    pub fn insert_model(
        &mut self,
        model_id: impl Into<String>,
        placement: Placement,
    ) -> Result<Option<Placement>> {
        let model_id = model_id.into();
        if Self::is_reserved_id(&model_id) {
            return Err(SceneTilerError::Input(format!(
                "Model id '{model_id}' clashes with a fixed scene entry"
            )));
        }
        Ok(self.models.insert(model_id, placement))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}
