use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use glam::DMat4;
use tracing::debug;

use crate::error::{Result, SceneTilerError};
use crate::types::scene::{GROUND_ID, INTEGRATOR_ID, LIGHT_ID};
use crate::types::{Bsdf, Emitter, Integrator, Placement, SceneDescription};

const SCENE_VERSION: &str = "3.0.0";
const INDENT: &str = "    ";

/// Escape a string for use inside a double-quoted XML attribute.
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn join(values: impl IntoIterator<Item = f64>, sep: &str) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Row-major matrix values, as the renderer reads them.
fn matrix_value(m: &DMat4) -> String {
    join(m.transpose().to_cols_array(), " ")
}

fn write_bsdf(out: &mut String, bsdf: &Bsdf, id: Option<&str>, depth: usize) -> fmt::Result {
    let pad = INDENT.repeat(depth);
    let id_attr = id
        .map(|id| format!(" id=\"{}\"", escape(id)))
        .unwrap_or_default();
    match bsdf {
        Bsdf::TwoSided(inner) => {
            writeln!(out, "{pad}<bsdf type=\"twosided\"{id_attr}>")?;
            write_bsdf(out, inner, None, depth + 1)?;
            writeln!(out, "{pad}</bsdf>")
        }
        Bsdf::Diffuse { reflectance } => {
            writeln!(out, "{pad}<bsdf type=\"diffuse\"{id_attr}>")?;
            writeln!(
                out,
                "{pad}{INDENT}<rgb name=\"reflectance\" value=\"{}\"/>",
                join(*reflectance, ", ")
            )?;
            writeln!(out, "{pad}</bsdf>")
        }
    }
}

fn write_shape(out: &mut String, id: &str, placement: &Placement) -> fmt::Result {
    writeln!(out, "{INDENT}<shape type=\"ply\" id=\"{}\">", escape(id))?;
    writeln!(
        out,
        "{INDENT}{INDENT}<string name=\"filename\" value=\"{}\"/>",
        escape(&placement.mesh)
    )?;
    writeln!(
        out,
        "{INDENT}{INDENT}<ref name=\"bsdf\" id=\"{}\"/>",
        placement.material.id()
    )?;
    writeln!(out, "{INDENT}{INDENT}<transform name=\"to_world\">")?;
    writeln!(
        out,
        "{INDENT}{INDENT}{INDENT}<matrix value=\"{}\"/>",
        matrix_value(&placement.to_world)
    )?;
    writeln!(out, "{INDENT}{INDENT}</transform>")?;
    writeln!(out, "{INDENT}</shape>")
}

fn render(scene: &SceneDescription, out: &mut String) -> fmt::Result {
    writeln!(out, "<scene version=\"{SCENE_VERSION}\">")?;

    let integrator = match scene.integrator {
        Integrator::Path => "path",
    };
    writeln!(out, "{INDENT}<integrator type=\"{integrator}\" id=\"{INTEGRATOR_ID}\"/>")?;

    let emitter = match scene.light {
        Emitter::Constant => "constant",
    };
    writeln!(out, "{INDENT}<emitter type=\"{emitter}\" id=\"{LIGHT_ID}\"/>")?;

    for material in &scene.materials {
        write_bsdf(out, &material.bsdf, Some(material.id.id()), 1)?;
    }

    write_shape(out, GROUND_ID, &scene.ground)?;
    for (model_id, placement) in &scene.models {
        write_shape(out, model_id, placement)?;
    }

    writeln!(out, "</scene>")
}

/// Serialize a scene description to the renderer's XML format.
pub fn scene_to_xml(scene: &SceneDescription) -> Result<String> {
    let mut out = String::new();
    render(scene, &mut out)
        .map_err(|e| SceneTilerError::Output(format!("Failed to format scene: {e}")))?;
    Ok(out)
}

/// Write a scene description to `path`.
pub fn write_scene(path: &Path, scene: &SceneDescription) -> Result<()> {
    let xml = scene_to_xml(scene)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &xml)?;
    debug!(path = %path.display(), bytes = xml.len(), "Wrote scene");
    Ok(())
}
