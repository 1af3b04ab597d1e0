use std::time::{Duration, Instant};

use tracing::info;

use crate::config::{AsciiConfig, AssembleConfig, Command, PipelineConfig};
use crate::error::Result;
use crate::ingestion::{TileCatalog, geojson};
use crate::tiling::ascii::{self, AsciiStats};
use crate::tiling::{self, AssembledTile, AssemblyRequest, SimplifyStats};
use crate::transform::LocalFrame;

/// What a pipeline run produced.
#[derive(Debug)]
pub enum Outcome {
    Catalog(TileCatalog),
    Assembled(AssembledTile),
    Simplified { tile: String, stats: SimplifyStats },
    Converted(AsciiStats),
}

/// Summary of a completed pipeline run.
#[derive(Debug)]
pub struct ProcessingResult {
    pub outcome: Outcome,
    pub duration: Duration,
}

/// Pipeline orchestrator -- dispatches the selected command.
pub struct Pipeline;

impl Pipeline {
    /// Run the command selected in `config` against its dataset.
    pub fn run(config: &PipelineConfig) -> Result<ProcessingResult> {
        let start = Instant::now();
        info!(dataset = %config.dataset.display(), "Starting pipeline");

        let catalog = TileCatalog::enumerate(&config.dataset)?;

        let outcome = match &config.command {
            Command::Tiles => Outcome::Catalog(catalog),
            Command::Assemble(assemble) => {
                Outcome::Assembled(Self::assemble(&catalog, assemble)?)
            }
            Command::Simplify(simplify) => Outcome::Simplified {
                tile: simplify.tile_name.clone(),
                stats: tiling::simplify_tile(&catalog, simplify)?,
            },
            Command::Ascii(ascii) => Outcome::Converted(Self::ascii(&catalog, ascii)?),
        };

        let duration = start.elapsed();
        info!(elapsed = ?duration, "Pipeline complete");

        Ok(ProcessingResult { outcome, duration })
    }

    fn assemble(catalog: &TileCatalog, config: &AssembleConfig) -> Result<AssembledTile> {
        let features = geojson::read_feature_collection(&config.features)?;
        let frame = LocalFrame::from_config(&config.frame)?;
        let output_dir = config
            .output
            .as_deref()
            .unwrap_or_else(|| catalog.dataset_dir());

        let request = AssemblyRequest {
            tile_name: &config.tile_name,
            tile_center: config.tile_center,
            mesh_dir: catalog.mesh_dir(),
            output_dir,
        };
        tiling::assemble(&features, &frame, &request)
    }

    fn ascii(catalog: &TileCatalog, config: &AsciiConfig) -> Result<AsciiStats> {
        let dest = config
            .output
            .as_deref()
            .unwrap_or_else(|| catalog.mesh_dir());
        ascii::convert_all(catalog.mesh_dir(), dest)
    }
}

/// Print the human-readable summary of a run.
pub fn print_summary(result: &ProcessingResult) {
    match &result.outcome {
        Outcome::Catalog(catalog) => {
            println!("{} scenes imported.", catalog.len());
            for tile in catalog.tiles() {
                println!("  {}", tile.name);
            }
        }
        Outcome::Assembled(tile) => {
            println!(
                "Scene {} imported. There were {} models ({} triangles).",
                tile.name, tile.metadata.model_count, tile.metadata.triangle_count
            );
            println!("  Scene:    {}", tile.scene_path.display());
            println!("  Tileinfo: {}", tile.tileinfo_path.display());
        }
        Outcome::Simplified { tile, stats } => {
            println!(
                "Input scene {tile} has {} vertices and {} triangles.",
                stats.vertices_in, stats.triangles_in
            );
            println!(
                "Output scene has {} vertices and {} triangles.",
                stats.vertices_out, stats.triangles_out
            );
            println!("Saved in {}", stats.scene_path.display());
        }
        Outcome::Converted(stats) => {
            println!(
                "Converted {} meshes ({} vertices, {} triangles) to ASCII.",
                stats.files, stats.vertices, stats.triangles
            );
        }
    }
}
