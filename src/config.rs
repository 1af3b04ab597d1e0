use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Extension of tile definition and metadata files.
pub const GEOJSON_EXTENSION: &str = "geojson";
/// Extension of renderer scene files.
pub const SCENE_EXTENSION: &str = "xml";
/// Extension of mesh files.
pub const MESH_EXTENSION: &str = "ply";
/// Marker reserved for tile metadata file stems.
pub const TILEINFO_MARKER: &str = "tileinfo";
/// Mesh directory name under a dataset root.
pub const MESH_DIR_NAME: &str = "meshes";
/// Unit rectangle template used for ground frames.
pub const GROUND_TEMPLATE_NAME: &str = "rectangle.ply";
/// Suffix of per-tile ground frame meshes.
pub const FRAME_SUFFIX: &str = "_Frame";
/// Suffix of ASCII mesh copies.
pub const ASCII_SUFFIX: &str = "_ascii";
/// Margin added around the ground frame so tile edges do not show seams.
pub const GROUND_PADDING: f64 = 100.0;

/// Units of the projected CRS, converted to metres in the local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Units {
    #[value(name = "m")]
    Meters,
    #[value(name = "ft")]
    Feet,
    #[value(name = "us-ft")]
    UsSurveyFeet,
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Units::Meters => write!(f, "m"),
            Units::Feet => write!(f, "ft"),
            Units::UsSurveyFeet => write!(f, "us-ft"),
        }
    }
}

/// Definition of the local planar frame shared by every tile.
///
/// Coordinates are projected from `source_crs` to `target_crs`, shifted so
/// the origin lands at (0, 0) and scaled to metres.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFrameConfig {
    pub source_crs: String,
    pub target_crs: String,
    /// Geographic origin `[lon, lat]` in degrees.
    pub origin_geo: [f64; 2],
    /// Projected origin in target CRS units. Derived from `origin_geo` when `None`.
    pub origin_projected: Option<[f64; 2]>,
    pub units: Units,
}

impl Default for LocalFrameConfig {
    fn default() -> Self {
        Self {
            source_crs: "EPSG:4326".into(),
            target_crs: "EPSG:2249".into(),
            origin_geo: [-71.0589, 42.3601],
            origin_projected: None,
            units: Units::UsSurveyFeet,
        }
    }
}

/// Parameters of a single tile assembly.
#[derive(Debug, Clone, Default)]
pub struct AssembleConfig {
    /// GeoJSON feature collection with the tile's models.
    pub features: PathBuf,
    pub tile_name: String,
    /// Tile center in local coordinates. Bounding-box center when `None`.
    pub tile_center: Option<[f64; 2]>,
    /// Output directory. The dataset root when `None`.
    pub output: Option<PathBuf>,
    pub frame: LocalFrameConfig,
}

/// Parameters of a simplified dataset export.
#[derive(Debug, Clone)]
pub struct SimplifyConfig {
    pub tile_name: String,
    pub output: PathBuf,
    /// Voxel size used by vertex clustering.
    pub precision: f32,
    pub smooth: bool,
    pub smooth_iterations: usize,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            tile_name: String::new(),
            output: PathBuf::new(),
            precision: 0.5,
            smooth: false,
            smooth_iterations: 1,
        }
    }
}

/// Parameters of the ASCII mesh conversion.
#[derive(Debug, Clone, Default)]
pub struct AsciiConfig {
    /// Destination directory. The dataset mesh directory when `None`.
    pub output: Option<PathBuf>,
}

/// Operation selected on the command line.
#[derive(Debug, Clone)]
pub enum Command {
    Tiles,
    Assemble(AssembleConfig),
    Simplify(SimplifyConfig),
    Ascii(AsciiConfig),
}

/// Fully resolved pipeline configuration (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub dataset: PathBuf,
    pub verbose: bool,
    pub command: Command,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("dataset"),
            verbose: false,
            command: Command::Tiles,
        }
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "scene-tiler",
    about = "Building footprint datasets to tiled renderer scenes",
    version
)]
pub struct CliArgs {
    /// Dataset directory (tile GeoJSON files and meshes/)
    #[arg(short = 'd', long, default_value = "dataset", global = true)]
    pub dataset: PathBuf,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CommandArgs,
}

#[derive(Subcommand, Debug)]
pub enum CommandArgs {
    /// List the tiles found in the dataset
    Tiles,
    /// Assemble one tile scene from a GeoJSON feature collection
    Assemble(AssembleArgs),
    /// Export a tile with simplified meshes
    Simplify(SimplifyArgs),
    /// Rewrite every dataset mesh as ASCII PLY
    Ascii(AsciiArgs),
}

#[derive(clap::Args, Debug)]
pub struct AssembleArgs {
    /// GeoJSON file with the tile's model footprints
    #[arg(short = 'f', long)]
    pub features: PathBuf,

    /// Tile name
    #[arg(short = 'n', long)]
    pub name: String,

    /// Tile center X in local metres
    #[arg(long, requires = "center_y", allow_hyphen_values = true)]
    pub center_x: Option<f64>,

    /// Tile center Y in local metres
    #[arg(long, requires = "center_x", allow_hyphen_values = true)]
    pub center_y: Option<f64>,

    /// Output directory (default: dataset directory)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// CRS of the input features
    #[arg(long, default_value = "EPSG:4326")]
    pub source_crs: String,

    /// Projected CRS of the local frame
    #[arg(long, default_value = "EPSG:2249")]
    pub target_crs: String,

    /// Local frame origin longitude in degrees
    #[arg(long, default_value_t = -71.0589, allow_hyphen_values = true)]
    pub origin_lon: f64,

    /// Local frame origin latitude in degrees
    #[arg(long, default_value_t = 42.3601, allow_hyphen_values = true)]
    pub origin_lat: f64,

    /// Local frame origin easting in target CRS units
    #[arg(long, requires = "origin_northing", allow_hyphen_values = true)]
    pub origin_easting: Option<f64>,

    /// Local frame origin northing in target CRS units
    #[arg(long, requires = "origin_easting", allow_hyphen_values = true)]
    pub origin_northing: Option<f64>,

    /// Units of the target CRS
    #[arg(long, value_enum, default_value = "us-ft")]
    pub units: Units,
}

#[derive(clap::Args, Debug)]
pub struct SimplifyArgs {
    /// Tile to export
    #[arg(short = 't', long)]
    pub tile: String,

    /// Output directory (must differ from the dataset directory)
    #[arg(short = 'o', long)]
    pub output: PathBuf,

    /// Vertex clustering voxel size
    #[arg(long, default_value_t = 0.5)]
    pub precision: f32,

    /// Smooth meshes before clustering
    #[arg(long)]
    pub smooth: bool,

    /// Smoothing iterations
    #[arg(long, default_value_t = 1)]
    pub smooth_iterations: usize,
}

#[derive(clap::Args, Debug)]
pub struct AsciiArgs {
    /// Output directory (default: dataset mesh directory)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

impl From<CliArgs> for PipelineConfig {
    fn from(args: CliArgs) -> Self {
        let command = match args.command {
            CommandArgs::Tiles => Command::Tiles,
            CommandArgs::Assemble(a) => {
                let tile_center = a.center_x.zip(a.center_y).map(|(x, y)| [x, y]);
                let origin_projected = a
                    .origin_easting
                    .zip(a.origin_northing)
                    .map(|(e, n)| [e, n]);
                Command::Assemble(AssembleConfig {
                    features: a.features,
                    tile_name: a.name,
                    tile_center,
                    output: a.output,
                    frame: LocalFrameConfig {
                        source_crs: a.source_crs,
                        target_crs: a.target_crs,
                        origin_geo: [a.origin_lon, a.origin_lat],
                        origin_projected,
                        units: a.units,
                    },
                })
            }
            CommandArgs::Simplify(s) => Command::Simplify(SimplifyConfig {
                tile_name: s.tile,
                output: s.output,
                precision: s.precision,
                smooth: s.smooth,
                smooth_iterations: s.smooth_iterations,
            }),
            CommandArgs::Ascii(a) => Command::Ascii(AsciiConfig { output: a.output }),
        };

        PipelineConfig {
            dataset: args.dataset,
            verbose: args.verbose,
            command,
        }
    }
}
