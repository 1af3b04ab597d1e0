pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod tiling;
pub mod transform;
pub mod types;

pub use config::{LocalFrameConfig, PipelineConfig, SimplifyConfig, Units};
pub use error::{Result, SceneTilerError};
pub use ingestion::TileCatalog;
pub use pipeline::Pipeline;
