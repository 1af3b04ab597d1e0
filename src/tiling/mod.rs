pub mod ascii;
pub mod assembler;
pub mod export;
pub mod metadata;
pub mod ply_writer;
pub mod progress;
pub mod scene_writer;
pub mod simplifier;

pub use assembler::{AssembledTile, AssemblyRequest, assemble};
pub use export::{SimplifyStats, simplify_tile};
