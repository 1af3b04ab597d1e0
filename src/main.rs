use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use scene_tiler::config::{CliArgs, PipelineConfig};
use scene_tiler::pipeline::{Pipeline, print_summary};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing
    let filter = if args.verbose {
        EnvFilter::new("scene_tiler=debug")
    } else {
        EnvFilter::new("scene_tiler=info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config: PipelineConfig = args.into();

    match Pipeline::run(&config) {
        Ok(result) => {
            print_summary(&result);
            println!("Done in {:.2}s", result.duration.as_secs_f64());
            Ok(())
        }
        Err(e) => {
            error!(%e, "Pipeline failed");
            Err(anyhow::anyhow!(e)).context("scene-tiler pipeline failed")
        }
    }
}
