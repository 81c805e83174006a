use std::path::PathBuf;

use acusim::stats::{
    container_estimate, mean_particle_count, sample_estimate, SampleParams,
    DEFAULT_PARTICLE_VOLUME_ML, DEFAULT_SAMPLE_VOLUME_ML,
};
use clap::Parser;
use log::info;

#[derive(Debug, clap::Parser)]
#[command(
    name = "acusim_count",
    about = "Estimate microplastic content of a container from snapshot particle counts"
)]
pub struct CountCli {
    /// Snapshot CSV files; the particle count is averaged over them.
    #[arg(required = true)]
    pub snapshots: Vec<PathBuf>,

    #[arg(short = 'c', long = "container-volume-l")]
    pub container_volume_l: f64,

    #[arg(long = "sample-volume-ml", default_value_t = DEFAULT_SAMPLE_VOLUME_ML)]
    pub sample_volume_ml: f64,

    #[arg(long = "particle-volume-ml", default_value_t = DEFAULT_PARTICLE_VOLUME_ML)]
    pub particle_volume_ml: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = CountCli::parse();

    let params = SampleParams {
        sample_volume_ml: args.sample_volume_ml,
        particle_volume_ml: args.particle_volume_ml,
    };

    let count = mean_particle_count(&args.snapshots)?;
    info!("Mean particle count over {} snapshots: {}", args.snapshots.len(), count);

    let sample = sample_estimate(count, &params)?;
    let container = container_estimate(count, &params, args.container_volume_l)?;

    println!(
        "\
Sample:
  Particles detected: {count:.2}
  Particle volume in {sample_ml} ml: {volume:.4} ml
  Particle volume fraction: {percentage:.4}%

Container ({litres} L):
  Estimated particles: {total}
  Estimated particle volume: {c_volume:.4} ml
  Particle volume fraction: {c_percentage:.4}%",
        count = sample.particle_count,
        sample_ml = params.sample_volume_ml,
        volume = sample.particle_volume_ml,
        percentage = sample.volume_percentage,
        litres = args.container_volume_l,
        total = container.particle_count.floor() as u64,
        c_volume = container.particle_volume_ml,
        c_percentage = container.volume_percentage,
    );
    Ok(())
}
