use std::path::PathBuf;

use acusim::{
    config::{
        run::{RunContext, RunParams},
        setup::SetupConfig,
    },
    dynamics::run,
    geometry::point::mean_pairwise_nearest,
    snapshot::{write_run_metadata, CsvSnapshotWriter, MultiSink, PngSnapshotWriter},
};
use clap::Parser;
use log::{error, info};

#[derive(Debug, clap::Parser)]
#[command(name = "acusim_run", about = "Run a simulation, writing a CSV snapshot per frame")]
pub struct RunCli {
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,

    #[arg(short = 'n', long = "steps", default_value = "200")]
    pub n_steps: usize,

    /// Steps between written frames.
    #[arg(short = 'd', long = "dstep-view", default_value = "1")]
    pub dstep_view: usize,

    /// Simulated time between written frames; overrides --dstep-view.
    #[arg(long = "dt-view", conflicts_with = "dstep_view")]
    pub dt_view: Option<f64>,

    #[arg(short = 'o', long = "out", default_value = "CSV_set")]
    pub out_dir: PathBuf,

    /// Overrides the seed in the config file.
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Also write the initial state, as frame 0.
    #[arg(long = "write-initial")]
    pub write_initial: bool,

    /// Also render each frame as a PNG into this directory.
    #[arg(long = "png")]
    pub png_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = RunCli::parse();

    let setup_config = SetupConfig::parse(&args.config).inspect_err(|e| {
        error!("Could not read {}: {}", args.config.display(), e);
    })?;
    setup_config.print();

    // Pin the seed so that run.json reproduces this run.
    let setup_config = setup_config.seeded(args.seed);
    let mut sim_state = setup_config.initialize(None)?;
    info!("Initialized {} particles", sim_state.particles.len());

    let mut run_context = RunContext::new(&setup_config.parameters, sim_state.particles.len());
    let dstep_view = match args.dt_view {
        Some(dt_view) => setup_config.parameters.to_steps(dt_view),
        None => args.dstep_view,
    };
    let run_params = RunParams {
        n_steps: args.n_steps,
        dstep_view,
        write_initial: args.write_initial,
    };

    let metadata_path = write_run_metadata(&args.out_dir, &setup_config)?;
    info!("Wrote run parameters to {}", metadata_path.display());
    let mut sink = MultiSink::default();
    sink.sinks.push(Box::new(CsvSnapshotWriter::new(&args.out_dir)?));
    if let Some(png_dir) = &args.png_dir {
        sink.sinks.push(Box::new(PngSnapshotWriter::new(
            png_dir,
            setup_config.parameters.boundaries.l,
        )?));
    }

    run(
        &setup_config.parameters,
        &mut sim_state,
        &mut run_context,
        &run_params,
        &mut sink,
    )?;

    if let Some(d) = mean_pairwise_nearest(sim_state.particles.positions()) {
        info!("Mean nearest-neighbour distance: {:.4}", d);
    }
    info!("Done!");
    Ok(())
}
