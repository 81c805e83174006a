//! Particle-count scaling from a sample to a whole container.
//!
//! All volumes are in millilitres except the container, given in litres.

use std::path::Path;

use log::debug;

use crate::error::{Result, SetupError};
use crate::snapshot::read_snapshot_positions;

pub const DEFAULT_SAMPLE_VOLUME_ML: f64 = 250.0;
pub const DEFAULT_PARTICLE_VOLUME_ML: f64 = 0.001;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SampleParams {
    pub sample_volume_ml: f64,
    // Assumed volume of a single particle.
    pub particle_volume_ml: f64,
}

impl Default for SampleParams {
    fn default() -> Self {
        SampleParams {
            sample_volume_ml: DEFAULT_SAMPLE_VOLUME_ML,
            particle_volume_ml: DEFAULT_PARTICLE_VOLUME_ML,
        }
    }
}

impl SampleParams {
    pub fn validate(&self) -> Result<()> {
        positive("sample volume", self.sample_volume_ml)?;
        positive("particle volume", self.particle_volume_ml)
    }
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(SetupError::invalid_config(format!(
            "{name} must be positive, got {v}"
        )))
    }
}

#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq)]
pub struct SampleEstimate {
    pub particle_count: f64,
    pub particle_volume_ml: f64,
    pub volume_percentage: f64,
}

#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ContainerEstimate {
    pub container_volume_ml: f64,
    pub particles_per_ml: f64,
    pub particle_count: f64,
    pub particle_volume_ml: f64,
    pub volume_percentage: f64,
}

// `particle_count` is fractional when averaged over several snapshots.
pub fn sample_estimate(particle_count: f64, params: &SampleParams) -> Result<SampleEstimate> {
    params.validate()?;
    let particle_volume_ml = particle_count * params.particle_volume_ml;
    Ok(SampleEstimate {
        particle_count,
        particle_volume_ml,
        volume_percentage: particle_volume_ml / params.sample_volume_ml * 100.0,
    })
}

pub fn container_estimate(
    particle_count: f64,
    params: &SampleParams,
    container_volume_l: f64,
) -> Result<ContainerEstimate> {
    params.validate()?;
    positive("container volume", container_volume_l)?;
    let container_volume_ml = container_volume_l * 1000.0;
    let particles_per_ml = particle_count / params.sample_volume_ml;
    let total = particles_per_ml * container_volume_ml;
    let particle_volume_ml = total * params.particle_volume_ml;
    Ok(ContainerEstimate {
        container_volume_ml,
        particles_per_ml,
        particle_count: total,
        particle_volume_ml,
        volume_percentage: particle_volume_ml / container_volume_ml * 100.0,
    })
}

pub fn mean_particle_count<P: AsRef<Path>>(snapshot_paths: &[P]) -> Result<f64> {
    if snapshot_paths.is_empty() {
        return Err(SetupError::invalid_config("no snapshots given"));
    }
    let mut total = 0usize;
    for path in snapshot_paths {
        let n = read_snapshot_positions(path)?.len();
        debug!("{}: {} particles", path.as_ref().display(), n);
        total += n;
    }
    Ok(total as f64 / snapshot_paths.len() as f64)
}
