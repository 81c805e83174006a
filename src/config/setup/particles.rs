use nalgebra::{Point2, Vector2};
use rand::Rng;

use super::parameters::common::BoundaryConfig;
use crate::error::{Result, SetupError};
use crate::state::{velocity_distribution, ParticleSet};

pub const DEFAULT_VELOCITY_SD: f64 = 0.1;

fn default_velocity_sd() -> f64 {
    DEFAULT_VELOCITY_SD
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ParticleInitializationConfig {
    RandomUniformByAreaNumberDensity(ParticleAreaNumberDensityConfig),
    RandomUniformByNumber(ParticleNumberConfig),
    Clustered(ParticleClusterConfig),
    Explicit(ExplicitParticleConfig),
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ParticleAreaNumberDensityConfig {
    pub area_number_density: f64,
    #[serde(default = "default_velocity_sd")]
    pub velocity_sd: f64,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ParticleNumberConfig {
    pub number: usize,
    #[serde(default = "default_velocity_sd")]
    pub velocity_sd: f64,
}

// Gaussian clumps, as left behind once the field has done its work.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ParticleClusterConfig {
    pub centres: Vec<Point2<f64>>,
    pub spread: f64,
    // Total over all clusters.
    pub number: usize,
    #[serde(default = "default_velocity_sd")]
    pub velocity_sd: f64,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ExplicitParticleConfig {
    pub positions: Vec<Point2<f64>>,
    pub velocities: Vec<Vector2<f64>>,
}

impl ParticleInitializationConfig {
    pub fn number(&self, boundaries: &BoundaryConfig) -> usize {
        match self {
            ParticleInitializationConfig::RandomUniformByAreaNumberDensity(c) => {
                (c.area_number_density * boundaries.area()).round() as usize
            }
            ParticleInitializationConfig::RandomUniformByNumber(c) => c.number,
            ParticleInitializationConfig::Clustered(c) => c.number,
            ParticleInitializationConfig::Explicit(c) => c.positions.len(),
        }
    }

    fn velocity_sd(&self) -> Option<f64> {
        match self {
            ParticleInitializationConfig::RandomUniformByAreaNumberDensity(c) => Some(c.velocity_sd),
            ParticleInitializationConfig::RandomUniformByNumber(c) => Some(c.velocity_sd),
            ParticleInitializationConfig::Clustered(c) => Some(c.velocity_sd),
            ParticleInitializationConfig::Explicit(_) => None,
        }
    }

    pub fn validate(&self, boundaries: &BoundaryConfig) -> Result<()> {
        match self {
            ParticleInitializationConfig::RandomUniformByAreaNumberDensity(c) => {
                if !(c.area_number_density >= 0.0 && c.area_number_density.is_finite()) {
                    return Err(SetupError::invalid_config(format!(
                        "area number density must be non-negative, got {}",
                        c.area_number_density
                    )));
                }
            }
            ParticleInitializationConfig::Clustered(c) => {
                if c.centres.is_empty() {
                    return Err(SetupError::invalid_config(
                        "at least one cluster centre is needed",
                    ));
                }
                if let Some(r) = c.centres.iter().find(|r| !boundaries.contains(r)) {
                    return Err(SetupError::invalid_config(format!(
                        "cluster centre {r} lies outside [0, {}]^2",
                        boundaries.l
                    )));
                }
                if !(c.spread >= 0.0 && c.spread.is_finite()) {
                    return Err(SetupError::invalid_config(format!(
                        "cluster spread must be non-negative, got {}",
                        c.spread
                    )));
                }
            }
            _ => {}
        }
        if let Some(velocity_sd) = self.velocity_sd() {
            velocity_distribution(velocity_sd)?;
        }
        if self.number(boundaries) == 0 {
            return Err(SetupError::invalid_config("particle count must be positive"));
        }
        Ok(())
    }
}

pub fn initialize_particles<R: Rng>(
    rng: &mut R,
    config: &ParticleInitializationConfig,
    boundaries: &BoundaryConfig,
) -> Result<ParticleSet> {
    config.validate(boundaries)?;
    let l = boundaries.l;
    match config {
        ParticleInitializationConfig::RandomUniformByAreaNumberDensity(
            ParticleAreaNumberDensityConfig { velocity_sd, .. },
        )
        | ParticleInitializationConfig::RandomUniformByNumber(ParticleNumberConfig {
            velocity_sd,
            ..
        }) => ParticleSet::random_uniform(rng, config.number(boundaries), l, *velocity_sd),
        ParticleInitializationConfig::Clustered(ParticleClusterConfig {
            centres,
            spread,
            number,
            velocity_sd,
        }) => ParticleSet::random_clustered(rng, centres, *spread, *number, l, *velocity_sd),
        ParticleInitializationConfig::Explicit(ExplicitParticleConfig {
            positions,
            velocities,
        }) => ParticleSet::new(positions.clone(), velocities.clone()),
    }
}
