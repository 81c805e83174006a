use std::f64::consts::PI;

use log::warn;

use super::common::BoundaryConfig;
use crate::error::{Result, SetupError};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepulsionMethod {
    #[default]
    Pairwise,
    CellList,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct SimParams {
    // Time step.
    pub dt: f64,
    // System.
    pub boundaries: BoundaryConfig,
    // Acoustic standing-wave force amplitude.
    pub force_strength: f64,
    // Velocity multiplier applied every step, in [0, 1].
    pub damping: f64,
    // Soft repulsion between particles closer than min_dist.
    pub repulsion_strength: f64,
    pub min_dist: f64,
    #[serde(default)]
    pub repulsion_method: RepulsionMethod,
}

impl SimParams {
    // Whole number of steps nearest to a duration, at least one.
    pub fn to_steps(&self, t: f64) -> usize {
        ((t / self.dt).round() as usize).max(1)
    }

    // Nodes sit every l/2 along each axis.
    pub fn wavenumber(&self) -> f64 {
        2.0 * PI / self.boundaries.l_half()
    }

    pub fn node_spacing(&self) -> f64 {
        self.boundaries.l_half()
    }

    pub fn min_dist_sq(&self) -> f64 {
        self.min_dist * self.min_dist
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("dt", self.dt),
            ("l", self.boundaries.l),
            ("force_strength", self.force_strength),
            ("damping", self.damping),
            ("repulsion_strength", self.repulsion_strength),
            ("min_dist", self.min_dist),
        ];
        if let Some((name, v)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SetupError::invalid_config(format!(
                "{name} must be finite, got {v}"
            )));
        }
        if self.boundaries.l <= 0.0 {
            return Err(SetupError::invalid_config(format!(
                "system length must be positive, got {}",
                self.boundaries.l
            )));
        }
        if self.dt <= 0.0 {
            return Err(SetupError::invalid_config(format!(
                "timestep must be positive, got {}",
                self.dt
            )));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(SetupError::invalid_config(format!(
                "damping must lie in [0, 1], got {}",
                self.damping
            )));
        }
        if self.min_dist <= 0.0 {
            return Err(SetupError::invalid_config(format!(
                "repulsion cutoff must be positive, got {}",
                self.min_dist
            )));
        }

        if self.min_dist >= self.boundaries.l_half() {
            warn!(
                "Repulsion cutoff {} spans at least half the system ({}), every pair will interact",
                self.min_dist,
                self.boundaries.l_half()
            );
        }
        if self.damping == 0.0 {
            warn!("Damping is zero, particles will not move");
        }
        Ok(())
    }
}
