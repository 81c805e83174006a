use log::debug;
use nalgebra::{Point2, Vector2};
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::Normal;

use crate::error::{Result, SetupError};
use crate::geometry::point::random_vector;

/// Positions and velocities of every particle. Index is identity for the whole run.
#[derive(serde::Serialize, Clone, Debug, PartialEq)]
pub struct ParticleSet {
    positions: Vec<Point2<f64>>,
    velocities: Vec<Vector2<f64>>,
}

impl ParticleSet {
    pub fn new(positions: Vec<Point2<f64>>, velocities: Vec<Vector2<f64>>) -> Result<Self> {
        if positions.len() != velocities.len() {
            return Err(SetupError::InvalidSeedState {
                positions: positions.len(),
                velocities: velocities.len(),
            });
        }
        if positions.is_empty() {
            return Err(SetupError::invalid_config("particle count must be positive"));
        }
        let finite = positions.iter().all(|r| r.iter().all(|c| c.is_finite()))
            && velocities.iter().all(|v| v.iter().all(|c| c.is_finite()));
        if !finite {
            return Err(SetupError::invalid_config(
                "initial positions and velocities must be finite",
            ));
        }
        Ok(ParticleSet {
            positions,
            velocities,
        })
    }

    /// Positions uniform over [0, l]^2, velocity components drawn from N(0, velocity_sd).
    pub fn random_uniform<R: Rng>(rng: &mut R, n: usize, l: f64, velocity_sd: f64) -> Result<Self> {
        if !(l > 0.0 && l.is_finite()) {
            return Err(SetupError::invalid_config(format!(
                "system length must be positive, got {l}"
            )));
        }
        let r_distr = Uniform::new(0.0, l);
        let v_distr = velocity_distribution(velocity_sd)?;
        // All positions are drawn before any velocity.
        let positions: Vec<Point2<f64>> = (0..n)
            .map(|_i| Point2::from(random_vector(rng, r_distr)))
            .collect();
        let velocities = (0..n).map(|_i| random_vector(rng, v_distr)).collect();
        debug!("Sampled {} particles in [0, {}]^2", n, l);
        ParticleSet::new(positions, velocities)
    }

    /// `n` particles in Gaussian clusters of width `spread` around `centres`,
    /// dealt out round-robin. Positions are clipped to [0, l]^2.
    pub fn random_clustered<R: Rng>(
        rng: &mut R,
        centres: &[Point2<f64>],
        spread: f64,
        n: usize,
        l: f64,
        velocity_sd: f64,
    ) -> Result<Self> {
        if centres.is_empty() {
            return Err(SetupError::invalid_config("at least one cluster centre is needed"));
        }
        if !(spread >= 0.0 && spread.is_finite()) {
            return Err(SetupError::invalid_config(format!(
                "cluster spread must be non-negative, got {spread}"
            )));
        }
        let offset_distr = Normal::new(0.0, spread).map_err(|e| {
            SetupError::invalid_config(format!("cluster spread {spread}: {e}"))
        })?;
        let v_distr = velocity_distribution(velocity_sd)?;
        let positions: Vec<Point2<f64>> = (0..n)
            .map(|i| {
                let r = centres[i % centres.len()] + random_vector(rng, offset_distr);
                Point2::new(r.x.clamp(0.0, l), r.y.clamp(0.0, l))
            })
            .collect();
        let velocities = (0..n).map(|_i| random_vector(rng, v_distr)).collect();
        debug!("Sampled {} particles around {} centres", n, centres.len());
        ParticleSet::new(positions, velocities)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Point2<f64>] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vector2<f64>] {
        &self.velocities
    }

    // Slices, not Vecs: the particle count is fixed.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Point2<f64>], &mut [Vector2<f64>]) {
        (&mut self.positions, &mut self.velocities)
    }
}

// Deserializing goes through `new`, so a loaded set obeys the same invariants.
impl<'de> serde::Deserialize<'de> for ParticleSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Fields {
            positions: Vec<Point2<f64>>,
            velocities: Vec<Vector2<f64>>,
        }
        let Fields {
            positions,
            velocities,
        } = Fields::deserialize(deserializer)?;
        ParticleSet::new(positions, velocities).map_err(serde::de::Error::custom)
    }
}

pub fn velocity_distribution(velocity_sd: f64) -> Result<Normal<f64>> {
    if !(velocity_sd >= 0.0 && velocity_sd.is_finite()) {
        return Err(SetupError::invalid_config(format!(
            "velocity spread must be non-negative, got {velocity_sd}"
        )));
    }
    Normal::new(0.0, velocity_sd)
        .map_err(|e| SetupError::invalid_config(format!("velocity spread {velocity_sd}: {e}")))
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct SimState {
    pub particles: ParticleSet,
    pub t: f64,
    pub step: usize,
}

impl SimState {
    pub fn new(particles: ParticleSet) -> SimState {
        SimState {
            particles,
            t: 0.0,
            step: 0,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step,
            t: self.t,
            positions: self.particles.positions().to_vec(),
            velocities: self.particles.velocities().to_vec(),
        }
    }
}

// A snapshot is a copy of the particle state between two steps, handed to sinks.

#[derive(serde::Serialize, Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub step: usize,
    pub t: f64,
    pub positions: Vec<Point2<f64>>,
    pub velocities: Vec<Vector2<f64>>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// Summary of what was computed during a single step.
#[derive(serde::Serialize, Clone, Debug, PartialEq)]
pub struct StepSummary {
    // Particles that felt a non-zero repulsion.
    pub n_repelled: usize,
    pub mean_speed: f64,
    pub max_speed: f64,
}
