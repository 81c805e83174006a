pub mod parameters;
pub mod particles;

use std::{fs::File, io::Read, path::Path};

use log::info;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::{error::Result, state::SimState};

use self::{parameters::simulation::SimParams, particles::ParticleInitializationConfig};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct SetupConfig {
    pub parameters: SimParams,
    pub particle_initialization: ParticleInitializationConfig,
    // Fixes the initial sample; absent means a fresh one per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SetupConfig {
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::parse_str(&contents)
    }

    pub fn parse_str(contents: &str) -> Result<Self> {
        let config: SetupConfig = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.parameters.validate()?;
        self.particle_initialization
            .validate(&self.parameters.boundaries)
    }

    pub fn n_particles(&self) -> usize {
        self.particle_initialization
            .number(&self.parameters.boundaries)
    }

    /// The seed a run will use: `seed` if given, else the file's, else a fresh
    /// one drawn from OS entropy.
    pub fn resolve_seed(&self, seed: Option<u64>) -> u64 {
        seed.or(self.seed).unwrap_or_else(|| rand::thread_rng().gen())
    }

    /// A copy with the seed pinned, so that it reproduces the run exactly.
    pub fn seeded(&self, seed: Option<u64>) -> SetupConfig {
        SetupConfig {
            seed: Some(self.resolve_seed(seed)),
            ..self.clone()
        }
    }

    /// Validates the configuration and samples the initial state.
    ///
    /// `seed` takes precedence over the file's seed. With neither, the sample
    /// is drawn from a fresh seed and differs run to run.
    pub fn initialize(&self, seed: Option<u64>) -> Result<SimState> {
        self.validate()?;
        let seed = self.resolve_seed(seed);
        info!("Seeding initial state with {}", seed);
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        let particles = particles::initialize_particles(
            &mut rng,
            &self.particle_initialization,
            &self.parameters.boundaries,
        )?;
        Ok(SimState::new(particles))
    }

    pub fn print(&self) {
        let sim_params = &self.parameters;
        // Speed a particle settles to under a constant unit force.
        let terminal_speed_scale = if sim_params.damping < 1.0 {
            format!(
                "{:.3}",
                sim_params.damping * sim_params.dt / (1.0 - sim_params.damping)
            )
        } else {
            "unbounded".to_string()
        };
        println!(
            "\
Environment:
  Timestep: {dt}
  System length: {l}
  Particles: {n}

Forces:
  Acoustic force strength: {force_strength}
  Damping per step: {damping}
  Repulsion strength: {repulsion_strength}
  Repulsion cutoff: {min_dist}
  Repulsion method: {method:?}

Computed derived parameters (for info only):
  Wavenumber: {k:.4}
  Pressure node spacing: {node_spacing}
  Terminal speed per unit force: {terminal_speed_scale}",
            dt = sim_params.dt,
            l = sim_params.boundaries.l,
            n = self.n_particles(),
            force_strength = sim_params.force_strength,
            damping = sim_params.damping,
            repulsion_strength = sim_params.repulsion_strength,
            min_dist = sim_params.min_dist,
            method = sim_params.repulsion_method,
            k = sim_params.wavenumber(),
            node_spacing = sim_params.node_spacing(),
            terminal_speed_scale = terminal_speed_scale,
        );
    }
}
