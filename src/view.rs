pub mod environment;

use bevy::prelude::*;
use colorgrad::Gradient;
use nalgebra::Point2;

use crate::{
    config::{run::RunContext, setup::SetupConfig},
    geometry::point::distances_to,
    state::SimState,
};

// Keeps the normalisation finite when every particle is equidistant.
pub const COLOUR_SOFTENING: f64 = 1e-6;

pub const TIME_STEP: f64 = 1.0 / 30.0;

/// Colour weight per particle in [0, 1]: 1 for the particle closest to `centre`, 0 for the farthest.
pub fn distance_colour_weights(positions: &[Point2<f64>], centre: Point2<f64>) -> Vec<f64> {
    let ds = distances_to(positions, centre);
    let (d_min, d_max) = ds
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(mn, mx), d| {
            (mn.min(*d), mx.max(*d))
        });
    ds.iter()
        .map(|d| 1.0 - (d - d_min) / (d_max - d_min + COLOUR_SOFTENING))
        .collect()
}

/// Whether the sample has been dyed. Lives in the viewer, never in the simulation.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StainState {
    #[default]
    Unstained,
    Stained,
}

impl StainState {
    pub fn toggled(self) -> Self {
        match self {
            StainState::Unstained => StainState::Stained,
            StainState::Stained => StainState::Unstained,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StainState::Unstained => "Acousto-clustering of microplastics",
            StainState::Stained => "Acousto-clustering, Nile red stained (UV)",
        }
    }

    pub fn background(&self) -> Color {
        match self {
            StainState::Unstained => Color::srgb(0.05, 0.05, 0.08),
            StainState::Stained => Color::BLACK,
        }
    }

    /// Particle colour for a distance weight from [`distance_colour_weights`].
    pub fn particle_colour(&self, weight: f64) -> Color {
        match self {
            StainState::Unstained => {
                let c = colorgrad::preset::plasma().at(weight as f32);
                Color::srgba(c.r, c.g, c.b, 0.8)
            }
            // Fluorescence does not depend on position.
            StainState::Stained => Color::srgba(1.0, 0.0, 0.0, 0.9),
        }
    }
}

// Components.

#[derive(Component)]
pub struct ParticleId(pub usize);

// Resources.

#[derive(Resource)]
pub struct SetupConfigRes(pub SetupConfig);

// The live simulation. Only the stepping system mutates it.
#[derive(Resource)]
pub struct LiveSim {
    pub state: SimState,
    pub context: RunContext,
    // Steps per rendered frame.
    pub sim_stepsize: usize,
    pub max_steps: Option<usize>,
    pub paused: bool,
}

impl LiveSim {
    pub fn finished(&self) -> bool {
        self.max_steps.is_some_and(|m| self.state.step >= m)
    }
}

pub fn close_on_esc(
    mut commands: Commands,
    focused_windows: Query<(Entity, &Window)>,
    input: Res<ButtonInput<KeyCode>>,
) {
    for (window, focus) in focused_windows.iter() {
        if !focus.focused {
            continue;
        }

        if input.just_pressed(KeyCode::Escape) {
            commands.entity(window).despawn();
        }
    }
}
