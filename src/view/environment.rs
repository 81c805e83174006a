use bevy::{math::Isometry2d, prelude::*};
use nalgebra::Point2;

use crate::config::setup::parameters::common::BoundaryConfig;

// Maps simulation coordinates in [0, l]^2 onto a square of side `window_size`
// centred on the origin.
#[derive(Resource)]
pub struct Environment {
    pub boundaries: BoundaryConfig,
    pub window_size: f64,
}

impl Environment {
    pub fn length_factor(&self) -> f64 {
        self.window_size / self.boundaries.l
    }

    pub fn transform_coord(&self, x: f64) -> f32 {
        ((x - self.boundaries.l_half()) * self.length_factor()) as f32
    }

    pub fn transformed_vec2(&self, r: &Point2<f64>) -> Vec2 {
        Vec2::new(self.transform_coord(r.x), self.transform_coord(r.y))
    }

    pub fn transformed_l(&self) -> f32 {
        (self.boundaries.l * self.length_factor()) as f32
    }
}

pub fn draw_boundaries(mut gizmos: Gizmos, env: Res<Environment>) {
    let l = env.transformed_l();
    gizmos.rect_2d(Isometry2d::IDENTITY, Vec2::splat(l), Color::srgb(0.0, 0.8, 0.8));
}
