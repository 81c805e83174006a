use nalgebra::Point2;

use crate::config::setup::parameters::common::BoundaryConfig;

fn clamp1(x: f64, l: f64) -> f64 {
    x.clamp(0.0, l)
}

// Pins positions to the closed square. Velocities are left as they are.
pub fn clamp(r: &mut Point2<f64>, boundaries: &BoundaryConfig) {
    r.x = clamp1(r.x, boundaries.l);
    r.y = clamp1(r.y, boundaries.l);
}
