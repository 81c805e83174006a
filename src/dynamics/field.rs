use nalgebra::{Point2, Vector2};

use crate::config::setup::parameters::simulation::SimParams;

/// Stylized acoustic radiation force of a standing wave along each axis.
///
/// Pressure nodes, where the force vanishes and is restoring, sit every `l / 2`
/// along each axis: at 0, l/2 and l.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcousticField {
    pub force_strength: f64,
    pub k: f64,
}

impl AcousticField {
    pub fn new(sim_params: &SimParams) -> Self {
        AcousticField {
            force_strength: sim_params.force_strength,
            k: sim_params.wavenumber(),
        }
    }

    pub fn force_at(&self, r: Point2<f64>) -> Vector2<f64> {
        Vector2::new(
            -self.force_strength * (self.k * r.x).sin(),
            -self.force_strength * (self.k * r.y).sin(),
        )
    }

    pub fn forces_at(&self, rs: &[Point2<f64>]) -> Vec<Vector2<f64>> {
        rs.iter().map(|r| self.force_at(*r)).collect()
    }
}
