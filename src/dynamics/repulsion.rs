use nalgebra::{Point2, Vector2};
use num_traits::Zero;

use crate::config::setup::parameters::simulation::SimParams;

// Softening added to squared separations, so coincident particles stay finite.
pub const SOFTENING: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepulsionParams {
    pub strength: f64,
    pub min_dist_sq: f64,
}

impl RepulsionParams {
    pub fn new(sim_params: &SimParams) -> Self {
        RepulsionParams {
            strength: sim_params.repulsion_strength,
            min_dist_sq: sim_params.min_dist_sq(),
        }
    }
}

// Force on a particle at r1 due to one at r2, zero outside the cutoff.
pub fn pair_repulsion(r1: Point2<f64>, r2: Point2<f64>, params: &RepulsionParams) -> Vector2<f64> {
    let d = r1 - r2;
    let dist_sq = d.x * d.x + d.y * d.y + SOFTENING;
    // Strict: a pair exactly at the cutoff does not interact.
    if dist_sq < params.min_dist_sq {
        Vector2::new(
            params.strength * d.x / dist_sq,
            params.strength * d.y / dist_sq,
        )
    } else {
        Vector2::zero()
    }
}

// Summed over `others` in the order given. A particle's own position
// contributes an exactly-zero term.
pub fn particle_repulsion<'a, I>(r: Point2<f64>, others: I, params: &RepulsionParams) -> Vector2<f64>
where
    I: IntoIterator<Item = &'a Point2<f64>>,
{
    others
        .into_iter()
        .fold(Vector2::zero(), |f_tot, r2| f_tot + pair_repulsion(r, *r2, params))
}

// Super naive implementation.
pub fn particles_repulsion(rs: &[Point2<f64>], params: &RepulsionParams) -> Vec<Vector2<f64>> {
    rs.iter()
        .map(|r| particle_repulsion(*r, rs.iter(), params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MIN_DIST: f64 = 0.2;

    fn params() -> RepulsionParams {
        RepulsionParams {
            strength: 0.05,
            min_dist_sq: MIN_DIST * MIN_DIST,
        }
    }

    #[test]
    fn test_exactly_at_cutoff_is_zero() {
        let rs = [Point2::new(5.0, 5.0), Point2::new(5.0 + MIN_DIST, 5.0)];
        let fs = particles_repulsion(&rs, &params());
        assert_eq!(fs[0], Vector2::zero());
        assert_eq!(fs[1], Vector2::zero());
    }

    #[test]
    fn test_inside_cutoff_pushes_apart() {
        let rs = [Point2::new(5.0, 5.0), Point2::new(5.0 + MIN_DIST - 0.01, 5.0)];
        let fs = particles_repulsion(&rs, &params());
        assert!(fs[0].x < 0.0);
        assert!(fs[1].x > 0.0);
        assert_eq!(fs[0].y, 0.0);
        // Equal and opposite.
        assert_relative_eq!(fs[0], -fs[1], epsilon = 1e-12);
    }

    #[test]
    fn test_magnitude() {
        let d = 0.1;
        let f = pair_repulsion(Point2::new(d, 0.0), Point2::origin(), &params());
        assert_relative_eq!(f.x, 0.05 * d / (d * d + SOFTENING), epsilon = 1e-12);
    }

    #[test]
    fn test_decays_with_separation() {
        let p = params();
        let dir = Vector2::new(0.6, 0.8);
        let mags: Vec<f64> = (1..20)
            .map(|i| {
                let sep = 0.01 * i as f64;
                pair_repulsion(Point2::origin() + dir * sep, Point2::origin(), &p).magnitude()
            })
            .collect();
        assert!(mags.iter().all(|m| *m > 0.0));
        for w in mags.windows(2) {
            assert!(w[1] < w[0], "{} !< {}", w[1], w[0]);
        }
    }

    #[test]
    fn test_no_neighbours() {
        let rs = [
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 1.5),
            Point2::new(3.0, 3.0),
            Point2::new(3.1, 3.0),
        ];
        let fs = particles_repulsion(&rs, &params());
        assert_eq!(fs[0], Vector2::zero());
        assert_eq!(fs[1], Vector2::zero());
        assert!(fs[2].x < 0.0 && fs[3].x > 0.0);
    }

    #[test]
    fn test_coincident_is_finite() {
        let rs = [Point2::new(2.0, 2.0), Point2::new(2.0, 2.0)];
        let fs = particles_repulsion(&rs, &params());
        assert_eq!(fs[0], Vector2::zero());
        assert!(fs[1].iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_superposition() {
        let centre = Point2::new(5.0, 5.0);
        let rs = [centre, Point2::new(5.1, 5.0), Point2::new(4.9, 5.0)];
        let fs = particles_repulsion(&rs, &params());
        // Symmetric neighbours cancel on the middle particle.
        assert_relative_eq!(fs[0], Vector2::zero(), epsilon = 1e-12);
    }
}
