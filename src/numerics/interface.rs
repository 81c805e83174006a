pub mod contexts {
    use nalgebra::{Point2, Vector2};

    pub trait RepulsionContextTrait: Send + Sync {
        /// One repulsion vector per position, in the same order.
        fn evaluate(&mut self, positions: &[Point2<f64>]) -> Vec<Vector2<f64>>;
    }
}

mod pairwise {
    use nalgebra::{Point2, Vector2};

    use super::contexts::RepulsionContextTrait;
    use crate::dynamics::repulsion::{particles_repulsion, RepulsionParams};

    // Every pair, O(n^2).
    pub struct PairwiseContext {
        params: RepulsionParams,
    }

    impl PairwiseContext {
        pub fn new(params: RepulsionParams) -> Self {
            PairwiseContext { params }
        }
    }

    impl RepulsionContextTrait for PairwiseContext {
        fn evaluate(&mut self, positions: &[Point2<f64>]) -> Vec<Vector2<f64>> {
            particles_repulsion(positions, &self.params)
        }
    }
}

mod cell {
    use log::warn;
    use nalgebra::{Point2, Vector2};

    use super::contexts::RepulsionContextTrait;
    use crate::dynamics::repulsion::{particle_repulsion, RepulsionParams};
    use crate::numerics::cell_list::CellList;

    // Neighbour candidates are summed in ascending index order, the same order
    // as the pairwise sum, so the two contexts agree bit-for-bit.
    pub struct CellListContext {
        params: RepulsionParams,
        cell_list: CellList,
        num_particles: usize,
        candidates: Vec<usize>,
    }

    impl CellListContext {
        pub fn new(params: RepulsionParams, l: f64, min_dist: f64, num_particles: usize) -> Self {
            CellListContext {
                params,
                cell_list: CellList::new(l, min_dist, num_particles),
                num_particles,
                candidates: Vec::new(),
            }
        }
    }

    impl RepulsionContextTrait for CellListContext {
        fn evaluate(&mut self, positions: &[Point2<f64>]) -> Vec<Vector2<f64>> {
            if positions.len() != self.num_particles {
                warn!(
                    "positions.len() = {} but self.num_particles = {}",
                    positions.len(),
                    self.num_particles
                );
            }
            self.cell_list.rebuild(positions);
            positions
                .iter()
                .map(|r| {
                    self.cell_list.candidates(r, &mut self.candidates);
                    particle_repulsion(
                        *r,
                        self.candidates.iter().map(|j| &positions[*j]),
                        &self.params,
                    )
                })
                .collect()
        }
    }
}

pub use cell::CellListContext;
pub use contexts::*;
pub use pairwise::PairwiseContext;

use crate::config::setup::parameters::simulation::{RepulsionMethod, SimParams};
use crate::dynamics::repulsion::RepulsionParams;

pub fn repulsion_context(
    sim_params: &SimParams,
    num_particles: usize,
) -> Box<dyn RepulsionContextTrait> {
    let params = RepulsionParams::new(sim_params);
    match sim_params.repulsion_method {
        RepulsionMethod::Pairwise => Box::new(PairwiseContext::new(params)),
        RepulsionMethod::CellList => Box::new(CellListContext::new(
            params,
            sim_params.boundaries.l,
            sim_params.min_dist,
            num_particles,
        )),
    }
}
