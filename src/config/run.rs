use crate::{
    dynamics::field::AcousticField,
    numerics::interface::{repulsion_context, RepulsionContextTrait},
};

use super::setup::parameters::simulation::SimParams;

pub struct RunParams {
    pub n_steps: usize,
    // Hand a snapshot to the sink every this many steps.
    pub dstep_view: usize,
    // Also emit the unstepped initial state, as frame 0.
    pub write_initial: bool,
}

impl RunParams {
    // Frames are numbered from zero in the order they are emitted.
    pub fn frame_index(&self, step: usize) -> Option<usize> {
        let dstep = self.dstep_view.max(1);
        if step % dstep != 0 {
            return None;
        }
        let offset = if self.write_initial { 0 } else { 1 };
        (step / dstep).checked_sub(offset)
    }
}

pub struct RunContext {
    pub field: AcousticField,
    pub repulsion: Box<dyn RepulsionContextTrait>,
    // The parameters the field and repulsion were built from.
    sim_params: SimParams,
}

impl RunContext {
    pub fn new(sim_params: &SimParams, n_particles: usize) -> Self {
        RunContext {
            field: AcousticField::new(sim_params),
            repulsion: repulsion_context(sim_params, n_particles),
            sim_params: sim_params.clone(),
        }
    }

    pub fn sim_params(&self) -> &SimParams {
        &self.sim_params
    }
}
