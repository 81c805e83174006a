pub mod boundary;
pub mod field;
pub mod repulsion;

use log::{debug, info};
use nalgebra::Vector2;

use crate::config::run::{RunContext, RunParams};
use crate::config::setup::parameters::simulation::SimParams;
use crate::error::Result;
use crate::snapshot::SnapshotSink;
use crate::state::{SimState, StepSummary};

/// Advances the state by one timestep.
///
/// Both force contributions are evaluated on the pre-step positions before
/// any particle moves.
pub fn update(
    sim_params: &SimParams,
    sim_state: &mut SimState,
    run_context: &mut RunContext,
) -> StepSummary {
    debug_assert_eq!(
        run_context.sim_params(),
        sim_params,
        "run context was built from other parameters"
    );
    let positions = sim_state.particles.positions();
    let fs_field = run_context.field.forces_at(positions);
    let fs_repulsion = run_context.repulsion.evaluate(positions);

    let n_repelled = fs_repulsion
        .iter()
        .filter(|f| **f != Vector2::zeros())
        .count();

    let dt = sim_params.dt;
    let (rs, vs) = sim_state.particles.parts_mut();
    for (((r, v), f_field), f_repulsion) in rs
        .iter_mut()
        .zip(vs.iter_mut())
        .zip(fs_field)
        .zip(fs_repulsion)
    {
        let f = f_field + f_repulsion;
        // Damping acts every step, after the force kick.
        *v = (*v + f * dt) * sim_params.damping;
        *r += *v * dt;
        boundary::clamp(r, &sim_params.boundaries);
    }

    // Advance the clock.
    sim_state.t += dt;
    sim_state.step += 1;

    let speeds = sim_state.particles.velocities().iter().map(|v| v.magnitude());
    let (speed_sum, max_speed) = speeds.fold((0.0, 0.0_f64), |(sum, mx), s| (sum + s, mx.max(s)));
    StepSummary {
        n_repelled,
        mean_speed: speed_sum / sim_state.particles.len() as f64,
        max_speed,
    }
}

pub fn run_steps(
    sim_params: &SimParams,
    sim_state: &mut SimState,
    run_context: &mut RunContext,
    n_steps: usize,
) -> Option<StepSummary> {
    let mut summary = None;
    for _ in 0..n_steps {
        summary = Some(update(sim_params, sim_state, run_context));
    }
    summary
}

pub fn run<S: SnapshotSink + ?Sized>(
    sim_params: &SimParams,
    sim_state: &mut SimState,
    run_context: &mut RunContext,
    run_params: &RunParams,
    sink: &mut S,
) -> Result<()> {
    info!(
        "Running {} steps of {} particles from step {}",
        run_params.n_steps,
        sim_state.particles.len(),
        sim_state.step
    );
    let start_step = sim_state.step;

    if let Some(frame) = run_params.frame_index(0) {
        sink.write(frame, &sim_state.snapshot())?;
    }

    for _ in 0..run_params.n_steps {
        let summary = update(sim_params, sim_state, run_context);
        debug!(
            "STEP {} t={:.4} repelled={} mean_speed={:.5} max_speed={:.5}",
            sim_state.step, sim_state.t, summary.n_repelled, summary.mean_speed, summary.max_speed
        );

        if let Some(frame) = run_params.frame_index(sim_state.step - start_step) {
            sink.write(frame, &sim_state.snapshot())?;
        }
    }
    info!("Finished at step {}, t={:.4}", sim_state.step, sim_state.t);
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{Point2, Vector2};

    use super::*;
    use crate::config::setup::parameters::{common::BoundaryConfig, simulation::RepulsionMethod};
    use crate::error::SetupError;
    use crate::snapshot::MemorySink;
    use crate::state::{ParticleSet, Snapshot};

    const L: f64 = 10.0;

    fn sim_params() -> SimParams {
        SimParams {
            dt: 0.02,
            boundaries: BoundaryConfig { l: L },
            force_strength: 2.0,
            damping: 0.9,
            repulsion_strength: 0.05,
            min_dist: 0.2,
            repulsion_method: RepulsionMethod::Pairwise,
        }
    }

    fn state(positions: Vec<Point2<f64>>, velocities: Vec<Vector2<f64>>) -> SimState {
        SimState::new(ParticleSet::new(positions, velocities).unwrap())
    }

    fn random_state(seed: u64, n: usize) -> SimState {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg64Mcg::seed_from_u64(seed);
        SimState::new(ParticleSet::random_uniform(&mut rng, n, L, 0.1).unwrap())
    }

    #[test]
    fn test_single_step_arithmetic() {
        let p = sim_params();
        let mut s = state(vec![Point2::new(1.0, 3.0)], vec![Vector2::new(0.1, -0.2)]);
        let mut ctx = RunContext::new(&p, 1);
        update(&p, &mut s, &mut ctx);

        let k = p.wavenumber();
        let f = Vector2::new(-2.0 * (k * 1.0).sin(), -2.0 * (k * 3.0).sin());
        let v = (Vector2::new(0.1, -0.2) + f * 0.02) * 0.9;
        let r = Point2::new(1.0, 3.0) + v * 0.02;
        assert_relative_eq!(s.particles.velocities()[0], v, epsilon = 1e-14);
        assert_relative_eq!(s.particles.positions()[0], r, epsilon = 1e-14);
        assert_eq!(s.step, 1);
        assert_relative_eq!(s.t, 0.02);
    }

    #[test]
    fn test_domain_containment() {
        let p = SimParams {
            dt: 0.05,
            ..sim_params()
        };
        let mut s = random_state(5, 150);
        // Some particles start fast and heading out.
        let mut fast = s.particles.velocities().to_vec();
        fast.iter_mut().step_by(3).for_each(|v| *v *= 500.0);
        s = state(s.particles.positions().to_vec(), fast);

        let mut ctx = RunContext::new(&p, 150);
        for _ in 0..300 {
            update(&p, &mut s, &mut ctx);
            for r in s.particles.positions() {
                assert!(p.boundaries.contains(r), "escaped: {}", r);
            }
        }
    }

    #[test]
    fn test_clamp_keeps_velocity() {
        let p = SimParams {
            force_strength: 0.0,
            repulsion_strength: 0.0,
            ..sim_params()
        };
        let mut s = state(vec![Point2::new(9.99, 5.0)], vec![Vector2::new(10.0, 0.0)]);
        let mut ctx = RunContext::new(&p, 1);
        update(&p, &mut s, &mut ctx);
        assert_eq!(s.particles.positions()[0].x, L);
        assert_relative_eq!(s.particles.velocities()[0].x, 9.0);
    }

    #[test]
    fn test_damping_contraction() {
        let p = SimParams {
            force_strength: 0.0,
            repulsion_strength: 0.0,
            ..sim_params()
        };
        let mut s = state(vec![Point2::new(4.0, 6.0)], vec![Vector2::new(0.3, -0.4)]);
        let mut ctx = RunContext::new(&p, 1);
        for _ in 0..10 {
            let before = s.particles.velocities()[0].magnitude();
            update(&p, &mut s, &mut ctx);
            let after = s.particles.velocities()[0].magnitude();
            assert_relative_eq!(after, p.damping * before, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_deterministic() {
        let p = sim_params();
        let mut a = random_state(9, 80);
        let mut b = random_state(9, 80);
        let mut ctx_a = RunContext::new(&p, 80);
        let mut ctx_b = RunContext::new(&p, 80);
        run_steps(&p, &mut a, &mut ctx_a, 100);
        run_steps(&p, &mut b, &mut ctx_b, 100);
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn test_backends_agree_over_a_run() {
        let p = SimParams {
            min_dist: 0.5,
            ..sim_params()
        };
        let p_cell = SimParams {
            repulsion_method: RepulsionMethod::CellList,
            ..p.clone()
        };
        let mut a = random_state(2, 200);
        let mut b = a.clone();
        let mut ctx_a = RunContext::new(&p, 200);
        let mut ctx_b = RunContext::new(&p_cell, 200);
        run_steps(&p, &mut a, &mut ctx_a, 50);
        run_steps(&p_cell, &mut b, &mut ctx_b, 50);
        assert_eq!(a.particles, b.particles);
    }

    #[test]
    fn test_node_is_stable_equilibrium() {
        let p = SimParams {
            repulsion_strength: 0.0,
            ..sim_params()
        };
        let centre = Point2::new(L / 2.0, L / 2.0);
        let mut s = state(vec![centre], vec![Vector2::zeros()]);
        let mut ctx = RunContext::new(&p, 1);
        for _ in 0..1000 {
            update(&p, &mut s, &mut ctx);
            assert_relative_eq!(s.particles.positions()[0], centre, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_node_attracts() {
        let p = SimParams {
            repulsion_strength: 0.0,
            ..sim_params()
        };
        let mut s = state(vec![Point2::new(5.6, 4.5)], vec![Vector2::zeros()]);
        let mut ctx = RunContext::new(&p, 1);
        run_steps(&p, &mut s, &mut ctx, 2000);
        assert_relative_eq!(
            s.particles.positions()[0],
            Point2::new(L / 2.0, L / 2.0),
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_pair_separates_then_coasts() {
        let p = SimParams {
            force_strength: 0.0,
            ..sim_params()
        };
        let half = p.min_dist / 4.0;
        let mut s = state(
            vec![Point2::new(5.0 - half, 5.0), Point2::new(5.0 + half, 5.0)],
            vec![Vector2::zeros(); 2],
        );
        let mut ctx = RunContext::new(&p, 2);
        let separation = |s: &SimState| {
            let rs = s.particles.positions();
            (rs[1] - rs[0]).magnitude()
        };

        let mut d = separation(&s);
        let mut steps = 0;
        while d < p.min_dist {
            update(&p, &mut s, &mut ctx);
            let d_new = separation(&s);
            assert!(d_new > d, "step {}: {} !> {}", steps, d_new, d);
            d = d_new;
            steps += 1;
            assert!(steps < 10_000, "pair never left the cutoff");
        }

        // Outside the cutoff only damping acts on the existing velocity.
        for _ in 0..20 {
            let vs_before = s.particles.velocities().to_vec();
            let summary = update(&p, &mut s, &mut ctx);
            assert_eq!(summary.n_repelled, 0);
            for (v_after, v_before) in s.particles.velocities().iter().zip(vs_before) {
                assert_relative_eq!(*v_after, v_before * p.damping, epsilon = 1e-15);
            }
            let d_new = separation(&s);
            assert!(d_new >= d);
            d = d_new;
        }
    }

    #[test]
    fn test_run_emits_frames() {
        let p = sim_params();
        let mut s = random_state(1, 10);
        let mut ctx = RunContext::new(&p, 10);
        let run_params = RunParams {
            n_steps: 20,
            dstep_view: 5,
            write_initial: true,
        };
        let mut sink = MemorySink::default();
        run(&p, &mut s, &mut ctx, &run_params, &mut sink).unwrap();

        let frames: Vec<usize> = sink.frames.iter().map(|(f, _)| *f).collect();
        assert_eq!(frames, vec![0, 1, 2, 3, 4]);
        let steps: Vec<usize> = sink.frames.iter().map(|(_, snap)| snap.step).collect();
        assert_eq!(steps, vec![0, 5, 10, 15, 20]);
        assert_eq!(s.step, 20);
        assert_eq!(sink.frames[4].1.positions, s.particles.positions());
    }

    struct FailingSink {
        // Writes that succeed before the sink starts failing.
        capacity: usize,
        written: Vec<usize>,
    }

    impl SnapshotSink for FailingSink {
        fn write(&mut self, frame: usize, _snapshot: &Snapshot) -> Result<()> {
            if self.written.len() == self.capacity {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.written.push(frame);
            Ok(())
        }
    }

    #[test]
    fn test_sink_error_aborts_run() {
        let p = sim_params();
        let mut s = random_state(4, 10);
        let mut ctx = RunContext::new(&p, 10);
        let run_params = RunParams {
            n_steps: 50,
            dstep_view: 3,
            write_initial: false,
        };
        let mut sink = FailingSink {
            capacity: 1,
            written: Vec::new(),
        };
        let r = run(&p, &mut s, &mut ctx, &run_params, &mut sink);
        assert!(matches!(r, Err(SetupError::Io(_))));
        assert_eq!(sink.written, vec![0]);
        // Stopped at the step whose frame could not be written.
        assert_eq!(s.step, 6);
    }

    #[test]
    fn test_run_from_stepped_state() {
        let p = sim_params();
        let mut s = random_state(1, 10);
        let mut ctx = RunContext::new(&p, 10);
        run_steps(&p, &mut s, &mut ctx, 7);

        let run_params = RunParams {
            n_steps: 10,
            dstep_view: 5,
            write_initial: true,
        };
        let mut sink = MemorySink::default();
        run(&p, &mut s, &mut ctx, &run_params, &mut sink).unwrap();

        let frames: Vec<(usize, usize)> = sink
            .frames
            .iter()
            .map(|(f, snap)| (*f, snap.step))
            .collect();
        assert_eq!(frames, vec![(0, 7), (1, 12), (2, 17)]);
        assert_eq!(s.step, 17);
        assert_relative_eq!(s.t, 17.0 * p.dt, epsilon = 1e-12);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "run context was built from other parameters")]
    fn test_mismatched_context() {
        let p = sim_params();
        let other = SimParams {
            force_strength: 5.0,
            ..p.clone()
        };
        let mut s = random_state(1, 3);
        let mut ctx = RunContext::new(&other, 3);
        update(&p, &mut s, &mut ctx);
    }
}
