use std::{path::PathBuf, time::Duration};

use acusim::{
    config::{run::RunContext, setup::SetupConfig},
    dynamics::run_steps,
    view::{
        close_on_esc, distance_colour_weights,
        environment::{draw_boundaries, Environment},
        LiveSim, ParticleId, SetupConfigRes, StainState, TIME_STEP,
    },
};
use bevy::{prelude::*, time::common_conditions::on_timer};
use clap::Parser;

const PARTICLE_RADIUS: f32 = 5.0;

fn add_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn add_particles(
    mut commands: Commands,
    sim: Res<LiveSim>,
    setup_config: Res<SetupConfigRes>,
    env: Res<Environment>,
    stain: Res<StainState>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let circle = meshes.add(Circle::new(PARTICLE_RADIUS));
    let positions = sim.state.particles.positions();
    let weights = distance_colour_weights(positions, setup_config.0.parameters.boundaries.centre());

    for (i, (r, w)) in positions.iter().zip(weights).enumerate() {
        // One material per particle, so each can be recoloured on its own.
        let material = materials.add(ColorMaterial::from(stain.particle_colour(w)));
        commands.spawn((
            Mesh2d(circle.clone()),
            MeshMaterial2d(material),
            Transform::from_translation(env.transformed_vec2(r).extend(0.0)),
            ParticleId(i),
        ));
    }
}

fn step_simulation(setup_config: Res<SetupConfigRes>, mut sim: ResMut<LiveSim>) {
    if sim.paused || sim.finished() {
        return;
    }
    let n = match sim.max_steps {
        Some(m) => sim.sim_stepsize.min(m - sim.state.step),
        None => sim.sim_stepsize,
    };
    let LiveSim { state, context, .. } = &mut *sim;
    if let Some(summary) = run_steps(&setup_config.0.parameters, state, context, n) {
        debug!(
            "Step {}: repelled={} mean_speed={:.5}",
            state.step, summary.n_repelled, summary.mean_speed
        );
    }
}

fn update_particles(
    sim: Res<LiveSim>,
    setup_config: Res<SetupConfigRes>,
    env: Res<Environment>,
    stain: Res<StainState>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut q_particle: Query<(&ParticleId, &mut Transform, &MeshMaterial2d<ColorMaterial>)>,
) {
    let positions = sim.state.particles.positions();
    let weights = distance_colour_weights(positions, setup_config.0.parameters.boundaries.centre());
    for (particle_id, mut transform, material) in &mut q_particle {
        let r = &positions[particle_id.0];
        transform.translation = env.transformed_vec2(r).extend(0.0);
        if let Some(m) = materials.get_mut(&material.0) {
            m.color = stain.particle_colour(weights[particle_id.0]);
        }
    }
}

fn update_title(
    sim: Res<LiveSim>,
    stain: Res<StainState>,
    mut q_window: Query<&mut Window>,
) {
    let frame = match sim.max_steps {
        Some(m) => format!("Step {}/{}", sim.state.step, m),
        None => format!("Step {}", sim.state.step),
    };
    for mut window in &mut q_window {
        window.title = format!("{} | {}", stain.title(), frame);
    }
}

fn handle_input(
    mouse_input: Res<ButtonInput<MouseButton>>,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut stain: ResMut<StainState>,
    mut clear_colour: ResMut<ClearColor>,
    mut sim: ResMut<LiveSim>,
) {
    if mouse_input.just_pressed(MouseButton::Left) {
        *stain = stain.toggled();
        clear_colour.0 = stain.background();
        info!("Stain: {:?}", *stain);
    }
    if keyboard_input.just_pressed(KeyCode::Space) {
        sim.paused = !sim.paused;
    }
    if keyboard_input.just_pressed(KeyCode::ArrowUp) {
        sim.sim_stepsize += 1;
    }
    if keyboard_input.just_pressed(KeyCode::ArrowDown) {
        sim.sim_stepsize = (sim.sim_stepsize - 1).max(1);
    }
}

#[derive(Debug, clap::Parser)]
#[command(name = "acusim_view", about = "Watch a simulation as it runs...")]
struct ViewCli {
    #[arg(short = 'c', long = "config")]
    pub config: PathBuf,

    #[arg(short = 'w', long = "window-size", default_value = "800.0")]
    pub window_size: f64,

    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Stop after this many steps; run forever if absent.
    #[arg(short = 'n', long = "steps")]
    pub max_steps: Option<usize>,

    #[arg(long = "steps-per-frame", default_value = "1")]
    pub sim_stepsize: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ViewCli::parse();

    let setup_config = SetupConfig::parse(&args.config)?.seeded(args.seed);
    let state = setup_config.initialize(None)?;
    let context = RunContext::new(&setup_config.parameters, state.particles.len());

    let env = Environment {
        boundaries: setup_config.parameters.boundaries.clone(),
        window_size: args.window_size,
    };
    let stain = StainState::default();
    let side = (args.window_size * 1.1) as f32;

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: stain.title().to_string(),
                        resolution: (side, side).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(bevy::log::LogPlugin {
                    level: bevy::log::Level::INFO,
                    ..default()
                }),
        )
        .insert_resource(ClearColor(stain.background()))
        .insert_resource(env)
        .insert_resource(stain)
        .insert_resource(LiveSim {
            state,
            context,
            sim_stepsize: args.sim_stepsize.max(1),
            max_steps: args.max_steps,
            paused: false,
        })
        .insert_resource(SetupConfigRes(setup_config))
        .add_systems(Startup, (add_camera, add_particles))
        .add_systems(
            Update,
            (
                handle_input,
                step_simulation.run_if(on_timer(Duration::from_secs_f64(TIME_STEP))),
                update_particles,
                update_title,
                draw_boundaries,
            )
                .chain(),
        )
        .add_systems(Update, close_on_esc)
        .run();

    Ok(())
}
