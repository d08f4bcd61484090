use bevy::app::ScheduleRunnerPlugin;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy_aim_prediction::prelude::*;
use std::time::Duration;

const STEPS: usize = 24;
const FRAMES: u32 = 120;

fn main() {
    println!("Starting headless aim prediction...");
    println!("Sweeping the aim for {FRAMES} frames inside a walled room...");

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))))
        .add_plugins(AimPredictionPlugin)
        .insert_resource(
            SegmentWorld::default()
                .with_box(Vec2::new(-6.0, -3.0), Vec2::new(6.0, 6.0))
                .with_obstacle(Obstacle::new(Vec2::new(2.0, -3.0), Vec2::new(2.0, 0.5))),
        )
        .add_systems(Startup, setup)
        .add_systems(Update, sweep_aim)
        .add_systems(PostUpdate, report)
        .run();
}

#[derive(Component)]
struct Launcher;

fn setup(mut commands: Commands) {
    let pool: Vec<Entity> = (0..STEPS)
        .map(|index| commands.spawn((Transform::default(), Visibility::Hidden, TrajectoryDot { index })).id())
        .collect();

    let presenter = match TrajectoryPresenter::new(DisplayMode::Dots, pool) {
        Ok(presenter) => presenter,
        Err(err) => {
            error!("Could not build the visual pool: {err}");
            return;
        }
    };

    let config = match SimulationConfig::new(1.5, STEPS) {
        Ok(config) => config.with_max_bounces(2),
        Err(err) => {
            error!("Invalid simulation config: {err}");
            return;
        }
    };

    let mut predictor = match AimPredictor::new(config, presenter) {
        Ok(predictor) => predictor,
        Err(err) => {
            error!("Could not build the predictor: {err}");
            return;
        }
    };

    if let Err(err) = predictor.init(12.0, BodyParameters::new(1.0, 0.05).with_restitution(0.7)) {
        error!("Could not initialize the predictor: {err}");
        return;
    }

    commands.spawn((
        Launcher,
        predictor,
        AimInput::new(Vec2::X, 0.0),
        Transform::default(),
        GlobalTransform::default(),
    ));
}

/// Rotates the aim through the upper half-plane while ramping strength up.
fn sweep_aim(mut frame: Local<u32>, mut inputs: Query<&mut AimInput, With<Launcher>>, mut exit: MessageWriter<AppExit>) {
    *frame += 1;
    if *frame > FRAMES {
        exit.write(AppExit::Success);
        return;
    }

    let progress = *frame as f32 / FRAMES as f32;
    for mut input in inputs.iter_mut() {
        let angle = progress * std::f32::consts::PI;
        input.direction = Vec2::from_angle(angle);
        input.strength = progress;
        input.active = true;
    }
}

fn report(mut updates: MessageReader<AimUpdated>) {
    for update in updates.read() {
        if update.angle_degrees % 15 == 0 {
            println!(
                "[AIM] strength {:>3}% angle {:>4} deg -> {:>2} points, {} bounce(s)",
                update.strength_percent, update.angle_degrees, update.points, update.bounces
            );
        }
    }
}
