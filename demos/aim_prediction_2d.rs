use avian2d::prelude::*;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_aim_prediction::prelude::*;

const STEPS: usize = 40;
const MAX_LAUNCH_SPEED: f32 = 900.0; // px/s at full strength
const MAX_PULL: f32 = 220.0; // drag distance for full strength
const BALL_RADIUS: f32 = 8.0;
const BALL_LIFETIME: f32 = 6.0;
const PROJECTILE_LAYER: u32 = 0b10;

#[derive(Component)]
struct Launcher;

#[derive(Component)]
struct Ball {
    lifetime: f32,
}

#[derive(Component)]
struct AimText;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(PhysicsPlugins::default())
        .add_plugins(AimPredictionPluginGroup)
        .insert_resource(Gravity(Vec2::NEG_Y * 600.0))
        .insert_resource(PredictionSettings {
            debug_draw: false,
            ..default()
        })
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (aim_with_mouse, toggle_debug, update_hud, cleanup_balls),
        )
        .run();
}

/// Ball body shared by the launched projectiles and the predictor.
fn ball_body() -> (GravityScale, LinearDamping, Restitution) {
    (GravityScale(1.0), LinearDamping(0.2), Restitution::new(0.75))
}

fn spawn_wall(commands: &mut Commands, center: Vec2, size: Vec2) {
    commands.spawn((
        Sprite {
            color: Color::srgb(0.4, 0.4, 0.45),
            custom_size: Some(size),
            ..default()
        },
        Transform::from_translation(center.extend(0.0)),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
    ));
}

fn setup(mut commands: Commands) {
    // Camera
    commands.spawn(Camera2d);

    // Room and a couple of obstacles
    spawn_wall(&mut commands, Vec2::new(0.0, -300.0), Vec2::new(1200.0, 20.0));
    spawn_wall(&mut commands, Vec2::new(-600.0, 0.0), Vec2::new(20.0, 620.0));
    spawn_wall(&mut commands, Vec2::new(600.0, 0.0), Vec2::new(20.0, 620.0));
    spawn_wall(&mut commands, Vec2::new(0.0, 300.0), Vec2::new(1200.0, 20.0));
    spawn_wall(&mut commands, Vec2::new(150.0, -150.0), Vec2::new(30.0, 280.0));
    spawn_wall(&mut commands, Vec2::new(380.0, 80.0), Vec2::new(200.0, 20.0));

    // Pooled trajectory dots
    let pool = spawn_visual_pool(
        &mut commands,
        DisplayMode::Dots,
        STEPS,
        Sprite {
            color: Color::srgba(1.0, 1.0, 1.0, 0.8),
            custom_size: Some(Vec2::splat(5.0)),
            ..default()
        },
    );

    let predictor = TrajectoryPresenter::new(DisplayMode::Dots, pool)
        .and_then(|presenter| {
            let config = SimulationConfig::new(1.2, STEPS)?.with_max_bounces(2);
            AimPredictor::new(config, presenter)
        })
        .and_then(|mut predictor| {
            let (gravity_scale, damping, restitution) = ball_body();
            let body = BodyParameters::from_physics(Some(&gravity_scale), Some(&damping), Some(&restitution), None);
            predictor.init(MAX_LAUNCH_SPEED, body)?;
            Ok(predictor)
        });

    let predictor = match predictor {
        Ok(predictor) => predictor,
        Err(err) => {
            error!("Could not set up aim prediction: {err}");
            return;
        }
    };

    // Launcher
    commands.spawn((
        Sprite {
            color: Color::srgb(0.0, 0.8, 1.0),
            custom_size: Some(Vec2::new(36.0, 14.0)),
            ..default()
        },
        Transform::from_xyz(-420.0, -200.0, 1.0),
        Launcher,
        predictor,
        AimInput::default(),
    ));

    // UI
    commands.spawn((
        Text::new("Drag with the left mouse button to aim, release to launch"),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        AimText,
    ));
}

/// Slingshot input: pulling away from the launcher aims the other way.
fn aim_with_mouse(
    mut commands: Commands,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    settings: Res<PredictionSettings>,
    mut launchers: Query<(&GlobalTransform, &mut AimInput), With<Launcher>>,
) {
    let Some(cursor) = cursor_world_position(&windows, &cameras) else {
        return;
    };

    for (transform, mut input) in launchers.iter_mut() {
        let origin = transform.translation().truncate();

        if mouse.pressed(MouseButton::Left) {
            let pull = origin - cursor;
            input.direction = pull.normalize_or_zero();
            input.strength = (pull.length() / MAX_PULL).min(1.0);
            input.active = true;
        }

        if mouse.just_released(MouseButton::Left) && input.active {
            if settings.is_shot(input.strength) {
                launch_ball(&mut commands, origin, input.direction * MAX_LAUNCH_SPEED * input.strength);
            }
            input.release();
        }
    }
}

fn cursor_world_position(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let window = windows.iter().next()?;
    let (camera, camera_transform) = cameras.iter().next()?;
    let cursor = window.cursor_position()?;
    camera.viewport_to_world_2d(camera_transform, cursor).ok()
}

fn launch_ball(commands: &mut Commands, origin: Vec2, velocity: Vec2) {
    commands.spawn((
        Sprite {
            color: Color::srgb(1.0, 0.6, 0.2),
            custom_size: Some(Vec2::splat(BALL_RADIUS * 2.0)),
            ..default()
        },
        Transform::from_translation(origin.extend(0.5)),
        RigidBody::Dynamic,
        Collider::circle(BALL_RADIUS),
        CollisionLayers::new(PROJECTILE_LAYER, LayerMask::ALL),
        LinearVelocity(velocity),
        ball_body(),
        Ball {
            lifetime: BALL_LIFETIME,
        },
    ));
}

fn toggle_debug(keyboard_input: Res<ButtonInput<KeyCode>>, mut settings: ResMut<PredictionSettings>) {
    if keyboard_input.just_pressed(KeyCode::KeyD) {
        settings.debug_draw = !settings.debug_draw;
    }
}

fn update_hud(mut updates: MessageReader<AimUpdated>, mut texts: Query<&mut Text, With<AimText>>) {
    let Some(update) = updates.read().last() else {
        return;
    };
    let Some(mut text) = texts.iter_mut().next() else {
        return;
    };

    text.0 = format!(
        "Strength: {}%\nAngle: {} deg\nPoints: {}  Bounces: {}\n\nD: toggle gizmo overlay",
        update.strength_percent, update.angle_degrees, update.points, update.bounces
    );
}

fn cleanup_balls(mut commands: Commands, time: Res<Time>, mut balls: Query<(Entity, &mut Ball)>) {
    for (entity, mut ball) in balls.iter_mut() {
        ball.lifetime -= time.delta_secs();
        if ball.lifetime <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}
