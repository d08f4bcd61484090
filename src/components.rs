//! Core components for the aim prediction system.

use bevy::prelude::*;

use crate::error::PredictionError;
use crate::presenter::TrajectoryPresenter;
use crate::simulation::{BodyParameters, SimulationConfig, Trajectory, TrajectorySimulator, WorldConstants};
use crate::types::{signed_angle, Linecast};

/// Aim predictor attached to a launcher.
///
/// Owns the simulator, the simulation settings and the visual pool, and
/// exposes the `init` / `show` / `hide` / `update_display` lifecycle. A new
/// predictor is hidden and must be initialized before its first update.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_aim_prediction::prelude::*;
///
/// let mut world = World::new();
/// let pool: Vec<Entity> = (0..20).map(|_| world.spawn_empty().id()).collect();
///
/// let presenter = TrajectoryPresenter::new(DisplayMode::Dots, pool).unwrap();
/// let config = SimulationConfig::new(1.0, 20).unwrap().with_max_bounces(2);
/// let mut predictor = AimPredictor::new(config, presenter).unwrap();
///
/// predictor.init(12.0, BodyParameters::default()).unwrap();
/// predictor.show();
///
/// let trajectory = predictor
///     .update_display(Vec2::ZERO, Vec2::new(1.0, 1.0).normalize(), 0.8, &SegmentWorld::default())
///     .unwrap();
/// assert_eq!(trajectory.len(), 20);
/// ```
#[derive(Component, Clone, Debug)]
pub struct AimPredictor {
    config: SimulationConfig,
    simulator: TrajectorySimulator,
    presenter: TrajectoryPresenter,
    max_launch_speed: Option<f32>,
    orientation_degrees: f32,
}

impl AimPredictor {
    /// Creates a hidden, uninitialized predictor.
    ///
    /// # Errors
    /// * `DegenerateConfig` if `config` is invalid
    /// * `PoolSizeMismatch` if the pool cannot draw `config.step_count` points
    pub fn new(config: SimulationConfig, presenter: TrajectoryPresenter) -> Result<Self, PredictionError> {
        config.validate()?;
        presenter.check_capacity(config.step_count)?;

        let mut presenter = presenter;
        presenter.hide();
        presenter.clear();

        Ok(Self {
            config,
            simulator: TrajectorySimulator::default(),
            presenter,
            max_launch_speed: None,
            orientation_degrees: 0.0,
        })
    }

    /// Builder pattern: use the given world constants.
    pub fn with_world(mut self, world: WorldConstants) -> Self {
        self.simulator.set_world(world);
        self
    }

    /// Builder pattern: restrict linecasts to the given layers.
    pub fn with_layer_mask(mut self, layer_mask: u32) -> Self {
        self.simulator.set_layer_mask(layer_mask);
        self
    }

    /// Resolves the launch speed and body parameters. Must run before
    /// `update_display`; calling it again replaces the previous values.
    ///
    /// # Errors
    /// `DegenerateConfig` if `max_launch_speed` is not a positive finite number
    pub fn init(&mut self, max_launch_speed: f32, body: BodyParameters) -> Result<(), PredictionError> {
        if !max_launch_speed.is_finite() || max_launch_speed <= 0.0 {
            return Err(PredictionError::degenerate(format!(
                "max_launch_speed must be positive, got {max_launch_speed}"
            )));
        }

        self.max_launch_speed = Some(max_launch_speed);
        self.simulator.init(body);

        info!(
            "Aim predictor initialized: max speed {max_launch_speed}, restitution {:.2}, gravity scale {}",
            body.restitution, body.gravity_scale
        );
        Ok(())
    }

    /// Whether `init` has been called.
    pub fn is_initialized(&self) -> bool {
        self.max_launch_speed.is_some() && self.simulator.is_initialized()
    }

    /// Shows the trajectory. No-op if already shown.
    pub fn show(&mut self) {
        self.presenter.show();
    }

    /// Hides the trajectory. No-op if already hidden.
    pub fn hide(&mut self) {
        self.presenter.hide();
    }

    /// Whether the trajectory is shown.
    pub fn is_shown(&self) -> bool {
        self.presenter.is_shown()
    }

    /// Recomputes the orientation and the predicted path, then lays the
    /// path onto the visual pool.
    ///
    /// # Arguments
    /// * `origin` - Launch point in world space
    /// * `aim_direction` - Aim direction (normalized here)
    /// * `strength` - Strength fraction, clamped to [0, 1]
    /// * `geometry` - Environment linecast service
    ///
    /// # Errors
    /// * `NotInitialized` if `init` was never called
    /// * `DegenerateConfig` if the world constants are unusable
    pub fn update_display<G: Linecast + ?Sized>(
        &mut self,
        origin: Vec2,
        aim_direction: Vec2,
        strength: f32,
        geometry: &G,
    ) -> Result<Trajectory, PredictionError> {
        let max_launch_speed = self.max_launch_speed.ok_or(PredictionError::NotInitialized)?;

        let direction = aim_direction.normalize_or_zero();
        let strength = if strength.is_finite() {
            strength.clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.orientation_degrees = signed_angle(Vec2::ZERO, direction);

        let velocity = direction * max_launch_speed * strength;
        let trajectory = self.simulator.plot(origin, velocity, &self.config, geometry)?;
        self.presenter.render(&trajectory);

        Ok(trajectory)
    }

    /// Signed aim angle from the last update, in degrees.
    pub fn orientation_degrees(&self) -> f32 {
        self.orientation_degrees
    }

    /// Launch speed at full strength.
    pub fn max_launch_speed(&self) -> Option<f32> {
        self.max_launch_speed
    }

    /// Simulation settings.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replaces the simulation settings.
    ///
    /// # Errors
    /// Same as [`AimPredictor::new`]; the old settings stay in place on error.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), PredictionError> {
        config.validate()?;
        self.presenter.check_capacity(config.step_count)?;
        self.config = config;
        Ok(())
    }

    /// The trajectory simulator.
    pub fn simulator(&self) -> &TrajectorySimulator {
        &self.simulator
    }

    /// Replaces the world constants used by the next update.
    pub fn set_world(&mut self, world: WorldConstants) {
        self.simulator.set_world(world);
    }

    /// Replaces the environment layer mask used by the next update.
    pub fn set_layer_mask(&mut self, layer_mask: u32) {
        self.simulator.set_layer_mask(layer_mask);
    }

    /// The visual pool state.
    pub fn presenter(&self) -> &TrajectoryPresenter {
        &self.presenter
    }
}

/// Aim input for one predictor, written by the game's input adapter.
///
/// # Fields
/// * `direction` - Aim direction (unit vector)
/// * `strength` - Strength fraction in [0, 1]
/// * `active` - Whether the player is currently aiming
#[derive(Component, Reflect, Clone, Copy, Debug, Default, PartialEq)]
#[reflect(Component)]
pub struct AimInput {
    /// Aim direction
    pub direction: Vec2,
    /// Strength fraction
    pub strength: f32,
    /// Aiming in progress
    pub active: bool,
}

impl AimInput {
    /// Active input aiming along `direction` with the given strength.
    pub fn new(direction: Vec2, strength: f32) -> Self {
        Self {
            direction,
            strength,
            active: true,
        }
    }

    /// Stops aiming.
    pub fn release(&mut self) {
        self.active = false;
    }
}

/// Marker for a pooled dot visual.
#[derive(Component, Reflect, Clone, Copy, Debug, Default)]
#[reflect(Component)]
pub struct TrajectoryDot {
    /// Index in the pool
    pub index: usize,
}

/// Marker for a pooled line segment visual.
///
/// The sprite is expected to be one unit long along X; sync stretches it.
#[derive(Component, Reflect, Clone, Copy, Debug, Default)]
#[reflect(Component)]
pub struct TrajectorySegment {
    /// Index in the pool
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Obstacle, SegmentWorld};
    use crate::types::DisplayMode;

    fn predictor(mode: DisplayMode, steps: usize) -> AimPredictor {
        let mut world = World::new();
        let pool = (0..mode.pool_size(steps)).map(|_| world.spawn_empty().id()).collect();
        let presenter = TrajectoryPresenter::new(mode, pool).unwrap();
        let config = SimulationConfig::new(1.0, steps).unwrap().with_max_bounces(0);
        AimPredictor::new(config, presenter)
            .unwrap()
            .with_world(WorldConstants {
                gravity: Vec2::ZERO,
                min_physics_tick: 0.001,
            })
    }

    #[test]
    fn test_starts_hidden_and_uninitialized() {
        let predictor = predictor(DisplayMode::Dots, 10);
        assert!(!predictor.is_shown());
        assert!(!predictor.is_initialized());
        assert_eq!(predictor.presenter().visible_count(), 0);
    }

    #[test]
    fn test_update_before_init_fails() {
        let mut predictor = predictor(DisplayMode::Dots, 10);
        let result = predictor.update_display(Vec2::ZERO, Vec2::X, 1.0, &SegmentWorld::default());
        assert_eq!(result, Err(PredictionError::NotInitialized));
        assert_eq!(predictor.presenter().visible_count(), 0);
    }

    #[test]
    fn test_init_rejects_bad_speed() {
        let mut predictor = predictor(DisplayMode::Dots, 10);
        assert!(predictor.init(0.0, BodyParameters::default()).is_err());
        assert!(predictor.init(f32::NAN, BodyParameters::default()).is_err());
        assert!(!predictor.is_initialized());

        assert!(predictor.init(5.0, BodyParameters::default()).is_ok());
        assert!(predictor.is_initialized());
    }

    #[test]
    fn test_pool_too_small_rejected() {
        let mut world = World::new();
        let pool = (0..5).map(|_| world.spawn_empty().id()).collect();
        let presenter = TrajectoryPresenter::new(DisplayMode::Dots, pool).unwrap();
        let config = SimulationConfig::new(1.0, 10).unwrap();

        assert!(matches!(
            AimPredictor::new(config, presenter),
            Err(PredictionError::PoolSizeMismatch { expected: 10, actual: 5, .. })
        ));
    }

    #[test]
    fn test_velocity_scaled_by_strength() {
        let mut predictor = predictor(DisplayMode::Dots, 10);
        predictor.init(10.0, BodyParameters::default()).unwrap();

        // 10 units/s at half strength over 0.1s ticks
        let trajectory = predictor
            .update_display(Vec2::ZERO, Vec2::X, 0.5, &SegmentWorld::default())
            .unwrap();
        assert_eq!(trajectory.len(), 10);
        assert!(trajectory.points()[0].distance(Vec2::new(0.5, 0.0)) < 1e-5);
        assert!(trajectory.points()[9].distance(Vec2::new(5.0, 0.0)) < 1e-4);
        assert_eq!(predictor.presenter().visible_count(), 10);
    }

    #[test]
    fn test_strength_clamped() {
        let mut predictor = predictor(DisplayMode::Dots, 10);
        predictor.init(10.0, BodyParameters::default()).unwrap();

        let trajectory = predictor
            .update_display(Vec2::ZERO, Vec2::X, 3.0, &SegmentWorld::default())
            .unwrap();
        assert!(trajectory.points()[0].distance(Vec2::new(1.0, 0.0)) < 1e-5);
    }

    #[test]
    fn test_orientation_tracks_aim() {
        let mut predictor = predictor(DisplayMode::Dots, 10);
        predictor.init(10.0, BodyParameters::default()).unwrap();

        predictor
            .update_display(Vec2::ZERO, Vec2::new(0.0, -2.0), 1.0, &SegmentWorld::default())
            .unwrap();
        assert!((predictor.orientation_degrees() + 90.0).abs() < 1e-4);

        predictor
            .update_display(Vec2::ZERO, Vec2::new(-1.0, 1.0), 1.0, &SegmentWorld::default())
            .unwrap();
        assert!((predictor.orientation_degrees() - 135.0).abs() < 1e-3);
    }

    #[test]
    fn test_wall_shortens_display() {
        let mut predictor = predictor(DisplayMode::Line, 10);
        predictor.init(10.0, BodyParameters::default()).unwrap();
        predictor.show();

        let wall = SegmentWorld::default()
            .with_obstacle(Obstacle::new(Vec2::new(3.5, -1.0), Vec2::new(3.5, 1.0)));

        predictor.update_display(Vec2::ZERO, Vec2::NEG_X, 1.0, &wall).unwrap();
        assert_eq!(predictor.presenter().visible_count(), 9);

        let trajectory = predictor.update_display(Vec2::ZERO, Vec2::X, 1.0, &wall).unwrap();
        assert_eq!(trajectory.len(), 3);
        assert_eq!(predictor.presenter().visible_count(), 2);
        assert!(predictor.is_shown());
    }

    #[test]
    fn test_set_config_validates() {
        let mut predictor = predictor(DisplayMode::Dots, 10);
        let too_many = SimulationConfig::new(1.0, 11).unwrap();
        assert!(predictor.set_config(too_many).is_err());
        assert_eq!(predictor.config().step_count, 10);

        let fewer = SimulationConfig::new(2.0, 5).unwrap();
        assert!(predictor.set_config(fewer).is_ok());
        assert_eq!(predictor.config().step_count, 5);
    }

    #[test]
    fn test_input_release() {
        let mut input = AimInput::new(Vec2::Y, 0.7);
        assert!(input.active);
        input.release();
        assert!(!input.active);
    }
}
