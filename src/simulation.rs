//! Trajectory prediction engine.
//!
//! Advances a virtual projectile tick by tick under gravity and linear drag,
//! linecasts every travelled segment against the environment and reflects the
//! projectile off obstacles until the time horizon, the bounce limit or the
//! first contact ends the prediction.

use bevy::prelude::*;

use crate::error::PredictionError;
use crate::types::{reflect, Linecast, LinecastHit};

/// Fraction of the reflected step used to push a bounced point off the surface.
pub const DEFAULT_CONTACT_OFFSET: f32 = 0.1;

/// Layer mask matching every collision layer.
pub const ALL_LAYERS: u32 = u32::MAX;

/// Segments shorter than this are not linecast.
const MIN_SEGMENT_LENGTH_SQUARED: f32 = 1e-12;

/// Constants supplied by the physics world.
///
/// # Fields
/// * `gravity` - World gravity vector (units/s²)
/// * `min_physics_tick` - Smallest stable simulation step (seconds)
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_aim_prediction::simulation::WorldConstants;
///
/// let world = WorldConstants::from_physics_step(Vec2::new(0.0, -9.81), 1.0 / 50.0, 8);
/// assert!((world.min_physics_tick - 0.0025).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct WorldConstants {
    /// Gravity vector (units/s²)
    pub gravity: Vec2,
    /// Minimum tick length the prediction may use (seconds)
    pub min_physics_tick: f32,
}

impl Default for WorldConstants {
    /// Earth gravity pointing down, 64 Hz fixed step split over 8 solver iterations.
    fn default() -> Self {
        Self::from_physics_step(Vec2::new(0.0, -9.81), 1.0 / 64.0, 8)
    }
}

impl WorldConstants {
    /// Derives the minimum tick from the fixed timestep and solver iteration count.
    ///
    /// # Arguments
    /// * `gravity` - World gravity vector
    /// * `fixed_timestep` - Physics fixed timestep in seconds
    /// * `solver_iterations` - Velocity solver iterations per step (treated as at least 1)
    pub fn from_physics_step(gravity: Vec2, fixed_timestep: f32, solver_iterations: u32) -> Self {
        Self {
            gravity,
            min_physics_tick: fixed_timestep / solver_iterations.max(1) as f32,
        }
    }

    fn validate(&self) -> Result<(), PredictionError> {
        if !self.gravity.is_finite() {
            return Err(PredictionError::degenerate("gravity must be finite"));
        }
        if !self.min_physics_tick.is_finite() || self.min_physics_tick <= 0.0 {
            return Err(PredictionError::degenerate(format!(
                "min_physics_tick must be positive, got {}",
                self.min_physics_tick
            )));
        }
        Ok(())
    }
}

/// Physical parameters of the body being thrown.
///
/// # Fields
/// * `gravity_scale` - Multiplier applied to world gravity
/// * `drag_coefficient` - Fraction of velocity lost per second
/// * `restitution` - Fraction of speed kept after a bounce, in [0, 1]
///
/// # Example
/// ```
/// use bevy_aim_prediction::simulation::BodyParameters;
///
/// let body = BodyParameters::new(1.0, 0.1)
///     .with_restitution_sources(None, Some(0.6));
/// assert_eq!(body.restitution, 0.6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct BodyParameters {
    /// Gravity multiplier
    pub gravity_scale: f32,
    /// Linear drag per second
    pub drag_coefficient: f32,
    /// Bounciness in [0, 1]
    pub restitution: f32,
}

impl Default for BodyParameters {
    /// Full gravity, no drag, perfectly elastic.
    fn default() -> Self {
        Self {
            gravity_scale: 1.0,
            drag_coefficient: 0.0,
            restitution: 1.0,
        }
    }
}

impl BodyParameters {
    /// Creates body parameters with a perfectly elastic restitution.
    pub fn new(gravity_scale: f32, drag_coefficient: f32) -> Self {
        Self {
            gravity_scale,
            drag_coefficient,
            ..Default::default()
        }
    }

    /// Builder pattern: set restitution directly (clamped to [0, 1]).
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: resolve restitution from its possible sources.
    ///
    /// See [`BodyParameters::resolve_restitution`].
    pub fn with_restitution_sources(mut self, material: Option<f32>, shape: Option<f32>) -> Self {
        self.restitution = Self::resolve_restitution(material, shape);
        self
    }

    /// Picks the body's bounciness: the physical material value if present,
    /// else the collision shape value, else perfectly elastic.
    ///
    /// # Arguments
    /// * `material` - Restitution of the physical material attached to the body
    /// * `shape` - Restitution configured on the collision shape
    ///
    /// # Returns
    /// Restitution clamped to [0, 1]
    pub fn resolve_restitution(material: Option<f32>, shape: Option<f32>) -> f32 {
        material
            .filter(|value| value.is_finite())
            .or(shape.filter(|value| value.is_finite()))
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }

    /// Reads body parameters from avian2d components.
    ///
    /// `body_restitution` is the restitution set on the rigid body entity and
    /// wins over `collider_restitution`, set on its collider.
    #[cfg(feature = "dim2")]
    pub fn from_physics(
        gravity_scale: Option<&avian2d::prelude::GravityScale>,
        damping: Option<&avian2d::prelude::LinearDamping>,
        body_restitution: Option<&avian2d::prelude::Restitution>,
        collider_restitution: Option<&avian2d::prelude::Restitution>,
    ) -> Self {
        Self {
            gravity_scale: gravity_scale.map_or(1.0, |scale| scale.0),
            drag_coefficient: damping.map_or(0.0, |damping| damping.0),
            restitution: Self::resolve_restitution(
                body_restitution.map(|r| r.coefficient),
                collider_restitution.map(|r| r.coefficient),
            ),
        }
    }

    fn validate(&self) -> Result<(), PredictionError> {
        if !self.gravity_scale.is_finite() || !self.drag_coefficient.is_finite() {
            return Err(PredictionError::degenerate(
                "body gravity scale and drag must be finite",
            ));
        }
        Ok(())
    }
}

/// Per-prediction simulation settings.
///
/// # Fields
/// * `total_predicted_time` - Time horizon to simulate (seconds, > 0)
/// * `step_count` - Desired number of samples (> 0)
/// * `max_bounces` - Bounces plotted before truncation; 0 stops at the first contact
/// * `stop_on_first_collision` - End at the first contact regardless of `max_bounces`
/// * `contact_offset` - Fraction of the reflected step used to leave the surface
///
/// # Example
/// ```
/// use bevy_aim_prediction::simulation::SimulationConfig;
///
/// let config = SimulationConfig::new(1.5, 40)
///     .unwrap()
///     .with_max_bounces(2);
/// assert_eq!(config.step_count, 40);
/// assert!(SimulationConfig::new(0.0, 40).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct SimulationConfig {
    /// Prediction horizon (seconds)
    pub total_predicted_time: f32,
    /// Requested number of samples
    pub step_count: usize,
    /// Bounces allowed before the path is cut
    pub max_bounces: u32,
    /// Stop at the first contact
    pub stop_on_first_collision: bool,
    /// Push-off fraction after a bounce
    pub contact_offset: f32,
}

impl Default for SimulationConfig {
    /// One second sampled 30 times, one bounce.
    fn default() -> Self {
        Self {
            total_predicted_time: 1.0,
            step_count: 30,
            max_bounces: 1,
            stop_on_first_collision: false,
            contact_offset: DEFAULT_CONTACT_OFFSET,
        }
    }
}

impl SimulationConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    /// `DegenerateConfig` if the horizon is not a positive finite number or
    /// `step_count` is zero.
    pub fn new(total_predicted_time: f32, step_count: usize) -> Result<Self, PredictionError> {
        let config = Self {
            total_predicted_time,
            step_count,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Builder pattern: set the bounce limit.
    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    /// Builder pattern: stop the prediction at the first contact.
    pub fn with_stop_on_first_collision(mut self, stop: bool) -> Self {
        self.stop_on_first_collision = stop;
        self
    }

    /// Builder pattern: set the push-off fraction used after a bounce.
    pub fn with_contact_offset(mut self, contact_offset: f32) -> Self {
        self.contact_offset = contact_offset;
        self
    }

    /// Checks that the configuration yields a finite, non-empty simulation.
    pub fn validate(&self) -> Result<(), PredictionError> {
        if !self.total_predicted_time.is_finite() || self.total_predicted_time <= 0.0 {
            return Err(PredictionError::degenerate(format!(
                "total_predicted_time must be positive, got {}",
                self.total_predicted_time
            )));
        }
        if self.step_count == 0 {
            return Err(PredictionError::degenerate("step_count must be at least 1"));
        }
        if !self.contact_offset.is_finite() || self.contact_offset < 0.0 {
            return Err(PredictionError::degenerate(format!(
                "contact_offset must be finite and non-negative, got {}",
                self.contact_offset
            )));
        }
        Ok(())
    }

    /// Tick length: the requested sample spacing, floored by the physics minimum.
    pub fn tick_length(&self, min_physics_tick: f32) -> f32 {
        (self.total_predicted_time / self.step_count as f32).max(min_physics_tick)
    }

    /// Hard iteration cap for a given tick length.
    pub fn max_ticks(&self, tick_length: f32) -> usize {
        let ticks = (self.total_predicted_time / tick_length).ceil();
        if ticks.is_finite() && ticks > 0.0 {
            (ticks as usize).min(self.step_count)
        } else {
            0
        }
    }
}

/// Transient state of the virtual projectile during one `plot` call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectileState {
    /// Current predicted location
    pub position: Vec2,
    /// Displacement per tick (velocity already scaled by the tick length)
    pub velocity_step: Vec2,
    /// Simulation clock (seconds)
    pub elapsed_time: f32,
    /// Bounces encountered so far
    pub collision_count: u32,
}

/// Why a prediction stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Termination {
    /// The time horizon was reached
    #[default]
    Horizon,
    /// A contact exceeded `max_bounces`; the crossing sample was dropped
    BounceLimit,
    /// `stop_on_first_collision` ended the path on the contact point
    FirstCollision,
}

/// Ordered sequence of predicted positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    /// Predicted positions, oldest first
    pub points: Vec<Vec2>,
    /// Contacts registered while predicting
    pub collisions: u32,
    /// Reason the simulation ended
    pub termination: Termination,
    /// Tick length used (seconds)
    pub tick_length: f32,
}

impl Trajectory {
    /// Number of predicted points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when nothing was predicted.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Predicted points as a slice.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Last predicted point, if any.
    pub fn last(&self) -> Option<Vec2> {
        self.points.last().copied()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Vec2;
    type IntoIter = std::slice::Iter<'a, Vec2>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Deterministic 2D trajectory predictor.
///
/// Holds the world constants and the body parameters resolved by
/// [`TrajectorySimulator::init`]. Plotting before `init` fails with
/// [`PredictionError::NotInitialized`].
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_aim_prediction::geometry::SegmentWorld;
/// use bevy_aim_prediction::simulation::*;
///
/// let mut simulator = TrajectorySimulator::new(WorldConstants::default());
/// simulator.init(BodyParameters::default());
///
/// let config = SimulationConfig::new(1.0, 20).unwrap();
/// let trajectory = simulator
///     .plot(Vec2::ZERO, Vec2::new(5.0, 5.0), &config, &SegmentWorld::default())
///     .unwrap();
/// assert_eq!(trajectory.len(), 20);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectorySimulator {
    world: WorldConstants,
    body: Option<BodyParameters>,
    layer_mask: u32,
}

impl Default for TrajectorySimulator {
    fn default() -> Self {
        Self::new(WorldConstants::default())
    }
}

impl TrajectorySimulator {
    /// Creates an uninitialized simulator querying every collision layer.
    pub fn new(world: WorldConstants) -> Self {
        Self {
            world,
            body: None,
            layer_mask: ALL_LAYERS,
        }
    }

    /// Builder pattern: restrict linecasts to the given layers.
    pub fn with_layer_mask(mut self, layer_mask: u32) -> Self {
        self.layer_mask = layer_mask;
        self
    }

    /// Stores the resolved body parameters. Must run before `plot`.
    pub fn init(&mut self, body: BodyParameters) {
        self.body = Some(body);
    }

    /// Whether `init` has been called.
    pub fn is_initialized(&self) -> bool {
        self.body.is_some()
    }

    /// Resolved body parameters.
    pub fn body(&self) -> Option<&BodyParameters> {
        self.body.as_ref()
    }

    /// Current world constants.
    pub fn world(&self) -> &WorldConstants {
        &self.world
    }

    /// Replaces the world constants (gravity or physics step changed).
    pub fn set_world(&mut self, world: WorldConstants) {
        self.world = world;
    }

    /// Environment layers the linecast is restricted to.
    pub fn layer_mask(&self) -> u32 {
        self.layer_mask
    }

    /// Replaces the environment layer mask.
    pub fn set_layer_mask(&mut self, layer_mask: u32) {
        self.layer_mask = layer_mask;
    }

    /// Predicts the path of a projectile launched from `start_position`.
    ///
    /// Each tick applies gravity and drag to the per-tick step, appends the
    /// new position and linecasts the travelled segment. A contact either
    /// ends the path (`stop_on_first_collision`, or more than `max_bounces`
    /// contacts) or reflects the step, scaled by restitution, and moves the
    /// last sample just off the surface. The check after a bounce is skipped
    /// so the same contact is not found twice.
    ///
    /// # Arguments
    /// * `start_position` - Launch point in world space
    /// * `start_velocity` - Launch velocity, already scaled by strength and max speed
    /// * `config` - Horizon, sampling and bounce policy
    /// * `geometry` - Environment linecast service
    ///
    /// # Errors
    /// * `NotInitialized` if `init` was never called
    /// * `DegenerateConfig` if `config` or the world constants are unusable
    pub fn plot<G: Linecast + ?Sized>(
        &self,
        start_position: Vec2,
        start_velocity: Vec2,
        config: &SimulationConfig,
        geometry: &G,
    ) -> Result<Trajectory, PredictionError> {
        let body = self.body.as_ref().ok_or(PredictionError::NotInitialized)?;
        config.validate()?;
        self.world.validate()?;
        body.validate()?;

        let tick_length = config.tick_length(self.world.min_physics_tick);
        let gravity_delta = self.world.gravity * body.gravity_scale * tick_length * tick_length;
        let drag_factor = (1.0 - tick_length * body.drag_coefficient).clamp(0.0, 1.0);
        let max_ticks = config.max_ticks(tick_length);

        let mut state = ProjectileState {
            position: start_position,
            velocity_step: start_velocity * tick_length,
            ..Default::default()
        };
        let mut points = Vec::with_capacity(max_ticks);
        let mut termination = Termination::Horizon;
        let mut segment_start = start_position;
        let mut had_collision = false;

        for tick in 0..max_ticks {
            if state.elapsed_time >= config.total_predicted_time {
                break;
            }

            state.velocity_step = (state.velocity_step + gravity_delta) * drag_factor;
            state.position += state.velocity_step;
            points.push(state.position);
            // Derived from the tick index so long runs do not accumulate rounding
            state.elapsed_time = (tick + 1) as f32 * tick_length;

            if had_collision {
                had_collision = false;
                segment_start = state.position;
                continue;
            }

            let hit = self.find_contact(segment_start, state.position, geometry);
            segment_start = state.position;
            let Some(hit) = hit else {
                continue;
            };

            state.collision_count += 1;

            if config.stop_on_first_collision {
                if let Some(last) = points.last_mut() {
                    *last = hit.point;
                }
                termination = Termination::FirstCollision;
                debug!("Trajectory stopped on first contact at {:?}", hit.point);
                break;
            }

            if state.collision_count > config.max_bounces {
                points.pop();
                termination = Termination::BounceLimit;
                debug!(
                    "Trajectory truncated after {} bounce(s) at {:?}",
                    config.max_bounces, hit.point
                );
                break;
            }

            state.velocity_step = reflect(state.velocity_step * body.restitution, hit.normal);
            state.position = hit.point + state.velocity_step * config.contact_offset;
            if let Some(last) = points.last_mut() {
                *last = state.position;
            }
            segment_start = state.position;
            had_collision = true;
        }

        Ok(Trajectory {
            points,
            collisions: state.collision_count,
            termination,
            tick_length,
        })
    }

    /// Linecasts `from -> to`; degenerate segments and inconsistent contacts count as no hit.
    fn find_contact<G: Linecast + ?Sized>(
        &self,
        from: Vec2,
        to: Vec2,
        geometry: &G,
    ) -> Option<LinecastHit> {
        if from.distance_squared(to) < MIN_SEGMENT_LENGTH_SQUARED {
            return None;
        }

        let hit = geometry.linecast(from, to, self.layer_mask)?;
        if !hit.is_consistent() {
            debug!("Ignoring inconsistent contact {:?}", hit);
            return None;
        }

        Some(LinecastHit {
            normal: hit.normal.normalize(),
            ..hit
        })
    }
}
