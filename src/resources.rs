//! Global resources for the aim prediction system.

use bevy::prelude::*;

use crate::geometry::DEFAULT_LAYER;
use crate::simulation::WorldConstants;

/// Global prediction settings shared by every predictor.
///
/// # Fields
/// * `min_strength` - Strength below which input counts as "no shot"
/// * `environment_mask` - Layers the prediction collides with
/// * `debug_draw` - Draw visible trajectories with gizmos
/// * `debug_color` - Gizmo color
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_aim_prediction::resources::PredictionSettings;
///
/// let settings = PredictionSettings {
///     min_strength: 0.1,
///     debug_draw: true,
///     ..default()
/// };
/// assert!(settings.is_shot(0.15));
/// ```
#[derive(Resource, Reflect, Clone, Debug)]
#[reflect(Resource)]
pub struct PredictionSettings {
    /// Minimum strength fraction that shows a prediction
    pub min_strength: f32,
    /// Environment collision layers (exclude the projectile's own layer)
    pub environment_mask: u32,
    /// Enable gizmo overlay
    pub debug_draw: bool,
    /// Gizmo color
    pub debug_color: Color,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            min_strength: 0.2,
            environment_mask: DEFAULT_LAYER,
            debug_draw: false,
            debug_color: Color::srgb(1.0, 0.85, 0.2),
        }
    }
}

impl PredictionSettings {
    /// Whether `strength` is strong enough to count as a shot.
    pub fn is_shot(&self, strength: f32) -> bool {
        strength >= self.min_strength
    }
}

/// Physics world constants used by every prediction.
///
/// With the `dim2` feature it mirrors avian's gravity, substep count and
/// Bevy's fixed timestep each frame.
#[derive(Resource, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Resource)]
pub struct PredictionEnvironment {
    /// Gravity vector (units/s²)
    pub gravity: Vec2,
    /// Physics fixed timestep (seconds)
    pub fixed_timestep: f32,
    /// Solver iterations per fixed step
    pub solver_iterations: u32,
}

impl Default for PredictionEnvironment {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            fixed_timestep: 1.0 / 64.0,
            solver_iterations: 8,
        }
    }
}

impl PredictionEnvironment {
    /// Smallest stable prediction tick.
    pub fn min_physics_tick(&self) -> f32 {
        self.world_constants().min_physics_tick
    }

    /// Constants handed to the simulator.
    pub fn world_constants(&self) -> WorldConstants {
        WorldConstants::from_physics_step(self.gravity, self.fixed_timestep, self.solver_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = PredictionSettings::default();
        assert_eq!(settings.min_strength, 0.2);
        assert!(!settings.is_shot(0.19));
        assert!(settings.is_shot(0.2));

        let environment = PredictionEnvironment::default();
        assert_eq!(environment.world_constants(), WorldConstants::default());
    }

    #[test]
    fn test_min_tick_from_step() {
        let environment = PredictionEnvironment {
            fixed_timestep: 0.02,
            solver_iterations: 4,
            ..default()
        };
        assert!((environment.min_physics_tick() - 0.005).abs() < 1e-7);
    }
}
