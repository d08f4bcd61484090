//! Messages emitted by the aim prediction system.

use bevy::ecs::message::Message;
use bevy::prelude::*;

use crate::simulation::Trajectory;

/// Aim readout written after every successful prediction update.
///
/// # Fields
/// * `predictor` - Entity carrying the `AimPredictor`
/// * `strength_percent` - Strength as a rounded percentage
/// * `angle_degrees` - Rounded signed aim angle
/// * `points` - Number of predicted points
/// * `bounces` - Contacts met along the path
#[derive(Message, Clone, Debug, PartialEq)]
pub struct AimUpdated {
    /// Predictor entity
    pub predictor: Entity,
    /// Strength (0-100)
    pub strength_percent: i32,
    /// Signed angle in degrees, (-180, 180]
    pub angle_degrees: i32,
    /// Predicted point count
    pub points: usize,
    /// Contact count
    pub bounces: u32,
}

impl AimUpdated {
    /// Builds the readout for one update.
    pub fn new(predictor: Entity, strength: f32, angle_degrees: f32, trajectory: &Trajectory) -> Self {
        Self {
            predictor,
            strength_percent: (strength.clamp(0.0, 1.0) * 100.0).round() as i32,
            angle_degrees: angle_degrees.round() as i32,
            points: trajectory.len(),
            bounces: trajectory.collisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readout_rounding() {
        let trajectory = Trajectory {
            points: vec![Vec2::ZERO; 4],
            collisions: 1,
            ..Default::default()
        };
        let predictor = World::new().spawn_empty().id();

        let readout = AimUpdated::new(predictor, 0.456, -44.6, &trajectory);
        assert_eq!(readout.strength_percent, 46);
        assert_eq!(readout.angle_degrees, -45);
        assert_eq!(readout.points, 4);
        assert_eq!(readout.bounces, 1);
    }
}
