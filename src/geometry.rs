//! Headless geometry: layered segment obstacles with a closest-hit linecast.
//!
//! Lets the prediction run without a physics backend (tests, benchmarks,
//! server-side previews). Insert a [`SegmentWorld`] resource and the plugin
//! predicts against it.

use bevy::prelude::*;

use crate::types::{Linecast, LinecastHit};

/// Collision layer assigned to obstacles by default.
pub const DEFAULT_LAYER: u32 = 0b0001;

/// A straight obstacle edge.
///
/// # Fields
/// * `a` - First endpoint
/// * `b` - Second endpoint
/// * `layers` - Collision layers the obstacle belongs to
/// * `entity` - Optional entity reported in hits
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    /// First endpoint
    pub a: Vec2,
    /// Second endpoint
    pub b: Vec2,
    /// Layer membership bits
    pub layers: u32,
    /// Owning entity
    pub entity: Option<Entity>,
}

impl Obstacle {
    /// Creates an obstacle on the default layer.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            a,
            b,
            layers: DEFAULT_LAYER,
            entity: None,
        }
    }

    /// Builder pattern: set layer membership.
    pub fn with_layers(mut self, layers: u32) -> Self {
        self.layers = layers;
        self
    }

    /// Builder pattern: set the entity reported in hits.
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Intersects the segment `from -> to` with this edge.
    ///
    /// # Returns
    /// The hit with its normal turned towards `from`, or None
    pub fn intersect(&self, from: Vec2, to: Vec2) -> Option<LinecastHit> {
        let (point, fraction) = intersect_segments(from, to, self.a, self.b)?;

        // Face the side the segment comes from; a start on the surface uses the travel direction
        let mut normal = (self.b - self.a).perp().normalize_or_zero();
        let side = normal.dot(from - point);
        if side < 0.0 || (side == 0.0 && normal.dot(to - from) > 0.0) {
            normal = -normal;
        }

        Some(LinecastHit {
            point,
            normal,
            fraction,
            entity: self.entity,
        })
    }
}

/// Static environment made of segment obstacles.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_aim_prediction::geometry::{Obstacle, SegmentWorld};
/// use bevy_aim_prediction::types::Linecast;
///
/// let world = SegmentWorld::default()
///     .with_obstacle(Obstacle::new(Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0)));
/// let hit = world.linecast(Vec2::ZERO, Vec2::new(4.0, 0.0), u32::MAX).unwrap();
/// assert_eq!(hit.point, Vec2::new(2.0, 0.0));
/// assert_eq!(hit.normal, Vec2::NEG_X);
/// ```
#[derive(Resource, Clone, Debug, Default)]
pub struct SegmentWorld {
    /// Obstacles in the world
    pub obstacles: Vec<Obstacle>,
}

impl SegmentWorld {
    /// Builder pattern: add one obstacle.
    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Builder pattern: add the four walls of an axis-aligned box.
    pub fn with_box(mut self, min: Vec2, max: Vec2) -> Self {
        let corners = [
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ];
        for i in 0..corners.len() {
            self.obstacles
                .push(Obstacle::new(corners[i], corners[(i + 1) % corners.len()]));
        }
        self
    }

    /// Adds an obstacle.
    pub fn push(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }
}

impl Linecast for SegmentWorld {
    fn linecast(&self, from: Vec2, to: Vec2, layer_mask: u32) -> Option<LinecastHit> {
        self.obstacles
            .iter()
            .filter(|obstacle| obstacle.layers & layer_mask != 0)
            .filter_map(|obstacle| obstacle.intersect(from, to))
            .min_by(|a, b| a.fraction.total_cmp(&b.fraction))
    }
}

/// Intersection of segments `a1 -> a2` and `b1 -> b2`.
///
/// Returns the point and its fraction along `a1 -> a2`. Parallel segments
/// never intersect.
fn intersect_segments(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<(Vec2, f32)> {
    let d1 = a2 - a1;
    let d2 = b2 - b1;
    let delta_start = b1 - a1;

    let denominator = d1.perp_dot(d2);
    if denominator.abs() < 1e-9 {
        return None;
    }

    let t = delta_start.perp_dot(d2) / denominator;
    let u = delta_start.perp_dot(d1) / denominator;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((a1 + d1 * t, t))
    } else {
        None
    }
}
