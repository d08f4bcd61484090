//! Common types, the geometry query seam and vector helpers.

use bevy::prelude::*;

/// How a predicted trajectory is drawn.
///
/// # Variants
/// * `Dots` - One marker per predicted point
/// * `Line` - Connected segments between consecutive points
///
/// # Example
/// ```
/// use bevy_aim_prediction::types::DisplayMode;
///
/// let mode = DisplayMode::Dots;
/// assert_eq!(mode.pool_size(20), 20);
/// assert_eq!(DisplayMode::Line.pool_size(20), 19);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Reflect)]
pub enum DisplayMode {
    /// Pooled point markers
    #[default]
    Dots,
    /// Pooled line segments
    Line,
}

impl DisplayMode {
    /// Number of pooled visuals needed to draw `step_count` points.
    pub fn pool_size(self, step_count: usize) -> usize {
        match self {
            DisplayMode::Dots => step_count,
            DisplayMode::Line => step_count.saturating_sub(1),
        }
    }
}

/// Contact returned by a linecast.
///
/// # Fields
/// * `point` - World-space contact point on the obstacle surface
/// * `normal` - Unit surface normal at the contact, facing the segment start
/// * `fraction` - Position of the contact along the queried segment, in [0, 1]
/// * `entity` - Obstacle entity, when the geometry service knows it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinecastHit {
    /// World-space contact point
    pub point: Vec2,
    /// Surface normal
    pub normal: Vec2,
    /// Fraction of the segment travelled before the contact
    pub fraction: f32,
    /// Hit entity
    pub entity: Option<Entity>,
}

impl LinecastHit {
    /// A contact is usable only if its point is finite and its normal has a direction.
    pub fn is_consistent(&self) -> bool {
        self.point.is_finite()
            && self.normal.is_finite()
            && self.normal.length_squared() > 1e-12
    }
}

/// Geometry query abstraction used by the trajectory simulator.
///
/// Implemented by the avian2d spatial query adapter (`dim2` feature) and by
/// the headless [`SegmentWorld`](crate::geometry::SegmentWorld).
pub trait Linecast {
    /// Find the first obstacle crossed by the segment `from -> to`.
    ///
    /// # Arguments
    /// * `from` - Segment start in world space
    /// * `to` - Segment end in world space
    /// * `layer_mask` - Collision layers the query is restricted to
    ///
    /// # Returns
    /// The closest contact along the segment, or None
    fn linecast(&self, from: Vec2, to: Vec2, layer_mask: u32) -> Option<LinecastHit>;
}

impl<T: Linecast + ?Sized> Linecast for &T {
    fn linecast(&self, from: Vec2, to: Vec2, layer_mask: u32) -> Option<LinecastHit> {
        (**self).linecast(from, to, layer_mask)
    }
}

/// Mirror `v` across the surface with unit normal `n`: `v - 2(v.n)n`.
pub fn reflect(v: Vec2, n: Vec2) -> Vec2 {
    v - 2.0 * v.dot(n) * n
}

/// Signed angle in degrees of the direction `from -> to`, measured from +X.
///
/// The unsigned angle to the +X axis is negated when `to` lies below `from`,
/// giving a result in (-180, 180]. A zero-length direction yields 0.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_aim_prediction::types::signed_angle;
///
/// assert_eq!(signed_angle(Vec2::ZERO, Vec2::X), 0.0);
/// assert!((signed_angle(Vec2::ZERO, Vec2::NEG_Y) + 90.0).abs() < 1e-4);
/// ```
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    let difference = to - from;
    if difference.length_squared() < 1e-12 {
        return 0.0;
    }

    let unsigned = difference.y.atan2(difference.x).abs().to_degrees();
    if to.y < from.y {
        -unsigned
    } else {
        unsigned
    }
}
