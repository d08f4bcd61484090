//! Collision adapter - linecasts against the avian2d spatial query pipeline.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::types::{Linecast, LinecastHit};

/// Segments shorter than this are not cast.
const MIN_CAST_LENGTH: f32 = 1e-4;

/// [`Linecast`] over avian2d's `SpatialQuery`.
///
/// Casts a solid ray from the segment start, limited to the segment length
/// and filtered by collision layer membership.
pub struct PhysicsLinecast<'a, 'w, 's> {
    spatial_query: &'a SpatialQuery<'w, 's>,
    excluded: Vec<Entity>,
}

impl<'a, 'w, 's> PhysicsLinecast<'a, 'w, 's> {
    /// Wraps a spatial query system parameter.
    pub fn new(spatial_query: &'a SpatialQuery<'w, 's>) -> Self {
        Self {
            spatial_query,
            excluded: Vec::new(),
        }
    }

    /// Builder pattern: ignore the given colliders (e.g. the launcher itself).
    pub fn with_excluded(mut self, entities: impl IntoIterator<Item = Entity>) -> Self {
        self.excluded.extend(entities);
        self
    }
}

impl Linecast for PhysicsLinecast<'_, '_, '_> {
    fn linecast(&self, from: Vec2, to: Vec2, layer_mask: u32) -> Option<LinecastHit> {
        let ray = to - from;
        let length = ray.length();
        if length < MIN_CAST_LENGTH {
            return None;
        }

        let direction = Dir2::new(ray).ok()?;
        let filter = SpatialQueryFilter::from_mask(LayerMask(layer_mask))
            .with_excluded_entities(self.excluded.iter().copied());

        let hit = self
            .spatial_query
            .cast_ray(from, direction, length, true, &filter)?;

        Some(LinecastHit {
            point: from + *direction * hit.distance,
            normal: hit.normal,
            fraction: hit.distance / length,
            entity: Some(hit.entity),
        })
    }
}
