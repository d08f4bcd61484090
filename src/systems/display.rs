//! Display system - pooled trajectory visuals.
//!
//! Visuals are spawned once, hidden, and only moved or toggled afterwards.
//! They are top-level entities so the predictor's rotation never moves them.

use bevy::prelude::*;

use crate::components::{AimPredictor, TrajectoryDot, TrajectorySegment};
use crate::presenter::VisualSlot;
use crate::types::DisplayMode;

/// Visual entities owned by predictors.
pub type VisualQuery<'w, 's> = Query<
    'w,
    's,
    (&'static mut Transform, &'static mut Visibility),
    (
        Or<(With<TrajectoryDot>, With<TrajectorySegment>)>,
        Without<AimPredictor>,
    ),
>;

/// Spawns a hidden pool large enough to draw `step_count` points.
///
/// Dots get one sprite per point. Segments get one sprite per consecutive
/// pair; give them a `custom_size` of `(1.0, thickness)` so sync can stretch
/// them along X.
///
/// # Returns
/// The pooled entities, in trajectory order
pub fn spawn_visual_pool(
    commands: &mut Commands,
    mode: DisplayMode,
    step_count: usize,
    sprite: Sprite,
) -> Vec<Entity> {
    (0..mode.pool_size(step_count))
        .map(|index| {
            let mut visual = commands.spawn((sprite.clone(), Transform::default(), Visibility::Hidden));
            match mode {
                DisplayMode::Dots => visual.insert(TrajectoryDot { index }),
                DisplayMode::Line => visual.insert(TrajectorySegment { index }),
            };
            visual.id()
        })
        .collect()
}

/// Copies changed presenter state onto the pooled visuals.
pub fn sync_trajectory_visuals(
    predictors: Query<&AimPredictor, Changed<AimPredictor>>,
    mut visuals: VisualQuery,
) {
    for predictor in predictors.iter() {
        let presenter = predictor.presenter();
        let shown = presenter.is_shown();

        for slot in presenter.slots() {
            let Ok((mut transform, mut visibility)) = visuals.get_mut(slot.entity) else {
                continue;
            };

            let visible = shown && slot.visible;
            visibility.set_if_neq(if visible {
                Visibility::Visible
            } else {
                Visibility::Hidden
            });

            if visible {
                let z = transform.translation.z;
                transform.set_if_neq(slot_transform(presenter.mode(), slot, z));
            }
        }
    }
}

/// Placement of one slot's visual at depth `z`.
///
/// Dots sit on their point. Segments sit at the midpoint, rotated along the
/// segment and scaled on X to its length.
pub fn slot_transform(mode: DisplayMode, slot: &VisualSlot, z: f32) -> Transform {
    match mode {
        DisplayMode::Dots => Transform::from_translation(slot.start.extend(z)),
        DisplayMode::Line => {
            let span = slot.end - slot.start;
            let midpoint = (slot.start + slot.end) * 0.5;
            Transform::from_translation(midpoint.extend(z))
                .with_rotation(Quat::from_rotation_z(span.to_angle()))
                .with_scale(Vec3::new(span.length(), 1.0, 1.0))
        }
    }
}
