use bevy::prelude::*;

use crate::components::AimPredictor;
use crate::resources::PredictionSettings;
use crate::types::DisplayMode;

/// Radius of the debug marker drawn on each predicted dot.
const DOT_RADIUS: f32 = 0.08;

/// Draw debug gizmos for shown trajectories.
///
/// Dots become circles, segments become lines; the launch point gets a cross.
pub fn draw_trajectory_debug(
    mut gizmos: Gizmos,
    query: Query<(&GlobalTransform, &AimPredictor)>,
    settings: Res<PredictionSettings>,
) {
    if !settings.debug_draw {
        return;
    }

    let color = settings.debug_color;
    for (transform, predictor) in query.iter() {
        if !predictor.is_shown() {
            continue;
        }

        let origin = transform.translation().truncate();
        gizmos.cross_2d(Isometry2d::from_translation(origin), DOT_RADIUS * 2.0, color);

        let presenter = predictor.presenter();
        for slot in presenter.visible_slots() {
            match presenter.mode() {
                DisplayMode::Dots => {
                    gizmos.circle_2d(Isometry2d::from_translation(slot.start), DOT_RADIUS, color);
                }
                DisplayMode::Line => gizmos.line_2d(slot.start, slot.end, color),
            }
        }
    }
}
