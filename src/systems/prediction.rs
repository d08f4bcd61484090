//! Prediction systems - drive every predictor from its aim input each frame.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::components::{AimInput, AimPredictor};
use crate::events::AimUpdated;
use crate::geometry::SegmentWorld;
use crate::resources::{PredictionEnvironment, PredictionSettings};
use crate::types::Linecast;

/// Predictors with their input and placement.
pub type PredictorQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut AimPredictor,
        &'static AimInput,
        &'static mut Transform,
        &'static GlobalTransform,
    ),
>;

/// Updates predictors against the headless [`SegmentWorld`].
pub fn update_predictions_headless(
    geometry: Res<SegmentWorld>,
    settings: Res<PredictionSettings>,
    environment: Res<PredictionEnvironment>,
    mut predictors: PredictorQuery,
    mut updates: MessageWriter<AimUpdated>,
) {
    drive_predictors(
        &*geometry,
        &settings,
        &environment,
        &mut predictors,
        &mut updates,
    );
}

/// Updates predictors against the avian2d physics world.
#[cfg(feature = "dim2")]
pub fn update_predictions_physics(
    spatial_query: avian2d::prelude::SpatialQuery,
    settings: Res<PredictionSettings>,
    environment: Res<PredictionEnvironment>,
    mut predictors: PredictorQuery,
    mut updates: MessageWriter<AimUpdated>,
) {
    let geometry = super::collision::PhysicsLinecast::new(&spatial_query);
    drive_predictors(
        &geometry,
        &settings,
        &environment,
        &mut predictors,
        &mut updates,
    );
}

/// Mirrors avian's gravity and substep count into [`PredictionEnvironment`].
#[cfg(feature = "dim2")]
pub fn sync_environment_from_physics(
    gravity: Res<avian2d::prelude::Gravity>,
    substeps: Res<avian2d::prelude::SubstepCount>,
    time: Res<Time<Fixed>>,
    mut environment: ResMut<PredictionEnvironment>,
) {
    environment.set_if_neq(PredictionEnvironment {
        gravity: gravity.0,
        fixed_timestep: time.timestep().as_secs_f32(),
        solver_iterations: substeps.0,
    });
}

/// Applies the strength threshold, then shows and updates or hides each predictor.
///
/// Failed updates are logged and skipped; the predictor keeps its last
/// rendered state until the next successful frame.
pub fn drive_predictors<G: Linecast + ?Sized>(
    geometry: &G,
    settings: &PredictionSettings,
    environment: &PredictionEnvironment,
    predictors: &mut PredictorQuery,
    updates: &mut MessageWriter<AimUpdated>,
) {
    let world = environment.world_constants();

    for (entity, mut predictor, input, mut transform, global_transform) in predictors.iter_mut() {
        if !input.active || !settings.is_shot(input.strength) {
            // Avoid flagging the predictor as changed every idle frame
            if predictor.is_shown() {
                predictor.hide();
            }
            continue;
        }

        predictor.show();
        predictor.set_world(world);
        predictor.set_layer_mask(settings.environment_mask);

        let origin = global_transform.translation().truncate();
        match predictor.update_display(origin, input.direction, input.strength, geometry) {
            Ok(trajectory) => {
                let angle = predictor.orientation_degrees();
                transform.rotation = Quat::from_rotation_z(angle.to_radians());
                updates.write(AimUpdated::new(entity, input.strength, angle, &trajectory));
            }
            Err(err) => {
                warn!("Skipping aim prediction for {:?}: {}", entity, err);
            }
        }
    }
}
