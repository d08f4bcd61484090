//! # Bevy Aim Prediction
//!
//! Trajectory preview plugin for Bevy 0.18.
//!
//! ## Features
//! - Tick-based prediction with gravity, linear drag and restitution bounces
//! - Bounce limit or stop-on-first-contact termination
//! - Pooled dot or line segment display, no per-frame spawning
//! - avian2d spatial queries via the `dim2` feature, or a headless
//!   [`SegmentWorld`](geometry::SegmentWorld) without a physics backend
//! - Aim readout messages (strength and angle) for HUDs
//!
//! ## Quick Start
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_aim_prediction::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(AimPredictionPluginGroup)
//!         .run();
//! }
//! ```

pub mod components;
pub mod error;
pub mod events;
pub mod geometry;
pub mod presenter;
pub mod resources;
pub mod simulation;
pub mod systems;
pub mod types;

pub mod prelude {
    pub use crate::components::*;
    pub use crate::error::PredictionError;
    pub use crate::events::*;
    pub use crate::geometry::{Obstacle, SegmentWorld};
    pub use crate::presenter::{TrajectoryPresenter, VisualSlot};
    pub use crate::resources::*;
    pub use crate::simulation::{
        BodyParameters, SimulationConfig, Termination, Trajectory, TrajectorySimulator,
        WorldConstants,
    };
    pub use crate::systems::display::spawn_visual_pool;
    pub use crate::types::*;
    pub use crate::{AimPredictionDebugPlugin, AimPredictionPlugin, AimPredictionPluginGroup};
}

use bevy::prelude::*;

/// Plugin group with prediction and its gizmo overlay.
///
/// The overlay only draws while `PredictionSettings::debug_draw` is set.
#[derive(Default)]
pub struct AimPredictionPluginGroup;

impl PluginGroup for AimPredictionPluginGroup {
    fn build(self) -> bevy::app::PluginGroupBuilder {
        bevy::app::PluginGroupBuilder::start::<Self>()
            .add(AimPredictionPlugin)
            .add(AimPredictionDebugPlugin)
    }
}

/// Core aim prediction plugin.
///
/// # Systems
/// - `update_predictions_headless` - Predicts against a `SegmentWorld`, when that resource exists
/// - `sync_environment_from_physics` - Mirrors avian's gravity and substeps (`dim2`)
/// - `update_predictions_physics` - Predicts against avian's spatial query (`dim2`, no `SegmentWorld`)
/// - `sync_trajectory_visuals` - Copies presenter state onto pooled visuals
pub struct AimPredictionPlugin;

impl Plugin for AimPredictionPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<components::AimInput>()
            .register_type::<components::TrajectoryDot>()
            .register_type::<components::TrajectorySegment>()
            .register_type::<resources::PredictionSettings>()
            .register_type::<resources::PredictionEnvironment>()
            .register_type::<simulation::SimulationConfig>()
            .register_type::<simulation::BodyParameters>()
            .register_type::<simulation::WorldConstants>()
            .init_resource::<resources::PredictionSettings>()
            .init_resource::<resources::PredictionEnvironment>()
            .add_message::<events::AimUpdated>()
            .add_systems(
                Update,
                (
                    systems::prediction::update_predictions_headless
                        .run_if(resource_exists::<geometry::SegmentWorld>),
                    systems::display::sync_trajectory_visuals,
                )
                    .chain(),
            );

        #[cfg(feature = "dim2")]
        {
            use avian2d::prelude::{Gravity, SpatialQueryPipeline, SubstepCount};
            app.add_systems(
                Update,
                (
                    systems::prediction::sync_environment_from_physics
                        .run_if(resource_exists::<Gravity>)
                        .run_if(resource_exists::<SubstepCount>),
                    systems::prediction::update_predictions_physics
                        .run_if(resource_exists::<SpatialQueryPipeline>)
                        .run_if(not(resource_exists::<geometry::SegmentWorld>)),
                )
                    .chain()
                    .before(systems::prediction::update_predictions_headless)
                    .before(systems::display::sync_trajectory_visuals),
            );
        }
    }
}

/// Gizmo overlay for predicted trajectories.
pub struct AimPredictionDebugPlugin;

impl Plugin for AimPredictionDebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, systems::debug::draw_trajectory_debug);
    }
}
