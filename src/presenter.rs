//! Trajectory presenter - maps predicted points onto a fixed pool of visuals.
//!
//! The presenter only tracks what each pooled visual should show. The
//! display system copies that state onto the pooled entities' `Transform`
//! and `Visibility`, so rendering a trajectory never spawns or despawns.

use bevy::prelude::*;

use crate::error::PredictionError;
use crate::simulation::Trajectory;
use crate::types::DisplayMode;

/// State of one pooled visual.
///
/// Dots use `start` only; segments span `start -> end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualSlot {
    /// Pooled entity drawing this slot
    pub entity: Entity,
    /// Marker position or segment start
    pub start: Vec2,
    /// Segment end (equal to `start` for dots)
    pub end: Vec2,
    /// Whether the slot covers part of the current trajectory
    pub visible: bool,
}

impl VisualSlot {
    fn hidden(entity: Entity) -> Self {
        Self {
            entity,
            start: Vec2::ZERO,
            end: Vec2::ZERO,
            visible: false,
        }
    }
}

/// Fixed-capacity pool of trajectory visuals.
///
/// # Example
/// ```
/// use bevy::prelude::*;
/// use bevy_aim_prediction::presenter::TrajectoryPresenter;
/// use bevy_aim_prediction::simulation::Trajectory;
/// use bevy_aim_prediction::types::DisplayMode;
///
/// let mut world = World::new();
/// let pool: Vec<Entity> = (0..4).map(|_| world.spawn_empty().id()).collect();
/// let mut presenter = TrajectoryPresenter::new(DisplayMode::Dots, pool).unwrap();
///
/// let trajectory = Trajectory {
///     points: vec![Vec2::ZERO, Vec2::X],
///     ..Default::default()
/// };
/// assert_eq!(presenter.render(&trajectory), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryPresenter {
    mode: DisplayMode,
    slots: Vec<VisualSlot>,
    shown: bool,
}

impl TrajectoryPresenter {
    /// Creates a hidden presenter over the given pool of entities.
    ///
    /// # Errors
    /// `DegenerateConfig` if the pool is empty.
    pub fn new(mode: DisplayMode, pool: Vec<Entity>) -> Result<Self, PredictionError> {
        if pool.is_empty() {
            return Err(PredictionError::degenerate(format!(
                "{mode:?} presenter needs at least one pooled visual"
            )));
        }

        Ok(Self {
            mode,
            slots: pool.into_iter().map(VisualSlot::hidden).collect(),
            shown: false,
        })
    }

    /// Display mode chosen at construction.
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Pool capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Checks the pool can draw a full trajectory of `step_count` points.
    pub fn check_capacity(&self, step_count: usize) -> Result<(), PredictionError> {
        let expected = self.mode.pool_size(step_count);
        if self.slots.len() < expected {
            return Err(PredictionError::PoolSizeMismatch {
                mode: self.mode,
                expected,
                actual: self.slots.len(),
            });
        }
        Ok(())
    }

    /// Pooled slot states, in trajectory order.
    pub fn slots(&self) -> &[VisualSlot] {
        &self.slots
    }

    /// Slots currently covering the trajectory.
    pub fn visible_slots(&self) -> impl Iterator<Item = &VisualSlot> {
        self.slots.iter().filter(|slot| slot.visible)
    }

    /// Number of slots covering the trajectory.
    pub fn visible_count(&self) -> usize {
        self.visible_slots().count()
    }

    /// Whether the whole display is shown.
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Shows the display. Returns false if it was already shown.
    pub fn show(&mut self) -> bool {
        let changed = !self.shown;
        self.shown = true;
        changed
    }

    /// Hides the display. Returns false if it was already hidden.
    pub fn hide(&mut self) -> bool {
        let changed = self.shown;
        self.shown = false;
        changed
    }

    /// Lays `trajectory` onto the pool.
    ///
    /// Slots beyond the trajectory are hidden, so a shorter trajectory never
    /// leaves visuals from a longer one behind. Points beyond the pool are
    /// not drawn.
    ///
    /// # Returns
    /// Number of visible slots
    pub fn render(&mut self, trajectory: &Trajectory) -> usize {
        let points = trajectory.points();

        for (i, slot) in self.slots.iter_mut().enumerate() {
            let span = match self.mode {
                DisplayMode::Dots => points.get(i).map(|&point| (point, point)),
                DisplayMode::Line => points.get(i).zip(points.get(i + 1)).map(|(&a, &b)| (a, b)),
            };

            match span {
                Some((start, end)) => {
                    slot.start = start;
                    slot.end = end;
                    slot.visible = true;
                }
                None => slot.visible = false,
            }
        }

        self.visible_count()
    }

    /// Hides every slot without touching the shown state.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.visible = false;
        }
    }
}
