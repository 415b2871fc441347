//! Formation movement for small agent groups.
//!
//! A formation entity owns a set of slots (fixed offset + settle facing) and
//! the boids filling them. Commanding a new target point pushes an individual
//! destination to every member; each boid then steers toward its destination
//! with speed-limited motion, skirts nearby obstacles, and settles into its
//! slot facing once it has arrived.
//!
//! The crate only computes desired motion. A minimal kinematic integrator
//! ([`engine::apply_motion`]) stands in for whatever physics step the host
//! application runs.

use bevy::prelude::*;

use crate::math::*;

pub mod boid;
pub mod engine;
pub mod flock;
pub mod math;
pub mod sensors;

pub use boid::{steering::Steering, BoidBundle, BoidConfig};
pub use flock::formation::{
    spawn_formation, FormationAnchor, FormationLayout, FormationMembers, FormationSlot,
    SetFormationTarget,
};
pub use sensors::{Obstacle, ObstacleIndex, PlaceObstacleEvent};

/// Malformed setup detected before the simulation starts ticking.
///
/// Steady-state ticking has no error paths; everything that can go wrong is
/// rejected here, at initialization.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("formation requires at least one slot")]
    NoSlots,
    #[error("slot offset and facing counts disagree: {offsets} offsets, {facings} facings")]
    SlotCountMismatch { offsets: usize, facings: usize },
    #[error("{name} must be positive, got {value}")]
    NonPositiveParameter { name: &'static str, value: TReal },
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, SystemSet)]
pub enum FormationMindSystems {
    SteeringSystems,
    EngineApply,
}

pub struct FormationMindPlugin;

impl Plugin for FormationMindPlugin {
    fn build(&self, app: &mut App) {
        use FormationMindSystems::*;
        app.add_event::<flock::formation::SetFormationTarget>()
            .add_event::<sensors::PlaceObstacleEvent>()
            .init_resource::<sensors::ObstacleIndex>()
            .init_resource::<Time>()
            .configure_sets(Update, (SteeringSystems, EngineApply).chain())
            .add_systems(
                PreUpdate,
                (
                    sensors::place_obstacle,
                    sensors::obstacle_index_butler,
                    flock::formation::dispatch_target,
                ),
            )
            .add_systems(Update, boid::steering::update.in_set(SteeringSystems))
            .add_systems(Update, engine::apply_motion.in_set(EngineApply));
    }
}
