use bevy::prelude::*;

use crate::boid::BoidConfig;
use crate::math::*;
use crate::sensors::ObstacleIndex;

pub mod steering_behaviours;

/// Radius of the obstacle lookup around each boid.
pub const OBSTACLE_QUERY_RADIUS: TReal = 1.0;

/// Turn rate while underway. Independent of the per-boid settle rate.
const TRAVEL_TURN_RATE: TReal = 5.0;

/// Below this speed (squared) heading updates are suppressed.
const TURN_SPEED_THRESHOLD_SQUARED: TReal = 0.01;

/// Per-boid navigation state.
///
/// `facing` is the slot's settle orientation, copied once at spawn and never
/// mutated. Positions live on the [`Transform`]; this component only owns
/// goal and arrival state.
#[derive(Debug, Clone, Component)]
pub struct Steering {
    destination: TVec3,
    facing: TVec3,
    arrived: bool,
    avoiding: bool,
}

impl Steering {
    pub fn new(destination: TVec3, facing: TVec3) -> Self {
        Self {
            destination,
            facing,
            arrived: false,
            avoiding: false,
        }
    }

    /// Supersedes the previous goal. Always clears `arrived`, even when
    /// `point` equals the current destination; an arrived boid re-seeks for
    /// one tick and immediately re-latches.
    #[inline]
    pub fn set_destination(&mut self, point: TVec3) {
        self.destination = point;
        self.arrived = false;
    }

    #[inline]
    pub fn destination(&self) -> TVec3 {
        self.destination
    }

    #[inline]
    pub fn facing(&self) -> TVec3 {
        self.facing
    }

    #[inline]
    pub fn arrived(&self) -> bool {
        self.arrived
    }

    /// Whether the last seeking tick blended in obstacle avoidance.
    #[inline]
    pub fn avoiding(&self) -> bool {
        self.avoiding
    }
}

/// Velocity desired next frame, world space.
#[derive(Debug, Clone, Copy, Default, Component)]
pub struct LinearRoutineOutput(pub TVec3);

/// Rotation to adopt this frame, world space.
#[derive(Debug, Clone, Copy, Component)]
pub struct AngularRoutineOutput(pub TQuat);

impl Default for AngularRoutineOutput {
    fn default() -> Self {
        Self(TQuat::IDENTITY)
    }
}

/// The per-tick steering pass.
///
/// Arrived boids hold still and settle toward their slot facing. Seeking
/// boids get a speed-capped velocity toward their destination, one lateral
/// dodge contribution per nearby obstacle (stacking linearly, no falloff),
/// and a smoothed heading — except while dodging, where the heading is left
/// alone so avoidance and heading don't fight over the boid.
///
/// Caller contract: transforms hold finite positions and the clock delta is
/// non-negative; out-of-domain values propagate into the outputs unchanged.
pub fn update(
    mut boids: Query<(
        &BoidConfig,
        &Transform,
        &mut Steering,
        &mut LinearRoutineOutput,
        &mut AngularRoutineOutput,
    )>,
    obstacles: Res<ObstacleIndex>,
    time: Res<Time>,
) {
    let dt = time.delta_seconds();
    for (config, xform, mut steering, mut lin_out, mut ang_out) in boids.iter_mut() {
        if steering.arrived {
            lin_out.0 = TVec3::ZERO;
            ang_out.0 = rotate_toward(
                xform.rotation,
                planar_heading(steering.facing),
                config.rotation_speed * dt,
            );
            continue;
        }

        // motion and distance checks are confined to the ground plane
        let to_dest = flatten(steering.destination - xform.translation);
        if to_dest.length() < config.satisfaction_radius {
            // the arrival tick itself already reports zero velocity
            steering.arrived = true;
            lin_out.0 = TVec3::ZERO;
            ang_out.0 = xform.rotation;
            tracing::debug!(destination = ?steering.destination, "boid arrived");
            continue;
        }

        let mut vel = steering_behaviours::seek_position(
            xform.translation,
            steering.destination,
            config.time_to_target,
            config.max_speed,
        );
        let mut avoiding = false;
        for obstacle_pos in obstacles.within(xform.translation, OBSTACLE_QUERY_RADIUS) {
            vel += steering_behaviours::sidestep(to_dest) * (config.max_speed * 0.5);
            avoiding = true;
            tracing::trace!(?obstacle_pos, "dodging obstacle");
        }
        steering.avoiding = avoiding;

        lin_out.0 = vel;
        ang_out.0 = if !avoiding && vel.length_squared() > TURN_SPEED_THRESHOLD_SQUARED {
            rotate_toward(
                xform.rotation,
                planar_heading(flatten(vel)),
                TRAVEL_TURN_RATE * dt,
            )
        } else {
            xform.rotation
        };
    }
}
