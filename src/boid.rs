use bevy::prelude::*;

use crate::math::*;
use crate::ConfigurationError;

pub mod steering;

/// Tuning for a single boid, fixed at spawn.
///
/// Every boid carries its own copy; nothing reads tuning out of a shared
/// owner at tick time.
#[derive(Debug, Clone, Component)]
pub struct BoidConfig {
    /// Velocity magnitude cap.
    pub max_speed: TReal,
    /// The desired velocity is the one covering the remaining distance in
    /// this many seconds (before the cap kicks in).
    pub time_to_target: TReal,
    /// Distance under which the boid counts as arrived and stops.
    pub satisfaction_radius: TReal,
    /// Settle turn rate once arrived, fraction of the angular gap per second.
    pub rotation_speed: TReal,
}

impl Default for BoidConfig {
    fn default() -> Self {
        Self {
            max_speed: 5.,
            time_to_target: 1.,
            satisfaction_radius: 0.5,
            rotation_speed: 2.,
        }
    }
}

impl BoidConfig {
    /// All parameters must be strictly positive; a zero `time_to_target` or
    /// `satisfaction_radius` would poison every subsequent tick.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, value) in [
            ("max_speed", self.max_speed),
            ("time_to_target", self.time_to_target),
            ("satisfaction_radius", self.satisfaction_radius),
            ("rotation_speed", self.rotation_speed),
        ] {
            if !(value > 0.) {
                return Err(ConfigurationError::NonPositiveParameter { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Bundle)]
pub struct BoidBundle {
    pub config: BoidConfig,
    pub steering: steering::Steering,
    pub lin_out: steering::LinearRoutineOutput,
    pub ang_out: steering::AngularRoutineOutput,
    pub xform: Transform,
    pub name: Name,
}

impl BoidBundle {
    pub const DEFAULT_NAME: &'static str = "formation_boid";

    pub fn new(pos: TVec3, facing: TVec3, config: BoidConfig) -> Self {
        Self {
            config,
            steering: steering::Steering::new(pos, facing),
            lin_out: default(),
            ang_out: default(),
            xform: Transform::from_translation(pos),
            name: Name::new(Self::DEFAULT_NAME),
        }
    }
}

#[test]
fn config_validation_rejects_non_positive_params() {
    assert!(BoidConfig::default().validate().is_ok());
    for bad in [
        BoidConfig {
            max_speed: 0.,
            ..default()
        },
        BoidConfig {
            time_to_target: -1.,
            ..default()
        },
        BoidConfig {
            satisfaction_radius: 0.,
            ..default()
        },
        BoidConfig {
            rotation_speed: TReal::NAN,
            ..default()
        },
    ] {
        assert!(matches!(
            bad.validate(),
            Err(ConfigurationError::NonPositiveParameter { .. })
        ));
    }
}
