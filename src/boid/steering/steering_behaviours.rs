//! Pure steering math. All inputs are in world space; Y is up and motion is
//! confined to the XZ plane.

use bevy::prelude::*;

use crate::math::*;

/// Velocity covering the planar offset to `target_pos` in exactly
/// `time_to_target` seconds, capped at `max_speed` with direction preserved.
#[inline]
pub fn seek_position(
    current_pos: TVec3,
    target_pos: TVec3,
    time_to_target: TReal,
    max_speed: TReal,
) -> TVec3 {
    let to_target = flatten(target_pos - current_pos);
    let vel = to_target / time_to_target;
    if vel.length() > max_speed {
        vel.normalize() * max_speed
    } else {
        vel
    }
}

/// Unit vector lateral to the planar approach direction, used to skirt
/// around an obstacle sitting on the path. An approach along +X dodges
/// toward -Z.
#[inline]
pub fn sidestep(approach: TVec3) -> TVec3 {
    TVec3::Y.cross(flatten(approach).normalize_or_zero())
}

#[test]
fn seek_position_covers_offset_in_time_to_target() {
    let vel = seek_position(TVec3::ZERO, TVec3::new(2., 0., -1.), 2., 5.);
    assert!((vel - TVec3::new(1., 0., -0.5)).length() < 1e-6);
}

#[test]
fn seek_position_caps_speed_preserving_direction() {
    // reference scenario: slot offset (-3, 0, -1.5), target (10, 0, 10),
    // boid at the origin
    let dest = TVec3::new(7., 0., 8.5);
    let vel = seek_position(TVec3::ZERO, dest, 1., 5.);
    assert!((vel.length() - 5.).abs() < 1e-4);
    assert!(vel.normalize().dot(dest.normalize()) > 1. - 1e-5);
}

#[test]
fn seek_position_ignores_vertical_offset() {
    let vel = seek_position(TVec3::ZERO, TVec3::new(0., 40., 1.), 1., 5.);
    assert!(vel.y.abs() < 1e-6);
    assert!((vel - TVec3::Z).length() < 1e-6);
}

#[test]
fn sidestep_is_lateral_and_unit_length() {
    let dodge = sidestep(TVec3::X);
    assert!((dodge - TVec3::new(0., 0., -1.)).length() < 1e-6);
    for approach in [TVec3::X, -TVec3::Z, TVec3::new(3., 0., 4.)] {
        let dodge = sidestep(approach);
        assert!((dodge.length() - 1.).abs() < 1e-5);
        assert!(dodge.dot(approach).abs() < 1e-5);
    }
}

#[test]
fn sidestep_contributions_stack_linearly() {
    // three qualifying obstacles, max speed 5
    let mut vel = seek_position(TVec3::ZERO, TVec3::new(40., 0., 0.), 1., 5.);
    for _ in 0..3 {
        vel += sidestep(TVec3::X) * (5. * 0.5);
    }
    assert!((vel - TVec3::new(5., 0., -7.5)).length() < 1e-4);
}
