use bevy::prelude::*;

pub mod real {
    pub use std::f32::*;
}

pub type TReal = f32;
pub type TVec3 = Vec3;
pub type TQuat = Quat;

/// Projects `v` onto the ground plane.
#[inline]
pub fn flatten(v: TVec3) -> TVec3 {
    TVec3::new(v.x, 0., v.z)
}

/// Yaw rotation pointing the forward axis (-Z in here) along the planar `dir`.
#[inline]
pub fn planar_heading(dir: TVec3) -> TQuat {
    TQuat::from_rotation_y((-dir.x).atan2(-dir.z))
}

/// Slerp `current` toward `target` by `fraction` of the remaining arc,
/// saturating at the target.
#[inline]
pub fn rotate_toward(current: TQuat, target: TQuat, fraction: TReal) -> TQuat {
    current.slerp(target, fraction.clamp(0., 1.))
}

#[test]
fn planar_heading_points_fwd() {
    for dir in [
        -TVec3::Z,
        TVec3::Z,
        TVec3::X,
        -TVec3::X,
        TVec3::new(1., 0., -1.).normalize(),
    ] {
        let heading = planar_heading(dir);
        assert!((heading * -TVec3::Z - dir).length() < 1e-5, "dir: {dir}");
    }
}

#[test]
fn rotate_toward_closes_the_gap() {
    let target = planar_heading(TVec3::X);
    let mut cur = TQuat::IDENTITY;
    let mut gap = cur.angle_between(target);
    for _ in 0..64 {
        cur = rotate_toward(cur, target, 0.2);
        let new_gap = cur.angle_between(target);
        assert!(new_gap <= gap + 1e-6);
        gap = new_gap;
    }
    assert!(gap < 1e-3);
}

#[test]
fn rotate_toward_saturates() {
    let target = planar_heading(TVec3::X);
    let cur = rotate_toward(TQuat::IDENTITY, target, 7.);
    assert!(cur.angle_between(target) < 1e-6);
}
