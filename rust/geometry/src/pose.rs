// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rigid pose helpers.
//!
//! Anchor frames follow a right/up/forward convention: local +X is right,
//! +Y is up and +Z is forward (the surface normal of a plane).

use nalgebra::{Isometry3, UnitQuaternion, Vector3};

/// World up direction (+Y).
pub fn world_up() -> Vector3<f64> {
    Vector3::y()
}

/// World-space direction of the pose's local +X axis.
pub fn right(pose: &Isometry3<f64>) -> Vector3<f64> {
    pose.rotation * Vector3::x()
}

/// World-space direction of the pose's local +Y axis.
pub fn up(pose: &Isometry3<f64>) -> Vector3<f64> {
    pose.rotation * Vector3::y()
}

/// World-space direction of the pose's local +Z axis.
pub fn forward(pose: &Isometry3<f64>) -> Vector3<f64> {
    pose.rotation * Vector3::z()
}

/// Unsigned angle between two vectors, in degrees.
pub fn angle_between_degrees(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.angle(b).to_degrees()
}

/// Component of `v` perpendicular to `axis`, normalized.
///
/// Returns `None` when `v` is (anti)parallel to `axis` or either is zero.
pub fn orthogonal_component(v: &Vector3<f64>, axis: &Vector3<f64>) -> Option<Vector3<f64>> {
    let axis = axis.try_normalize(1e-12)?;
    (v - axis * v.dot(&axis)).try_normalize(1e-9)
}

/// Rotation whose local +Z points along `forward` and whose local +Y is as
/// close to `up` as possible.
///
/// A zero `forward` yields the identity. When `forward` is parallel to `up`
/// the shortest-arc rotation from +Z is used instead.
pub fn look_rotation(forward: &Vector3<f64>, up: &Vector3<f64>) -> UnitQuaternion<f64> {
    let Some(dir) = forward.try_normalize(1e-12) else {
        return UnitQuaternion::identity();
    };

    if orthogonal_component(up, &dir).is_some() {
        return UnitQuaternion::face_towards(&dir, up);
    }

    UnitQuaternion::rotation_between(&Vector3::z(), &dir).unwrap_or_else(|| {
        // dir is -Z; any half turn about a perpendicular axis works
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::PI)
    })
}
