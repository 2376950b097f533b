// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rays and raycast results.

use nalgebra::{Isometry3, Point3, Vector3};

/// A half-line with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    /// Unit direction, or zero for a degenerate ray that hits nothing.
    pub direction: Vector3<f64>,
}

/// Result of a successful raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// World-space hit position.
    pub point: Point3<f64>,
    /// Outward unit normal of the surface that was hit.
    pub normal: Vector3<f64>,
    /// Distance from the ray origin to `point`.
    pub distance: f64,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(1e-12).unwrap_or_else(Vector3::zeros),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// Expresses the ray in the local frame of `pose`.
    ///
    /// Rigid transforms preserve length, so distances measured along the
    /// local ray are valid world distances.
    pub fn to_local(&self, pose: &Isometry3<f64>) -> Self {
        Self {
            origin: pose.inverse_transform_point(&self.origin),
            direction: pose.inverse_transform_vector(&self.direction),
        }
    }

    /// Intersects the ray with the local z = 0 plane whose normal is +Z.
    ///
    /// Only front-facing hits count: the ray must travel against the normal.
    /// Parallel and back-facing rays return `None`, as do planes behind the
    /// origin.
    pub fn intersect_xy_plane(&self) -> Option<f64> {
        if self.direction.z > -1e-12 {
            return None;
        }
        let t = -self.origin.z / self.direction.z;
        (t >= 0.0).then_some(t)
    }
}
