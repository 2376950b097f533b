// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar rectangles and axis-aligned boxes.
//!
//! [`Rect2`] describes the extent of a plane anchor in its local XY plane.
//! [`Aabb3`] describes a volume anchor in its local frame, and is also used
//! for the world-aligned room bounds.

use nalgebra::{Point2, Point3, Vector2, Vector3};

use crate::error::{Error, Result};
use crate::ray::Ray;

/// Axis-aligned rectangle in a plane's local XY coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect2 {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Rect2 {
    /// Creates a rectangle from its corners.
    ///
    /// Zero-width or zero-height rectangles are accepted; inverted or
    /// non-finite corners are not.
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Result<Self> {
        if !(min.coords.iter().chain(max.coords.iter())).all(|v| v.is_finite()) {
            return Err(Error::NonFinite("plane rectangle"));
        }
        if max.x < min.x || max.y < min.y {
            return Err(Error::InvalidRect(format!(
                "max ({}, {}) is below min ({}, {})",
                max.x, max.y, min.x, min.y
            )));
        }
        Ok(Self { min, max })
    }

    /// Creates a rectangle of the given size centered on the origin.
    pub fn centered(width: f64, height: f64) -> Result<Self> {
        let half = Vector2::new(width, height) * 0.5;
        Self::new(Point2::from(-half), Point2::from(half))
    }

    pub fn size(&self) -> Vector2<f64> {
        self.max - self.min
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns `true` if the point lies inside or on the rectangle.
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Clamps a point onto the rectangle.
    pub fn clamp(&self, point: &Point2<f64>) -> Point2<f64> {
        Point2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Shrinks every edge inward by `inset`.
    ///
    /// Returns `None` when the rectangle is not strictly wider and taller than
    /// `2 * inset`.
    pub fn shrink(&self, inset: f64) -> Option<Self> {
        let min_width = 2.0 * inset;
        if self.width() > min_width && self.height() > min_width {
            Some(Self {
                min: self.min + Vector2::repeat(inset),
                max: self.max - Vector2::repeat(inset),
            })
        } else {
            None
        }
    }
}

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb3 {
    /// Creates a box from its corners, rejecting inverted or non-finite input.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Result<Self> {
        if !(min.coords.iter().chain(max.coords.iter())).all(|v| v.is_finite()) {
            return Err(Error::NonFinite("volume bounds"));
        }
        if max.x < min.x || max.y < min.y || max.z < min.z {
            return Err(Error::InvalidVolume(format!(
                "max ({}, {}, {}) is below min ({}, {}, {})",
                max.x, max.y, max.z, min.x, min.y, min.z
            )));
        }
        Ok(Self { min, max })
    }

    /// Builds a box from its center and full size.
    pub fn from_center_size(center: Point3<f64>, size: Vector3<f64>) -> Result<Self> {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Half of the size along each axis.
    pub fn extents(&self) -> Vector3<f64> {
        self.size() * 0.5
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Tests containment after growing the box by `buffer` on every side.
    ///
    /// When `test_z` is `false` the Z extent is ignored, turning the box into
    /// an infinite column along its local Z axis.
    pub fn contains_point(&self, point: &Point3<f64>, buffer: f64, test_z: bool) -> bool {
        let inside_xy = point.x >= self.min.x - buffer
            && point.x <= self.max.x + buffer
            && point.y >= self.min.y - buffer
            && point.y <= self.max.y + buffer;
        if !test_z {
            return inside_xy;
        }
        inside_xy && point.z >= self.min.z - buffer && point.z <= self.max.z + buffer
    }

    /// Returns the closest point on the surface of the box.
    ///
    /// Points outside are clamped; points inside are pushed to the nearest face.
    pub fn closest_surface_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let clamped = Point3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        );
        if clamped != *point {
            return clamped;
        }

        let mut best = clamped;
        let mut best_dist = f64::INFINITY;
        for axis in 0..3 {
            for target in [self.min[axis], self.max[axis]] {
                let dist = (point[axis] - target).abs();
                if dist < best_dist {
                    best_dist = dist;
                    best = *point;
                    best[axis] = target;
                }
            }
        }
        best
    }

    /// Slab test against the box, reporting the entering face.
    ///
    /// Returns the hit distance along the ray and the outward normal of the
    /// face that was entered. Rays starting inside the box report no hit.
    pub fn raycast(&self, ray: &Ray, max_distance: f64) -> Option<(f64, Vector3<f64>)> {
        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        let mut enter_normal = Vector3::zeros();

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];

            if dir.abs() < 1e-12 {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            // Entering through the min face means the outward normal is -axis
            let mut sign = -1.0;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
                sign = 1.0;
            }

            if t0 > t_enter {
                t_enter = t0;
                enter_normal = Vector3::zeros();
                enter_normal[axis] = sign;
            }
            t_exit = t_exit.min(t1);

            if t_enter > t_exit {
                return None;
            }
        }

        if t_enter < 0.0 || t_enter > max_distance || enter_normal == Vector3::zeros() {
            return None;
        }
        Some((t_enter, enter_normal))
    }
}
