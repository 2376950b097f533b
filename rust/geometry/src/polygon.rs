// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D boundary polygons in a plane's local XY coordinates.

use nalgebra::Point2;
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Ordered boundary vertices of a plane anchor. Most scene planes are quads.
pub type Boundary = SmallVec<[Point2<f64>; 8]>;

/// Validates a boundary polygon.
///
/// An empty boundary is allowed (the plane rectangle alone describes the
/// surface); otherwise at least three finite vertices are required.
pub fn validate_boundary(boundary: &[Point2<f64>]) -> Result<()> {
    if boundary.is_empty() {
        return Ok(());
    }
    if boundary.len() < 3 {
        return Err(Error::DegenerateBoundary(boundary.len()));
    }
    if !boundary.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        return Err(Error::NonFinite("boundary polygon"));
    }
    Ok(())
}

/// Crossing-number point-in-polygon test.
///
/// Works for convex and non-convex simple polygons in either winding.
/// Polygons with fewer than three vertices contain nothing.
pub fn point_in_polygon(point: &Point2<f64>, polygon: &[Point2<f64>]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Shoelace signed area. Positive for counter-clockwise winding.
pub fn signed_area(polygon: &[Point2<f64>]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        twice_area += a.x * b.y - b.x * a.y;
    }
    twice_area * 0.5
}
