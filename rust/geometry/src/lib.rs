// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Room-Lite Geometry
//!
//! Geometry primitives for room-scale scene anchors: planar rectangles with
//! boundary polygons, axis-aligned volume boxes, rays and rigid poses.
//!
//! Everything here is label- and room-agnostic. Coordinates are `f64` and the
//! world is right-handed with +Y up. Anchor-local frames use +X right,
//! +Y up and +Z forward (the surface normal).

pub mod bounds;
pub mod error;
pub mod polygon;
pub mod pose;
pub mod ray;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point2, Point3, Translation3, UnitQuaternion, Vector2, Vector3};

pub use bounds::{Aabb3, Rect2};
pub use error::{Error, Result};
pub use polygon::{point_in_polygon, signed_area, validate_boundary, Boundary};
pub use pose::{
    angle_between_degrees, forward, look_rotation, orthogonal_component, right, up, world_up,
};
pub use ray::{Ray, RaycastHit};
