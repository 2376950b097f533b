// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached room outline and world bounds.
//!
//! Both are derived from the floor boundary and the floor/ceiling heights,
//! and are only recomputed when the room pose differs from the one they
//! were computed for (or after an explicit invalidation).

use nalgebra::{Isometry3, Point3};
use room_lite_geometry::Aabb3;

use crate::anchor::Anchor;

#[derive(Debug, Clone, Default)]
pub(crate) struct GeometryCache {
    pose: Option<Isometry3<f64>>,
    bounds: Option<Aabb3>,
    outline: Vec<Point3<f64>>,
}

impl GeometryCache {
    pub(crate) fn invalidate(&mut self) {
        self.pose = None;
    }

    /// Recomputes outline and bounds unless `room_pose` matches the cached one.
    pub(crate) fn refresh(
        &mut self,
        room_pose: &Isometry3<f64>,
        floor: Option<&Anchor>,
        ceiling: Option<&Anchor>,
    ) {
        let (Some(floor), Some(ceiling)) = (floor, ceiling) else {
            if self.pose.is_some() || !self.outline.is_empty() {
                tracing::warn!("floor or ceiling anchor not found");
            }
            self.pose = None;
            self.bounds = None;
            self.outline.clear();
            return;
        };

        if self.pose.as_ref() == Some(room_pose) {
            return;
        }
        self.pose = Some(*room_pose);

        self.outline = floor.world_boundary();

        let y_min = floor.position().y;
        let y_max = ceiling.position().y;
        let mut min = Point3::new(f64::INFINITY, y_min, f64::INFINITY);
        let mut max = Point3::new(f64::NEG_INFINITY, y_max, f64::NEG_INFINITY);
        for p in &self.outline {
            min.x = min.x.min(p.x);
            max.x = max.x.max(p.x);
            min.z = min.z.min(p.z);
            max.z = max.z.max(p.z);
        }

        self.bounds = Aabb3::new(min, max).ok();
        if self.bounds.is_none() {
            tracing::warn!(
                floor_y = y_min,
                ceiling_y = y_max,
                corners = self.outline.len(),
                "room bounds are degenerate"
            );
        }
        tracing::debug!(corners = self.outline.len(), "recomputed room outline and bounds");
    }

    pub(crate) fn bounds(&self) -> Option<Aabb3> {
        self.bounds
    }

    pub(crate) fn outline(&self) -> &[Point3<f64>] {
        &self.outline
    }
}
