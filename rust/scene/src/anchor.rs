// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene anchors: labeled planes and volumes with their placement.
//!
//! An [`AnchorRecord`] is what the scene data source hands over; an
//! [`Anchor`] is the validated, room-owned form that also tracks its world
//! pose. Plane geometry (rectangle and boundary polygon) lies in the local
//! XY plane; volume boxes are expressed in the same local frame.

use nalgebra::{Isometry3, Point2, Point3};
use room_lite_geometry::{forward, validate_boundary, Aabb3, Boundary, Ray, RaycastHit, Rect2};
use uuid::Uuid;

use crate::error::Result;
use crate::label::SceneLabels;

/// Anchor data as produced by the scene data source.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorRecord {
    pub uuid: Uuid,
    pub labels: SceneLabels,
    /// Pose relative to the room.
    pub pose: Isometry3<f64>,
    pub plane_rect: Option<Rect2>,
    /// Boundary polygon in plane space. Empty means "use the rectangle".
    pub plane_boundary: Vec<Point2<f64>>,
    pub volume: Option<Aabb3>,
}

impl AnchorRecord {
    /// A record with no geometry.
    pub fn new(uuid: Uuid, labels: SceneLabels, pose: Isometry3<f64>) -> Self {
        Self {
            uuid,
            labels,
            pose,
            plane_rect: None,
            plane_boundary: Vec::new(),
            volume: None,
        }
    }

    /// A planar record whose boundary is its rectangle.
    pub fn plane(uuid: Uuid, labels: SceneLabels, pose: Isometry3<f64>, rect: Rect2) -> Self {
        Self::new(uuid, labels, pose).with_plane(rect)
    }

    /// A volume-only record.
    pub fn volume(uuid: Uuid, labels: SceneLabels, pose: Isometry3<f64>, bounds: Aabb3) -> Self {
        Self::new(uuid, labels, pose).with_volume(bounds)
    }

    pub fn with_plane(mut self, rect: Rect2) -> Self {
        self.plane_rect = Some(rect);
        self
    }

    pub fn with_boundary(mut self, boundary: Vec<Point2<f64>>) -> Self {
        self.plane_boundary = boundary;
        self
    }

    pub fn with_volume(mut self, bounds: Aabb3) -> Self {
        self.volume = Some(bounds);
        self
    }

    /// Checks that every numeric field is usable.
    pub fn validate(&self) -> Result<()> {
        let t = &self.pose.translation.vector;
        let q = self.pose.rotation.coords;
        if !t.iter().chain(q.iter()).all(|v| v.is_finite()) {
            return Err(room_lite_geometry::Error::NonFinite("anchor pose").into());
        }
        if let Some(rect) = &self.plane_rect {
            Rect2::new(rect.min, rect.max)?;
        }
        if let Some(volume) = &self.volume {
            Aabb3::new(volume.min, volume.max)?;
        }
        validate_boundary(&self.plane_boundary)?;
        Ok(())
    }
}

/// A validated anchor owned by a [`Room`](crate::Room).
#[derive(Debug, Clone)]
pub struct Anchor {
    uuid: Uuid,
    labels: SceneLabels,
    local_pose: Isometry3<f64>,
    world_pose: Isometry3<f64>,
    plane_rect: Option<Rect2>,
    plane_boundary: Boundary,
    volume: Option<Aabb3>,
}

impl Anchor {
    /// Validates `record` and places it in a room with pose `room_pose`.
    pub fn from_record(record: AnchorRecord, room_pose: &Isometry3<f64>) -> Result<Self> {
        record.validate()?;
        Ok(Self {
            uuid: record.uuid,
            labels: record.labels,
            local_pose: record.pose,
            world_pose: room_pose * record.pose,
            plane_rect: record.plane_rect,
            plane_boundary: record.plane_boundary.into_iter().collect(),
            volume: record.volume,
        })
    }

    /// Replaces labels, pose and geometry in place. The uuid is kept.
    pub(crate) fn apply(&mut self, record: AnchorRecord, room_pose: &Isometry3<f64>) -> Result<()> {
        let uuid = self.uuid;
        *self = Self::from_record(record, room_pose)?;
        self.uuid = uuid;
        Ok(())
    }

    pub(crate) fn set_room_pose(&mut self, room_pose: &Isometry3<f64>) {
        self.world_pose = room_pose * self.local_pose;
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn labels(&self) -> SceneLabels {
        self.labels
    }

    /// Pose relative to the room.
    pub fn local_pose(&self) -> &Isometry3<f64> {
        &self.local_pose
    }

    /// Pose in world space.
    pub fn pose(&self) -> &Isometry3<f64> {
        &self.world_pose
    }

    /// World-space origin of the anchor.
    pub fn position(&self) -> Point3<f64> {
        self.world_pose.translation.vector.into()
    }

    pub fn plane_rect(&self) -> Option<&Rect2> {
        self.plane_rect.as_ref()
    }

    pub fn plane_boundary(&self) -> &[Point2<f64>] {
        &self.plane_boundary
    }

    pub fn volume(&self) -> Option<&Aabb3> {
        self.volume.as_ref()
    }

    pub fn has_plane(&self) -> bool {
        self.plane_rect.is_some()
    }

    pub fn has_volume(&self) -> bool {
        self.volume.is_some()
    }

    pub fn has_any_label(&self, labels: SceneLabels) -> bool {
        self.labels.intersects(labels)
    }

    pub fn has_all_labels(&self, labels: SceneLabels) -> bool {
        self.labels.contains(labels)
    }

    /// True if `record` describes this anchor exactly.
    pub fn matches_record(&self, record: &AnchorRecord) -> bool {
        self.uuid == record.uuid
            && self.labels == record.labels
            && self.local_pose == record.pose
            && self.plane_rect == record.plane_rect
            && self.plane_boundary.as_slice() == record.plane_boundary.as_slice()
            && self.volume == record.volume
    }

    /// Area of the plane rectangle, or zero without one.
    pub fn plane_area(&self) -> f64 {
        self.plane_rect.map_or(0.0, |r| r.area())
    }

    /// Plane boundary in world space.
    ///
    /// Falls back to the rectangle corners (clockwise seen from the front)
    /// when no boundary polygon was supplied.
    pub fn world_boundary(&self) -> Vec<Point3<f64>> {
        let local: Vec<Point2<f64>> = if !self.plane_boundary.is_empty() {
            self.plane_boundary.to_vec()
        } else if let Some(r) = &self.plane_rect {
            vec![
                Point2::new(r.min.x, r.min.y),
                Point2::new(r.min.x, r.max.y),
                Point2::new(r.max.x, r.max.y),
                Point2::new(r.max.x, r.min.y),
            ]
        } else {
            Vec::new()
        };

        local
            .iter()
            .map(|p| self.world_pose.transform_point(&Point3::new(p.x, p.y, 0.0)))
            .collect()
    }

    /// Point-in-polygon test in plane space.
    ///
    /// Uses the boundary polygon when present, otherwise the rectangle.
    /// Anchors without plane data contain nothing.
    pub fn is_position_in_boundary(&self, point: &Point2<f64>) -> bool {
        if !self.plane_boundary.is_empty() {
            return room_lite_geometry::point_in_polygon(point, &self.plane_boundary);
        }
        self.plane_rect.is_some_and(|r| r.contains(point))
    }

    /// Tests a world point against the volume grown by `buffer` on every
    /// side. With `test_vertical` unset only the footprint is compared.
    pub fn is_position_in_volume(
        &self,
        point: &Point3<f64>,
        test_vertical: bool,
        buffer: f64,
    ) -> bool {
        let Some(volume) = &self.volume else {
            return false;
        };
        let local = self.world_pose.inverse_transform_point(point);
        volume.contains_point(&local, buffer, test_vertical)
    }

    /// Casts a world ray against the anchor's geometry.
    ///
    /// Planes only register front-facing hits inside their boundary. When an
    /// anchor has both a plane and a volume the nearer hit is reported.
    pub fn raycast(&self, ray: &Ray, max_distance: f64) -> Option<RaycastHit> {
        let local = ray.to_local(&self.world_pose);

        let plane_hit = self.plane_rect.and_then(|rect| {
            let t = local.intersect_xy_plane()?;
            if t > max_distance {
                return None;
            }
            let p = local.point_at(t);
            let on_surface = if self.plane_boundary.is_empty() {
                rect.contains(&p.xy())
            } else {
                room_lite_geometry::point_in_polygon(&p.xy(), &self.plane_boundary)
            };
            on_surface.then(|| RaycastHit {
                point: ray.point_at(t),
                normal: forward(&self.world_pose),
                distance: t,
            })
        });

        let volume_hit = self.volume.and_then(|volume| {
            let (t, normal) = volume.raycast(&local, max_distance)?;
            Some(RaycastHit {
                point: ray.point_at(t),
                normal: self.world_pose.rotation * normal,
                distance: t,
            })
        });

        match (plane_hit, volume_hit) {
            (Some(a), Some(b)) => Some(if b.distance < a.distance { b } else { a }),
            (a, b) => a.or(b),
        }
    }

    /// Nearest point on the anchor's surface and its distance.
    ///
    /// Planes clamp to their rectangle; volumes project onto the closest
    /// box face, including from inside. `None` without geometry.
    pub fn closest_surface_position(&self, point: &Point3<f64>) -> Option<(f64, Point3<f64>)> {
        let local = self.world_pose.inverse_transform_point(point);
        let mut best: Option<(f64, Point3<f64>)> = None;

        let candidates = [
            self.plane_rect.map(|rect| {
                let p = rect.clamp(&local.xy());
                Point3::new(p.x, p.y, 0.0)
            }),
            self.volume.map(|v| v.closest_surface_point(&local)),
        ];

        for surface in candidates.into_iter().flatten() {
            let world = self.world_pose.transform_point(&surface);
            let dist = nalgebra::distance(point, &world);
            if best.map_or(true, |(d, _)| dist < d) {
                best = Some((dist, world));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion, Vector3};

    fn wall_pose() -> Isometry3<f64> {
        // facing -Z, one meter up
        Isometry3::from_parts(
            Translation3::new(0.0, 1.0, 2.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::PI),
        )
    }

    fn wall() -> Anchor {
        let record = AnchorRecord::plane(
            Uuid::from_u128(7),
            SceneLabels::WALL_FACE,
            wall_pose(),
            Rect2::centered(4.0, 2.0).unwrap(),
        );
        Anchor::from_record(record, &Isometry3::identity()).unwrap()
    }

    fn table() -> Anchor {
        let record = AnchorRecord::volume(
            Uuid::from_u128(8),
            SceneLabels::TABLE,
            Isometry3::rotation(Vector3::x() * -std::f64::consts::FRAC_PI_2),
            Aabb3::new(Point3::new(-0.5, -0.5, 0.0), Point3::new(0.5, 0.5, 0.8)).unwrap(),
        );
        Anchor::from_record(record, &Isometry3::identity()).unwrap()
    }

    #[test]
    fn rejects_invalid_records() {
        let degenerate =
            AnchorRecord::new(Uuid::from_u128(1), SceneLabels::OTHER, Isometry3::identity())
                .with_boundary(vec![Point2::origin(), Point2::new(1.0, 0.0)]);
        assert!(Anchor::from_record(degenerate, &Isometry3::identity()).is_err());

        let mut bad_pose =
            AnchorRecord::new(Uuid::from_u128(2), SceneLabels::OTHER, Isometry3::identity());
        bad_pose.pose.translation.vector.x = f64::NAN;
        assert!(bad_pose.validate().is_err());
    }

    #[test]
    fn plane_raycast_is_front_facing() {
        let wall = wall();
        let towards = Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::z());
        let hit = wall.raycast(&towards, 10.0).unwrap();
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-12);
        assert_relative_eq!(hit.normal, -Vector3::z(), epsilon = 1e-12);

        let behind = Ray::new(Point3::new(0.0, 1.0, 4.0), -Vector3::z());
        assert!(wall.raycast(&behind, 10.0).is_none());
        assert!(wall.raycast(&towards, 1.5).is_none());
    }

    #[test]
    fn plane_raycast_respects_boundary_polygon() {
        // L-shape missing the upper-right quadrant
        let boundary = vec![
            Point2::new(-1.0, -1.0),
            Point2::new(-1.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, -1.0),
        ];
        let record = AnchorRecord::plane(
            Uuid::from_u128(3),
            SceneLabels::TABLE,
            Isometry3::identity(),
            Rect2::centered(2.0, 2.0).unwrap(),
        )
        .with_boundary(boundary);
        let anchor = Anchor::from_record(record, &Isometry3::identity()).unwrap();

        let hit = Ray::new(Point3::new(-0.5, 0.5, 1.0), -Vector3::z());
        let miss = Ray::new(Point3::new(0.5, 0.5, 1.0), -Vector3::z());
        assert!(anchor.raycast(&hit, 5.0).is_some());
        assert!(anchor.raycast(&miss, 5.0).is_none());
        assert!(!anchor.is_position_in_boundary(&Point2::new(0.5, 0.5)));
    }

    #[test]
    fn volume_queries_use_local_frame() {
        let table = table();
        // local z is world up
        assert!(table.is_position_in_volume(&Point3::new(0.0, 0.4, 0.0), true, 0.0));
        assert!(!table.is_position_in_volume(&Point3::new(0.0, 1.0, 0.0), true, 0.0));
        assert!(table.is_position_in_volume(&Point3::new(0.0, 1.0, 0.0), false, 0.0));
        assert!(table.is_position_in_volume(&Point3::new(0.55, 0.4, 0.0), true, 0.1));

        let down = Ray::new(Point3::new(0.0, 3.0, 0.0), -Vector3::y());
        let hit = table.raycast(&down, 10.0).unwrap();
        assert_relative_eq!(hit.distance, 2.2, epsilon = 1e-12);
        assert_relative_eq!(hit.normal, Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn closest_surface_position_for_plane_and_volume() {
        let wall = wall();
        let (dist, pos) = wall.closest_surface_position(&Point3::new(3.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(pos, Point3::new(2.0, 1.0, 2.0), epsilon = 1e-12);
        assert_relative_eq!(dist, 5.0_f64.sqrt(), epsilon = 1e-12);

        let table = table();
        let (dist, pos) = table.closest_surface_position(&Point3::new(0.0, 0.7, 0.0)).unwrap();
        assert_relative_eq!(pos, Point3::new(0.0, 0.8, 0.0), epsilon = 1e-12);
        assert_relative_eq!(dist, 0.1, epsilon = 1e-12);

        let bare = Anchor::from_record(
            AnchorRecord::new(Uuid::from_u128(9), SceneLabels::OTHER, Isometry3::identity()),
            &Isometry3::identity(),
        )
        .unwrap();
        assert!(bare.closest_surface_position(&Point3::origin()).is_none());
    }

    #[test]
    fn world_boundary_falls_back_to_rect() {
        let wall = wall();
        let corners = wall.world_boundary();
        assert_eq!(corners.len(), 4);
        for c in &corners {
            assert_relative_eq!(c.z, 2.0, epsilon = 1e-12);
        }
        assert_relative_eq!(wall.plane_area(), 8.0);
    }

    #[test]
    fn room_pose_moves_world_pose() {
        let mut wall = wall();
        wall.set_room_pose(&Isometry3::translation(0.0, 0.0, 1.0));
        assert_relative_eq!(wall.position(), Point3::new(0.0, 1.0, 3.0), epsilon = 1e-12);
        assert_relative_eq!(wall.local_pose().translation.vector.z, 2.0);
    }
}
