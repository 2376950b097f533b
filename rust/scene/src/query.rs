// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial queries against a room.
//!
//! Every query degrades to a negative result (`None`, `false`, an infinite
//! distance) when the data it needs is missing.

use nalgebra::{Isometry3, Point2, Point3, Translation3, Vector2, Vector3};
use room_lite_geometry::{
    forward, look_rotation, orthogonal_component, right, up, world_up, Ray, RaycastHit, Rect2,
};
use uuid::Uuid;

use crate::anchor::{Anchor, AnchorRecord};
use crate::keys::AnchorKey;
use crate::label::{LabelFilter, SceneLabels};
use crate::room::Room;
use crate::seats::{self, SeatPose};

/// Where [`Room::best_pose_from_raycast`] puts a pose on top of a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositioningMethod {
    /// At the ray hit.
    #[default]
    Default,
    /// At the center of the top face.
    Center,
    /// At the middle of the top face edge closest to the ray origin.
    Edge,
}

/// Result of [`Room::closest_surface_position`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestSurface {
    /// Infinite when no anchor qualified.
    pub distance: f64,
    pub position: Point3<f64>,
    pub anchor: Option<AnchorKey>,
}

impl ClosestSurface {
    fn none() -> Self {
        Self {
            distance: f64::INFINITY,
            position: Point3::origin(),
            anchor: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.anchor.is_some()
    }
}

/// A placement pose derived from a raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestPose {
    /// +Y is world up; +Z is the suggested facing.
    pub pose: Isometry3<f64>,
    pub anchor: AnchorKey,
    pub surface_normal: Vector3<f64>,
}

/// The widest wall with nothing of the room behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyWall {
    pub anchor: AnchorKey,
    /// Size of the wall's plane rectangle.
    pub scale: Vector2<f64>,
}

impl Room {
    fn filtered(&self, filter: LabelFilter) -> impl Iterator<Item = (AnchorKey, &Anchor)> + '_ {
        self.anchors().filter(move |(_, a)| filter.passes(a.labels()))
    }

    /// Every anchor hit by `ray` within `max_distance`, in anchor order.
    pub fn raycast_all(
        &self,
        ray: &Ray,
        max_distance: f64,
        filter: LabelFilter,
    ) -> Vec<(AnchorKey, RaycastHit)> {
        self.filtered(filter)
            .filter_map(|(key, anchor)| anchor.raycast(ray, max_distance).map(|hit| (key, hit)))
            .collect()
    }

    /// The nearest anchor hit by `ray` within `max_distance`.
    pub fn raycast(
        &self,
        ray: &Ray,
        max_distance: f64,
        filter: LabelFilter,
    ) -> Option<(AnchorKey, RaycastHit)> {
        let mut closest = max_distance;
        let mut best = None;
        for (key, anchor) in self.filtered(filter) {
            if let Some(hit) = anchor.raycast(ray, closest) {
                closest = hit.distance;
                best = Some((key, hit));
            }
        }
        best
    }

    /// Tests `point` against the floor boundary seen from above and,
    /// with `test_vertical`, against the floor-to-ceiling range.
    pub fn is_position_in_room(&mut self, point: &Point3<f64>, test_vertical: bool) -> bool {
        let Some(floor) = self.floor.and_then(|k| self.anchors.get(k)) else {
            return false;
        };
        let local = floor.pose().inverse_transform_point(point);
        if !floor.is_position_in_boundary(&Point2::new(local.x, local.y)) {
            return false;
        }
        if !test_vertical {
            return true;
        }
        self.room_bounds()
            .is_some_and(|b| point.y >= b.min.y && point.y <= b.max.y)
    }

    /// First anchor (in order) whose volume contains `point`.
    pub fn is_position_in_scene_volume(
        &self,
        point: &Point3<f64>,
        test_vertical: bool,
        buffer: f64,
    ) -> Option<AnchorKey> {
        self.anchors()
            .find(|(_, a)| a.is_position_in_volume(point, test_vertical, buffer))
            .map(|(key, _)| key)
    }

    /// Nearest surface point over all anchors passing `filter`.
    pub fn closest_surface_position(
        &self,
        point: &Point3<f64>,
        filter: LabelFilter,
    ) -> ClosestSurface {
        let mut best = ClosestSurface::none();
        for (key, anchor) in self.filtered(filter) {
            if let Some((distance, position)) = anchor.closest_surface_position(point) {
                if distance < best.distance {
                    best = ClosestSurface {
                        distance,
                        position,
                        anchor: Some(key),
                    };
                }
            }
        }
        best
    }

    /// Suggests a pose for placing content where `ray` hits the room.
    ///
    /// Pose +Y is always world up. On the top of a volume +Z snaps to the
    /// edge axis facing the ray origin; on other horizontal surfaces it
    /// points back toward the ray origin; on vertical surfaces it is the
    /// surface normal.
    pub fn best_pose_from_raycast(
        &self,
        ray: &Ray,
        max_distance: f64,
        filter: LabelFilter,
        method: PositioningMethod,
    ) -> Option<BestPose> {
        let Some((key, hit)) = self.raycast(ray, max_distance, filter) else {
            tracing::debug!("best pose not found, no surface anchor hit");
            return None;
        };
        let anchor = self.anchors.get(key)?;
        let threshold = self.settings.horizontal_dot_threshold;
        let up_dot = hit.normal.dot(&world_up());
        let mut position = hit.point;

        let facing = match anchor.volume() {
            Some(volume) if up_dot >= threshold => {
                let pose = anchor.pose();
                let to_origin = ray.origin - anchor.position();
                let (r, u) = (right(pose), up(pose));
                let y_up = if u.dot(&to_origin) > 0.0 { u } else { -u };
                let x_up = if r.dot(&to_origin) > 0.0 { r } else { -r };

                let size = volume.size();
                let corner = x_up * size.x * 0.5 + y_up * size.y * 0.5;
                let to_plane = orthogonal_component(&to_origin, &forward(pose)).unwrap_or(y_up);
                let use_x = to_plane.angle(&y_up) > corner.angle(&y_up);
                let (facing, extent) = if use_x { (x_up, size.x) } else { (y_up, size.y) };

                let center = volume.center();
                let top_center =
                    pose.transform_point(&Point3::new(center.x, center.y, volume.max.z));
                match method {
                    PositioningMethod::Center => position = top_center,
                    PositioningMethod::Edge => position = top_center + facing * extent * 0.5,
                    PositioningMethod::Default => {}
                }
                facing
            }
            _ if up_dot.abs() >= threshold => {
                let flat =
                    Vector3::new(ray.origin.x - hit.point.x, 0.0, ray.origin.z - hit.point.z);
                flat.try_normalize(1e-9)
                    .or_else(|| orthogonal_component(&up(anchor.pose()), &world_up()))
                    .unwrap_or_else(Vector3::z)
            }
            _ => hit.normal,
        };

        Some(BestPose {
            pose: Isometry3::from_parts(
                Translation3::from(position.coords),
                look_rotation(&facing, &world_up()),
            ),
            anchor: key,
            surface_normal: hit.normal,
        })
    }

    /// Anchor with `labels` offering the largest surface: plane area, or
    /// the volume footprint for volume-only anchors.
    pub fn find_largest_surface(&self, labels: SceneLabels) -> Option<AnchorKey> {
        let mut largest = 0.0;
        let mut best = None;
        for (key, anchor) in self.anchors() {
            if !anchor.has_any_label(labels) {
                continue;
            }
            let area = match (anchor.plane_rect(), anchor.volume()) {
                (Some(rect), _) => rect.area(),
                (None, Some(volume)) => volume.size().x * volume.size().y,
                (None, None) => 0.0,
            };
            if area > largest {
                largest = area;
                best = Some(key);
            }
        }
        best
    }

    /// The widest wall with no outline corner behind it.
    ///
    /// Corners are pushed forward by `key_wall_tolerance` so the ends of
    /// adjacent walls do not disqualify each other.
    pub fn key_wall(&mut self) -> Option<KeyWall> {
        self.refresh_geometry();
        let tolerance = self.settings.key_wall_tolerance;
        let corners = self.geometry.outline();

        let mut walls: Vec<(AnchorKey, &Anchor, Rect2)> = self
            .walls
            .iter()
            .filter_map(|&k| {
                let wall = self.anchors.get(k)?;
                Some((k, wall, *wall.plane_rect()?))
            })
            .collect();
        walls.sort_by(|a, b| a.2.width().total_cmp(&b.2.width()));

        walls
            .iter()
            .rev()
            .find(|(_, wall, _)| {
                let fwd = forward(wall.pose());
                let origin = wall.position();
                corners
                    .iter()
                    .all(|c| fwd.dot(&(c - origin + fwd * tolerance)) >= 0.0)
            })
            .map(|(key, _, rect)| KeyWall {
                anchor: *key,
                scale: rect.size(),
            })
    }

    /// True if the room's anchors together carry every label in `labels`.
    pub fn has_all_labels(&self, labels: SceneLabels) -> bool {
        let present = self
            .anchors()
            .fold(SceneLabels::empty(), |acc, (_, a)| acc | a.labels());
        present.contains(labels)
    }

    /// True if any of `uuids` belongs to an anchor of this room.
    pub fn is_same_room(&self, uuids: &[Uuid]) -> bool {
        uuids.iter().any(|u| self.by_uuid.contains_key(u))
    }

    /// True if `records` describe exactly the anchors of this room.
    pub fn is_identical_room(&self, records: &[AnchorRecord]) -> bool {
        records.len() == self.anchor_count()
            && self
                .anchors()
                .all(|(_, anchor)| records.iter().any(|r| anchor.matches_record(r)))
    }

    /// Likely facing direction of an anchor: planes face along their
    /// normal, volumes away from the closest wall.
    pub fn facing_direction(&self, key: AnchorKey) -> Option<Vector3<f64>> {
        let anchor = self.anchors.get(key)?;
        let walls: Vec<&Anchor> = self.walls.iter().filter_map(|&k| self.anchors.get(k)).collect();
        Some(seats::facing_direction(anchor, &walls))
    }

    /// Every seat pose in world space.
    pub fn seat_poses_world(&self) -> Vec<SeatPose> {
        self.seats
            .iter()
            .filter_map(|seat| self.anchors.get(seat.couch).map(|couch| (seat, couch)))
            .flat_map(|(seat, couch)| {
                seat.poses.iter().map(move |local| SeatPose {
                    couch: seat.couch,
                    pose: couch.pose() * local,
                })
            })
            .collect()
    }

    /// The seat that best lines up with `ray`, e.g. for placing a remote
    /// participant where the user is looking.
    pub fn closest_seat_pose(&self, ray: &Ray) -> Option<SeatPose> {
        let mut best: Option<(f64, SeatPose)> = None;
        for seat in self.seat_poses_world() {
            let to_seat = (seat.pose.translation.vector - ray.origin.coords)
                .try_normalize(1e-12)
                .unwrap_or_else(Vector3::zeros);
            let alignment = ray.direction.dot(&to_seat);
            if best.map_or(true, |(b, _)| alignment > b) {
                best = Some((alignment, seat));
            }
        }
        best.map(|(_, seat)| seat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use room_lite_geometry::Aabb3;
    use std::f64::consts::FRAC_PI_2;

    fn up_pose(x: f64, y: f64, z: f64) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2),
        )
    }

    fn room_with_table() -> (Room, AnchorKey, AnchorKey) {
        let mut room = Room::new();
        let floor = room
            .create_anchor(AnchorRecord::plane(
                Uuid::from_u128(1),
                SceneLabels::FLOOR,
                up_pose(0.0, 0.0, 0.0),
                Rect2::centered(6.0, 6.0).unwrap(),
            ))
            .unwrap();
        let table = room
            .create_anchor(AnchorRecord::volume(
                Uuid::from_u128(2),
                SceneLabels::TABLE,
                up_pose(0.0, 0.0, 0.0),
                Aabb3::new(Point3::new(-1.0, -0.5, 0.0), Point3::new(1.0, 0.5, 0.8)).unwrap(),
            ))
            .unwrap();
        (room, floor, table)
    }

    #[test]
    fn raycast_filters_by_label() {
        let (room, floor, table) = room_with_table();
        let down = Ray::new(Point3::new(0.0, 2.0, 0.0), -Vector3::y());

        let (key, hit) = room.raycast(&down, 10.0, LabelFilter::all()).unwrap();
        assert_eq!(key, table);
        assert_relative_eq!(hit.distance, 1.2, epsilon = 1e-12);

        let (key, _) = room
            .raycast(&down, 10.0, LabelFilter::excluded(SceneLabels::TABLE))
            .unwrap();
        assert_eq!(key, floor);
        assert!(room.raycast(&down, 1.0, LabelFilter::all()).is_none());
    }

    #[test]
    fn closest_surface_reports_infinite_when_filtered_out() {
        let (room, _, table) = room_with_table();
        let none = room
            .closest_surface_position(&Point3::origin(), LabelFilter::included(SceneLabels::BED));
        assert!(!none.is_found());
        assert!(none.distance.is_infinite());

        let found = room.closest_surface_position(&Point3::new(0.0, 1.0, 0.0), LabelFilter::all());
        assert_eq!(found.anchor, Some(table));
        assert_relative_eq!(found.distance, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn best_pose_on_table_snaps_to_near_edge() {
        let (room, _, table) = room_with_table();
        // looking down at the table from the +Z side
        let ray = Ray::new(Point3::new(0.0, 1.6, 2.0), Vector3::new(0.0, -1.0, -2.0));

        let best = room
            .best_pose_from_raycast(&ray, 10.0, LabelFilter::all(), PositioningMethod::Edge)
            .unwrap();
        assert_eq!(best.anchor, table);
        assert_relative_eq!(best.surface_normal, Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(forward(&best.pose), Vector3::z(), epsilon = 1e-9);
        assert_relative_eq!(up(&best.pose), Vector3::y(), epsilon = 1e-9);
        assert_relative_eq!(
            best.pose.translation.vector,
            Vector3::new(0.0, 0.8, 0.5),
            epsilon = 1e-9
        );

        let center = room
            .best_pose_from_raycast(&ray, 10.0, LabelFilter::all(), PositioningMethod::Center)
            .unwrap();
        assert_relative_eq!(
            center.pose.translation.vector,
            Vector3::new(0.0, 0.8, 0.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn best_pose_on_floor_faces_ray_origin() {
        let (room, floor, _) = room_with_table();
        let ray = Ray::new(Point3::new(2.0, 1.5, 0.0), Vector3::new(0.5, -1.0, 0.0));
        let best = room
            .best_pose_from_raycast(&ray, 10.0, LabelFilter::all(), PositioningMethod::Default)
            .unwrap();
        assert_eq!(best.anchor, floor);
        assert_relative_eq!(forward(&best.pose), -Vector3::x(), epsilon = 1e-9);
        assert_relative_eq!(
            best.pose.translation.vector,
            Vector3::new(2.75, 0.0, 0.0),
            epsilon = 1e-9
        );

        let miss = Ray::new(Point3::new(0.0, 3.0, 0.0), Vector3::y());
        assert!(room
            .best_pose_from_raycast(&miss, 10.0, LabelFilter::all(), PositioningMethod::Default)
            .is_none());
    }

    #[test]
    fn largest_surface_and_labels() {
        let (mut room, floor, table) = room_with_table();
        assert_eq!(room.find_largest_surface(SceneLabels::TABLE), Some(table));
        assert_eq!(room.find_largest_surface(SceneLabels::TABLE | SceneLabels::FLOOR), Some(floor));
        assert_eq!(room.find_largest_surface(SceneLabels::COUCH), None);

        assert!(room.has_all_labels(SceneLabels::TABLE | SceneLabels::FLOOR));
        assert!(!room.has_all_labels(SceneLabels::TABLE | SceneLabels::CEILING));
        assert!(room.is_same_room(&[Uuid::from_u128(99), Uuid::from_u128(2)]));
        assert!(!room.is_same_room(&[Uuid::from_u128(99)]));

        room.set_room_layout(Some(Uuid::from_u128(1)), None, &[]).unwrap();
        assert!(room.is_position_in_room(&Point3::new(1.0, 5.0, 1.0), false));
        assert!(!room.is_position_in_room(&Point3::new(1.0, 1.0, 1.0), true));
        assert_eq!(
            room.is_position_in_scene_volume(&Point3::new(0.5, 0.4, 0.0), true, 0.0),
            Some(table)
        );
    }

    #[test]
    fn identical_room_compares_records() {
        let (room, _, _) = room_with_table();
        let records: Vec<AnchorRecord> = room
            .anchors()
            .map(|(_, a)| {
                let mut r = AnchorRecord::new(a.uuid(), a.labels(), *a.local_pose());
                r.plane_rect = a.plane_rect().copied();
                r.volume = a.volume().copied();
                r
            })
            .collect();
        assert!(room.is_identical_room(&records));
        assert!(!room.is_identical_room(&records[..1]));
    }
}
