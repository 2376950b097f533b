// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seat placement on couch-like anchors.
//!
//! Roughly square couches (aspect ratio within [0.5, 2]) get one centered
//! seat. Longer ones are split along their long axis into as many whole
//! seats as fit, with the leftover length spread evenly around them. Every
//! seat faces away from the closest wall.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector2, Vector3};
use room_lite_geometry::{forward, look_rotation, up, world_up, Ray};
use slotmap::SlotMap;

use crate::anchor::Anchor;
use crate::keys::AnchorKey;
use crate::label::SceneLabels;
use crate::settings::RoomSettings;

/// Absorbs float error when the couch length is an exact multiple of the
/// seat width (2.4 / 0.8 evaluates just below 3).
const SEAT_COUNT_EPSILON: f64 = 1e-9;

/// Couches that would seat more than this are treated as bad scene data.
pub const MAX_SEATS_PER_COUCH: usize = 64;

/// Seats on one couch anchor, in the anchor's local space.
#[derive(Debug, Clone, PartialEq)]
pub struct CouchSeat {
    pub couch: AnchorKey,
    pub poses: Vec<Isometry3<f64>>,
}

/// A single seat in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatPose {
    pub couch: AnchorKey,
    pub pose: Isometry3<f64>,
}

/// Direction pointing away from the wall closest to `anchor`.
///
/// Rays are cast from the anchor origin along its horizontal axes (the
/// negated local up, rotated in 90 degree steps about world up). Falls back
/// to the anchor's up axis when no wall is hit.
pub(crate) fn direction_away_from_closest_wall(anchor: &Anchor, walls: &[&Anchor]) -> Vector3<f64> {
    let anchor_up = up(anchor.pose());
    let origin = anchor.position();
    let mut away = anchor_up;
    let mut closest = f64::INFINITY;

    for i in 0..4 {
        let turn = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), FRAC_PI_2 * i as f64);
        let axis = turn * -anchor_up;
        let ray = Ray::new(origin, axis);
        for wall in walls {
            if let Some(hit) = wall.raycast(&ray, closest) {
                closest = hit.distance;
                away = -axis;
            }
        }
    }
    away
}

/// Likely facing of an anchor: planes face along their normal, volumes away
/// from the closest wall.
pub(crate) fn facing_direction(anchor: &Anchor, walls: &[&Anchor]) -> Vector3<f64> {
    if anchor.has_volume() {
        direction_away_from_closest_wall(anchor, walls)
    } else {
        forward(anchor.pose())
    }
}

fn seating_size(anchor: &Anchor) -> Vector2<f64> {
    if let Some(rect) = anchor.plane_rect() {
        rect.size()
    } else if let Some(volume) = anchor.volume() {
        volume.size().xy()
    } else {
        Vector2::new(1.0, 1.0)
    }
}

/// Seat offsets along the long axis, centered on the anchor origin.
fn seat_offsets(length: f64, seat_width: f64) -> Vec<f64> {
    let count = (length / seat_width + SEAT_COUNT_EPSILON).floor();
    if !(count >= 1.0) {
        return Vec::new();
    }
    if count > MAX_SEATS_PER_COUCH as f64 {
        tracing::warn!(length, seat_width, "couch too long for seat placement, skipping");
        return Vec::new();
    }
    let buffer = (length - count * seat_width) / count;
    (0..count as usize)
        .map(|k| -length * 0.5 + buffer * 0.5 + seat_width * 0.5 + (seat_width + buffer) * k as f64)
        .collect()
}

fn couch_seats(anchor: &Anchor, walls: &[&Anchor], seat_width: f64) -> Vec<Isometry3<f64>> {
    let size = seating_size(anchor);
    let facing = facing_direction(anchor, walls);
    let rotation = anchor.pose().rotation.inverse() * look_rotation(&facing, &world_up());

    let ratio = size.x / size.y;
    if (0.5..=2.0).contains(&ratio) {
        return vec![Isometry3::from_parts(Translation3::identity(), rotation)];
    }

    let x_long = size.x > size.y;
    let (length, axis) = if x_long {
        (size.x, Vector3::x())
    } else {
        (size.y, Vector3::y())
    };

    seat_offsets(length, seat_width)
        .into_iter()
        .map(|offset| Isometry3::from_parts(Translation3::from(axis * offset), rotation))
        .collect()
}

/// Builds seats for every couch anchor, in anchor order.
pub(crate) fn generate_seats(
    anchors: &SlotMap<AnchorKey, Anchor>,
    order: &[AnchorKey],
    walls: &[AnchorKey],
    settings: &RoomSettings,
) -> Vec<CouchSeat> {
    let wall_anchors: Vec<&Anchor> = walls.iter().filter_map(|&k| anchors.get(k)).collect();

    let seats: Vec<CouchSeat> = order
        .iter()
        .filter_map(|&key| {
            let anchor = anchors.get(key)?;
            if !anchor.has_any_label(SceneLabels::COUCH) {
                return None;
            }
            let poses = couch_seats(anchor, &wall_anchors, settings.seat_width);
            (!poses.is_empty()).then_some(CouchSeat { couch: key, poses })
        })
        .collect();

    tracing::debug!(
        couches = seats.len(),
        seats = seats.iter().map(|s| s.poses.len()).sum::<usize>(),
        "generated seat poses"
    );
    seats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorRecord;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use room_lite_geometry::{Aabb3, Rect2};
    use uuid::Uuid;

    #[test]
    fn exact_multiple_has_no_buffer() {
        let offsets = seat_offsets(2.4, 0.8);
        assert_eq!(offsets.len(), 3);
        assert_relative_eq!(offsets[0], -0.8, epsilon = 1e-9);
        assert_relative_eq!(offsets[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(offsets[2], 0.8, epsilon = 1e-9);
    }

    #[test]
    fn leftover_length_is_spread_evenly() {
        let offsets = seat_offsets(2.0, 0.6);
        assert_eq!(offsets.len(), 3);
        // buffer = 0.2 / 3 on each side of every seat
        let buffer = 0.2 / 3.0;
        assert_relative_eq!(offsets[0], -1.0 + buffer * 0.5 + 0.3, epsilon = 1e-12);
        assert_relative_eq!(offsets[1] - offsets[0], 0.6 + buffer, epsilon = 1e-12);
        assert_relative_eq!(offsets[2] - offsets[1], 0.6 + buffer, epsilon = 1e-12);
        assert!(seat_offsets(0.5, 0.6).is_empty());
    }

    #[test]
    fn implausible_couch_length_gets_no_seats() {
        assert!(seat_offsets(1e12, 0.6).is_empty());
        assert!(seat_offsets(f64::MAX, 0.6).is_empty());
        let longest = MAX_SEATS_PER_COUCH as f64 * 0.6;
        assert_eq!(seat_offsets(longest, 0.6).len(), MAX_SEATS_PER_COUCH);
        assert!(seat_offsets(longest + 0.6, 0.6).is_empty());
    }

    #[test]
    fn couch_faces_away_from_wall() {
        let room_pose = Isometry3::identity();
        // wall at z = -2 facing +Z, spanning y in [-0.5, 2.5]
        let wall = Anchor::from_record(
            AnchorRecord::plane(
                Uuid::from_u128(1),
                SceneLabels::WALL_FACE,
                Isometry3::translation(0.0, 1.0, -2.0),
                Rect2::centered(6.0, 3.0).unwrap(),
            ),
            &room_pose,
        )
        .unwrap();
        let couch_pose = Isometry3::from_parts(
            Translation3::new(0.0, 0.0, -1.5),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -FRAC_PI_2),
        );
        let couch = Anchor::from_record(
            AnchorRecord::volume(
                Uuid::from_u128(2),
                SceneLabels::COUCH,
                couch_pose,
                Aabb3::new(Point3::new(-1.2, -0.4, 0.0), Point3::new(1.2, 0.4, 0.5)).unwrap(),
            ),
            &room_pose,
        )
        .unwrap();

        let away = direction_away_from_closest_wall(&couch, &[&wall]);
        assert_relative_eq!(away, Vector3::z(), epsilon = 1e-12);

        let seats = couch_seats(&couch, &[&wall], 0.8);
        assert_eq!(seats.len(), 3);
        let world = couch.pose() * seats[0];
        assert_relative_eq!(forward(&world), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(up(&world), Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(
            world.translation.vector,
            Vector3::new(-0.8, 0.0, -1.5),
            epsilon = 1e-9
        );
    }

    #[test]
    fn square_couch_gets_single_centered_seat() {
        let couch = Anchor::from_record(
            AnchorRecord::plane(
                Uuid::from_u128(3),
                SceneLabels::COUCH,
                Isometry3::identity(),
                Rect2::centered(1.0, 0.8).unwrap(),
            ),
            &Isometry3::identity(),
        )
        .unwrap();
        let seats = couch_seats(&couch, &[], 0.8);
        assert_eq!(seats.len(), 1);
        assert_relative_eq!(seats[0].translation.vector, Vector3::zeros());
    }
}
