// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Random placement inside the room and on anchor surfaces.
//!
//! Both samplers are rejection loops capped at [`MAX_SAMPLING_ITERATIONS`];
//! running out of attempts is an ordinary "nothing found".

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI};

use bitflags::bitflags;
use nalgebra::{Isometry3, Point2, Point3, Translation3, UnitQuaternion, Vector3};
use rand::Rng;
use room_lite_geometry::{Aabb3, Rect2};

use crate::keys::AnchorKey;
use crate::label::{LabelFilter, SceneLabels};
use crate::room::Room;

/// Upper bound on candidates drawn by a single sampling call.
pub const MAX_SAMPLING_ITERATIONS: usize = 1000;

bitflags! {
    /// Orientation categories of sampleable surfaces.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SurfaceType: u8 {
        const FACING_UP   = 0b001;
        const FACING_DOWN = 0b010;
        const VERTICAL    = 0b100;
    }
}

impl SurfaceType {
    /// Category of a surface with world-space `normal`.
    pub fn from_normal(normal: &Vector3<f64>) -> Self {
        if normal.y >= FRAC_1_SQRT_2 {
            Self::FACING_UP
        } else if normal.y <= -FRAC_1_SQRT_2 {
            Self::FACING_DOWN
        } else {
            Self::VERTICAL
        }
    }
}

/// A sampled surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub anchor: AnchorKey,
}

/// One box face: its rectangle in face space and the face-to-box transform.
/// Face space has +Z along the outward normal.
struct VolumeFace {
    rect: fn(&Aabb3) -> Rect2,
    transform: fn(&Aabb3) -> Isometry3<f64>,
}

fn rect(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Rect2 {
    Rect2 {
        min: Point2::new(min_x, min_y),
        max: Point2::new(max_x, max_y),
    }
}

fn face(offset: Vector3<f64>, axis: Vector3<f64>, angle: f64) -> Isometry3<f64> {
    Isometry3::from_parts(
        Translation3::from(offset),
        UnitQuaternion::from_scaled_axis(axis * angle),
    )
}

fn top_rect(b: &Aabb3) -> Rect2 {
    rect(b.min.x, b.max.x, b.min.y, b.max.y)
}

fn top_face(b: &Aabb3) -> Isometry3<f64> {
    face(Vector3::new(0.0, 0.0, b.max.z), Vector3::zeros(), 0.0)
}

fn bottom_rect(b: &Aabb3) -> Rect2 {
    rect(-b.max.x, -b.min.x, b.min.y, b.max.y)
}

fn bottom_face(b: &Aabb3) -> Isometry3<f64> {
    face(Vector3::new(0.0, 0.0, b.min.z), Vector3::y(), PI)
}

fn right_rect(b: &Aabb3) -> Rect2 {
    rect(-b.max.z, -b.min.z, b.min.y, b.max.y)
}

fn right_face(b: &Aabb3) -> Isometry3<f64> {
    face(Vector3::new(b.max.x, 0.0, 0.0), Vector3::y(), FRAC_PI_2)
}

fn left_rect(b: &Aabb3) -> Rect2 {
    rect(b.min.z, b.max.z, b.min.y, b.max.y)
}

fn left_face(b: &Aabb3) -> Isometry3<f64> {
    face(Vector3::new(b.min.x, 0.0, 0.0), Vector3::y(), -FRAC_PI_2)
}

fn back_rect(b: &Aabb3) -> Rect2 {
    rect(b.min.x, b.max.x, -b.max.z, -b.min.z)
}

fn back_face(b: &Aabb3) -> Isometry3<f64> {
    face(Vector3::new(0.0, b.max.y, 0.0), Vector3::x(), -FRAC_PI_2)
}

fn front_rect(b: &Aabb3) -> Rect2 {
    rect(b.min.x, b.max.x, b.min.z, b.max.z)
}

fn front_face(b: &Aabb3) -> Isometry3<f64> {
    face(Vector3::new(0.0, b.min.y, 0.0), Vector3::x(), FRAC_PI_2)
}

/// Faces in local +Z, -Z, +X, -X, +Y, -Y order.
const VOLUME_FACES: [VolumeFace; 6] = [
    VolumeFace { rect: top_rect, transform: top_face },
    VolumeFace { rect: bottom_rect, transform: bottom_face },
    VolumeFace { rect: right_rect, transform: right_face },
    VolumeFace { rect: left_rect, transform: left_face },
    VolumeFace { rect: back_rect, transform: back_face },
    VolumeFace { rect: front_rect, transform: front_face },
];

/// A surface eligible for sampling.
struct Region {
    anchor: AnchorKey,
    /// Face rectangle already shrunk by the edge clearance.
    usable: Rect2,
    /// Plane regions must also pass the anchor's boundary test.
    is_plane: bool,
    to_world: Isometry3<f64>,
}

impl Room {
    /// Random point inside the room at least `min_distance` away from every
    /// wall, optionally outside all scene volumes (grown by `min_distance`).
    ///
    /// Returns `None` without a floor and ceiling, when `min_distance`
    /// exceeds the room's smallest half-extent, or when no candidate passes
    /// within [`MAX_SAMPLING_ITERATIONS`] draws.
    pub fn generate_random_position_in_room(
        &mut self,
        rng: &mut impl Rng,
        min_distance: f64,
        avoid_volumes: bool,
    ) -> Option<Point3<f64>> {
        self.floor?;
        let bounds = self.room_bounds()?;
        let extents = bounds.extents();
        let min_extent = extents.x.min(extents.y).min(extents.z);
        if !min_distance.is_finite() || min_distance > min_extent {
            return None;
        }

        let lo = bounds.min + Vector3::repeat(min_distance);
        let hi = bounds.max - Vector3::repeat(min_distance);
        let walls = LabelFilter::included(SceneLabels::WALL_FACE);

        for _ in 0..MAX_SAMPLING_ITERATIONS {
            let candidate = Point3::new(
                rng.gen_range(lo.x..=hi.x),
                rng.gen_range(lo.y..=hi.y),
                rng.gen_range(lo.z..=hi.z),
            );
            if !self.is_position_in_room(&candidate, true) {
                continue;
            }
            if self.closest_surface_position(&candidate, walls).distance <= min_distance {
                continue;
            }
            if avoid_volumes
                && self
                    .is_position_in_scene_volume(&candidate, true, min_distance)
                    .is_some()
            {
                continue;
            }
            return Some(candidate);
        }

        tracing::debug!(min_distance, "no position in room found within sampling budget");
        None
    }

    /// Random point on an anchor surface, weighted by usable area.
    ///
    /// Planes contribute their rectangle, volumes up to six box faces; each
    /// is kept only if its orientation is in `surface_types` and it is wider
    /// than `2 * min_distance_to_edge` on both axes. Plane samples falling
    /// outside a non-rectangular boundary are redrawn.
    pub fn generate_random_position_on_surface(
        &self,
        rng: &mut impl Rng,
        surface_types: SurfaceType,
        min_distance_to_edge: f64,
        filter: LabelFilter,
    ) -> Option<SurfaceSample> {
        let edge = min_distance_to_edge.max(0.0);
        let mut regions: Vec<(Region, f64)> = Vec::new();

        let mut consider =
            |anchor: AnchorKey, rect: &Rect2, to_world: Isometry3<f64>, is_plane: bool| {
                let normal = to_world.rotation * Vector3::z();
                if !surface_types.intersects(SurfaceType::from_normal(&normal)) {
                    return;
                }
                if let Some(usable) = rect.shrink(edge) {
                    let area = usable.area();
                    regions.push((
                        Region {
                            anchor,
                            usable,
                            is_plane,
                            to_world,
                        },
                        area,
                    ));
                }
            };

        for (key, anchor) in self.anchors() {
            if !filter.passes(anchor.labels()) {
                continue;
            }
            if let Some(plane) = anchor.plane_rect() {
                consider(key, plane, *anchor.pose(), true);
            }
            if let Some(volume) = anchor.volume() {
                for f in &VOLUME_FACES {
                    consider(key, &(f.rect)(volume), anchor.pose() * (f.transform)(volume), false);
                }
            }
        }

        let total: f64 = regions.iter().map(|(_, area)| area).sum();
        if regions.is_empty() || !(total > 0.0) {
            return None;
        }

        for _ in 0..MAX_SAMPLING_ITERATIONS {
            let mut pick = rng.gen_range(0.0..total);
            let mut index = 0;
            while index < regions.len() - 1 {
                pick -= regions[index].1;
                if pick <= 0.0 {
                    break;
                }
                index += 1;
            }

            let region = &regions[index].0;
            let u = rng.gen_range(region.usable.min.x..=region.usable.max.x);
            let v = rng.gen_range(region.usable.min.y..=region.usable.max.y);
            if region.is_plane {
                let inside = self
                    .anchor(region.anchor)
                    .is_some_and(|a| a.is_position_in_boundary(&Point2::new(u, v)));
                if !inside {
                    continue;
                }
            }

            return Some(SurfaceSample {
                position: region.to_world.transform_point(&Point3::new(u, v, 0.0)),
                normal: region.to_world.rotation * Vector3::z(),
                anchor: region.anchor,
            });
        }

        tracing::debug!(
            regions = regions.len(),
            "no surface position found within sampling budget"
        );
        None
    }
}
