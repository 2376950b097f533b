// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parent/child inference between anchors.
//!
//! Relationships are plain key links stored next to the anchor arena and
//! rebuilt from scratch on every pass:
//!
//! - walls adopt coplanar, plane-only anchors whose center lies on them
//!   (doors, windows, wall art),
//! - the floor adopts volumes whose bottom sits at floor height,
//! - volumes adopt volumes stacked on their top face, unless the child
//!   already rests on the floor.
//!
//! Walls never adopt other walls, and a stacked child always starts above
//! its parent's bottom, so parent links never form a cycle.
//!
//! When several parents qualify for one child the closest one wins (smallest
//! offset from the wall plane, smallest vertical gap when stacking), with
//! anchor order breaking exact ties.

use nalgebra::Point3;
use room_lite_geometry::{angle_between_degrees, right};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::anchor::Anchor;
use crate::keys::AnchorKey;
use crate::label::SceneLabels;
use crate::settings::RoomSettings;

const WALL_LABELS: SceneLabels = SceneLabels::WALL_FACE.union(SceneLabels::INVISIBLE_WALL_FACE);

/// Inferred parent/child links between anchors.
#[derive(Debug, Clone, Default)]
pub struct AnchorHierarchy {
    parents: FxHashMap<AnchorKey, AnchorKey>,
    children: FxHashMap<AnchorKey, Vec<AnchorKey>>,
}

/// Best parent found so far for one child, with its score.
type Candidates = FxHashMap<AnchorKey, (AnchorKey, f64)>;

fn offer(candidates: &mut Candidates, child: AnchorKey, parent: AnchorKey, score: f64) {
    match candidates.get(&child) {
        Some(&(_, best)) if best <= score => {}
        _ => {
            candidates.insert(child, (parent, score));
        }
    }
}

impl AnchorHierarchy {
    /// Resolves the hierarchy for `order` (the room's anchor order).
    pub(crate) fn resolve(
        anchors: &SlotMap<AnchorKey, Anchor>,
        order: &[AnchorKey],
        settings: &RoomSettings,
    ) -> Self {
        let items: Vec<(AnchorKey, &Anchor)> =
            order.iter().filter_map(|&k| anchors.get(k).map(|a| (k, a))).collect();

        let mut on_wall = Candidates::default();
        let mut on_floor = Candidates::default();
        let mut stacked = Candidates::default();

        for &(parent_key, parent) in &items {
            if parent.has_any_label(SceneLabels::WALL_FACE) {
                let Some(rect) = parent.plane_rect() else {
                    continue;
                };
                let half_width = rect.width() * 0.5;
                for &(child_key, child) in &items {
                    if child_key == parent_key
                        || !child.has_plane()
                        || child.has_volume()
                        || child.has_any_label(WALL_LABELS)
                    {
                        continue;
                    }
                    let aligned = angle_between_degrees(&right(child.pose()), &right(parent.pose()))
                        <= settings.wall_alignment_degrees;
                    let local = parent.pose().inverse_transform_point(&child.position());
                    if aligned
                        && local.z.abs() <= settings.coplanar_tolerance
                        && local.x.abs() < half_width
                    {
                        offer(&mut on_wall, child_key, parent_key, local.z.abs());
                    }
                }
            } else if parent.has_any_label(SceneLabels::FLOOR) {
                let floor_y = parent.position().y;
                for &(child_key, child) in &items {
                    if child_key == parent_key {
                        continue;
                    }
                    let Some(bottom) = volume_bottom(child) else {
                        continue;
                    };
                    let gap = (bottom - floor_y).abs();
                    if gap <= settings.coplanar_tolerance {
                        offer(&mut on_floor, child_key, parent_key, gap);
                    }
                }
            } else if let (Some(top), Some(base)) = (volume_top(parent), volume_bottom(parent)) {
                for &(child_key, child) in &items {
                    if child_key == parent_key {
                        continue;
                    }
                    let Some(bottom) = volume_bottom(child) else {
                        continue;
                    };
                    // child starts above the parent's bottom
                    let gap = (bottom - top).abs();
                    if gap <= settings.coplanar_tolerance
                        && bottom > base + settings.stack_overlap_epsilon
                        && footprint_overlaps(parent, child, settings.stack_overlap_epsilon)
                    {
                        offer(&mut stacked, child_key, parent_key, gap);
                    }
                }
            }
        }

        let mut parents: FxHashMap<AnchorKey, AnchorKey> = FxHashMap::default();
        let settled = on_wall.into_iter().chain(on_floor.iter().map(|(c, p)| (*c, *p)));
        for (child, (parent, _)) in settled {
            parents.insert(child, parent);
        }
        for (child, (parent, _)) in stacked {
            if !on_floor.contains_key(&child) {
                parents.insert(child, parent);
            }
        }

        let mut children: FxHashMap<AnchorKey, Vec<AnchorKey>> = FxHashMap::default();
        for &(key, _) in &items {
            if let Some(parent) = parents.get(&key) {
                children.entry(*parent).or_default().push(key);
            }
        }

        tracing::debug!(
            anchors = items.len(),
            linked = parents.len(),
            parents = children.len(),
            "resolved anchor hierarchy"
        );

        Self { parents, children }
    }

    pub fn parent(&self, child: AnchorKey) -> Option<AnchorKey> {
        self.parents.get(&child).copied()
    }

    /// Children of `parent`, in anchor order.
    pub fn children(&self, parent: AnchorKey) -> &[AnchorKey] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Drops every link that mentions `key`.
    pub(crate) fn remove(&mut self, key: AnchorKey) {
        if let Some(parent) = self.parents.remove(&key) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|&c| c != key);
                if siblings.is_empty() {
                    self.children.remove(&parent);
                }
            }
        }
        if let Some(orphans) = self.children.remove(&key) {
            for child in orphans {
                self.parents.remove(&child);
            }
        }
    }
}

/// World height of the volume's bottom face.
fn volume_bottom(anchor: &Anchor) -> Option<f64> {
    anchor.volume().map(|v| anchor.position().y + v.min.z)
}

/// World height of the volume's top face.
fn volume_top(anchor: &Anchor) -> Option<f64> {
    anchor.volume().map(|v| anchor.position().y + v.max.z)
}

/// True if any footprint corner of `child` lies over `parent`'s footprint.
fn footprint_overlaps(parent: &Anchor, child: &Anchor, epsilon: f64) -> bool {
    let (Some(pv), Some(cv)) = (parent.volume(), child.volume()) else {
        return false;
    };
    (0..4).any(|c| {
        let corner = Point3::new(
            if c < 2 { cv.min.x } else { cv.max.x },
            if c % 2 == 0 { cv.min.y } else { cv.max.y },
            0.0,
        );
        let world = child.pose().transform_point(&corner);
        let p = parent.pose().inverse_transform_point(&world);
        p.x - pv.min.x + epsilon >= 0.0
            && pv.max.x - p.x + epsilon >= 0.0
            && p.y - pv.min.y + epsilon >= 0.0
            && pv.max.y - p.y + epsilon >= 0.0
    })
}
