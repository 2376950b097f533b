// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The room: anchor arena, layout roles and derived data.
//!
//! Anchors live in a `SlotMap`; every other structure (layout roles, walls,
//! hierarchy, seats) refers to them by [`AnchorKey`]. Removing an anchor
//! scrubs its key from all of them.

use nalgebra::{Isometry3, Point3};
use room_lite_geometry::Aabb3;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use uuid::Uuid;

use crate::anchor::{Anchor, AnchorRecord};
use crate::error::{Error, Result};
use crate::events::{Observers, RoomEvent, SubscriptionId};
use crate::hierarchy::AnchorHierarchy;
use crate::keys::AnchorKey;
use crate::label::SceneLabels;
use crate::room_geometry::GeometryCache;
use crate::seats::{self, CouchSeat};
use crate::settings::RoomSettings;

/// A live model of one physical room.
#[derive(Debug)]
pub struct Room {
    pub(crate) pose: Isometry3<f64>,
    pub(crate) anchors: SlotMap<AnchorKey, Anchor>,
    /// Insertion order of live anchors.
    pub(crate) order: Vec<AnchorKey>,
    pub(crate) by_uuid: FxHashMap<Uuid, AnchorKey>,
    pub(crate) floor: Option<AnchorKey>,
    pub(crate) ceiling: Option<AnchorKey>,
    pub(crate) global_mesh: Option<AnchorKey>,
    pub(crate) walls: Vec<AnchorKey>,
    pub(crate) hierarchy: AnchorHierarchy,
    pub(crate) seats: Vec<CouchSeat>,
    pub(crate) geometry: GeometryCache,
    pub(crate) settings: RoomSettings,
    observers: Observers,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            pose: Isometry3::identity(),
            anchors: SlotMap::with_key(),
            order: Vec::new(),
            by_uuid: FxHashMap::default(),
            floor: None,
            ceiling: None,
            global_mesh: None,
            walls: Vec::new(),
            hierarchy: AnchorHierarchy::default(),
            seats: Vec::new(),
            geometry: GeometryCache::default(),
            settings: RoomSettings::default(),
            observers: Observers::default(),
        }
    }
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: RoomSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            ..Self::default()
        })
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    /// Replaces the settings. Derived data is refreshed on the next
    /// [`compute_room_info`](Self::compute_room_info).
    pub fn set_settings(&mut self, settings: RoomSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// World pose of the room.
    pub fn pose(&self) -> &Isometry3<f64> {
        &self.pose
    }

    /// Moves the room. Anchor world poses follow; the outline and bounds
    /// are recomputed lazily on the next geometry query.
    pub fn set_pose(&mut self, pose: Isometry3<f64>) {
        self.pose = pose;
        for anchor in self.anchors.values_mut() {
            anchor.set_room_pose(&pose);
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&RoomEvent) + 'static,
    {
        self.observers.subscribe(Box::new(callback))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Adds a new anchor from the scene data source.
    pub fn create_anchor(&mut self, record: AnchorRecord) -> Result<AnchorKey> {
        let uuid = record.uuid;
        if self.by_uuid.contains_key(&uuid) {
            return Err(Error::DuplicateAnchor(uuid));
        }
        let anchor = Anchor::from_record(record, &self.pose)?;
        let labels = anchor.labels();

        let key = self.anchors.insert(anchor);
        self.order.push(key);
        self.by_uuid.insert(uuid, key);

        tracing::debug!(%uuid, ?labels, "anchor created");
        self.observers.emit(RoomEvent::AnchorCreated { key, uuid });
        Ok(key)
    }

    /// Replaces the data of an existing anchor in place. The record's own
    /// uuid is ignored in favor of `uuid`.
    pub fn update_anchor(&mut self, uuid: Uuid, record: AnchorRecord) -> Result<AnchorKey> {
        let key = self.key_of(uuid)?;
        let anchor = self.anchors.get_mut(key).ok_or(Error::AnchorNotFound(uuid))?;
        anchor.apply(record, &self.pose)?;

        if self.is_layout_surface(key) {
            self.geometry.invalidate();
        }

        tracing::debug!(%uuid, "anchor updated");
        self.observers.emit(RoomEvent::AnchorUpdated { key, uuid });
        Ok(key)
    }

    /// Removes an anchor and every reference to it.
    pub fn remove_anchor(&mut self, uuid: Uuid) -> Result<Anchor> {
        let key = self.key_of(uuid)?;
        let anchor = self.anchors.remove(key).ok_or(Error::AnchorNotFound(uuid))?;
        self.by_uuid.remove(&uuid);
        self.order.retain(|&k| k != key);

        if self.is_layout_surface(key) {
            self.geometry.invalidate();
        }
        if self.floor == Some(key) {
            self.floor = None;
        }
        if self.ceiling == Some(key) {
            self.ceiling = None;
        }
        if self.global_mesh == Some(key) {
            self.global_mesh = None;
        }
        self.walls.retain(|&k| k != key);
        self.hierarchy.remove(key);
        self.seats.retain(|s| s.couch != key);

        tracing::debug!(%uuid, "anchor removed");
        self.observers.emit(RoomEvent::AnchorRemoved { key, uuid });
        Ok(anchor)
    }

    /// Assigns floor, ceiling and walls by uuid. Nothing changes unless
    /// every uuid resolves.
    pub fn set_room_layout(
        &mut self,
        floor: Option<Uuid>,
        ceiling: Option<Uuid>,
        walls: &[Uuid],
    ) -> Result<()> {
        let floor = floor.map(|u| self.key_of(u)).transpose()?;
        let ceiling = ceiling.map(|u| self.key_of(u)).transpose()?;
        let walls = walls.iter().map(|&u| self.key_of(u)).collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            has_floor = floor.is_some(),
            has_ceiling = ceiling.is_some(),
            walls = walls.len(),
            "room layout set"
        );

        self.floor = floor;
        self.ceiling = ceiling;
        self.walls = walls;
        self.geometry.invalidate();
        Ok(())
    }

    /// Rebuilds derived data: global mesh role, seats and hierarchy.
    pub fn compute_room_info(&mut self) {
        self.global_mesh = self
            .order
            .iter()
            .copied()
            .find(|&k| {
                self.anchors
                    .get(k)
                    .is_some_and(|a| a.has_any_label(SceneLabels::GLOBAL_MESH))
            });
        self.seats = seats::generate_seats(&self.anchors, &self.order, &self.walls, &self.settings);
        self.hierarchy = AnchorHierarchy::resolve(&self.anchors, &self.order, &self.settings);
    }

    fn key_of(&self, uuid: Uuid) -> Result<AnchorKey> {
        self.by_uuid.get(&uuid).copied().ok_or(Error::AnchorNotFound(uuid))
    }

    fn is_layout_surface(&self, key: AnchorKey) -> bool {
        self.floor == Some(key) || self.ceiling == Some(key)
    }

    pub fn anchor(&self, key: AnchorKey) -> Option<&Anchor> {
        self.anchors.get(key)
    }

    pub fn anchor_by_uuid(&self, uuid: Uuid) -> Option<AnchorKey> {
        self.by_uuid.get(&uuid).copied()
    }

    /// Live anchors in insertion order.
    pub fn anchors(&self) -> impl Iterator<Item = (AnchorKey, &Anchor)> + '_ {
        self.order.iter().filter_map(move |&k| self.anchors.get(k).map(|a| (k, a)))
    }

    pub fn anchor_keys(&self) -> &[AnchorKey] {
        &self.order
    }

    pub fn anchor_count(&self) -> usize {
        self.order.len()
    }

    pub fn floor_anchor(&self) -> Option<AnchorKey> {
        self.floor
    }

    pub fn ceiling_anchor(&self) -> Option<AnchorKey> {
        self.ceiling
    }

    pub fn global_mesh_anchor(&self) -> Option<AnchorKey> {
        self.global_mesh
    }

    pub fn wall_anchors(&self) -> &[AnchorKey] {
        &self.walls
    }

    pub fn seats(&self) -> &[CouchSeat] {
        &self.seats
    }

    pub fn hierarchy(&self) -> &AnchorHierarchy {
        &self.hierarchy
    }

    pub fn parent(&self, key: AnchorKey) -> Option<AnchorKey> {
        self.hierarchy.parent(key)
    }

    pub fn children(&self, key: AnchorKey) -> &[AnchorKey] {
        self.hierarchy.children(key)
    }

    pub(crate) fn refresh_geometry(&mut self) {
        let floor = self.floor.and_then(|k| self.anchors.get(k));
        let ceiling = self.ceiling.and_then(|k| self.anchors.get(k));
        self.geometry.refresh(&self.pose, floor, ceiling);
    }

    /// World-aligned bounds spanning floor to ceiling. `None` without both.
    pub fn room_bounds(&mut self) -> Option<Aabb3> {
        self.refresh_geometry();
        self.geometry.bounds()
    }

    /// Floor boundary corners in world space, in the floor's own order
    /// (clockwise seen from above for captured rooms). Empty without a
    /// floor and ceiling.
    pub fn room_outline(&mut self) -> &[Point3<f64>] {
        self.refresh_geometry();
        self.geometry.outline()
    }
}
