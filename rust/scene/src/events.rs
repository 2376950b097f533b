// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Anchor lifecycle notifications.

use uuid::Uuid;

use crate::keys::AnchorKey;

/// A change to the room's anchor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    AnchorCreated { key: AnchorKey, uuid: Uuid },
    AnchorUpdated { key: AnchorKey, uuid: Uuid },
    /// The key no longer resolves once this is delivered.
    AnchorRemoved { key: AnchorKey, uuid: Uuid },
}

impl RoomEvent {
    pub fn key(&self) -> AnchorKey {
        match *self {
            Self::AnchorCreated { key, .. }
            | Self::AnchorUpdated { key, .. }
            | Self::AnchorRemoved { key, .. } => key,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match *self {
            Self::AnchorCreated { uuid, .. }
            | Self::AnchorUpdated { uuid, .. }
            | Self::AnchorRemoved { uuid, .. } => uuid,
        }
    }
}

/// Handle returned by [`Room::subscribe`](crate::Room::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&RoomEvent)>;

/// Ordered list of event observers.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: RoomEvent) {
        for (_, callback) in &mut self.entries {
            callback(&event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers").field("count", &self.len()).finish()
    }
}
