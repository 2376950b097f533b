// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Room-Lite Scene
//!
//! A live model of a physical room built from labeled scene anchors (floor,
//! ceiling, walls, furniture) and the spatial queries used to place virtual
//! content inside it.
//!
//! Anchors are owned by a [`Room`] arena and addressed by stable
//! [`AnchorKey`]s. Relationships between anchors (parent/child hierarchy,
//! couch seats, floor/ceiling/wall roles) are stored as key links next to the
//! arena and recomputed wholesale, so no anchor is ever kept alive by another.
//!
//! The room is single-threaded: mutation (driven by an external scene data
//! source) and queries are expected to be serialized by the host.
//!
//! ```
//! use room_lite_geometry::{Isometry3, Rect2, Vector3};
//! use room_lite_scene::{AnchorRecord, Room, SceneLabels};
//! use uuid::Uuid;
//!
//! let mut room = Room::new();
//! let floor_pose = Isometry3::rotation(Vector3::x() * -std::f64::consts::FRAC_PI_2);
//! let floor = AnchorRecord::plane(
//!     Uuid::from_u128(1),
//!     SceneLabels::FLOOR,
//!     floor_pose,
//!     Rect2::centered(4.0, 3.0).unwrap(),
//! );
//! let key = room.create_anchor(floor).unwrap();
//! assert_eq!(room.anchor_count(), 1);
//! assert!(room.anchor(key).unwrap().has_any_label(SceneLabels::FLOOR));
//! ```

pub mod anchor;
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod keys;
pub mod label;
pub mod query;
pub mod room;
pub mod room_geometry;
pub mod sampling;
pub mod seats;
pub mod settings;

pub use anchor::{Anchor, AnchorRecord};
pub use error::{Error, Result};
pub use events::{RoomEvent, SubscriptionId};
pub use hierarchy::AnchorHierarchy;
pub use keys::AnchorKey;
pub use label::{LabelFilter, SceneLabels};
pub use query::{BestPose, ClosestSurface, KeyWall, PositioningMethod};
pub use room::Room;
pub use sampling::{SurfaceSample, SurfaceType, MAX_SAMPLING_ITERATIONS};
pub use seats::{CouchSeat, SeatPose, MAX_SEATS_PER_COUCH};
pub use settings::RoomSettings;
