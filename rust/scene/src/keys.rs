// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Anchor keys for arena-based storage.
//!
//! Keys are created by `slotmap::SlotMap` and stay unique after removal
//! (generational indices), so a stale key held by a caller resolves to
//! nothing instead of aliasing a newer anchor.

use slotmap::new_key_type;

new_key_type! {
    /// Key for an anchor owned by a [`Room`](crate::Room).
    pub struct AnchorKey;
}
