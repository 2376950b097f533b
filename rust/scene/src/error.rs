// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for room mutation and settings loading.
//!
//! Queries never fail: missing data degrades to `None`, `false` or an
//! infinite distance. Only the inbound surface driven by the scene data
//! source reports errors.

use uuid::Uuid;

/// Result type alias for room operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while mutating a room.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No anchor with this uuid exists in the room.
    #[error("anchor not found: {0}")]
    AnchorNotFound(Uuid),

    /// An anchor with this uuid is already part of the room.
    #[error("anchor already exists: {0}")]
    DuplicateAnchor(Uuid),

    /// The anchor record carries invalid geometry.
    #[error("invalid anchor geometry: {0}")]
    Geometry(#[from] room_lite_geometry::Error),

    /// A settings value is out of range.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// Settings JSON could not be parsed.
    #[error("settings parse error: {0}")]
    Json(#[from] serde_json::Error),
}
