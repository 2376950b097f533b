// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when validating geometry descriptors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid plane rectangle: {0}")]
    InvalidRect(String),

    #[error("Invalid volume bounds: {0}")]
    InvalidVolume(String),

    #[error("Boundary polygon needs at least 3 vertices, got {0}")]
    DegenerateBoundary(usize),

    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
}
