// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tunables for hierarchy inference, seat layout and placement queries.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Room-wide settings, owned by the [`Room`](crate::Room).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    /// Width of a single seat along a couch, in meters.
    pub seat_width: f64,
    /// Max distance for coplanar and stacking tests, in meters.
    pub coplanar_tolerance: f64,
    /// Max angle between a wall and a wall-mounted child, in degrees.
    pub wall_alignment_degrees: f64,
    /// Slack when projecting a stacked volume's corners onto its parent.
    pub stack_overlap_epsilon: f64,
    /// Forward offset absorbing seam error during key wall detection.
    pub key_wall_tolerance: f64,
    /// Dot product with world up beyond which a surface counts as horizontal.
    pub horizontal_dot_threshold: f64,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            seat_width: 0.6,
            coplanar_tolerance: 0.1,
            wall_alignment_degrees: 5.0,
            stack_overlap_epsilon: 0.001,
            key_wall_tolerance: 0.1,
            horizontal_dot_threshold: 0.9,
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl RoomSettings {
    /// Load settings from `ROOM_LITE_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            seat_width: env_f64("ROOM_LITE_SEAT_WIDTH", d.seat_width),
            coplanar_tolerance: env_f64("ROOM_LITE_COPLANAR_TOLERANCE", d.coplanar_tolerance),
            wall_alignment_degrees: env_f64(
                "ROOM_LITE_WALL_ALIGNMENT_DEGREES",
                d.wall_alignment_degrees,
            ),
            stack_overlap_epsilon: env_f64(
                "ROOM_LITE_STACK_OVERLAP_EPSILON",
                d.stack_overlap_epsilon,
            ),
            key_wall_tolerance: env_f64("ROOM_LITE_KEY_WALL_TOLERANCE", d.key_wall_tolerance),
            horizontal_dot_threshold: env_f64(
                "ROOM_LITE_HORIZONTAL_DOT_THRESHOLD",
                d.horizontal_dot_threshold,
            ),
        }
    }

    /// Parse settings from JSON. Missing fields take their default.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.seat_width.is_finite() && self.seat_width > 0.0) {
            return Err(Error::Settings(format!(
                "seat_width must be positive, got {}",
                self.seat_width
            )));
        }
        let non_negative = [
            ("coplanar_tolerance", self.coplanar_tolerance),
            ("wall_alignment_degrees", self.wall_alignment_degrees),
            ("stack_overlap_epsilon", self.stack_overlap_epsilon),
            ("key_wall_tolerance", self.key_wall_tolerance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Settings(format!("{name} must be non-negative, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.horizontal_dot_threshold) {
            return Err(Error::Settings(format!(
                "horizontal_dot_threshold must be within [0, 1], got {}",
                self.horizontal_dot_threshold
            )));
        }
        Ok(())
    }
}
