// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Semantic labels and the include/exclude filter used by every query.

use bitflags::bitflags;

bitflags! {
    /// Semantic categories of a scene anchor. An anchor may carry several.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SceneLabels: u32 {
        const FLOOR               = 1 << 0;
        const CEILING             = 1 << 1;
        const WALL_FACE           = 1 << 2;
        const TABLE               = 1 << 3;
        const COUCH               = 1 << 4;
        const DOOR_FRAME          = 1 << 5;
        const WINDOW_FRAME        = 1 << 6;
        const OTHER               = 1 << 7;
        const STORAGE             = 1 << 8;
        const BED                 = 1 << 9;
        const SCREEN              = 1 << 10;
        const LAMP                = 1 << 11;
        const PLANT               = 1 << 12;
        const WALL_ART            = 1 << 13;
        const GLOBAL_MESH         = 1 << 14;
        const INVISIBLE_WALL_FACE = 1 << 15;
    }
}

/// Restricts which anchors participate in a query.
///
/// An anchor passes when it carries none of the excluded labels and, if an
/// include set is given, at least one of the included labels. The default
/// filter passes everything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelFilter {
    pub included: Option<SceneLabels>,
    pub excluded: Option<SceneLabels>,
}

impl LabelFilter {
    /// A filter that passes every anchor.
    pub fn all() -> Self {
        Self::default()
    }

    /// Passes anchors carrying any of `labels`.
    pub fn included(labels: SceneLabels) -> Self {
        Self {
            included: Some(labels),
            excluded: None,
        }
    }

    /// Passes anchors carrying none of `labels`.
    pub fn excluded(labels: SceneLabels) -> Self {
        Self {
            included: None,
            excluded: Some(labels),
        }
    }

    /// Adds an exclusion set to this filter.
    pub fn excluding(mut self, labels: SceneLabels) -> Self {
        self.excluded = Some(self.excluded.unwrap_or_default() | labels);
        self
    }

    pub fn passes(&self, labels: SceneLabels) -> bool {
        if let Some(excluded) = self.excluded {
            if excluded.intersects(labels) {
                return false;
            }
        }
        match self.included {
            Some(included) => included.intersects(labels),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_passes_everything() {
        let filter = LabelFilter::all();
        assert!(filter.passes(SceneLabels::FLOOR));
        assert!(filter.passes(SceneLabels::empty()));
    }

    #[test]
    fn include_requires_overlap() {
        let filter = LabelFilter::included(SceneLabels::TABLE | SceneLabels::COUCH);
        assert!(filter.passes(SceneLabels::COUCH));
        assert!(filter.passes(SceneLabels::COUCH | SceneLabels::OTHER));
        assert!(!filter.passes(SceneLabels::WALL_FACE));
        assert!(!filter.passes(SceneLabels::empty()));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = LabelFilter::included(SceneLabels::TABLE).excluding(SceneLabels::OTHER);
        assert!(filter.passes(SceneLabels::TABLE));
        assert!(!filter.passes(SceneLabels::TABLE | SceneLabels::OTHER));

        let walls_out = LabelFilter::excluded(SceneLabels::WALL_FACE);
        assert!(walls_out.passes(SceneLabels::FLOOR));
        assert!(!walls_out.passes(SceneLabels::WALL_FACE));
    }
}
