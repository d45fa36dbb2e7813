//! Named locations that mobile entities can be at

use std::collections::{HashMap, HashSet};

use crate::coords::GridPoint;

use super::feed::StructureBrief;

/// Case-insensitive map from location name to backend grid point
///
/// Names that are not known resolve to the grid center. Each unknown name is
/// reported once.
#[derive(Debug, Clone)]
pub struct LocationDirectory {
    entries: HashMap<String, GridPoint>,
    reported: HashSet<String>,
    fallback: GridPoint,
}

impl LocationDirectory {
    /// Empty directory for a grid bounded by `grid_max`
    pub fn new(grid_max: i32) -> Self {
        let center = grid_max / 2;
        Self {
            entries: HashMap::new(),
            reported: HashSet::new(),
            fallback: GridPoint::new(center, center),
        }
    }

    fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Register or move a location
    pub fn insert(&mut self, name: &str, point: GridPoint) {
        let key = Self::normalize(name);
        self.reported.remove(&key);
        self.entries.insert(key, point);
    }

    /// Replace every entry with the structures' anchors
    ///
    /// Footprints are centered on their anchor, so the anchor is where an
    /// entity standing "at" the structure goes.
    pub fn rebuild(&mut self, structures: &[StructureBrief], grid_max: i32) {
        self.entries.clear();
        for brief in structures {
            let anchor = GridPoint::clamped(brief.grid_position.x, brief.grid_position.y, grid_max);
            self.insert(&brief.name, anchor);
        }
        log::debug!("Location directory rebuilt with {} entries", self.entries.len());
    }

    /// Look up a name without falling back
    pub fn get(&self, name: &str) -> Option<GridPoint> {
        self.entries.get(&Self::normalize(name)).copied()
    }

    /// Grid point for an optional name, falling back to the grid center
    pub fn resolve(&mut self, name: Option<&str>) -> GridPoint {
        let Some(name) = name.filter(|name| !name.trim().is_empty()) else {
            return self.fallback;
        };
        let key = Self::normalize(name);
        if let Some(point) = self.entries.get(&key) {
            return *point;
        }
        if self.reported.insert(key) {
            log::warn!("Unknown location '{name}', placing at grid center");
        }
        self.fallback
    }

    /// Point used for unknown names
    pub fn fallback(&self) -> GridPoint {
        self.fallback
    }

    /// Number of known locations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no location is known
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LocationDirectory {
    fn default() -> Self {
        Self::new(100)
    }
}
