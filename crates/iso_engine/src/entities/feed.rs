//! Authoritative entity lists pushed by the embedding application
//!
//! Field names follow the simulation's JSON (camelCase).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Anything carrying a stable external id
pub trait FeedItem {
    /// External id
    fn id(&self) -> &str;
}

/// One mobile entity as reported by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBrief {
    /// Stable id
    pub id: String,
    /// Display name
    pub name: String,
    /// Occupation or other grouping; selects the palette
    #[serde(default)]
    pub category: String,
    /// Name of the structure the entity is at
    #[serde(default)]
    pub current_location_name: Option<String>,
    /// What the entity is doing, e.g. `work` or `socialize`
    #[serde(default)]
    pub activity: Option<String>,
}

impl EntityBrief {
    /// Create a brief at a named location
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            current_location_name: Some(location.into()),
            activity: None,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the activity
    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = Some(activity.into());
        self
    }
}

impl FeedItem for EntityBrief {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Backend grid coordinates as sent by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridPosition {
    /// Column
    pub x: f32,
    /// Row
    pub y: f32,
}

/// Footprint in backend grid units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootprintSize {
    /// Extent along x
    pub width: f32,
    /// Extent along y
    pub height: f32,
}

impl Default for FootprintSize {
    fn default() -> Self {
        Self { width: 4.0, height: 4.0 }
    }
}

/// One structure as reported by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureBrief {
    /// Stable id
    pub id: String,
    /// Display name; also what entities reference as their location
    pub name: String,
    /// Location type, e.g. `cafe` or `office`
    #[serde(default)]
    pub category: String,
    /// Anchor on the backend grid
    pub grid_position: GridPosition,
    /// Footprint
    #[serde(default)]
    pub size: FootprintSize,
}

impl StructureBrief {
    /// Create a brief anchored at a grid position
    pub fn new(id: impl Into<String>, name: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            grid_position: GridPosition { x, y },
            size: FootprintSize::default(),
        }
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the footprint
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = FootprintSize { width, height };
        self
    }
}

impl FeedItem for StructureBrief {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Collapse duplicate ids, keeping the last entry at the first entry's position
pub fn latest_by_id<B: FeedItem>(briefs: &[B]) -> Vec<&B> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(briefs.len());
    let mut latest: Vec<&B> = Vec::with_capacity(briefs.len());
    for brief in briefs {
        match index.get(brief.id()) {
            Some(&slot) => {
                log::debug!("Duplicate id {} in feed, keeping the later entry", brief.id());
                latest[slot] = brief;
            }
            None => {
                index.insert(brief.id(), latest.len());
                latest.push(brief);
            }
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_brief_uses_camel_case_keys() {
        let text = "id = \"a1\"\nname = \"Ada\"\ncategory = \"artist\"\ncurrentLocationName = \"Cafe\"\n";
        let brief: EntityBrief = toml::from_str(text).expect("entity brief parses");
        assert_eq!(brief.current_location_name.as_deref(), Some("Cafe"));
        assert_eq!(brief.activity, None);
    }

    #[test]
    fn test_structure_brief_from_ron() {
        let text = r#"(id: "s1", name: "Cafe", category: "cafe", gridPosition: (x: 10.0, y: 12.0), size: (width: 6.0, height: 4.0))"#;
        let brief: StructureBrief = ron::from_str(text).expect("structure brief parses");
        assert_eq!(brief.grid_position, GridPosition { x: 10.0, y: 12.0 });
        assert_eq!(brief.size.width, 6.0);
    }

    #[test]
    fn test_latest_by_id_last_wins() {
        let briefs = vec![
            EntityBrief::new("a", "Ada", "Cafe"),
            EntityBrief::new("b", "Bo", "Park"),
            EntityBrief::new("a", "Ada", "Office"),
        ];
        let latest = latest_by_id(&briefs);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].current_location_name.as_deref(), Some("Office"));
        assert_eq!(latest[1].id, "b");
    }
}
