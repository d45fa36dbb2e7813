//! Entity lifecycle
//!
//! The simulation owns the authoritative lists of entities and structures and
//! pushes them here in full. Each manager diffs the new list against what it
//! already shows:
//! - ids only in the list get a node
//! - ids in both are updated in place, moving with a tween
//! - ids only shown locally lose their node and tweens
//!
//! Managers never call back into the host; results are returned so the caller
//! decides when to notify anyone.

pub mod feed;
pub mod locations;
pub mod mobile;
pub mod structures;

pub use feed::{latest_by_id, EntityBrief, FeedItem, FootprintSize, GridPosition, StructureBrief};
pub use locations::LocationDirectory;
pub use mobile::{FrameChange, MobileEntityManager, MobileRecord};
pub use structures::{DragCommit, StructureManager, StructureRecord};

use crate::coords::IsoPoint;
use crate::foundation::collections::NodeKey;
use crate::scene::SceneGraph;
use crate::tween::TweenEngine;

/// Counts from one reconcile pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Nodes created for new ids
    pub created: usize,
    /// Existing records refreshed
    pub updated: usize,
    /// Records dropped because their id disappeared
    pub removed: usize,
}

impl ReconcileReport {
    /// Whether the pass changed the set of shown ids
    pub fn changed_membership(&self) -> bool {
        self.created > 0 || self.removed > 0
    }
}

/// Shared surface of the entity managers
pub trait EntityLifecycle {
    /// Feed entry this manager consumes
    type Brief: FeedItem;

    /// Bring the shown set in line with an authoritative list
    ///
    /// Duplicate ids in `briefs` collapse to the last entry.
    fn reconcile(&mut self, briefs: &[Self::Brief], scene: &mut SceneGraph, tweens: &mut TweenEngine) -> ReconcileReport;

    /// Id of the nearest shown item under a world point
    fn hit_test(&self, scene: &SceneGraph, world: IsoPoint, radius: f32) -> Option<&str>;

    /// Whether an id is shown
    fn contains(&self, id: &str) -> bool;

    /// Number of shown items
    fn len(&self) -> usize;

    /// Whether nothing is shown
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scene node of an id
    fn node_of(&self, id: &str) -> Option<NodeKey>;

    /// Shown ids in ascending order
    fn ids(&self) -> Vec<&str>;

    /// Drop every record along with its node and tweens
    fn clear(&mut self, scene: &mut SceneGraph, tweens: &mut TweenEngine);
}
