//! Feed reconciliation across the scene, tweens and both managers

use crate::coords::{DepthKey, GridPoint};
use crate::core::config::EngineConfig;
use crate::entities::{EntityBrief, EntityLifecycle, ReconcileReport, StructureBrief};
use crate::host::SceneWorld;
use crate::scene::Layer;

fn town() -> SceneWorld {
    let mut world = SceneWorld::new(&EngineConfig::default().with_weather_seed(1));
    world.sync_structures(&[
        StructureBrief::new("s-cafe", "Cafe", 10.0, 10.0).with_category("cafe"),
        StructureBrief::new("s-park", "Park", 40.0, 60.0).with_category("park"),
        StructureBrief::new("s-office", "Office", 70.0, 30.0).with_category("office"),
    ]);
    world
}

fn settle(world: &mut SceneWorld, seconds: f32) {
    let steps = (seconds / 0.05).ceil() as usize;
    for _ in 0..steps {
        world.advance(0.05);
    }
}

#[test]
fn test_entity_list_transition() {
    let mut world = town();
    let first = [EntityBrief::new("a", "Ada", "Cafe"), EntityBrief::new("b", "Bo", "Park")];
    assert_eq!(world.sync_entities(&first), ReconcileReport { created: 2, updated: 0, removed: 0 });
    let node_a = world.mobiles().node_of("a").expect("a shown");

    let second = [EntityBrief::new("b", "Bo", "Cafe"), EntityBrief::new("c", "Cy", "Office")];
    let report = world.sync_entities(&second);
    assert_eq!(report, ReconcileReport { created: 1, updated: 1, removed: 1 });
    assert!(!world.scene().contains(node_a));
    assert!(world.tweens().claim_of(node_a, crate::tween::TweenProperty::X).is_none());
    assert!(world.mobiles().get("b").is_some_and(|record| record.is_moving()));
    assert_eq!(world.scene().layer_len(Layer::Entities), 2);

    settle(&mut world, 2.0);
    let cafe = world.transform().backend_to_iso(GridPoint::new(10, 10));
    let b = world.position_of("b").expect("b shown");
    assert!(b.distance(cafe) <= 24.0);
}

#[test]
fn test_duplicate_ids_collapse_to_last() {
    let mut world = town();
    let feed = [
        EntityBrief::new("a", "Ada", "Cafe"),
        EntityBrief::new("a", "Ada", "Office"),
    ];
    let report = world.sync_entities(&feed);
    assert_eq!(report.created, 1);
    assert_eq!(world.mobiles().get("a").and_then(|record| record.location()), Some("Office"));
}

#[test]
fn test_structure_list_transition() {
    let mut world = town();
    let report = world.sync_structures(&[
        StructureBrief::new("s-cafe", "Cafe", 14.0, 10.0),
        StructureBrief::new("s-lib", "Library", 55.0, 55.0),
    ]);
    assert_eq!(report, ReconcileReport { created: 1, updated: 1, removed: 2 });
    assert_eq!(world.structures().ids(), vec!["s-cafe", "s-lib"]);

    settle(&mut world, 0.5);
    let expected = world.transform().backend_to_iso(GridPoint::new(14, 10));
    assert_eq!(world.position_of("s-cafe"), Some(expected));
}

#[test]
fn test_depth_keys_follow_walking_entities() {
    let mut world = town();
    world.sync_entities(&[EntityBrief::new("a", "Ada", "Cafe"), EntityBrief::new("b", "Bo", "Office")]);
    world.sync_entities(&[EntityBrief::new("a", "Ada", "Park"), EntityBrief::new("b", "Bo", "Cafe")]);

    for _ in 0..40 {
        world.advance(0.05);
        world.paint();
        let scene = world.scene();
        assert!(!scene.is_dirty(Layer::Entities));
        let nodes: Vec<_> = [world.mobiles().node_of("a"), world.mobiles().node_of("b")]
            .into_iter()
            .flatten()
            .filter_map(|node| scene.get(node))
            .collect();
        assert_eq!(nodes.len(), 2);
        for node in nodes {
            assert_eq!(node.depth(), DepthKey::of(node.position()));
        }
    }
}
