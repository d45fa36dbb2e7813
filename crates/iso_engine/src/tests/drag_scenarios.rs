//! Structure dragging through the host, from screen pointer to commit

use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::block_on;

use crate::coords::GridPoint;
use crate::core::config::EngineConfig;
use crate::entities::{DragCommit, EntityBrief, StructureBrief};
use crate::events::{Event, EventType};
use crate::foundation::math::Vec2;
use crate::host::{HeadlessSurfaceFactory, RenderHost};

fn ready_host() -> RenderHost {
    let host = RenderHost::new(EngineConfig::default().with_weather_seed(9)).expect("valid config");
    block_on(host.init(Rc::new(HeadlessSurfaceFactory::new()))).expect("init succeeds");
    host.sync_structures(&[StructureBrief::new("cafe-1", "Cafe", 10.0, 10.0)]).expect("ready");
    host
}

fn screen_of(host: &RenderHost, x: i32, y: i32) -> Vec2 {
    host.with_world(|world| world.camera().world_to_screen(world.transform().backend_to_iso(GridPoint::new(x, y))))
        .expect("ready")
}

#[test]
fn test_drag_commits_target_cell_once() {
    let host = ready_host();
    let commits = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&commits);
    host.on_drag_commit(move |commit: &DragCommit| sink.borrow_mut().push(commit.clone()));

    let events = Rc::new(RefCell::new(Vec::new()));
    let event_sink = Rc::clone(&events);
    host.register_handler(
        EventType::DragCommitted,
        Box::new(move |event: &Event| {
            event_sink.borrow_mut().push(event.get_grid());
            false
        }),
    )
    .expect("registered");

    let start = screen_of(&host, 10, 10);
    let end = screen_of(&host, 20, 15);
    assert_eq!(host.pointer_down(start.x, start.y), Ok(true));
    let middle = (start + end) / 2.0;
    assert_eq!(host.pointer_move(middle.x, middle.y), Ok(true));
    let commit = host.pointer_up(end.x, end.y).expect("ready");

    assert_eq!(commit, Some(DragCommit { id: "cafe-1".into(), x: 20, y: 15 }));
    assert_eq!(*commits.borrow(), vec![DragCommit { id: "cafe-1".into(), x: 20, y: 15 }]);
    assert_eq!(*events.borrow(), vec![Some((20, 15))]);

    // releasing again does nothing
    assert_eq!(host.pointer_up(end.x, end.y), Ok(None));
    assert_eq!(commits.borrow().len(), 1);
    host.destroy();
}

#[test]
fn test_drag_disabled_ignores_pointer() {
    let host = ready_host();
    host.set_drag_enabled(false).expect("ready");
    let start = screen_of(&host, 10, 10);
    assert_eq!(host.pointer_down(start.x, start.y), Ok(false));
    assert_eq!(host.pointer_up(start.x, start.y), Ok(None));
}

#[test]
fn test_residents_follow_dragged_structure() {
    let host = ready_host();
    host.sync_entities(&[EntityBrief::new("a", "Ada", "Cafe")]).expect("ready");

    let start = screen_of(&host, 10, 10);
    let end = screen_of(&host, 40, 40);
    host.pointer_down(start.x, start.y).expect("ready");
    host.pointer_up(end.x, end.y).expect("ready");
    for _ in 0..40 {
        host.tick(0.05).expect("tick succeeds");
    }

    let (position, anchor) = host
        .with_world(|world| {
            (world.position_of("a"), world.transform().backend_to_iso(GridPoint::new(40, 40)))
        })
        .expect("ready");
    assert!(position.is_some_and(|position| position.distance(anchor) <= 24.0));
}

#[test]
fn test_cancel_drag_restores_structure() {
    let host = ready_host();
    let start = screen_of(&host, 10, 10);
    let before = host.position_of("cafe-1").expect("ready");

    host.pointer_down(start.x, start.y).expect("ready");
    host.pointer_move(start.x + 150.0, start.y + 40.0).expect("ready");
    assert_eq!(host.cancel_drag(), Ok(true));
    assert_eq!(host.position_of("cafe-1"), Ok(before));
}

#[test]
fn test_drag_past_grid_edge_commits_clamped_cell() {
    let host = ready_host();
    let beyond = |x: f32, y: f32| {
        host.with_world(|world| world.camera().world_to_screen(world.transform().backend_float_to_iso(x, y)))
            .expect("ready")
    };

    let start = screen_of(&host, 10, 10);
    let past_east = beyond(130.0, 15.0);
    host.pointer_down(start.x, start.y).expect("ready");
    host.pointer_move(past_east.x, past_east.y).expect("ready");
    let commit = host.pointer_up(past_east.x, past_east.y).expect("ready");
    assert_eq!(commit, Some(DragCommit { id: "cafe-1".into(), x: 100, y: 15 }));

    let from = screen_of(&host, 100, 15);
    let past_north = beyond(-20.0, 40.0);
    assert_eq!(host.pointer_down(from.x, from.y), Ok(true));
    let commit = host.pointer_up(past_north.x, past_north.y).expect("ready");
    assert_eq!(commit, Some(DragCommit { id: "cafe-1".into(), x: 0, y: 40 }));
    assert_eq!(
        host.position_of("cafe-1"),
        Ok(Some(host.with_world(|world| world.transform().backend_to_iso(GridPoint::new(0, 40))).expect("ready")))
    );
}
