//! Town viewer demo
//!
//! Drives the isometric engine headlessly through one simulated day: a small
//! town feed, residents walking between buildings, weather changes and a
//! structure dragged to a new lot.
//!
//! Usage: `town_viewer [config.toml|config.ron]`

use std::cell::Cell;
use std::rc::Rc;

use futures::executor::block_on;
use iso_engine::environment::format_clock;
use iso_engine::prelude::*;

/// Frames rendered per simulated half hour
const FRAMES_PER_STEP: u32 = 30;
const FRAME_SECONDS: f32 = 1.0 / 60.0;

fn town() -> Vec<StructureBrief> {
    vec![
        StructureBrief::new("s-cafe", "Cafe", 12.0, 14.0).with_category("food"),
        StructureBrief::new("s-park", "Park", 45.0, 60.0).with_category("park").with_size(12.0, 12.0),
        StructureBrief::new("s-office", "Office", 72.0, 28.0).with_category("work"),
        StructureBrief::new("s-home", "Homes", 30.0, 82.0).with_category("home").with_size(16.0, 8.0),
    ]
}

/// Where everyone is at a given hour
fn residents(hour: f32) -> Vec<EntityBrief> {
    let (morning, evening) = if (8.0..17.0).contains(&hour) { ("Office", "Cafe") } else { ("Homes", "Park") };
    vec![
        EntityBrief::new("r-ada", "Ada", morning).with_activity("working"),
        EntityBrief::new("r-bo", "Bo", evening).with_activity("eating"),
        EntityBrief::new("r-cy", "Cy", morning).with_activity("talking"),
        EntityBrief::new("r-di", "Di", "Homes").with_activity(if hour >= 22.0 { "sleeping" } else { "idle" }),
    ]
}

fn weather_at(hour: f32) -> WeatherMode {
    match hour {
        h if (13.0..16.0).contains(&h) => WeatherMode::Precipitation,
        h if (11.0..13.0).contains(&h) => WeatherMode::Overcast,
        _ => WeatherMode::Calm,
    }
}

fn run(config: EngineConfig) -> Result<(), HostError> {
    let host = RenderHost::new(config)?;
    let factory = Rc::new(HeadlessSurfaceFactory::new());

    // inputs arriving before the surface exists are buffered
    host.sync_structures(&town())?;
    host.sync_entities(&residents(6.0))?;
    host.set_hour(6.0)?;

    block_on(host.init(factory.clone()))?;

    let phase_changes = Rc::new(Cell::new(0_u32));
    for event_type in [EventType::NightStarted, EventType::DayStarted, EventType::PhaseReached] {
        let counter = Rc::clone(&phase_changes);
        host.register_handler(
            event_type,
            Box::new(move |event: &Event| {
                counter.set(counter.get() + 1);
                log::info!("{:?} at {}", event.event_type, event.get_hour().map_or_else(String::new, format_clock));
                false
            }),
        )?;
    }
    host.on_drag_commit(|commit| log::info!("{} committed to ({}, {})", commit.id, commit.x, commit.y));

    let mut hour = 6.0;
    while hour < 24.0 {
        host.set_hour(hour)?;
        host.set_weather(weather_at(hour))?;
        if let Some(report) = host.sync_entities(&residents(hour))? {
            if report.changed_membership() || report.updated > 0 {
                log::debug!("{} reconciled: {report:?}", format_clock(hour));
            }
        }
        for _ in 0..FRAMES_PER_STEP {
            host.tick(FRAME_SECONDS)?;
        }

        if (hour - 12.0).abs() < f32::EPSILON {
            drag_park(&host)?;
        }
        hour += 0.5;
    }

    let log = factory.frame_log();
    let log = log.borrow();
    let commands = log.last_frame.as_ref().map_or(0, |frame| frame.commands().len());
    log::info!(
        "Presented {} frames at {}x{}, {} commands in the last one, {} lighting events",
        log.presented,
        log.size.0,
        log.size.1,
        commands,
        phase_changes.get()
    );

    host.destroy();
    Ok(())
}

/// Move the park as a user would, through screen-space pointer events
fn drag_park(host: &RenderHost) -> Result<(), HostError> {
    let to_screen = |x: i32, y: i32| {
        host.with_world(|world| world.camera().world_to_screen(world.transform().backend_to_iso(GridPoint::new(x, y))))
    };
    let from = to_screen(45, 60)?;
    let to = to_screen(55, 50)?;
    if host.pointer_down(from.x, from.y)? {
        host.pointer_move((from.x + to.x) / 2.0, (from.y + to.y) / 2.0)?;
        host.pointer_up(to.x, to.y)?;
    } else {
        log::warn!("Park was not under the pointer");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env().filter_level(log::LevelFilter::Info).init();
    log::info!("Starting town viewer");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {path}");
            EngineConfig::load_from_file(&path)?
        }
        None => EngineConfig::default(),
    };

    match run(config) {
        Ok(()) => {
            log::info!("Town viewer finished");
            Ok(())
        }
        Err(e) => {
            log::error!("Town viewer failed: {e}");
            Err(e.into())
        }
    }
}
