//! # Render Host
//!
//! The explicit context object an embedding shell holds. It is a cheap handle
//! (`Rc` inside), so the shell, its callbacks and the init future can all keep
//! one.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──init──▶ Initializing ──surface ready──▶ Ready
//!   ▲                 │                            │
//!   └──── init ◀── Destroyed ◀────── destroy ──────┘
//! ```
//!
//! - `init` is idempotent: concurrent callers share one pending future and the
//!   factory is asked for a surface once per attempt.
//! - `destroy` during `Initializing` aborts the attempt; its waiters get
//!   [`HostError::Aborted`] and may call `init` again.
//! - `destroy` is idempotent. Called from inside a host operation (an event
//!   handler, a tween callback) it is deferred until that operation returns.
//!
//! Inputs pushed before the host is ready are buffered (latest wins) and
//! applied when initialization completes.
//!
//! ## Tick order
//!
//! Tweens, entity settling and animation, weather, frame callbacks in
//! registration order, paint and present, then event dispatch.

use std::cell::{Cell, RefCell, RefMut};
use std::rc::{Rc, Weak};

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};

use crate::core::config::EngineConfig;
use crate::entities::{DragCommit, EntityBrief, FrameChange, ReconcileReport, StructureBrief};
use crate::environment::{DayPhase, DaylightEvent, WeatherMode};
use crate::events::{Event, EventArg, EventHandler, EventSystem, EventType};
use crate::foundation::math::Vec2;
use crate::foundation::time::FrameClock;
use crate::coords::IsoPoint;

use super::error::HostError;
use super::surface::{RenderSurface, SurfaceFactory};
use super::world::{Hit, SceneWorld};

/// Shared future returned by [`RenderHost::init`]
pub type InitFuture = Shared<LocalBoxFuture<'static, Result<(), HostError>>>;

/// Handle returned when registering a frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Timing passed to frame callbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Seconds advanced this tick, after capping
    pub delta_seconds: f32,
    /// Seconds since the host became ready
    pub total_seconds: f32,
    /// Ticks since the host became ready
    pub frame: u64,
}

/// Coarse lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// Never initialized
    Idle,
    /// Waiting for the surface
    Initializing,
    /// Ticking and painting
    Ready,
    /// Torn down; `init` may be called again
    Destroyed,
}

type FrameCallback = Rc<RefCell<dyn FnMut(&FrameInfo)>>;
type DragCallback = Rc<RefCell<dyn FnMut(&DragCommit)>>;

struct Runtime {
    world: SceneWorld,
    surface: Box<dyn RenderSurface>,
    clock: FrameClock,
}

enum Phase {
    Idle,
    Initializing { attempt: u64, future: InitFuture },
    Ready(Box<Runtime>),
    Destroyed,
}

#[derive(Default)]
struct PendingInputs {
    entities: Option<Vec<EntityBrief>>,
    structures: Option<Vec<StructureBrief>>,
    hour: Option<f32>,
    weather: Option<WeatherMode>,
    size: Option<(u32, u32)>,
    drag_enabled: Option<bool>,
}

struct HostInner {
    config: EngineConfig,
    phase: Phase,
    attempt: u64,
    pending: PendingInputs,
    events: EventSystem,
}

#[derive(Default)]
struct Callbacks {
    next_id: u64,
    frame: Vec<(CallbackId, FrameCallback)>,
    drag_commit: Option<DragCallback>,
}

struct HostShared {
    inner: RefCell<HostInner>,
    callbacks: RefCell<Callbacks>,
    deferred_destroy: Cell<bool>,
}

/// Owns the scene, its subsystems and the surface for one view
#[derive(Clone)]
pub struct RenderHost {
    shared: Rc<HostShared>,
}

impl RenderHost {
    /// Create an idle host; the configuration is validated up front
    pub fn new(config: EngineConfig) -> Result<Self, HostError> {
        config.validate()?;
        Ok(Self {
            shared: Rc::new(HostShared {
                inner: RefCell::new(HostInner {
                    config,
                    phase: Phase::Idle,
                    attempt: 0,
                    pending: PendingInputs::default(),
                    events: EventSystem::new(),
                }),
                callbacks: RefCell::new(Callbacks::default()),
                deferred_destroy: Cell::new(false),
            }),
        })
    }

    fn inner(&self) -> Result<RefMut<'_, HostInner>, HostError> {
        self.shared.inner.try_borrow_mut().map_err(|_| HostError::Reentrant)
    }

    /// Current lifecycle state
    ///
    /// Reports `Ready` while a host operation is running, since only a ready
    /// host runs callbacks.
    pub fn state(&self) -> HostState {
        match self.shared.inner.try_borrow() {
            Ok(inner) => match inner.phase {
                Phase::Idle => HostState::Idle,
                Phase::Initializing { .. } => HostState::Initializing,
                Phase::Ready(_) => HostState::Ready,
                Phase::Destroyed => HostState::Destroyed,
            },
            Err(_) => HostState::Ready,
        }
    }

    /// Whether the host is ticking
    pub fn is_ready(&self) -> bool {
        self.state() == HostState::Ready
    }

    /// Start (or join) initialization
    ///
    /// Every call made while an attempt is pending returns a clone of the same
    /// future. Once ready, returns an already resolved future.
    pub fn init(&self, factory: Rc<dyn SurfaceFactory>) -> InitFuture {
        let mut inner = match self.inner() {
            Ok(inner) => inner,
            Err(error) => return future::ready(Err(error)).boxed_local().shared(),
        };
        match &inner.phase {
            Phase::Ready(_) => return future::ready(Ok(())).boxed_local().shared(),
            Phase::Initializing { future, .. } => return future.clone(),
            Phase::Idle | Phase::Destroyed => {}
        }

        inner.attempt += 1;
        let attempt = inner.attempt;
        let (width, height) = inner.pending.size.unwrap_or((inner.config.host.width, inner.config.host.height));
        log::info!("Render host initializing (attempt {attempt}, {width}x{height})");

        let surface = factory.create(width, height);
        let shared: Weak<HostShared> = Rc::downgrade(&self.shared);
        let init = async move {
            let result = surface.await;
            match shared.upgrade() {
                Some(shared) => RenderHost { shared }.complete_init(attempt, result),
                None => Err(HostError::Aborted),
            }
        }
        .boxed_local()
        .shared();

        inner.phase = Phase::Initializing {
            attempt,
            future: init.clone(),
        };
        init
    }

    fn complete_init(&self, attempt: u64, surface: Result<Box<dyn RenderSurface>, HostError>) -> Result<(), HostError> {
        let mut inner = self.inner()?;
        match inner.phase {
            Phase::Initializing { attempt: current, .. } if current == attempt => {}
            _ => {
                log::warn!("Initialization attempt {attempt} aborted");
                return Err(HostError::Aborted);
            }
        }

        let mut surface = match surface {
            Ok(surface) => surface,
            Err(error) => {
                log::warn!("Initialization attempt {attempt} failed: {error}");
                inner.phase = Phase::Idle;
                return Err(error);
            }
        };

        let mut world = SceneWorld::new(&inner.config);
        let pending = std::mem::take(&mut inner.pending);
        if let Some((width, height)) = pending.size {
            world.resize(width, height);
            surface.resize(width, height);
        }
        if let Some(enabled) = pending.drag_enabled {
            world.set_drag_enabled(enabled);
        }
        if let Some(mode) = pending.weather {
            world.set_weather(mode);
        }
        if let Some(structures) = &pending.structures {
            world.sync_structures(structures);
        }
        if let Some(entities) = &pending.entities {
            world.sync_entities(entities);
        }
        if let Some(hour) = pending.hour {
            world.set_hour(hour);
        }

        inner.phase = Phase::Ready(Box::new(Runtime {
            world,
            surface,
            clock: FrameClock::new(),
        }));
        log::info!("Render host ready");
        Ok(())
    }

    /// Tear everything down; safe to call repeatedly and mid-init
    pub fn destroy(&self) {
        let Ok(mut inner) = self.shared.inner.try_borrow_mut() else {
            log::debug!("Destroy requested during a host operation, deferring");
            self.shared.deferred_destroy.set(true);
            return;
        };
        self.shared.deferred_destroy.set(false);
        // callbacks go before the subsystems they may reference
        if let Ok(mut callbacks) = self.shared.callbacks.try_borrow_mut() {
            callbacks.frame.clear();
            callbacks.drag_commit = None;
        }
        match std::mem::replace(&mut inner.phase, Phase::Destroyed) {
            Phase::Destroyed => {
                log::debug!("Render host already destroyed");
                return;
            }
            Phase::Initializing { attempt, .. } => {
                log::warn!("Render host destroyed during initialization attempt {attempt}");
            }
            Phase::Ready(mut runtime) => {
                runtime.world.clear();
                log::info!("Render host destroyed after {} frames", runtime.clock.frame_count());
            }
            Phase::Idle => log::info!("Render host destroyed before initialization"),
        }
        inner.pending = PendingInputs::default();
        inner.events.reset();
    }

    fn finish(&self) {
        if self.shared.deferred_destroy.get() {
            self.destroy();
        }
    }

    fn with_runtime<R>(&self, op: impl FnOnce(&mut Runtime, &mut EventSystem) -> R) -> Result<R, HostError> {
        let result = {
            let mut inner = self.inner()?;
            let HostInner { phase, events, .. } = &mut *inner;
            match phase {
                Phase::Ready(runtime) => Ok(op(runtime, events)),
                Phase::Destroyed => Err(HostError::Destroyed),
                Phase::Idle | Phase::Initializing { .. } => Err(HostError::NotInitialized),
            }
        };
        self.finish();
        result
    }

    /// Apply to the world when ready, otherwise buffer
    fn apply_or_buffer<R>(
        &self,
        op: impl FnOnce(&mut Runtime, &mut EventSystem) -> R,
        buffer: impl FnOnce(&mut PendingInputs),
    ) -> Result<Option<R>, HostError> {
        let result = {
            let mut inner = self.inner()?;
            let HostInner { phase, events, pending, .. } = &mut *inner;
            match phase {
                Phase::Ready(runtime) => Some(op(runtime, events)),
                _ => {
                    buffer(pending);
                    None
                }
            }
        };
        self.finish();
        Ok(result)
    }

    /// Advance one frame and paint it
    pub fn tick(&self, delta_seconds: f32) -> Result<(), HostError> {
        let info = self.with_runtime(|runtime, events| {
            let delta_seconds = runtime.clock.advance(delta_seconds);
            events.update_time(f64::from(runtime.clock.total_time()));
            let changes = runtime.world.advance(delta_seconds);
            send_frame_changes(events, changes);
            FrameInfo {
                delta_seconds,
                total_seconds: runtime.clock.total_time(),
                frame: runtime.clock.frame_count(),
            }
        })?;

        self.run_frame_callbacks(&info);

        match self.with_runtime(|runtime, events| {
            let frame = runtime.world.paint();
            let presented = runtime.surface.present(&frame);
            events.dispatch();
            presented
        }) {
            Ok(presented) => presented,
            // a callback tore the host down; the tick itself succeeded
            Err(HostError::Destroyed) => Ok(()),
            Err(error) => Err(error),
        }
    }

    fn run_frame_callbacks(&self, info: &FrameInfo) {
        let snapshot: Vec<FrameCallback> = match self.shared.callbacks.try_borrow() {
            Ok(callbacks) => callbacks.frame.iter().map(|(_, callback)| Rc::clone(callback)).collect(),
            Err(_) => return,
        };
        for callback in snapshot {
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (&mut *callback)(info);
            }
            if !self.is_ready() {
                break;
            }
        }
    }

    /// Register a callback run every tick after the scene has advanced
    pub fn on_frame(&self, callback: impl FnMut(&FrameInfo) + 'static) -> CallbackId {
        let callback: FrameCallback = Rc::new(RefCell::new(callback));
        let mut callbacks = self.shared.callbacks.borrow_mut();
        callbacks.next_id += 1;
        let id = CallbackId(callbacks.next_id);
        callbacks.frame.push((id, callback));
        id
    }

    /// Unregister a frame callback; returns false if it was not registered
    pub fn remove_frame_callback(&self, id: CallbackId) -> bool {
        let mut callbacks = self.shared.callbacks.borrow_mut();
        let before = callbacks.frame.len();
        callbacks.frame.retain(|(registered, _)| *registered != id);
        callbacks.frame.len() != before
    }

    /// Number of registered frame callbacks
    pub fn frame_callback_count(&self) -> usize {
        self.shared.callbacks.borrow().frame.len()
    }

    /// Set the callback fired once per completed structure drag
    pub fn on_drag_commit(&self, callback: impl FnMut(&DragCommit) + 'static) {
        let callback: DragCallback = Rc::new(RefCell::new(callback));
        self.shared.callbacks.borrow_mut().drag_commit = Some(callback);
    }

    /// Register an event handler
    pub fn register_handler(&self, event_type: EventType, handler: Box<dyn EventHandler>) -> Result<(), HostError> {
        self.inner()?.events.register_handler(event_type, handler);
        Ok(())
    }

    /// Push the authoritative entity list
    ///
    /// Returns the reconcile counts, or `None` when buffered until ready.
    pub fn sync_entities(&self, briefs: &[EntityBrief]) -> Result<Option<ReconcileReport>, HostError> {
        self.apply_or_buffer(
            |runtime, _| runtime.world.sync_entities(briefs),
            |pending| pending.entities = Some(briefs.to_vec()),
        )
    }

    /// Push the authoritative structure list
    pub fn sync_structures(&self, briefs: &[StructureBrief]) -> Result<Option<ReconcileReport>, HostError> {
        self.apply_or_buffer(
            |runtime, _| runtime.world.sync_structures(briefs),
            |pending| pending.structures = Some(briefs.to_vec()),
        )
    }

    /// Push the external clock
    pub fn set_hour(&self, hour: f32) -> Result<(), HostError> {
        self.apply_or_buffer(
            |runtime, events| {
                let daylight = runtime.world.set_hour(hour);
                send_daylight_events(events, daylight, hour);
                events.dispatch();
            },
            |pending| pending.hour = Some(hour),
        )
        .map(|_| ())
    }

    /// Switch the weather
    pub fn set_weather(&self, mode: WeatherMode) -> Result<(), HostError> {
        self.apply_or_buffer(
            |runtime, events| {
                if runtime.world.set_weather(mode) {
                    let time = events.current_time();
                    events.send(Event::new(EventType::WeatherChanged, time).with_arg("weather", EventArg::Weather(mode)));
                    events.dispatch();
                }
            },
            |pending| pending.weather = Some(mode),
        )
        .map(|_| ())
    }

    /// Resize the viewport
    pub fn resize(&self, width: u32, height: u32) -> Result<(), HostError> {
        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to {width}x{height}");
            return Ok(());
        }
        self.apply_or_buffer(
            |runtime, _| {
                runtime.world.resize(width, height);
                runtime.surface.resize(width, height);
            },
            |pending| pending.size = Some((width, height)),
        )
        .map(|_| ())
    }

    /// Allow or forbid structure dragging
    pub fn set_drag_enabled(&self, enabled: bool) -> Result<(), HostError> {
        self.apply_or_buffer(
            |runtime, _| runtime.world.set_drag_enabled(enabled),
            |pending| pending.drag_enabled = Some(enabled),
        )
        .map(|_| ())
    }

    /// Pointer pressed at a screen position
    pub fn pointer_down(&self, x: f32, y: f32) -> Result<bool, HostError> {
        self.with_runtime(|runtime, _| runtime.world.pointer_down(Vec2::new(x, y)))
    }

    /// Pointer moved to a screen position
    pub fn pointer_move(&self, x: f32, y: f32) -> Result<bool, HostError> {
        self.with_runtime(|runtime, _| runtime.world.pointer_move(Vec2::new(x, y)))
    }

    /// Pointer released at a screen position
    ///
    /// A completed drag fires the drag-commit callback once, after the host
    /// has been updated, and a `DragCommitted` event.
    pub fn pointer_up(&self, x: f32, y: f32) -> Result<Option<DragCommit>, HostError> {
        let commit = self.with_runtime(|runtime, events| {
            let commit = runtime.world.pointer_up(Vec2::new(x, y))?;
            let time = events.current_time();
            events.send(
                Event::new(EventType::DragCommitted, time)
                    .with_arg("entity_id", EventArg::EntityId(commit.id.clone()))
                    .with_arg("grid", EventArg::Grid(commit.x, commit.y)),
            );
            events.dispatch();
            Some(commit)
        })?;

        if let Some(commit) = &commit {
            let callback = self.shared.callbacks.borrow().drag_commit.clone();
            if let Some(callback) = callback {
                if let Ok(mut callback) = callback.try_borrow_mut() {
                    (&mut *callback)(commit);
                }
            }
        }
        Ok(commit)
    }

    /// Abandon a drag in progress
    pub fn cancel_drag(&self) -> Result<bool, HostError> {
        self.with_runtime(|runtime, _| runtime.world.cancel_drag())
    }

    /// What lies under a screen position
    pub fn hit_test(&self, x: f32, y: f32) -> Result<Option<Hit>, HostError> {
        self.with_runtime(|runtime, _| runtime.world.hit_test(Vec2::new(x, y)))
    }

    /// Pan the camera by a screen-space delta
    pub fn pan_by(&self, dx: f32, dy: f32) -> Result<(), HostError> {
        self.with_runtime(|runtime, _| runtime.world.camera_mut().pan_by(Vec2::new(dx, dy)))
    }

    /// Zoom by `factor` keeping the world point under `(x, y)` fixed
    pub fn zoom_at(&self, x: f32, y: f32, factor: f32) -> Result<(), HostError> {
        self.with_runtime(|runtime, _| runtime.world.camera_mut().zoom_at(Vec2::new(x, y), factor))
    }

    /// Center the camera on an entity or structure; false if the id is unknown
    pub fn focus_on(&self, id: &str) -> Result<bool, HostError> {
        self.with_runtime(|runtime, _| match runtime.world.position_of(id) {
            Some(position) => {
                runtime.world.camera_mut().focus_on(position);
                true
            }
            None => false,
        })
    }

    /// World position of an entity or structure
    pub fn position_of(&self, id: &str) -> Result<Option<IsoPoint>, HostError> {
        self.with_runtime(|runtime, _| runtime.world.position_of(id))
    }

    /// Read access to the world, for inspection from callbacks and tests
    pub fn with_world<R>(&self, op: impl FnOnce(&SceneWorld) -> R) -> Result<R, HostError> {
        self.with_runtime(|runtime, _| op(&runtime.world))
    }
}

fn send_frame_changes(events: &mut EventSystem, changes: Vec<FrameChange>) {
    let time = events.current_time();
    for change in changes {
        events.send(
            Event::new(EventType::FrameChanged, time)
                .with_arg("entity_id", EventArg::EntityId(change.id))
                .with_arg("frame", EventArg::Frame(change.frame))
                .with_arg("state", EventArg::State(change.state)),
        );
    }
}

fn send_daylight_events(events: &mut EventSystem, daylight: Vec<DaylightEvent>, hour: f32) {
    let time = events.current_time();
    for event in daylight {
        let (event_type, phase): (EventType, Option<DayPhase>) = match event {
            DaylightEvent::NightStarted => (EventType::NightStarted, None),
            DaylightEvent::DayStarted => (EventType::DayStarted, None),
            DaylightEvent::PhaseReached(phase) => (EventType::PhaseReached, Some(phase)),
        };
        let mut event = Event::new(event_type, time).with_arg("hour", EventArg::Hour(hour));
        if let Some(phase) = phase {
            event = event.with_arg("phase", EventArg::Phase(phase));
        }
        events.send(event);
    }
}
