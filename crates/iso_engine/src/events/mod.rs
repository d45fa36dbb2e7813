//! Event system for view notifications
//!
//! Key principles:
//! - Key-value arguments (no order dependency)
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Registration system (only notify interested handlers)
//! - Queuing support (immediate + deferred delivery)

use std::collections::HashMap;

use crate::animation::AnimationState;
use crate::environment::{DayPhase, WeatherMode};

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Day turned into night
    NightStarted,
    /// Night turned into day
    DayStarted,
    /// The clock moved forward past a named phase
    PhaseReached,
    /// An entity's animation advanced a frame
    FrameChanged,
    /// A structure drag finished on a grid cell
    DragCommitted,
    /// The weather mode switched
    WeatherChanged,
}

/// Variant for type-safe event arguments
#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    /// External entity or structure id
    EntityId(String),
    /// Backend grid coordinates
    Grid(i32, i32),
    /// Animation frame index
    Frame(usize),
    /// Animation state
    State(AnimationState),
    /// Day phase
    Phase(DayPhase),
    /// Weather mode
    Weather(WeatherMode),
    /// Hour of day
    Hour(f32),
}

/// Event with type ID and key-value arguments
#[derive(Debug, Clone)]
pub struct Event {
    /// Type of event
    pub event_type: EventType,
    /// Host time when the event was created (seconds)
    pub timestamp: f64,
    args: HashMap<&'static str, EventArg>,
}

impl Event {
    /// Create a new event with the given type and timestamp
    pub fn new(event_type: EventType, timestamp: f64) -> Self {
        Self {
            event_type,
            timestamp,
            args: HashMap::new(),
        }
    }

    /// Add an argument to the event (builder pattern)
    pub fn with_arg(mut self, key: &'static str, value: EventArg) -> Self {
        self.args.insert(key, value);
        self
    }

    /// Get an argument by key
    pub fn get_arg(&self, key: &str) -> Option<&EventArg> {
        self.args.get(key)
    }

    /// Get the entity id argument if present
    pub fn get_entity_id(&self) -> Option<&str> {
        match self.get_arg("entity_id") {
            Some(EventArg::EntityId(id)) => Some(id),
            _ => None,
        }
    }

    /// Get the grid position argument if present
    pub fn get_grid(&self) -> Option<(i32, i32)> {
        match self.get_arg("grid") {
            Some(EventArg::Grid(x, y)) => Some((*x, *y)),
            _ => None,
        }
    }

    /// Get the frame index argument if present
    pub fn get_frame(&self) -> Option<usize> {
        match self.get_arg("frame") {
            Some(EventArg::Frame(frame)) => Some(*frame),
            _ => None,
        }
    }

    /// Get the animation state argument if present
    pub fn get_state(&self) -> Option<AnimationState> {
        match self.get_arg("state") {
            Some(EventArg::State(state)) => Some(*state),
            _ => None,
        }
    }

    /// Get the phase argument if present
    pub fn get_phase(&self) -> Option<DayPhase> {
        match self.get_arg("phase") {
            Some(EventArg::Phase(phase)) => Some(*phase),
            _ => None,
        }
    }

    /// Get the weather argument if present
    pub fn get_weather(&self) -> Option<WeatherMode> {
        match self.get_arg("weather") {
            Some(EventArg::Weather(mode)) => Some(*mode),
            _ => None,
        }
    }

    /// Get the hour argument if present
    pub fn get_hour(&self) -> Option<f32> {
        match self.get_arg("hour") {
            Some(EventArg::Hour(hour)) => Some(*hour),
            _ => None,
        }
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
/// Returns false to allow forwarding to other handlers
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &Event) -> bool;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> bool,
{
    fn on_event(&mut self, event: &Event) -> bool {
        self(event)
    }
}

/// Event system with registration and queuing
/// Follows chain of responsibility pattern
pub struct EventSystem {
    immediate_queue: Vec<Event>,
    deferred_queue: Vec<(f64, Event)>,
    handlers: HashMap<EventType, Vec<Box<dyn EventHandler>>>,
    current_time: f64,
}

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self {
            immediate_queue: Vec::new(),
            deferred_queue: Vec::new(),
            handlers: HashMap::new(),
            current_time: 0.0,
        }
    }

    /// Update current time (seconds since start)
    pub fn update_time(&mut self, time: f64) {
        self.current_time = time;
    }

    /// Current time as last set
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Register a handler for a specific event type
    /// Only handlers registered for this type will be notified
    pub fn register_handler(&mut self, event_type: EventType, handler: Box<dyn EventHandler>) {
        self.handlers.entry(event_type).or_default().push(handler);
    }

    /// Number of handlers registered for a type
    pub fn handler_count(&self, event_type: EventType) -> usize {
        self.handlers.get(&event_type).map_or(0, Vec::len)
    }

    /// Send event for immediate handling on the next dispatch
    pub fn send(&mut self, event: Event) {
        self.immediate_queue.push(event);
    }

    /// Post event for deferred delivery at specified time
    pub fn post(&mut self, delivery_time: f64, event: Event) {
        self.deferred_queue.push((delivery_time, event));
    }

    /// Events waiting in either queue
    pub fn pending_count(&self) -> usize {
        self.immediate_queue.len() + self.deferred_queue.len()
    }

    /// Dispatch all pending events
    /// Processes immediate queue first, then due deferred events
    pub fn dispatch(&mut self) {
        let immediate = std::mem::take(&mut self.immediate_queue);
        for event in immediate {
            self.dispatch_event(&event);
        }

        let mut i = 0;
        while i < self.deferred_queue.len() {
            if self.deferred_queue[i].0 <= self.current_time {
                let (_, event) = self.deferred_queue.remove(i);
                self.dispatch_event(&event);
            } else {
                i += 1;
            }
        }
    }

    /// Dispatch single event to registered handlers
    /// Stops on first handler that returns true (consumed)
    fn dispatch_event(&mut self, event: &Event) {
        if let Some(handlers) = self.handlers.get_mut(&event.event_type) {
            for handler in handlers.iter_mut() {
                if handler.on_event(event) {
                    break;
                }
            }
        }
    }

    /// Clear all queued events
    pub fn clear(&mut self) {
        self.immediate_queue.clear();
        self.deferred_queue.clear();
    }

    /// Drop every handler and queued event
    pub fn reset(&mut self) {
        self.clear();
        self.handlers.clear();
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(consume: bool) -> (Rc<RefCell<Vec<EventType>>>, Box<dyn EventHandler>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let handler = move |event: &Event| {
            sink.borrow_mut().push(event.event_type);
            consume
        };
        (seen, Box::new(handler))
    }

    #[test]
    fn test_immediate_dispatch() {
        let mut system = EventSystem::new();
        let (seen, handler) = recorder(false);
        system.register_handler(EventType::DragCommitted, handler);

        let event = Event::new(EventType::DragCommitted, 0.0)
            .with_arg("entity_id", EventArg::EntityId("cafe-1".into()))
            .with_arg("grid", EventArg::Grid(20, 15));
        assert_eq!(event.get_grid(), Some((20, 15)));
        assert_eq!(event.get_entity_id(), Some("cafe-1"));

        system.send(event);
        system.dispatch();
        assert_eq!(*seen.borrow(), vec![EventType::DragCommitted]);
        assert_eq!(system.pending_count(), 0);
    }

    #[test]
    fn test_deferred_dispatch() {
        let mut system = EventSystem::new();
        let (seen, handler) = recorder(false);
        system.register_handler(EventType::PhaseReached, handler);
        system.post(1.0, Event::new(EventType::PhaseReached, 1.0));

        system.update_time(0.5);
        system.dispatch();
        assert!(seen.borrow().is_empty());

        system.update_time(1.0);
        system.dispatch();
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_event_consumption() {
        let mut system = EventSystem::new();
        let (first, consuming) = recorder(true);
        let (second, passive) = recorder(false);
        system.register_handler(EventType::NightStarted, consuming);
        system.register_handler(EventType::NightStarted, passive);

        system.send(Event::new(EventType::NightStarted, 0.0));
        system.dispatch();
        assert_eq!(first.borrow().len(), 1);
        assert!(second.borrow().is_empty());
    }

    #[test]
    fn test_unregistered_types_ignored() {
        let mut system = EventSystem::new();
        let (seen, handler) = recorder(false);
        system.register_handler(EventType::DayStarted, handler);
        system.send(Event::new(EventType::WeatherChanged, 0.0));
        system.dispatch();
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_reset_drops_handlers() {
        let mut system = EventSystem::new();
        let (_, handler) = recorder(false);
        system.register_handler(EventType::FrameChanged, handler);
        system.reset();
        assert_eq!(system.handler_count(EventType::FrameChanged), 0);
    }
}
