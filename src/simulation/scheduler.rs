//! Discrete-event scheduler
//!
//! Owns the logical clock and the pending-event queue. Everything that acts
//! against simulated time goes through a shared [`EventScheduler`].

use log::{debug, info, warn};
use ordered_float::OrderedFloat;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::event_queue::MinQueue;
use super::types::{SimTime, DEFAULT_EPOCH};

/// Callback run when an event fires
pub type Action = Box<dyn FnOnce(&Event)>;

/// A callback bound to an absolute point on the logical clock
pub struct Event {
    t: SimTime,
    action: Option<Action>,
}

impl Event {
    pub fn new<F>(t: SimTime, action: F) -> Self
    where
        F: FnOnce(&Event) + 'static,
    {
        Self {
            t,
            action: Some(Box::new(action)),
        }
    }

    /// An event that does nothing when fired
    pub fn noop(t: SimTime) -> Self {
        Self { t, action: None }
    }

    pub fn time(&self) -> SimTime {
        self.t
    }

    /// Whether the event has already fired (or never had an action)
    pub fn is_spent(&self) -> bool {
        self.action.is_none()
    }

    /// Run the action. Subsequent calls do nothing.
    pub fn fire(&mut self) {
        if let Some(action) = self.action.take() {
            let event: &Event = self;
            action(event);
        }
    }

    /// Report a state change that happened while this event fired
    pub fn log(&self, message: &str) {
        info!("{}: {}", self.t, message);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("t", &self.t)
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Outcome of driving the scheduler to a horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Number of events fired during this run
    pub events_fired: u64,
    /// Clock value when the run stopped
    pub final_time: SimTime,
    /// True if the queue emptied before the horizon was passed
    pub drained: bool,
}

/// The shared logical clock plus its event queue
///
/// Interior mutability lets callbacks schedule further events while
/// [`EventScheduler::process`] is firing them.
pub struct EventScheduler {
    queue: RefCell<MinQueue<OrderedFloat<SimTime>, Event>>,
    now: Cell<SimTime>,
    fired: Cell<u64>,
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::with_epoch(DEFAULT_EPOCH)
    }

    /// Create a scheduler whose clock starts at `epoch`
    pub fn with_epoch(epoch: SimTime) -> Self {
        Self {
            queue: RefCell::new(MinQueue::new()),
            now: Cell::new(epoch),
            fired: Cell::new(0),
        }
    }

    /// Convenience for the common case of sharing one scheduler
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    pub fn time(&self) -> SimTime {
        self.now.get()
    }

    /// Queue an event. Events in the past are pulled forward to now.
    pub fn schedule(&self, mut event: Event) {
        let now = self.now.get();
        if event.t.is_nan() || event.t < now {
            warn!(
                "Event scheduled at {} is before the current time {}, firing it at {}",
                event.t, now, now
            );
            event.t = now;
        }
        let mut queue = self.queue.borrow_mut();
        queue.insert(OrderedFloat(event.t), event);
        debug!("Scheduled event, {} pending", queue.len());
    }

    /// Pop the earliest event, advance the clock to it and fire it
    ///
    /// Returns `None` without touching the clock when nothing is pending.
    pub fn process(&self) -> Option<Event> {
        // The queue borrow must end before firing: actions schedule more events
        let (t, mut event) = self.queue.borrow_mut().pop_min()?;
        self.now.set(t.into_inner());
        self.fired.set(self.fired.get() + 1);
        event.fire();
        Some(event)
    }

    /// Number of events waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Time of the next pending event, if any
    pub fn next_event_time(&self) -> Option<SimTime> {
        self.queue.borrow().peek_key().map(|t| t.into_inner())
    }

    /// Total number of events fired since creation
    pub fn events_fired(&self) -> u64 {
        self.fired.get()
    }

    /// Keep firing events while the clock has not passed `horizon`
    ///
    /// Stops early, with `drained` set, if the queue runs dry.
    pub fn run_until(&self, horizon: SimTime) -> RunSummary {
        let mut events_fired = 0;
        let mut drained = false;
        while self.time() <= horizon {
            if self.process().is_none() {
                drained = true;
                break;
            }
            events_fired += 1;
        }
        RunSummary {
            events_fired,
            final_time: self.time(),
            drained,
        }
    }
}

/// Anything that acts against the shared clock
pub trait TimedEntity {
    fn scheduler(&self) -> &Rc<EventScheduler>;

    fn time(&self) -> SimTime {
        self.scheduler().time()
    }

    /// Run `action` `dt` time units from now
    fn schedule<F>(&self, dt: SimTime, action: F)
    where
        F: FnOnce(&Event) + 'static,
    {
        let t = self.time() + dt;
        self.scheduler().schedule(Event::new(t, action));
    }
}

/// The bare timed capability, with no state of its own
#[derive(Clone)]
pub struct TimedObject {
    scheduler: Rc<EventScheduler>,
}

impl TimedObject {
    pub fn new(scheduler: Rc<EventScheduler>) -> Self {
        Self { scheduler }
    }
}

impl TimedEntity for TimedObject {
    fn scheduler(&self) -> &Rc<EventScheduler> {
        &self.scheduler
    }
}
