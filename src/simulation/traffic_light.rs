//! Traffic light state machine
//!
//! A light guards a set of mutually non-conflicting movements and cycles
//! red -> green -> yellow -> red, one toggle at a time.

use anyhow::Result;
use log::{debug, error};
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::geometry::{any_mappings_intersect, mappings_intersect};
use super::lane::LaneDestinationMapping;
use super::request::Request;
use super::scheduler::{Event, EventScheduler, TimedEntity};
use super::types::{validate_delay, Color, SimTime};

/// Which procedure the next toggle runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleFrom {
    /// Red to green
    Stop,
    /// Green through yellow to red
    Go,
}

/// A signal guarding one or more movements
pub struct TrafficLight {
    key: String,
    mappings: Vec<LaneDestinationMapping>,
    transition_delay: SimTime,
    scheduler: Rc<EventScheduler>,
    color: Cell<Color>,
    toggling: Cell<bool>,
    next_toggle: Cell<ToggleFrom>,
}

impl TrafficLight {
    /// Create a red light guarding `mappings`
    ///
    /// Fails if there are no mappings, if two of them conflict, or if the
    /// yellow phase length is not a usable delay.
    pub fn new(
        key: impl Into<String>,
        mappings: &[LaneDestinationMapping],
        transition_delay: SimTime,
        scheduler: Rc<EventScheduler>,
    ) -> Result<Rc<Self>> {
        if mappings.is_empty() {
            anyhow::bail!("A traffic light must have lane mappings");
        }
        for (i, first) in mappings.iter().enumerate() {
            for second in &mappings[i + 1..] {
                if mappings_intersect(first, second) {
                    anyhow::bail!(
                        "The same traffic light cannot serve intersecting mappings ('{}' and '{}')",
                        first.key(),
                        second.key()
                    );
                }
            }
        }
        let transition_delay = validate_delay("Transition delay", transition_delay)?;

        Ok(Rc::new(Self {
            key: key.into(),
            mappings: mappings.to_vec(),
            transition_delay,
            scheduler,
            color: Cell::new(Color::Stop),
            toggling: Cell::new(false),
            next_toggle: Cell::new(ToggleFrom::Stop),
        }))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mappings(&self) -> &[LaneDestinationMapping] {
        &self.mappings
    }

    pub fn color(&self) -> Color {
        self.color.get()
    }

    pub fn is_toggling(&self) -> bool {
        self.toggling.get()
    }

    pub fn next_toggle(&self) -> ToggleFrom {
        self.next_toggle.get()
    }

    pub fn transition_delay(&self) -> SimTime {
        self.transition_delay
    }

    /// Start the next color change
    ///
    /// Returns `None` while a previous toggle is still in progress. The
    /// returned request resolves with the color the light settles on.
    pub fn toggle(self: &Rc<Self>) -> Option<Request<Color>> {
        if self.toggling.get() {
            debug!("Light {} is already toggling", self.key);
            return None;
        }
        self.toggling.set(true);
        let request = Request::new();

        let light = Rc::downgrade(self);
        let pending = request.clone();
        match self.next_toggle.get() {
            ToggleFrom::Stop => {
                self.next_toggle.set(ToggleFrom::Go);
                self.schedule(0.0, move |e| {
                    if let Some(light) = light.upgrade() {
                        light.transition_go(e, pending);
                    }
                });
            }
            ToggleFrom::Go => {
                self.next_toggle.set(ToggleFrom::Stop);
                self.schedule(0.0, move |e| {
                    if let Some(light) = light.upgrade() {
                        light.transition_yellow(e, pending);
                    }
                });
            }
        }
        Some(request)
    }

    fn transition_go(&self, e: &Event, request: Request<Color>) {
        self.color.set(Color::Go);
        e.log(&self.to_string());
        self.finish(request);
    }

    fn transition_yellow(self: &Rc<Self>, e: &Event, request: Request<Color>) {
        self.color.set(Color::Transition);
        e.log(&self.to_string());
        let light: Weak<Self> = Rc::downgrade(self);
        self.schedule(self.transition_delay, move |e| {
            if let Some(light) = light.upgrade() {
                light.transition_stop(e, request);
            }
        });
    }

    fn transition_stop(&self, e: &Event, request: Request<Color>) {
        self.color.set(Color::Stop);
        e.log(&self.to_string());
        self.finish(request);
    }

    fn finish(&self, request: Request<Color>) {
        self.toggling.set(false);
        if let Err(err) = request.resolve(self.color.get()) {
            error!("Light {} finished a toggle twice: {:#}", self.key, err);
        }
    }
}

impl TimedEntity for TrafficLight {
    fn scheduler(&self) -> &Rc<EventScheduler> {
        &self.scheduler
    }
}

impl fmt::Display for TrafficLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mappings: Vec<String> = self.mappings.iter().map(|m| m.to_string()).collect();
        write!(
            f,
            "{}: {} [{}]",
            self.key,
            self.color.get(),
            mappings.join(",")
        )
    }
}

impl fmt::Debug for TrafficLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrafficLight")
            .field("key", &self.key)
            .field("color", &self.color.get())
            .field("toggling", &self.toggling.get())
            .field("next_toggle", &self.next_toggle.get())
            .field("transition_delay", &self.transition_delay)
            .finish()
    }
}

/// Whether any movement of `first` conflicts with any movement of `second`
pub fn lights_intersect(first: &TrafficLight, second: &TrafficLight) -> bool {
    any_mappings_intersect(first.mappings(), second.mappings())
}
