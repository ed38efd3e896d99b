//! Intersection controller
//!
//! Cycles round-robin through the conflict-free light groups. The active
//! group is brought fully to red before the next one starts turning green,
//! so two different groups are never green at the same instant.

use anyhow::Result;
use log::{debug, error, warn};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::group::{groupify_with, ConflictGraph, TrafficLightGroup};
use super::request::Request;
use super::scheduler::{EventScheduler, TimedEntity};
use super::traffic_light::TrafficLight;
use super::types::{validate_delay, SimTime};

/// A signal-controlled intersection
pub struct Intersection {
    key: String,
    traffic_lights: Vec<Rc<TrafficLight>>,
    conflicts: ConflictGraph,
    groups: Vec<Rc<TrafficLightGroup>>,
    switch_group_delay: SimTime,
    scheduler: Rc<EventScheduler>,
    current_group: Cell<Option<usize>>,
    next_group: Cell<usize>,
    toggling: Cell<bool>,
    request: RefCell<Option<Request<usize>>>,
}

impl Intersection {
    /// Create an intersection and split its lights into groups
    ///
    /// Every light has to run on `scheduler`.
    pub fn new(
        key: impl Into<String>,
        traffic_lights: &[Rc<TrafficLight>],
        switch_group_delay: SimTime,
        scheduler: Rc<EventScheduler>,
    ) -> Result<Rc<Self>> {
        let key = key.into();
        if traffic_lights.is_empty() {
            anyhow::bail!("An intersection must contain at least one trafficlight");
        }
        let switch_group_delay = validate_delay("Switch group delay", switch_group_delay)?;
        for (i, light) in traffic_lights.iter().enumerate() {
            if traffic_lights[..i].iter().any(|other| Rc::ptr_eq(other, light)) {
                anyhow::bail!(
                    "Traffic light '{}' appears more than once in intersection '{}'",
                    light.key(),
                    key
                );
            }
        }
        if let Some(light) = traffic_lights
            .iter()
            .find(|light| !Rc::ptr_eq(light.scheduler(), &scheduler))
        {
            anyhow::bail!(
                "Traffic light '{}' runs on a different scheduler than intersection '{}'",
                light.key(),
                key
            );
        }

        let traffic_lights = traffic_lights.to_vec();
        let conflicts = ConflictGraph::new(&traffic_lights);
        let groups: Vec<Rc<TrafficLightGroup>> = groupify_with(&traffic_lights, &conflicts)
            .into_iter()
            .map(Rc::new)
            .collect();
        debug!(
            "Intersection {}: {} lights, {} conflicting pairs, {} groups",
            key,
            traffic_lights.len(),
            conflicts.conflict_count(),
            groups.len()
        );

        Ok(Rc::new(Self {
            key,
            traffic_lights,
            conflicts,
            groups,
            switch_group_delay,
            scheduler,
            current_group: Cell::new(None),
            next_group: Cell::new(0),
            toggling: Cell::new(false),
            request: RefCell::new(None),
        }))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn traffic_lights(&self) -> &[Rc<TrafficLight>] {
        &self.traffic_lights
    }

    pub fn groups(&self) -> &[Rc<TrafficLightGroup>] {
        &self.groups
    }

    pub fn conflict_graph(&self) -> &ConflictGraph {
        &self.conflicts
    }

    /// Index of the green group, `None` before the first switch and while
    /// the intersection is between groups
    pub fn current_group(&self) -> Option<usize> {
        self.current_group.get()
    }

    pub fn next_group(&self) -> usize {
        self.next_group.get()
    }

    pub fn switch_group_delay(&self) -> SimTime {
        self.switch_group_delay
    }

    pub fn is_toggling(&self) -> bool {
        self.toggling.get()
    }

    /// Schedule the first switch for right now
    pub fn start(self: &Rc<Self>) {
        self.schedule_toggle(0.0);
    }

    /// Switch from the active group to the next one
    ///
    /// Returns `None` while a switch is already underway. The request
    /// resolves with the index of the group that turned green.
    pub fn toggle(self: &Rc<Self>) -> Option<Request<usize>> {
        if self.toggling.get() {
            debug!("Intersection {} is already switching", self.key);
            return None;
        }
        let request = Request::new();
        *self.request.borrow_mut() = Some(request.clone());
        self.toggling.set(true);

        match self.current_group.get() {
            Some(current) if self.groups.len() > 1 => self.toggle_active(current),
            _ => self.toggle_next(),
        }
        Some(request)
    }

    fn toggle_active(self: &Rc<Self>, current: usize) {
        let intersection: Weak<Self> = Rc::downgrade(self);
        match self.groups[current].toggle() {
            Some(off) => {
                off.done(move |_, _| {
                    if let Some(intersection) = intersection.upgrade() {
                        intersection.current_group.set(None);
                        intersection.toggle_next();
                    }
                });
            }
            None => self.abort(current),
        }
    }

    fn toggle_next(self: &Rc<Self>) {
        let next = self.next_group.get();
        let intersection: Weak<Self> = Rc::downgrade(self);
        match self.groups[next].toggle() {
            Some(on) => {
                on.done(move |_, _| {
                    if let Some(intersection) = intersection.upgrade() {
                        intersection.toggle_done();
                    }
                });
            }
            None => self.abort(next),
        }
    }

    fn toggle_done(self: &Rc<Self>) {
        let activated = self.next_group.get();
        self.toggling.set(false);
        let request = self.request.borrow_mut().take();
        if let Some(request) = request {
            if let Err(err) = request.resolve(activated) {
                error!("Intersection {} finished a switch twice: {:#}", self.key, err);
            }
        }

        self.current_group.set(Some(activated));
        self.next_group.set((activated + 1) % self.groups.len());
        debug!(
            "Intersection {}: group {} active, next switch in {}",
            self.key,
            self.groups[activated].key(),
            self.switch_group_delay
        );
        self.schedule_toggle(self.switch_group_delay);
    }

    /// A group refused to toggle because a member is busy on its own.
    /// Drop this switch and retry once every busy member has settled.
    fn abort(self: &Rc<Self>, group: usize) {
        let retry = self.groups[group]
            .lights()
            .iter()
            .filter(|light| light.is_toggling())
            .map(|light| light.transition_delay())
            .fold(0.0, f64::max);
        warn!(
            "Intersection {}: group {} refused to toggle, retrying in {}",
            self.key,
            self.groups[group].key(),
            retry
        );
        self.toggling.set(false);
        self.request.borrow_mut().take();
        self.schedule_toggle(retry);
    }

    fn schedule_toggle(self: &Rc<Self>, dt: SimTime) {
        let intersection: Weak<Self> = Rc::downgrade(self);
        self.schedule(dt, move |_| {
            if let Some(intersection) = intersection.upgrade() {
                intersection.toggle();
            }
        });
    }
}

impl fmt::Debug for Intersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intersection")
            .field("key", &self.key)
            .field("lights", &self.traffic_lights.len())
            .field("groups", &self.groups.len())
            .field("current_group", &self.current_group.get())
            .field("next_group", &self.next_group.get())
            .field("toggling", &self.toggling.get())
            .finish()
    }
}

impl TimedEntity for Intersection {
    fn scheduler(&self) -> &Rc<EventScheduler> {
        &self.scheduler
    }
}
