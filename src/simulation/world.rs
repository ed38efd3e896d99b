//! Main simulation world that ties everything together
//!
//! Owns the scheduler and the intersection built from a
//! [`JunctionConfig`], and drives the clock up to a horizon.

use anyhow::Result;
use log::{info, warn};
use std::rc::Rc;

use super::config::JunctionConfig;
use super::intersection::Intersection;
use super::lane::{Lane, LaneDestinationMapping};
use super::scheduler::{EventScheduler, RunSummary};
use super::types::{Color, SimTime};

/// The main simulation world
pub struct SimWorld {
    scheduler: Rc<EventScheduler>,
    lanes: Vec<Lane>,
    movements: Vec<LaneDestinationMapping>,
    intersection: Rc<Intersection>,
    started: bool,
}

impl SimWorld {
    pub fn from_config(config: &JunctionConfig) -> Result<Self> {
        let built = config.build()?;
        Ok(Self {
            scheduler: built.scheduler,
            lanes: built.lanes,
            movements: built.movements,
            intersection: built.intersection,
            started: false,
        })
    }

    /// The four-way sample intersection with default timings
    pub fn create_test_world() -> Result<Self> {
        Self::from_config(&JunctionConfig::four_way())
    }

    pub fn scheduler(&self) -> &Rc<EventScheduler> {
        &self.scheduler
    }

    pub fn intersection(&self) -> &Rc<Intersection> {
        &self.intersection
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn movements(&self) -> &[LaneDestinationMapping] {
        &self.movements
    }

    pub fn time(&self) -> SimTime {
        self.scheduler.time()
    }

    /// Schedule the intersection's first switch. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.intersection.start();
    }

    /// Start if needed, then fire events until the clock passes `horizon`
    pub fn run_until(&mut self, horizon: SimTime) -> RunSummary {
        self.start();
        let summary = self.scheduler.run_until(horizon);
        if summary.drained {
            warn!(
                "Event queue drained at {} before reaching {}",
                summary.final_time, horizon
            );
        }
        info!(
            "Fired {} events, clock at {}",
            summary.events_fired, summary.final_time
        );
        summary
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Junction Simulation Summary ===");
        println!("Time: {}", self.time());
        println!(
            "Lanes: {}, Movements: {}, Lights: {}",
            self.lanes.len(),
            self.movements.len(),
            self.intersection.traffic_lights().len()
        );
        println!(
            "Events fired: {}, pending: {}",
            self.scheduler.events_fired(),
            self.scheduler.pending()
        );
        println!(
            "Conflicting light pairs: {}",
            self.intersection.conflict_graph().conflict_count()
        );
        println!();

        println!("--- Groups ---");
        for (i, group) in self.intersection.groups().iter().enumerate() {
            let keys: Vec<&str> = group.lights().iter().map(|l| l.key()).collect();
            let marker = if self.intersection.current_group() == Some(i) {
                " (active)"
            } else {
                ""
            };
            println!("  Group {}{}: [{}]", group.key(), marker, keys.join(", "));
        }

        println!("--- Lights ---");
        for light in self.intersection.traffic_lights() {
            let state = match light.color() {
                Color::Go => "GO",
                Color::Transition => "TRANSITION",
                Color::Stop => "STOP",
            };
            println!("  {} ({})", light, state);
        }
    }
}
