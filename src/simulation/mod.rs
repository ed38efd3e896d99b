//! Discrete-event junction simulation
//!
//! The engine (queue, scheduler, requests) lives next to the traffic
//! control logic built on top of it: conflict geometry, lights, groups and
//! the intersection controller.

mod config;
mod event_queue;
mod geometry;
mod group;
mod intersection;
mod lane;
mod request;
mod scheduler;
mod traffic_light;
mod types;
mod world;

pub use config::{BuiltJunction, JunctionConfig, LaneSpec, LightSpec, MovementSpec};
pub use event_queue::MinQueue;
pub use geometry::{any_mappings_intersect, chords_cross, lanes_intersect, mappings_intersect, Chord};
pub use group::{groupify_lights, groupify_with, ConflictGraph, TrafficLightGroup};
pub use intersection::Intersection;
pub use lane::{Lane, LaneDestinationMapping};
pub use request::Request;
pub use scheduler::{Action, Event, EventScheduler, RunSummary, TimedEntity, TimedObject};
pub use traffic_light::{lights_intersect, ToggleFrom, TrafficLight};
pub use types::{
    Color, Direction, KeyGenerator, SimTime, DEFAULT_EPOCH, DEFAULT_SWITCH_GROUP_DELAY,
    DEFAULT_TRANSITION_DELAY,
};
pub use world::SimWorld;
