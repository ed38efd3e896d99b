//! Topology configuration
//!
//! Describes lanes, movements, lights and the intersection by key, so a
//! topology can be written down before anything is constructed. Building
//! validates everything eagerly.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::rc::Rc;

use super::intersection::Intersection;
use super::lane::{Lane, LaneDestinationMapping};
use super::scheduler::EventScheduler;
use super::traffic_light::TrafficLight;
use super::types::{
    Direction, KeyGenerator, SimTime, DEFAULT_EPOCH, DEFAULT_SWITCH_GROUP_DELAY,
    DEFAULT_TRANSITION_DELAY,
};

/// A lane on the intersection boundary
#[derive(Debug, Clone, Default)]
pub struct LaneSpec {
    pub key: Option<String>,
    /// Required
    pub placement: Option<i32>,
    pub direction: Direction,
}

impl LaneSpec {
    pub fn new(key: &str, placement: i32, direction: Direction) -> Self {
        Self {
            key: Some(key.to_string()),
            placement: Some(placement),
            direction,
        }
    }
}

/// A movement, naming its lanes by key
#[derive(Debug, Clone, Default)]
pub struct MovementSpec {
    pub key: Option<String>,
    pub source: String,
    pub destinations: Vec<String>,
}

impl MovementSpec {
    pub fn new(key: &str, source: &str, destinations: &[&str]) -> Self {
        Self {
            key: Some(key.to_string()),
            source: source.to_string(),
            destinations: destinations.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// A light, naming its movements by key
#[derive(Debug, Clone, Default)]
pub struct LightSpec {
    pub key: Option<String>,
    pub movements: Vec<String>,
    /// Falls back to [`DEFAULT_TRANSITION_DELAY`]
    pub transition_delay: Option<SimTime>,
}

impl LightSpec {
    pub fn new(key: &str, movements: &[&str]) -> Self {
        Self {
            key: Some(key.to_string()),
            movements: movements.iter().map(|m| m.to_string()).collect(),
            transition_delay: None,
        }
    }
}

/// Everything needed to build one intersection
#[derive(Debug, Clone)]
pub struct JunctionConfig {
    pub key: Option<String>,
    /// Starting value of the clock
    pub epoch: SimTime,
    /// Falls back to [`DEFAULT_SWITCH_GROUP_DELAY`]
    pub switch_group_delay: Option<SimTime>,
    pub lanes: Vec<LaneSpec>,
    pub movements: Vec<MovementSpec>,
    pub lights: Vec<LightSpec>,
}

impl Default for JunctionConfig {
    fn default() -> Self {
        Self {
            key: None,
            epoch: DEFAULT_EPOCH,
            switch_group_delay: None,
            lanes: Vec::new(),
            movements: Vec::new(),
            lights: Vec::new(),
        }
    }
}

/// The constructed pieces of a [`JunctionConfig`]
pub struct BuiltJunction {
    pub scheduler: Rc<EventScheduler>,
    pub lanes: Vec<Lane>,
    pub movements: Vec<LaneDestinationMapping>,
    pub intersection: Rc<Intersection>,
}

impl JunctionConfig {
    /// Four approaches, each with one lane in and one lane out, placed
    /// N-in, N-out, W-in, W-out, S-in, S-out, E-in, E-out around the box.
    /// One straight-through movement per approach, one light per movement.
    pub fn four_way() -> Self {
        let lanes = vec![
            LaneSpec::new("N-in", 0, Direction::In),
            LaneSpec::new("N-out", 1, Direction::Out),
            LaneSpec::new("W-in", 2, Direction::In),
            LaneSpec::new("W-out", 3, Direction::Out),
            LaneSpec::new("S-in", 4, Direction::In),
            LaneSpec::new("S-out", 5, Direction::Out),
            LaneSpec::new("E-in", 6, Direction::In),
            LaneSpec::new("E-out", 7, Direction::Out),
        ];
        let movements = vec![
            MovementSpec::new("N", "N-in", &["S-out"]),
            MovementSpec::new("S", "S-in", &["N-out"]),
            MovementSpec::new("E", "E-in", &["W-out"]),
            MovementSpec::new("W", "W-in", &["E-out"]),
        ];
        let lights = vec![
            LightSpec::new("N->S", &["N"]),
            LightSpec::new("S->N", &["S"]),
            LightSpec::new("E->W", &["E"]),
            LightSpec::new("W->E", &["W"]),
        ];

        Self {
            key: Some("four-way".to_string()),
            lanes,
            movements,
            lights,
            ..Self::default()
        }
    }

    /// Use the same yellow phase length for every light
    pub fn with_transition_delay(mut self, delay: SimTime) -> Self {
        for light in &mut self.lights {
            light.transition_delay = Some(delay);
        }
        self
    }

    pub fn with_switch_group_delay(mut self, delay: SimTime) -> Self {
        self.switch_group_delay = Some(delay);
        self
    }

    pub fn with_epoch(mut self, epoch: SimTime) -> Self {
        self.epoch = epoch;
        self
    }

    /// Construct and validate every entity on a fresh scheduler
    pub fn build(&self) -> Result<BuiltJunction> {
        if !self.epoch.is_finite() {
            anyhow::bail!("Epoch must be a finite time, got {}", self.epoch);
        }
        let scheduler = Rc::new(EventScheduler::with_epoch(self.epoch));
        let mut keys = KeyGenerator::new();

        let mut lanes: Vec<Lane> = Vec::with_capacity(self.lanes.len());
        let mut lane_index: HashMap<String, usize> = HashMap::new();
        for (i, spec) in self.lanes.iter().enumerate() {
            let key = keys.gen_key(spec.key.as_deref());
            let placement = spec
                .placement
                .with_context(|| {
                    format!("Lane placement cannot be undefined (lane #{} '{}')", i, key)
                })?;
            if lane_index.insert(key.clone(), lanes.len()).is_some() {
                anyhow::bail!("Duplicate lane key '{}'", key);
            }
            lanes.push(Lane::new(key, placement, spec.direction));
        }

        let mut movements: Vec<LaneDestinationMapping> = Vec::with_capacity(self.movements.len());
        let mut movement_index: HashMap<String, usize> = HashMap::new();
        for spec in &self.movements {
            let key = keys.gen_key(spec.key.as_deref());
            let movement = build_movement(&key, spec, &lanes, &lane_index)
                .with_context(|| format!("Invalid movement '{}'", key))?;
            if movement_index.insert(key.clone(), movements.len()).is_some() {
                anyhow::bail!("Duplicate movement key '{}'", key);
            }
            movements.push(movement);
        }

        let mut lights: Vec<Rc<TrafficLight>> = Vec::with_capacity(self.lights.len());
        for spec in &self.lights {
            let key = keys.gen_key(spec.key.as_deref());
            if lights.iter().any(|light| light.key() == key) {
                anyhow::bail!("Duplicate traffic light key '{}'", key);
            }
            let light = build_light(&key, spec, &movements, &movement_index, &scheduler)
                .with_context(|| format!("Invalid traffic light '{}'", key))?;
            lights.push(light);
        }

        let key = keys.gen_key(self.key.as_deref());
        let intersection = Intersection::new(
            key.as_str(),
            &lights,
            self.switch_group_delay
                .unwrap_or(DEFAULT_SWITCH_GROUP_DELAY),
            Rc::clone(&scheduler),
        )
        .with_context(|| format!("Invalid intersection '{}'", key))?;

        Ok(BuiltJunction {
            scheduler,
            lanes,
            movements,
            intersection,
        })
    }
}

fn build_movement(
    key: &str,
    spec: &MovementSpec,
    lanes: &[Lane],
    lane_index: &HashMap<String, usize>,
) -> Result<LaneDestinationMapping> {
    let source = lookup_lane(lanes, lane_index, &spec.source)?;
    let destinations = spec
        .destinations
        .iter()
        .map(|d| lookup_lane(lanes, lane_index, d).cloned())
        .collect::<Result<Vec<Lane>>>()?;
    LaneDestinationMapping::new(key, source, &destinations)
}

fn lookup_lane<'a>(
    lanes: &'a [Lane],
    lane_index: &HashMap<String, usize>,
    key: &str,
) -> Result<&'a Lane> {
    lane_index
        .get(key)
        .map(|&i| &lanes[i])
        .with_context(|| format!("Unknown lane '{}'", key))
}

fn build_light(
    key: &str,
    spec: &LightSpec,
    movements: &[LaneDestinationMapping],
    movement_index: &HashMap<String, usize>,
    scheduler: &Rc<EventScheduler>,
) -> Result<Rc<TrafficLight>> {
    let mappings = spec
        .movements
        .iter()
        .map(|m| {
            movement_index
                .get(m)
                .map(|&i| movements[i].clone())
                .with_context(|| format!("Unknown movement '{}'", m))
        })
        .collect::<Result<Vec<LaneDestinationMapping>>>()?;
    TrafficLight::new(
        key,
        &mappings,
        spec.transition_delay.unwrap_or(DEFAULT_TRANSITION_DELAY),
        Rc::clone(scheduler),
    )
}
