//! Core types for the junction simulation
//!
//! Shared vocabulary used by the engine and the traffic-control logic.

use std::fmt;

/// A point on the logical clock
pub type SimTime = f64;

/// Time a light spends in yellow before reaching red
pub const DEFAULT_TRANSITION_DELAY: SimTime = 30.0;

/// Time a group stays green before the intersection switches groups
pub const DEFAULT_SWITCH_GROUP_DELAY: SimTime = 5.0 * 60.0;

/// Starting value of a fresh scheduler clock
pub const DEFAULT_EPOCH: SimTime = 0.0;

/// Whether traffic enters or leaves the intersection through a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Traffic enters the intersection from this lane
    #[default]
    In,
    /// Traffic exits the intersection through this lane
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "IN"),
            Direction::Out => write!(f, "OUT"),
        }
    }
}

/// Signal shown by a traffic light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    /// Red
    Stop,
    /// Yellow
    Transition,
    /// Green
    Go,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Stop => write!(f, "red"),
            Color::Transition => write!(f, "yellow"),
            Color::Go => write!(f, "green"),
        }
    }
}

/// Hands out keys for entities configured without one
///
/// Owned by whoever builds the topology, so uniqueness is scoped to that
/// builder rather than to the process.
#[derive(Debug, Clone, Default)]
pub struct KeyGenerator {
    next: usize,
}

impl KeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_key(&mut self) -> String {
        let key = format!("k{}", self.next);
        self.next += 1;
        key
    }

    /// Use the given key if present, otherwise generate one
    pub fn gen_key(&mut self, key: Option<&str>) -> String {
        match key {
            Some(key) => key.to_string(),
            None => self.next_key(),
        }
    }
}

/// Checks that a delay can be used as a relative schedule offset
pub(crate) fn validate_delay(name: &str, delay: SimTime) -> anyhow::Result<SimTime> {
    if !delay.is_finite() || delay < 0.0 {
        anyhow::bail!("{} must be a non-negative number, got {}", name, delay);
    }
    Ok(delay)
}
