//! Lanes and the movements that connect them

use anyhow::Result;
use std::fmt;

use super::types::Direction;

/// A lane touching the intersection boundary
///
/// `placement` is the lane's position on the circular ordering of boundary
/// points. It never changes once the lane exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Lane {
    key: String,
    placement: i32,
    direction: Direction,
}

impl Lane {
    pub fn new(key: impl Into<String>, placement: i32, direction: Direction) -> Self {
        Self {
            key: key.into(),
            placement,
            direction,
        }
    }

    /// A lane that feeds traffic into the intersection
    pub fn inbound(key: impl Into<String>, placement: i32) -> Self {
        Self::new(key, placement, Direction::In)
    }

    /// A lane that takes traffic out of the intersection
    pub fn outbound(key: impl Into<String>, placement: i32) -> Self {
        Self::new(key, placement, Direction::Out)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn placement(&self) -> i32 {
        self.placement
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ({},{})", self.key, self.placement, self.direction)
    }
}

/// A legal path through the intersection: one inbound lane feeding one or
/// more outbound lanes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneDestinationMapping {
    key: String,
    source: Lane,
    destinations: Vec<Lane>,
}

impl LaneDestinationMapping {
    /// Build a movement, keeping its own copy of the lanes
    pub fn new(key: impl Into<String>, source: &Lane, destinations: &[Lane]) -> Result<Self> {
        if source.direction() != Direction::In {
            anyhow::bail!(
                "A destination mapping must have a source and it must enter the intersection"
            );
        }
        if destinations.is_empty() {
            anyhow::bail!("A destination mapping must contain at least one destination");
        }
        if let Some(lane) = destinations.iter().find(|d| d.direction() != Direction::Out) {
            anyhow::bail!(
                "destination mapping: destination lane '{}' must be directed outwards",
                lane.key()
            );
        }

        Ok(Self {
            key: key.into(),
            source: source.clone(),
            destinations: destinations.to_vec(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> &Lane {
        &self.source
    }

    pub fn destinations(&self) -> &[Lane] {
        &self.destinations
    }

    /// Every (source, destination) pair this movement draws across the box
    pub fn chords(&self) -> impl Iterator<Item = (&Lane, &Lane)> {
        self.destinations.iter().map(move |d| (&self.source, d))
    }
}

impl fmt::Display for LaneDestinationMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dests: Vec<String> = self
            .destinations
            .iter()
            .map(|d| format!("({},{})", d.key(), d.placement()))
            .collect();
        write!(
            f,
            "{}: ({},{})->[{}]",
            self.key,
            self.source.key(),
            self.source.placement(),
            dests.join(",")
        )
    }
}
