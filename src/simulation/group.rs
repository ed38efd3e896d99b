//! Groups of lights that switch together
//!
//! A group holds lights that never conflict with each other, so all of them
//! can show green at once. [`groupify_lights`] splits an intersection's
//! lights into such groups.

use log::{debug, error, warn};
use petgraph::graph::{NodeIndex, UnGraph};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::request::Request;
use super::traffic_light::{lights_intersect, TrafficLight};
use super::types::Color;

/// Pairwise conflicts between a fixed list of lights
///
/// Node `i` is the light at index `i` of the list the graph was built from.
#[derive(Debug, Clone)]
pub struct ConflictGraph {
    graph: UnGraph<String, ()>,
}

impl ConflictGraph {
    pub fn new(lights: &[Rc<TrafficLight>]) -> Self {
        let mut graph = UnGraph::with_capacity(lights.len(), 0);
        let nodes: Vec<NodeIndex> = lights
            .iter()
            .map(|light| graph.add_node(light.key().to_string()))
            .collect();

        for (i, first) in lights.iter().enumerate() {
            for (j, second) in lights.iter().enumerate().skip(i + 1) {
                if lights_intersect(first, second) {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }

        Self { graph }
    }

    /// Whether the lights at indices `a` and `b` conflict
    pub fn conflicts(&self, a: usize, b: usize) -> bool {
        self.graph
            .find_edge(NodeIndex::new(a), NodeIndex::new(b))
            .is_some()
    }

    /// Number of conflicting pairs
    pub fn conflict_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn light_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether no two of the given light indices conflict
    pub fn is_independent(&self, indices: &[usize]) -> bool {
        indices.iter().enumerate().all(|(i, &a)| {
            indices[i + 1..]
                .iter()
                .all(|&b| !self.conflicts(a, b))
        })
    }

    /// Keys of the lights that conflict with the light at `index`
    pub fn conflicting_keys(&self, index: usize) -> Vec<&str> {
        self.graph
            .neighbors(NodeIndex::new(index))
            .map(|n| self.graph[n].as_str())
            .collect()
    }
}

/// Non-conflicting lights toggled as one unit
pub struct TrafficLightGroup {
    key: String,
    lights: Vec<Rc<TrafficLight>>,
    done: Cell<usize>,
    toggling: Cell<bool>,
    request: RefCell<Option<Request<String>>>,
}

impl TrafficLightGroup {
    pub fn new(key: impl Into<String>) -> Self {
        Self::from_members(key, Vec::new())
    }

    /// Build a group from lights already known not to conflict
    fn from_members(key: impl Into<String>, lights: Vec<Rc<TrafficLight>>) -> Self {
        Self {
            key: key.into(),
            lights,
            done: Cell::new(0),
            toggling: Cell::new(false),
            request: RefCell::new(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn lights(&self) -> &[Rc<TrafficLight>] {
        &self.lights
    }

    pub fn is_toggling(&self) -> bool {
        self.toggling.get()
    }

    /// Members that finished the toggle in progress
    pub fn done(&self) -> usize {
        self.done.get()
    }

    pub fn has_pending_request(&self) -> bool {
        self.request.borrow().is_some()
    }

    /// Whether any member currently shows green
    pub fn is_go(&self) -> bool {
        self.lights.iter().any(|light| light.color() == Color::Go)
    }

    /// Add `light` unless it is already a member or conflicts with one
    ///
    /// Returns false, leaving the group unchanged, in either case.
    pub fn add_traffic_light(&mut self, light: Rc<TrafficLight>) -> bool {
        if self
            .lights
            .iter()
            .any(|member| Rc::ptr_eq(member, &light) || lights_intersect(&light, member))
        {
            return false;
        }
        self.lights.push(light);
        true
    }

    /// Toggle every member at once
    ///
    /// The returned request resolves, with the group key, once the last
    /// member has settled. Returns `None` if the group is already toggling
    /// or a member is in the middle of a toggle of its own.
    pub fn toggle(self: &Rc<Self>) -> Option<Request<String>> {
        if self.toggling.get() {
            debug!("Group {} is already toggling", self.key);
            return None;
        }
        if let Some(busy) = self.lights.iter().find(|light| light.is_toggling()) {
            warn!(
                "Group {} cannot toggle while light {} is toggling",
                self.key,
                busy.key()
            );
            return None;
        }

        let request = Request::new();
        self.done.set(0);
        self.toggling.set(true);
        *self.request.borrow_mut() = Some(request.clone());

        if self.lights.is_empty() {
            self.complete();
            return Some(request);
        }

        for light in &self.lights {
            let group: Weak<Self> = Rc::downgrade(self);
            match light.toggle() {
                Some(toggled) => {
                    toggled.done(move |_, _| {
                        if let Some(group) = group.upgrade() {
                            group.light_toggled();
                        }
                    });
                }
                None => {
                    // Count it anyway so the group still completes
                    warn!("Group {}: light {} refused to toggle", self.key, light.key());
                    self.light_toggled();
                }
            }
        }
        Some(request)
    }

    fn light_toggled(&self) {
        self.done.set(self.done.get() + 1);
        if self.done.get() == self.lights.len() {
            self.complete();
        }
    }

    fn complete(&self) {
        self.toggling.set(false);
        let request = self.request.borrow_mut().take();
        if let Some(request) = request {
            if let Err(err) = request.resolve(self.key.clone()) {
                error!("Group {} finished a toggle twice: {:#}", self.key, err);
            }
        }
    }
}

impl fmt::Debug for TrafficLightGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.lights.iter().map(|light| light.key()).collect();
        f.debug_struct("TrafficLightGroup")
            .field("key", &self.key)
            .field("lights", &keys)
            .field("done", &self.done.get())
            .field("toggling", &self.toggling.get())
            .finish()
    }
}

/// Split `lights` into conflict-free groups
///
/// Greedy: the first remaining light opens a group, then one pass over the
/// rest absorbs every light compatible with the members so far. The result
/// depends on input order and is not always the smallest possible cover.
/// A light listed more than once ends up in a single group, once.
pub fn groupify_lights(lights: &[Rc<TrafficLight>]) -> Vec<TrafficLightGroup> {
    let conflicts = ConflictGraph::new(lights);
    groupify_with(lights, &conflicts)
}

/// Same as [`groupify_lights`], reusing a conflict graph built over `lights`
pub fn groupify_with(lights: &[Rc<TrafficLight>], conflicts: &ConflictGraph) -> Vec<TrafficLightGroup> {
    let mut remaining: Vec<usize> = (0..lights.len()).collect();
    let mut groups = Vec::new();

    while !remaining.is_empty() {
        let first = remaining.remove(0);
        let mut members = vec![first];
        remaining.retain(|&candidate| {
            if members
                .iter()
                .any(|&m| Rc::ptr_eq(&lights[m], &lights[candidate]))
            {
                debug!("Dropping repeated light {}", lights[candidate].key());
                false
            } else if members.iter().all(|&m| !conflicts.conflicts(m, candidate)) {
                members.push(candidate);
                false
            } else {
                true
            }
        });

        let key = format!("g{}", groups.len());
        debug!(
            "Group {} holds lights {:?}",
            key,
            members.iter().map(|&i| lights[i].key()).collect::<Vec<_>>()
        );
        let members = members.into_iter().map(|i| Rc::clone(&lights[i])).collect();
        groups.push(TrafficLightGroup::from_members(key, members));
    }

    groups
}
