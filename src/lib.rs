//! Junction Simulation Library
//!
//! A signal-controlled intersection modelled as a discrete-event simulation.

pub mod simulation;
