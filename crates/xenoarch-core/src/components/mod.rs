//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! Behavior lives in systems and in `xenoarch-logic`.

mod artifact;
mod common;
mod sensed;

pub use artifact::*;
pub use common::*;
pub use sensed::*;
