//! Systems - logic that operates on components

mod artifacts;
mod environment;

pub use artifacts::*;
pub use environment::*;
