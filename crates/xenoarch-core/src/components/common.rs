//! Common components used across multiple entity types.

use serde::{Deserialize, Serialize};
use xenoarch_logic::environment::Vec2;

/// World position in meters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Display name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Set while an entity sits inside a container; contained artifacts sample
/// no atmosphere.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contained;
