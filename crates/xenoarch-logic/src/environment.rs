//! What trigger behaviors can ask of the host simulation.
//!
//! The host owns positions, atmosphere, and entities; triggers only see them
//! through the `Environment` trait.

use serde::{Deserialize, Serialize};

/// 2D world position in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Whether `other` lies within `range` of this point (inclusive).
    pub fn within(&self, other: &Self, range: f32) -> bool {
        self.distance_squared(other) <= range * range
    }
}

/// Ambient quantities a trigger can sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmbientQuantity {
    /// Atmospheres (1.0 = standard).
    Pressure,
    /// Degrees Celsius.
    Temperature,
}

/// Kinds of field source a proximity trigger reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldSource {
    Magnetic,
}

/// Host-side sampling services.
pub trait Environment {
    /// Sample an ambient quantity at a point; `None` when nothing is there
    /// to sample (e.g. the artifact is inside a container).
    fn ambient(&self, quantity: AmbientQuantity, at: Vec2) -> Option<f32>;

    /// Whether any active source of `source` lies within `range` of `at`.
    fn field_in_range(&self, source: FieldSource, at: Vec2, range: f32) -> bool;
}

/// An environment with no atmosphere and no field sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct Void;

impl Environment for Void {
    fn ambient(&self, _quantity: AmbientQuantity, _at: Vec2) -> Option<f32> {
        None
    }

    fn field_in_range(&self, _source: FieldSource, _at: Vec2, _range: f32) -> bool {
        false
    }
}

/// Uniform conditions everywhere plus a fixed list of field sources.
///
/// Handy for tests and for hosts without spatial atmosphere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformEnvironment {
    pub pressure: Option<f32>,
    pub temperature: Option<f32>,
    pub fields: Vec<(FieldSource, Vec2)>,
}

impl UniformEnvironment {
    /// Standard station atmosphere, no fields.
    pub fn standard() -> Self {
        Self {
            pressure: Some(1.0),
            temperature: Some(20.0),
            fields: Vec::new(),
        }
    }
}

impl Environment for UniformEnvironment {
    fn ambient(&self, quantity: AmbientQuantity, _at: Vec2) -> Option<f32> {
        match quantity {
            AmbientQuantity::Pressure => self.pressure,
            AmbientQuantity::Temperature => self.temperature,
        }
    }

    fn field_in_range(&self, source: FieldSource, at: Vec2, range: f32) -> bool {
        self.fields
            .iter()
            .any(|(s, pos)| *s == source && pos.within(&at, range))
    }
}
