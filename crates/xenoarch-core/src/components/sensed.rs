//! Host entities that artifact triggers react to.

use serde::{Deserialize, Serialize};
use xenoarch_logic::environment::{FieldSource, Vec2};
use xenoarch_logic::events::LifeState;

/// Something that projects a field, e.g. a magnet or a toggled field generator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FieldEmitter {
    pub source: FieldSource,
    /// Toggleable emitters only count while active.
    pub active: bool,
}

impl FieldEmitter {
    pub fn magnet() -> Self {
        Self {
            source: FieldSource::Magnetic,
            active: true,
        }
    }
}

/// A living creature whose death nearby artifacts may notice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mob {
    pub state: LifeState,
}

impl Default for Mob {
    fn default() -> Self {
        Self {
            state: LifeState::Alive,
        }
    }
}

/// A circular patch of atmosphere with fixed conditions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AmbientZone {
    pub center: Vec2,
    pub radius: f32,
    /// Atmospheres.
    pub pressure: f32,
    /// Degrees Celsius.
    pub temperature: f32,
}

impl AmbientZone {
    pub fn contains(&self, at: Vec2) -> bool {
        self.center.within(&at, self.radius)
    }
}
