//! Environment system - exposes world state to artifact triggers
//!
//! Trigger behaviors sample their surroundings through the `Environment`
//! trait. The engine captures a snapshot of field emitters and ambient zones
//! once per update so every artifact sees the same world during a step.

use hecs::World;
use xenoarch_logic::environment::{AmbientQuantity, Environment, FieldSource, Vec2};

use crate::components::{AmbientZone, FieldEmitter, Position};

/// Per-step view of everything triggers can sense.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldEnvironment {
    /// Active field sources and where they are.
    pub fields: Vec<(FieldSource, Vec2)>,
    pub zones: Vec<AmbientZone>,
}

impl WorldEnvironment {
    pub fn capture(world: &World) -> Self {
        let fields = world
            .query::<(&FieldEmitter, &Position)>()
            .iter()
            .filter(|(_, (emitter, _))| emitter.active)
            .map(|(_, (emitter, pos))| (emitter.source, pos.0))
            .collect();
        let zones = world
            .query::<&AmbientZone>()
            .iter()
            .map(|(_, zone)| *zone)
            .collect();
        Self { fields, zones }
    }

    /// Zone governing a point. Later zones override earlier ones where they
    /// overlap.
    fn zone_at(&self, at: Vec2) -> Option<&AmbientZone> {
        self.zones.iter().rev().find(|z| z.contains(at))
    }
}

impl Environment for WorldEnvironment {
    fn ambient(&self, quantity: AmbientQuantity, at: Vec2) -> Option<f32> {
        let zone = self.zone_at(at)?;
        Some(match quantity {
            AmbientQuantity::Pressure => zone.pressure,
            AmbientQuantity::Temperature => zone.temperature,
        })
    }

    fn field_in_range(&self, source: FieldSource, at: Vec2, range: f32) -> bool {
        self.fields
            .iter()
            .any(|(s, pos)| *s == source && pos.within(&at, range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_skips_inactive_emitters() {
        let mut world = World::new();
        world.spawn((FieldEmitter::magnet(), Position::new(1.0, 0.0)));
        world.spawn((
            FieldEmitter {
                source: FieldSource::Magnetic,
                active: false,
            },
            Position::new(50.0, 0.0),
        ));

        let env = WorldEnvironment::capture(&world);
        assert_eq!(env.fields.len(), 1);
        assert!(env.field_in_range(FieldSource::Magnetic, Vec2::ZERO, 2.0));
        assert!(!env.field_in_range(FieldSource::Magnetic, Vec2::new(50.0, 0.0), 2.0));
    }

    #[test]
    fn test_ambient_uses_latest_zone() {
        let mut world = World::new();
        world.spawn((AmbientZone {
            center: Vec2::ZERO,
            radius: 20.0,
            pressure: 1.0,
            temperature: 20.0,
        },));
        world.spawn((AmbientZone {
            center: Vec2::new(5.0, 0.0),
            radius: 2.0,
            pressure: 3.0,
            temperature: 300.0,
        },));

        let env = WorldEnvironment::capture(&world);
        assert_eq!(env.ambient(AmbientQuantity::Temperature, Vec2::ZERO), Some(20.0));
        assert_eq!(env.ambient(AmbientQuantity::Pressure, Vec2::new(5.5, 0.0)), Some(3.0));
        assert_eq!(env.ambient(AmbientQuantity::Pressure, Vec2::new(100.0, 0.0)), None);
    }
}
