//! Trigger behaviors - what makes a node activate.
//!
//! Every node carries exactly one `TriggerBehavior`. The set of shapes is
//! closed: timers, field proximity, ambient thresholds, nearby deaths, and
//! relayed domain events. All of them share one contract:
//!
//! - `can_trigger` - shared cooldown/ownership gate plus kind-specific checks
//! - `on_tick` - polled every step for timer, proximity and ambient kinds
//! - `on_relayed_event` - offered every event the artifact relays
//!
//! A behavior never touches unlock state itself; it reports
//! `Activation::Fired` and the owning artifact routes that through its
//! single trigger entry point.

use serde::{Deserialize, Serialize};

use crate::catalog::TriggerKind;
use crate::environment::{AmbientQuantity, Environment, FieldSource, Vec2};
use crate::events::{ArtifactEvent, DamageType, LifeState, RelayedEvent, ToolQuality};

/// Result of offering a tick or event to a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Idle,
    Fired,
}

/// What a trigger may know about its artifact at the moment it is asked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerContext {
    /// Current simulation time in seconds.
    pub now: f64,
    /// World position of the owning artifact.
    pub position: Vec2,
    /// Whether the artifact's unlock cooldown has elapsed.
    pub cooldown_elapsed: bool,
}

impl TriggerContext {
    pub fn new(now: f64, position: Vec2, cooldown_elapsed: bool) -> Self {
        Self {
            now,
            position,
            cooldown_elapsed,
        }
    }

    /// The precondition every trigger kind shares. A node is only ever
    /// evaluated through the artifact that owns it, so ownership needs no
    /// check here.
    pub fn base_allows(&self) -> bool {
        self.cooldown_elapsed
    }
}

/// Which relayed events an event-driven trigger listens for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventFilter {
    /// Accumulate matching damage and fire once `threshold` is reached.
    Damage {
        damage_type: Option<DamageType>,
        threshold: f32,
        accumulated: f32,
    },
    /// Fire on an interaction nobody has handled yet, and handle it.
    Interact,
    /// Fire on a completed tool use of this quality.
    ToolUse { quality: ToolQuality },
}

/// Activation behavior carried by a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TriggerBehavior {
    /// Fires every `delay` seconds. Keeps counting through cooldowns.
    Timer {
        delay: f64,
        next_activation: Option<f64>,
    },
    /// Fires while an active field source is within `range`.
    Proximity { source: FieldSource, range: f32 },
    /// Fires while the sampled quantity is below `min` or above `max`.
    AmbientThreshold {
        quantity: AmbientQuantity,
        min: Option<f32>,
        max: Option<f32>,
    },
    /// Fires when something dies within `range`.
    DeathNearby { range: f32 },
    /// Fires on relayed domain events passing the filter.
    Event(EventFilter),
}

impl TriggerBehavior {
    /// Fresh behavior for a catalog kind.
    pub fn for_kind(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::TimerShort => Self::timer(30.0),
            TriggerKind::TimerLong => Self::timer(90.0),
            TriggerKind::Magnet => TriggerBehavior::Proximity {
                source: FieldSource::Magnetic,
                range: 4.0,
            },
            TriggerKind::PressureHigh => Self::ambient(AmbientQuantity::Pressure, None, Some(1.5)),
            TriggerKind::PressureLow => Self::ambient(AmbientQuantity::Pressure, Some(0.5), None),
            TriggerKind::Heat => Self::ambient(AmbientQuantity::Temperature, None, Some(50.0)),
            TriggerKind::Cold => Self::ambient(AmbientQuantity::Temperature, Some(-10.0), None),
            TriggerKind::Death => TriggerBehavior::DeathNearby { range: 10.0 },
            TriggerKind::DamageBrute => Self::damage(Some(DamageType::Brute), 20.0),
            TriggerKind::DamageBurn => Self::damage(Some(DamageType::Burn), 20.0),
            TriggerKind::DamageAny => Self::damage(None, 30.0),
            TriggerKind::Interact => TriggerBehavior::Event(EventFilter::Interact),
            TriggerKind::ToolPry => Self::tool(ToolQuality::Prying),
            TriggerKind::ToolWeld => Self::tool(ToolQuality::Welding),
            TriggerKind::ToolScrew => Self::tool(ToolQuality::Screwing),
        }
    }

    pub fn timer(delay: f64) -> Self {
        TriggerBehavior::Timer {
            delay,
            next_activation: None,
        }
    }

    pub fn ambient(quantity: AmbientQuantity, min: Option<f32>, max: Option<f32>) -> Self {
        TriggerBehavior::AmbientThreshold { quantity, min, max }
    }

    pub fn damage(damage_type: Option<DamageType>, threshold: f32) -> Self {
        TriggerBehavior::Event(EventFilter::Damage {
            damage_type,
            threshold,
            accumulated: 0.0,
        })
    }

    pub fn tool(quality: ToolQuality) -> Self {
        TriggerBehavior::Event(EventFilter::ToolUse { quality })
    }

    /// Whether the host should call `on_tick` every step.
    pub fn is_polled(&self) -> bool {
        matches!(
            self,
            TriggerBehavior::Timer { .. }
                | TriggerBehavior::Proximity { .. }
                | TriggerBehavior::AmbientThreshold { .. }
        )
    }

    /// Shared gate ANDed with the kind's own preconditions.
    pub fn can_trigger(&self, ctx: &TriggerContext) -> bool {
        if !ctx.base_allows() {
            return false;
        }
        match self {
            TriggerBehavior::Proximity { range, .. } | TriggerBehavior::DeathNearby { range } => {
                *range > 0.0
            }
            TriggerBehavior::Event(EventFilter::Damage { threshold, .. }) => *threshold > 0.0,
            _ => true,
        }
    }

    /// Per-step poll. No-op for event-driven shapes.
    pub fn on_tick(&mut self, ctx: &TriggerContext, env: &dyn Environment) -> Activation {
        let allowed = self.can_trigger(ctx);
        match self {
            TriggerBehavior::Timer {
                delay,
                next_activation,
            } => {
                // Counts regardless of `allowed`; the artifact gates the effect.
                let due = *next_activation.get_or_insert(ctx.now + *delay);
                if ctx.now >= due {
                    *next_activation = Some(ctx.now + *delay);
                    Activation::Fired
                } else {
                    Activation::Idle
                }
            }
            TriggerBehavior::Proximity { source, range } => {
                if allowed && env.field_in_range(*source, ctx.position, *range) {
                    Activation::Fired
                } else {
                    Activation::Idle
                }
            }
            TriggerBehavior::AmbientThreshold { quantity, min, max } => {
                if !allowed {
                    return Activation::Idle;
                }
                let Some(value) = env.ambient(*quantity, ctx.position) else {
                    return Activation::Idle;
                };
                let below = min.is_some_and(|m| value < m);
                let above = max.is_some_and(|m| value > m);
                if below || above {
                    Activation::Fired
                } else {
                    Activation::Idle
                }
            }
            TriggerBehavior::DeathNearby { .. } | TriggerBehavior::Event(_) => Activation::Idle,
        }
    }

    /// Offer a relayed event. May mark the event handled.
    pub fn on_relayed_event(
        &mut self,
        ctx: &TriggerContext,
        relayed: &mut RelayedEvent,
    ) -> Activation {
        if !self.can_trigger(ctx) {
            return Activation::Idle;
        }
        match (self, relayed.event) {
            (
                TriggerBehavior::DeathNearby { range },
                ArtifactEvent::LifeStateChanged {
                    position, old, new, ..
                },
            ) => {
                let died = new == LifeState::Dead && old != LifeState::Dead;
                if died && position.within(&ctx.position, *range) {
                    Activation::Fired
                } else {
                    Activation::Idle
                }
            }
            (
                TriggerBehavior::Event(EventFilter::Damage {
                    damage_type,
                    threshold,
                    accumulated,
                }),
                ArtifactEvent::Damaged {
                    damage_type: taken,
                    amount,
                },
            ) => {
                if amount <= 0.0 || damage_type.is_some_and(|t| t != taken) {
                    return Activation::Idle;
                }
                *accumulated += amount;
                if *accumulated >= *threshold {
                    *accumulated = 0.0;
                    Activation::Fired
                } else {
                    Activation::Idle
                }
            }
            (TriggerBehavior::Event(EventFilter::Interact), ArtifactEvent::Interacted { .. }) => {
                if relayed.handled {
                    return Activation::Idle;
                }
                relayed.handled = true;
                Activation::Fired
            }
            (
                TriggerBehavior::Event(EventFilter::ToolUse { quality }),
                ArtifactEvent::ToolUsed {
                    quality: used,
                    cancelled,
                },
            ) => {
                if !cancelled && used == *quality {
                    Activation::Fired
                } else {
                    Activation::Idle
                }
            }
            _ => Activation::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{UniformEnvironment, Void};

    fn ctx(now: f64) -> TriggerContext {
        TriggerContext::new(now, Vec2::ZERO, true)
    }

    fn cooling(now: f64) -> TriggerContext {
        TriggerContext::new(now, Vec2::ZERO, false)
    }

    #[test]
    fn test_timer_fires_and_reschedules() {
        let mut timer = TriggerBehavior::timer(10.0);
        assert_eq!(timer.on_tick(&ctx(0.0), &Void), Activation::Idle);
        assert_eq!(timer.on_tick(&ctx(9.9), &Void), Activation::Idle);
        assert_eq!(timer.on_tick(&ctx(10.0), &Void), Activation::Fired);
        assert_eq!(timer.on_tick(&ctx(15.0), &Void), Activation::Idle);
        assert_eq!(timer.on_tick(&ctx(20.0), &Void), Activation::Fired);
    }

    #[test]
    fn test_timer_keeps_counting_during_cooldown() {
        let mut timer = TriggerBehavior::timer(5.0);
        timer.on_tick(&cooling(0.0), &Void);
        assert_eq!(timer.on_tick(&cooling(5.0), &Void), Activation::Fired);
        assert_eq!(
            timer,
            TriggerBehavior::Timer {
                delay: 5.0,
                next_activation: Some(10.0)
            }
        );
    }

    #[test]
    fn test_proximity_needs_field_in_range() {
        let mut magnet = TriggerBehavior::for_kind(TriggerKind::Magnet);
        let mut env = UniformEnvironment::standard();
        assert_eq!(magnet.on_tick(&ctx(0.0), &env), Activation::Idle);
        env.fields.push((FieldSource::Magnetic, Vec2::new(3.0, 0.0)));
        assert_eq!(magnet.on_tick(&ctx(0.0), &env), Activation::Fired);
        assert_eq!(magnet.on_tick(&cooling(0.0), &env), Activation::Idle);
    }

    #[test]
    fn test_ambient_thresholds() {
        let mut high = TriggerBehavior::for_kind(TriggerKind::PressureHigh);
        let mut low = TriggerBehavior::for_kind(TriggerKind::PressureLow);
        let mut env = UniformEnvironment::standard();
        assert_eq!(high.on_tick(&ctx(0.0), &env), Activation::Idle);
        assert_eq!(low.on_tick(&ctx(0.0), &env), Activation::Idle);

        env.pressure = Some(2.0);
        assert_eq!(high.on_tick(&ctx(0.0), &env), Activation::Fired);
        env.pressure = Some(0.1);
        assert_eq!(low.on_tick(&ctx(0.0), &env), Activation::Fired);

        env.pressure = None;
        assert_eq!(low.on_tick(&ctx(0.0), &env), Activation::Idle);
    }

    #[test]
    fn test_death_nearby_only_on_transition_in_range() {
        let mut death = TriggerBehavior::for_kind(TriggerKind::Death);
        let died_near = ArtifactEvent::LifeStateChanged {
            entity: 1,
            position: Vec2::new(5.0, 0.0),
            old: LifeState::Critical,
            new: LifeState::Dead,
        };
        let died_far = ArtifactEvent::LifeStateChanged {
            entity: 2,
            position: Vec2::new(50.0, 0.0),
            old: LifeState::Alive,
            new: LifeState::Dead,
        };
        let already_dead = ArtifactEvent::LifeStateChanged {
            entity: 3,
            position: Vec2::ZERO,
            old: LifeState::Dead,
            new: LifeState::Dead,
        };
        let mut e = RelayedEvent::new(died_near);
        assert_eq!(death.on_relayed_event(&ctx(0.0), &mut e), Activation::Fired);
        let mut e = RelayedEvent::new(died_far);
        assert_eq!(death.on_relayed_event(&ctx(0.0), &mut e), Activation::Idle);
        let mut e = RelayedEvent::new(already_dead);
        assert_eq!(death.on_relayed_event(&ctx(0.0), &mut e), Activation::Idle);
        assert!(!death.is_polled());
    }

    #[test]
    fn test_damage_accumulates_by_type() {
        let mut brute = TriggerBehavior::for_kind(TriggerKind::DamageBrute);
        let hit = |t, amount| {
            RelayedEvent::new(ArtifactEvent::Damaged {
                damage_type: t,
                amount,
            })
        };
        assert_eq!(
            brute.on_relayed_event(&ctx(0.0), &mut hit(DamageType::Brute, 15.0)),
            Activation::Idle
        );
        assert_eq!(
            brute.on_relayed_event(&ctx(0.0), &mut hit(DamageType::Burn, 15.0)),
            Activation::Idle
        );
        assert_eq!(
            brute.on_relayed_event(&ctx(0.0), &mut hit(DamageType::Brute, 5.0)),
            Activation::Fired
        );
        // Counter restarts after firing.
        assert_eq!(
            brute.on_relayed_event(&ctx(0.0), &mut hit(DamageType::Brute, 5.0)),
            Activation::Idle
        );
    }

    #[test]
    fn test_damage_ignored_during_cooldown() {
        let mut any = TriggerBehavior::for_kind(TriggerKind::DamageAny);
        let mut e = RelayedEvent::new(ArtifactEvent::Damaged {
            damage_type: DamageType::Shock,
            amount: 100.0,
        });
        assert_eq!(any.on_relayed_event(&cooling(0.0), &mut e), Activation::Idle);
        assert_eq!(any, TriggerBehavior::damage(None, 30.0));
    }

    #[test]
    fn test_cancelled_tool_use_ignored() {
        let mut pry = TriggerBehavior::for_kind(TriggerKind::ToolPry);
        let mut e = RelayedEvent::new(ArtifactEvent::ToolUsed {
            quality: ToolQuality::Prying,
            cancelled: true,
        });
        assert_eq!(pry.on_relayed_event(&ctx(0.0), &mut e), Activation::Idle);
        let mut e = RelayedEvent::new(ArtifactEvent::ToolUsed {
            quality: ToolQuality::Prying,
            cancelled: false,
        });
        assert_eq!(pry.on_relayed_event(&ctx(0.0), &mut e), Activation::Fired);
    }

    #[test]
    fn test_every_kind_builds_matching_shape() {
        for kind in TriggerKind::all() {
            let behavior = TriggerBehavior::for_kind(*kind);
            assert_eq!(behavior.is_polled(), kind.category().is_polled(), "{kind}");
        }
    }
}
