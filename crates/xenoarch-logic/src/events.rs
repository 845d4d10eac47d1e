//! Artifact events and the relay that fans them out to nodes.
//!
//! The host raises an event once against the artifact; `relay_to_nodes`
//! hands it to every node's trigger in node-index order. Triggers may mark the
//! event handled, and later nodes see that mark.

use serde::{Deserialize, Serialize};

use crate::environment::Vec2;
use crate::graph::NodeGraph;
use crate::triggers::{Activation, TriggerContext};

/// Damage categories the artifact distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Brute,
    Burn,
    Shock,
}

/// Tool qualities that tool-use triggers filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolQuality {
    Prying,
    Welding,
    Screwing,
    Cutting,
}

/// Life-cycle state of a host entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeState {
    Alive,
    Critical,
    Dead,
}

/// Domain events the host relays to an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArtifactEvent {
    /// The artifact took damage.
    Damaged { damage_type: DamageType, amount: f32 },
    /// Someone used the artifact with an empty hand.
    Interacted { user: u64 },
    /// A tool-use do-after on the artifact finished.
    ToolUsed { quality: ToolQuality, cancelled: bool },
    /// An entity's life state changed somewhere in the world.
    LifeStateChanged {
        entity: u64,
        position: Vec2,
        old: LifeState,
        new: LifeState,
    },
}

/// An event in flight through the relay, with the fields handlers may set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelayedEvent {
    pub event: ArtifactEvent,
    /// Set by the first handler that consumes the event.
    pub handled: bool,
}

impl RelayedEvent {
    pub fn new(event: ArtifactEvent) -> Self {
        Self {
            event,
            handled: false,
        }
    }
}

/// Offer `relayed` to each subscriber node in turn and collect the nodes that
/// fired, in the order they fired.
///
/// Subscribers are visited in ascending index order whatever order they are
/// passed in, so handlers see a stable sequence of mutations. Indices outside
/// the graph are skipped.
pub fn relay_to_nodes(
    graph: &mut NodeGraph,
    subscribers: &[usize],
    relayed: &mut RelayedEvent,
    ctx: &TriggerContext,
) -> Vec<usize> {
    let mut order = subscribers.to_vec();
    order.sort_unstable();
    order.dedup();

    let mut fired = Vec::new();
    for index in order {
        let Some(node) = graph.node_mut(index) else {
            continue;
        };
        if node.trigger.on_relayed_event(ctx, relayed) == Activation::Fired {
            fired.push(index);
        }
    }
    fired
}
