//! Artifact systems - ticking, event routing, and death broadcasts

use hecs::{Entity, World};
use xenoarch_logic::environment::{Environment, Void};
use xenoarch_logic::events::{ArtifactEvent, RelayedEvent};
use xenoarch_logic::unlock::Resolution;

use crate::components::{ArtifactHost, Contained, Position};

/// Tick every artifact once. Contained artifacts sense no atmosphere.
///
/// Returns the windows that resolved this step.
pub fn artifact_tick_system(
    world: &mut World,
    env: &dyn Environment,
    now: f64,
) -> Vec<(Entity, Resolution)> {
    let mut resolved = Vec::new();
    for (entity, (host, pos, contained)) in
        world.query_mut::<(&mut ArtifactHost, &Position, Option<&Contained>)>()
    {
        let sensed: &dyn Environment = if contained.is_some() { &Void } else { env };
        let ArtifactHost { artifact, pending } = host;
        if let Some(resolution) = artifact.tick(now, pos.0, sensed, pending) {
            resolved.push((entity, resolution));
        }
    }
    resolved
}

/// Raise `event` against one artifact. `None` if the entity is not an
/// artifact.
pub fn relay_event(
    world: &mut World,
    entity: Entity,
    event: ArtifactEvent,
    now: f64,
) -> Option<RelayedEvent> {
    let (host, pos) = world
        .query_one_mut::<(&mut ArtifactHost, &Position)>(entity)
        .ok()?;
    let ArtifactHost { artifact, pending } = host;
    Some(artifact.relay(event, now, pos.0, pending))
}

/// Raise `event` against every artifact in the world, e.g. a death that any
/// nearby artifact may care about. Returns how many artifacts handled it.
pub fn broadcast_event(world: &mut World, event: ArtifactEvent, now: f64) -> usize {
    let mut handled = 0;
    for (_, (host, pos)) in world.query_mut::<(&mut ArtifactHost, &Position)>() {
        let ArtifactHost { artifact, pending } = host;
        if artifact.relay(event, now, pos.0, pending).handled {
            handled += 1;
        }
    }
    handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use xenoarch_logic::catalog::TriggerKind;
    use xenoarch_logic::config::ArtifactConfig;
    use xenoarch_logic::environment::UniformEnvironment;
    use xenoarch_logic::graph::NodeGraph;
    use xenoarch_logic::Artifact;

    fn host_with(kinds: &[TriggerKind]) -> ArtifactHost {
        let mut graph = NodeGraph::new();
        for kind in kinds {
            graph.add_node(0, 0, *kind);
        }
        ArtifactHost::new(Artifact::from_graph(ArtifactConfig::default(), graph))
    }

    #[test]
    fn test_contained_artifact_senses_nothing() {
        let mut world = World::new();
        let open = world.spawn((host_with(&[TriggerKind::Heat]), Position::new(0.0, 0.0)));
        let boxed = world.spawn((
            host_with(&[TriggerKind::Heat]),
            Position::new(0.0, 0.0),
            Contained,
        ));
        let hot = UniformEnvironment {
            temperature: Some(90.0),
            ..UniformEnvironment::standard()
        };

        artifact_tick_system(&mut world, &hot, 1.0);

        let open_host = world.get::<&ArtifactHost>(open).unwrap();
        assert!(open_host.artifact.unlock().state().is_unlocking());
        assert_eq!(open_host.pending.len(), 1);
        let boxed_host = world.get::<&ArtifactHost>(boxed).unwrap();
        assert!(!boxed_host.artifact.unlock().state().is_unlocking());
    }

    #[test]
    fn test_relay_to_non_artifact() {
        let mut world = World::new();
        let rock = world.spawn((Position::new(0.0, 0.0),));
        assert!(relay_event(&mut world, rock, ArtifactEvent::Interacted { user: 1 }, 0.0).is_none());
    }

    #[test]
    fn test_broadcast_counts_handlers() {
        let mut world = World::new();
        world.spawn((host_with(&[TriggerKind::Interact]), Position::new(0.0, 0.0)));
        world.spawn((host_with(&[TriggerKind::Heat]), Position::new(0.0, 0.0)));
        let handled = broadcast_event(&mut world, ArtifactEvent::Interacted { user: 3 }, 0.0);
        assert_eq!(handled, 1);
    }
}
