//! The artifact aggregate: a generated node graph plus its unlock state.
//!
//! Every activation path ends in [`Artifact::trigger`], whether it came from a
//! polled trigger in [`Artifact::tick`] or a relayed event in
//! [`Artifact::relay`].

use rand::Rng;

use crate::catalog::WeightTable;
use crate::config::ArtifactConfig;
use crate::environment::{Environment, Vec2};
use crate::events::{relay_to_nodes, ArtifactEvent, RelayedEvent};
use crate::generation::{generate_graph, GenerationReport};
use crate::graph::{GraphSnapshot, NodeGraph};
use crate::pool::Eligibility;
use crate::triggers::{Activation, TriggerContext};
use crate::unlock::{Resolution, TriggerResult, UnlockAggregator, UnlockNotifier};

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    config: ArtifactConfig,
    graph: NodeGraph,
    unlock: UnlockAggregator,
    report: GenerationReport,
}

impl Artifact {
    /// Generate an artifact, using the config's deny list as eligibility.
    pub fn generate(config: ArtifactConfig, table: &WeightTable, rng: &mut impl Rng) -> Self {
        let generated = generate_graph(&config, table, &config, rng);
        Self::assemble(config, generated.graph, generated.report)
    }

    /// Generate with a caller-supplied eligibility predicate.
    pub fn generate_with(
        config: ArtifactConfig,
        table: &WeightTable,
        eligibility: &impl Eligibility,
        rng: &mut impl Rng,
    ) -> Self {
        let generated = generate_graph(&config, table, eligibility, rng);
        Self::assemble(config, generated.graph, generated.report)
    }

    /// Wrap a hand-built graph.
    pub fn from_graph(config: ArtifactConfig, mut graph: NodeGraph) -> Self {
        graph.refresh_summary();
        let report = GenerationReport {
            requested_nodes: graph.len(),
            actual_nodes: graph.len(),
            segment_sizes: (0..graph.segment_count())
                .map(|s| graph.segment_nodes(s).len())
                .collect(),
            ..GenerationReport::default()
        };
        Self::assemble(config, graph, report)
    }

    fn assemble(config: ArtifactConfig, graph: NodeGraph, report: GenerationReport) -> Self {
        let unlock = UnlockAggregator::new(config.unlock_window_duration, config.unlock_cooldown);
        Self {
            config,
            graph,
            unlock,
            report,
        }
    }

    /// Replace the graph wholesale and reset the unlock state.
    pub fn regenerate(&mut self, table: &WeightTable, rng: &mut impl Rng) {
        let generated = generate_graph(&self.config, table, &self.config, rng);
        log::info!(
            "Regenerated '{}': {} -> {} nodes",
            self.config.name,
            self.graph.len(),
            generated.graph.len()
        );
        self.graph = generated.graph;
        self.report = generated.report;
        self.unlock =
            UnlockAggregator::new(self.config.unlock_window_duration, self.config.unlock_cooldown);
    }

    pub fn config(&self) -> &ArtifactConfig {
        &self.config
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn unlock(&self) -> &UnlockAggregator {
        &self.unlock
    }

    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    pub fn node_count(&self) -> usize {
        self.graph.len()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }

    /// Whether every node has been unlocked.
    pub fn fully_unlocked(&self) -> bool {
        !self.graph.is_empty() && self.graph.nodes().iter().all(|n| !n.locked)
    }

    pub fn context(&self, now: f64, position: Vec2) -> TriggerContext {
        TriggerContext::new(now, position, self.unlock.cooldown_elapsed(now))
    }

    /// Shared gate plus the node's own preconditions. An index that names
    /// no node of this artifact never triggers.
    pub fn can_trigger(&self, index: usize, now: f64, position: Vec2) -> bool {
        match self.graph.node(index) {
            Some(node) => node.trigger.can_trigger(&self.context(now, position)),
            None => false,
        }
    }

    /// Register an activation of node `index`.
    pub fn trigger(
        &mut self,
        index: usize,
        now: f64,
        notifier: &mut dyn UnlockNotifier,
    ) -> TriggerResult {
        self.unlock.trigger(index, now, notifier)
    }

    /// One simulation step: poll tick-driven triggers, then let the
    /// aggregator close an expired window.
    pub fn tick(
        &mut self,
        now: f64,
        position: Vec2,
        env: &dyn Environment,
        notifier: &mut dyn UnlockNotifier,
    ) -> Option<Resolution> {
        let ctx = self.context(now, position);
        let mut fired = Vec::new();
        for node in self.graph.nodes_mut() {
            if !node.trigger.is_polled() {
                continue;
            }
            if node.trigger.on_tick(&ctx, env) == Activation::Fired {
                fired.push(node.index);
            }
        }
        for index in fired {
            log::debug!("Node {} fired on tick at {:.2}s", index, now);
            self.trigger(index, now, notifier);
        }
        self.unlock.tick(now, &mut self.graph, notifier)
    }

    /// Raise `event` against the artifact and forward it to every node.
    pub fn relay(
        &mut self,
        event: ArtifactEvent,
        now: f64,
        position: Vec2,
        notifier: &mut dyn UnlockNotifier,
    ) -> RelayedEvent {
        let ctx = self.context(now, position);
        let mut relayed = RelayedEvent::new(event);
        let subscribers: Vec<usize> = (0..self.graph.len()).collect();
        let fired = relay_to_nodes(&mut self.graph, &subscribers, &mut relayed, &ctx);
        for index in fired {
            log::debug!("Node {} fired on {:?}", index, event);
            self.trigger(index, now, notifier);
        }
        relayed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TriggerKind;
    use crate::environment::{UniformEnvironment, Void};
    use crate::events::{DamageType, ToolQuality};
    use crate::unlock::{UnlockNotice, UnlockOutcome, UnlockState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> ArtifactConfig {
        ArtifactConfig {
            unlock_window_duration: 5.0,
            unlock_cooldown: 10.0,
            ..ArtifactConfig::default()
        }
    }

    /// interact(0) -> heat(1), tool_weld(2) -> heat(1)
    fn hand_built() -> Artifact {
        let mut graph = NodeGraph::new();
        graph.add_node(0, 0, TriggerKind::Interact);
        graph.add_node(1, 0, TriggerKind::Heat);
        graph.add_node(0, 0, TriggerKind::ToolWeld);
        graph.add_edge(0, 1);
        graph.add_edge(2, 1);
        Artifact::from_graph(config(), graph)
    }

    #[test]
    fn test_interact_opens_window() {
        let mut artifact = hand_built();
        let mut notices: Vec<UnlockNotice> = Vec::new();
        let relayed = artifact.relay(
            ArtifactEvent::Interacted { user: 1 },
            0.0,
            Vec2::ZERO,
            &mut notices,
        );
        assert!(relayed.handled);
        assert!(artifact.unlock().state().is_unlocking());
        assert_eq!(notices.len(), 1);
    }

    #[test]
    fn test_full_unlock_through_tick_and_events() {
        let mut artifact = hand_built();
        let hot = UniformEnvironment {
            temperature: Some(80.0),
            ..UniformEnvironment::standard()
        };
        let mut notices: Vec<UnlockNotice> = Vec::new();

        artifact.relay(ArtifactEvent::Interacted { user: 1 }, 0.0, Vec2::ZERO, &mut notices);
        artifact.relay(
            ArtifactEvent::ToolUsed {
                quality: ToolQuality::Welding,
                cancelled: false,
            },
            1.0,
            Vec2::ZERO,
            &mut notices,
        );
        artifact.tick(2.0, Vec2::ZERO, &hot, &mut notices);
        assert_eq!(
            artifact.unlock().state().window().unwrap().triggered.len(),
            3
        );

        let resolution = artifact
            .tick(5.5, Vec2::ZERO, &Void, &mut notices)
            .expect("window should close");
        assert_eq!(
            resolution.outcome,
            UnlockOutcome::Success {
                unlocked: vec![0, 1, 2]
            }
        );
        assert!(artifact.fully_unlocked());
        assert_eq!(*artifact.unlock().state(), UnlockState::Idle);
        assert!((artifact.unlock().next_unlock_time() - 15.5).abs() < 1e-9);
    }

    #[test]
    fn test_cooldown_blocks_event_triggers() {
        let mut artifact = hand_built();
        artifact.trigger(0, 0.0, &mut ());
        artifact.tick(6.0, Vec2::ZERO, &Void, &mut ());

        assert!(!artifact.can_trigger(2, 7.0, Vec2::ZERO));
        let relayed = artifact.relay(
            ArtifactEvent::ToolUsed {
                quality: ToolQuality::Welding,
                cancelled: false,
            },
            7.0,
            Vec2::ZERO,
            &mut (),
        );
        assert!(!relayed.handled);
        assert_eq!(*artifact.unlock().state(), UnlockState::Idle);
        assert!(artifact.can_trigger(2, 16.0, Vec2::ZERO));
    }

    #[test]
    fn test_unknown_node_cannot_trigger() {
        let artifact = hand_built();
        assert!(!artifact.can_trigger(42, 0.0, Vec2::ZERO));
    }

    #[test]
    fn test_damage_below_threshold_does_not_fire() {
        let mut graph = NodeGraph::new();
        graph.add_node(0, 0, TriggerKind::DamageBrute);
        let mut artifact = Artifact::from_graph(config(), graph);
        let hit = ArtifactEvent::Damaged {
            damage_type: DamageType::Brute,
            amount: 8.0,
        };
        artifact.relay(hit, 0.0, Vec2::ZERO, &mut ());
        artifact.relay(hit, 0.5, Vec2::ZERO, &mut ());
        assert!(!artifact.unlock().state().is_unlocking());
        artifact.relay(hit, 1.0, Vec2::ZERO, &mut ());
        assert!(artifact.unlock().state().is_unlocking());
    }

    #[test]
    fn test_regenerate_resets_state() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut artifact = Artifact::generate(config(), &WeightTable::standard(), &mut rng);
        artifact.trigger(0, 0.0, &mut ());
        assert!(artifact.unlock().state().is_unlocking());

        artifact.regenerate(&WeightTable::standard(), &mut rng);
        assert_eq!(*artifact.unlock().state(), UnlockState::Idle);
        assert!(config().node_count.contains(artifact.node_count() as u32));
        assert!(artifact.graph().nodes().iter().all(|n| n.locked));
    }

    #[test]
    fn test_deny_list_respected() {
        let config = ArtifactConfig {
            denied_triggers: vec![TriggerKind::Death, TriggerKind::Magnet],
            ..config()
        };
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let artifact = Artifact::generate(config.clone(), &WeightTable::standard(), &mut rng);
            assert!(artifact
                .graph()
                .nodes()
                .iter()
                .all(|n| n.kind != TriggerKind::Death && n.kind != TriggerKind::Magnet));
        }
    }
}
