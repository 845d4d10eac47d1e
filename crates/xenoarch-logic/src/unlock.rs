//! Unlock aggregation: a windowed two-state machine per artifact.
//!
//! The first activation after the cooldown opens a window; every distinct
//! node activated before the window closes is recorded once. When a tick
//! finds the window expired, the recorded set decides which nodes unlock and
//! the artifact goes back to idle until the cooldown elapses.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::NodeGraph;

/// Activations collected while unlocking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockWindow {
    pub started_at: f64,
    pub end_time: f64,
    pub triggered: BTreeSet<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum UnlockState {
    #[default]
    Idle,
    Unlocking(UnlockWindow),
}

impl UnlockState {
    pub fn is_unlocking(&self) -> bool {
        matches!(self, UnlockState::Unlocking(_))
    }

    pub fn window(&self) -> Option<&UnlockWindow> {
        match self {
            UnlockState::Unlocking(window) => Some(window),
            UnlockState::Idle => None,
        }
    }
}

/// What a call to [`UnlockAggregator::trigger`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerResult {
    /// Cooldown still running; nothing changed.
    CoolingDown,
    /// Opened a new window and recorded the node.
    Began,
    /// Recorded the node in the open window.
    Counted,
    /// The node was already recorded in this window.
    AlreadyCounted,
}

/// How a window resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnlockOutcome {
    Success { unlocked: Vec<usize> },
    Failure,
}

impl UnlockOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UnlockOutcome::Success { .. })
    }
}

/// A closed window and what came of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub resolved_at: f64,
    pub triggered: Vec<usize>,
    pub outcome: UnlockOutcome,
}

/// Presentation hooks fired by the aggregator.
pub trait UnlockNotifier {
    fn began_unlocking(&mut self, now: f64, end_time: f64);
    fn resolved(&mut self, resolution: &Resolution);
}

/// Discards notifications.
impl UnlockNotifier for () {
    fn began_unlocking(&mut self, _now: f64, _end_time: f64) {}
    fn resolved(&mut self, _resolution: &Resolution) {}
}

/// A notification captured for later delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnlockNotice {
    Began { at: f64, end_time: f64 },
    Resolved(Resolution),
}

impl UnlockNotifier for Vec<UnlockNotice> {
    fn began_unlocking(&mut self, now: f64, end_time: f64) {
        self.push(UnlockNotice::Began { at: now, end_time });
    }

    fn resolved(&mut self, resolution: &Resolution) {
        self.push(UnlockNotice::Resolved(resolution.clone()));
    }
}

/// Per-artifact unlock state and its cooldown gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockAggregator {
    state: UnlockState,
    /// Activations before this time are ignored.
    next_unlock_time: f64,
    window_duration: f64,
    cooldown: f64,
}

impl UnlockAggregator {
    pub fn new(window_duration: f64, cooldown: f64) -> Self {
        Self {
            state: UnlockState::Idle,
            next_unlock_time: 0.0,
            window_duration,
            cooldown,
        }
    }

    pub fn state(&self) -> &UnlockState {
        &self.state
    }

    pub fn next_unlock_time(&self) -> f64 {
        self.next_unlock_time
    }

    pub fn window_duration(&self) -> f64 {
        self.window_duration
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }

    pub fn cooldown_elapsed(&self, now: f64) -> bool {
        now >= self.next_unlock_time
    }

    /// Record an activation of `node` at `now`.
    pub fn trigger(
        &mut self,
        node: usize,
        now: f64,
        notifier: &mut dyn UnlockNotifier,
    ) -> TriggerResult {
        if !self.cooldown_elapsed(now) {
            return TriggerResult::CoolingDown;
        }

        match &mut self.state {
            UnlockState::Unlocking(window) => {
                if window.triggered.insert(node) {
                    log::debug!("Node {} counted toward unlock", node);
                    TriggerResult::Counted
                } else {
                    TriggerResult::AlreadyCounted
                }
            }
            UnlockState::Idle => {
                let end_time = now + self.window_duration;
                self.state = UnlockState::Unlocking(UnlockWindow {
                    started_at: now,
                    end_time,
                    triggered: BTreeSet::from([node]),
                });
                log::info!("Unlock window opened at {:.2}s by node {}", now, node);
                notifier.began_unlocking(now, end_time);
                TriggerResult::Began
            }
        }
    }

    /// Close the window if it has expired, unlocking qualifying nodes.
    pub fn tick(
        &mut self,
        now: f64,
        graph: &mut NodeGraph,
        notifier: &mut dyn UnlockNotifier,
    ) -> Option<Resolution> {
        let UnlockState::Unlocking(window) = &self.state else {
            return None;
        };
        if now <= window.end_time {
            return None;
        }

        let UnlockState::Unlocking(window) = std::mem::take(&mut self.state) else {
            return None;
        };

        let unlocked = graph.unlock_candidates(&window.triggered);
        for &index in &unlocked {
            if let Some(node) = graph.node_mut(index) {
                node.locked = false;
            }
        }
        let outcome = if unlocked.is_empty() {
            UnlockOutcome::Failure
        } else {
            UnlockOutcome::Success { unlocked }
        };

        self.next_unlock_time = now + self.cooldown;
        let resolution = Resolution {
            resolved_at: now,
            triggered: window.triggered.into_iter().collect(),
            outcome,
        };
        log::info!(
            "Unlock window resolved at {:.2}s: {:?} ({} nodes triggered)",
            now,
            resolution.outcome,
            resolution.triggered.len()
        );
        notifier.resolved(&resolution);
        Some(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TriggerKind;

    /// 0 -> 1 -> 2
    fn chain() -> NodeGraph {
        let mut graph = NodeGraph::new();
        graph.add_node(0, 0, TriggerKind::Interact);
        graph.add_node(1, 0, TriggerKind::Heat);
        graph.add_node(2, 0, TriggerKind::Cold);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.refresh_summary();
        graph
    }

    #[test]
    fn test_window_resolution_timeline() {
        let mut graph = chain();
        let mut agg = UnlockAggregator::new(5.0, 10.0);
        let mut notices: Vec<UnlockNotice> = Vec::new();

        assert_eq!(agg.trigger(0, 0.0, &mut notices), TriggerResult::Began);
        assert_eq!(agg.state().window().unwrap().end_time, 5.0);
        assert_eq!(notices, vec![UnlockNotice::Began { at: 0.0, end_time: 5.0 }]);

        assert!(agg.tick(4.9, &mut graph, &mut notices).is_none());
        assert!(agg.state().is_unlocking());
        // Exactly at end_time the window is still open.
        assert!(agg.tick(5.0, &mut graph, &mut notices).is_none());

        let resolution = agg.tick(5.1, &mut graph, &mut notices).unwrap();
        assert_eq!(*agg.state(), UnlockState::Idle);
        assert!((agg.next_unlock_time() - 15.1).abs() < 1e-9);
        assert_eq!(resolution.triggered, vec![0]);
        assert_eq!(resolution.outcome, UnlockOutcome::Success { unlocked: vec![0] });
        assert!(!graph.node(0).unwrap().locked);
        assert_eq!(notices.len(), 2);
    }

    #[test]
    fn test_repeated_trigger_counts_once() {
        let mut agg = UnlockAggregator::new(5.0, 0.0);
        assert_eq!(agg.trigger(1, 0.0, &mut ()), TriggerResult::Began);
        assert_eq!(agg.trigger(1, 1.0, &mut ()), TriggerResult::AlreadyCounted);
        assert_eq!(agg.trigger(2, 1.0, &mut ()), TriggerResult::Counted);
        assert_eq!(agg.trigger(2, 1.0, &mut ()), TriggerResult::AlreadyCounted);
        assert_eq!(agg.state().window().unwrap().triggered.len(), 2);
    }

    #[test]
    fn test_cooldown_blocks_triggers() {
        let mut graph = chain();
        let mut agg = UnlockAggregator::new(1.0, 10.0);
        agg.trigger(0, 0.0, &mut ());
        agg.tick(2.0, &mut graph, &mut ()).unwrap();

        let before = agg.clone();
        assert_eq!(agg.trigger(1, 11.9, &mut ()), TriggerResult::CoolingDown);
        assert_eq!(agg, before);
        assert_eq!(agg.trigger(1, 12.0, &mut ()), TriggerResult::Began);
    }

    #[test]
    fn test_deep_node_needs_its_predecessor() {
        let mut graph = chain();
        let mut agg = UnlockAggregator::new(1.0, 0.0);
        agg.trigger(2, 0.0, &mut ());
        let resolution = agg.tick(2.0, &mut graph, &mut ()).unwrap();
        assert_eq!(resolution.outcome, UnlockOutcome::Failure);
        assert!(graph.nodes().iter().all(|n| n.locked));

        agg.trigger(1, 3.0, &mut ());
        agg.trigger(2, 3.5, &mut ());
        agg.trigger(0, 3.5, &mut ());
        let resolution = agg.tick(5.0, &mut graph, &mut ()).unwrap();
        assert_eq!(
            resolution.outcome,
            UnlockOutcome::Success {
                unlocked: vec![0, 1, 2]
            }
        );
    }

    #[test]
    fn test_tick_while_idle_does_nothing() {
        let mut graph = chain();
        let mut agg = UnlockAggregator::new(1.0, 3.0);
        let mut notices: Vec<UnlockNotice> = Vec::new();
        assert!(agg.tick(100.0, &mut graph, &mut notices).is_none());
        assert!(notices.is_empty());
        assert_eq!(agg.next_unlock_time(), 0.0);
    }
}
