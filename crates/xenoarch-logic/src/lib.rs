//! Pure artifact logic for Xenoarch.
//!
//! This crate contains everything about artifacts that is independent of the
//! host world: graph generation, trigger behaviors, event relay, and unlock
//! aggregation. Functions take plain data and an explicit random source, so
//! generation is reproducible from a seed and every piece is unit-testable.
//! The host supplies positions and ambient conditions through the
//! [`environment::Environment`] trait.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`artifact`] | Aggregate root: graph + unlock state, tick and relay entry points |
//! | [`catalog`] | Trigger kinds, weight tables, JSON catalog loading |
//! | [`config`] | Artifact definitions, integer ranges, definition validation |
//! | [`environment`] | Host sampling interface (ambient quantities, field sources) |
//! | [`events`] | Domain events and ordered fan-out to nodes |
//! | [`generation`] | Segmented layer-by-layer DAG builder with component stitching |
//! | [`graph`] | Arena node graph, components, unlock candidates, snapshots |
//! | [`pool`] | Weighted draw-without-replacement of eligible trigger kinds |
//! | [`triggers`] | Closed set of trigger behaviors and their activation rules |
//! | [`unlock`] | Idle/Unlocking window state machine and notifications |

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod environment;
pub mod events;
pub mod generation;
pub mod graph;
pub mod pool;
pub mod triggers;
pub mod unlock;

pub use artifact::Artifact;
pub use catalog::{TriggerCatalog, TriggerKind, WeightTable};
pub use config::{validate_config, ArtifactConfig, ConfigError, IntRange};
pub use graph::NodeGraph;
