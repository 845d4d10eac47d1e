//! Xenoarch Core - Artifact Simulation Engine
//!
//! Hosts procedurally generated artifacts in an ECS world alongside the
//! things their triggers sense: field emitters, mobs that can die nearby,
//! and zones of atmosphere.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Artifacts, field emitters, mobs, ambient zones
//! - **Components**: Pure data attached to entities (Position, ArtifactHost, Mob, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! Artifact behavior itself lives in `xenoarch-logic`; this crate only feeds
//! it world state and routes events.
//!
//! # Example
//!
//! ```rust
//! use xenoarch_core::prelude::*;
//! use xenoarch_logic::config::ArtifactConfig;
//! use xenoarch_logic::environment::Vec2;
//!
//! let mut engine = ArtifactEngine::new(42);
//! let artifact = engine
//!     .spawn_artifact(ArtifactConfig::default(), Vec2::ZERO)
//!     .expect("default config is valid");
//! engine.spawn_field_emitter(FieldEmitter::magnet(), Vec2::new(1.0, 0.0));
//!
//! for _ in 0..60 {
//!     engine.update(1.0);
//! }
//! assert!(engine.snapshot(artifact).is_some());
//! ```

pub mod components;
pub mod engine;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{ArtifactEngine, EngineError};
}
