//! Simulation engine - main entry point for running artifacts in a world

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use xenoarch_logic::catalog::TriggerCatalog;
use xenoarch_logic::config::{validate_config, ArtifactConfig, ConfigError};
use xenoarch_logic::environment::Vec2;
use xenoarch_logic::events::{ArtifactEvent, LifeState, RelayedEvent};
use xenoarch_logic::graph::GraphSnapshot;
use xenoarch_logic::unlock::{Resolution, UnlockNotice};
use xenoarch_logic::Artifact;

use crate::components::*;
use crate::systems::*;

/// Errors raised by the engine's entity operations.
#[derive(Debug)]
pub enum EngineError {
    /// The artifact definition failed validation.
    InvalidConfig(Vec<ConfigError>),
    /// Entity does not exist or lacks the component the call needs.
    NoSuchEntity(Entity),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidConfig(errors) => {
                write!(f, "Invalid artifact definition:")?;
                for e in errors {
                    write!(f, " {};", e)?;
                }
                Ok(())
            }
            EngineError::NoSuchEntity(entity) => write!(f, "No such entity: {:?}", entity),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        EngineError::InvalidConfig(vec![e])
    }
}

/// Main simulation engine
pub struct ArtifactEngine {
    /// ECS world containing artifacts and the things they sense
    pub world: World,
    /// Simulation time in seconds since start
    pub sim_time: f64,
    catalog: TriggerCatalog,
    rng: StdRng,
    /// Windows resolved since the last drain
    resolutions: Vec<(Entity, Resolution)>,
    time_scale: f32,
}

impl ArtifactEngine {
    /// Create an empty world using the standard trigger catalog
    pub fn new(seed: u64) -> Self {
        Self::with_catalog(seed, TriggerCatalog::standard())
    }

    pub fn with_catalog(seed: u64, catalog: TriggerCatalog) -> Self {
        Self {
            world: World::new(),
            sim_time: 0.0,
            catalog,
            rng: StdRng::seed_from_u64(seed),
            resolutions: Vec::new(),
            time_scale: 1.0,
        }
    }

    pub fn catalog(&self) -> &TriggerCatalog {
        &self.catalog
    }

    /// Validate a definition, generate its graph, and place it in the world
    pub fn spawn_artifact(
        &mut self,
        config: ArtifactConfig,
        position: Vec2,
    ) -> Result<Entity, EngineError> {
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(EngineError::InvalidConfig(errors));
        }
        let table = self.catalog.resolve(&config)?;

        let name = Name::new(config.name.clone());
        let artifact = Artifact::generate(config, table, &mut self.rng);
        log::info!(
            "Spawned artifact '{}' with {} nodes at ({:.1}, {:.1})",
            name.0,
            artifact.node_count(),
            position.x,
            position.y
        );
        Ok(self
            .world
            .spawn((ArtifactHost::new(artifact), Position(position), name)))
    }

    /// Place an already-built artifact in the world
    pub fn insert_artifact(&mut self, artifact: Artifact, position: Vec2) -> Entity {
        let name = Name::new(artifact.config().name.clone());
        self.world
            .spawn((ArtifactHost::new(artifact), Position(position), name))
    }

    /// Throw away an artifact's graph and generate a new one
    pub fn regenerate_artifact(&mut self, entity: Entity) -> Result<(), EngineError> {
        let mut host = self
            .world
            .get::<&mut ArtifactHost>(entity)
            .map_err(|_| EngineError::NoSuchEntity(entity))?;
        let table = self.catalog.resolve(host.artifact.config())?;
        host.artifact.regenerate(table, &mut self.rng);
        host.pending.clear();
        Ok(())
    }

    pub fn spawn_field_emitter(&mut self, emitter: FieldEmitter, position: Vec2) -> Entity {
        self.world.spawn((emitter, Position(position)))
    }

    pub fn set_field_active(&mut self, entity: Entity, active: bool) -> Result<(), EngineError> {
        let mut emitter = self
            .world
            .get::<&mut FieldEmitter>(entity)
            .map_err(|_| EngineError::NoSuchEntity(entity))?;
        emitter.active = active;
        Ok(())
    }

    pub fn spawn_mob(&mut self, position: Vec2) -> Entity {
        self.world.spawn((Mob::default(), Position(position)))
    }

    /// Change a mob's life state; artifacts hear about it immediately.
    pub fn set_mob_state(&mut self, entity: Entity, state: LifeState) -> Result<(), EngineError> {
        let (old, position) = {
            let (mob, pos) = self
                .world
                .query_one_mut::<(&mut Mob, &Position)>(entity)
                .map_err(|_| EngineError::NoSuchEntity(entity))?;
            let old = mob.state;
            mob.state = state;
            (old, pos.0)
        };
        if old == state {
            return Ok(());
        }
        let event = ArtifactEvent::LifeStateChanged {
            entity: entity.to_bits().get(),
            position,
            old,
            new: state,
        };
        broadcast_event(&mut self.world, event, self.sim_time);
        Ok(())
    }

    pub fn spawn_ambient_zone(&mut self, zone: AmbientZone) -> Entity {
        self.world.spawn((zone,))
    }

    /// Move an entity, e.g. carry an artifact around
    pub fn set_position(&mut self, entity: Entity, position: Vec2) -> Result<(), EngineError> {
        let mut pos = self
            .world
            .get::<&mut Position>(entity)
            .map_err(|_| EngineError::NoSuchEntity(entity))?;
        pos.0 = position;
        Ok(())
    }

    /// Put an artifact in or take it out of a container
    pub fn set_contained(&mut self, entity: Entity, contained: bool) -> Result<(), EngineError> {
        if !self.world.contains(entity) {
            return Err(EngineError::NoSuchEntity(entity));
        }
        if contained {
            let _ = self.world.insert_one(entity, Contained);
        } else {
            let _ = self.world.remove_one::<Contained>(entity);
        }
        Ok(())
    }

    /// Raise a domain event against one artifact
    pub fn raise_event(
        &mut self,
        entity: Entity,
        event: ArtifactEvent,
    ) -> Result<RelayedEvent, EngineError> {
        relay_event(&mut self.world, entity, event, self.sim_time)
            .ok_or(EngineError::NoSuchEntity(entity))
    }

    /// Activate one node directly, bypassing its trigger behavior
    pub fn trigger_node(&mut self, entity: Entity, node: usize) -> Result<(), EngineError> {
        let mut host = self
            .world
            .get::<&mut ArtifactHost>(entity)
            .map_err(|_| EngineError::NoSuchEntity(entity))?;
        let ArtifactHost { artifact, pending } = &mut *host;
        artifact.trigger(node, self.sim_time, pending);
        Ok(())
    }

    /// Update the simulation by delta_seconds
    pub fn update(&mut self, delta_seconds: f32) {
        self.sim_time += (delta_seconds * self.time_scale) as f64;
        let env = WorldEnvironment::capture(&self.world);
        let resolved = artifact_tick_system(&mut self.world, &env, self.sim_time);
        self.resolutions.extend(resolved);
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Get current simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Count artifacts in the world
    pub fn artifact_count(&self) -> usize {
        self.world.query::<&ArtifactHost>().iter().count()
    }

    /// Artifacts with an open unlock window
    pub fn unlocking_artifacts(&self) -> Vec<Entity> {
        self.world
            .query::<&ArtifactHost>()
            .iter()
            .filter(|(_, host)| host.artifact.unlock().state().is_unlocking())
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Run `f` against an artifact
    pub fn with_artifact<T>(&self, entity: Entity, f: impl FnOnce(&Artifact) -> T) -> Option<T> {
        let host = self.world.get::<&ArtifactHost>(entity).ok()?;
        Some(f(&host.artifact))
    }

    pub fn snapshot(&self, entity: Entity) -> Option<GraphSnapshot> {
        self.with_artifact(entity, Artifact::snapshot)
    }

    /// Take every notification raised since the last drain
    pub fn drain_notices(&mut self) -> Vec<(Entity, UnlockNotice)> {
        let mut notices = Vec::new();
        for (entity, host) in self.world.query_mut::<&mut ArtifactHost>() {
            notices.extend(host.pending.drain(..).map(|n| (entity, n)));
        }
        notices
    }

    /// Take every resolution recorded since the last drain
    pub fn drain_resolutions(&mut self) -> Vec<(Entity, Resolution)> {
        std::mem::take(&mut self.resolutions)
    }
}

impl Default for ArtifactEngine {
    fn default() -> Self {
        Self::new(0)
    }
}
