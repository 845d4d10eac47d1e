//! Trigger catalog - the kinds of trigger a node may carry and the named
//! weight tables generation draws them from.
//!
//! Weight tables are plain data and are normally loaded from JSON:
//!
//! ```
//! use xenoarch_logic::catalog::{TriggerCatalog, TriggerKind};
//!
//! let json = r#"{ "tables": { "calm": [
//!     { "kind": "timer_short", "weight": 2.0 },
//!     { "kind": "interact", "weight": 1.0 }
//! ] } }"#;
//! let catalog = TriggerCatalog::from_json(json).unwrap();
//! assert_eq!(catalog.table("calm").unwrap().entries[0].kind, TriggerKind::TimerShort);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ArtifactConfig, ConfigError};

/// Behavior family a trigger kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerCategory {
    /// Fires on a fixed schedule.
    Timer,
    /// Fires when a field source is near the artifact.
    Proximity,
    /// Fires when an ambient quantity leaves its bounds.
    Ambient,
    /// Fires when something dies nearby.
    Death,
    /// Fires on relayed domain events.
    Event,
}

impl TriggerCategory {
    /// Whether kinds of this category are polled every tick.
    pub fn is_polled(self) -> bool {
        matches!(
            self,
            TriggerCategory::Timer | TriggerCategory::Proximity | TriggerCategory::Ambient
        )
    }
}

/// Every trigger kind in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    TimerShort,
    TimerLong,
    Magnet,
    PressureHigh,
    PressureLow,
    Heat,
    Cold,
    Death,
    DamageBrute,
    DamageBurn,
    DamageAny,
    Interact,
    ToolPry,
    ToolWeld,
    ToolScrew,
}

impl TriggerKind {
    pub fn all() -> &'static [TriggerKind] {
        &[
            TriggerKind::TimerShort,
            TriggerKind::TimerLong,
            TriggerKind::Magnet,
            TriggerKind::PressureHigh,
            TriggerKind::PressureLow,
            TriggerKind::Heat,
            TriggerKind::Cold,
            TriggerKind::Death,
            TriggerKind::DamageBrute,
            TriggerKind::DamageBurn,
            TriggerKind::DamageAny,
            TriggerKind::Interact,
            TriggerKind::ToolPry,
            TriggerKind::ToolWeld,
            TriggerKind::ToolScrew,
        ]
    }

    pub fn category(self) -> TriggerCategory {
        match self {
            TriggerKind::TimerShort | TriggerKind::TimerLong => TriggerCategory::Timer,
            TriggerKind::Magnet => TriggerCategory::Proximity,
            TriggerKind::PressureHigh
            | TriggerKind::PressureLow
            | TriggerKind::Heat
            | TriggerKind::Cold => TriggerCategory::Ambient,
            TriggerKind::Death => TriggerCategory::Death,
            TriggerKind::DamageBrute
            | TriggerKind::DamageBurn
            | TriggerKind::DamageAny
            | TriggerKind::Interact
            | TriggerKind::ToolPry
            | TriggerKind::ToolWeld
            | TriggerKind::ToolScrew => TriggerCategory::Event,
        }
    }

    /// Identifier used in data files and logs.
    pub fn id(self) -> &'static str {
        match self {
            TriggerKind::TimerShort => "timer_short",
            TriggerKind::TimerLong => "timer_long",
            TriggerKind::Magnet => "magnet",
            TriggerKind::PressureHigh => "pressure_high",
            TriggerKind::PressureLow => "pressure_low",
            TriggerKind::Heat => "heat",
            TriggerKind::Cold => "cold",
            TriggerKind::Death => "death",
            TriggerKind::DamageBrute => "damage_brute",
            TriggerKind::DamageBurn => "damage_burn",
            TriggerKind::DamageAny => "damage_any",
            TriggerKind::Interact => "interact",
            TriggerKind::ToolPry => "tool_pry",
            TriggerKind::ToolWeld => "tool_weld",
            TriggerKind::ToolScrew => "tool_screw",
        }
    }

    /// Short hint shown to players examining the node.
    pub fn hint(self) -> &'static str {
        match self {
            TriggerKind::TimerShort => "It hums in a quick, steady rhythm.",
            TriggerKind::TimerLong => "It pulses slowly, as if counting.",
            TriggerKind::Magnet => "It twitches toward metal.",
            TriggerKind::PressureHigh => "It seems to strain against the air.",
            TriggerKind::PressureLow => "It seems to breathe out into emptiness.",
            TriggerKind::Heat => "It is warm to the touch.",
            TriggerKind::Cold => "Frost gathers in its grooves.",
            TriggerKind::Death => "It feels hungry.",
            TriggerKind::DamageBrute => "Its surface is pocked with dents.",
            TriggerKind::DamageBurn => "Scorch marks cover one face.",
            TriggerKind::DamageAny => "It looks like it could take a beating.",
            TriggerKind::Interact => "It seems to want to be held.",
            TriggerKind::ToolPry => "There is a seam you could get a bar into.",
            TriggerKind::ToolWeld => "One panel looks half-fused.",
            TriggerKind::ToolScrew => "Tiny slotted heads dot its rim.",
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.id())
    }
}

/// One weighted entry of a weight table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerWeight {
    pub kind: TriggerKind,
    pub weight: f32,
}

impl TriggerWeight {
    pub const fn new(kind: TriggerKind, weight: f32) -> Self {
        Self { kind, weight }
    }
}

/// Weighted trigger kinds available to an artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    pub entries: Vec<TriggerWeight>,
}

impl WeightTable {
    pub fn new(entries: Vec<TriggerWeight>) -> Self {
        Self { entries }
    }

    /// The table most artifacts draw from: every kind, common ones heavier.
    pub fn standard() -> Self {
        use TriggerKind::*;
        Self::new(vec![
            TriggerWeight::new(TimerShort, 1.0),
            TriggerWeight::new(TimerLong, 1.5),
            TriggerWeight::new(Magnet, 1.0),
            TriggerWeight::new(PressureHigh, 0.75),
            TriggerWeight::new(PressureLow, 0.75),
            TriggerWeight::new(Heat, 1.0),
            TriggerWeight::new(Cold, 1.0),
            TriggerWeight::new(Death, 0.5),
            TriggerWeight::new(DamageBrute, 1.5),
            TriggerWeight::new(DamageBurn, 1.0),
            TriggerWeight::new(DamageAny, 1.0),
            TriggerWeight::new(Interact, 2.0),
            TriggerWeight::new(ToolPry, 1.0),
            TriggerWeight::new(ToolWeld, 1.0),
            TriggerWeight::new(ToolScrew, 1.0),
        ])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Named weight tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerCatalog {
    pub tables: BTreeMap<String, WeightTable>,
}

impl TriggerCatalog {
    /// Catalog holding only the `standard` table.
    pub fn standard() -> Self {
        let mut tables = BTreeMap::new();
        tables.insert("standard".to_string(), WeightTable::standard());
        Self { tables }
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: TriggerCatalog = serde_json::from_str(json)?;
        for (name, table) in &catalog.tables {
            if let Some(bad) = table.entries.iter().find(|e| !e.weight.is_finite() || e.weight < 0.0) {
                return Err(CatalogError::InvalidWeight {
                    table: name.clone(),
                    kind: bad.kind,
                    weight: bad.weight,
                });
            }
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, name: impl Into<String>, table: WeightTable) {
        self.tables.insert(name.into(), table);
    }

    pub fn table(&self, name: &str) -> Option<&WeightTable> {
        self.tables.get(name)
    }

    /// Resolve an artifact's table reference at definition load time.
    pub fn resolve(&self, config: &ArtifactConfig) -> Result<&WeightTable, ConfigError> {
        self.table(&config.weight_table)
            .ok_or_else(|| ConfigError::UnknownWeightTable(config.weight_table.clone()))
    }
}

/// Errors loading a trigger catalog.
#[derive(Debug)]
pub enum CatalogError {
    Json(serde_json::Error),
    InvalidWeight { table: String, kind: TriggerKind, weight: f32 },
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Json(e)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Json(e) => write!(f, "catalog parse error: {}", e),
            CatalogError::InvalidWeight { table, kind, weight } => write!(
                f,
                "table '{}' gives {} an invalid weight {}",
                table, kind, weight
            ),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Json(e) => Some(e),
            CatalogError::InvalidWeight { .. } => None,
        }
    }
}
