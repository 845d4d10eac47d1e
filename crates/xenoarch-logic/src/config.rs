//! Artifact definitions and load-time validation.
//!
//! An `ArtifactConfig` describes the shape an artifact's node graph may take
//! (all ranges inclusive) plus the timing of its unlock window. Definitions
//! are validated once when they are loaded; a definition that fails
//! validation is rejected and never reaches generation.
//!
//! ```
//! use xenoarch_logic::config::{validate_config, ArtifactConfig};
//!
//! let config = ArtifactConfig::default();
//! assert!(validate_config(&config).is_empty());
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::TriggerKind;

/// Inclusive integer range used for generation-time sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub min: u32,
    pub max: u32,
}

impl IntRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range containing exactly one value.
    pub const fn exactly(value: u32) -> Self {
        Self { min: value, max: value }
    }

    pub fn is_inverted(&self) -> bool {
        self.min > self.max
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Uniformly sample a value. Inverted ranges collapse to `min`.
    pub fn sample(&self, rng: &mut impl Rng) -> u32 {
        if self.is_inverted() {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Which range of an `ArtifactConfig` an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeField {
    NodeCount,
    SegmentSize,
    NodesPerLayer,
    ScatterPerLayer,
}

impl std::fmt::Display for RangeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RangeField::NodeCount => "node_count",
            RangeField::SegmentSize => "segment_size",
            RangeField::NodesPerLayer => "nodes_per_layer",
            RangeField::ScatterPerLayer => "scatter_per_layer",
        };
        f.write_str(name)
    }
}

/// Definition of one artifact type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Display name of the artifact type.
    pub name: String,
    /// Total nodes in the generated graph.
    pub node_count: IntRange,
    /// Nodes handed to one segment.
    pub segment_size: IntRange,
    /// Base width of a layer (widened as depth increases).
    pub nodes_per_layer: IntRange,
    /// Extra redundant edges between a layer and its successors.
    pub scatter_per_layer: IntRange,
    /// Seconds an unlock window stays open after the first activation.
    pub unlock_window_duration: f64,
    /// Seconds after a window resolves before activations count again.
    pub unlock_cooldown: f64,
    /// Name of the weight table in the trigger catalog.
    pub weight_table: String,
    /// Trigger kinds this artifact type may never use.
    pub denied_triggers: Vec<TriggerKind>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            name: "Alien Artifact".to_string(),
            node_count: IntRange::new(6, 9),
            segment_size: IntRange::new(2, 5),
            nodes_per_layer: IntRange::new(1, 3),
            scatter_per_layer: IntRange::new(0, 2),
            unlock_window_duration: 10.0,
            unlock_cooldown: 10.0,
            weight_table: "standard".to_string(),
            denied_triggers: Vec::new(),
        }
    }
}

impl ArtifactConfig {
    /// Default eligibility check: the kind is not on the deny list.
    pub fn allows(&self, kind: TriggerKind) -> bool {
        !self.denied_triggers.contains(&kind)
    }
}

/// Artifact definition validation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `min > max` on one of the ranges.
    InvertedRange { field: RangeField, min: u32, max: u32 },
    /// A range whose minimum must be at least one.
    ZeroMinimum(RangeField),
    /// No artifact could ever fill even one segment.
    SegmentExceedsNodeCount { segment_min: u32, node_max: u32 },
    /// Unlock window must last some time.
    NonPositiveWindow(f64),
    /// Cooldown cannot run backwards.
    NegativeCooldown(f64),
    /// No weight table named.
    EmptyWeightTable,
    /// Weight table name not present in the catalog.
    UnknownWeightTable(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvertedRange { field, min, max } => {
                write!(f, "{} range is inverted: min {} > max {}", field, min, max)
            }
            ConfigError::ZeroMinimum(field) => write!(f, "{} minimum must be at least 1", field),
            ConfigError::SegmentExceedsNodeCount { segment_min, node_max } => write!(
                f,
                "segment_size minimum {} exceeds node_count maximum {}",
                segment_min, node_max
            ),
            ConfigError::NonPositiveWindow(d) => {
                write!(f, "unlock window duration must be positive, got {}", d)
            }
            ConfigError::NegativeCooldown(c) => {
                write!(f, "unlock cooldown must not be negative, got {}", c)
            }
            ConfigError::EmptyWeightTable => write!(f, "no weight table named"),
            ConfigError::UnknownWeightTable(name) => write!(f, "unknown weight table '{}'", name),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validate an artifact definition, returning all errors found.
pub fn validate_config(config: &ArtifactConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    let ranges = [
        (RangeField::NodeCount, config.node_count, true),
        (RangeField::SegmentSize, config.segment_size, true),
        (RangeField::NodesPerLayer, config.nodes_per_layer, true),
        (RangeField::ScatterPerLayer, config.scatter_per_layer, false),
    ];
    for (field, range, needs_one) in ranges {
        if range.is_inverted() {
            errors.push(ConfigError::InvertedRange {
                field,
                min: range.min,
                max: range.max,
            });
        }
        if needs_one && range.min == 0 {
            errors.push(ConfigError::ZeroMinimum(field));
        }
    }

    if config.segment_size.min > config.node_count.max {
        errors.push(ConfigError::SegmentExceedsNodeCount {
            segment_min: config.segment_size.min,
            node_max: config.node_count.max,
        });
    }

    if !(config.unlock_window_duration > 0.0) {
        errors.push(ConfigError::NonPositiveWindow(config.unlock_window_duration));
    }
    if config.unlock_cooldown < 0.0 || config.unlock_cooldown.is_nan() {
        errors.push(ConfigError::NegativeCooldown(config.unlock_cooldown));
    }

    if config.weight_table.trim().is_empty() {
        errors.push(ConfigError::EmptyWeightTable);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_config_is_valid() {
        let errors = validate_config(&ArtifactConfig::default());
        assert!(errors.is_empty(), "default config should be valid: {errors:?}");
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = ArtifactConfig {
            nodes_per_layer: IntRange::new(4, 2),
            ..ArtifactConfig::default()
        };
        assert!(validate_config(&config).contains(&ConfigError::InvertedRange {
            field: RangeField::NodesPerLayer,
            min: 4,
            max: 2,
        }));
    }

    #[test]
    fn test_zero_minimums_rejected() {
        let config = ArtifactConfig {
            node_count: IntRange::new(0, 4),
            nodes_per_layer: IntRange::new(0, 2),
            ..ArtifactConfig::default()
        };
        let errors = validate_config(&config);
        assert!(errors.contains(&ConfigError::ZeroMinimum(RangeField::NodeCount)));
        assert!(errors.contains(&ConfigError::ZeroMinimum(RangeField::NodesPerLayer)));
    }

    #[test]
    fn test_scatter_may_be_zero() {
        let config = ArtifactConfig {
            scatter_per_layer: IntRange::exactly(0),
            ..ArtifactConfig::default()
        };
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_segment_larger_than_artifact_rejected() {
        let config = ArtifactConfig {
            node_count: IntRange::new(3, 4),
            segment_size: IntRange::new(5, 6),
            ..ArtifactConfig::default()
        };
        assert!(validate_config(&config).contains(&ConfigError::SegmentExceedsNodeCount {
            segment_min: 5,
            node_max: 4,
        }));
    }

    #[test]
    fn test_timing_rejected() {
        let config = ArtifactConfig {
            unlock_window_duration: 0.0,
            unlock_cooldown: -1.0,
            ..ArtifactConfig::default()
        };
        let errors = validate_config(&config);
        assert!(errors.contains(&ConfigError::NonPositiveWindow(0.0)));
        assert!(errors.contains(&ConfigError::NegativeCooldown(-1.0)));
    }

    #[test]
    fn test_empty_table_name_rejected() {
        let config = ArtifactConfig {
            weight_table: "  ".to_string(),
            ..ArtifactConfig::default()
        };
        assert!(validate_config(&config).contains(&ConfigError::EmptyWeightTable));
    }

    #[test]
    fn test_range_sampling_stays_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = IntRange::new(2, 5);
        for _ in 0..200 {
            assert!(range.contains(range.sample(&mut rng)));
        }
        assert_eq!(IntRange::exactly(3).sample(&mut rng), 3);
    }

    #[test]
    fn test_deny_list_controls_eligibility() {
        let config = ArtifactConfig {
            denied_triggers: vec![TriggerKind::Death],
            ..ArtifactConfig::default()
        };
        assert!(!config.allows(TriggerKind::Death));
        assert!(config.allows(TriggerKind::Interact));
    }
}
