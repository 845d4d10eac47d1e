//! Xenoarch Headless Simulation Harness
//!
//! Validates artifact generation and unlock logic against the bundled data
//! files. Runs entirely in-process with seeded random sources.
//!
//! Usage:
//!   cargo run -p xenoarch-simtest
//!   cargo run -p xenoarch-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p xenoarch-simtest

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use xenoarch_core::prelude::*;
use xenoarch_logic::catalog::{TriggerCatalog, TriggerKind};
use xenoarch_logic::config::{validate_config, ArtifactConfig, IntRange};
use xenoarch_logic::environment::Vec2;
use xenoarch_logic::events::{ArtifactEvent, DamageType, LifeState, ToolQuality};
use xenoarch_logic::generation::generate_graph;
use xenoarch_logic::graph::NodeGraph;
use xenoarch_logic::unlock::{UnlockAggregator, UnlockOutcome, UnlockState};

// ── Bundled data ────────────────────────────────────────────────────────
const WEIGHTS_JSON: &str = include_str!("../../../data/trigger_weights.json");
const ARTIFACT_TYPES_JSON: &str = include_str!("../../../data/artifact_types.json");

const SEEDS_PER_TYPE: u64 = 200;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Xenoarch Artifact Harness ===\n");

    let mut results = Vec::new();

    // 1. Trigger catalog
    let catalog = match load_catalog(&mut results) {
        Some(c) => c,
        None => TriggerCatalog::standard(),
    };

    // 2. Artifact type definitions
    let types = load_artifact_types(&catalog, &mut results);

    // 3. Generation sweep over every type
    results.extend(validate_generation_sweep(&catalog, &types, verbose));

    // 4. Six-node segmented scenario
    results.extend(validate_segment_scenario(verbose));

    // 5. Unlock window timeline
    results.extend(validate_unlock_timeline());

    // 6. Engine end-to-end
    results.extend(validate_engine_scenario(&catalog, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Trigger Catalog ──────────────────────────────────────────────────

fn load_catalog(results: &mut Vec<TestResult>) -> Option<TriggerCatalog> {
    println!("--- Trigger Catalog ---");

    let catalog = match TriggerCatalog::from_json(WEIGHTS_JSON) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: format!("catalog load error: {}", e),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "catalog_has_standard".into(),
        passed: catalog.table("standard").is_some(),
        detail: format!("{} tables loaded", catalog.tables.len()),
    });

    let empty: Vec<&String> = catalog
        .tables
        .iter()
        .filter(|(_, t)| t.is_empty())
        .map(|(name, _)| name)
        .collect();
    results.push(TestResult {
        name: "catalog_tables_not_empty".into(),
        passed: empty.is_empty(),
        detail: if empty.is_empty() {
            "every table has entries".into()
        } else {
            format!("empty tables: {:?}", empty)
        },
    });

    // The bundled standard table should cover the whole catalog.
    let covered = catalog.table("standard").map_or(0, |t| {
        TriggerKind::all()
            .iter()
            .filter(|k| t.entries.iter().any(|e| e.kind == **k))
            .count()
    });
    results.push(TestResult {
        name: "catalog_standard_covers_all_kinds".into(),
        passed: covered == TriggerKind::all().len(),
        detail: format!("{}/{} kinds", covered, TriggerKind::all().len()),
    });

    println!("  {} weight tables", catalog.tables.len());
    log::info!("Loaded trigger catalog: {:?}", catalog.tables.keys().collect::<Vec<_>>());
    Some(catalog)
}

// ── 2. Artifact Types ───────────────────────────────────────────────────

fn load_artifact_types(catalog: &TriggerCatalog, results: &mut Vec<TestResult>) -> Vec<ArtifactConfig> {
    println!("--- Artifact Types ---");

    let types: Vec<ArtifactConfig> = match serde_json::from_str(ARTIFACT_TYPES_JSON) {
        Ok(t) => t,
        Err(e) => {
            results.push(TestResult {
                name: "types_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return Vec::new();
        }
    };

    results.push(TestResult {
        name: "types_not_empty".into(),
        passed: !types.is_empty(),
        detail: format!("{} artifact types loaded", types.len()),
    });

    let mut valid = Vec::new();
    for config in types {
        let mut errors: Vec<String> = validate_config(&config)
            .iter()
            .map(|e| e.to_string())
            .collect();
        if let Err(e) = catalog.resolve(&config) {
            errors.push(e.to_string());
        }
        results.push(TestResult {
            name: format!("type_valid[{}]", config.name),
            passed: errors.is_empty(),
            detail: if errors.is_empty() {
                format!("table '{}'", config.weight_table)
            } else {
                errors.join("; ")
            },
        });
        if errors.is_empty() {
            valid.push(config);
        } else {
            log::warn!("Rejected artifact type '{}': {}", config.name, errors.join("; "));
        }
    }

    println!("  {} valid artifact types", valid.len());
    valid
}

// ── 3. Generation Sweep ─────────────────────────────────────────────────

#[derive(Default)]
struct SweepStats {
    graphs: usize,
    cyclic: usize,
    count_mismatch: usize,
    orphaned_nodes: usize,
    denied_used: usize,
    disconnected: usize,
    unreported_disconnects: usize,
    stitched_edges: usize,
    shortfalls: usize,
    kinds: BTreeMap<TriggerKind, usize>,
}

fn validate_generation_sweep(
    catalog: &TriggerCatalog,
    types: &[ArtifactConfig],
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Generation Sweep ---");
    let mut results = Vec::new();

    for config in types {
        let Ok(table) = catalog.resolve(config) else {
            continue;
        };
        let mut stats = SweepStats::default();

        for seed in 0..SEEDS_PER_TYPE {
            let mut rng = StdRng::seed_from_u64(seed);
            let generated = generate_graph(config, table, config, &mut rng);
            let graph = &generated.graph;
            let report = &generated.report;
            stats.graphs += 1;

            if !is_acyclic(graph) {
                stats.cyclic += 1;
            }
            let in_range = config.node_count.contains(graph.len() as u32);
            if !(in_range || report.shortfall.is_some())
                || report.segment_sizes.iter().sum::<usize>() != graph.len()
            {
                stats.count_mismatch += 1;
            }
            stats.orphaned_nodes += graph
                .nodes()
                .iter()
                .filter(|n| {
                    n.depth > 0
                        && !graph
                            .predecessors(n.index)
                            .any(|p| graph.node(p).is_some_and(|pn| pn.segment == n.segment))
                })
                .count();
            if graph.nodes().iter().any(|n| !config.allows(n.kind)) {
                stats.denied_used += 1;
            }
            let components = graph.summary().component_count;
            if components > 1 {
                stats.disconnected += 1;
            }
            if !graph.is_empty() && components != report.unstitchable.len() + 1 {
                stats.unreported_disconnects += 1;
            }
            if report.shortfall.is_some() {
                stats.shortfalls += 1;
            }
            stats.stitched_edges += report.stitched_edges;
            for node in graph.nodes() {
                *stats.kinds.entry(node.kind).or_default() += 1;
            }
        }

        let name = &config.name;
        results.push(TestResult {
            name: format!("gen_acyclic[{}]", name),
            passed: stats.cyclic == 0,
            detail: format!("{}/{} graphs acyclic", stats.graphs - stats.cyclic, stats.graphs),
        });
        results.push(TestResult {
            name: format!("gen_node_counts[{}]", name),
            passed: stats.count_mismatch == 0,
            detail: format!(
                "{} mismatches, {} shortfalls",
                stats.count_mismatch, stats.shortfalls
            ),
        });
        results.push(TestResult {
            name: format!("gen_layers_linked[{}]", name),
            passed: stats.orphaned_nodes == 0,
            detail: format!("{} deep nodes without a parent", stats.orphaned_nodes),
        });
        results.push(TestResult {
            name: format!("gen_deny_list[{}]", name),
            passed: stats.denied_used == 0,
            detail: format!("{} graphs used a denied kind", stats.denied_used),
        });
        results.push(TestResult {
            name: format!("gen_disconnects_reported[{}]", name),
            passed: stats.unreported_disconnects == 0,
            detail: format!(
                "{} disconnected ({} misreported), {} stitched edges",
                stats.disconnected, stats.unreported_disconnects, stats.stitched_edges
            ),
        });

        if verbose {
            println!("  {} kind distribution:", name);
            for (kind, count) in &stats.kinds {
                println!("    {:<14} {}", kind, count);
            }
        }
    }

    results
}

fn is_acyclic(graph: &NodeGraph) -> bool {
    graph.edges().all(|(from, to)| {
        match (graph.node(from), graph.node(to)) {
            (Some(a), Some(b)) => a.depth < b.depth,
            _ => false,
        }
    })
}

// ── 4. Segment Scenario ─────────────────────────────────────────────────

fn validate_segment_scenario(verbose: bool) -> Vec<TestResult> {
    println!("--- Segment Scenario ---");
    let mut results = Vec::new();

    let config = ArtifactConfig {
        node_count: IntRange::exactly(6),
        segment_size: IntRange::new(2, 4),
        nodes_per_layer: IntRange::new(1, 2),
        scatter_per_layer: IntRange::exactly(0),
        ..ArtifactConfig::default()
    };
    let catalog = TriggerCatalog::standard();
    let Ok(table) = catalog.resolve(&config) else {
        return results;
    };

    let mut wrong_size = 0;
    let mut single_segment = 0;
    let mut connected = 0;
    let mut unexplained = 0;
    let runs = 100;
    for seed in 0..runs {
        let mut rng = StdRng::seed_from_u64(seed);
        let generated = generate_graph(&config, table, &config, &mut rng);
        let graph = &generated.graph;
        if graph.len() != 6 {
            wrong_size += 1;
        }
        if graph.segment_count() < 2 {
            single_segment += 1;
        }
        let components = graph.summary().component_count;
        if components == 1 {
            connected += 1;
        }
        if components != generated.report.unstitchable.len() + 1 {
            unexplained += 1;
        }
        if verbose && seed < 3 {
            println!(
                "  seed {}: segments {:?}, {} edges, {} components",
                seed,
                generated.report.segment_sizes,
                graph.edge_count(),
                graph.summary().component_count
            );
        }
    }

    results.push(TestResult {
        name: "scenario_six_nodes".into(),
        passed: wrong_size == 0,
        detail: format!("{}/{} runs had 6 nodes", runs as usize - wrong_size, runs),
    });
    results.push(TestResult {
        name: "scenario_multi_segment".into(),
        passed: single_segment == 0,
        detail: format!("{} runs with a single segment", single_segment),
    });
    results.push(TestResult {
        name: "scenario_connected_or_reported".into(),
        passed: unexplained == 0 && connected > 0,
        detail: format!(
            "{}/{} connected, {} unexplained disconnects",
            connected, runs, unexplained
        ),
    });

    results
}

// ── 5. Unlock Timeline ──────────────────────────────────────────────────

fn validate_unlock_timeline() -> Vec<TestResult> {
    println!("--- Unlock Timeline ---");
    let mut results = Vec::new();

    let mut graph = NodeGraph::new();
    graph.add_node(0, 0, TriggerKind::Interact);
    graph.add_node(1, 0, TriggerKind::Heat);
    graph.add_edge(0, 1);

    let cooldown = 10.0;
    let mut agg = UnlockAggregator::new(5.0, cooldown);
    agg.trigger(0, 0.0, &mut ());
    agg.trigger(0, 1.0, &mut ());
    let window_len = agg.state().window().map_or(0, |w| w.triggered.len());
    results.push(TestResult {
        name: "unlock_idempotent".into(),
        passed: window_len == 1,
        detail: format!("{} distinct activations after 2 triggers", window_len),
    });

    let open_at_4_9 = agg.tick(4.9, &mut graph, &mut ()).is_none() && agg.state().is_unlocking();
    results.push(TestResult {
        name: "unlock_window_open".into(),
        passed: open_at_4_9,
        detail: "window still open at t=4.9".into(),
    });

    let resolution = agg.tick(5.1, &mut graph, &mut ());
    let resolved = matches!(
        resolution.as_ref().map(|r| &r.outcome),
        Some(UnlockOutcome::Success { unlocked }) if unlocked == &vec![0]
    ) && *agg.state() == UnlockState::Idle
        && (agg.next_unlock_time() - (5.1 + cooldown)).abs() < 1e-9;
    results.push(TestResult {
        name: "unlock_window_resolves".into(),
        passed: resolved,
        detail: format!("next unlock at {:.1}s", agg.next_unlock_time()),
    });

    let before = agg.clone();
    agg.trigger(1, 10.0, &mut ());
    results.push(TestResult {
        name: "unlock_cooldown_gate".into(),
        passed: agg == before,
        detail: "trigger during cooldown left state unchanged".into(),
    });

    results
}

// ── 6. Engine Scenario ──────────────────────────────────────────────────

fn validate_engine_scenario(catalog: &TriggerCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Engine Scenario ---");
    let mut results = Vec::new();

    let mut engine = ArtifactEngine::with_catalog(1234, catalog.clone());
    let config = ArtifactConfig {
        name: "Harness Artifact".into(),
        unlock_window_duration: 30.0,
        unlock_cooldown: 5.0,
        ..ArtifactConfig::default()
    };
    let artifact = match engine.spawn_artifact(config, Vec2::ZERO) {
        Ok(e) => e,
        Err(e) => {
            results.push(TestResult {
                name: "engine_spawn".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    // Surround the artifact with everything it could react to.
    engine.spawn_field_emitter(FieldEmitter::magnet(), Vec2::new(1.0, 0.0));
    engine.spawn_ambient_zone(AmbientZone {
        center: Vec2::ZERO,
        radius: 5.0,
        pressure: 2.0,
        temperature: 80.0,
    });
    let mob = engine.spawn_mob(Vec2::new(3.0, 0.0));

    let mut failures = Vec::new();
    for event in [
        ArtifactEvent::Interacted { user: 1 },
        ArtifactEvent::Damaged {
            damage_type: DamageType::Brute,
            amount: 25.0,
        },
        ArtifactEvent::Damaged {
            damage_type: DamageType::Burn,
            amount: 25.0,
        },
        ArtifactEvent::ToolUsed {
            quality: ToolQuality::Prying,
            cancelled: false,
        },
        ArtifactEvent::ToolUsed {
            quality: ToolQuality::Welding,
            cancelled: false,
        },
        ArtifactEvent::ToolUsed {
            quality: ToolQuality::Screwing,
            cancelled: false,
        },
    ] {
        if let Err(e) = engine.raise_event(artifact, event) {
            failures.push(e.to_string());
        }
    }
    if let Err(e) = engine.set_mob_state(mob, LifeState::Dead) {
        failures.push(e.to_string());
    }

    // Run long enough for both timers and the window to close.
    for _ in 0..120 {
        engine.update(1.0);
    }
    let resolutions = engine.drain_resolutions();
    let notices = engine.drain_notices();

    results.push(TestResult {
        name: "engine_events_routed".into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            "all events reached the artifact".into()
        } else {
            failures.join("; ")
        },
    });
    results.push(TestResult {
        name: "engine_window_resolved".into(),
        passed: !resolutions.is_empty(),
        detail: format!("{} resolutions, {} notices", resolutions.len(), notices.len()),
    });

    let unlocked = engine
        .with_artifact(artifact, |a| a.graph().nodes().iter().filter(|n| !n.locked).count())
        .unwrap_or(0);
    let total = engine.with_artifact(artifact, |a| a.node_count()).unwrap_or(0);
    results.push(TestResult {
        name: "engine_progress".into(),
        passed: unlocked > 0,
        detail: format!("{}/{} nodes unlocked", unlocked, total),
    });

    if verbose {
        if let Some(json) = engine.snapshot(artifact).and_then(|s| s.to_json().ok()) {
            println!("{}", json);
        }
    }

    results
}
