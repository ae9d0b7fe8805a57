//! End-to-end generation: placement, fallback, conflicts and export

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use road_blocks::block::{Block, BlockOptions, BlockShape, FirstBlock};
use road_blocks::core::DiagnosticFlags;
use road_blocks::road::{Centerline, LaneLayout, LineColor, LineType, Road, RoadNetwork};
use road_blocks::streetscape::{SidewalkProfile, ZoneKind};
use road_blocks::{GenerationConfig, NetworkGenerator, RoadGenError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn placed_first(config: &GenerationConfig, rng: &mut ChaCha8Rng) -> Block {
    let entry = FirstBlock::entry_socket().unwrap();
    let mut block = Block::new(0, BlockShape::First, entry, &RoadNetwork::new(), config, rng).unwrap();
    assert!(block.sample_topology(&RoadNetwork::new(), rng).unwrap());
    block
}

#[test]
fn test_first_block_geometry() {
    init_tracing();
    let generator = NetworkGenerator::new(GenerationConfig::default()).unwrap();
    let geometry = generator.construct_all().unwrap();
    assert_eq!(geometry.len(), 1);

    let first = &geometry[0];
    assert_eq!(first.name, "0I");
    assert_eq!(first.records.zones[&ZoneKind::Main].len(), 4);
    assert!(!first.records.zones.contains_key(&ZoneKind::Far));

    let yellow = first
        .segments
        .iter()
        .filter(|segment| segment.color == LineColor::Yellow)
        .count();
    assert_eq!(yellow, 16);
}

#[test]
fn test_terrain_diagnostics_populate_every_zone() {
    init_tracing();
    let config = GenerationConfig {
        diagnostics: DiagnosticFlags {
            test_terrain_system: true,
            ..DiagnosticFlags::default()
        },
        ..GenerationConfig::default()
    };
    let mut generator = NetworkGenerator::new(config).unwrap();
    generator.place(BlockShape::Straight).unwrap();

    for geometry in generator.construct_all().unwrap() {
        for kind in ZoneKind::ALL {
            assert!(
                geometry.records.zones.get(&kind).is_some_and(|zones| !zones.is_empty()),
                "{} has no {} zone",
                geometry.name,
                kind
            );
        }
    }
}

#[test]
fn test_toml_config_drives_generator() {
    init_tracing();
    let config = GenerationConfig::from_toml_str(
        r#"
seed = 7
lane_num = 3
profile = "Wide Commercial"
center_line_type = "broken"

[zone_overrides]
main = [2.0, 2.0]

[topology]
straight_length = [30.0, 30.0]
"#,
    )
    .unwrap();
    assert_eq!(config.profile, SidewalkProfile::WideCommercial);

    let mut generator = NetworkGenerator::new(config).unwrap();
    let block = generator.place(BlockShape::Straight).unwrap();
    assert_eq!(block.lanes().positive_lane_num, 3);
    assert_eq!(block.zone_widths().get(ZoneKind::Main), Some(2.0));
    assert_eq!(block.zone_widths().get(ZoneKind::NearRoadBuffer), None);
}

#[test]
fn test_unknown_profile_rejected() {
    let result = GenerationConfig::from_toml_str(r#"profile = "Boulevard""#);
    assert!(matches!(result, Err(RoadGenError::TomlError(_))));
}

#[test]
fn test_invalid_density_rejected() {
    let config = GenerationConfig {
        crosswalk_density: 1.5,
        ..GenerationConfig::default()
    };
    assert!(matches!(
        NetworkGenerator::new(config),
        Err(RoadGenError::InvalidConfig(_))
    ));
}

#[test]
fn test_existing_road_blocks_straight_placement() {
    init_tracing();
    let config = GenerationConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let first = placed_first(&config, &mut rng);

    let mut global = RoadNetwork::new();
    global.merge(first.block_network());
    let layout = LaneLayout::new(3.5, LineType::Continuous, LineType::Side);
    let crossing = Centerline::straight(Vec2::new(80.0, -30.0), Vec2::new(80.0, 30.0));
    global.add_road(&Road::new("A", "B"), &crossing, 1, Some(1), &layout);

    let socket = first.get_socket(0usize).unwrap().clone();
    let mut blocked = Block::new(1, BlockShape::Straight, socket.clone(), &global, &config, &mut rng).unwrap();
    assert!(!blocked.sample_topology(&global, &mut rng).unwrap());
    // Failed samples still expose their topology
    assert_eq!(blocked.sockets().len(), 1);

    let options = BlockOptions {
        ignore_intersection_checking: true,
        ..BlockOptions::default()
    };
    let mut forced =
        Block::with_options(1, BlockShape::Straight, socket, &global, &config, options, &mut rng).unwrap();
    assert!(forced.sample_topology(&global, &mut rng).unwrap());
}

#[test]
fn test_export_lists_every_block() {
    init_tracing();
    let mut generator = NetworkGenerator::new(GenerationConfig::default().with_seed(11)).unwrap();
    generator
        .generate(&[BlockShape::Straight, BlockShape::Curve, BlockShape::Straight])
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&generator.export_json().unwrap()).unwrap();
    assert_eq!(json["seed"], 11);
    let blocks = json["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[0]["name"], "0I");
    assert!(blocks[0]["segments"].as_array().is_some_and(|s| !s.is_empty()));
    assert!(blocks[0]["zones"]["main"].is_object());
}

#[test]
fn test_global_network_accumulates_blocks() {
    let mut generator = NetworkGenerator::new(GenerationConfig::default().with_seed(5)).unwrap();
    let before = generator.network().lane_count();
    generator.place(BlockShape::Straight).unwrap();
    let added = generator.blocks()[1].block_network().lane_count();
    assert_eq!(generator.network().lane_count(), before + added);
}

#[test]
fn test_junction_crosswalks_follow_density() {
    init_tracing();
    for shape in [BlockShape::InterSection, BlockShape::Roundabout] {
        for density in [0.0f32, 0.5, 1.0] {
            let config = GenerationConfig {
                crosswalk_density: density,
                ..GenerationConfig::default()
            };
            let mut generator = NetworkGenerator::new(config).unwrap();
            assert_eq!(generator.place(shape).unwrap().shape(), shape);

            let geometry = generator.construct_all().unwrap();
            let prefix = format!("CRS_1{}_", shape.id());
            let crosswalks = geometry[1]
                .records
                .crosswalks
                .keys()
                .filter(|key| key.starts_with(&prefix))
                .count();
            let expected = (density * shape.crosswalk_slots() as f32).round() as usize;
            assert_eq!(crosswalks, expected, "{:?} at density {}", shape, density);
        }
    }
}

#[test]
fn test_roundabout_follows_first_block() {
    init_tracing();
    let mut generator = NetworkGenerator::new(GenerationConfig::default()).unwrap();
    let block = generator.place(BlockShape::Roundabout).unwrap();
    assert_eq!(block.name(), "1O");
    assert_eq!(block.socket_indices(), vec!["1O-socket0", "1O-socket1", "1O-socket2"]);

    // Straights extend the network from one of its exits
    generator
        .generate(&[BlockShape::Straight, BlockShape::Straight, BlockShape::Straight])
        .unwrap();
    assert_eq!(generator.blocks().len(), 5);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn same_seed_same_network(seed in any::<u64>()) {
        let shapes = [
            BlockShape::Straight,
            BlockShape::Curve,
            BlockShape::InterSection,
            BlockShape::TInterSection,
            BlockShape::Roundabout,
        ];
        let run = || -> Result<String, RoadGenError> {
            let mut generator = NetworkGenerator::new(GenerationConfig::default().with_seed(seed))?;
            generator.generate(&shapes)?;
            generator.export_json()
        };

        match (run(), run()) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            (a, b) => prop_assert!(false, "diverging runs: {:?} vs {:?}", a.is_ok(), b.is_ok()),
        }
    }
}
