//! Zone stacking, line emission and profile resolution

use geo::{Area, Intersects};
use geo_types::{Coord, Line, LineString, Polygon};
use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use road_blocks::core::config::drivable_area::{SIDEWALK_LENGTH, STRIPE_LENGTH};
use road_blocks::core::Interval;
use road_blocks::road::{
    CircularLane, LaneAttributes, LaneGeometry, LaneIndex, LineColor, LineType, Road, Side,
    StraightLane,
};
use road_blocks::spatial::sample_stations;
use road_blocks::streetscape::{
    broken_stations, emit_lane_lines, DiagnosticMode, SidewalkProfile, Streetscape, ZoneKind,
    ZoneOutcome, ZoneOverrides, ZoneWidths,
};

fn attributes(line_types: [LineType; 2]) -> LaneAttributes {
    LaneAttributes {
        width: 3.5,
        line_types,
        line_colors: [LineColor::White, LineColor::White],
        index: LaneIndex::new(&Road::new("1S0_0_", "1S0_1_"), 1),
    }
}

fn straight(length: f32, line_types: [LineType; 2]) -> StraightLane {
    StraightLane::new(Vec2::ZERO, Vec2::new(length, 0.0), attributes(line_types))
}

/// Ring encloses area and no two non-adjacent edges touch
fn assert_simple_ring(ring: &[[f32; 2]]) {
    assert!(ring.len() >= 3, "ring has {} vertices", ring.len());
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|[x, y]| Coord {
            x: *x as f64,
            y: *y as f64,
        })
        .collect();
    let polygon = Polygon::new(LineString::from(coords), vec![]);
    assert!(polygon.unsigned_area() > 1e-6, "degenerate ring");

    let edges: Vec<Line<f64>> = polygon.exterior().lines().collect();
    let n = edges.len();
    for i in 0..n {
        for j in i + 2..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            assert!(!edges[i].intersects(&edges[j]), "edges {} and {} cross", i, j);
        }
    }
}

fn wide_commercial_at(width: f32) -> Streetscape {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let widths = ZoneWidths::resolve(
        SidewalkProfile::WideCommercial,
        &ZoneOverrides::uniform(Interval::fixed(width)),
        DiagnosticMode::Off,
        &mut rng,
    );
    Streetscape::new(widths, DiagnosticMode::Off)
}

#[test]
fn test_wide_commercial_far_zone_offsets() {
    let streetscape = wide_commercial_at(2.0);
    assert_eq!(streetscape.zone_laterals(1.75, ZoneKind::Far), Some((7.75, 9.75)));
    assert_eq!(streetscape.zone_laterals(1.75, ZoneKind::NearRoadBuffer), None);
}

#[test]
fn test_wide_commercial_far_polygon_on_lane() {
    let mut streetscape = wide_commercial_at(2.0);
    let lane = straight(30.0, [LineType::None, LineType::Side]);
    assert_eq!(
        streetscape.generate_zone(&lane, ZoneKind::Far, Side::Right, None),
        ZoneOutcome::Generated
    );

    let record = streetscape.zone(ZoneKind::Far, &lane.index().to_string()).unwrap();
    let stations = sample_stations(lane.length(), SIDEWALK_LENGTH).len();
    assert!((record.polygon[0][1] + 7.75).abs() < 1e-5);
    assert!((record.polygon[stations][1] + 9.75).abs() < 1e-5);
    assert_simple_ring(&record.polygon);
}

#[test]
fn test_none_lines_emit_nothing() {
    let mut streetscape = wide_commercial_at(2.0);
    let lane = straight(40.0, [LineType::None, LineType::None]);
    let mut segments = Vec::new();
    let emitted = emit_lane_lines(&lane, [true, true], &mut streetscape, &mut segments);
    assert_eq!(emitted, 0);
    assert!(segments.is_empty());
    assert_eq!(streetscape.zone_count(), 0);
}

#[test]
fn test_side_line_builds_profile_zones_only() {
    let mut streetscape = wide_commercial_at(2.0);
    let lane = straight(40.0, [LineType::Broken, LineType::Side]);
    let mut segments = Vec::new();
    emit_lane_lines(&lane, [true, true], &mut streetscape, &mut segments);

    assert_eq!(streetscape.zone_count(), SidewalkProfile::WideCommercial.zones().len());
    assert_eq!(streetscape.zones(ZoneKind::NearRoadBuffer).count(), 0);
    // Broken left edge plus continuous right edge
    assert_eq!(segments.len(), broken_stations(40.0).len() + 10);
}

#[test]
fn test_repeat_generation_is_no_op() {
    let mut streetscape = wide_commercial_at(2.0);
    let lane = straight(20.0, [LineType::None, LineType::Side]);
    streetscape.generate_side_zones(&lane, Side::Right, None);
    let key = lane.index().to_string();
    let first = streetscape.zone(ZoneKind::Main, &key).cloned();

    let outcomes = streetscape.generate_side_zones(&lane, Side::Right, Some(4.0));
    assert!(outcomes
        .iter()
        .all(|(_, outcome)| matches!(outcome, ZoneOutcome::Duplicate | ZoneOutcome::Absent)));
    assert_eq!(streetscape.zone(ZoneKind::Main, &key).cloned(), first);
}

#[test]
fn test_curved_lane_rings_are_simple() {
    let mut streetscape = wide_commercial_at(1.0);
    let attributes = attributes([LineType::None, LineType::Side]);
    let lane = CircularLane::new(Vec2::ZERO, 40.0, 0.0, 1.2, false, attributes);
    for side in Side::BOTH {
        let outcomes = streetscape.generate_side_zones(&lane, side, None);
        assert!(outcomes.iter().all(|(_, o)| *o != ZoneOutcome::TooCurved));
    }
    for kind in ZoneKind::ALL {
        for (_, record) in streetscape.zones(kind) {
            assert_simple_ring(&record.polygon);
        }
    }
}

fn width() -> impl Strategy<Value = Option<f32>> {
    prop::option::of(0.1f32..5.0)
}

proptest! {
    #[test]
    fn zones_never_overlap(
        widths in prop::array::uniform6(width()),
        half_width in 0.5f32..3.0,
        slope in any::<bool>(),
    ) {
        let mode = if slope { DiagnosticMode::Slope } else { DiagnosticMode::Off };
        let widths = ZoneWidths::from_fn(|kind| widths[kind.order()]);
        let streetscape = Streetscape::new(widths, mode);

        let laterals: Vec<(f32, f32)> = ZoneKind::ALL
            .into_iter()
            .filter_map(|kind| streetscape.zone_laterals(half_width, kind))
            .collect();
        for pair in laterals.windows(2) {
            prop_assert!(pair[1].0 >= pair[0].1 - 1e-4);
        }
    }

    #[test]
    fn broken_line_stripe_count(length in 0.0f32..400.0) {
        let stripes = broken_stations(length);
        let expected = (length / (2.0 * STRIPE_LENGTH)).floor() as usize;
        prop_assert_eq!(stripes.len(), expected);
        if let Some(&(start, end)) = stripes.last() {
            prop_assert_eq!(end, length - STRIPE_LENGTH);
            prop_assert!(end >= start);
        }
    }

    #[test]
    fn overridden_widths_stay_in_range(seed in any::<u64>(), low in 0.5f32..2.0, span in 0.0f32..2.0) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let range = Interval::new(low, low + span);
        let widths = ZoneWidths::resolve(
            SidewalkProfile::Neighborhood1,
            &ZoneOverrides::uniform(range),
            DiagnosticMode::Off,
            &mut rng,
        );
        for (_, w) in widths.populated() {
            prop_assert!(w >= range.low && w <= range.high);
        }
    }
}
