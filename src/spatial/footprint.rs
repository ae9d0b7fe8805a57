//! Offset rings along lanes and lane-footprint overlap queries
//!
//! Both the streetscape zones and the topology conflict check are built from
//! the same primitive: walk a lane forward at one lateral offset, then back
//! at another, producing a closed ring.

use geo::{BoundingRect, Contains};
use geo_types::{Coord, LineString, Point, Polygon, Rect};
use glam::Vec2;

use crate::core::config::drivable_area::{OVERLAP_MARGIN, OVERLAP_STEP, STATION_EPSILON};
use crate::core::types::Point2;
use crate::road::{LaneGeometry, RoadNetwork};

/// Longitudinal stations from 0 to `length` at a fixed `step`
///
/// Follows `arange(0, length + step, step)` and clamps every station to
/// `length - STATION_EPSILON` so no point lands exactly on the lane end.
/// Consecutive duplicates produced by the clamp are dropped.
pub fn sample_stations(length: f32, step: f32) -> Vec<f32> {
    let limit = (length - STATION_EPSILON).max(0.0);
    let count = ((length + step) / step).ceil().max(1.0) as usize;
    let mut stations: Vec<f32> = Vec::with_capacity(count);
    for i in 0..count {
        let raw = i as f32 * step;
        if raw >= length + step {
            break;
        }
        let station = raw.min(limit);
        if stations.last() != Some(&station) {
            stations.push(station);
        }
    }
    stations
}

/// Forward pass at `near_lateral`, reverse pass at `far_lateral`
pub fn offset_ring<L: LaneGeometry + ?Sized>(
    lane: &L,
    stations: &[f32],
    near_lateral: f32,
    far_lateral: f32,
) -> Vec<Point2> {
    let forward = stations.iter().map(|&s| lane.position(s, near_lateral));
    let backward = stations.iter().rev().map(|&s| lane.position(s, far_lateral));
    forward.chain(backward).map(|p| [p.x, p.y]).collect()
}

fn to_polygon(ring: &[Point2]) -> Polygon<f64> {
    let coords: Vec<Coord<f64>> = ring
        .iter()
        .map(|[x, y]| Coord {
            x: *x as f64,
            y: *y as f64,
        })
        .collect();
    // LineString is closed by Polygon::new
    Polygon::new(LineString::from(coords), vec![])
}

/// Drivable footprint of a lane as a polygon
pub fn lane_footprint<L: LaneGeometry + ?Sized>(lane: &L) -> Polygon<f64> {
    let half = lane.width_at(0.0) / 2.0;
    let stations = sample_stations(lane.length(), OVERLAP_STEP);
    to_polygon(&offset_ring(lane, &stations, -half, half))
}

/// Footprints of every lane of a network, for point-in-road queries
pub struct NetworkFootprint {
    polygons: Vec<(Rect<f64>, Polygon<f64>)>,
}

impl NetworkFootprint {
    pub fn of(network: &RoadNetwork) -> Self {
        let polygons = network
            .all_lanes()
            .map(lane_footprint)
            .filter_map(|polygon| polygon.bounding_rect().map(|rect| (rect, polygon)))
            .collect();
        Self { polygons }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let (x, y) = (point.x as f64, point.y as f64);
        let point = Point::new(x, y);
        self.polygons.iter().any(|(rect, polygon)| {
            let (min, max) = (rect.min(), rect.max());
            x >= min.x && x <= max.x && y >= min.y && y <= max.y && polygon.contains(&point)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// True if any interior sample point of `lane` lies on a road of `existing`
///
/// Sample points skip `OVERLAP_MARGIN` at both lane ends so a block can attach to
/// the socket it grows from.
pub fn lane_conflicts<L: LaneGeometry + ?Sized>(lane: &L, existing: &NetworkFootprint) -> bool {
    let length = lane.length();
    if length <= 2.0 * OVERLAP_MARGIN {
        return false;
    }
    let half = lane.width_at(0.0) / 2.0;
    let laterals = [-0.9 * half, 0.0, 0.9 * half];

    let mut station = OVERLAP_MARGIN;
    while station <= length - OVERLAP_MARGIN {
        for lateral in laterals {
            if existing.contains(lane.position(station, lateral)) {
                return true;
            }
        }
        station += OVERLAP_STEP;
    }
    false
}

/// True if any lane of `candidate` overlaps a lane of `existing`
pub fn network_conflicts(candidate: &RoadNetwork, existing: &RoadNetwork) -> bool {
    let footprint = NetworkFootprint::of(existing);
    if footprint.is_empty() {
        return false;
    }
    candidate
        .all_lanes()
        .any(|lane| lane_conflicts(lane, &footprint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::{Centerline, LaneLayout, LineType, Road};

    fn straight_network(road: &Road, start: Vec2, end: Vec2) -> RoadNetwork {
        let mut network = RoadNetwork::new();
        let layout = LaneLayout::new(3.5, LineType::Continuous, LineType::Side);
        network.add_road(road, &Centerline::straight(start, end), 1, Some(1), &layout);
        network
    }

    #[test]
    fn test_stations_clamp_last_value() {
        let stations = sample_stations(10.0, 3.0);
        assert_eq!(stations.len(), 5);
        assert_eq!(stations[0], 0.0);
        assert!((stations[4] - (10.0 - STATION_EPSILON)).abs() < 1e-6);
    }

    #[test]
    fn test_stations_drop_clamped_duplicates() {
        let stations = sample_stations(9.05, 3.0);
        let mut sorted = stations.clone();
        sorted.dedup();
        assert_eq!(stations, sorted);
        assert!(stations.iter().all(|s| *s <= 9.05 - STATION_EPSILON + 1e-6));
    }

    #[test]
    fn test_crossing_roads_conflict() {
        let existing = straight_network(&Road::new("a", "b"), Vec2::new(-20.0, 0.0), Vec2::new(20.0, 0.0));
        let candidate = straight_network(&Road::new("c", "d"), Vec2::new(0.0, -20.0), Vec2::new(0.0, 20.0));
        assert!(network_conflicts(&candidate, &existing));
    }

    #[test]
    fn test_continuing_road_does_not_conflict() {
        let existing = straight_network(&Road::new("a", "b"), Vec2::new(-20.0, 0.0), Vec2::ZERO);
        let candidate = straight_network(&Road::new("b", "c"), Vec2::ZERO, Vec2::new(30.0, 0.0));
        assert!(!network_conflicts(&candidate, &existing));
    }
}
