//! Node-addressed road network graph
//!
//! `start node -> end node -> [lanes]`, iterated in insertion order so that
//! anything emitted from the graph is reproducible.

use indexmap::IndexMap;

use crate::road::centerline::{Centerline, LaneLayout};
use crate::road::lane::{Lane, LaneGeometry};
use crate::road::Road;

#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    graph: IndexMap<String, IndexMap<String, Vec<Lane>>>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lane to the road named by its index
    pub fn add_lane(&mut self, lane: Lane) {
        let index = lane.index();
        self.graph
            .entry(index.start_node.clone())
            .or_default()
            .entry(index.end_node.clone())
            .or_default()
            .push(lane);
    }

    pub fn add_lanes(&mut self, lanes: impl IntoIterator<Item = Lane>) {
        for lane in lanes {
            self.add_lane(lane);
        }
    }

    /// Lay `road` along `centerline`, plus its reverse road when
    /// `negative_lane_num` is given
    pub fn add_road(
        &mut self,
        road: &Road,
        centerline: &Centerline,
        positive_lane_num: usize,
        negative_lane_num: Option<usize>,
        layout: &LaneLayout,
    ) {
        self.add_lanes(centerline.lanes(road, positive_lane_num, layout));
        if let Some(lane_num) = negative_lane_num {
            self.add_lanes(centerline.reversed().lanes(&-road, lane_num, layout));
        }
    }

    pub fn lanes(&self, road: &Road) -> Option<&[Lane]> {
        self.graph
            .get(&road.start_node)?
            .get(&road.end_node)
            .map(Vec::as_slice)
            .filter(|lanes| !lanes.is_empty())
    }

    pub fn contains_road(&self, road: &Road) -> bool {
        self.lanes(road).is_some()
    }

    /// Copy roads of `other` that are not present yet; existing roads are
    /// never modified
    pub fn merge(&mut self, other: &RoadNetwork) {
        for (from, to, lanes) in other.iter() {
            let road = Road::new(from, to);
            if !self.contains_road(&road) {
                self.graph
                    .entry(road.start_node)
                    .or_default()
                    .insert(road.end_node, lanes.to_vec());
            }
        }
    }

    /// `(start, end, lanes)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[Lane])> {
        self.graph.iter().flat_map(|(from, targets)| {
            targets
                .iter()
                .map(move |(to, lanes)| (from.as_str(), to.as_str(), lanes.as_slice()))
        })
    }

    pub fn all_lanes(&self) -> impl Iterator<Item = &Lane> {
        self.iter().flat_map(|(_, _, lanes)| lanes.iter())
    }

    pub fn roads(&self) -> Vec<Road> {
        self.iter().map(|(from, to, _)| Road::new(from, to)).collect()
    }

    pub fn lane_count(&self) -> usize {
        self.all_lanes().count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
    }
}
