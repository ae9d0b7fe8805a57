//! Block shapes and the state a shape writes while attaching itself
//!
//! Each shape is a unit type implementing [`AttemptConnection`]; the
//! [`BlockShape`] tag dispatches to it. A shape reads the predecessor socket
//! and lane parameters from a [`PlacementContext`] and lays roads, sockets
//! and crosswalk slots into a [`BlockTopology`].

use ahash::AHashSet;
use glam::Vec2;
use indexmap::IndexMap;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::block::curve::Curve;
use crate::block::first::FirstBlock;
use crate::block::intersection::{InterSection, TInterSection};
use crate::block::roundabout::Roundabout;
use crate::block::socket::Socket;
use crate::block::straight::Straight;
use crate::core::config::TopologyConfig;
use crate::core::error::{Result, RoadGenError};
use crate::road::{Centerline, LaneLayout, Road, RoadNetwork};
use crate::spatial::footprint::network_conflicts;

/// Separator between the part and road indices of a node name
pub const DASH: &str = "_";

/// `"{block_idx}{id}{part_idx}_{road_idx}_"`
pub fn node_name(block_idx: usize, id: &str, part_idx: usize, road_idx: usize) -> String {
    format!("{}{}{}{}{}{}", block_idx, id, part_idx, DASH, road_idx, DASH)
}

/// Capability every block shape provides
pub trait AttemptConnection {
    /// Short shape identifier used in block and node names
    const ID: &'static str;
    /// Number of sockets a successful placement exposes
    const SOCKET_NUM: usize;
    /// Candidate crosswalk positions laid by the shape
    const CROSSWALK_SLOTS: usize = 0;

    /// Try to attach to the predecessor socket
    ///
    /// `Ok(false)` means the sampled topology overlaps existing roads or is
    /// geometrically infeasible and the caller may retry.
    fn attempt_connection(
        ctx: &PlacementContext<'_>,
        topology: &mut BlockTopology,
        rng: &mut ChaCha8Rng,
    ) -> Result<bool>;

    fn node(block_idx: usize, part_idx: usize, road_idx: usize) -> String {
        node_name(block_idx, Self::ID, part_idx, road_idx)
    }
}

/// Tag selecting a block shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockShape {
    First,
    Straight,
    Curve,
    InterSection,
    TInterSection,
    Roundabout,
}

impl BlockShape {
    pub fn id(self) -> &'static str {
        match self {
            BlockShape::First => FirstBlock::ID,
            BlockShape::Straight => Straight::ID,
            BlockShape::Curve => Curve::ID,
            BlockShape::InterSection => InterSection::ID,
            BlockShape::TInterSection => TInterSection::ID,
            BlockShape::Roundabout => Roundabout::ID,
        }
    }

    pub fn socket_num(self) -> usize {
        match self {
            BlockShape::First => FirstBlock::SOCKET_NUM,
            BlockShape::Straight => Straight::SOCKET_NUM,
            BlockShape::Curve => Curve::SOCKET_NUM,
            BlockShape::InterSection => InterSection::SOCKET_NUM,
            BlockShape::TInterSection => TInterSection::SOCKET_NUM,
            BlockShape::Roundabout => Roundabout::SOCKET_NUM,
        }
    }

    pub fn crosswalk_slots(self) -> usize {
        match self {
            BlockShape::First => FirstBlock::CROSSWALK_SLOTS,
            BlockShape::Straight => Straight::CROSSWALK_SLOTS,
            BlockShape::Curve => Curve::CROSSWALK_SLOTS,
            BlockShape::InterSection => InterSection::CROSSWALK_SLOTS,
            BlockShape::TInterSection => TInterSection::CROSSWALK_SLOTS,
            BlockShape::Roundabout => Roundabout::CROSSWALK_SLOTS,
        }
    }

    pub fn node(self, block_idx: usize, part_idx: usize, road_idx: usize) -> String {
        node_name(block_idx, self.id(), part_idx, road_idx)
    }

    pub fn attempt_connection(
        self,
        ctx: &PlacementContext<'_>,
        topology: &mut BlockTopology,
        rng: &mut ChaCha8Rng,
    ) -> Result<bool> {
        match self {
            BlockShape::First => FirstBlock::attempt_connection(ctx, topology, rng),
            BlockShape::Straight => Straight::attempt_connection(ctx, topology, rng),
            BlockShape::Curve => Curve::attempt_connection(ctx, topology, rng),
            BlockShape::InterSection => InterSection::attempt_connection(ctx, topology, rng),
            BlockShape::TInterSection => TInterSection::attempt_connection(ctx, topology, rng),
            BlockShape::Roundabout => Roundabout::attempt_connection(ctx, topology, rng),
        }
    }
}

/// Lane parameters inherited from the predecessor socket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneParams {
    pub positive_lane_num: usize,
    /// `None` when negative lanes are removed
    pub negative_lane_num: Option<usize>,
    pub lane_width: f32,
    /// Point on the road centre where the predecessor socket ends
    pub anchor: Vec2,
    /// Unit direction of travel of the positive road at the anchor
    pub heading: Vec2,
}

impl LaneParams {
    /// Widest side, in lanes
    pub fn max_lane_num(&self) -> usize {
        self.positive_lane_num
            .max(self.negative_lane_num.unwrap_or(0))
    }
}

/// Flags that alter placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockOptions {
    pub remove_negative_lanes: bool,
    pub ignore_intersection_checking: bool,
}

/// Read-only inputs of one topology sample
pub struct PlacementContext<'a> {
    pub block_index: usize,
    pub pre_socket: &'a Socket,
    pub global_network: &'a RoadNetwork,
    pub topology: &'a TopologyConfig,
    pub lanes: LaneParams,
    pub layout: LaneLayout,
    pub options: BlockOptions,
}

impl PlacementContext<'_> {
    /// Lay `road` and, unless negative lanes are removed, its reverse
    pub fn add_road(&self, network: &mut RoadNetwork, road: &Road, centerline: &Centerline) {
        self.add_road_with(network, road, centerline, &self.layout);
    }

    pub fn add_road_with(
        &self,
        network: &mut RoadNetwork,
        road: &Road,
        centerline: &Centerline,
        layout: &LaneLayout,
    ) {
        network.add_road(
            road,
            centerline,
            self.lanes.positive_lane_num,
            self.lanes.negative_lane_num,
            layout,
        );
    }

    /// True if `candidate` overlaps a road already in the global network
    pub fn conflicts(&self, candidate: &RoadNetwork) -> bool {
        !self.options.ignore_intersection_checking
            && network_conflicts(candidate, self.global_network)
    }
}

/// Candidate crosswalk position: a road of the block and a station on it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrosswalkSlot {
    pub road: Road,
    pub station: f32,
}

/// Roads, sockets and node counters produced by one topology sample
#[derive(Debug, Clone)]
pub struct BlockTopology {
    block_index: usize,
    id: &'static str,
    name: String,
    part_idx: usize,
    road_idx: usize,
    sockets: IndexMap<String, Socket>,
    respawn_roads: Vec<Road>,
    respawn_seen: AHashSet<Road>,
    network: RoadNetwork,
    crosswalk_slots: Vec<CrosswalkSlot>,
}

impl BlockTopology {
    pub fn new(block_index: usize, id: &'static str) -> Self {
        Self {
            block_index,
            id,
            name: format!("{}{}", block_index, id),
            part_idx: 0,
            road_idx: 0,
            sockets: IndexMap::new(),
            respawn_roads: Vec::new(),
            respawn_seen: AHashSet::new(),
            network: RoadNetwork::new(),
            crosswalk_slots: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn block_index(&self) -> usize {
        self.block_index
    }

    /// Forget everything a previous sample produced
    pub fn clear(&mut self) {
        self.part_idx = 0;
        self.road_idx = 0;
        self.sockets.clear();
        self.respawn_roads.clear();
        self.respawn_seen.clear();
        self.network.clear();
        self.crosswalk_slots.clear();
    }

    /// Start a new part of a composite block; resets the road counter
    pub fn set_part_idx(&mut self, part_idx: usize) {
        self.part_idx = part_idx;
        self.road_idx = 0;
    }

    /// Next node name of the current part
    pub fn add_road_node(&mut self) -> String {
        self.road_idx += 1;
        self.road_node(self.part_idx, self.road_idx - 1)
    }

    pub fn road_node(&self, part_idx: usize, road_idx: usize) -> String {
        node_name(self.block_index, self.id, part_idx, road_idx)
    }

    /// Register `socket`, assigning the next index unless it carries one
    ///
    /// Indices stay unique within the block: a socket whose index is
    /// already taken is rejected.
    pub fn add_socket(&mut self, mut socket: Socket) -> Result<()> {
        if let Some(index) = socket.index() {
            if !index.starts_with(&self.name) {
                warn!(
                    "The adding socket has index {}, which does not start with this block name {}. \
                     Current block has sockets: {:?}",
                    index,
                    self.name,
                    self.socket_indices()
                );
            }
        }
        socket.assign_index(&self.name, self.sockets.len());
        let index = socket.index().unwrap_or_default().to_string();
        if self.sockets.contains_key(&index) {
            return Err(RoadGenError::DuplicateSocketIndex {
                block: self.name.clone(),
                index,
            });
        }
        self.sockets.insert(index, socket);
        Ok(())
    }

    pub fn add_sockets(&mut self, sockets: impl IntoIterator<Item = Socket>) -> Result<()> {
        for socket in sockets {
            self.add_socket(socket)?;
        }
        Ok(())
    }

    /// Order-preserving; a road already present is skipped
    pub fn add_respawn_road(&mut self, road: Road) {
        if self.respawn_seen.insert(road.clone()) {
            self.respawn_roads.push(road);
        }
    }

    pub fn add_respawn_roads(&mut self, roads: impl IntoIterator<Item = Road>) {
        for road in roads {
            self.add_respawn_road(road);
        }
    }

    pub fn add_crosswalk_slot(&mut self, road: Road, station: f32) {
        self.crosswalk_slots.push(CrosswalkSlot { road, station });
    }

    pub fn network_mut(&mut self) -> &mut RoadNetwork {
        &mut self.network
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn sockets(&self) -> &IndexMap<String, Socket> {
        &self.sockets
    }

    pub fn socket_indices(&self) -> Vec<&str> {
        self.sockets.keys().map(String::as_str).collect()
    }

    pub fn respawn_roads(&self) -> &[Road] {
        &self.respawn_roads
    }

    pub fn crosswalk_slots(&self) -> &[CrosswalkSlot] {
        &self.crosswalk_slots
    }
}
