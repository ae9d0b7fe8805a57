//! Blocks: topological units of the road network
//!
//! A block is built against a predecessor socket and the global network,
//! samples a topology through its shape, and once placed exposes its own
//! sockets to later blocks. Its streetscape widths and crosswalk slots are
//! drawn once at construction.

pub mod curve;
pub mod first;
pub mod generator;
pub mod intersection;
pub mod roundabout;
pub mod shape;
pub mod socket;
pub mod straight;

use indexmap::IndexMap;
use rand::seq::IteratorRandom;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::core::config::drivable_area::CROSSWALK_WIDTH;
use crate::core::config::{GenerationConfig, TopologyConfig};
use crate::core::error::{Result, RoadGenError};
use crate::road::{LaneGeometry, LaneLayout, Road, RoadNetwork, Side};
use crate::streetscape::{
    emit_lane_lines, DiagnosticMode, LineSegment, Streetscape, StreetscapeRecords, ZoneOutcome,
    ZoneWidths,
};

pub use curve::Curve;
pub use first::FirstBlock;
pub use generator::{NetworkExport, NetworkGenerator};
pub use intersection::{InterSection, TInterSection};
pub use roundabout::Roundabout;
pub use shape::{
    node_name, AttemptConnection, BlockOptions, BlockShape, BlockTopology, CrosswalkSlot,
    LaneParams, PlacementContext,
};
pub use socket::Socket;

/// Socket lookup by position or by fully qualified index
#[derive(Debug, Clone, Copy)]
pub enum SocketLookup<'a> {
    Position(usize),
    Index(&'a str),
}

impl From<usize> for SocketLookup<'_> {
    fn from(position: usize) -> Self {
        SocketLookup::Position(position)
    }
}

impl<'a> From<&'a str> for SocketLookup<'a> {
    fn from(index: &'a str) -> Self {
        SocketLookup::Index(index)
    }
}

/// Everything the rendering backend needs to materialise one block
#[derive(Debug, Clone, Serialize)]
pub struct BlockGeometry {
    pub name: String,
    pub segments: Vec<LineSegment>,
    #[serde(flatten)]
    pub records: StreetscapeRecords,
}

pub struct Block {
    block_index: usize,
    shape: BlockShape,
    pre_block_socket: Socket,
    options: BlockOptions,
    lanes: LaneParams,
    layout: LaneLayout,
    topology_config: TopologyConfig,
    zone_widths: ZoneWidths,
    mode: DiagnosticMode,
    valid_crosswalks: Vec<usize>,
    number_of_sample_trial: u32,
    topology: BlockTopology,
}

impl Block {
    pub fn new(
        block_index: usize,
        shape: BlockShape,
        pre_block_socket: Socket,
        global_network: &RoadNetwork,
        config: &GenerationConfig,
        rng: &mut ChaCha8Rng,
    ) -> Result<Self> {
        Self::with_options(
            block_index,
            shape,
            pre_block_socket,
            global_network,
            config,
            BlockOptions::default(),
            rng,
        )
    }

    pub fn with_options(
        block_index: usize,
        shape: BlockShape,
        pre_block_socket: Socket,
        global_network: &RoadNetwork,
        config: &GenerationConfig,
        options: BlockOptions,
        rng: &mut ChaCha8Rng,
    ) -> Result<Self> {
        if block_index == 0 && shape != BlockShape::First {
            return Err(RoadGenError::ReservedBlockIndex(shape.id()));
        }

        let lanes = if block_index == 0 {
            LaneParams {
                positive_lane_num: config.lane_num,
                negative_lane_num: (!options.remove_negative_lanes).then_some(config.lane_num),
                lane_width: config.lane_width,
                anchor: first::ORIGIN,
                heading: glam::Vec2::X,
            }
        } else {
            Self::inherit_lanes(&pre_block_socket, global_network, options)?
        };
        let layout = LaneLayout::new(
            lanes.lane_width,
            config.center_line_type,
            config.side_lane_line_type,
        );

        let mode = DiagnosticMode::from_flags(&config.diagnostics);
        if mode.is_active() {
            info!("Block {}{} uses diagnostic mode {:?}", block_index, shape.id(), mode);
        }
        let zone_widths = ZoneWidths::resolve(config.profile, &config.zone_overrides, mode, rng);

        let slots = shape.crosswalk_slots();
        let count = (config.crosswalk_density * slots as f32).round() as usize;
        let mut valid_crosswalks = (0..slots).choose_multiple(rng, count.min(slots));
        valid_crosswalks.sort_unstable();

        Ok(Self {
            block_index,
            shape,
            pre_block_socket,
            options,
            lanes,
            layout,
            topology_config: config.topology.clone(),
            zone_widths,
            mode,
            valid_crosswalks,
            number_of_sample_trial: 0,
            topology: BlockTopology::new(block_index, shape.id()),
        })
    }

    /// Lane count and width from the predecessor's lanes; the outermost lane
    /// is the basic lane
    fn inherit_lanes(
        socket: &Socket,
        global_network: &RoadNetwork,
        options: BlockOptions,
    ) -> Result<LaneParams> {
        let positive = socket.positive_lanes(global_network)?;
        let negative_lane_num = if options.remove_negative_lanes {
            None
        } else {
            socket.negative_lanes(global_network)?.map(<[_]>::len)
        };

        let lanes_missing = || RoadGenError::LanesNotFound(socket.positive_road().clone());
        let basic = positive.last().ok_or_else(lanes_missing)?;
        let inner = positive.first().ok_or_else(lanes_missing)?;
        let lane_width = basic.width_at(0.0);
        let end = inner.length();

        Ok(LaneParams {
            positive_lane_num: positive.len(),
            negative_lane_num,
            lane_width,
            anchor: inner.position(end, -inner.width_at(end) / 2.0),
            heading: inner.heading_at(end),
        })
    }

    /// Try one fresh topology; `Ok(false)` asks the caller to retry
    pub fn sample_topology(
        &mut self,
        global_network: &RoadNetwork,
        rng: &mut ChaCha8Rng,
    ) -> Result<bool> {
        self.number_of_sample_trial += 1;
        self.topology.clear();

        let ctx = PlacementContext {
            block_index: self.block_index,
            pre_socket: &self.pre_block_socket,
            global_network,
            topology: &self.topology_config,
            lanes: self.lanes,
            layout: self.layout,
            options: self.options,
        };
        if !self.shape.attempt_connection(&ctx, &mut self.topology, rng)? {
            debug!(
                "Block {} failed topology sample {}",
                self.topology.name(),
                self.number_of_sample_trial
            );
            return Ok(false);
        }

        let actual = self.topology.sockets().len();
        if actual != self.shape.socket_num() {
            return Err(RoadGenError::SocketCountMismatch {
                block: self.name().to_string(),
                expected: self.shape.socket_num(),
                actual,
            });
        }
        self.check_crosswalk_slots()?;
        Ok(true)
    }

    fn check_crosswalk_slots(&self) -> Result<()> {
        if self.topology.crosswalk_slots().len() != self.shape.crosswalk_slots() {
            return Err(self.slot_mismatch());
        }
        Ok(())
    }

    fn slot_mismatch(&self) -> RoadGenError {
        RoadGenError::CrosswalkSlotMismatch {
            block: self.name().to_string(),
            expected: self.shape.crosswalk_slots(),
            actual: self.topology.crosswalk_slots().len(),
        }
    }

    pub fn get_socket<'a>(&self, lookup: impl Into<SocketLookup<'a>>) -> Result<&Socket> {
        let sockets = self.topology.sockets();
        match lookup.into() {
            SocketLookup::Position(position) => sockets
                .get_index(position)
                .map(|(_, socket)| socket)
                .ok_or_else(|| RoadGenError::SocketIndexOutOfRange {
                    block: self.name().to_string(),
                    index: position,
                    len: sockets.len(),
                }),
            SocketLookup::Index(index) => {
                if !index.starts_with(self.name()) {
                    return Err(RoadGenError::ForeignSocketIndex {
                        block: self.name().to_string(),
                        index: index.to_string(),
                    });
                }
                sockets
                    .get(index)
                    .ok_or_else(|| RoadGenError::UnknownSocket(index.to_string()))
            }
        }
    }

    pub fn add_sockets(&mut self, sockets: impl IntoIterator<Item = Socket>) -> Result<()> {
        self.topology.add_sockets(sockets)
    }

    pub fn add_respawn_roads(&mut self, roads: impl IntoIterator<Item = Road>) {
        self.topology.add_respawn_roads(roads);
    }

    pub fn set_part_idx(&mut self, part_idx: usize) {
        self.topology.set_part_idx(part_idx);
    }

    pub fn add_road_node(&mut self) -> String {
        self.topology.add_road_node()
    }

    pub fn road_node(&self, part_idx: usize, road_idx: usize) -> String {
        self.topology.road_node(part_idx, road_idx)
    }

    pub fn node(&self, block_idx: usize, part_idx: usize, road_idx: usize) -> String {
        self.shape.node(block_idx, part_idx, road_idx)
    }

    pub fn name(&self) -> &str {
        self.topology.name()
    }

    pub fn block_index(&self) -> usize {
        self.block_index
    }

    pub fn shape(&self) -> BlockShape {
        self.shape
    }

    pub fn pre_block_socket(&self) -> &Socket {
        &self.pre_block_socket
    }

    pub fn number_of_sample_trial(&self) -> u32 {
        self.number_of_sample_trial
    }

    pub fn lanes(&self) -> &LaneParams {
        &self.lanes
    }

    pub fn zone_widths(&self) -> &ZoneWidths {
        &self.zone_widths
    }

    pub fn valid_crosswalks(&self) -> &[usize] {
        &self.valid_crosswalks
    }

    pub fn sockets(&self) -> &IndexMap<String, Socket> {
        self.topology.sockets()
    }

    pub fn socket_indices(&self) -> Vec<&str> {
        self.topology.socket_indices()
    }

    pub fn respawn_roads(&self) -> &[Road] {
        self.topology.respawn_roads()
    }

    pub fn block_network(&self) -> &RoadNetwork {
        self.topology.network()
    }

    /// Emit the lines, zones and crosswalks of this block
    ///
    /// The centre line is drawn once, from the positive road: lane 0 of a
    /// negative road draws neither edge.
    pub fn construct(&self) -> Result<BlockGeometry> {
        let mut streetscape = Streetscape::new(self.zone_widths, self.mode);
        let mut segments = Vec::new();

        for (from, to, lanes) in self.topology.network().iter() {
            let negative = Road::new(from, to).is_negative_road();
            for (id, lane) in lanes.iter().enumerate() {
                let draw = if negative && id == 0 {
                    [false, false]
                } else {
                    [true, true]
                };
                emit_lane_lines(lane, draw, &mut streetscape, &mut segments);
            }
        }

        self.construct_crosswalks(&mut streetscape)?;

        Ok(BlockGeometry {
            name: self.name().to_string(),
            segments,
            records: streetscape.into_records(),
        })
    }

    /// One crosswalk per selected slot, spanning every lane of the road
    fn construct_crosswalks(&self, streetscape: &mut Streetscape) -> Result<()> {
        let network = self.topology.network();
        let slots = self.topology.crosswalk_slots();

        for &slot_idx in &self.valid_crosswalks {
            let slot = slots.get(slot_idx).ok_or_else(|| self.slot_mismatch())?;
            let lanes = network
                .lanes(&slot.road)
                .ok_or_else(|| RoadGenError::LanesNotFound(slot.road.clone()))?;
            let lane = &lanes[0];
            let width = lane.width_at(0.0);
            let negative_lane_num = network.lanes(&-&slot.road).map_or(0, <[_]>::len);

            let start_lateral = -(width / 2.0 + negative_lane_num as f32 * width);
            let side_lateral = lanes.len() as f32 * width - width / 2.0;
            let from = slot.station.clamp(0.0, lane.length());
            let to = (slot.station + CROSSWALK_WIDTH).min(lane.length());

            let key = format!("CRS_{}_{}", self.name(), slot_idx);
            let outcome = streetscape.build_crosswalk(
                key,
                lane,
                &[from, to],
                start_lateral,
                side_lateral,
                Side::Right,
                None,
            );
            if outcome != ZoneOutcome::Generated {
                debug!("Crosswalk slot {} of {}: {:?}", slot_idx, self.name(), outcome);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn placed_first(config: &GenerationConfig, rng: &mut ChaCha8Rng) -> Block {
        let mut block = Block::new(
            0,
            BlockShape::First,
            FirstBlock::entry_socket().unwrap(),
            &RoadNetwork::new(),
            config,
            rng,
        )
        .unwrap();
        assert!(block.sample_topology(&RoadNetwork::new(), rng).unwrap());
        block
    }

    #[test]
    fn test_index_zero_reserved_for_first_block() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = Block::new(
            0,
            BlockShape::Straight,
            FirstBlock::entry_socket().unwrap(),
            &RoadNetwork::new(),
            &GenerationConfig::default(),
            &mut rng,
        );
        assert!(matches!(result, Err(RoadGenError::ReservedBlockIndex("S"))));
    }

    #[test]
    fn test_first_block_layout() {
        let config = GenerationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let block = placed_first(&config, &mut rng);

        assert_eq!(block.name(), "0I");
        assert_eq!(block.socket_indices(), vec!["0I-socket0"]);
        assert_eq!(block.respawn_roads().len(), 2);
        assert_eq!(block.block_network().lane_count(), 8);
        assert_eq!(block.number_of_sample_trial(), 1);
    }

    #[test]
    fn test_get_socket_lookups() {
        let config = GenerationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let block = placed_first(&config, &mut rng);

        assert!(block.get_socket(0usize).is_ok());
        assert!(block.get_socket("0I-socket0").is_ok());
        assert!(matches!(
            block.get_socket(1usize),
            Err(RoadGenError::SocketIndexOutOfRange { index: 1, len: 1, .. })
        ));
        assert!(matches!(
            block.get_socket("3X-socket0"),
            Err(RoadGenError::ForeignSocketIndex { .. })
        ));
        assert!(matches!(
            block.get_socket("0I-socket9"),
            Err(RoadGenError::UnknownSocket(_))
        ));
    }

    #[test]
    fn test_straight_inherits_predecessor_lanes() {
        let config = GenerationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let first = placed_first(&config, &mut rng);
        let mut global = RoadNetwork::new();
        global.merge(first.block_network());

        let socket = first.get_socket(0usize).unwrap().clone();
        let mut block = Block::new(1, BlockShape::Straight, socket, &global, &config, &mut rng).unwrap();
        assert!(block.sample_topology(&global, &mut rng).unwrap());

        assert_eq!(block.lanes().positive_lane_num, 2);
        assert_eq!(block.lanes().negative_lane_num, Some(2));
        assert!((block.lanes().anchor - glam::Vec2::new(60.0, 0.0)).length() < 1e-4);
        let road = block.get_socket(0usize).unwrap().positive_road().clone();
        assert_eq!(road, Road::new(">>>", "1S0_0_"));
    }

    #[test]
    fn test_removed_negative_lanes() {
        let config = GenerationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let first = placed_first(&config, &mut rng);
        let mut global = RoadNetwork::new();
        global.merge(first.block_network());

        let options = BlockOptions {
            remove_negative_lanes: true,
            ignore_intersection_checking: false,
        };
        let socket = first.get_socket(0usize).unwrap().clone();
        let mut block =
            Block::with_options(1, BlockShape::Straight, socket, &global, &config, options, &mut rng)
                .unwrap();
        assert!(block.sample_topology(&global, &mut rng).unwrap());
        assert_eq!(block.block_network().lane_count(), 2);
    }

    #[test]
    fn test_sampling_clears_previous_topology() {
        let config = GenerationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut block = placed_first(&config, &mut rng);
        assert!(block.sample_topology(&RoadNetwork::new(), &mut rng).unwrap());
        assert_eq!(block.sockets().len(), 1);
        assert_eq!(block.respawn_roads().len(), 2);
        assert_eq!(block.number_of_sample_trial(), 2);
    }

    #[test]
    fn test_crosswalk_count_follows_density() {
        let config = GenerationConfig {
            crosswalk_density: 0.5,
            ..GenerationConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let first = placed_first(&config, &mut rng);
        let mut global = RoadNetwork::new();
        global.merge(first.block_network());

        let socket = first.get_socket(0usize).unwrap().clone();
        let mut block =
            Block::new(1, BlockShape::InterSection, socket, &global, &config, &mut rng).unwrap();
        assert_eq!(block.valid_crosswalks().len(), 3);
        assert!(block.sample_topology(&global, &mut rng).unwrap());

        let geometry = block.construct().unwrap();
        assert_eq!(geometry.records.crosswalks.len(), 3);
        for slot in block.valid_crosswalks() {
            assert!(geometry
                .records
                .crosswalks
                .contains_key(&format!("CRS_1X_{}", slot)));
        }
    }
}
