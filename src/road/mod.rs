//! Road, lane and network geometry consumed by blocks and the cross-section engine

pub mod centerline;
pub mod lane;
pub mod network;
pub mod node;

pub use centerline::{Centerline, LaneLayout, Turn};
pub use lane::{
    CircularLane, Lane, LaneAttributes, LaneGeometry, LaneIndex, LineColor, LineType, Side,
    StraightLane,
};
pub use network::RoadNetwork;
pub use node::{negate_node, Road, NEGATIVE_DIR};
