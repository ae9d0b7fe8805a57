//! Entry block of every network

use glam::Vec2;
use rand_chacha::ChaCha8Rng;

use crate::block::shape::{AttemptConnection, BlockTopology, PlacementContext};
use crate::block::socket::Socket;
use crate::core::error::Result;
use crate::road::{Centerline, Road};

pub const NODE_1: &str = ">";
pub const NODE_2: &str = ">>";
pub const NODE_3: &str = ">>>";

/// Where the entry block starts
pub const ORIGIN: Vec2 = Vec2::ZERO;

/// Two straight roads `>` -> `>>` -> `>>>` leaving the origin along +x
pub struct FirstBlock;

impl FirstBlock {
    /// Placeholder predecessor: the entry road itself
    pub fn entry_socket() -> Result<Socket> {
        Socket::from_positive_road(&Road::new(NODE_1, NODE_2))
    }
}

impl AttemptConnection for FirstBlock {
    const ID: &'static str = "I";
    const SOCKET_NUM: usize = 1;

    fn attempt_connection(
        ctx: &PlacementContext<'_>,
        topology: &mut BlockTopology,
        _rng: &mut ChaCha8Rng,
    ) -> Result<bool> {
        let entry_length = ctx.topology.entry_length;
        let entry_end = ctx.lanes.anchor + ctx.lanes.heading * entry_length;

        let entry_road = Road::new(NODE_1, NODE_2);
        let entry = Centerline::straight(ctx.lanes.anchor, entry_end);
        ctx.add_road(topology.network_mut(), &entry_road, &entry);

        let socket_road = Road::new(NODE_2, NODE_3);
        let socket_line =
            Centerline::straight_from(entry_end, ctx.lanes.heading, ctx.topology.socket_length);
        ctx.add_road(topology.network_mut(), &socket_road, &socket_line);

        topology.add_respawn_roads([entry_road, socket_road.clone()]);
        topology.add_socket(Socket::from_positive_road(&socket_road)?)?;
        Ok(true)
    }
}
