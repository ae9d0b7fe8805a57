use rand_chacha::ChaCha8Rng;

use crate::block::shape::{AttemptConnection, BlockTopology, PlacementContext};
use crate::block::socket::Socket;
use crate::core::error::Result;
use crate::road::{Centerline, Road};

/// One straight road continuing the predecessor socket
pub struct Straight;

impl AttemptConnection for Straight {
    const ID: &'static str = "S";
    const SOCKET_NUM: usize = 1;

    fn attempt_connection(
        ctx: &PlacementContext<'_>,
        topology: &mut BlockTopology,
        rng: &mut ChaCha8Rng,
    ) -> Result<bool> {
        let length = ctx.topology.straight_length.sample(rng);

        topology.set_part_idx(0);
        let start_node = ctx.pre_socket.positive_road().end_node.clone();
        let end_node = topology.add_road_node();
        let road = Road::new(start_node, end_node);

        let centerline = Centerline::straight_from(ctx.lanes.anchor, ctx.lanes.heading, length);
        ctx.add_road(topology.network_mut(), &road, &centerline);

        let no_cross = !ctx.conflicts(topology.network());
        topology.add_socket(Socket::from_positive_road(&road)?)?;
        Ok(no_cross)
    }
}
