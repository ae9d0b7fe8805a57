use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::block::shape::{AttemptConnection, BlockTopology, PlacementContext};
use crate::block::socket::Socket;
use crate::core::config::drivable_area::CROSSWALK_WIDTH;
use crate::core::error::Result;
use crate::road::{Centerline, Road, Turn};

/// A single arc with sampled radius, angle and turning direction
///
/// Crosswalk slots sit at the start, middle and end of the arc.
pub struct Curve;

impl AttemptConnection for Curve {
    const ID: &'static str = "C";
    const SOCKET_NUM: usize = 1;
    const CROSSWALK_SLOTS: usize = 3;

    fn attempt_connection(
        ctx: &PlacementContext<'_>,
        topology: &mut BlockTopology,
        rng: &mut ChaCha8Rng,
    ) -> Result<bool> {
        let radius = ctx.topology.curve_radius.sample(rng);
        let angle = ctx.topology.curve_angle_deg.sample(rng).to_radians();
        let turn = if rng.gen_bool(0.5) {
            Turn::Left
        } else {
            Turn::Right
        };

        let centerline = Centerline::arc_from(ctx.lanes.anchor, ctx.lanes.heading, radius, angle, turn);
        let innermost = centerline
            .innermost_radius(ctx.lanes.max_lane_num(), ctx.lanes.lane_width)
            .unwrap_or(radius);
        if innermost <= 0.0 {
            debug!("Curve radius {} too small for {} lanes", radius, ctx.lanes.max_lane_num());
            return Ok(false);
        }

        topology.set_part_idx(0);
        let start_node = ctx.pre_socket.positive_road().end_node.clone();
        let end_node = topology.add_road_node();
        let road = Road::new(start_node, end_node);
        ctx.add_road(topology.network_mut(), &road, &centerline);

        let length = centerline.length();
        let last = (length - CROSSWALK_WIDTH).max(0.0);
        for station in [0.0, last / 2.0, last] {
            topology.add_crosswalk_slot(road.clone(), station);
        }

        let no_cross = !ctx.conflicts(topology.network());
        topology.add_socket(Socket::from_positive_road(&road)?)?;
        Ok(no_cross)
    }
}
