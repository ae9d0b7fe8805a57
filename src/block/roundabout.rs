//! Roundabout: a one-way ring joined to four legs
//!
//! The ring circulates counter-clockwise through one node per leg, in leg
//! order. Each leg reaches the ring through a two-way radial road, so
//! traffic enters the ring at node `N` and leaves it from `-N`. Ring and
//! radials are laid in part 0, exit `k` in part `k + 1`.

use std::f32::consts::FRAC_PI_2;

use rand_chacha::ChaCha8Rng;

use crate::block::intersection::{add_exit_slots, lay_legs, Exit};
use crate::block::shape::{AttemptConnection, BlockTopology, PlacementContext};
use crate::block::socket::Socket;
use crate::core::error::Result;
use crate::road::{Centerline, LaneLayout, Road, Turn};

pub struct Roundabout;

impl AttemptConnection for Roundabout {
    const ID: &'static str = "O";
    const SOCKET_NUM: usize = 3;
    const CROSSWALK_SLOTS: usize = 6;

    fn attempt_connection(
        ctx: &PlacementContext<'_>,
        topology: &mut BlockTopology,
        _rng: &mut ChaCha8Rng,
    ) -> Result<bool> {
        let lanes = ctx.lanes;
        let ring_radius = ctx.topology.corner_radius;
        let reach = ring_radius + 2.0 * lanes.max_lane_num() as f32 * lanes.lane_width;
        let center = lanes.anchor + lanes.heading * reach;
        let (legs, exit_roads) = lay_legs(
            ctx,
            topology,
            center,
            reach,
            &[Exit::Right, Exit::Straight, Exit::Left],
        );

        topology.set_part_idx(0);
        let ring_nodes: Vec<String> = legs.iter().map(|_| topology.add_road_node()).collect();
        for (leg, node) in legs.iter().zip(&ring_nodes) {
            let road = Road::new(leg.in_node.clone(), node.clone());
            let radial = Centerline::straight(leg.point, center + leg.outward * ring_radius);
            ctx.add_road(topology.network_mut(), &road, &radial);
        }

        // Legs are in counter-clockwise order, a quarter turn apart
        let ring_layout = LaneLayout::junction(lanes.lane_width);
        for (k, leg) in legs.iter().enumerate() {
            let next = &ring_nodes[(k + 1) % ring_nodes.len()];
            let road = Road::new(ring_nodes[k].clone(), next.clone());
            let start = center + leg.outward * ring_radius;
            let heading = leg.outward.perp();
            let arc = Centerline::arc_from(start, heading, ring_radius, FRAC_PI_2, Turn::Left);
            topology
                .network_mut()
                .add_road(&road, &arc, lanes.positive_lane_num, None, &ring_layout);
        }
        add_exit_slots(ctx, topology, &exit_roads);

        let no_cross = !ctx.conflicts(topology.network());
        for road in &exit_roads {
            topology.add_socket(Socket::from_positive_road(road)?)?;
        }
        Ok(no_cross)
    }
}
