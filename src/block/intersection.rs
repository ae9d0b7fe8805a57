//! Four-way and T junctions
//!
//! The junction box is centred `B = widest side + corner radius` ahead of the
//! predecessor socket. Every leg meets the box at distance `B` from its
//! centre; legs are joined pairwise by connector roads that are straight for
//! opposite legs and quarter arcs of radius `B` otherwise. Connectors are
//! laid in part 0, exit `k` in part `k + 1`.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand_chacha::ChaCha8Rng;

use crate::block::shape::{AttemptConnection, BlockTopology, PlacementContext};
use crate::block::socket::Socket;
use crate::core::config::drivable_area::CROSSWALK_WIDTH;
use crate::core::error::Result;
use crate::road::{negate_node, Centerline, LaneLayout, Road, Turn};

/// Direction of a junction exit relative to the incoming road
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Right,
    Straight,
    Left,
}

impl Exit {
    pub(crate) fn part_idx(self) -> usize {
        match self {
            Exit::Right => 1,
            Exit::Straight => 2,
            Exit::Left => 3,
        }
    }

    pub(crate) fn direction(self, heading: Vec2) -> Vec2 {
        match self {
            Exit::Right => Vec2::new(heading.y, -heading.x),
            Exit::Straight => heading,
            Exit::Left => heading.perp(),
        }
    }
}

/// Where a leg meets the junction box
pub(crate) struct Leg {
    pub(crate) point: Vec2,
    /// Unit vector pointing away from the box
    pub(crate) outward: Vec2,
    /// Node through which traffic enters the box
    pub(crate) in_node: String,
    /// Node through which traffic leaves the box
    pub(crate) out_node: String,
}

fn connector(from: &Leg, to: &Leg, radius: f32) -> Centerline {
    let heading = -from.outward;
    if from.outward.dot(to.outward) < -0.5 {
        return Centerline::straight(from.point, to.point);
    }
    let right = Vec2::new(heading.y, -heading.x);
    let turn = if right.dot(to.outward) > 0.5 {
        Turn::Right
    } else {
        Turn::Left
    };
    Centerline::arc_from(from.point, heading, radius, FRAC_PI_2, turn)
}

/// Lay one exit road per entry of `exits`, starting `reach` away from
/// `center`
///
/// Returns the entry leg followed by one leg per exit, and the exit roads.
pub(crate) fn lay_legs(
    ctx: &PlacementContext<'_>,
    topology: &mut BlockTopology,
    center: Vec2,
    reach: f32,
    exits: &[Exit],
) -> (Vec<Leg>, Vec<Road>) {
    let lanes = ctx.lanes;
    let entry_node = ctx.pre_socket.positive_road().end_node.clone();
    let mut legs = vec![Leg {
        point: lanes.anchor,
        outward: -lanes.heading,
        out_node: negate_node(&entry_node),
        in_node: entry_node,
    }];

    let mut exit_roads = Vec::with_capacity(exits.len());
    for exit in exits {
        let direction = exit.direction(lanes.heading);
        let mouth = center + direction * reach;

        topology.set_part_idx(exit.part_idx());
        let mouth_node = topology.add_road_node();
        let outer_node = topology.add_road_node();
        let road = Road::new(mouth_node.clone(), outer_node);
        let centerline = Centerline::straight_from(mouth, direction, ctx.topology.exit_length);
        ctx.add_road(topology.network_mut(), &road, &centerline);

        legs.push(Leg {
            point: mouth,
            outward: direction,
            in_node: negate_node(&mouth_node),
            out_node: mouth_node,
        });
        exit_roads.push(road);
    }
    (legs, exit_roads)
}

/// Crosswalk slots at the mouth and the far end of every exit
pub(crate) fn add_exit_slots(
    ctx: &PlacementContext<'_>,
    topology: &mut BlockTopology,
    exit_roads: &[Road],
) {
    let last_station = (ctx.topology.exit_length - CROSSWALK_WIDTH).max(0.0);
    for road in exit_roads {
        topology.add_crosswalk_slot(road.clone(), 0.0);
        topology.add_crosswalk_slot(road.clone(), last_station);
    }
}

fn attach_junction(
    ctx: &PlacementContext<'_>,
    topology: &mut BlockTopology,
    exits: &[Exit],
) -> Result<bool> {
    let lanes = ctx.lanes;
    let box_radius = lanes.max_lane_num() as f32 * lanes.lane_width + ctx.topology.corner_radius;
    let center = lanes.anchor + lanes.heading * box_radius;
    let (legs, exit_roads) = lay_legs(ctx, topology, center, box_radius, exits);

    // The negative lanes of (a -> b) carry traffic from b to a
    topology.set_part_idx(0);
    let junction = LaneLayout::junction(lanes.lane_width);
    for (i, from) in legs.iter().enumerate() {
        for to in legs.iter().skip(i + 1) {
            let road = Road::new(from.in_node.clone(), to.out_node.clone());
            let centerline = connector(from, to, box_radius);
            ctx.add_road_with(topology.network_mut(), &road, &centerline, &junction);
        }
    }
    add_exit_slots(ctx, topology, &exit_roads);

    let no_cross = !ctx.conflicts(topology.network());
    for road in &exit_roads {
        topology.add_socket(Socket::from_positive_road(road)?)?;
    }
    Ok(no_cross)
}

/// Four-way junction with right, straight and left exits
pub struct InterSection;

impl AttemptConnection for InterSection {
    const ID: &'static str = "X";
    const SOCKET_NUM: usize = 3;
    const CROSSWALK_SLOTS: usize = 6;

    fn attempt_connection(
        ctx: &PlacementContext<'_>,
        topology: &mut BlockTopology,
        _rng: &mut ChaCha8Rng,
    ) -> Result<bool> {
        attach_junction(ctx, topology, &[Exit::Right, Exit::Straight, Exit::Left])
    }
}

/// Junction without the straight exit
pub struct TInterSection;

impl AttemptConnection for TInterSection {
    const ID: &'static str = "T";
    const SOCKET_NUM: usize = 2;
    const CROSSWALK_SLOTS: usize = 4;

    fn attempt_connection(
        ctx: &PlacementContext<'_>,
        topology: &mut BlockTopology,
        _rng: &mut ChaCha8Rng,
    ) -> Result<bool> {
        attach_junction(ctx, topology, &[Exit::Right, Exit::Left])
    }
}
