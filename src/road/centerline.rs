//! Road centerlines and the lanes derived from them
//!
//! A centerline runs between the two directions of a road. Positive lanes are
//! offset to its right, negative lanes are laid on the reversed centerline so
//! they too sit to the right of their own direction of travel.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::road::lane::{
    CircularLane, Lane, LaneAttributes, LaneIndex, LineColor, LineType, StraightLane,
};
use crate::road::Road;

/// Turning direction of an arc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// Line types used when laying the lanes of one road
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneLayout {
    pub lane_width: f32,
    /// Left edge of the innermost lane
    pub center_line: LineType,
    /// Right edge of the outermost lane
    pub side_line: LineType,
    /// Left edge of every other lane
    pub divider: LineType,
}

impl LaneLayout {
    pub fn new(lane_width: f32, center_line: LineType, side_line: LineType) -> Self {
        Self {
            lane_width,
            center_line,
            side_line,
            divider: LineType::Broken,
        }
    }

    /// Unmarked layout for lanes inside a junction box
    pub fn junction(lane_width: f32) -> Self {
        Self {
            lane_width,
            center_line: LineType::None,
            side_line: LineType::None,
            divider: LineType::None,
        }
    }

    fn attributes(&self, road: &Road, id: usize, lane_num: usize) -> LaneAttributes {
        let left = if id == 0 {
            self.center_line
        } else {
            self.divider
        };
        let right = if id + 1 == lane_num {
            self.side_line
        } else {
            LineType::None
        };
        let left_color = if id == 0 {
            LineColor::Yellow
        } else {
            LineColor::White
        };
        LaneAttributes {
            width: self.lane_width,
            line_types: [left, right],
            line_colors: [left_color, LineColor::White],
            index: LaneIndex::new(road, id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Centerline {
    Straight {
        start: Vec2,
        end: Vec2,
    },
    Arc {
        center: Vec2,
        radius: f32,
        start_phase: f32,
        /// Unsigned swept angle in radians
        angle: f32,
        clockwise: bool,
    },
}

fn right_of(heading: Vec2) -> Vec2 {
    Vec2::new(heading.y, -heading.x)
}

impl Centerline {
    pub fn straight(start: Vec2, end: Vec2) -> Self {
        Centerline::Straight { start, end }
    }

    pub fn straight_from(start: Vec2, heading: Vec2, length: f32) -> Self {
        Centerline::Straight {
            start,
            end: start + heading.normalize() * length,
        }
    }

    /// Arc leaving `start` along `heading` and turning by `angle` radians
    pub fn arc_from(start: Vec2, heading: Vec2, radius: f32, angle: f32, turn: Turn) -> Self {
        let heading = heading.normalize();
        let (center, clockwise) = match turn {
            Turn::Left => (start + heading.perp() * radius, false),
            Turn::Right => (start + right_of(heading) * radius, true),
        };
        let offset = start - center;
        Centerline::Arc {
            center,
            radius,
            start_phase: offset.y.atan2(offset.x),
            angle: angle.abs(),
            clockwise,
        }
    }

    pub fn length(&self) -> f32 {
        match *self {
            Centerline::Straight { start, end } => (end - start).length(),
            Centerline::Arc { radius, angle, .. } => radius * angle,
        }
    }

    pub fn end_point(&self) -> Vec2 {
        match *self {
            Centerline::Straight { end, .. } => end,
            Centerline::Arc {
                center,
                radius,
                start_phase,
                angle,
                clockwise,
            } => {
                let phase = start_phase + if clockwise { -angle } else { angle };
                center + Vec2::new(phase.cos(), phase.sin()) * radius
            }
        }
    }

    pub fn end_heading(&self) -> Vec2 {
        match *self {
            Centerline::Straight { start, end } => (end - start).normalize(),
            Centerline::Arc {
                start_phase,
                angle,
                clockwise,
                ..
            } => {
                let sign = if clockwise { -1.0 } else { 1.0 };
                let phase = start_phase + sign * angle;
                Vec2::new(-phase.sin(), phase.cos()) * sign
            }
        }
    }

    /// Same alignment travelled the other way
    pub fn reversed(&self) -> Self {
        match *self {
            Centerline::Straight { start, end } => Centerline::Straight {
                start: end,
                end: start,
            },
            Centerline::Arc {
                center,
                radius,
                start_phase,
                angle,
                clockwise,
            } => {
                let end_phase = start_phase + if clockwise { -angle } else { angle };
                Centerline::Arc {
                    center,
                    radius,
                    start_phase: end_phase.rem_euclid(TAU),
                    angle,
                    clockwise: !clockwise,
                }
            }
        }
    }

    /// Smallest lane-centre radius when `lane_num` lanes are laid on each side.
    /// `None` for straight centerlines.
    pub fn innermost_radius(&self, lane_num: usize, lane_width: f32) -> Option<f32> {
        match *self {
            Centerline::Straight { .. } => None,
            Centerline::Arc { radius, .. } => {
                Some(radius - (lane_num as f32 - 0.5) * lane_width)
            }
        }
    }

    /// Lane whose centre sits `lateral` metres right of this centerline
    pub fn lane_at(&self, lateral: f32, attributes: LaneAttributes) -> Lane {
        match *self {
            Centerline::Straight { start, end } => {
                let right = right_of((end - start).normalize()) * lateral;
                Lane::Straight(StraightLane::new(start + right, end + right, attributes))
            }
            Centerline::Arc {
                center,
                radius,
                start_phase,
                angle,
                clockwise,
            } => {
                let sign = if clockwise { -1.0 } else { 1.0 };
                Lane::Circular(CircularLane::new(
                    center,
                    radius + sign * lateral,
                    start_phase,
                    angle,
                    clockwise,
                    attributes,
                ))
            }
        }
    }

    /// Lanes of `road` laid right of this centerline, innermost first
    pub fn lanes(&self, road: &Road, lane_num: usize, layout: &LaneLayout) -> Vec<Lane> {
        (0..lane_num)
            .map(|id| {
                let lateral = (id as f32 + 0.5) * layout.lane_width;
                self.lane_at(lateral, layout.attributes(road, id, lane_num))
            })
            .collect()
    }
}
