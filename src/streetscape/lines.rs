//! Lane edge lines as straight segments
//!
//! Side and guardrail edges also trigger the zone stack of the
//! [`Streetscape`] on that side of the lane.

use serde::Serialize;

use crate::core::config::drivable_area::{GUARDRAIL_HEIGHT, LANE_SEGMENT_LENGTH, STRIPE_LENGTH};
use crate::core::types::Point2;
use crate::road::{LaneGeometry, LineColor, LineType, Side};
use crate::streetscape::cross_section::Streetscape;

/// One straight piece of a painted line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSegment {
    pub start: Point2,
    pub end: Point2,
    pub line_type: LineType,
    pub color: LineColor,
    /// Barrier height, set for guardrails only
    pub height: Option<f32>,
}

/// `(start, end)` stations of the chords approximating a continuous line
///
/// Every chord is at most `LANE_SEGMENT_LENGTH` long and the last one ends
/// exactly at `length`.
pub fn continuous_stations(length: f32) -> Vec<(f32, f32)> {
    let count = (length / LANE_SEGMENT_LENGTH).ceil().max(1.0) as usize;
    (0..count)
        .map(|k| {
            let start = k as f32 * LANE_SEGMENT_LENGTH;
            let end = if k + 1 == count {
                length
            } else {
                (k + 1) as f32 * LANE_SEGMENT_LENGTH
            };
            (start, end)
        })
        .collect()
}

/// `(start, end)` stations of the stripes of a broken line
///
/// `floor(length / 2S)` stripes with gaps of the same length; the last stripe
/// ends at `length - S`.
pub fn broken_stations(length: f32) -> Vec<(f32, f32)> {
    let count = (length / (2.0 * STRIPE_LENGTH)).floor().max(0.0) as usize;
    (0..count)
        .map(|k| {
            let start = k as f32 * STRIPE_LENGTH * 2.0;
            let end = if k + 1 == count {
                length - STRIPE_LENGTH
            } else {
                start + STRIPE_LENGTH
            };
            (start, end)
        })
        .collect()
}

fn push_segments<L: LaneGeometry + ?Sized>(
    lane: &L,
    stations: &[(f32, f32)],
    lateral: f32,
    line_type: LineType,
    color: LineColor,
    height: Option<f32>,
    out: &mut Vec<LineSegment>,
) {
    out.extend(stations.iter().map(|&(from, to)| {
        let start = lane.position(from, lateral);
        let end = lane.position(to, lateral);
        LineSegment {
            start: [start.x, start.y],
            end: [end.x, end.y],
            line_type,
            color,
            height,
        }
    }));
}

/// Emit the edges of `lane` selected by `draw` (`[left, right]`)
///
/// Returns the number of segments appended to `out`.
pub fn emit_lane_lines<L: LaneGeometry + ?Sized>(
    lane: &L,
    draw: [bool; 2],
    streetscape: &mut Streetscape,
    out: &mut Vec<LineSegment>,
) -> usize {
    let before = out.len();
    let line_types = lane.line_types();
    let line_colors = lane.line_colors();

    for side in Side::BOTH {
        if !draw[side.slot()] {
            continue;
        }
        let line_type = line_types[side.slot()];
        let color = line_colors[side.slot()];
        let lateral = side.sign() * lane.width_at(0.0) / 2.0;
        let length = lane.length();

        match line_type {
            LineType::None => {}
            LineType::Continuous => {
                push_segments(lane, &continuous_stations(length), lateral, line_type, color, None, out);
            }
            LineType::Broken => {
                push_segments(lane, &broken_stations(length), lateral, line_type, color, None, out);
            }
            LineType::Side => {
                push_segments(lane, &continuous_stations(length), lateral, line_type, color, None, out);
                streetscape.generate_side_zones(lane, side, None);
            }
            LineType::Guardrail => {
                let height = Some(GUARDRAIL_HEIGHT);
                push_segments(lane, &continuous_stations(length), lateral, line_type, color, height, out);
                streetscape.generate_side_zones(lane, side, height);
            }
        }
    }

    out.len() - before
}
