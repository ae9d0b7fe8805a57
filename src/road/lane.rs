//! Lane geometry providers
//!
//! The cross-section engine only talks to lanes through [`LaneGeometry`].
//! [`StraightLane`] and [`CircularLane`] are the concrete providers laid by
//! the block shapes; [`Lane`] is the enum stored in a road network.
//!
//! Coordinates: `longitudinal` runs from 0 to `length` along the direction of
//! travel, positive `lateral` points to the right of travel.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::error::RoadGenError;
use crate::road::Road;

/// Painted line type of one lane edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LineType {
    None,
    Continuous,
    Broken,
    /// Road edge with a walkable margin beyond it
    Side,
    /// Road edge with a barrier; zones behind it carry the barrier height
    Guardrail,
}

impl LineType {
    pub fn name(self) -> &'static str {
        match self {
            LineType::None => "none",
            LineType::Continuous => "continuous",
            LineType::Broken => "broken",
            LineType::Side => "side",
            LineType::Guardrail => "guardrail",
        }
    }
}

impl FromStr for LineType {
    type Err = RoadGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(LineType::None),
            "continuous" => Ok(LineType::Continuous),
            "broken" => Ok(LineType::Broken),
            "side" => Ok(LineType::Side),
            "guardrail" => Ok(LineType::Guardrail),
            other => Err(RoadGenError::UnsupportedLineType(other.to_string())),
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<LineType> for String {
    fn from(line_type: LineType) -> Self {
        line_type.name().to_string()
    }
}

impl TryFrom<String> for LineType {
    type Error = RoadGenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineColor {
    White,
    Yellow,
    Grey,
}

/// One of the two edges of a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Left then right, the order of `line_types` and `line_colors`
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Lateral direction: -1 for left, +1 for right
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn slot(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Stable identifier of a lane: its road plus its position from the centre
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaneIndex {
    pub start_node: String,
    pub end_node: String,
    pub id: usize,
}

impl LaneIndex {
    pub fn new(road: &Road, id: usize) -> Self {
        Self {
            start_node: road.start_node.clone(),
            end_node: road.end_node.clone(),
            id,
        }
    }

    pub fn road(&self) -> Road {
        Road::new(self.start_node.clone(), self.end_node.clone())
    }
}

impl fmt::Display for LaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.start_node, self.end_node, self.id)
    }
}

/// What the cross-section engine needs to know about a lane
pub trait LaneGeometry {
    fn length(&self) -> f32;
    fn width_at(&self, longitudinal: f32) -> f32;
    fn position(&self, longitudinal: f32, lateral: f32) -> Vec2;
    /// Unit direction of travel
    fn heading_at(&self, longitudinal: f32) -> Vec2;
    /// Radius of the lane centerline, 0 for straight lanes
    fn radius(&self) -> f32;
    /// Sign of the lateral offsets that point at the arc centre, 0 for
    /// straight lanes
    fn inward(&self) -> f32;
    /// `[left, right]`
    fn line_types(&self) -> [LineType; 2];
    /// `[left, right]`
    fn line_colors(&self) -> [LineColor; 2];
    fn index(&self) -> &LaneIndex;
}

/// Attributes shared by every lane shape
#[derive(Debug, Clone, PartialEq)]
pub struct LaneAttributes {
    pub width: f32,
    pub line_types: [LineType; 2],
    pub line_colors: [LineColor; 2],
    pub index: LaneIndex,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StraightLane {
    start: Vec2,
    direction: Vec2,
    length: f32,
    attributes: LaneAttributes,
}

impl StraightLane {
    pub fn new(start: Vec2, end: Vec2, attributes: LaneAttributes) -> Self {
        let delta = end - start;
        let length = delta.length();
        let direction = if length > f32::EPSILON {
            delta / length
        } else {
            Vec2::X
        };
        Self {
            start,
            direction,
            length,
            attributes,
        }
    }

    fn right(&self) -> Vec2 {
        Vec2::new(self.direction.y, -self.direction.x)
    }
}

impl LaneGeometry for StraightLane {
    fn length(&self) -> f32 {
        self.length
    }

    fn width_at(&self, _longitudinal: f32) -> f32 {
        self.attributes.width
    }

    fn position(&self, longitudinal: f32, lateral: f32) -> Vec2 {
        self.start + self.direction * longitudinal + self.right() * lateral
    }

    fn heading_at(&self, _longitudinal: f32) -> Vec2 {
        self.direction
    }

    fn radius(&self) -> f32 {
        0.0
    }

    fn inward(&self) -> f32 {
        0.0
    }

    fn line_types(&self) -> [LineType; 2] {
        self.attributes.line_types
    }

    fn line_colors(&self) -> [LineColor; 2] {
        self.attributes.line_colors
    }

    fn index(&self) -> &LaneIndex {
        &self.attributes.index
    }
}

/// Arc lane around `center`, counter-clockwise unless `clockwise`
#[derive(Debug, Clone, PartialEq)]
pub struct CircularLane {
    center: Vec2,
    radius: f32,
    start_phase: f32,
    angle: f32,
    clockwise: bool,
    attributes: LaneAttributes,
}

impl CircularLane {
    /// `angle` is the unsigned swept angle in radians
    pub fn new(
        center: Vec2,
        radius: f32,
        start_phase: f32,
        angle: f32,
        clockwise: bool,
        attributes: LaneAttributes,
    ) -> Self {
        Self {
            center,
            radius,
            start_phase: start_phase.rem_euclid(TAU),
            angle: angle.abs(),
            clockwise,
            attributes,
        }
    }

    fn direction(&self) -> f32 {
        if self.clockwise {
            -1.0
        } else {
            1.0
        }
    }

    fn phase_at(&self, longitudinal: f32) -> f32 {
        self.start_phase + self.direction() * longitudinal / self.radius
    }
}

impl LaneGeometry for CircularLane {
    fn length(&self) -> f32 {
        self.radius * self.angle
    }

    fn width_at(&self, _longitudinal: f32) -> f32 {
        self.attributes.width
    }

    fn position(&self, longitudinal: f32, lateral: f32) -> Vec2 {
        let phase = self.phase_at(longitudinal);
        let radius = self.radius + self.direction() * lateral;
        self.center + Vec2::new(phase.cos(), phase.sin()) * radius
    }

    fn heading_at(&self, longitudinal: f32) -> Vec2 {
        let phase = self.phase_at(longitudinal);
        Vec2::new(-phase.sin(), phase.cos()) * self.direction()
    }

    fn radius(&self) -> f32 {
        self.radius
    }

    fn inward(&self) -> f32 {
        -self.direction()
    }

    fn line_types(&self) -> [LineType; 2] {
        self.attributes.line_types
    }

    fn line_colors(&self) -> [LineColor; 2] {
        self.attributes.line_colors
    }

    fn index(&self) -> &LaneIndex {
        &self.attributes.index
    }
}

/// Lane stored in a road network
#[derive(Debug, Clone, PartialEq)]
pub enum Lane {
    Straight(StraightLane),
    Circular(CircularLane),
}

impl Lane {
    fn geometry(&self) -> &dyn LaneGeometry {
        match self {
            Lane::Straight(lane) => lane,
            Lane::Circular(lane) => lane,
        }
    }
}

impl LaneGeometry for Lane {
    fn length(&self) -> f32 {
        self.geometry().length()
    }

    fn width_at(&self, longitudinal: f32) -> f32 {
        self.geometry().width_at(longitudinal)
    }

    fn position(&self, longitudinal: f32, lateral: f32) -> Vec2 {
        self.geometry().position(longitudinal, lateral)
    }

    fn heading_at(&self, longitudinal: f32) -> Vec2 {
        self.geometry().heading_at(longitudinal)
    }

    fn radius(&self) -> f32 {
        self.geometry().radius()
    }

    fn inward(&self) -> f32 {
        self.geometry().inward()
    }

    fn line_types(&self) -> [LineType; 2] {
        self.geometry().line_types()
    }

    fn line_colors(&self) -> [LineColor; 2] {
        self.geometry().line_colors()
    }

    fn index(&self) -> &LaneIndex {
        self.geometry().index()
    }
}
