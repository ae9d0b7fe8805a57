//! Lateral offset polygons beside lane edges
//!
//! Every zone is traced the same way: forward along the lane at the zone's
//! near lateral offset, then back along the lane at its far offset. Offsets
//! accumulate outward from the lane edge through every nearer populated zone.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::core::config::drivable_area::{SIDEWALK_LENGTH, SLOPE_RING_COUNT, SLOPE_RING_STEP};
use crate::core::types::Point2;
use crate::road::{LaneGeometry, Side};
use crate::spatial::footprint::{offset_ring, sample_stations};
use crate::streetscape::profile::{DiagnosticMode, ZoneKind, ZoneWidths};

/// Record type handed to the rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    NearRoadBufferSidewalk,
    NearRoadSidewalk,
    Sidewalk,
    FarBufferSidewalk,
    FarSidewalk,
    ValidRegion,
    Crosswalk,
}

impl From<ZoneKind> for ZoneType {
    fn from(kind: ZoneKind) -> Self {
        match kind {
            ZoneKind::NearRoadBuffer => ZoneType::NearRoadBufferSidewalk,
            ZoneKind::NearRoad => ZoneType::NearRoadSidewalk,
            ZoneKind::Main => ZoneType::Sidewalk,
            ZoneKind::FarBuffer => ZoneType::FarBufferSidewalk,
            ZoneKind::Far => ZoneType::FarSidewalk,
            ZoneKind::ValidHouse => ZoneType::ValidRegion,
        }
    }
}

/// A closed ring, not explicitly closed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneRecord {
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    pub polygon: Vec<Point2>,
    pub height: Option<f32>,
}

/// What a generation request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneOutcome {
    Generated,
    /// The zone is not populated for this block
    Absent,
    /// A record already exists under this key; the stored one is kept
    Duplicate,
    /// The far offset would cross the lane's centre of curvature
    TooCurved,
}

/// Zone and crosswalk records of one block
#[derive(Debug, Clone)]
pub struct Streetscape {
    widths: ZoneWidths,
    mode: DiagnosticMode,
    zones: IndexMap<ZoneKind, IndexMap<String, ZoneRecord>>,
    crosswalks: IndexMap<String, ZoneRecord>,
    slope_polygons: IndexMap<ZoneKind, Vec<Vec<Point2>>>,
}

impl Streetscape {
    pub fn new(widths: ZoneWidths, mode: DiagnosticMode) -> Self {
        Self {
            widths,
            mode,
            zones: IndexMap::new(),
            crosswalks: IndexMap::new(),
            slope_polygons: IndexMap::new(),
        }
    }

    pub fn widths(&self) -> &ZoneWidths {
        &self.widths
    }

    pub fn mode(&self) -> DiagnosticMode {
        self.mode
    }

    /// Unsigned `(start, side)` offsets of `kind` measured from the lane
    /// centre, `None` when the zone is absent
    pub fn zone_laterals(&self, half_width: f32, kind: ZoneKind) -> Option<(f32, f32)> {
        let width = self.widths.get(kind)?;
        let clearance = self.mode.clearance();
        let start = half_width
            + self
                .widths
                .populated()
                .take_while(|(nearer, _)| *nearer < kind)
                .map(|(_, w)| w + clearance)
                .sum::<f32>();
        Some((start, start + width))
    }

    /// Trace `kind` beside the `side` edge of `lane`
    pub fn generate_zone<L: LaneGeometry + ?Sized>(
        &mut self,
        lane: &L,
        kind: ZoneKind,
        side: Side,
        height: Option<f32>,
    ) -> ZoneOutcome {
        let Some((start, far)) = self.zone_laterals(lane.width_at(0.0) / 2.0, kind) else {
            return ZoneOutcome::Absent;
        };

        let key = lane.index().to_string();
        if self.zone(kind, &key).is_some() {
            warn!("{} zone of lane {} already exists", kind, key);
            return ZoneOutcome::Duplicate;
        }

        let start_lateral = start * side.sign();
        let side_lateral = far * side.sign();
        if reaches_centre(lane, [start_lateral, side_lateral]) {
            warn!(
                "{} zone width ({}) is too large for lane {}, it should be < radius ({})",
                kind,
                side_lateral,
                key,
                lane.radius()
            );
            return ZoneOutcome::TooCurved;
        }

        let stations = sample_stations(lane.length(), SIDEWALK_LENGTH);
        let polygon = offset_ring(lane, &stations, start_lateral, side_lateral);
        self.zones.entry(kind).or_default().insert(
            key,
            ZoneRecord {
                zone_type: kind.into(),
                polygon,
                height,
            },
        );

        if self.mode.stashes_slope_polygons() {
            let band = slope_band(lane, &stations, side_lateral, side.sign());
            self.slope_polygons.entry(kind).or_default().push(band);
        }

        ZoneOutcome::Generated
    }

    /// Every populated zone on one side of `lane`, nearest first
    pub fn generate_side_zones<L: LaneGeometry + ?Sized>(
        &mut self,
        lane: &L,
        side: Side,
        height: Option<f32>,
    ) -> Vec<(ZoneKind, ZoneOutcome)> {
        ZoneKind::ALL
            .into_iter()
            .map(|kind| (kind, self.generate_zone(lane, kind, side, height)))
            .collect()
    }

    /// Crosswalk over explicit stations and lateral bounds
    ///
    /// The bounds are signed offsets from the lane centre; `side` flips
    /// them the same way zone offsets are flipped.
    #[allow(clippy::too_many_arguments)]
    pub fn build_crosswalk<L: LaneGeometry + ?Sized>(
        &mut self,
        key: impl Into<String>,
        lane: &L,
        stations: &[f32],
        start_lateral: f32,
        side_lateral: f32,
        side: Side,
        height: Option<f32>,
    ) -> ZoneOutcome {
        let key = key.into();
        if self.crosswalks.contains_key(&key) {
            warn!("Crosswalk {} already exists", key);
            return ZoneOutcome::Duplicate;
        }

        let start_lateral = start_lateral * side.sign();
        let side_lateral = side_lateral * side.sign();
        if reaches_centre(lane, [start_lateral, side_lateral]) {
            warn!(
                "Crosswalk {} spans {} to {}, wider than lane radius ({})",
                key,
                start_lateral,
                side_lateral,
                lane.radius()
            );
            return ZoneOutcome::TooCurved;
        }

        let polygon = offset_ring(lane, stations, start_lateral, side_lateral);
        self.crosswalks.insert(
            key,
            ZoneRecord {
                zone_type: ZoneType::Crosswalk,
                polygon,
                height,
            },
        );
        ZoneOutcome::Generated
    }

    pub fn zone(&self, kind: ZoneKind, key: &str) -> Option<&ZoneRecord> {
        self.zones.get(&kind)?.get(key)
    }

    pub fn zones(&self, kind: ZoneKind) -> impl Iterator<Item = (&str, &ZoneRecord)> {
        self.zones
            .get(&kind)
            .into_iter()
            .flat_map(|records| records.iter().map(|(k, r)| (k.as_str(), r)))
    }

    pub fn zone_count(&self) -> usize {
        self.zones.values().map(IndexMap::len).sum()
    }

    pub fn crosswalks(&self) -> &IndexMap<String, ZoneRecord> {
        &self.crosswalks
    }

    pub fn slope_polygons(&self, kind: ZoneKind) -> &[Vec<Point2>] {
        self.slope_polygons
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn into_records(self) -> StreetscapeRecords {
        StreetscapeRecords {
            zones: self.zones,
            crosswalks: self.crosswalks,
            slope_polygons: self.slope_polygons,
        }
    }
}

/// Serialisable contents of a [`Streetscape`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct StreetscapeRecords {
    pub zones: IndexMap<ZoneKind, IndexMap<String, ZoneRecord>>,
    pub crosswalks: IndexMap<String, ZoneRecord>,
    pub slope_polygons: IndexMap<ZoneKind, Vec<Vec<Point2>>>,
}

/// True if an offset on the inner side of a curved lane passes its centre
fn reaches_centre<L: LaneGeometry + ?Sized>(lane: &L, laterals: [f32; 2]) -> bool {
    let radius = lane.radius();
    radius != 0.0 && laterals.iter().any(|lateral| lateral * lane.inward() > radius)
}

/// Fine offsets stepping outward beyond `side_lateral`, walked alternately
/// forward and backward
fn slope_band<L: LaneGeometry + ?Sized>(
    lane: &L,
    stations: &[f32],
    side_lateral: f32,
    direction: f32,
) -> Vec<Point2> {
    let mut band = Vec::with_capacity(stations.len() * SLOPE_RING_COUNT);
    for ring in 0..SLOPE_RING_COUNT {
        let lateral = side_lateral + direction * (ring + 1) as f32 * SLOPE_RING_STEP;
        let points = stations.iter().map(|&s| lane.position(s, lateral));
        if ring % 2 == 0 {
            band.extend(points.map(|p| [p.x, p.y]));
        } else {
            band.extend(points.rev().map(|p| [p.x, p.y]));
        }
    }
    band
}
