//! Streetscape profiles and per-block zone width resolution
//!
//! A profile decides which of the six lateral zones exist beside a road and
//! the `[low, high]` range each zone width is drawn from. Widths are drawn
//! once per block, in near-to-far zone order, from the run's random
//! generator.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::drivable_area::{
    HOUSE_WIDTH, SLOPE_CLEARANCE, SLOPE_TEST_WIDTH, TERRAIN_TEST_WIDTH,
};
use crate::core::config::DiagnosticFlags;
use crate::core::error::{Result, RoadGenError};
use crate::core::types::Interval;

/// Lateral zones beside a road edge, nearest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Buffer lane between the road edge and the walkway
    NearRoadBuffer,
    /// Furnishing strip next to the road
    NearRoad,
    /// Clear walking zone
    Main,
    /// Buffer between the walkway and the frontage
    FarBuffer,
    /// Frontage zone
    Far,
    /// Region left for buildings
    ValidHouse,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 6] = [
        ZoneKind::NearRoadBuffer,
        ZoneKind::NearRoad,
        ZoneKind::Main,
        ZoneKind::FarBuffer,
        ZoneKind::Far,
        ZoneKind::ValidHouse,
    ];

    /// Position from the road edge outward
    pub fn order(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ZoneKind::NearRoadBuffer => "near_road_buffer",
            ZoneKind::NearRoad => "near_road",
            ZoneKind::Main => "main",
            ZoneKind::FarBuffer => "far_buffer",
            ZoneKind::Far => "far",
            ZoneKind::ValidHouse => "valid_house",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named streetscape preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SidewalkProfile {
    NarrowSidewalk,
    NarrowSidewalkWithTrees,
    RibbonSidewalk,
    Neighborhood1,
    Neighborhood2,
    MediumCommercial,
    WideCommercial,
}

impl SidewalkProfile {
    pub const ALL: [SidewalkProfile; 7] = [
        SidewalkProfile::NarrowSidewalk,
        SidewalkProfile::NarrowSidewalkWithTrees,
        SidewalkProfile::RibbonSidewalk,
        SidewalkProfile::Neighborhood1,
        SidewalkProfile::Neighborhood2,
        SidewalkProfile::MediumCommercial,
        SidewalkProfile::WideCommercial,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SidewalkProfile::NarrowSidewalk => "Narrow Sidewalk",
            SidewalkProfile::NarrowSidewalkWithTrees => "Narrow Sidewalk with Trees",
            SidewalkProfile::RibbonSidewalk => "Ribbon Sidewalk",
            SidewalkProfile::Neighborhood1 => "Neighborhood 1",
            SidewalkProfile::Neighborhood2 => "Neighborhood 2",
            SidewalkProfile::MediumCommercial => "Medium Commercial",
            SidewalkProfile::WideCommercial => "Wide Commercial",
        }
    }

    /// Zones this profile populates, nearest first
    pub fn zones(self) -> &'static [ZoneKind] {
        use ZoneKind::*;
        match self {
            SidewalkProfile::NarrowSidewalk => &[NearRoadBuffer, Main, ValidHouse],
            SidewalkProfile::NarrowSidewalkWithTrees => &[NearRoad, Main, ValidHouse],
            SidewalkProfile::RibbonSidewalk => &[NearRoad, Main, Far, ValidHouse],
            SidewalkProfile::Neighborhood1 => &[NearRoadBuffer, NearRoad, Main, ValidHouse],
            SidewalkProfile::Neighborhood2 => &[NearRoad, Main, Far, ValidHouse],
            SidewalkProfile::MediumCommercial => &[NearRoad, Main, Far, ValidHouse],
            SidewalkProfile::WideCommercial => &[NearRoad, Main, FarBuffer, Far, ValidHouse],
        }
    }

    pub fn populates(self, kind: ZoneKind) -> bool {
        self.zones().contains(&kind)
    }

    /// Built-in width range of `kind`, `None` when the profile leaves it out
    pub fn default_range(self, kind: ZoneKind) -> Option<Interval> {
        if !self.populates(kind) {
            return None;
        }
        if kind == ZoneKind::ValidHouse {
            return Some(Interval::fixed(HOUSE_WIDTH));
        }
        let range = match (self, kind) {
            (SidewalkProfile::NarrowSidewalk, ZoneKind::NearRoadBuffer) => Interval::new(1.0, 1.5),
            (SidewalkProfile::NarrowSidewalk, _) => Interval::new(1.5, 2.0),

            (SidewalkProfile::NarrowSidewalkWithTrees, ZoneKind::NearRoad) => Interval::new(1.0, 1.5),
            (SidewalkProfile::NarrowSidewalkWithTrees, _) => Interval::new(1.5, 2.0),

            (SidewalkProfile::RibbonSidewalk, ZoneKind::NearRoad) => Interval::new(1.5, 2.0),
            (SidewalkProfile::RibbonSidewalk, ZoneKind::Main) => Interval::new(1.5, 2.0),
            (SidewalkProfile::RibbonSidewalk, _) => Interval::new(1.0, 1.5),

            (SidewalkProfile::Neighborhood1, ZoneKind::NearRoadBuffer) => Interval::new(0.5, 1.0),
            (SidewalkProfile::Neighborhood1, ZoneKind::NearRoad) => Interval::new(1.0, 1.5),
            (SidewalkProfile::Neighborhood1, _) => Interval::new(1.5, 2.0),

            (SidewalkProfile::Neighborhood2, ZoneKind::Far) => Interval::new(1.0, 1.5),
            (SidewalkProfile::Neighborhood2, _) => Interval::new(1.5, 2.0),

            (SidewalkProfile::MediumCommercial, ZoneKind::NearRoad) => Interval::new(1.5, 2.5),
            (SidewalkProfile::MediumCommercial, ZoneKind::Main) => Interval::new(2.0, 3.0),
            (SidewalkProfile::MediumCommercial, _) => Interval::new(1.0, 2.0),

            (SidewalkProfile::WideCommercial, ZoneKind::NearRoad) => Interval::new(2.0, 3.0),
            (SidewalkProfile::WideCommercial, ZoneKind::Main) => Interval::new(2.5, 3.5),
            (SidewalkProfile::WideCommercial, ZoneKind::FarBuffer) => Interval::new(1.0, 1.5),
            (SidewalkProfile::WideCommercial, _) => Interval::new(1.5, 2.5),
        };
        Some(range)
    }
}

impl fmt::Display for SidewalkProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SidewalkProfile {
    type Err = RoadGenError;

    fn from_str(s: &str) -> Result<Self> {
        SidewalkProfile::ALL
            .into_iter()
            .find(|profile| profile.name() == s)
            .ok_or_else(|| RoadGenError::UnknownProfile(s.to_string()))
    }
}

impl TryFrom<String> for SidewalkProfile {
    type Error = RoadGenError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SidewalkProfile> for String {
    fn from(profile: SidewalkProfile) -> Self {
        profile.name().to_string()
    }
}

/// Width ranges that replace the active profile's built-in ones
///
/// An override only applies to zones the profile populates; it never turns
/// on a zone the profile leaves out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneOverrides {
    pub near_road_buffer: Option<Interval>,
    pub near_road: Option<Interval>,
    pub main: Option<Interval>,
    pub far_buffer: Option<Interval>,
    pub far: Option<Interval>,
    pub valid_house: Option<Interval>,
}

impl ZoneOverrides {
    /// Same range for every zone
    pub fn uniform(range: Interval) -> Self {
        Self {
            near_road_buffer: Some(range),
            near_road: Some(range),
            main: Some(range),
            far_buffer: Some(range),
            far: Some(range),
            valid_house: Some(range),
        }
    }

    pub fn get(&self, kind: ZoneKind) -> Option<Interval> {
        match kind {
            ZoneKind::NearRoadBuffer => self.near_road_buffer,
            ZoneKind::NearRoad => self.near_road,
            ZoneKind::Main => self.main,
            ZoneKind::FarBuffer => self.far_buffer,
            ZoneKind::Far => self.far,
            ZoneKind::ValidHouse => self.valid_house,
        }
    }

    pub fn with(mut self, kind: ZoneKind, range: Interval) -> Self {
        let slot = match kind {
            ZoneKind::NearRoadBuffer => &mut self.near_road_buffer,
            ZoneKind::NearRoad => &mut self.near_road,
            ZoneKind::Main => &mut self.main,
            ZoneKind::FarBuffer => &mut self.far_buffer,
            ZoneKind::Far => &mut self.far,
            ZoneKind::ValidHouse => &mut self.valid_house,
        };
        *slot = Some(range);
        self
    }

    pub fn validate(&self) -> Result<()> {
        for kind in ZoneKind::ALL {
            if let Some(range) = self.get(kind) {
                if !range.is_ordered() || range.low < 0.0 {
                    return Err(RoadGenError::InvalidConfig(format!(
                        "zone_overrides.{} [{}, {}] must be non-negative and ordered",
                        kind, range.low, range.high
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Diagnostic policy derived from [`DiagnosticFlags`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticMode {
    Off,
    /// Every zone fixed at the terrain test width
    Terrain,
    /// Every zone fixed at the slope test width, with extra clearance and
    /// stashed slope rings
    Slope,
}

impl DiagnosticMode {
    /// Terrain takes precedence over slope and rough
    pub fn from_flags(flags: &DiagnosticFlags) -> Self {
        if flags.test_terrain_system {
            DiagnosticMode::Terrain
        } else if flags.test_slope_system || flags.test_rough_system {
            DiagnosticMode::Slope
        } else {
            DiagnosticMode::Off
        }
    }

    pub fn is_active(self) -> bool {
        self != DiagnosticMode::Off
    }

    pub fn forced_width(self) -> Option<f32> {
        match self {
            DiagnosticMode::Off => None,
            DiagnosticMode::Terrain => Some(TERRAIN_TEST_WIDTH),
            DiagnosticMode::Slope => Some(SLOPE_TEST_WIDTH),
        }
    }

    /// Added to every nearer zone when accumulating lateral offsets
    pub fn clearance(self) -> f32 {
        match self {
            DiagnosticMode::Slope => SLOPE_CLEARANCE,
            _ => 0.0,
        }
    }

    pub fn stashes_slope_polygons(self) -> bool {
        self == DiagnosticMode::Slope
    }
}

/// Resolved width of every zone for one block, `None` for absent zones
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ZoneWidths([Option<f32>; 6]);

impl ZoneWidths {
    /// Draw widths for `profile`
    ///
    /// Diagnostic modes skip sampling and populate all six zones with the
    /// forced width.
    pub fn resolve<R: Rng + ?Sized>(
        profile: SidewalkProfile,
        overrides: &ZoneOverrides,
        mode: DiagnosticMode,
        rng: &mut R,
    ) -> Self {
        if let Some(width) = mode.forced_width() {
            return Self([Some(width); 6]);
        }

        let mut widths = [None; 6];
        for kind in ZoneKind::ALL {
            let range = profile
                .default_range(kind)
                .map(|default| overrides.get(kind).unwrap_or(default));
            widths[kind.order()] = range.map(|range| range.sample(rng));
        }
        Self(widths)
    }

    /// Explicit widths, mostly for tests
    pub fn from_fn(mut width: impl FnMut(ZoneKind) -> Option<f32>) -> Self {
        let mut widths = [None; 6];
        for kind in ZoneKind::ALL {
            widths[kind.order()] = width(kind);
        }
        Self(widths)
    }

    pub fn get(&self, kind: ZoneKind) -> Option<f32> {
        self.0[kind.order()]
    }

    pub fn populated(&self) -> impl Iterator<Item = (ZoneKind, f32)> + '_ {
        ZoneKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|width| (kind, width)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_profile_table() {
        use ZoneKind::*;
        let table: [(SidewalkProfile, [bool; 6]); 7] = [
            (SidewalkProfile::NarrowSidewalk, [true, false, true, false, false, true]),
            (SidewalkProfile::NarrowSidewalkWithTrees, [false, true, true, false, false, true]),
            (SidewalkProfile::RibbonSidewalk, [false, true, true, false, true, true]),
            (SidewalkProfile::Neighborhood1, [true, true, true, false, false, true]),
            (SidewalkProfile::Neighborhood2, [false, true, true, false, true, true]),
            (SidewalkProfile::MediumCommercial, [false, true, true, false, true, true]),
            (SidewalkProfile::WideCommercial, [false, true, true, true, true, true]),
        ];
        for (profile, expected) in table {
            let kinds = [NearRoadBuffer, NearRoad, Main, FarBuffer, Far, ValidHouse];
            for (kind, present) in kinds.into_iter().zip(expected) {
                assert_eq!(profile.populates(kind), present, "{} {}", profile, kind);
                assert_eq!(profile.default_range(kind).is_some(), present);
            }
        }
    }

    #[test]
    fn test_profile_names_round_trip() {
        for profile in SidewalkProfile::ALL {
            assert_eq!(profile.name().parse::<SidewalkProfile>().unwrap(), profile);
        }
        assert!(matches!(
            "Suburban".parse::<SidewalkProfile>(),
            Err(RoadGenError::UnknownProfile(_))
        ));
    }

    #[test]
    fn test_resolve_leaves_absent_zones_null() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let widths = ZoneWidths::resolve(
            SidewalkProfile::NarrowSidewalk,
            &ZoneOverrides::default(),
            DiagnosticMode::Off,
            &mut rng,
        );
        assert!(widths.get(ZoneKind::NearRoad).is_none());
        assert!(widths.get(ZoneKind::Far).is_none());
        let main = widths.get(ZoneKind::Main).unwrap();
        assert!((1.5..=2.0).contains(&main));
        assert_eq!(widths.get(ZoneKind::ValidHouse), Some(HOUSE_WIDTH));
    }

    #[test]
    fn test_overrides_do_not_enable_absent_zones() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let overrides = ZoneOverrides::uniform(Interval::fixed(2.0));
        let widths = ZoneWidths::resolve(
            SidewalkProfile::WideCommercial,
            &overrides,
            DiagnosticMode::Off,
            &mut rng,
        );
        assert_eq!(widths.get(ZoneKind::NearRoadBuffer), None);
        assert_eq!(widths.populated().count(), 5);
        assert!(widths.populated().all(|(_, w)| w == 2.0));
    }

    #[test]
    fn test_diagnostic_modes_force_every_zone() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let flags = DiagnosticFlags {
            test_terrain_system: true,
            test_slope_system: true,
            test_rough_system: false,
        };
        let mode = DiagnosticMode::from_flags(&flags);
        assert_eq!(mode, DiagnosticMode::Terrain);

        let widths = ZoneWidths::resolve(
            SidewalkProfile::NarrowSidewalk,
            &ZoneOverrides::default(),
            mode,
            &mut rng,
        );
        assert!(widths.populated().all(|(_, w)| w == TERRAIN_TEST_WIDTH));
        assert_eq!(widths.populated().count(), 6);

        let rough = DiagnosticFlags {
            test_rough_system: true,
            ..Default::default()
        };
        assert_eq!(DiagnosticMode::from_flags(&rough), DiagnosticMode::Slope);
        assert_eq!(DiagnosticMode::Slope.clearance(), SLOPE_CLEARANCE);
    }

    #[test]
    fn test_override_validation() {
        let bad = ZoneOverrides::default().with(ZoneKind::Far, Interval::new(3.0, 1.0));
        assert!(bad.validate().is_err());
        let good = ZoneOverrides::default().with(ZoneKind::Far, Interval::new(1.0, 3.0));
        assert!(good.validate().is_ok());
    }
}
