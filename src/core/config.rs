//! Generation configuration with documented constants
//!
//! Every tunable that block construction and cross-section generation read is
//! collected here and threaded explicitly through the generation call chain.
//! Nothing is read from ambient global state.

use std::path::Path;

use serde::Deserialize;

use crate::core::error::{Result, RoadGenError};
use crate::core::types::Interval;
use crate::road::LineType;
use crate::streetscape::{SidewalkProfile, ZoneOverrides};

/// Fixed dimensions of the drivable area and its streetscape (metres)
pub mod drivable_area {
    /// Length of one painted stripe of a broken line; gaps have the same length
    pub const STRIPE_LENGTH: f32 = 4.0;

    /// Maximum chord length used to approximate a continuous line
    pub const LANE_SEGMENT_LENGTH: f32 = 4.0;

    /// Longitudinal step between stations of a zone polygon
    pub const SIDEWALK_LENGTH: f32 = 3.0;

    /// Last station is clamped to `length - STATION_EPSILON`
    pub const STATION_EPSILON: f32 = 0.1;

    /// Barrier height carried by guardrail lines and the zones they trigger
    pub const GUARDRAIL_HEIGHT: f32 = 4.0;

    /// Extra clearance added to every nearer zone while slope/rough
    /// diagnostics are active
    pub const SLOPE_CLEARANCE: f32 = 6.0;

    /// Lateral step between the fine offset rings of the slope diagnostic
    pub const SLOPE_RING_STEP: f32 = 0.03;

    /// Number of fine offset rings stashed per slope diagnostic zone
    pub const SLOPE_RING_COUNT: usize = 200;

    /// Width of the region left for buildings behind the sidewalk
    pub const HOUSE_WIDTH: f32 = 10.0;

    /// Zone width forced by the terrain diagnostic
    pub const TERRAIN_TEST_WIDTH: f32 = 10.0;

    /// Zone width forced by the slope and rough diagnostics
    pub const SLOPE_TEST_WIDTH: f32 = 5.0;

    /// Longitudinal extent of a crosswalk
    pub const CROSSWALK_WIDTH: f32 = 3.0;

    /// Stations this close to either lane end are ignored by overlap checks,
    /// so a block may touch the socket it attaches to
    pub const OVERLAP_MARGIN: f32 = 2.0;

    /// Longitudinal step between overlap sample points
    pub const OVERLAP_STEP: f32 = 2.0;
}

/// Diagnostic switches for isolated testing of terrain consumers
///
/// When any of these is set, zone widths are forced to a fixed value and
/// every zone kind is generated regardless of the selected profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiagnosticFlags {
    pub test_terrain_system: bool,
    pub test_slope_system: bool,
    pub test_rough_system: bool,
}

/// Parameter ranges for the stochastic topology of each block shape
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Length of a straight block
    pub straight_length: Interval,
    /// Centerline radius of a curve block
    pub curve_radius: Interval,
    /// Turning angle of a curve block, in degrees
    pub curve_angle_deg: Interval,
    /// Length of the entry road laid by the first block
    pub entry_length: f32,
    /// Length of the socket road laid by the first block
    pub socket_length: f32,
    /// Length of every exit road of a junction
    pub exit_length: f32,
    /// Radius added to the road half width to size a junction box
    pub corner_radius: f32,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            straight_length: Interval::new(40.0, 80.0),
            curve_radius: Interval::new(30.0, 60.0),
            curve_angle_deg: Interval::new(45.0, 135.0),
            entry_length: 50.0,
            socket_length: 10.0,
            exit_length: 40.0,
            corner_radius: 10.0,
        }
    }
}

/// Configuration for one generation run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Seed of the single random generator owned by the run
    pub seed: u64,

    /// Width of a lane laid by the first block
    pub lane_width: f32,

    /// Lanes per direction laid by the first block
    ///
    /// Later blocks inherit their lane count from the predecessor socket.
    pub lane_num: usize,

    /// Streetscape profile applied to every block
    pub profile: SidewalkProfile,

    /// Optional `[low, high]` ranges replacing the profile's built-in ones
    pub zone_overrides: ZoneOverrides,

    pub diagnostics: DiagnosticFlags,

    /// Fraction of a shape's crosswalk slots that get a crosswalk
    pub crosswalk_density: f32,

    /// Line type of the outermost edge of a road
    pub side_lane_line_type: LineType,

    /// Line type between the two directions of a road
    pub center_line_type: LineType,

    pub topology: TopologyConfig,

    /// Topology samples tried per block shape before the generator falls back
    pub max_sample_trials: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            lane_width: 3.5,
            lane_num: 2,
            profile: SidewalkProfile::NarrowSidewalk,
            zone_overrides: ZoneOverrides::default(),
            diagnostics: DiagnosticFlags::default(),
            crosswalk_density: 0.5,
            side_lane_line_type: LineType::Side,
            center_line_type: LineType::Continuous,
            topology: TopologyConfig::default(),
            max_sample_trials: 20,
        }
    }
}

impl GenerationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_profile(mut self, profile: SidewalkProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.lane_width <= 0.0 {
            return Err(RoadGenError::InvalidConfig(format!(
                "lane_width ({}) must be positive",
                self.lane_width
            )));
        }
        if self.lane_num == 0 {
            return Err(RoadGenError::InvalidConfig(
                "lane_num must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crosswalk_density) {
            return Err(RoadGenError::InvalidConfig(format!(
                "crosswalk_density ({}) must be within [0, 1]",
                self.crosswalk_density
            )));
        }
        if self.max_sample_trials == 0 {
            return Err(RoadGenError::InvalidConfig(
                "max_sample_trials must be at least 1".into(),
            ));
        }

        self.zone_overrides.validate()?;

        let topology = &self.topology;
        let ranges = [
            ("straight_length", topology.straight_length),
            ("curve_radius", topology.curve_radius),
            ("curve_angle_deg", topology.curve_angle_deg),
        ];
        for (name, range) in ranges {
            if !range.is_ordered() || range.low <= 0.0 {
                return Err(RoadGenError::InvalidConfig(format!(
                    "{} [{}, {}] must be positive and ordered",
                    name, range.low, range.high
                )));
            }
        }
        if topology.curve_angle_deg.high >= 180.0 {
            return Err(RoadGenError::InvalidConfig(
                "curve_angle_deg must stay below 180".into(),
            ));
        }
        let lengths = [
            ("entry_length", topology.entry_length),
            ("socket_length", topology.socket_length),
            ("exit_length", topology.exit_length),
            ("corner_radius", topology.corner_radius),
        ];
        for (name, value) in lengths {
            if value <= 0.0 {
                return Err(RoadGenError::InvalidConfig(format!(
                    "{} ({}) must be positive",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
