//! Streetscape: profile-driven zone polygons, crosswalks and lane lines

pub mod cross_section;
pub mod lines;
pub mod profile;

pub use cross_section::{Streetscape, StreetscapeRecords, ZoneOutcome, ZoneRecord, ZoneType};
pub use lines::{broken_stations, continuous_stations, emit_lane_lines, LineSegment};
pub use profile::{DiagnosticMode, SidewalkProfile, ZoneKind, ZoneOverrides, ZoneWidths};
