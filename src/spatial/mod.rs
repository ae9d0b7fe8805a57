//! Planar geometry shared by the cross-section engine and topology sampling

pub mod footprint;

pub use footprint::{
    lane_conflicts, lane_footprint, network_conflicts, offset_ring, sample_stations,
    NetworkFootprint,
};
