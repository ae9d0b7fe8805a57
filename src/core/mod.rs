pub mod config;
pub mod error;
pub mod types;

pub use config::{DiagnosticFlags, GenerationConfig, TopologyConfig};
pub use error::{Result, RoadGenError};
pub use types::{Interval, Point2};
