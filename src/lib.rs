//! Road Blocks - procedural road networks from socketed blocks
//!
//! Blocks attach to each other through sockets, sample a topology that must
//! not overlap the roads already placed, and emit line segments and
//! streetscape zone polygons for a rendering backend.

pub mod block;
pub mod core;
pub mod road;
pub mod spatial;
pub mod streetscape;

pub use crate::block::{Block, BlockGeometry, BlockShape, NetworkGenerator, Socket};
pub use crate::core::{GenerationConfig, Result, RoadGenError};
