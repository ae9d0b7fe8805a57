use thiserror::Error;

use crate::road::Road;

#[derive(Error, Debug)]
pub enum RoadGenError {
    #[error("Socket of block {block}: index {index} out of range {len}")]
    SocketIndexOutOfRange {
        block: String,
        index: usize,
        len: usize,
    },

    #[error("Socket index {index} does not belong to block {block}")]
    ForeignSocketIndex { block: String, index: String },

    #[error("Socket {0} not found")]
    UnknownSocket(String),

    #[error("Block {block} already has a socket with index {index}")]
    DuplicateSocketIndex { block: String, index: String },

    #[error("Socket can only be created from a positive road, got {0}")]
    NegativeRoadSocket(Road),

    #[error("Socket on {0} has no negative road to reverse")]
    SingleDirectionSocket(Road),

    #[error("Only the entry block may use block index 0 (got shape {0})")]
    ReservedBlockIndex(&'static str),

    #[error("Block {block} declares {expected} sockets but produced {actual}")]
    SocketCountMismatch {
        block: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown sidewalk profile: {0}")]
    UnknownProfile(String),

    #[error("Unsupported line type: {0}")]
    UnsupportedLineType(String),

    #[error("Block {block} laid {actual} crosswalk slots, its shape declares {expected}")]
    CrosswalkSlotMismatch {
        block: String,
        expected: usize,
        actual: usize,
    },

    #[error("No lanes found for road {0}")]
    LanesNotFound(Road),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not place block {shape} after {attempts} attempts")]
    PlacementExhausted { shape: &'static str, attempts: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RoadGenError>;
