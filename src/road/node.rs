//! Road references and node naming
//!
//! A road is addressed by its two endpoint nodes. The reverse-direction road
//! on the same alignment is obtained algebraically by negating both nodes and
//! swapping them, so `-Road(a, b) == Road(-b, -a)`.

use std::fmt;
use std::ops::Neg;

use serde::{Deserialize, Serialize};

/// Prefix marking a node that belongs to a reverse-direction road
pub const NEGATIVE_DIR: char = '-';

/// Toggle the negative prefix of a node name
pub fn negate_node(node: &str) -> String {
    match node.strip_prefix(NEGATIVE_DIR) {
        Some(positive) => positive.to_string(),
        None => format!("{}{}", NEGATIVE_DIR, node),
    }
}

/// A directed road between two named nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Road {
    pub start_node: String,
    pub end_node: String,
}

impl Road {
    pub fn new(start_node: impl Into<String>, end_node: impl Into<String>) -> Self {
        Self {
            start_node: start_node.into(),
            end_node: end_node.into(),
        }
    }

    /// True for roads running against the canonical direction
    pub fn is_negative_road(&self) -> bool {
        self.start_node.starts_with(NEGATIVE_DIR)
    }

    /// True when neither endpoint carries the negative prefix
    pub fn is_canonical(&self) -> bool {
        !self.start_node.starts_with(NEGATIVE_DIR) && !self.end_node.starts_with(NEGATIVE_DIR)
    }

    pub fn has_node(&self, node: &str) -> bool {
        self.start_node == node || self.end_node == node
    }
}

impl Neg for &Road {
    type Output = Road;

    fn neg(self) -> Road {
        Road {
            start_node: negate_node(&self.end_node),
            end_node: negate_node(&self.start_node),
        }
    }
}

impl Neg for Road {
    type Output = Road;

    fn neg(self) -> Road {
        -&self
    }
}

impl fmt::Display for Road {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.start_node, self.end_node)
    }
}
