//! Block sockets: the pair of opposite roads two blocks join at

use serde::Serialize;

use crate::core::error::{Result, RoadGenError};
use crate::road::{Lane, Road, RoadNetwork};

/// A positive road and the road running the other way on the same alignment
///
/// The index is assigned once, by the block that owns the socket.
#[derive(Debug, Clone, Serialize)]
pub struct Socket {
    positive_road: Road,
    negative_road: Option<Road>,
    index: Option<String>,
}

impl Socket {
    pub fn new(positive_road: Road, negative_road: Option<Road>) -> Self {
        Self {
            positive_road,
            negative_road,
            index: None,
        }
    }

    /// Socket whose negative road is the algebraic reverse of `road`
    pub fn from_positive_road(road: &Road) -> Result<Self> {
        if !road.is_canonical() {
            return Err(RoadGenError::NegativeRoadSocket(road.clone()));
        }
        Ok(Self::new(road.clone(), Some(-road)))
    }

    /// `"{block_name}-socket{n}"`
    pub fn real_index(block_name: &str, n: usize) -> String {
        format!("{}-socket{}", block_name, n)
    }

    pub fn positive_road(&self) -> &Road {
        &self.positive_road
    }

    pub fn negative_road(&self) -> Option<&Road> {
        self.negative_road.as_ref()
    }

    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Assign the index unless one is already set
    pub(crate) fn assign_index(&mut self, block_name: &str, n: usize) {
        if self.index.is_none() {
            self.index = Some(Self::real_index(block_name, n));
        }
    }

    /// The same socket seen from the other side
    pub fn reverse_view(&self) -> Result<Socket> {
        let negative = self
            .negative_road
            .clone()
            .ok_or_else(|| RoadGenError::SingleDirectionSocket(self.positive_road.clone()))?;
        Ok(Socket {
            positive_road: negative,
            negative_road: Some(self.positive_road.clone()),
            index: self.index.clone(),
        })
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.positive_road.has_node(node)
            || self
                .negative_road
                .as_ref()
                .is_some_and(|road| road.has_node(node))
    }

    pub fn positive_lanes<'a>(&self, network: &'a RoadNetwork) -> Result<&'a [Lane]> {
        network
            .lanes(&self.positive_road)
            .ok_or_else(|| RoadGenError::LanesNotFound(self.positive_road.clone()))
    }

    /// `Ok(None)` for single-direction sockets
    pub fn negative_lanes<'a>(&self, network: &'a RoadNetwork) -> Result<Option<&'a [Lane]>> {
        match &self.negative_road {
            None => Ok(None),
            Some(road) => network
                .lanes(road)
                .map(Some)
                .ok_or_else(|| RoadGenError::LanesNotFound(road.clone())),
        }
    }
}

/// Sockets are equal when both roads match; the index is not compared
impl PartialEq for Socket {
    fn eq(&self, other: &Self) -> bool {
        self.positive_road == other.positive_road && self.negative_road == other.negative_road
    }
}

impl Eq for Socket {}
