//! Sequential network generation
//!
//! Owns the run's single random generator and the global road network.
//! Each placement attaches to a random socket of the most recent block,
//! retries the topology sample a bounded number of times, and falls back
//! to a straight block once before giving up.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::block::first::FirstBlock;
use crate::block::{Block, BlockGeometry, BlockShape, Socket};
use crate::core::config::GenerationConfig;
use crate::core::error::{Result, RoadGenError};
use crate::road::RoadNetwork;

/// Serialised form handed to the rendering collaborator
#[derive(Debug, Clone, Serialize)]
pub struct NetworkExport {
    pub seed: u64,
    pub blocks: Vec<BlockGeometry>,
}

pub struct NetworkGenerator {
    config: GenerationConfig,
    rng: ChaCha8Rng,
    blocks: Vec<Block>,
    network: RoadNetwork,
}

impl NetworkGenerator {
    /// Validate `config`, seed the generator and place the entry block
    pub fn new(config: GenerationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut network = RoadNetwork::new();

        let mut first = Block::new(
            0,
            BlockShape::First,
            FirstBlock::entry_socket()?,
            &network,
            &config,
            &mut rng,
        )?;
        if !first.sample_topology(&network, &mut rng)? {
            return Err(RoadGenError::PlacementExhausted {
                shape: BlockShape::First.id(),
                attempts: 1,
            });
        }
        network.merge(first.block_network());

        Ok(Self {
            config,
            rng,
            blocks: vec![first],
            network,
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Attach a block of `shape` to the most recent block
    pub fn place(&mut self, shape: BlockShape) -> Result<&Block> {
        let socket = self.pick_socket()?;

        let mut placed = self.try_place(shape, &socket)?;
        if placed.is_none() && shape != BlockShape::Straight {
            info!(
                "Falling back to a straight block after {} failed samples of {}",
                self.config.max_sample_trials,
                shape.id()
            );
            placed = self.try_place(BlockShape::Straight, &socket)?;
        }

        let block = placed.ok_or(RoadGenError::PlacementExhausted {
            shape: shape.id(),
            attempts: self.config.max_sample_trials,
        })?;
        self.network.merge(block.block_network());
        let index = self.blocks.len();
        self.blocks.push(block);
        Ok(&self.blocks[index])
    }

    /// Place every shape of `shapes` in order
    pub fn generate(&mut self, shapes: &[BlockShape]) -> Result<()> {
        for &shape in shapes {
            self.place(shape)?;
        }
        Ok(())
    }

    fn pick_socket(&mut self) -> Result<Socket> {
        let last = self
            .blocks
            .last()
            .ok_or(RoadGenError::UnknownSocket("no placed block".into()))?;
        let position = self.rng.gen_range(0..last.sockets().len().max(1));
        last.get_socket(position).cloned()
    }

    fn try_place(&mut self, shape: BlockShape, socket: &Socket) -> Result<Option<Block>> {
        let mut block = Block::new(
            self.blocks.len(),
            shape,
            socket.clone(),
            &self.network,
            &self.config,
            &mut self.rng,
        )?;
        for _ in 0..self.config.max_sample_trials {
            if block.sample_topology(&self.network, &mut self.rng)? {
                debug!(
                    "Placed {} after {} samples",
                    block.name(),
                    block.number_of_sample_trial()
                );
                return Ok(Some(block));
            }
        }
        Ok(None)
    }

    /// Lines, zones and crosswalks of every placed block
    pub fn construct_all(&self) -> Result<Vec<BlockGeometry>> {
        self.blocks.iter().map(Block::construct).collect()
    }

    pub fn export_json(&self) -> Result<String> {
        let export = NetworkExport {
            seed: self.config.seed,
            blocks: self.construct_all()?,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}
