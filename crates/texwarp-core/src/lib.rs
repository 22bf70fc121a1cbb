//! TexWarp Core - Domain Model
//!
//! This crate contains the core domain model for TexWarp, including:
//! - Control points and derivation rules
//! - Mesh topologies and buffer construction
//! - The pointer interaction state machine
//!
//! Everything here is pure logic: no windowing, no GPU types.

#![warn(missing_docs)]

pub use glam::Vec2;
use thiserror::Error;

pub mod interaction;
pub mod mesh;
pub mod point;
pub mod topology;

pub use interaction::{InteractionController, SurfaceRect, HIT_RADIUS};
pub use mesh::{MeshBuffers, MeshBuilder};
pub use point::{ControlPoint, Derivation, PointId, PointSet};
pub use topology::{Topology, WireEdge};

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// A point set's derivation graph is inconsistent
    #[error("Invalid point set: {0}")]
    InvalidPointSet(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
