//! Simulation core of a falling-block puzzle game.
//!
//! [`core`] holds the passive data: coordinates, the field of locked cells, and
//! piece shapes with their rotation rules. [`engine`] drives them in time.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A piece placement overlapped a locked cell or left the field.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when placing falling piece")]
pub struct PieceCollisionError;
