/// A single LSTM gating unit transforming one time step of a sequence
pub mod cell;
/// Error types for stack construction and forward passes
pub mod error;
/// Gate parameters and the projection and activation helpers shared by all gates
pub mod gate;
/// Borrowed views of cell and stack parameters
pub mod layer_weight;
/// A multi-layer LSTM sequence encoder with unidirectional and bidirectional modes
pub mod stack;
/// Input validation functions for construction and forward passes
mod validation;

pub use cell::LstmCell;
pub use error::ModelError;
pub use gate::Gate;
pub use layer_weight::{CellWeight, GateWeight, StackLayerWeight};
pub use stack::{Direction, LstmStack};
