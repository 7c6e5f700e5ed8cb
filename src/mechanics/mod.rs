//! Implements the kinematics and stress derivation of hyperelastic models
//!
//! The strain-energy function is written in terms of the modified invariants
//! `I1b`, `I2b` and the volume ratio `J`. The principal stretches `lambda_11`,
//! `lambda_22` and `lambda_33` are the independent variables, and the loading
//! direction is the second one.

mod energy;
mod invariants;
mod model;
mod stress;
pub use energy::*;
pub use invariants::*;
pub use model::*;
pub use stress::*;
