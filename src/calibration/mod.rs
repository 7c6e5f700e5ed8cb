//! Implements the calibration of material parameters against uniaxial test data

mod calibrate;
mod constraints;
mod dataset;
mod objective;
mod prediction;
mod sqp;
mod tangent;
pub use calibrate::*;
pub use constraints::*;
pub use dataset::*;
pub use objective::*;
pub use prediction::*;
pub use sqp::*;
pub use tangent::*;
