//! Makes available common structures needed to run a calibration
//!
//! You may write `use hypercal::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::calibration::{
    calibrate, estimate_tangent_modulus, CalibrationResult, CalibrationStatus, Compressibility, Constraint, Dataset,
    EnergyConstraint, Prediction, Sign, SignConstraint, SqpParams, UniaxialTension, UpperBoundPolicy,
};
pub use crate::codegen::{fortran_d0_lines, generate_vumat, MarkerPolicy, VumatOptions};
pub use crate::job::{run_job, DataSource, JobConfig};
pub use crate::mechanics::{Formulation, HyperelasticModel, KinematicSymbols};
pub use crate::output::{write_table, PlotStyle};
pub use crate::symbolic::{parse, Expr, Lambdified};
pub use crate::StrError;
