//! Hypercal calibrates hyperelastic strain-energy models against uniaxial test data
//! and generates VUMAT material subroutines for explicit finite element solvers
//!
//! The pipeline is:
//!
//! 1. Parse a strain-energy function W(I1b, I2b, J; params) ([symbolic], [mechanics])
//! 2. Derive the first Piola-Kirchhoff stress via the chain rule over the invariants
//! 3. Lower the symbolic stress and energy to numeric functions ([symbolic::Lambdified])
//! 4. Fit the parameters with a constrained SQP least-squares solver ([calibration])
//! 5. Estimate the initial tangent modulus of the calibrated response
//! 6. Write tables and figures ([output])
//! 7. Generate the Fortran subroutine from a template ([codegen])
//!
//! The whole pipeline is driven by a JSON job description ([job::JobConfig]).

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod calibration;
pub mod codegen;
pub mod job;
pub mod mechanics;
pub mod output;
pub mod prelude;
pub mod symbolic;
