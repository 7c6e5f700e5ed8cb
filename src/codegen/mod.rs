//! Generates Fortran source code for explicit finite element solvers (VUMAT)

mod fortran;
mod vumat;
pub use crate::codegen::fortran::*;
pub use crate::codegen::vumat::*;
