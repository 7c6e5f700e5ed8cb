//! Implements a small computer algebra system for strain-energy functions
//!
//! Expressions are kept in a canonical form by the smart constructors in [Expr]
//! (flattened sums and products, folded numbers, combined like terms), so that
//! derivatives and substitutions remain readable when printed as source code.

mod derivative;
mod expr;
mod lambdify;
mod number;
mod parser;
mod printer;
pub use crate::symbolic::expr::*;
pub use crate::symbolic::lambdify::*;
pub use crate::symbolic::number::*;
pub use crate::symbolic::parser::*;
pub use crate::symbolic::printer::*;
