use super::KinematicSymbols;
use crate::symbolic::Expr;

/// Substitutes the invariant placeholders of the strain-energy function by their stretch definitions
///
/// The result depends on the stretches and the material parameters only,
/// hence calling this function again on the result returns the same expression.
pub fn energy_substituted(w: &Expr, sym: &KinematicSymbols) -> Expr {
    w.subs(&sym.substitution_map(true))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
