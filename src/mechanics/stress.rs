use super::KinematicSymbols;
use crate::symbolic::Expr;

/// Computes the first Piola-Kirchhoff stress along the loading direction (general form)
///
/// Applies the chain rule over the invariants:
///
/// ```text
/// P22 = ∂W/∂I1b · ∂I1b/∂λ22 + ∂W/∂I2b · ∂I2b/∂λ22 + ∂W/∂J · ∂J/∂λ22
/// ```
///
/// The derivatives of W are computed with the placeholders as independent
/// symbols; afterwards, the placeholders are replaced by their definitions.
pub fn first_piola_stress(w: &Expr, sym: &KinematicSymbols) -> Expr {
    let inv = sym.invariants();
    let terms = vec![
        w.diff(&sym.i1b) * inv.i1b.diff(&sym.l22),
        w.diff(&sym.i2b) * inv.i2b.diff(&sym.l22),
        w.diff(&sym.jac) * inv.jac.diff(&sym.l22),
    ];
    Expr::add(terms).subs(&sym.substitution_map(true))
}

/// Computes the first Piola-Kirchhoff stress along the loading direction (incompressible form)
///
/// The hydrostatic pressure follows from the traction-free condition along
/// the third direction:
///
/// ```text
/// p   = ∂W/∂I1b · ∂I1b/∂λ33 + ∂W/∂I2b · ∂I2b/∂λ33
/// P22 = ∂W/∂I1b · ∂I1b/∂λ22 + ∂W/∂I2b · ∂I2b/∂λ22 - p
/// ```
///
/// Only the I1b and I2b placeholders are substituted; the volumetric term is not part
/// of this formulation.
pub fn first_piola_stress_incompressible(w: &Expr, sym: &KinematicSymbols) -> Expr {
    let inv = sym.invariants();
    let dw_di1b = w.diff(&sym.i1b);
    let dw_di2b = w.diff(&sym.i2b);
    let pressure = Expr::add(vec![
        dw_di1b.clone() * inv.i1b.diff(&sym.l33),
        dw_di2b.clone() * inv.i2b.diff(&sym.l33),
    ]);
    let terms = vec![
        dw_di1b * inv.i1b.diff(&sym.l22),
        dw_di2b * inv.i2b.diff(&sym.l22),
        -pressure,
    ];
    Expr::add(terms).subs(&sym.substitution_map(false))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
