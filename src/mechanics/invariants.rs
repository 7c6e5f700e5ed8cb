use crate::symbolic::Expr;
use std::collections::HashMap;

/// Holds the names of the symbols used by the kinematics
///
/// The invariant placeholders appear in the strain-energy function and are
/// replaced by their definitions in terms of the principal stretches.
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicSymbols {
    /// First modified invariant
    pub i1b: String,

    /// Second modified invariant
    pub i2b: String,

    /// Volume ratio (Jacobian)
    pub jac: String,

    /// Principal stretch along the first direction
    pub l11: String,

    /// Principal stretch along the second (loading) direction
    pub l22: String,

    /// Principal stretch along the third direction
    pub l33: String,
}

impl KinematicSymbols {
    /// Allocates a new instance with the default names
    pub fn new() -> Self {
        KinematicSymbols {
            i1b: "I1b".to_string(),
            i2b: "I2b".to_string(),
            jac: "J".to_string(),
            l11: "lambda_11".to_string(),
            l22: "lambda_22".to_string(),
            l33: "lambda_33".to_string(),
        }
    }

    /// Returns the names of the invariant placeholders (I1b, I2b, J)
    pub fn placeholders(&self) -> [&str; 3] {
        [&self.i1b, &self.i2b, &self.jac]
    }

    /// Returns the names of the stretches (lambda_11, lambda_22, lambda_33)
    pub fn stretches(&self) -> [&str; 3] {
        [&self.l11, &self.l22, &self.l33]
    }

    /// Returns the invariants in terms of the stretch symbols
    pub fn invariants(&self) -> Invariants {
        invariants(
            &Expr::symbol(&self.l11),
            &Expr::symbol(&self.l22),
            &Expr::symbol(&self.l33),
        )
    }

    /// Returns the substitution map `placeholder → definition`
    ///
    /// If `with_jacobian` is false, the J placeholder is left untouched.
    pub fn substitution_map(&self, with_jacobian: bool) -> HashMap<String, Expr> {
        let inv = self.invariants();
        let mut map = HashMap::new();
        map.insert(self.i1b.clone(), inv.i1b);
        map.insert(self.i2b.clone(), inv.i2b);
        if with_jacobian {
            map.insert(self.jac.clone(), inv.jac);
        }
        map
    }
}

impl Default for KinematicSymbols {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the modified invariants as functions of the principal stretches
#[derive(Clone, Debug, PartialEq)]
pub struct Invariants {
    /// I1b = J^(-2/3)·(λ1² + λ2² + λ3²)
    pub i1b: Expr,

    /// I2b = J^(-4/3)·(λ1²λ2² + λ2²λ3² + λ3²λ1²)
    pub i2b: Expr,

    /// J = λ1·λ2·λ3
    pub jac: Expr,
}

/// Computes the modified invariants of a diagonal deformation gradient
pub fn invariants(l11: &Expr, l22: &Expr, l33: &Expr) -> Invariants {
    let sq = |e: &Expr| Expr::pow(e.clone(), Expr::int(2));
    let jac = Expr::mul(vec![l11.clone(), l22.clone(), l33.clone()]);
    let sum_sq = Expr::add(vec![sq(l11), sq(l22), sq(l33)]);
    let sum_sq_pairs = Expr::add(vec![
        sq(l11) * sq(l22),
        sq(l22) * sq(l33),
        sq(l33) * sq(l11),
    ]);
    let i1b = Expr::pow(jac.clone(), Expr::rational(-2, 3)) * sum_sq;
    let i2b = Expr::pow(jac.clone(), Expr::rational(-4, 3)) * sum_sq_pairs;
    Invariants { i1b, i2b, jac }
}

/// Computes the modified invariants (I1b, I2b, J) numerically
pub fn invariants_numeric(l11: f64, l22: f64, l33: f64) -> (f64, f64, f64) {
    let jac = l11 * l22 * l33;
    let (a, b, c) = (l11 * l11, l22 * l22, l33 * l33);
    let i1b = f64::powf(jac, -2.0 / 3.0) * (a + b + c);
    let i2b = f64::powf(jac, -4.0 / 3.0) * (a * b + b * c + c * a);
    (i1b, i2b, jac)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
