use super::{Compressibility, UniaxialKinematics};
use crate::mechanics::HyperelasticModel;
use crate::symbolic::Lambdified;
use crate::StrError;
use serde::{Deserialize, Serialize};

/// Defines an inequality constraint `c(params) ≥ 0` (component-wise)
pub trait Constraint {
    /// Evaluates the constraint components
    fn evaluate(&self, params: &[f64]) -> Result<Vec<f64>, StrError>;
}

/// Defines the sign required by a [SignConstraint]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Sign {
    /// The parameter must be strictly positive (up to a tiny margin)
    Positive,

    /// The parameter must be greater than or equal to zero
    NonNegative,

    /// The parameter must be less than or equal to zero
    NonPositive,
}

/// Margin used to enforce a strictly positive parameter
pub const POSITIVE_MARGIN: f64 = 1e-12;

/// Constrains the sign of one parameter
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct SignConstraint {
    /// Position of the parameter in the calibrated vector
    pub index: usize,

    /// Required sign
    pub sign: Sign,
}

impl Constraint for SignConstraint {
    fn evaluate(&self, params: &[f64]) -> Result<Vec<f64>, StrError> {
        let value = *params.get(self.index).ok_or("sign constraint index is out of range")?;
        let c = match self.sign {
            Sign::Positive => value - POSITIVE_MARGIN,
            Sign::NonNegative => value,
            Sign::NonPositive => -value,
        };
        Ok(vec![c])
    }
}

/// Requires a non-negative strain-energy at every strain sample of a uniaxial test
pub struct EnergyConstraint {
    kinematics: UniaxialKinematics,
    energy: Lambdified,
    strain: Vec<f64>,
}

impl EnergyConstraint {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `model` -- the hyperelastic model
    /// * `strain` -- the strain samples (e.g., the experimental strains)
    /// * `poisson` -- the Poisson's coefficient; None means the default of the formulation
    /// * `compressibility` -- the rule for the compressibility parameter
    pub fn new(
        model: &HyperelasticModel,
        strain: &[f64],
        poisson: Option<f64>,
        compressibility: Compressibility,
    ) -> Result<Self, StrError> {
        Ok(EnergyConstraint {
            kinematics: UniaxialKinematics::new(model, poisson, compressibility)?,
            energy: model.lambdify_energy()?,
            strain: strain.to_vec(),
        })
    }
}

impl Constraint for EnergyConstraint {
    fn evaluate(&self, params: &[f64]) -> Result<Vec<f64>, StrError> {
        self.kinematics.evaluate(&self.energy, params, &self.strain)
    }
}

/// Wraps a closure as a constraint
pub struct FnConstraint<F>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    function: F,
}

impl<F> FnConstraint<F>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    /// Allocates a new instance
    pub fn new(function: F) -> Self {
        FnConstraint { function }
    }
}

impl<F> Constraint for FnConstraint<F>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    fn evaluate(&self, params: &[f64]) -> Result<Vec<f64>, StrError> {
        Ok((self.function)(params))
    }
}

/// Evaluates all constraints and concatenates their components
pub fn evaluate_all(constraints: &[&dyn Constraint], params: &[f64]) -> Result<Vec<f64>, StrError> {
    let mut all = Vec::new();
    for constraint in constraints {
        all.extend(constraint.evaluate(params)?);
    }
    Ok(all)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{evaluate_all, Constraint, EnergyConstraint, FnConstraint, Sign, SignConstraint};
    use crate::calibration::Compressibility;
    use crate::mechanics::{Formulation, HyperelasticModel};
    use russell_lab::approx_eq;

    #[test]
    fn sign_constraint_works() {
        let params = [-2.0, 0.0, 3.0];
        let c = SignConstraint { index: 0, sign: Sign::NonPositive };
        assert_eq!(c.evaluate(&params).unwrap(), &[2.0]);
        let c = SignConstraint { index: 1, sign: Sign::NonNegative };
        assert_eq!(c.evaluate(&params).unwrap(), &[0.0]);
        let c = SignConstraint { index: 1, sign: Sign::Positive };
        assert!(c.evaluate(&params).unwrap()[0] < 0.0);
        let c = SignConstraint { index: 3, sign: Sign::Positive };
        assert_eq!(c.evaluate(&params).err(), Some("sign constraint index is out of range"));
    }

    #[test]
    fn energy_constraint_works() {
        let model = HyperelasticModel::new("C10*(I1b - 3)", &["C10"], Formulation::Incompressible).unwrap();
        let strain = [0.0, 0.1, 0.2];
        let c = EnergyConstraint::new(&model, &strain, None, Compressibility::Calibrated).unwrap();
        let values = c.evaluate(&[1.0]).unwrap();
        assert_eq!(values.len(), 3);
        approx_eq(values[0], 0.0, 1e-15);
        assert!(values[1] > 0.0 && values[2] > values[1]);
        let values = c.evaluate(&[-1.0]).unwrap();
        assert!(values[1] < 0.0);
    }

    #[test]
    fn evaluate_all_works() {
        let a = SignConstraint { index: 0, sign: Sign::NonNegative };
        let b = FnConstraint::new(|p: &[f64]| vec![1.0 - p[0], 1.0 - p[1]]);
        let all = evaluate_all(&[&a, &b], &[0.5, 2.0]).unwrap();
        assert_eq!(all, &[0.5, 0.5, -1.0]);
    }
}
