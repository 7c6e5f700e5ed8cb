use hypercal::calibration::{estimate_tangent_modulus, Prediction, UpperBoundPolicy};
use hypercal::StrError;
use russell_lab::approx_eq;

struct LinearElastic {
    young: f64,
}

impl Prediction for LinearElastic {
    fn n_params(&self) -> usize {
        1
    }
    fn predict(&self, params: &[f64], strain: &[f64]) -> Result<Vec<f64>, StrError> {
        Ok(strain.iter().map(|eps| params[0] * self.young * eps).collect())
    }
}

#[test]
fn test_tangent_modulus_of_linear_relation() -> Result<(), StrError> {
    let prediction = LinearElastic { young: 210.0 };
    let strain = [0.0, 0.002, 0.004, 0.01, 0.05, 0.2];
    for policy in [UpperBoundPolicy::DividedByTen, UpperBoundPolicy::Full] {
        let res = estimate_tangent_modulus(&strain, &prediction, &[1.0], policy)?;
        approx_eq(res.modulus, 210.0, 1e-9);
        for value in &res.tangent {
            approx_eq(*value, 210.0, 1e-7);
        }
    }
    Ok(())
}
