use super::{CalibrationStatus, Constraint, History, ObjectiveSsd, Prediction, SqpParams, SqpSolver};
use crate::StrError;

/// Holds the results of a calibration
#[derive(Clone, Debug)]
pub struct CalibrationResult {
    /// Calibrated parameters
    pub params: Vec<f64>,

    /// Final status of the optimizer
    pub status: CalibrationStatus,

    /// Objective (mean squared error) at the calibrated parameters
    pub objective: f64,

    /// Number of iterations
    pub n_iterations: usize,

    /// Optimization history (if requested)
    pub history: Option<History>,
}

/// Calibrates the parameters of a prediction against test data
///
/// Minimizes the mean of the squared differences between the predicted and
/// measured stresses subject to the constraints. The returned status must be
/// inspected by the caller: the parameters of a non-converged run are the last
/// iterate of the optimizer.
///
/// # Input
///
/// * `prediction` -- the model response
/// * `strain` -- the measured strains
/// * `stress` -- the measured stresses
/// * `initial_guess` -- the starting parameters (length = `prediction.n_params()`)
/// * `constraints` -- the inequality constraints `c(params) ≥ 0`
/// * `params` -- the options of the optimizer
pub fn calibrate(
    prediction: &dyn Prediction,
    strain: &[f64],
    stress: &[f64],
    initial_guess: &[f64],
    constraints: &[&dyn Constraint],
    params: SqpParams,
) -> Result<CalibrationResult, StrError> {
    if initial_guess.len() != prediction.n_params() {
        println!(
            "ERROR: the initial guess has {} entries but the prediction requires {}",
            initial_guess.len(),
            prediction.n_params()
        );
        return Err("initial guess has an incorrect number of parameters");
    }
    let objective = ObjectiveSsd::new(prediction, strain, stress)?;
    let mut solver = SqpSolver::new(params)?;
    let res = solver.minimize(|x| objective.evaluate(x), initial_guess, constraints)?;
    Ok(CalibrationResult {
        params: res.x,
        status: res.status,
        objective: res.f,
        n_iterations: res.n_iterations,
        history: res.history,
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::calibrate;
    use crate::calibration::{CalibrationStatus, Compressibility, Prediction, Sign, SignConstraint, SqpParams, UniaxialTension};
    use crate::mechanics::{Formulation, HyperelasticModel};
    use russell_lab::approx_eq;

    #[test]
    fn calibrate_captures_errors() {
        let model = HyperelasticModel::new("C10*(I1b - 3)", &["C10"], Formulation::Incompressible).unwrap();
        let prediction = UniaxialTension::new(&model, None, Compressibility::Calibrated).unwrap();
        assert_eq!(
            calibrate(&prediction, &[0.1], &[0.2], &[1.0, 1.0], &[], SqpParams::new()).err(),
            Some("initial guess has an incorrect number of parameters")
        );
        assert_eq!(
            calibrate(&prediction, &[0.1, 0.2], &[0.2], &[1.0], &[], SqpParams::new()).err(),
            Some("strain and stress must have the same length")
        );
    }

    #[test]
    fn calibrate_neo_hookean_works() {
        let model = HyperelasticModel::new("C10*(I1b - 3)", &["C10"], Formulation::Incompressible).unwrap();
        let prediction = UniaxialTension::new(&model, None, Compressibility::Calibrated).unwrap();
        let strain: Vec<f64> = (0..11).map(|i| 0.05 * (i as f64)).collect();
        let stress = prediction.predict(&[0.35], &strain).unwrap();
        let positive = SignConstraint { index: 0, sign: Sign::Positive };
        let res = calibrate(&prediction, &strain, &stress, &[1.0], &[&positive], SqpParams::new()).unwrap();
        assert_eq!(res.status, CalibrationStatus::Converged);
        approx_eq(res.params[0], 0.35, 1e-6);
        assert!(res.objective < 1e-12);
        let history = res.history.unwrap();
        assert_eq!(history.params[0], &[1.0]);
        assert!(history.objective[0] > history.objective[history.len() - 1]);
    }
}
