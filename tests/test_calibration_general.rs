use hypercal::calibration::{
    calibrate, CalibrationStatus, Compressibility, EnergyConstraint, Prediction, Sign, SignConstraint, SqpParams,
    UniaxialTension,
};
use hypercal::mechanics::{Formulation, HyperelasticModel};
use hypercal::StrError;
use russell_lab::approx_eq;

#[test]
fn test_calibration_general() -> Result<(), StrError> {
    // model with the compressibility parameter derived from the Poisson's coefficient
    let model = HyperelasticModel::new(
        "C10*(I1b - 3) + C01*(I2b - 3) + C20*(I1b - 3)**2 + (J - 1)**2/D1",
        &["C10", "C01", "C20", "D1"],
        Formulation::General,
    )?;
    let nu = 0.495;
    let prediction = UniaxialTension::new(&model, Some(nu), Compressibility::FromPoisson)?;
    assert_eq!(prediction.n_params(), 3);

    // synthetic data
    let correct = [0.3, 0.05, 0.05];
    let strain: Vec<f64> = (1..=20).map(|i| 0.05 * (i as f64)).collect();
    let stress = prediction.predict(&correct, &strain)?;

    // constraints
    let energy = EnergyConstraint::new(&model, &strain, Some(nu), Compressibility::FromPoisson)?;
    let c10 = SignConstraint {
        index: 0,
        sign: Sign::Positive,
    };
    let c01 = SignConstraint {
        index: 1,
        sign: Sign::NonNegative,
    };
    let c20 = SignConstraint {
        index: 2,
        sign: Sign::NonNegative,
    };

    // calibration
    let mut params = SqpParams::new();
    params.verbose = true;
    let res = calibrate(&prediction, &strain, &stress, &[1.0, 1.0, 1.0], &[&energy, &c10, &c01, &c20], params)?;
    println!("status = {}", res.status);
    println!("params = {:?}", res.params);
    assert_eq!(res.status, CalibrationStatus::Converged);
    for (value, reference) in res.params.iter().zip(&correct) {
        assert!(f64::abs(value - reference) / reference < 0.02);
    }
    assert!(res.objective < 1e-8);

    // derived compressibility parameter
    let full = prediction.kinematics.full_params(&res.params)?;
    assert_eq!(full.len(), 4);
    let d1 = 3.0 * (1.0 - 2.0 * nu) / (2.0 * (1.0 + nu) * (correct[0] + correct[1]));
    approx_eq(full[3], d1, 0.02 * d1);
    Ok(())
}
