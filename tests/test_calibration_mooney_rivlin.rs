use hypercal::calibration::{
    calibrate, estimate_tangent_modulus, Compressibility, EnergyConstraint, Prediction, SqpParams, UniaxialTension,
    UpperBoundPolicy,
};
use hypercal::mechanics::{Formulation, HyperelasticModel};
use hypercal::StrError;
use russell_lab::approx_eq;

#[test]
fn test_calibration_mooney_rivlin() -> Result<(), StrError> {
    // model
    let model = HyperelasticModel::new(
        "C10*(I1b - 3) + C01*(I2b - 3)",
        &["C10", "C01"],
        Formulation::Incompressible,
    )?;
    let prediction = UniaxialTension::new(&model, None, Compressibility::Calibrated)?;

    // synthetic data
    let correct = [0.3, 0.05];
    let strain: Vec<f64> = (1..=20).map(|i| 0.05 * (i as f64)).collect();
    let stress = prediction.predict(&correct, &strain)?;

    // calibration
    let energy = EnergyConstraint::new(&model, &strain, None, Compressibility::Calibrated)?;
    let mut params = SqpParams::new();
    params.verbose = true;
    let res = calibrate(&prediction, &strain, &stress, &[1.0, 1.0], &[&energy], params)?;
    println!("status = {}", res.status);
    println!("params = {:?}", res.params);
    for (value, reference) in res.params.iter().zip(&correct) {
        assert!(f64::abs(value - reference) / reference < 0.01);
    }
    assert!(res.objective < 1e-8);

    // the initial slope of the incompressible model is 6 (C10 + C01)
    let tangent = estimate_tangent_modulus(&strain, &prediction, &res.params, UpperBoundPolicy::DividedByTen)?;
    approx_eq(tangent.modulus, 6.0 * (correct[0] + correct[1]), 0.05);
    Ok(())
}
