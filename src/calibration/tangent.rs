use super::Prediction;
use crate::StrError;
use plotpy::linspace;
use serde::{Deserialize, Serialize};

/// Number of log-spaced samples used to estimate the tangent modulus
pub const N_TANGENT_SAMPLES: usize = 500;

/// Defines the upper exponent of the log-spaced strain samples
///
/// With `x_hi = log10(1.1 · max(strain))`:
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum UpperBoundPolicy {
    /// The samples end at `10^(x_hi / 10)`
    DividedByTen,

    /// The samples end at `10^x_hi`
    Full,
}

/// Holds the estimated tangent modulus and the dense curve used to compute it
#[derive(Clone, Debug)]
pub struct TangentModulus {
    /// Tangent modulus at the first sample (initial slope)
    pub modulus: f64,

    /// Log-spaced strain samples
    pub strain: Vec<f64>,

    /// Predicted stress at the samples
    pub stress: Vec<f64>,

    /// Tangent dσ/dε at the samples
    pub tangent: Vec<f64>,
}

/// Returns `n` numbers evenly spaced on a log scale, from `10^start` to `10^stop`
pub fn logspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    linspace(start, stop, n).iter().map(|x| f64::powf(10.0, *x)).collect()
}

/// Computes the gradient dy/dx on a non-uniform grid
///
/// Uses second-order accurate central differences in the interior and
/// first-order one-sided differences at the boundaries. For interior points:
///
/// ```text
/// dy/dx[i] = a y[i-1] + b y[i] + c y[i+1]
///
/// a = -h2 / (h1 (h1 + h2))
/// b = (h2 - h1) / (h1 h2)
/// c = h1 / (h2 (h1 + h2))
/// ```
///
/// where `h1 = x[i] - x[i-1]` and `h2 = x[i+1] - x[i]`.
pub fn gradient(y: &[f64], x: &[f64]) -> Result<Vec<f64>, StrError> {
    let n = x.len();
    if y.len() != n {
        return Err("x and y must have the same length");
    }
    if n < 2 {
        return Err("at least two points are required to compute the gradient");
    }
    let mut dy = vec![0.0; n];
    dy[0] = (y[1] - y[0]) / (x[1] - x[0]);
    dy[n - 1] = (y[n - 1] - y[n - 2]) / (x[n - 1] - x[n - 2]);
    for i in 1..(n - 1) {
        let h1 = x[i] - x[i - 1];
        let h2 = x[i + 1] - x[i];
        let a = -h2 / (h1 * (h1 + h2));
        let b = (h2 - h1) / (h1 * h2);
        let c = h1 / (h2 * (h1 + h2));
        dy[i] = a * y[i - 1] + b * y[i] + c * y[i + 1];
    }
    Ok(dy)
}

/// Estimates the initial tangent modulus of the predicted stress-strain response
///
/// The strains are sampled on a log scale from `0.1 · min(positive strain)` up to
/// the bound given by `policy`; the modulus is the tangent at the first sample.
///
/// # Input
///
/// * `strain` -- the measured strains (defines the sampling range)
/// * `prediction` -- the model response
/// * `params` -- the calibrated parameters
/// * `policy` -- the upper bound of the samples
pub fn estimate_tangent_modulus(
    strain: &[f64],
    prediction: &dyn Prediction,
    params: &[f64],
    policy: UpperBoundPolicy,
) -> Result<TangentModulus, StrError> {
    let min_positive = strain
        .iter()
        .copied()
        .filter(|eps| *eps > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !min_positive.is_finite() {
        return Err("at least one positive strain is required");
    }
    let max_strain = strain.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let x_lo = f64::log10(0.1 * min_positive);
    let x_hi = f64::log10(1.1 * max_strain);
    let upper = match policy {
        UpperBoundPolicy::DividedByTen => x_hi / 10.0,
        UpperBoundPolicy::Full => x_hi,
    };
    let samples = logspace(x_lo, upper, N_TANGENT_SAMPLES);
    let stress = prediction.predict(params, &samples)?;
    if stress.len() != samples.len() {
        return Err("prediction returned an inconsistent number of values");
    }
    let tangent = gradient(&stress, &samples)?;
    Ok(TangentModulus {
        modulus: tangent[0],
        strain: samples,
        stress,
        tangent,
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{estimate_tangent_modulus, gradient, logspace, UpperBoundPolicy, N_TANGENT_SAMPLES};
    use crate::calibration::Prediction;
    use crate::StrError;
    use russell_lab::{approx_eq, vec_approx_eq};

    struct Linear {
        young: f64,
    }

    impl Prediction for Linear {
        fn n_params(&self) -> usize {
            0
        }
        fn predict(&self, _: &[f64], strain: &[f64]) -> Result<Vec<f64>, StrError> {
            Ok(strain.iter().map(|eps| self.young * eps).collect())
        }
    }

    struct Wrong;

    impl Prediction for Wrong {
        fn n_params(&self) -> usize {
            0
        }
        fn predict(&self, _: &[f64], _: &[f64]) -> Result<Vec<f64>, StrError> {
            Ok(vec![1.0])
        }
    }

    #[test]
    fn logspace_works() {
        let x = logspace(-2.0, 1.0, 4);
        vec_approx_eq(&russell_lab::Vector::from(&x), &[0.01, 0.1, 1.0, 10.0], 1e-14);
    }

    #[test]
    fn gradient_works() {
        assert_eq!(gradient(&[1.0], &[1.0, 2.0]).err(), Some("x and y must have the same length"));
        assert_eq!(
            gradient(&[1.0], &[1.0]).err(),
            Some("at least two points are required to compute the gradient")
        );
        // quadratic on a non-uniform grid: exact in the interior
        let x = [0.0, 0.5, 1.5, 2.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let dy = gradient(&y, &x).unwrap();
        approx_eq(dy[0], 0.5, 1e-15);
        approx_eq(dy[1], 1.0, 1e-14);
        approx_eq(dy[2], 3.0, 1e-14);
        approx_eq(dy[3], 4.0, 1e-14);
        approx_eq(dy[4], 6.0, 1e-14);
    }

    #[test]
    fn tangent_modulus_of_linear_relation_equals_young() {
        let prediction = Linear { young: 2500.0 };
        let strain = [0.0, 0.001, 0.01, 0.05, 0.1];
        for policy in [UpperBoundPolicy::DividedByTen, UpperBoundPolicy::Full] {
            let res = estimate_tangent_modulus(&strain, &prediction, &[], policy).unwrap();
            approx_eq(res.modulus, 2500.0, 1e-8);
            assert_eq!(res.strain.len(), N_TANGENT_SAMPLES);
            approx_eq(res.strain[0], 1e-4, 1e-18);
        }
        let full = estimate_tangent_modulus(&strain, &prediction, &[], UpperBoundPolicy::Full).unwrap();
        approx_eq(full.strain[N_TANGENT_SAMPLES - 1], 0.11, 1e-14);
        let tenth = estimate_tangent_modulus(&strain, &prediction, &[], UpperBoundPolicy::DividedByTen).unwrap();
        approx_eq(tenth.strain[N_TANGENT_SAMPLES - 1], f64::powf(0.11, 0.1), 1e-14);
    }

    #[test]
    fn estimate_captures_errors() {
        let prediction = Linear { young: 1.0 };
        assert_eq!(
            estimate_tangent_modulus(&[0.0, -0.1], &prediction, &[], UpperBoundPolicy::Full).err(),
            Some("at least one positive strain is required")
        );
        assert_eq!(
            estimate_tangent_modulus(&[0.1, 0.2], &Wrong, &[], UpperBoundPolicy::Full).err(),
            Some("prediction returned an inconsistent number of values")
        );
    }
}
