use super::Prediction;
use crate::StrError;

/// Computes the mean of the squared differences `(1/n) Σ (a_i - b_i)²`
pub fn sum_squared_differences(a: &[f64], b: &[f64]) -> Result<f64, StrError> {
    if a.len() != b.len() {
        return Err("arrays must have the same length");
    }
    if a.is_empty() {
        return Err("arrays must not be empty");
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    Ok(sum / (a.len() as f64))
}

/// Implements the normalized sum of squared differences between predictions and observations
pub struct ObjectiveSsd<'a> {
    prediction: &'a dyn Prediction,
    strain: &'a [f64],
    stress: &'a [f64],
}

impl<'a> ObjectiveSsd<'a> {
    /// Allocates a new instance
    pub fn new(prediction: &'a dyn Prediction, strain: &'a [f64], stress: &'a [f64]) -> Result<Self, StrError> {
        if strain.len() != stress.len() {
            return Err("strain and stress must have the same length");
        }
        if strain.is_empty() {
            return Err("at least one data point is required");
        }
        Ok(ObjectiveSsd {
            prediction,
            strain,
            stress,
        })
    }

    /// Evaluates the objective function
    pub fn evaluate(&self, params: &[f64]) -> Result<f64, StrError> {
        let predicted = self.prediction.predict(params, self.strain)?;
        sum_squared_differences(&predicted, self.stress)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
