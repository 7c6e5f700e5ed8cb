use crate::mechanics::{Formulation, HyperelasticModel};
use crate::symbolic::{Arg, Lambdified};
use crate::StrError;
use serde::{Deserialize, Serialize};

/// Defines a model response that can be compared against test data
pub trait Prediction {
    /// Returns the number of calibrated (free) parameters
    fn n_params(&self) -> usize;

    /// Computes the predicted stress for each strain
    fn predict(&self, params: &[f64], strain: &[f64]) -> Result<Vec<f64>, StrError>;
}

/// Defines how the compressibility parameter is obtained
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Compressibility {
    /// All material parameters are calibrated
    Calibrated,

    /// The last material parameter is derived from the Poisson's coefficient
    ///
    /// ```text
    /// D = 3 (1 - 2ν) / (2 (1 + ν) (C10 + C01))
    /// ```
    FromPoisson,
}

/// Computes the stretches and the full parameter vector of a uniaxial tension test
///
/// The loading is along the second direction and the lateral stretches follow from
/// the Poisson's coefficient:
///
/// ```text
/// λ2 = 1 + ε
/// λ1 = λ3 = λ2^(-ν)
/// ```
#[derive(Clone, Debug)]
pub struct UniaxialKinematics {
    /// Poisson's coefficient
    pub poisson: f64,

    /// Rule for the compressibility parameter
    pub compressibility: Compressibility,

    /// Total number of material parameters
    n_all: usize,

    /// Position of C10 in the parameter vector
    index_c10: Option<usize>,

    /// Position of C01 in the parameter vector
    index_c01: Option<usize>,
}

impl UniaxialKinematics {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `model` -- the hyperelastic model
    /// * `poisson` -- the Poisson's coefficient; None means the default of the formulation
    /// * `compressibility` -- the rule for the compressibility parameter
    pub fn new(
        model: &HyperelasticModel,
        poisson: Option<f64>,
        compressibility: Compressibility,
    ) -> Result<Self, StrError> {
        let poisson = poisson.unwrap_or_else(|| model.formulation.default_poisson());
        if poisson < 0.0 || poisson > 0.5 {
            return Err("Poisson's coefficient must be in [0, 0.5]");
        }
        let index_c10 = model.params.iter().position(|p| p == "C10");
        let index_c01 = model.params.iter().position(|p| p == "C01");
        if compressibility == Compressibility::FromPoisson {
            if model.formulation == Formulation::Incompressible {
                return Err("derived compressibility requires the general formulation");
            }
            if model.params.len() < 2 {
                return Err("derived compressibility requires at least two material parameters");
            }
            match index_c10 {
                None => return Err("derived compressibility requires a C10 parameter"),
                Some(i) if i + 1 == model.params.len() => {
                    return Err("the derived compressibility parameter must be the last one")
                }
                _ => (),
            }
            if index_c01.map_or(false, |i| i + 1 == model.params.len()) {
                return Err("the derived compressibility parameter must be the last one");
            }
        }
        Ok(UniaxialKinematics {
            poisson,
            compressibility,
            n_all: model.params.len(),
            index_c10,
            index_c01,
        })
    }

    /// Returns the number of calibrated parameters
    pub fn n_free(&self) -> usize {
        match self.compressibility {
            Compressibility::Calibrated => self.n_all,
            Compressibility::FromPoisson => self.n_all - 1,
        }
    }

    /// Computes the stretches (λ1, λ2, λ3) corresponding to the strains
    pub fn stretches(&self, strain: &[f64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let l22: Vec<f64> = strain.iter().map(|eps| 1.0 + eps).collect();
        let lateral: Vec<f64> = l22.iter().map(|l| f64::powf(*l, -self.poisson)).collect();
        (lateral.clone(), l22, lateral)
    }

    /// Returns the full material parameter vector given the calibrated parameters
    pub fn full_params(&self, params: &[f64]) -> Result<Vec<f64>, StrError> {
        if params.len() != self.n_free() {
            return Err("the number of parameters is incorrect");
        }
        let mut all = params.to_vec();
        if self.compressibility == Compressibility::FromPoisson {
            let c10 = self.index_c10.map_or(0.0, |i| params[i]);
            let c01 = self.index_c01.map_or(0.0, |i| params[i]);
            let nu = self.poisson;
            all.push(3.0 * (1.0 - 2.0 * nu) / (2.0 * (1.0 + nu) * (c10 + c01)));
        }
        Ok(all)
    }

    /// Evaluates a lowered function of (params..., λ11, λ22, λ33) at each strain
    pub fn evaluate(&self, function: &Lambdified, params: &[f64], strain: &[f64]) -> Result<Vec<f64>, StrError> {
        let all = self.full_params(params)?;
        let (l11, l22, l33) = self.stretches(strain);
        let mut args: Vec<Arg> = all.iter().map(|v| Arg::Scalar(*v)).collect();
        args.push(Arg::Array(&l11));
        args.push(Arg::Array(&l22));
        args.push(Arg::Array(&l33));
        function.call_broadcast(&args)
    }
}

/// Predicts the nominal stress of a uniaxial tension test
pub struct UniaxialTension {
    /// Kinematics and parameter handling
    pub kinematics: UniaxialKinematics,

    /// Lowered stress function
    stress: Lambdified,
}

impl UniaxialTension {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `model` -- the hyperelastic model
    /// * `poisson` -- the Poisson's coefficient; None means 0.5 (incompressible) or 0.495 (general)
    /// * `compressibility` -- the rule for the compressibility parameter
    pub fn new(
        model: &HyperelasticModel,
        poisson: Option<f64>,
        compressibility: Compressibility,
    ) -> Result<Self, StrError> {
        Ok(UniaxialTension {
            kinematics: UniaxialKinematics::new(model, poisson, compressibility)?,
            stress: model.lambdify_stress()?,
        })
    }
}

impl Prediction for UniaxialTension {
    fn n_params(&self) -> usize {
        self.kinematics.n_free()
    }

    fn predict(&self, params: &[f64], strain: &[f64]) -> Result<Vec<f64>, StrError> {
        self.kinematics.evaluate(&self.stress, params, strain)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
