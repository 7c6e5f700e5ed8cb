use super::{energy_substituted, first_piola_stress, first_piola_stress_incompressible, KinematicSymbols};
use crate::symbolic::{is_valid_identifier, parse, Expr, Lambdified};
use crate::StrError;
use serde::{Deserialize, Serialize};

/// Defines how the volumetric response is handled
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Formulation {
    /// The strain-energy depends on I1b, I2b and J
    General,

    /// The material is incompressible; the strain-energy depends on I1b and I2b only
    Incompressible,
}

impl Formulation {
    /// Returns the default Poisson's coefficient used in uniaxial predictions
    pub fn default_poisson(&self) -> f64 {
        match self {
            Formulation::General => 0.495,
            Formulation::Incompressible => 0.5,
        }
    }
}

/// Holds a hyperelastic model given by a strain-energy function
///
/// # Examples
///
/// ```
/// use hypercal::mechanics::{Formulation, HyperelasticModel};
/// use hypercal::StrError;
///
/// fn main() -> Result<(), StrError> {
///     let model = HyperelasticModel::new("C10*(I1b - 3)", &["C10"], Formulation::Incompressible)?;
///     let (exprs, names) = model.derivatives();
///     assert_eq!(names, &["dWdI1", "dWdI2"]);
///     assert_eq!(format!("{}", exprs[0]), "C10");
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct HyperelasticModel {
    /// Strain-energy function in terms of the invariant placeholders
    pub energy: Expr,

    /// Names of the material parameters (in the order of the parameter vector)
    pub params: Vec<String>,

    /// Volumetric formulation
    pub formulation: Formulation,

    /// Names of the kinematic symbols
    pub symbols: KinematicSymbols,
}

impl HyperelasticModel {
    /// Allocates a new instance with the default kinematic symbols
    ///
    /// # Input
    ///
    /// * `energy` -- the strain-energy function, e.g., `C10*(I1b - 3) + (J - 1)**2/D1`
    /// * `params` -- the names of the material parameters
    /// * `formulation` -- the volumetric formulation
    pub fn new<S: AsRef<str>>(energy: &str, params: &[S], formulation: Formulation) -> Result<Self, StrError> {
        let energy = parse(energy)?;
        let params: Vec<String> = params.iter().map(|p| p.as_ref().to_string()).collect();
        Self::from_expr(energy, params, formulation, KinematicSymbols::new())
    }

    /// Allocates a new instance from an expression and custom kinematic symbols
    pub fn from_expr(
        energy: Expr,
        params: Vec<String>,
        formulation: Formulation,
        symbols: KinematicSymbols,
    ) -> Result<Self, StrError> {
        if params.is_empty() {
            return Err("at least one material parameter is required");
        }
        let reserved: Vec<&str> = symbols
            .placeholders()
            .into_iter()
            .chain(symbols.stretches())
            .collect();
        if reserved.iter().any(|name| !is_valid_identifier(name)) {
            return Err("kinematic symbols must be ASCII identifiers");
        }
        for (i, name) in params.iter().enumerate() {
            if !is_valid_identifier(name) {
                println!("ERROR: parameter \"{}\" is not an ASCII identifier", name);
                return Err("material parameter names must be ASCII identifiers");
            }
            if params[..i].contains(name) {
                println!("ERROR: parameter \"{}\" is repeated", name);
                return Err("material parameter names must be unique");
            }
            if reserved.contains(&name.as_str()) {
                println!("ERROR: parameter \"{}\" is a kinematic symbol", name);
                return Err("material parameter name clashes with a kinematic symbol");
            }
        }
        for name in energy.symbols() {
            if params.contains(&name) || symbols.placeholders().contains(&name.as_str()) {
                continue;
            }
            println!("ERROR: symbol \"{}\" of the strain-energy function is unknown", name);
            return Err("strain-energy function has an unknown symbol");
        }
        if formulation == Formulation::Incompressible {
            let dependent = energy.diff(&symbols.i1b).contains(&symbols.jac)
                || energy.diff(&symbols.i2b).contains(&symbols.jac);
            if dependent {
                return Err("incompressible strain-energy must not couple J with I1b or I2b");
            }
        }
        Ok(HyperelasticModel {
            energy,
            params,
            formulation,
            symbols,
        })
    }

    /// Returns the first Piola-Kirchhoff stress along the loading direction
    pub fn stress(&self) -> Expr {
        match self.formulation {
            Formulation::General => first_piola_stress(&self.energy, &self.symbols),
            Formulation::Incompressible => first_piola_stress_incompressible(&self.energy, &self.symbols),
        }
    }

    /// Returns the strain-energy function in terms of the stretches
    pub fn energy_in_stretches(&self) -> Expr {
        energy_substituted(&self.energy, &self.symbols)
    }

    /// Returns the derivatives of the strain-energy function and their Fortran variable names
    ///
    /// The general formulation yields `dWdI1, dWdI2, dWdJ1`; the incompressible
    /// formulation yields `dWdI1, dWdI2`.
    pub fn derivatives(&self) -> (Vec<Expr>, Vec<String>) {
        let mut exprs = vec![self.energy.diff(&self.symbols.i1b), self.energy.diff(&self.symbols.i2b)];
        let mut names = vec!["dWdI1".to_string(), "dWdI2".to_string()];
        if self.formulation == Formulation::General {
            exprs.push(self.energy.diff(&self.symbols.jac));
            names.push("dWdJ1".to_string());
        }
        (exprs, names)
    }

    /// Returns the names of the arguments of the lowered functions: parameters followed by stretches
    pub fn argument_names(&self) -> Vec<String> {
        let mut names = self.params.clone();
        names.extend(self.symbols.stretches().iter().map(|s| s.to_string()));
        names
    }

    /// Lowers the stress to a numeric function of (params..., λ11, λ22, λ33)
    pub fn lambdify_stress(&self) -> Result<Lambdified, StrError> {
        Lambdified::new(&self.stress(), &self.argument_names())
    }

    /// Lowers the strain-energy to a numeric function of (params..., λ11, λ22, λ33)
    pub fn lambdify_energy(&self) -> Result<Lambdified, StrError> {
        Lambdified::new(&self.energy_in_stretches(), &self.argument_names())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{Formulation, HyperelasticModel};
    use crate::mechanics::KinematicSymbols;
    use crate::symbolic::Expr;
    use russell_lab::approx_eq;

    #[test]
    fn new_captures_errors() {
        let none: &[&str] = &[];
        assert_eq!(
            HyperelasticModel::new("C10*(I1b - 3)", none, Formulation::General).err(),
            Some("at least one material parameter is required")
        );
        assert_eq!(
            HyperelasticModel::new("C10*(I1b - 3)", &["C10", "C10"], Formulation::General).err(),
            Some("material parameter names must be unique")
        );
        assert_eq!(
            HyperelasticModel::new("C10*(I1b - 3)", &["C10", "J"], Formulation::General).err(),
            Some("material parameter name clashes with a kinematic symbol")
        );
        assert_eq!(
            HyperelasticModel::new("C10*(I1b - 3) + k", &["C10"], Formulation::General).err(),
            Some("strain-energy function has an unknown symbol")
        );
        assert_eq!(
            HyperelasticModel::new("C10*J*(I1b - 3)", &["C10"], Formulation::Incompressible).err(),
            Some("incompressible strain-energy must not couple J with I1b or I2b")
        );
        assert_eq!(
            HyperelasticModel::new("C10*(I1b - 3", &["C10"], Formulation::General).err(),
            Some("cannot parse expression")
        );
        assert_eq!(
            HyperelasticModel::new("μ*(I1b - 3)", &["μ"], Formulation::General).err(),
            Some("invalid identifier in expression")
        );
        let energy = Expr::symbol("μ") * (Expr::symbol("I1b") - Expr::int(3));
        let params = vec!["μ".to_string()];
        let symbols = KinematicSymbols::new();
        assert_eq!(
            HyperelasticModel::from_expr(energy, params, Formulation::General, symbols).err(),
            Some("material parameter names must be ASCII identifiers")
        );
    }

    #[test]
    fn derivatives_work() {
        let w = "C10*(I1b - 3) + C01*(I2b - 3) + (J - 1)**2/D1";
        let model = HyperelasticModel::new(w, &["C10", "C01", "D1"], Formulation::General).unwrap();
        let (exprs, names) = model.derivatives();
        assert_eq!(names, &["dWdI1", "dWdI2", "dWdJ1"]);
        assert_eq!(format!("{}", exprs[0]), "C10");
        assert_eq!(format!("{}", exprs[1]), "C01");
        assert_eq!(format!("{}", exprs[2]), "(2*J - 2)/D1");
    }

    #[test]
    fn lambdify_works() {
        let model = HyperelasticModel::new("C10*(I1b - 3)", &["C10"], Formulation::Incompressible).unwrap();
        assert_eq!(model.argument_names(), &["C10", "lambda_11", "lambda_22", "lambda_33"]);
        let stress = model.lambdify_stress().unwrap();
        let energy = model.lambdify_energy().unwrap();
        assert_eq!(stress.n_args(), 4);
        approx_eq(stress.call(&[1.0, 1.0, 1.0, 1.0]).unwrap(), 0.0, 1e-15);
        let lam: f64 = 1.5;
        let lt = 1.0 / f64::sqrt(lam);
        approx_eq(energy.call(&[2.0, lt, lam, lt]).unwrap(), 2.0 * (lam * lam + 2.0 / lam - 3.0), 1e-14);
    }
}
