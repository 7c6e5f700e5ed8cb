use crate::calibration::{
    calibrate, estimate_tangent_modulus, CalibrationResult, Compressibility, Constraint, Dataset, EnergyConstraint,
    Prediction, SignConstraint, SqpParams, TangentModulus, UniaxialTension, UpperBoundPolicy,
};
use crate::codegen::{default_promotion_range, generate_vumat, MarkerPolicy, VumatOptions};
use crate::mechanics::{Formulation, HyperelasticModel};
use crate::output::{
    plot_history, plot_parameter_table, plot_stress_strain, plot_tangent_modulus, prediction_samples, write_table,
    PlotStyle, DEFAULT_DELIMITER,
};
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Defines where the test data come from
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum DataSource {
    /// A file with strain and stress columns
    TwoColumns { path: String },

    /// A pair of matrix files with one column per specimen
    Specimen {
        strain_path: String,
        stress_path: String,
        /// Optional file with the specimen names (used in messages only)
        names_path: Option<String>,
        specimen: usize,
    },
}

/// Holds the description of a calibration job
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct JobConfig {
    /// Strain-energy function, e.g., `C10*(I1b - 3) + C01*(I2b - 3)`
    pub energy: String,

    /// Names of the material parameters (in the order of `props` in the VUMAT)
    pub params: Vec<String>,

    /// Volumetric formulation
    pub formulation: Formulation,

    /// Poisson's coefficient of the uniaxial prediction (None means the default of the formulation)
    pub poisson: Option<f64>,

    /// Rule for the compressibility parameter
    pub compressibility: Compressibility,

    /// Requires a non-negative strain-energy at the data strains
    pub energy_constraint: bool,

    /// Sign constraints on the calibrated parameters
    pub sign_constraints: Vec<SignConstraint>,

    /// Test data
    pub data: DataSource,

    /// Upper bound of the strain window used in the calibration (None keeps all points)
    pub max_strain: Option<f64>,

    /// Initial guess (empty means all ones)
    pub initial_guess: Vec<f64>,

    /// Options of the optimizer
    pub solver: SqpParams,

    /// Upper bound of the samples used to estimate the tangent modulus
    pub tangent_policy: UpperBoundPolicy,

    /// Directory with the VUMAT templates
    pub template_dir: String,

    /// VUMAT template file name (None skips the code generation)
    pub template: Option<String>,

    /// Checking of the template markers
    pub marker_policy: MarkerPolicy,

    /// Directory receiving all results
    pub output_dir: String,

    /// Number of decimal places in the numeric tables
    pub decimals: usize,

    /// Saves the predicted and measured stress-strain curves
    pub plot_stress_strain: bool,

    /// Saves the tangent modulus curve
    pub plot_tangent: bool,

    /// Saves the optimization history
    pub plot_history: bool,

    /// Saves the table of calibrated parameters
    pub plot_parameters: bool,

    /// Appearance of the figures
    pub plot_style: PlotStyle,
}

/// Holds the results of a calibration job
#[derive(Clone, Debug)]
pub struct JobOutput {
    /// Results of the optimizer
    pub calibration: CalibrationResult,

    /// All material parameters, including a derived compressibility parameter
    pub full_params: Vec<f64>,

    /// Preprocessed test data
    pub dataset: Dataset,

    /// Estimated tangent modulus
    pub tangent: TangentModulus,

    /// Generated VUMAT file, if any
    pub vumat: Option<PathBuf>,

    /// All generated files
    pub files: Vec<PathBuf>,
}

impl JobConfig {
    /// Allocates a new instance with default values (incompressible Mooney-Rivlin)
    pub fn new() -> Self {
        JobConfig {
            energy: "C10*(I1b - 3) + C01*(I2b - 3)".to_string(),
            params: vec!["C10".to_string(), "C01".to_string()],
            formulation: Formulation::Incompressible,
            poisson: None,
            compressibility: Compressibility::Calibrated,
            energy_constraint: true,
            sign_constraints: Vec::new(),
            data: DataSource::TwoColumns {
                path: "data/nominal_stress_strain_data.txt".to_string(),
            },
            max_strain: None,
            initial_guess: Vec::new(),
            solver: SqpParams::new(),
            tangent_policy: UpperBoundPolicy::DividedByTen,
            template_dir: "data/templates".to_string(),
            template: Some("VUMAT_2D_planestrain_incompressible_template.f".to_string()),
            marker_policy: MarkerPolicy::Strict,
            output_dir: "/tmp/hypercal/output".to_string(),
            decimals: 12,
            plot_stress_strain: false,
            plot_tangent: false,
            plot_history: false,
            plot_parameters: false,
            plot_style: PlotStyle::new(),
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.energy.trim().is_empty() {
            return Some("energy is empty; a strain-energy function is required".to_string());
        }
        if self.params.is_empty() {
            return Some("params is empty; at least one material parameter is required".to_string());
        }
        if let Some(nu) = self.poisson {
            if nu < 0.0 || nu > 0.5 {
                return Some(format!("poisson = {:?} is incorrect; it must be in [0, 0.5]", nu));
            }
        }
        if let Some(eps) = self.max_strain {
            if !(eps > 0.0) {
                return Some(format!("max_strain = {:?} is incorrect; it must be > 0.0", eps));
            }
        }
        if self.decimals > 32 {
            return Some(format!("decimals = {} is incorrect; it must be ≤ 32", self.decimals));
        }
        if self.initial_guess.iter().any(|v| !v.is_finite()) {
            return Some("initial_guess is incorrect; all values must be finite".to_string());
        }
        if let Some(msg) = self.solver.validate() {
            return Some(msg);
        }
        if let Some(msg) = self.plot_style.validate() {
            return Some(msg);
        }
        None
    }

    /// Reads a JSON file with the job description
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(&path).map_err(|_| "file not found")?;
        let reader = BufReader::new(file);
        let data = serde_json::from_reader(reader).map_err(|_| "deserialize failed")?;
        Ok(data)
    }

    /// Writes a JSON file with the job description
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let mut file = File::create(&path).map_err(|_| "cannot create file")?;
        serde_json::to_writer_pretty(&mut file, &self).map_err(|_| "cannot write file")?;
        Ok(())
    }

    /// Loads and preprocesses the test data
    pub fn load_dataset(&self) -> Result<Dataset, StrError> {
        let raw = match &self.data {
            DataSource::TwoColumns { path } => Dataset::read_two_columns(path)?,
            DataSource::Specimen {
                strain_path,
                stress_path,
                names_path,
                specimen,
            } => {
                if let Some(p) = names_path {
                    let names = crate::calibration::read_names(p)?;
                    if let Some(name) = names.get(*specimen) {
                        println!("specimen: {}", name);
                    }
                }
                Dataset::read_specimen(strain_path, stress_path, *specimen)?
            }
        };
        let data = raw.preprocess(self.max_strain.unwrap_or(f64::INFINITY))?;
        if data.is_empty() {
            return Err("there are no data points within the strain window");
        }
        Ok(data)
    }
}

impl Default for JobConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a calibration job
///
/// 1. Loads and preprocesses the test data
/// 2. Builds the hyperelastic model and the uniaxial prediction
/// 3. Calibrates the parameters subject to the constraints
/// 4. Estimates the initial tangent modulus
/// 5. Writes the tables and figures
/// 6. Generates the VUMAT subroutine
///
/// A non-converged calibration is reported but does not stop the job.
pub fn run_job(config: &JobConfig) -> Result<JobOutput, StrError> {
    if let Some(msg) = config.validate() {
        println!("ERROR: {}", msg);
        return Err("cannot run job because config.validate() failed");
    }

    // data and model
    let dataset = config.load_dataset()?;
    let model = HyperelasticModel::new(&config.energy, &config.params, config.formulation)?;
    let prediction = UniaxialTension::new(&model, config.poisson, config.compressibility)?;

    // constraints
    let mut constraints: Vec<&dyn Constraint> = Vec::new();
    let energy = if config.energy_constraint {
        Some(EnergyConstraint::new(
            &model,
            &dataset.strain,
            config.poisson,
            config.compressibility,
        )?)
    } else {
        None
    };
    if let Some(c) = &energy {
        constraints.push(c);
    }
    for c in &config.sign_constraints {
        constraints.push(c);
    }

    // calibration
    let x0 = if config.initial_guess.is_empty() {
        vec![1.0; prediction.n_params()]
    } else {
        config.initial_guess.clone()
    };
    let calibration = calibrate(
        &prediction,
        &dataset.strain,
        &dataset.stress,
        &x0,
        &constraints,
        config.solver,
    )?;
    if !calibration.status.converged() {
        println!("WARNING: the calibration did not converge ({})", calibration.status);
    }
    let full_params = prediction.kinematics.full_params(&calibration.params)?;
    println!("calibrated parameters:");
    for (name, value) in config.params.iter().zip(&full_params) {
        println!("{:>8} = {:?}", name, value);
    }

    // tangent modulus
    let tangent = estimate_tangent_modulus(
        &dataset.strain,
        &prediction,
        &calibration.params,
        config.tangent_policy,
    )?;
    println!("elastic modulus = {:?}", tangent.modulus);

    // tables
    let out_dir = Path::new(&config.output_dir).to_path_buf();
    let mut files = Vec::new();
    let predicted = prediction.predict(&calibration.params, &dataset.strain)?;
    let path = out_dir.join("stress_strain.csv");
    write_table(
        &path,
        &["strain", "stress", "prediction"],
        &[&dataset.strain, &dataset.stress, &predicted],
        config.decimals,
        DEFAULT_DELIMITER,
    )?;
    files.push(path);
    let mut headers = config.params.clone();
    headers.push("E".to_string());
    let mut values: Vec<Vec<f64>> = full_params.iter().map(|v| vec![*v]).collect();
    values.push(vec![tangent.modulus]);
    let columns: Vec<&[f64]> = values.iter().map(|v| v.as_slice()).collect();
    let path = out_dir.join("parameters.csv");
    write_table(&path, &headers, &columns, config.decimals, DEFAULT_DELIMITER)?;
    files.push(path);

    // figures
    let style = &config.plot_style;
    if config.plot_stress_strain {
        let pred_strain = prediction_samples(&dataset.strain)?;
        let pred_stress = prediction.predict(&calibration.params, &pred_strain)?;
        let path = style.path(&out_dir, "predictionvsdata");
        plot_stress_strain(
            &dataset.strain,
            &dataset.stress,
            &pred_strain,
            &pred_stress,
            &path,
            style,
        )?;
        files.push(path);
    }
    if config.plot_tangent {
        let path = style.path(&out_dir, "tangentmodulus");
        plot_tangent_modulus(&tangent.strain, &tangent.stress, tangent.modulus, &path, style)?;
        files.push(path);
    }
    if config.plot_history {
        if let Some(history) = &calibration.history {
            let path = style.path(&out_dir, "history");
            plot_history(history, &path, style)?;
            files.push(path);
        }
    }
    if config.plot_parameters {
        let path = style.path(&out_dir, "model_parameters");
        plot_parameter_table(&config.params, &full_params, &path, style)?;
        files.push(path);
    }

    // code generation
    let vumat = match &config.template {
        Some(template) => {
            let options = VumatOptions {
                template_dir: Path::new(&config.template_dir).to_path_buf(),
                output_dir: out_dir.clone(),
                policy: config.marker_policy,
                promotion: default_promotion_range(),
            };
            let (exprs, names) = model.derivatives();
            let path = generate_vumat(&model.energy, &model.params, &exprs, &names, template, &options)?;
            files.push(path.clone());
            Some(path)
        }
        None => None,
    };

    // message
    let longest = files.iter().map(|p| p.to_string_lossy().len()).max().unwrap_or(0);
    let thin_line = format!("{:─^1$}", "", longest);
    println!("\n{}", thin_line);
    println!("generated files:");
    for path in &files {
        println!("{}", path.display());
    }
    println!("{}\n", thin_line);

    Ok(JobOutput {
        calibration,
        full_params,
        dataset,
        tangent,
        vumat,
        files,
    })
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
