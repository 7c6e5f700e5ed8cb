use crate::calibration::{gradient, History};
use crate::StrError;
use plotpy::{linspace, Curve, Legend, Plot, Text};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of strain samples in the predicted stress-strain curve
pub const N_PREDICTION_SAMPLES: usize = 50;

/// Smallest value drawn in logarithmic axes
const LOG_FLOOR: f64 = 1e-300;

/// Holds the appearance of the figures
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlotStyle {
    /// Font size of labels and legends
    pub fontsize: f64,

    /// Line width of the predictions (the data are drawn 2 points thinner)
    pub line_width: f64,

    /// Figure width in points
    pub width: f64,

    /// Figure height in points
    pub height: f64,

    /// File extension (e.g., "svg" or "pdf")
    pub extension: String,
}

impl PlotStyle {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        PlotStyle {
            fontsize: 16.0,
            line_width: 5.0,
            width: 432.0,
            height: 432.0,
            extension: "pdf".to_string(),
        }
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.fontsize <= 0.0 {
            return Some(format!("fontsize = {:?} is incorrect; it must be > 0.0", self.fontsize));
        }
        if self.line_width <= 2.0 {
            return Some(format!("line_width = {:?} is incorrect; it must be > 2.0", self.line_width));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Some(format!(
                "figure size = ({:?}, {:?}) is incorrect; it must be positive",
                self.width, self.height
            ));
        }
        if self.extension != "svg" && self.extension != "pdf" && self.extension != "png" {
            return Some(format!(
                "extension = {:?} is incorrect; it must be \"svg\", \"pdf\", or \"png\"",
                self.extension
            ));
        }
        None
    }

    /// Returns the full path of a figure in `out_dir`
    pub fn path(&self, out_dir: &Path, stem: &str) -> PathBuf {
        out_dir.join(format!("{}.{}", stem, self.extension))
    }

    fn data_line_width(&self) -> f64 {
        self.line_width - 2.0
    }

    fn legend(&self) -> Legend {
        let mut legend = Legend::new();
        legend.set_fontsize(self.fontsize).draw();
        legend
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the strain samples of the predicted curve
///
/// The samples extend the range of the data by a tenth of the smallest strain on both ends.
pub fn prediction_samples(strain: &[f64]) -> Result<Vec<f64>, StrError> {
    if strain.is_empty() {
        return Err("at least one strain value is required");
    }
    let min = strain.iter().copied().fold(f64::INFINITY, f64::min);
    let max = strain.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(linspace(min - min / 10.0, max + min / 10.0, N_PREDICTION_SAMPLES))
}

/// Returns the minimum and maximum values
fn limits(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

/// Plots the predicted stress-strain curve against the data
///
/// The axes are limited to the range of the prediction.
pub fn plot_stress_strain(
    data_strain: &[f64],
    data_stress: &[f64],
    pred_strain: &[f64],
    pred_stress: &[f64],
    full_path: &Path,
    style: &PlotStyle,
) -> Result<(), StrError> {
    if data_strain.len() != data_stress.len() || pred_strain.len() != pred_stress.len() {
        return Err("strain and stress arrays must have the same length");
    }
    if pred_strain.is_empty() {
        return Err("the prediction must have at least one point");
    }
    let mut prediction = Curve::new();
    let mut data = Curve::new();
    prediction
        .set_label("Prediction")
        .set_line_style("-")
        .set_line_color("black")
        .set_line_width(style.line_width)
        .draw(&pred_strain.to_vec(), &pred_stress.to_vec());
    data.set_label("Data")
        .set_line_style("--")
        .set_line_color("red")
        .set_line_width(style.data_line_width())
        .draw(&data_strain.to_vec(), &data_stress.to_vec());
    let (x_min, x_max) = limits(pred_strain);
    let (y_min, y_max) = limits(pred_stress);
    let mut plot = Plot::new();
    plot.add(&prediction)
        .add(&data)
        .add(&style.legend())
        .grid_and_labels("$\\epsilon_{\\mathrm{nominal}}$ [-]", "$\\sigma_{\\mathrm{nominal}}$ [MPa]")
        .set_range(x_min, x_max, y_min, y_max)
        .set_figure_size_points(style.width, style.height)
        .save(full_path)
}

/// Plots the tangent of the predicted stress-strain curve and the elastic modulus
pub fn plot_tangent_modulus(
    strain: &[f64],
    stress: &[f64],
    modulus: f64,
    full_path: &Path,
    style: &PlotStyle,
) -> Result<(), StrError> {
    let tangent = gradient(stress, strain)?;
    let (x_min, x_max) = limits(strain);
    let mut prediction = Curve::new();
    let mut elastic = Curve::new();
    prediction
        .set_label("Prediction")
        .set_line_style("-")
        .set_line_color("black")
        .set_line_width(style.line_width)
        .draw(&strain.to_vec(), &tangent);
    elastic
        .set_label("Elastic modulus")
        .set_line_style("--")
        .set_line_color("red")
        .set_line_width(style.data_line_width())
        .draw(&vec![x_min, x_max], &vec![modulus, modulus]);
    let mut plot = Plot::new();
    plot.add(&prediction)
        .add(&elastic)
        .add(&style.legend())
        .grid_and_labels("$\\epsilon_{\\mathrm{nominal}}$ [-]", "$E_{\\mathrm{tangent}}$ [MPa]")
        .set_xrange(x_min, x_max)
        .set_figure_size_points(style.width, style.height)
        .save(full_path)
}

/// Plots the objective and the constraint violation along the iterations
pub fn plot_history(history: &History, full_path: &Path, style: &PlotStyle) -> Result<(), StrError> {
    if history.is_empty() {
        return Err("the history must have at least one entry");
    }
    let iterations: Vec<f64> = (0..history.len()).map(|i| i as f64).collect();
    let objective: Vec<f64> = history.objective.iter().map(|f| f64::max(*f, LOG_FLOOR)).collect();
    let violation: Vec<f64> = history.violation.iter().map(|v| f64::max(*v, LOG_FLOOR)).collect();
    let mut curve_f = Curve::new();
    let mut curve_v = Curve::new();
    curve_f
        .set_line_color("black")
        .set_line_width(style.data_line_width())
        .set_marker_style(".")
        .draw(&iterations, &objective);
    curve_v
        .set_line_color("red")
        .set_line_width(style.data_line_width())
        .set_marker_style(".")
        .draw(&iterations, &violation);
    let mut plot = Plot::new();
    plot.set_subplot(2, 1, 1)
        .set_log_y(true)
        .add(&curve_f)
        .grid_and_labels("iteration", "objective");
    plot.set_subplot(2, 1, 2)
        .set_log_y(true)
        .add(&curve_v)
        .grid_and_labels("iteration", "constraint violation");
    plot.set_figure_size_points(style.width, style.height).save(full_path)
}

/// Draws a two-column table with the parameter names and values
pub fn plot_parameter_table<S: AsRef<str>>(
    names: &[S],
    values: &[f64],
    full_path: &Path,
    style: &PlotStyle,
) -> Result<(), StrError> {
    if names.len() != values.len() {
        return Err("names and values must have the same length");
    }
    let n_rows = names.len() + 1;
    let mut header = Text::new();
    let mut cells = Text::new();
    header
        .set_fontsize(style.fontsize)
        .set_align_horizontal("center")
        .set_align_vertical("center");
    cells
        .set_fontsize(style.fontsize)
        .set_align_horizontal("center")
        .set_align_vertical("center");
    let top = n_rows as f64 - 0.5;
    header.draw(0.5, top, "Parameter");
    header.draw(1.5, top, "Value");
    for (i, (name, value)) in names.iter().zip(values).enumerate() {
        let y = top - (i + 1) as f64;
        cells.draw(0.5, y, name.as_ref());
        cells.draw(1.5, y, &format!("{:.6e}", value));
    }
    let mut rules = Curve::new();
    rules.set_line_color("black").set_line_width(1.0);
    for k in 0..=n_rows {
        let y = k as f64;
        rules.draw(&vec![0.0, 2.0], &vec![y, y]);
    }
    for x in [0.0, 1.0, 2.0] {
        rules.draw(&vec![x, x], &vec![0.0, n_rows as f64]);
    }
    let mut plot = Plot::new();
    plot.add(&rules)
        .add(&header)
        .add(&cells)
        .set_range(-0.05, 2.05, -0.05, n_rows as f64 + 0.05)
        .set_hide_axes(true)
        .set_figure_size_points(style.width, 0.5 * style.width * (n_rows as f64) / 4.0 + 50.0)
        .save(full_path)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
