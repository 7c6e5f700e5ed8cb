use super::{default_promotion_range, fortran_d0_lines};
use crate::symbolic::Expr;
use crate::StrError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Marks the comment line receiving the strain-energy function
pub const MARKER_ENERGY: &str = "*** INPUT FROM PYTHON PROGRAM *** STRAIN ENERGY DEFINITION";

/// Marks the line receiving the assignments of the material parameters from `props`
pub const MARKER_PARAMETERS: &str = "C \t  *** INPUT FROM PYTHON PROGRAM *** MATERIAL PARAMETERS";

/// Marks the line receiving the derivatives of the strain-energy function
pub const MARKER_DERIVATIVES: &str = "C\t\t *** INPUT FROM PYTHON PROGRAM *** DERIVATIVE OF STRAIN-ENERGY FUNCTION";

/// Marks the line receiving the declaration of the material parameters
pub const MARKER_DECLARATION: &str = "C \t  *** INPUT FROM PYTHON PROGRAM *** MATERIAL INITIATION";

/// Suffix of template file names
pub const TEMPLATE_SUFFIX: &str = "_template.f";

/// Suffix of generated file names
pub const MODIFIED_SUFFIX: &str = "_modified.f";

/// Indentation of the generated Fortran statements (fixed-form code starts at column 7)
pub const STATEMENT_INDENT: usize = 6;

/// Defines how the template markers are checked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum MarkerPolicy {
    /// Every marker must appear exactly once
    Strict,

    /// Replaces the first occurrence of each marker, if any
    Lenient,
}

/// Holds the options of the VUMAT generation
#[derive(Clone, Debug)]
pub struct VumatOptions {
    /// Directory with the templates
    pub template_dir: PathBuf,

    /// Directory receiving the generated file
    pub output_dir: PathBuf,

    /// Checking of the markers
    pub policy: MarkerPolicy,

    /// Integers promoted to double precision
    pub promotion: RangeInclusive<i64>,
}

impl VumatOptions {
    /// Allocates a new instance with strict markers and default promotion
    pub fn new<P>(template_dir: &P, output_dir: &P) -> Self
    where
        P: AsRef<OsStr> + ?Sized,
    {
        VumatOptions {
            template_dir: Path::new(template_dir).to_path_buf(),
            output_dir: Path::new(output_dir).to_path_buf(),
            policy: MarkerPolicy::Strict,
            promotion: default_promotion_range(),
        }
    }
}

/// Holds the text of a Fortran template with substitution markers
#[derive(Clone, Debug)]
pub struct VumatTemplate {
    /// File name of the template (e.g., VUMAT_2D_planestrain_template.f)
    pub name: String,

    /// Full text
    text: String,
}

impl VumatTemplate {
    /// Allocates a new instance from text
    pub fn from_text(name: &str, text: &str) -> Self {
        VumatTemplate {
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    /// Reads a template file
    pub fn read<P>(full_path: &P) -> Result<Self, StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let text = fs::read_to_string(&path).map_err(|_| "cannot read template file")?;
        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().to_string(),
            None => return Err("template path must have a file name"),
        };
        Ok(VumatTemplate { name, text })
    }

    /// Returns the text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Counts the occurrences of a marker
    pub fn count(&self, marker: &str) -> usize {
        self.text.matches(marker).count()
    }

    /// Returns the text with each marker replaced once, in the given order
    ///
    /// With [MarkerPolicy::Strict], a marker that is missing or repeated is an error.
    /// With [MarkerPolicy::Lenient], missing markers are skipped and only the first
    /// occurrence of each marker is replaced.
    pub fn substitute(&self, replacements: &[(&str, String)], policy: MarkerPolicy) -> Result<String, StrError> {
        if policy == MarkerPolicy::Strict {
            for (marker, _) in replacements {
                match self.count(marker) {
                    1 => (),
                    0 => {
                        println!("ERROR: marker '{}' not found in {}", marker.escape_debug(), self.name);
                        return Err("template marker is missing");
                    }
                    n => {
                        println!("ERROR: marker '{}' found {} times in {}", marker.escape_debug(), n, self.name);
                        return Err("template marker is duplicated");
                    }
                }
            }
        }
        let mut text = self.text.clone();
        for (marker, replacement) in replacements {
            text = text.replacen(marker, replacement, 1);
        }
        Ok(text)
    }
}

/// Returns the name of the generated file (e.g., VUMAT_2D_planestrain_modified.f)
///
/// The stem is the part before the first `_template.f`; names without it are kept whole.
pub fn vumat_output_name(template_name: &str) -> String {
    let stem = match template_name.split_once(TEMPLATE_SUFFIX) {
        Some((stem, _)) => stem,
        None => template_name,
    };
    format!("{}{}", stem, MODIFIED_SUFFIX)
}

/// Returns the `props` assignment lines (e.g., `      C10 = props(1)`)
pub fn parameter_lines<S: AsRef<str>>(params: &[S]) -> String {
    params
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}{:<3} = props({})", " ".repeat(STATEMENT_INDENT), p.as_ref(), i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the declaration line (e.g., `      Real*8 C10, C01`)
pub fn declaration_line<S: AsRef<str>>(params: &[S]) -> String {
    let names: Vec<&str> = params.iter().map(|p| p.as_ref()).collect();
    format!("{}Real*8 {}", " ".repeat(STATEMENT_INDENT), names.join(", "))
}

/// Generates a VUMAT subroutine from a template
///
/// The four markers are replaced in this order: the strain-energy line, the `props`
/// assignments, the derivatives of the strain-energy function, and the declaration.
///
/// # Input
///
/// * `w` -- the strain-energy function
/// * `params` -- the material parameter names (in the order of `props`)
/// * `deriv_exprs` -- the derivatives of `w` (e.g., with respect to I1b, I2b, and J)
/// * `deriv_names` -- the Fortran variable names of the derivatives
/// * `template_name` -- the template file name, found in `options.template_dir`
/// * `options` -- the directories, marker policy, and promoted integers
///
/// # Output
///
/// Returns the path of the generated file, in `options.output_dir`
pub fn generate_vumat<S, T>(
    w: &Expr,
    params: &[S],
    deriv_exprs: &[Expr],
    deriv_names: &[T],
    template_name: &str,
    options: &VumatOptions,
) -> Result<PathBuf, StrError>
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    if params.is_empty() {
        return Err("at least one material parameter is required");
    }
    let template = VumatTemplate::read(&options.template_dir.join(template_name))?;
    let derivatives = fortran_d0_lines(deriv_names, deriv_exprs, &options.promotion, STATEMENT_INDENT)?;
    let replacements = [
        (MARKER_ENERGY, format!("W = {}", w)),
        (MARKER_PARAMETERS, parameter_lines(params)),
        (MARKER_DERIVATIVES, derivatives),
        (MARKER_DECLARATION, declaration_line(params)),
    ];
    let text = template.substitute(&replacements, options.policy)?;
    fs::create_dir_all(&options.output_dir).map_err(|_| "cannot create directory")?;
    let path = options.output_dir.join(vumat_output_name(template_name));
    let mut file = File::create(&path).map_err(|_| "cannot create file")?;
    file.write_all(text.as_bytes()).map_err(|_| "cannot write file")?;
    Ok(path)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse;

    fn sample_template() -> String {
        [
            "      subroutine vumat()",
            "C     *** INPUT FROM PYTHON PROGRAM *** STRAIN ENERGY DEFINITION",
            "C \t  *** INPUT FROM PYTHON PROGRAM *** MATERIAL INITIATION",
            "C \t  *** INPUT FROM PYTHON PROGRAM *** MATERIAL PARAMETERS",
            "C\t\t *** INPUT FROM PYTHON PROGRAM *** DERIVATIVE OF STRAIN-ENERGY FUNCTION",
            "      end",
        ]
        .join("\n")
    }

    #[test]
    fn vumat_output_name_works() {
        assert_eq!(
            vumat_output_name("VUMAT_2D_planestrain_template.f"),
            "VUMAT_2D_planestrain_modified.f"
        );
        assert_eq!(vumat_output_name("my_vumat.f"), "my_vumat.f_modified.f");
    }

    #[test]
    fn lines_work() {
        assert_eq!(
            parameter_lines(&["C10", "C01", "D1"]),
            "      C10 = props(1)\n      C01 = props(2)\n      D1  = props(3)"
        );
        assert_eq!(declaration_line(&["C10", "C01"]), "      Real*8 C10, C01");
    }

    #[test]
    fn substitute_works() {
        let template = VumatTemplate::from_text("t_template.f", &sample_template());
        let replacements = [
            (MARKER_ENERGY, "W = A".to_string()),
            (MARKER_PARAMETERS, "B".to_string()),
            (MARKER_DERIVATIVES, "C".to_string()),
            (MARKER_DECLARATION, "D".to_string()),
        ];
        let text = template.substitute(&replacements, MarkerPolicy::Strict).unwrap();
        assert_eq!(text, "      subroutine vumat()\nC     W = A\nD\nB\nC\n      end");
    }

    #[test]
    fn substitute_handles_markers() {
        let missing = VumatTemplate::from_text("t", "C     nothing here");
        let replacements = [(MARKER_ENERGY, "W = A".to_string())];
        assert_eq!(
            missing.substitute(&replacements, MarkerPolicy::Strict).err(),
            Some("template marker is missing")
        );
        assert_eq!(
            missing.substitute(&replacements, MarkerPolicy::Lenient).unwrap(),
            "C     nothing here"
        );
        let text = format!("{}\n{}", MARKER_ENERGY, MARKER_ENERGY);
        let twice = VumatTemplate::from_text("t", &text);
        assert_eq!(twice.count(MARKER_ENERGY), 2);
        assert_eq!(
            twice.substitute(&replacements, MarkerPolicy::Strict).err(),
            Some("template marker is duplicated")
        );
        assert_eq!(
            twice.substitute(&replacements, MarkerPolicy::Lenient).unwrap(),
            format!("W = A\n{}", MARKER_ENERGY)
        );
    }

    #[test]
    fn generate_vumat_works() {
        let dir = "/tmp/hypercal/vumat";
        fs::create_dir_all(dir).unwrap();
        fs::write(format!("{}/sample_template.f", dir), sample_template()).unwrap();
        let w = parse("C10*(I1b - 3) + C20*(I1b - 3)**2").unwrap();
        let derivs = [w.diff("I1b"), w.diff("I2b")];
        let options = VumatOptions::new(dir, dir);
        let path = generate_vumat(&w, &["C10", "C20"], &derivs, &["dWdI1", "dWdI2"], "sample_template.f", &options)
            .unwrap();
        assert_eq!(path, Path::new(dir).join("sample_modified.f"));
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "      subroutine vumat()");
        assert_eq!(lines[1], "C     W = C10*(I1b - 3) + C20*(I1b - 3)**2");
        assert_eq!(lines[2], "      Real*8 C10, C20");
        assert_eq!(lines[3], "      C10 = props(1)");
        assert_eq!(lines[4], "      C20 = props(2)");
        assert_eq!(lines[5], "      dWdI1 = C10 + C20*(2.0d0*I1b - 6.0d0)");
        assert_eq!(lines[6], "      dWdI2 = 0.0d0");
        assert_eq!(lines[7], "      end");
        assert_eq!(
            generate_vumat(&w, &["C10"], &derivs, &["dWdI1", "dWdI2"], "missing_template.f", &options).err(),
            Some("cannot read template file")
        );
    }
}
