use hypercal::codegen::{
    generate_vumat, MarkerPolicy, VumatOptions, MARKER_DECLARATION, MARKER_DERIVATIVES, MARKER_ENERGY,
    MARKER_PARAMETERS,
};
use hypercal::mechanics::{Formulation, HyperelasticModel};
use hypercal::StrError;
use std::fs;

const TEMPLATE_DIR: &str = "data/templates";

#[test]
fn test_vumat_incompressible_keeps_template_text() -> Result<(), StrError> {
    let model = HyperelasticModel::new(
        "C10*(I1b - 3) + C01*(I2b - 3)",
        &["C10", "C01"],
        Formulation::Incompressible,
    )?;
    let (exprs, names) = model.derivatives();
    let options = VumatOptions::new(TEMPLATE_DIR, "/tmp/hypercal/test_vumat_incompressible");
    let template_name = "VUMAT_2D_planestrain_incompressible_template.f";
    let path = generate_vumat(&model.energy, &model.params, &exprs, &names, template_name, &options)?;
    assert!(path.ends_with("VUMAT_2D_planestrain_incompressible_modified.f"));

    let template = fs::read_to_string(format!("{}/{}", TEMPLATE_DIR, template_name)).map_err(|_| "cannot read")?;
    let output = fs::read_to_string(&path).map_err(|_| "cannot read")?;
    assert!(!output.contains("*** INPUT FROM PYTHON PROGRAM ***"));

    // walk both files: every line except the markers is copied verbatim
    let mut out = output.lines();
    for line in template.lines() {
        if line.contains(MARKER_ENERGY) {
            let energy = format!("W = {}", model.energy);
            assert_eq!(out.next(), Some(line.replace(MARKER_ENERGY, &energy).as_str()));
        } else if line == MARKER_PARAMETERS {
            assert_eq!(out.next(), Some("      C10 = props(1)"));
            assert_eq!(out.next(), Some("      C01 = props(2)"));
        } else if line == MARKER_DERIVATIVES {
            assert_eq!(out.next(), Some("      dWdI1 = C10"));
            assert_eq!(out.next(), Some("      dWdI2 = C01"));
        } else if line == MARKER_DECLARATION {
            assert_eq!(out.next(), Some("      Real*8 C10, C01"));
        } else {
            assert_eq!(out.next(), Some(line));
        }
    }
    assert_eq!(out.next(), None);
    Ok(())
}

#[test]
fn test_vumat_general_promotes_integers() -> Result<(), StrError> {
    let model = HyperelasticModel::new(
        "C10*(I1b - 3) + C01*(I2b - 3) + C20*(I1b - 3)**2 + (J - 1)**2/D1",
        &["C10", "C01", "C20", "D1"],
        Formulation::General,
    )?;
    let (exprs, names) = model.derivatives();
    let options = VumatOptions::new(TEMPLATE_DIR, "/tmp/hypercal/test_vumat_general");
    let path = generate_vumat(
        &model.energy,
        &model.params,
        &exprs,
        &names,
        "VUMAT_2D_planestrain_template.f",
        &options,
    )?;
    let output = fs::read_to_string(&path).map_err(|_| "cannot read")?;
    let lines: Vec<&str> = output.lines().collect();
    assert!(lines.contains(&"      dWdI1 = C10 + C20*(2.0d0*I1b - 6.0d0)"));
    assert!(lines.contains(&"      dWdI2 = C01"));
    assert!(lines.contains(&"      dWdJ1 = (2.0d0*J - 2.0d0)/D1"));
    assert!(lines.contains(&"      D1  = props(4)"));
    assert!(lines.contains(&"      Real*8 C10, C01, C20, D1"));
    Ok(())
}

#[test]
fn test_vumat_strict_markers() -> Result<(), StrError> {
    // template without the declaration marker
    let dir = "/tmp/hypercal/test_vumat_strict";
    fs::create_dir_all(dir).map_err(|_| "cannot create directory")?;
    let text = format!(
        "C     {}\n{}\n{}\n      end\n",
        MARKER_ENERGY, MARKER_PARAMETERS, MARKER_DERIVATIVES
    );
    fs::write(format!("{}/broken_template.f", dir), text).map_err(|_| "cannot write")?;

    let model = HyperelasticModel::new("C10*(I1b - 3)", &["C10"], Formulation::Incompressible)?;
    let (exprs, names) = model.derivatives();
    let mut options = VumatOptions::new(dir, dir);
    assert_eq!(
        generate_vumat(&model.energy, &model.params, &exprs, &names, "broken_template.f", &options).err(),
        Some("template marker is missing")
    );

    // the lenient policy skips the missing marker
    options.policy = MarkerPolicy::Lenient;
    let path = generate_vumat(&model.energy, &model.params, &exprs, &names, "broken_template.f", &options)?;
    let output = fs::read_to_string(&path).map_err(|_| "cannot read")?;
    assert_eq!(
        output,
        "C     W = C10*(I1b - 3)\n      C10 = props(1)\n      dWdI1 = C10\n      dWdI2 = 0.0d0\n      end\n"
    );
    Ok(())
}
