use crate::symbolic::{is_valid_identifier, Expr, Number};
use crate::StrError;
use std::ops::RangeInclusive;

/// Smallest integer literal promoted to double precision by default
pub const PROMOTION_MIN: i64 = -100;

/// Largest integer literal promoted to double precision by default
pub const PROMOTION_MAX: i64 = 100;

/// Last column of a fixed-form Fortran statement
pub const FIXED_FORM_LAST_COLUMN: usize = 72;

/// Prefix of a fixed-form continuation line (the marker is in column 6)
pub const CONTINUATION: &str = "     &";

/// Returns the default range of promoted integers (-100..=100)
pub fn default_promotion_range() -> RangeInclusive<i64> {
    PROMOTION_MIN..=PROMOTION_MAX
}

/// Converts the integer literals within `range` to double precision reals
///
/// Exponents are converted as well, e.g., `2*x**2` becomes `2.0d0*x**2.0d0` when printed.
pub fn promote_integers(expr: &Expr, range: &RangeInclusive<i64>) -> Expr {
    expr.map_numbers(&|n: Number| match n {
        Number::Int(k) if range.contains(&k) => Number::Real(k as f64),
        other => other,
    })
}

/// Splits a long statement into fixed-form lines with continuation markers
fn wrap_fixed_form(line: &str) -> String {
    if line.len() <= FIXED_FORM_LAST_COLUMN {
        return line.to_string();
    }
    let width = FIXED_FORM_LAST_COLUMN - CONTINUATION.len();
    let mut out = String::new();
    let mut rest = line;
    let mut limit = FIXED_FORM_LAST_COLUMN;
    while rest.len() > limit {
        let mut end = limit;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        // prefer to break before a blank; otherwise break at the column limit
        let cut = match rest[..end].rfind(' ') {
            Some(i) if i > limit / 2 => i,
            _ => end,
        };
        out.push_str(&rest[..cut]);
        out.push('\n');
        out.push_str(CONTINUATION);
        rest = &rest[cut..];
        limit = width;
    }
    out.push_str(rest);
    out
}

/// Generates Fortran assignment lines with double precision literals
///
/// Each line reads `<indent>{name:<5} = <expression>`. Lines longer than 72 columns
/// are continued on the next line with `&` in column 6.
///
/// # Input
///
/// * `names` -- the names of the assigned variables
/// * `exprs` -- the expressions (same length as `names`)
/// * `range` -- the integers to be promoted to double precision
/// * `indent` -- the number of spaces before the variable name
pub fn fortran_d0_lines<S: AsRef<str>>(
    names: &[S],
    exprs: &[Expr],
    range: &RangeInclusive<i64>,
    indent: usize,
) -> Result<String, StrError> {
    if names.len() != exprs.len() {
        return Err("names and expressions must have the same length");
    }
    if let Some(name) = names.iter().find(|n| !is_valid_identifier(n.as_ref())) {
        println!("ERROR: \"{}\" is not a valid Fortran name", name.as_ref());
        return Err("variable names must be ASCII identifiers");
    }
    let lines: Vec<String> = names
        .iter()
        .zip(exprs)
        .map(|(name, expr)| {
            let code = promote_integers(expr, range).to_fortran();
            let line = format!("{}{:<5} = {}", " ".repeat(indent), name.as_ref(), code);
            wrap_fixed_form(&line)
        })
        .collect();
    Ok(lines.join("\n"))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
