use super::{Expr, Number};
use std::fmt;

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

/// Defines the target language when printing expressions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeStyle {
    /// Python-like syntax, e.g., `C10*(I1b - 3) + (J - 1)**2/D1`
    Python,

    /// Fortran syntax with double precision literals, e.g., `2.0d0*x**(1.0d0/3.0d0)`
    Fortran,
}

/// Formats a real number as a Fortran double precision literal (e.g., `2.0d0`, `1.0d-5`)
pub fn fortran_real(value: f64) -> String {
    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            if mantissa.contains('.') {
                format!("{}d{}", mantissa, exponent)
            } else {
                format!("{}.0d{}", mantissa, exponent)
            }
        }
        None => format!("{}d0", text),
    }
}

/// Returns true if the exponent of a power is a negative number
fn has_negative_exponent(exponent: &Expr) -> bool {
    exponent.as_number().map_or(false, |n| n.is_negative())
}

/// Returns the binding strength of the printed expression
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Num(n) => {
            if n.is_negative() || matches!(n, Number::Rational(..)) {
                PREC_MUL
            } else {
                PREC_ATOM
            }
        }
        Expr::Sym(_) | Expr::Exp(_) | Expr::Ln(_) => PREC_ATOM,
        Expr::Add(_) => PREC_ADD,
        Expr::Mul(_) => PREC_MUL,
        Expr::Pow(_, exponent) => {
            if has_negative_exponent(exponent) {
                PREC_MUL
            } else {
                PREC_POW
            }
        }
    }
}

/// Splits a term of a sum into its sign and magnitude
fn split_sign(term: &Expr) -> (bool, Expr) {
    match term {
        Expr::Num(n) if n.is_negative() => (true, Expr::Num(n.neg())),
        Expr::Mul(factors) => match factors.first() {
            Some(Expr::Num(n)) if n.is_negative() => {
                let positive = n.neg();
                let mut rest: Vec<Expr> = factors[1..].to_vec();
                if !positive.is_one() {
                    rest.insert(0, Expr::Num(positive));
                }
                if rest.len() == 1 {
                    (true, rest.swap_remove(0))
                } else {
                    (true, Expr::Mul(rest))
                }
            }
            _ => (false, term.clone()),
        },
        _ => (false, term.clone()),
    }
}

struct Printer {
    style: CodeStyle,
}

impl Printer {
    fn integer(&self, value: i64) -> String {
        match self.style {
            CodeStyle::Python => value.to_string(),
            CodeStyle::Fortran => fortran_real(value as f64),
        }
    }

    fn number(&self, n: Number) -> String {
        match (self.style, n) {
            (CodeStyle::Python, _) => n.to_string(),
            (CodeStyle::Fortran, Number::Int(k)) => k.to_string(),
            (CodeStyle::Fortran, Number::Rational(p, q)) => format!("{}/{}", self.integer(p), self.integer(q)),
            (CodeStyle::Fortran, Number::Real(v)) => fortran_real(v),
        }
    }

    fn wrap(&self, expr: &Expr, min_precedence: u8) -> String {
        let text = self.print(expr);
        if precedence(expr) < min_precedence {
            format!("({})", text)
        } else {
            text
        }
    }

    fn print(&self, expr: &Expr) -> String {
        match expr {
            Expr::Num(n) => self.number(*n),
            Expr::Sym(s) => s.clone(),
            Expr::Add(terms) => {
                let mut out = String::new();
                for (i, term) in terms.iter().enumerate() {
                    let (negative, magnitude) = split_sign(term);
                    if i == 0 {
                        if negative {
                            out.push('-');
                        }
                    } else if negative {
                        out.push_str(" - ");
                    } else {
                        out.push_str(" + ");
                    }
                    out.push_str(&self.wrap(&magnitude, PREC_MUL));
                }
                out
            }
            Expr::Mul(factors) => self.product(factors),
            Expr::Pow(base, exponent) => {
                if has_negative_exponent(exponent) {
                    return self.product(std::slice::from_ref(expr));
                }
                format!("{}**{}", self.wrap(base, PREC_ATOM), self.wrap(exponent, PREC_ATOM))
            }
            Expr::Exp(arg) => format!("exp({})", self.print(arg)),
            Expr::Ln(arg) => format!("log({})", self.print(arg)),
        }
    }

    /// Prints a product as `sign numerator/denominator`
    fn product(&self, factors: &[Expr]) -> String {
        let mut negative = false;
        let mut numerator = Vec::new();
        let mut denominator = Vec::new();
        for factor in factors {
            match factor {
                Expr::Num(n) => {
                    let mut n = *n;
                    if n.is_negative() {
                        negative = !negative;
                        n = n.neg();
                    }
                    match n {
                        Number::Rational(p, q) => {
                            if p != 1 {
                                numerator.push(self.integer(p));
                            }
                            denominator.push(self.integer(q));
                        }
                        _ if n.is_one() => (),
                        _ => numerator.push(self.number(n)),
                    }
                }
                Expr::Pow(base, exponent) if has_negative_exponent(exponent) => {
                    let positive = exponent.as_number().map(|e| e.neg()).unwrap_or(Number::Int(1));
                    let inverse = Expr::pow((**base).clone(), Expr::Num(positive));
                    denominator.push(self.wrap(&inverse, PREC_POW));
                }
                other => numerator.push(self.wrap(other, PREC_MUL)),
            }
        }
        let top = if numerator.is_empty() {
            self.integer(1)
        } else {
            numerator.join("*")
        };
        let text = match denominator.len() {
            0 => top,
            1 => format!("{}/{}", top, denominator[0]),
            _ => format!("{}/({})", top, denominator.join("*")),
        };
        if negative {
            format!("-{}", text)
        } else {
            text
        }
    }
}

impl Expr {
    /// Prints the expression as source code
    pub fn to_code(&self, style: CodeStyle) -> String {
        Printer { style }.print(self)
    }

    /// Prints the expression as Fortran source code
    ///
    /// Integer literals are printed as they are; see [crate::codegen::promote_integers]
    /// to convert them to double precision first.
    pub fn to_fortran(&self) -> String {
        self.to_code(CodeStyle::Fortran)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_code(CodeStyle::Python))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
