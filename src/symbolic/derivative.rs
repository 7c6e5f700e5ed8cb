use super::Expr;

impl Expr {
    /// Returns the symbolic derivative with respect to the symbol `var`
    ///
    /// The result is built with the canonical constructors, hence terms
    /// not depending on `var` vanish from sums and products.
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Num(_) => Expr::int(0),
            Expr::Sym(s) => {
                if s == var {
                    Expr::int(1)
                } else {
                    Expr::int(0)
                }
            }
            Expr::Add(terms) => Expr::add(terms.iter().map(|t| t.diff(var)).collect()),
            Expr::Mul(factors) => {
                // product rule
                let mut terms = Vec::new();
                for (i, factor) in factors.iter().enumerate() {
                    let d = factor.diff(var);
                    if d.is_zero() {
                        continue;
                    }
                    let mut product = factors.clone();
                    product[i] = d;
                    terms.push(Expr::mul(product));
                }
                Expr::add(terms)
            }
            Expr::Pow(base, exponent) => {
                let db = base.diff(var);
                if !exponent.contains(var) {
                    if db.is_zero() {
                        return Expr::int(0);
                    }
                    // e·b^(e-1)·b'
                    let reduced = Expr::add(vec![(**exponent).clone(), Expr::int(-1)]);
                    return Expr::mul(vec![(**exponent).clone(), Expr::pow((**base).clone(), reduced), db]);
                }
                // b^e·(e'·ln(b) + e·b'/b)
                let de = exponent.diff(var);
                let from_exponent = Expr::mul(vec![de, Expr::ln((**base).clone())]);
                let from_base = Expr::mul(vec![
                    (**exponent).clone(),
                    db,
                    Expr::pow((**base).clone(), Expr::int(-1)),
                ]);
                Expr::mul(vec![self.clone(), Expr::add(vec![from_exponent, from_base])])
            }
            Expr::Exp(arg) => Expr::mul(vec![self.clone(), arg.diff(var)]),
            Expr::Ln(arg) => Expr::mul(vec![arg.diff(var), Expr::pow((**arg).clone(), Expr::int(-1))]),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use crate::symbolic::{parse, Expr};
    use russell_lab::approx_eq;
    use std::collections::HashMap;

    fn eval(e: &Expr, pairs: &[(&'static str, f64)]) -> f64 {
        let values: HashMap<&str, f64> = pairs.iter().copied().collect();
        e.evaluate(&values).unwrap()
    }

    #[test]
    fn diff_polynomial_works() {
        let w = parse("C10*(I1b - 3) + C20*(I1b - 3)**2").unwrap();
        let d = w.diff("I1b");
        let expected = parse("C10 + C20*(2*I1b - 6)").unwrap();
        assert_eq!(d, expected);
        assert_eq!(w.diff("J"), Expr::int(0));
    }

    #[test]
    fn diff_reciprocal_works() {
        let w = parse("(J - 1)**2/D1").unwrap();
        let d = w.diff("J");
        let pairs = [("J", 1.3), ("D1", 0.2)];
        approx_eq(eval(&d, &pairs), 2.0 * 0.3 / 0.2, 1e-14);
    }

    #[test]
    fn diff_fractional_power_works() {
        let e = parse("(x*y)**(-2/3)*(x**2 + y**2)").unwrap();
        let d = e.diff("x");
        let (x, y) = (1.1, 0.9);
        let ana = -2.0 / 3.0 * f64::powf(x * y, -5.0 / 3.0) * y * (x * x + y * y)
            + f64::powf(x * y, -2.0 / 3.0) * 2.0 * x;
        approx_eq(eval(&d, &[("x", x), ("y", y)]), ana, 1e-14);
    }

    #[test]
    fn diff_exp_ln_works() {
        let e = parse("exp(a*x) + ln(x**2)").unwrap();
        let d = e.diff("x");
        let (a, x) = (0.5, 2.0);
        approx_eq(eval(&d, &[("a", a), ("x", x)]), a * f64::exp(a * x) + 2.0 / x, 1e-14);
    }

    #[test]
    fn diff_variable_exponent_works() {
        let e = parse("x**x").unwrap();
        let d = e.diff("x");
        let x: f64 = 1.7;
        approx_eq(eval(&d, &[("x", x)]), x.powf(x) * (x.ln() + 1.0), 1e-13);
    }
}
