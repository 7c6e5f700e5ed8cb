use super::Number;
use std::collections::{BTreeSet, HashMap};
use std::ops;

/// Holds a symbolic expression
///
/// Build expressions with the smart constructors ([Expr::add], [Expr::mul], [Expr::pow], ...)
/// or with the arithmetic operators; both keep the expression in canonical form:
///
/// * sums and products are flattened and numbers are folded
/// * like terms (`x + 2*x → 3*x`) and like factors (`x*x**2 → x**3`) are combined
/// * the numeric coefficient is the first factor of a product
/// * the numeric constant is the last term of a sum
/// * a numeric coefficient multiplying a single sum is distributed (`2*(x + 1) → 2*x + 2`)
/// * integer powers of products are distributed (`(x*y)**2 → x**2*y**2`)
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numeric literal
    Num(Number),

    /// Named symbol
    Sym(String),

    /// Sum of terms
    Add(Vec<Expr>),

    /// Product of factors
    Mul(Vec<Expr>),

    /// Base raised to an exponent
    Pow(Box<Expr>, Box<Expr>),

    /// Exponential function
    Exp(Box<Expr>),

    /// Natural logarithm
    Ln(Box<Expr>),
}

impl Expr {
    /// Allocates an integer literal
    pub fn int(n: i64) -> Self {
        Expr::Num(Number::Int(n))
    }

    /// Allocates an exact rational literal p/q
    pub fn rational(p: i64, q: i64) -> Self {
        Expr::Num(Number::rational(p, q))
    }

    /// Allocates a floating-point literal
    pub fn real(value: f64) -> Self {
        Expr::Num(Number::Real(value))
    }

    /// Allocates a symbol
    pub fn symbol(name: &str) -> Self {
        Expr::Sym(name.to_string())
    }

    /// Returns the numeric value if this is a literal
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Expr::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns true if this is a literal equal to zero
    pub fn is_zero(&self) -> bool {
        self.as_number().map_or(false, |n| n.is_zero())
    }

    /// Returns true if this is a literal equal to one
    pub fn is_one(&self) -> bool {
        self.as_number().map_or(false, |n| n.is_one())
    }

    /// Returns the canonical sum of all terms
    pub fn add(terms: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                Expr::Add(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        let mut constant = Number::Int(0);
        let mut collected: Vec<(Number, Expr)> = Vec::new();
        for term in flat {
            if let Expr::Num(n) = term {
                constant = constant.add(n);
                continue;
            }
            let (coefficient, rest) = term.split_coefficient();
            match collected.iter_mut().find(|(_, r)| *r == rest) {
                Some((c, _)) => *c = c.add(coefficient),
                None => collected.push((coefficient, rest)),
            }
        }
        let mut out: Vec<Expr> = collected
            .into_iter()
            .filter(|(c, _)| !c.is_zero())
            .map(|(c, rest)| Expr::with_coefficient(c, rest))
            .collect();
        if !constant.is_zero() {
            out.push(Expr::Num(constant));
        }
        match out.len() {
            0 => Expr::int(0),
            1 => out.swap_remove(0),
            _ => Expr::Add(out),
        }
    }

    /// Returns the canonical product of all factors
    pub fn mul(factors: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(factors.len());
        for factor in factors {
            match factor {
                Expr::Mul(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        let mut coefficient = Number::Int(1);
        let mut collected: Vec<(Expr, Expr)> = Vec::new();
        for factor in flat {
            if let Expr::Num(n) = factor {
                coefficient = coefficient.mul(n);
                continue;
            }
            let (base, exponent) = factor.split_power();
            match collected.iter_mut().find(|(b, _)| *b == base) {
                Some((_, e)) => *e = Expr::add(vec![e.clone(), exponent]),
                None => collected.push((base, exponent)),
            }
        }
        if coefficient.is_zero() {
            return Expr::Num(coefficient);
        }
        let mut out = Vec::with_capacity(collected.len());
        for (base, exponent) in collected {
            match Expr::pow(base, exponent) {
                Expr::Num(n) => coefficient = coefficient.mul(n),
                Expr::Mul(inner) => {
                    for f in inner {
                        match f {
                            Expr::Num(n) => coefficient = coefficient.mul(n),
                            other => out.push(other),
                        }
                    }
                }
                other => out.push(other),
            }
        }
        if coefficient.is_zero() {
            return Expr::Num(coefficient);
        }
        if out.is_empty() {
            return Expr::Num(coefficient);
        }
        if out.len() == 1 {
            let single = out.swap_remove(0);
            if coefficient.is_one() {
                return single;
            }
            if let Expr::Add(terms) = single {
                let distributed = terms
                    .into_iter()
                    .map(|t| Expr::mul(vec![Expr::Num(coefficient), t]))
                    .collect();
                return Expr::add(distributed);
            }
            return Expr::Mul(vec![Expr::Num(coefficient), single]);
        }
        if !coefficient.is_one() {
            out.insert(0, Expr::Num(coefficient));
        }
        Expr::Mul(out)
    }

    /// Returns the canonical power `base**exponent`
    pub fn pow(base: Expr, exponent: Expr) -> Expr {
        if let Some(e) = exponent.as_number() {
            if e.is_zero() {
                return Expr::int(1);
            }
            if e.is_one() {
                return base;
            }
            if let Some(b) = base.as_number() {
                if let Some(value) = b.pow(e) {
                    return Expr::Num(value);
                }
            }
            if e.is_integer() {
                match base {
                    Expr::Pow(inner_base, inner_exponent) => {
                        let combined = Expr::mul(vec![*inner_exponent, Expr::Num(e)]);
                        return Expr::pow(*inner_base, combined);
                    }
                    Expr::Mul(factors) => {
                        let powers = factors.into_iter().map(|f| Expr::pow(f, Expr::Num(e))).collect();
                        return Expr::mul(powers);
                    }
                    other => return Expr::Pow(Box::new(other), Box::new(exponent)),
                }
            }
        }
        if base.is_one() {
            return Expr::int(1);
        }
        Expr::Pow(Box::new(base), Box::new(exponent))
    }

    /// Returns the exponential function of the argument
    pub fn exp(arg: Expr) -> Expr {
        match arg {
            Expr::Ln(inner) => *inner,
            a if a.is_zero() => Expr::int(1),
            Expr::Num(Number::Real(v)) => Expr::real(v.exp()),
            a => Expr::Exp(Box::new(a)),
        }
    }

    /// Returns the natural logarithm of the argument
    pub fn ln(arg: Expr) -> Expr {
        match arg {
            Expr::Exp(inner) => *inner,
            a if a.is_one() => Expr::int(0),
            Expr::Num(Number::Real(v)) if v > 0.0 => Expr::real(v.ln()),
            a => Expr::Ln(Box::new(a)),
        }
    }

    /// Returns the square root (as a power with exponent 1/2)
    pub fn sqrt(arg: Expr) -> Expr {
        Expr::pow(arg, Expr::rational(1, 2))
    }

    /// Splits a term into its numeric coefficient and the remaining product
    pub(crate) fn split_coefficient(self) -> (Number, Expr) {
        match self {
            Expr::Num(n) => (n, Expr::int(1)),
            Expr::Mul(mut factors) => {
                if let Some(Expr::Num(n)) = factors.first() {
                    let coefficient = *n;
                    factors.remove(0);
                    let rest = if factors.len() == 1 {
                        factors.swap_remove(0)
                    } else {
                        Expr::Mul(factors)
                    };
                    (coefficient, rest)
                } else {
                    (Number::Int(1), Expr::Mul(factors))
                }
            }
            other => (Number::Int(1), other),
        }
    }

    /// Splits a factor into base and exponent
    fn split_power(self) -> (Expr, Expr) {
        match self {
            Expr::Pow(base, exponent) => (*base, *exponent),
            other => (other, Expr::int(1)),
        }
    }

    /// Re-attaches a numeric coefficient to a product without re-simplifying it
    fn with_coefficient(coefficient: Number, rest: Expr) -> Expr {
        if coefficient.is_one() {
            return rest;
        }
        match rest {
            Expr::Mul(factors) => {
                let mut all = Vec::with_capacity(factors.len() + 1);
                all.push(Expr::Num(coefficient));
                all.extend(factors);
                Expr::Mul(all)
            }
            other => Expr::Mul(vec![Expr::Num(coefficient), other]),
        }
    }

    /// Returns true if the expression depends on the symbol
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Expr::Num(_) => false,
            Expr::Sym(s) => s == name,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(|e| e.contains(name)),
            Expr::Pow(b, e) => b.contains(name) || e.contains(name),
            Expr::Exp(a) | Expr::Ln(a) => a.contains(name),
        }
    }

    /// Returns the (sorted) names of all symbols in the expression
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_symbols(&mut names);
        names
    }

    fn collect_symbols(&self, names: &mut BTreeSet<String>) {
        match self {
            Expr::Num(_) => (),
            Expr::Sym(s) => {
                names.insert(s.clone());
            }
            Expr::Add(items) | Expr::Mul(items) => items.iter().for_each(|e| e.collect_symbols(names)),
            Expr::Pow(b, e) => {
                b.collect_symbols(names);
                e.collect_symbols(names);
            }
            Expr::Exp(a) | Expr::Ln(a) => a.collect_symbols(names),
        }
    }

    /// Substitutes symbols simultaneously and returns the canonical result
    ///
    /// Symbols that are not in `map` are kept. The replacement expressions are
    /// not themselves searched for further substitutions.
    pub fn subs(&self, map: &HashMap<String, Expr>) -> Expr {
        if !map.keys().any(|name| self.contains(name)) {
            return self.clone();
        }
        match self {
            Expr::Num(_) => self.clone(),
            Expr::Sym(s) => match map.get(s) {
                Some(replacement) => replacement.clone(),
                None => self.clone(),
            },
            Expr::Add(terms) => Expr::add(terms.iter().map(|t| t.subs(map)).collect()),
            Expr::Mul(factors) => Expr::mul(factors.iter().map(|f| f.subs(map)).collect()),
            Expr::Pow(b, e) => Expr::pow(b.subs(map), e.subs(map)),
            Expr::Exp(a) => Expr::exp(a.subs(map)),
            Expr::Ln(a) => Expr::ln(a.subs(map)),
        }
    }

    /// Replaces every numeric literal using `f`, keeping the structure untouched
    ///
    /// No simplification is performed; this is intended for printing.
    pub fn map_numbers<F>(&self, f: &F) -> Expr
    where
        F: Fn(Number) -> Number,
    {
        match self {
            Expr::Num(n) => Expr::Num(f(*n)),
            Expr::Sym(_) => self.clone(),
            Expr::Add(terms) => Expr::Add(terms.iter().map(|t| t.map_numbers(f)).collect()),
            Expr::Mul(factors) => Expr::Mul(factors.iter().map(|t| t.map_numbers(f)).collect()),
            Expr::Pow(b, e) => Expr::Pow(Box::new(b.map_numbers(f)), Box::new(e.map_numbers(f))),
            Expr::Exp(a) => Expr::Exp(Box::new(a.map_numbers(f))),
            Expr::Ln(a) => Expr::Ln(Box::new(a.map_numbers(f))),
        }
    }

    /// Evaluates the expression with the values of the symbols given by `values`
    pub fn evaluate(&self, values: &HashMap<&str, f64>) -> Option<f64> {
        match self {
            Expr::Num(n) => Some(n.value()),
            Expr::Sym(s) => values.get(s.as_str()).copied(),
            Expr::Add(terms) => terms.iter().try_fold(0.0, |acc, t| Some(acc + t.evaluate(values)?)),
            Expr::Mul(factors) => factors.iter().try_fold(1.0, |acc, t| Some(acc * t.evaluate(values)?)),
            Expr::Pow(b, e) => {
                let base = b.evaluate(values)?;
                match e.as_number() {
                    Some(Number::Int(k)) if i32::try_from(k).is_ok() => Some(base.powi(k as i32)),
                    _ => Some(base.powf(e.evaluate(values)?)),
                }
            }
            Expr::Exp(a) => Some(a.evaluate(values)?.exp()),
            Expr::Ln(a) => Some(a.evaluate(values)?.ln()),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::real(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::int(value)
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::symbol(name)
    }
}

impl ops::Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::add(vec![self, rhs])
    }
}

impl ops::Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::add(vec![self, Expr::mul(vec![Expr::int(-1), rhs])])
    }
}

impl ops::Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul(vec![self, rhs])
    }
}

impl ops::Div for Expr {
    type Output = Expr;
    fn div(self, rhs: Expr) -> Expr {
        Expr::mul(vec![self, Expr::pow(rhs, Expr::int(-1))])
    }
}

impl ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::mul(vec![Expr::int(-1), self])
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
