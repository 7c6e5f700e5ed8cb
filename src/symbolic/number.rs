use std::fmt;

/// Holds a numeric literal of a symbolic expression
///
/// Integers and rationals are exact. Operations that overflow `i64`
/// fall back to [Number::Real].
#[derive(Clone, Copy, Debug)]
pub enum Number {
    /// Exact integer
    Int(i64),

    /// Exact rational `p/q` in lowest terms with `q > 1`
    Rational(i64, i64),

    /// Double precision value
    Real(f64),
}

/// Returns the greatest common divisor (always non-negative)
fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a as i64
}

impl Number {
    /// Allocates a new rational number in lowest terms
    ///
    /// Returns [Number::Int] if the denominator divides the numerator.
    pub fn rational(p: i64, q: i64) -> Self {
        if q == 0 {
            return Number::Real(p as f64 / 0.0);
        }
        let g = gcd(p, q);
        let (mut p, mut q) = (p / g, q / g);
        if q < 0 {
            p = -p;
            q = -q;
        }
        if q == 1 {
            Number::Int(p)
        } else {
            Number::Rational(p, q)
        }
    }

    /// Returns the numerator and denominator if the number is exact
    fn ratio(&self) -> Option<(i64, i64)> {
        match *self {
            Number::Int(n) => Some((n, 1)),
            Number::Rational(p, q) => Some((p, q)),
            Number::Real(_) => None,
        }
    }

    /// Returns the value as f64
    pub fn value(&self) -> f64 {
        match *self {
            Number::Int(n) => n as f64,
            Number::Rational(p, q) => p as f64 / q as f64,
            Number::Real(v) => v,
        }
    }

    /// Returns true if the number is an exact integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Int(_))
    }

    /// Returns true if the value equals zero
    pub fn is_zero(&self) -> bool {
        self.value() == 0.0
    }

    /// Returns true if the value equals one
    pub fn is_one(&self) -> bool {
        self.value() == 1.0
    }

    /// Returns true if the value is negative
    pub fn is_negative(&self) -> bool {
        self.value() < 0.0
    }

    /// Returns the sum
    pub fn add(self, other: Number) -> Number {
        match (self.ratio(), other.ratio()) {
            (Some((p1, q1)), Some((p2, q2))) => {
                let num = p1
                    .checked_mul(q2)
                    .and_then(|a| p2.checked_mul(q1).and_then(|b| a.checked_add(b)));
                let den = q1.checked_mul(q2);
                match (num, den) {
                    (Some(p), Some(q)) => Number::rational(p, q),
                    _ => Number::Real(self.value() + other.value()),
                }
            }
            _ => Number::Real(self.value() + other.value()),
        }
    }

    /// Returns the product
    pub fn mul(self, other: Number) -> Number {
        match (self.ratio(), other.ratio()) {
            (Some((p1, q1)), Some((p2, q2))) => match (p1.checked_mul(p2), q1.checked_mul(q2)) {
                (Some(p), Some(q)) => Number::rational(p, q),
                _ => Number::Real(self.value() * other.value()),
            },
            _ => Number::Real(self.value() * other.value()),
        }
    }

    /// Returns the additive inverse
    pub fn neg(self) -> Number {
        match self {
            Number::Int(n) => match n.checked_neg() {
                Some(m) => Number::Int(m),
                None => Number::Real(-(n as f64)),
            },
            Number::Rational(p, q) => Number::Rational(-p, q),
            Number::Real(v) => Number::Real(-v),
        }
    }

    /// Returns the multiplicative inverse
    pub fn recip(self) -> Number {
        match self.ratio() {
            Some((p, q)) => Number::rational(q, p),
            None => Number::Real(1.0 / self.value()),
        }
    }

    /// Computes self raised to the power `exponent`
    ///
    /// Returns None if the result cannot be represented as a number without
    /// losing the exactness of the expression (e.g., `2^(1/2)`) or if the result
    /// is not real (negative base with a fractional exponent).
    pub fn pow(self, exponent: Number) -> Option<Number> {
        if let Number::Int(k) = exponent {
            if let Some((p, q)) = self.ratio() {
                if p == 0 && k < 0 {
                    return None;
                }
                let e = u32::try_from(k.unsigned_abs()).ok()?;
                return match (p.checked_pow(e), q.checked_pow(e)) {
                    (Some(a), Some(b)) => Some(if k >= 0 {
                        Number::rational(a, b)
                    } else {
                        Number::rational(b, a)
                    }),
                    _ => Some(Number::Real(self.value().powf(k as f64))),
                };
            }
            let e = i32::try_from(k).ok()?;
            return Some(Number::Real(self.value().powi(e)));
        }
        if self.is_one() {
            return Some(Number::Int(1));
        }
        let exact = self.ratio().is_some() && exponent.ratio().is_some();
        if exact || self.value() <= 0.0 {
            return None;
        }
        Some(Number::Real(self.value().powf(exponent.value())))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.ratio(), other.ratio()) {
            (Some(a), Some(b)) => a == b,
            _ => self.value() == other.value(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Rational(p, q) => write!(f, "{}/{}", p, q),
            Number::Real(v) => write!(f, "{:?}", v),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
