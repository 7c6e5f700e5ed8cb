use super::{Expr, Number};
use crate::StrError;

/// Holds an argument of a broadcast call
#[derive(Clone, Copy, Debug)]
pub enum Arg<'a> {
    /// The same value is used for all evaluations
    Scalar(f64),

    /// One value per evaluation
    Array(&'a [f64]),
}

/// Defines the node of the numeric evaluation tree
#[derive(Clone, Debug)]
enum Node {
    Const(f64),
    Arg(usize),
    Add(Vec<Node>),
    Mul(Vec<Node>),
    PowInt(Box<Node>, i32),
    Pow(Box<Node>, Box<Node>),
    Exp(Box<Node>),
    Ln(Box<Node>),
}

impl Node {
    fn eval(&self, args: &[f64]) -> f64 {
        match self {
            Node::Const(v) => *v,
            Node::Arg(i) => args[*i],
            Node::Add(terms) => terms.iter().map(|t| t.eval(args)).sum(),
            Node::Mul(factors) => factors.iter().map(|f| f.eval(args)).product(),
            Node::PowInt(base, k) => base.eval(args).powi(*k),
            Node::Pow(base, exponent) => base.eval(args).powf(exponent.eval(args)),
            Node::Exp(arg) => arg.eval(args).exp(),
            Node::Ln(arg) => arg.eval(args).ln(),
        }
    }
}

/// Lowers a symbolic expression to a numeric function with positional arguments
///
/// The position of each argument is given by the order of the symbols passed
/// to [Lambdified::new].
///
/// # Examples
///
/// ```
/// use hypercal::symbolic::{parse, Arg, Lambdified};
/// use hypercal::StrError;
///
/// fn main() -> Result<(), StrError> {
///     let expr = parse("C10*(x**2 - 1)")?;
///     let f = Lambdified::new(&expr, &["C10", "x"])?;
///     assert_eq!(f.call(&[2.0, 3.0])?, 16.0);
///     let res = f.call_broadcast(&[Arg::Scalar(2.0), Arg::Array(&[1.0, 2.0, 3.0])])?;
///     assert_eq!(res, &[0.0, 6.0, 16.0]);
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Lambdified {
    node: Node,
    n_args: usize,
}

fn lower(expr: &Expr, symbols: &[String]) -> Result<Node, StrError> {
    let node = match expr {
        Expr::Num(n) => Node::Const(n.value()),
        Expr::Sym(name) => match symbols.iter().position(|s| s == name) {
            Some(index) => Node::Arg(index),
            None => {
                println!("ERROR: symbol \"{}\" is not in the list of arguments {:?}", name, symbols);
                return Err("expression has a symbol that is not an argument");
            }
        },
        Expr::Add(terms) => Node::Add(terms.iter().map(|t| lower(t, symbols)).collect::<Result<_, _>>()?),
        Expr::Mul(factors) => Node::Mul(factors.iter().map(|f| lower(f, symbols)).collect::<Result<_, _>>()?),
        Expr::Pow(base, exponent) => {
            let b = Box::new(lower(base, symbols)?);
            match exponent.as_number() {
                Some(Number::Int(k)) if i32::try_from(k).is_ok() => Node::PowInt(b, k as i32),
                _ => Node::Pow(b, Box::new(lower(exponent, symbols)?)),
            }
        }
        Expr::Exp(arg) => Node::Exp(Box::new(lower(arg, symbols)?)),
        Expr::Ln(arg) => Node::Ln(Box::new(lower(arg, symbols)?)),
    };
    Ok(node)
}

impl Lambdified {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `expr` -- the expression
    /// * `symbols` -- the names of the arguments, in positional order; every symbol
    ///   of `expr` must be listed, but the list may contain extra (unused) names
    pub fn new<S: AsRef<str>>(expr: &Expr, symbols: &[S]) -> Result<Self, StrError> {
        let names: Vec<String> = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                println!("ERROR: argument \"{}\" is repeated", name);
                return Err("the list of arguments has repeated names");
            }
        }
        let node = lower(expr, &names)?;
        Ok(Lambdified {
            node,
            n_args: names.len(),
        })
    }

    /// Returns the number of positional arguments
    pub fn n_args(&self) -> usize {
        self.n_args
    }

    /// Evaluates the function once
    pub fn call(&self, args: &[f64]) -> Result<f64, StrError> {
        if args.len() != self.n_args {
            return Err("the number of arguments is incorrect");
        }
        Ok(self.node.eval(args))
    }

    /// Evaluates the function for each entry of the array arguments
    ///
    /// Scalar arguments are broadcast. All array arguments must have the same
    /// length, which is the length of the result. If no argument is an array,
    /// the result has a single entry.
    pub fn call_broadcast(&self, args: &[Arg]) -> Result<Vec<f64>, StrError> {
        if args.len() != self.n_args {
            return Err("the number of arguments is incorrect");
        }
        let mut n = None;
        for arg in args {
            if let Arg::Array(values) = arg {
                match n {
                    None => n = Some(values.len()),
                    Some(m) if m != values.len() => return Err("array arguments must have the same length"),
                    Some(_) => (),
                }
            }
        }
        let n = n.unwrap_or(1);
        let mut buffer = vec![0.0; self.n_args];
        let mut results = Vec::with_capacity(n);
        for k in 0..n {
            for (slot, arg) in buffer.iter_mut().zip(args) {
                *slot = match arg {
                    Arg::Scalar(v) => *v,
                    Arg::Array(values) => values[k],
                };
            }
            results.push(self.node.eval(&buffer));
        }
        Ok(results)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
