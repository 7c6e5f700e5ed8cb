use super::{Expr, Number};
use crate::StrError;
use evalexpr::{build_operator_tree, Node, Operator, Value};

/// Checks that a name can be used as a symbol (and as a Fortran variable)
///
/// Valid names start with an ASCII letter or `_` and continue with ASCII letters, digits, or `_`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns the operands of a node after checking their number
fn operands(node: &Node, expected: usize) -> Result<Vec<Expr>, StrError> {
    let children = node.children();
    if children.len() != expected {
        println!(
            "ERROR: operator {:?} requires {} operand(s) but {} were given",
            node.operator(),
            expected,
            children.len()
        );
        return Err("wrong number of operands in expression");
    }
    children.iter().map(convert).collect()
}

/// Converts a node of the operator tree into an expression
fn convert(node: &Node) -> Result<Expr, StrError> {
    match node.operator() {
        Operator::RootNode => {
            if node.children().is_empty() {
                return Err("expression is empty");
            }
            let mut args = operands(node, 1)?;
            Ok(args.remove(0))
        }
        Operator::Add => {
            let args = operands(node, 2)?;
            Ok(Expr::add(args))
        }
        Operator::Sub => {
            let mut args = operands(node, 2)?;
            let b = args.remove(1);
            let a = args.remove(0);
            Ok(a - b)
        }
        Operator::Neg => {
            let mut args = operands(node, 1)?;
            Ok(-args.remove(0))
        }
        Operator::Mul => {
            let args = operands(node, 2)?;
            Ok(Expr::mul(args))
        }
        Operator::Div => {
            let mut args = operands(node, 2)?;
            let b = args.remove(1);
            let a = args.remove(0);
            Ok(a / b)
        }
        Operator::Exp => {
            let mut args = operands(node, 2)?;
            let exponent = args.remove(1);
            let base = args.remove(0);
            Ok(Expr::pow(base, exponent))
        }
        Operator::Const { value } => match value {
            Value::Int(n) => Ok(Expr::Num(Number::Int(*n))),
            Value::Float(x) if x.is_finite() => Ok(Expr::Num(Number::Real(*x))),
            _ => {
                println!("ERROR: constant {:?} is not a finite number", value);
                Err("invalid number in expression")
            }
        },
        Operator::VariableIdentifierRead { identifier } => {
            if !is_valid_identifier(identifier) {
                println!("ERROR: \"{}\" is not an ASCII identifier", identifier);
                return Err("invalid identifier in expression");
            }
            Ok(Expr::Sym(identifier.clone()))
        }
        Operator::FunctionIdentifier { identifier } => {
            let mut args = operands(node, 1)?;
            let arg = args.remove(0);
            match identifier.as_str() {
                "exp" => Ok(Expr::exp(arg)),
                "ln" | "log" => Ok(Expr::ln(arg)),
                "sqrt" => Ok(Expr::sqrt(arg)),
                _ => {
                    println!("ERROR: unknown function \"{}\"", identifier);
                    Err("unknown function in expression")
                }
            }
        }
        other => {
            println!("ERROR: operator {:?} is not supported", other);
            Err("unsupported operator in expression")
        }
    }
}

/// Parses a mathematical expression such as `C10*(I1b - 3) + (J - 1)**2/D1`
///
/// The operator tree is built by `evalexpr` and then folded into [Expr] through
/// the smart constructors. Supported syntax:
///
/// * operators `+ - * /` and powers with `**` or `^` (right associative)
/// * integer, decimal, and exponent-notation numbers (`3`, `0.5`, `1e-5`);
///   integers are kept exact, so `2/3` becomes a rational number
/// * functions `exp`, `ln` (or `log`), and `sqrt`
/// * ASCII identifiers only, since the symbols end up in Fortran source code
pub fn parse(input: &str) -> Result<Expr, StrError> {
    let tree = match build_operator_tree(&input.replace("**", "^")) {
        Ok(tree) => tree,
        Err(err) => {
            println!("ERROR: cannot parse \"{}\": {}", input, err);
            return Err("cannot parse expression");
        }
    };
    convert(&tree)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{is_valid_identifier, parse};
    use crate::symbolic::{Expr, Number};

    #[test]
    fn is_valid_identifier_works() {
        assert!(is_valid_identifier("C10"));
        assert!(is_valid_identifier("lambda_11"));
        assert!(is_valid_identifier("_a"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1a"));
        assert!(!is_valid_identifier("μ"));
        assert!(!is_valid_identifier("aβ"));
        assert!(!is_valid_identifier("a$"));
    }

    #[test]
    fn parse_captures_errors() {
        assert_eq!(parse("").err(), Some("expression is empty"));
        assert_eq!(parse("   ").err(), Some("expression is empty"));
        assert_eq!(parse("x + $").err(), Some("invalid identifier in expression"));
        assert_eq!(parse("(x + 1").err(), Some("cannot parse expression"));
        assert_eq!(parse("x + 1)").err(), Some("cannot parse expression"));
        assert!(parse("x + ").is_err());
        assert!(parse("x + * y").is_err());
        assert_eq!(parse("sin(x)").err(), Some("unknown function in expression"));
        assert_eq!(parse("x % 2").err(), Some("unsupported operator in expression"));
        assert_eq!(parse("x == 2").err(), Some("unsupported operator in expression"));
    }

    #[test]
    fn parse_rejects_non_ascii_symbols() {
        assert_eq!(parse("μ*(I1b - 3)").err(), Some("invalid identifier in expression"));
        let long = "μα*βγ*δε*ζη*θι*κλ*μν*ξο*πρ*στ*υφ*χψ*ωa*ωb*ωc*ωd*ωe*(I1b - 3)";
        assert_eq!(parse(long).err(), Some("invalid identifier in expression"));
    }

    #[test]
    fn parse_numbers_works() {
        assert_eq!(parse("3").unwrap(), Expr::int(3));
        assert_eq!(parse("0.5").unwrap(), Expr::real(0.5));
        assert_eq!(parse("1e-5").unwrap(), Expr::real(1e-5));
        assert_eq!(parse("2.5e1").unwrap(), Expr::real(25.0));
        assert_eq!(parse("-2/3").unwrap(), Expr::Num(Number::Rational(-2, 3)));
    }

    #[test]
    fn parse_precedence_works() {
        let x = || Expr::symbol("x");
        assert_eq!(parse("-x**2").unwrap(), -Expr::pow(x(), Expr::int(2)));
        assert_eq!(parse("2**3**2").unwrap(), Expr::int(512));
        assert_eq!(parse("x^-1").unwrap(), Expr::pow(x(), Expr::int(-1)));
        assert_eq!(parse("1 - x - 1").unwrap(), -x());
        assert_eq!(parse("x/2/2").unwrap(), Expr::rational(1, 4) * x());
    }

    #[test]
    fn parse_energy_works() {
        let w = parse("C10*(I1b - 3) + C01*(I2b - 3) + C20*(I1b - 3)**2 + 1/D1*(J - 1)**2").unwrap();
        let names: Vec<_> = w.symbols().into_iter().collect();
        assert_eq!(names, &["C01", "C10", "C20", "D1", "I1b", "I2b", "J"]);
        let w = parse("mu/2*(exp(k*(I1b - 3)) - 1) + sqrt(J)").unwrap();
        assert!(w.contains("k"));
        assert!(w.contains("J"));
    }
}
