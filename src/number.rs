//! The numeric library: variadic arithmetic and chained comparisons.
//!
//! Every operation is strict: a non-number argument is a type mismatch,
//! reported against the operator name. The fold rules differ per
//! operator:
//!
//! - `+` and `*` fold from their identity, so zero arguments yield 0
//!   and 1 respectively.
//! - `-` and `/` need at least one argument; a single argument takes the
//!   unary form (negation, reciprocal), more fold left from the first.
//! - `= < <= > >=` need at least two arguments and hold iff every
//!   adjacent pair does: `(< 1 2 3)` is true, `(< 1 3 2)` is false.

use crate::EvalError;
use crate::value::{BuiltinFn, Value};

/// Operator registry consumed by [`crate::env::create_global_env`].
pub(crate) const BUILTINS: &[(&'static str, BuiltinFn)] = &[
    ("+", add),
    ("-", sub),
    ("*", mul),
    ("/", div),
    ("=", num_eq),
    ("<", lt),
    ("<=", le),
    (">", gt),
    (">=", ge),
];

fn as_numbers(op: &'static str, args: &[Value]) -> Result<Vec<f64>, EvalError> {
    args.iter()
        .map(|arg| match arg {
            Value::Number(n) => Ok(*n),
            other => Err(EvalError::TypeMismatch(format!(
                "{op} expects numbers, got {other}"
            ))),
        })
        .collect()
}

// Fold from an identity element; the empty application yields it.
macro_rules! folding_arithmetic {
    ($name:ident, $op_str:expr, $identity:expr, $fold:expr) => {
        pub fn $name(args: &[Value]) -> Result<Value, EvalError> {
            let numbers = as_numbers($op_str, args)?;
            let result = numbers.into_iter().fold($identity, $fold);
            Ok(Value::Number(result))
        }
    };
}

folding_arithmetic!(add, "+", 0.0, |acc, n| acc + n);
folding_arithmetic!(mul, "*", 1.0, |acc, n| acc * n);

// At least one argument; exactly one takes the unary form, more fold
// left from the first.
macro_rules! anchored_arithmetic {
    ($name:ident, $op_str:expr, $unary:expr, $fold:expr) => {
        pub fn $name(args: &[Value]) -> Result<Value, EvalError> {
            let numbers = as_numbers($op_str, args)?;
            let (&first, rest) =
                numbers
                    .split_first()
                    .ok_or(EvalError::InsufficientArguments {
                        op: $op_str,
                        min: 1,
                    })?;

            let result = if rest.is_empty() {
                $unary(first)
            } else {
                rest.iter().fold(first, |acc, &n| $fold(acc, n))
            };
            Ok(Value::Number(result))
        }
    };
}

anchored_arithmetic!(sub, "-", |n: f64| -n, |acc: f64, n: f64| acc - n);
anchored_arithmetic!(div, "/", |n: f64| 1.0 / n, |acc: f64, n: f64| acc / n);

// At least two arguments; true iff every adjacent pair satisfies the
// relation.
macro_rules! chained_comparison {
    ($name:ident, $op_str:expr, $op:tt) => {
        pub fn $name(args: &[Value]) -> Result<Value, EvalError> {
            let numbers = as_numbers($op_str, args)?;
            if numbers.len() < 2 {
                return Err(EvalError::InsufficientArguments {
                    op: $op_str,
                    min: 2,
                });
            }
            Ok(Value::Bool(
                numbers.windows(2).all(|pair| pair[0] $op pair[1]),
            ))
        }
    };
}

chained_comparison!(num_eq, "=", ==);
chained_comparison!(lt, "<", <);
chained_comparison!(le, "<=", <=);
chained_comparison!(gt, ">", >);
chained_comparison!(ge, ">=", >=);
