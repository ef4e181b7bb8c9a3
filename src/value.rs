//! Runtime values produced by the evaluator.

use std::fmt;

use crate::EvalError;
use crate::env::Environment;
use crate::sexpr::SExpr;

/// Native procedure signature: fully evaluated arguments in, value out.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    /// The empty list.
    Nil,
    /// A symbol, e.g. what `define` returns.
    Symbol(String),
    /// All numbers are doubles.
    Number(f64),
    Bool(bool),
    /// A native procedure, registered under `name` in the global
    /// environment.
    BuiltInProc { name: &'static str, func: BuiltinFn },
    /// A user procedure: parameter names, a non-empty body, and the
    /// environment captured at creation. The captured environment stays
    /// alive as long as the closure does.
    Closure {
        params: Vec<String>,
        body: Vec<SExpr>,
        env: Environment,
    },
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Symbol(name) => write!(f, "Symbol({name})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::BuiltInProc { name, .. } => write!(f, "BuiltInProc({name})"),
            // The captured environment is omitted: a letrec frame can
            // reach the closure that reaches the frame, and a derived
            // traversal would never terminate.
            Value::Closure { params, body, .. } => {
                write!(f, "Closure(params={params:?}, body={body:?})")
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            // Builtins compare by name, not by function pointer.
            (Value::BuiltInProc { name: a, .. }, Value::BuiltInProc { name: b, .. }) => a == b,
            (
                Value::Closure {
                    params: p1,
                    body: b1,
                    env: e1,
                },
                Value::Closure {
                    params: p2,
                    body: b2,
                    env: e2,
                },
            ) => p1 == p2 && b1 == b2 && Environment::ptr_eq(e1, e2),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "()"),
            Value::Symbol(name) => write!(f, "{name}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::BuiltInProc { name, .. } => write!(f, "#<built-in-proc:{name}>"),
            Value::Closure { params, .. } => {
                write!(f, "#<closure ({})>", params.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexpr::{atom, list};

    #[test]
    fn test_display() {
        let test_cases: Vec<(Value, &str)> = vec![
            (Value::Nil, "()"),
            (Value::Symbol("x".to_owned()), "x"),
            (Value::Number(3.0), "3"),
            (Value::Number(-4.5), "-4.5"),
            (Value::Number(0.2), "0.2"),
            (Value::Bool(true), "#t"),
            (Value::Bool(false), "#f"),
        ];

        for (value, expected) in test_cases {
            assert_eq!(value.to_string(), expected);
        }
    }

    #[test]
    fn test_procedure_display() {
        fn always_nil(_args: &[Value]) -> Result<Value, EvalError> {
            Ok(Value::Nil)
        }

        let builtin = Value::BuiltInProc {
            name: "+",
            func: always_nil,
        };
        assert_eq!(builtin.to_string(), "#<built-in-proc:+>");

        let closure = Value::Closure {
            params: vec!["x".to_owned(), "y".to_owned()],
            body: vec![list([atom("+"), atom("x"), atom("y")])],
            env: Environment::new(),
        };
        assert_eq!(closure.to_string(), "#<closure (x y)>");
    }

    #[test]
    fn test_equality() {
        fn always_nil(_args: &[Value]) -> Result<Value, EvalError> {
            Ok(Value::Nil)
        }
        fn also_nil(_args: &[Value]) -> Result<Value, EvalError> {
            Ok(Value::Nil)
        }

        assert_eq!(Value::Number(2.0), Value::Number(2.0));
        assert_ne!(Value::Number(2.0), Value::Number(3.0));
        assert_ne!(Value::Number(1.0), Value::Bool(true));
        assert_ne!(Value::Nil, Value::Bool(false));

        // Builtins compare by name alone.
        assert_eq!(
            Value::BuiltInProc {
                name: "+",
                func: always_nil,
            },
            Value::BuiltInProc {
                name: "+",
                func: also_nil,
            }
        );

        // Closures require the same captured frame, not just equal
        // contents.
        let env = Environment::new();
        let make = |env: &Environment| Value::Closure {
            params: vec!["x".to_owned()],
            body: vec![atom("x")],
            env: env.clone(),
        };
        assert_eq!(make(&env), make(&env));
        assert_ne!(make(&env), make(&Environment::new()));
    }
}
