//! The tree-walking evaluator: structural recursion over [`SExpr`] with
//! special-form dispatch.
//!
//! Evaluation is synchronous and depth-first; recursion depth equals
//! source call depth, so unbounded recursion in user code exhausts the
//! host stack. There is no tail-call elimination.
//!
//! A cons cell whose car is one of `if`, `lambda`, `let`, `letrec`, or
//! `define` is a special form with its own evaluation rule; every other
//! cons cell is an application.

use crate::EvalError;
use crate::env::Environment;
use crate::sexpr::SExpr;
use crate::value::Value;

/// Evaluate `expr` against `env`.
///
/// A failure aborts this expression only; `env` keeps whatever bindings
/// it had, so a session can continue after an error.
pub fn evaluate(expr: &SExpr, env: &Environment) -> Result<Value, EvalError> {
    match expr {
        SExpr::Nil => Ok(Value::Nil),
        SExpr::Atom(text) => eval_atom(text, env),
        SExpr::Cons(car, cdr) => match car.as_atom() {
            Some("if") => eval_if(cdr, env),
            Some("lambda") => eval_lambda(cdr, env),
            Some("let") => eval_let(cdr, env),
            Some("letrec") => eval_letrec(cdr, env),
            Some("define") => eval_define(cdr, env),
            _ => eval_application(car, cdr, env),
        },
    }
}

/// Number literal, boolean literal, or variable — tried in that order.
fn eval_atom(text: &str, env: &Environment) -> Result<Value, EvalError> {
    if let Ok(number) = text.parse::<f64>() {
        return Ok(Value::Number(number));
    }
    match text {
        "#t" => Ok(Value::Bool(true)),
        "#f" => Ok(Value::Bool(false)),
        name => env
            .get(name)
            .ok_or_else(|| EvalError::UnboundVariable(name.to_owned())),
    }
}

/// The head must evaluate to a procedure before any operand is touched.
fn eval_application(car: &SExpr, cdr: &SExpr, env: &Environment) -> Result<Value, EvalError> {
    match evaluate(car, env)? {
        Value::BuiltInProc { func, .. } => {
            let args = eval_args(cdr, env)?;
            func(&args)
        }
        Value::Closure {
            params,
            body,
            env: captured,
        } => {
            let args = eval_args(cdr, env)?;
            if params.len() != args.len() {
                return Err(EvalError::ArityMismatch {
                    expected: params.len(),
                    got: args.len(),
                });
            }

            let frame = Environment::with_parent(&captured);
            for (param, arg) in params.iter().zip(args) {
                frame.define(param.clone(), arg);
            }

            // The body is non-empty by construction.
            let mut result = Value::Nil;
            for expr in &body {
                result = evaluate(expr, &frame)?;
            }
            Ok(result)
        }
        other => Err(EvalError::InvalidApplication(other.to_string())),
    }
}

/// Evaluate the operand list left to right.
fn eval_args(operands: &SExpr, env: &Environment) -> Result<Vec<Value>, EvalError> {
    let exprs = operands.as_proper_list().ok_or_else(|| {
        EvalError::TypeMismatch(format!("operands must form a proper list, got {operands}"))
    })?;
    exprs.iter().map(|expr| evaluate(expr, env)).collect()
}

fn malformed(form: &str, msg: &str) -> EvalError {
    EvalError::MalformedSpecialForm(format!("{form}: {msg}"))
}

/// The operands of a special form, which must sit in a proper list.
fn special_form_operands<'a>(
    form: &'static str,
    operands: &'a SExpr,
) -> Result<Vec<&'a SExpr>, EvalError> {
    operands
        .as_proper_list()
        .ok_or_else(|| malformed(form, "operands must form a proper list"))
}

/// `(if condition then else)`: evaluates exactly one branch.
fn eval_if(operands: &SExpr, env: &Environment) -> Result<Value, EvalError> {
    let operands = special_form_operands("if", operands)?;
    match operands.as_slice() {
        &[condition, then_branch, else_branch] => match evaluate(condition, env)? {
            Value::Bool(true) => evaluate(then_branch, env),
            Value::Bool(false) => evaluate(else_branch, env),
            other => Err(EvalError::TypeMismatch(format!(
                "if condition must be a boolean, got {other}"
            ))),
        },
        _ => Err(malformed("if", "expected exactly 3 operands")),
    }
}

/// `(lambda (params...) body...)`: a closure over the current environment.
fn eval_lambda(operands: &SExpr, env: &Environment) -> Result<Value, EvalError> {
    let operands = special_form_operands("lambda", operands)?;
    let Some((&params_expr, body)) = operands.split_first() else {
        return Err(malformed("lambda", "parameter list is missing"));
    };

    let params = collect_params("lambda", params_expr)?;
    let body = clone_body("lambda", body)?;
    Ok(Value::Closure {
        params,
        body,
        env: env.clone(),
    })
}

/// Atom entries of the parameter list become parameter names; anything
/// else is skipped.
fn collect_params(form: &'static str, params: &SExpr) -> Result<Vec<String>, EvalError> {
    let entries = params
        .as_proper_list()
        .ok_or_else(|| malformed(form, "parameter list must be a proper list"))?;
    Ok(entries
        .iter()
        .filter_map(|entry| entry.as_atom().map(str::to_owned))
        .collect())
}

/// A body must hold at least one expression.
fn clone_body(form: &'static str, body: &[&SExpr]) -> Result<Vec<SExpr>, EvalError> {
    if body.is_empty() {
        return Err(malformed(form, "body must not be empty"));
    }
    Ok(body.iter().map(|&expr| expr.clone()).collect())
}

/// A `let`-family binding list: `((name expr) ...)`.
fn parse_bindings<'a>(
    form: &'static str,
    bindings: &'a SExpr,
) -> Result<Vec<(&'a str, &'a SExpr)>, EvalError> {
    let entries = bindings
        .as_proper_list()
        .ok_or_else(|| malformed(form, "bindings must form a proper list"))?;

    entries
        .iter()
        .map(|entry| match entry.as_proper_list().as_deref() {
            Some(&[name_expr, expr]) => name_expr
                .as_atom()
                .map(|name| (name, expr))
                .ok_or_else(|| malformed(form, "binding names must be atoms")),
            _ => Err(malformed(form, "each binding must be a (name expr) pair")),
        })
        .collect()
}

/// `(let ((name expr)...) body...)`: binding expressions see only the
/// outer environment, so no binding can refer to another.
fn eval_let(operands: &SExpr, env: &Environment) -> Result<Value, EvalError> {
    let operands = special_form_operands("let", operands)?;
    let Some((&bindings_expr, body)) = operands.split_first() else {
        return Err(malformed("let", "binding list is missing"));
    };
    let bindings = parse_bindings("let", bindings_expr)?;
    if body.is_empty() {
        return Err(malformed("let", "body must not be empty"));
    }

    // All values first, one frame after: the frame must not exist while
    // the binding expressions run.
    let mut values = Vec::with_capacity(bindings.len());
    for (name, expr) in bindings {
        values.push((name, evaluate(expr, env)?));
    }

    let frame = Environment::with_parent(env);
    for (name, value) in values {
        frame.define(name, value);
    }

    eval_sequence(body, &frame)
}

/// `(letrec ((name expr)...) body...)`: the frame exists, with every name
/// visible, before any binding expression runs — bindings may refer to
/// each other and themselves.
fn eval_letrec(operands: &SExpr, env: &Environment) -> Result<Value, EvalError> {
    let operands = special_form_operands("letrec", operands)?;
    let Some((&bindings_expr, body)) = operands.split_first() else {
        return Err(malformed("letrec", "binding list is missing"));
    };
    let bindings = parse_bindings("letrec", bindings_expr)?;
    if body.is_empty() {
        return Err(malformed("letrec", "body must not be empty"));
    }

    let frame = Environment::with_parent(env);
    for (name, _) in &bindings {
        frame.define(*name, Value::Nil);
    }
    for (name, expr) in &bindings {
        let value = evaluate(expr, &frame)?;
        frame.define(*name, value);
    }

    eval_sequence(body, &frame)
}

/// `(define name expr)` or `(define (name params...) body...)`, top level
/// only. Returns the bound name as a symbol.
fn eval_define(operands: &SExpr, env: &Environment) -> Result<Value, EvalError> {
    if !env.is_top_level() {
        return Err(EvalError::DefineNotAtTopLevel);
    }

    let operands = special_form_operands("define", operands)?;
    let Some((&target, rest)) = operands.split_first() else {
        return Err(malformed("define", "expected a name or a signature"));
    };

    match target {
        SExpr::Atom(name) => {
            let &[expr] = rest else {
                return Err(malformed(
                    "define",
                    "expected exactly one expression after the name",
                ));
            };
            let value = evaluate(expr, env)?;
            env.define(name.clone(), value);
            Ok(Value::Symbol(name.clone()))
        }
        SExpr::Cons(head, params) => {
            let Some(name) = head.as_atom() else {
                return Err(malformed("define", "procedure name must be an atom"));
            };
            let params = collect_params("define", params)?;
            let body = clone_body("define", rest)?;
            env.define(
                name,
                Value::Closure {
                    params,
                    body,
                    env: env.clone(),
                },
            );
            Ok(Value::Symbol(name.to_owned()))
        }
        SExpr::Nil => Err(malformed("define", "expected a name or a signature")),
    }
}

/// Evaluate a non-empty expression sequence in order, returning the last
/// value.
fn eval_sequence(body: &[&SExpr], env: &Environment) -> Result<Value, EvalError> {
    let mut result = Value::Nil;
    for &expr in body {
        result = evaluate(expr, env)?;
    }
    Ok(result)
}
