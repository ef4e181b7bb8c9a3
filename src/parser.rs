//! Token-level parser: strict one-shot parsing plus a resumable variant
//! for incremental (multi-line) input.
//!
//! Grammar over tokens:
//!
//! ```text
//! SExpr    := "(" ListBody | ATOM
//! ListBody := ")" | SExpr CdrBody
//! CdrBody  := "." SExpr ")" | ListBody
//! ```
//!
//! `.` is only the dot operator once a list has at least one element;
//! anywhere else it is an ordinary atom.
//!
//! [`parse`] consumes the whole token sequence and fails on leftovers.
//! [`parse_incremental`] accepts the same grammar but suspends instead of
//! failing when the tokens run out mid-expression: it returns a
//! [`Partial`] recording exactly which grammar rule was active and what
//! had been built so far, and [`Partial::feed`] resumes from that point.
//! Feeding a token sequence in any number of pieces produces the same
//! tree (or the same error) as parsing it all at once; the tests pin this
//! equivalence at every split point.

use std::iter::Peekable;
use std::vec::IntoIter;

use crate::ParseError;
use crate::sexpr::{self, SExpr};

type Tokens = Peekable<IntoIter<String>>;

/// Parse a single complete expression, consuming every token.
pub fn parse(tokens: Vec<String>) -> Result<SExpr, ParseError> {
    let mut tokens = tokens.into_iter().peekable();
    let expr = parse_sexpr(&mut tokens)?;
    match tokens.next() {
        None => Ok(expr),
        Some(extra) => Err(ParseError::RedundantExpression(extra)),
    }
}

fn parse_sexpr(tokens: &mut Tokens) -> Result<SExpr, ParseError> {
    match tokens.next() {
        None => Err(ParseError::UnexpectedEof),
        Some(token) => match token.as_str() {
            "(" => parse_list_body(tokens),
            ")" => Err(ParseError::UnexpectedToken(token)),
            _ => Ok(SExpr::Atom(token)),
        },
    }
}

fn parse_list_body(tokens: &mut Tokens) -> Result<SExpr, ParseError> {
    match tokens.peek().map(String::as_str) {
        None => Err(ParseError::UnclosedParen),
        Some(")") => {
            tokens.next();
            Ok(SExpr::Nil)
        }
        Some(_) => {
            let car = parse_sexpr(tokens)?;
            let cdr = parse_cdr_body(tokens)?;
            Ok(sexpr::cons(car, cdr))
        }
    }
}

fn parse_cdr_body(tokens: &mut Tokens) -> Result<SExpr, ParseError> {
    match tokens.peek().map(String::as_str) {
        None => Err(ParseError::UnclosedParen),
        Some(".") => {
            tokens.next();
            // Exhaustion after the dot is still "inside a list".
            let cdr = parse_sexpr(tokens).map_err(|err| match err {
                ParseError::UnexpectedEof => ParseError::UnclosedParen,
                other => other,
            })?;
            match tokens.next() {
                None => Err(ParseError::UnclosedParen),
                Some(token) if token == ")" => Ok(cdr),
                Some(token) => Err(ParseError::MalformedDottedPair(token)),
            }
        }
        Some(_) => parse_list_body(tokens),
    }
}

/// Outcome of feeding tokens to the incremental parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A complete expression, plus whatever tokens followed it.
    Complete { expr: SExpr, rest: Vec<String> },
    /// The tokens ran out mid-expression; call [`Partial::feed`] with
    /// more tokens to continue.
    Partial(Partial),
}

/// Parse tokens incrementally.
///
/// Where [`parse`] reports `UnexpectedEof`/`UnclosedParen` on a stream
/// that stops mid-expression, this returns `Step::Partial`; where `parse`
/// reports `RedundantExpression`, this returns `Step::Complete` with the
/// leftover tokens. All other errors are identical between the two.
pub fn parse_incremental(tokens: Vec<String>) -> Result<Step, ParseError> {
    Partial::new().feed(tokens)
}

/// One open list: the elements parsed so far and the state of its tail.
#[derive(Debug, Clone, PartialEq)]
struct OpenList {
    items: Vec<SExpr>,
    tail: Tail,
}

/// Where an open list stands in `CdrBody`.
#[derive(Debug, Clone, PartialEq)]
enum Tail {
    /// No dot seen; the list closes proper unless a dot arrives.
    Proper,
    /// Dot consumed; the next expression is the cdr.
    AwaitingCdr,
    /// Cdr parsed; only `)` may follow.
    Cdr(SExpr),
}

/// A suspended parse: the stack of open lists, innermost last.
///
/// An empty stack means the machine is at the start of a top-level
/// expression. The suspension point is always the start of an atom,
/// inside a list body, or inside a dotted cdr; resuming feeds the next
/// token to exactly that grammar rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Partial {
    stack: Vec<OpenList>,
}

impl Partial {
    fn new() -> Self {
        Partial::default()
    }

    /// Feed more tokens, resuming at the suspension point.
    pub fn feed(mut self, tokens: Vec<String>) -> Result<Step, ParseError> {
        let mut tokens = tokens.into_iter();
        while let Some(token) = tokens.next() {
            if let Some(expr) = self.consume(token)? {
                return Ok(Step::Complete {
                    expr,
                    rest: tokens.collect(),
                });
            }
        }
        Ok(Step::Partial(self))
    }

    /// Advance the machine by one token, yielding the finished expression
    /// once the outermost list closes (or a bare atom completes).
    fn consume(&mut self, token: String) -> Result<Option<SExpr>, ParseError> {
        match self.stack.pop() {
            None => match token.as_str() {
                "(" => {
                    self.stack.push(OpenList {
                        items: Vec::new(),
                        tail: Tail::Proper,
                    });
                    Ok(None)
                }
                ")" => Err(ParseError::UnexpectedToken(token)),
                _ => Ok(Some(SExpr::Atom(token))),
            },
            Some(OpenList {
                items,
                tail: Tail::Cdr(cdr),
            }) => {
                // The dotted tail allows exactly one shape: `. expr )`.
                if token == ")" {
                    self.reduce(build_improper(items, cdr))
                } else {
                    Err(ParseError::MalformedDottedPair(token))
                }
            }
            Some(OpenList {
                items,
                tail: Tail::AwaitingCdr,
            }) => match token.as_str() {
                "(" => {
                    self.stack.push(OpenList {
                        items,
                        tail: Tail::AwaitingCdr,
                    });
                    self.stack.push(OpenList {
                        items: Vec::new(),
                        tail: Tail::Proper,
                    });
                    Ok(None)
                }
                ")" => Err(ParseError::UnexpectedToken(token)),
                _ => {
                    self.stack.push(OpenList {
                        items,
                        tail: Tail::Cdr(SExpr::Atom(token)),
                    });
                    Ok(None)
                }
            },
            Some(OpenList {
                mut items,
                tail: Tail::Proper,
            }) => match token.as_str() {
                "(" => {
                    self.stack.push(OpenList {
                        items,
                        tail: Tail::Proper,
                    });
                    self.stack.push(OpenList {
                        items: Vec::new(),
                        tail: Tail::Proper,
                    });
                    Ok(None)
                }
                ")" => self.reduce(sexpr::list(items)),
                "." if !items.is_empty() => {
                    self.stack.push(OpenList {
                        items,
                        tail: Tail::AwaitingCdr,
                    });
                    Ok(None)
                }
                _ => {
                    items.push(SExpr::Atom(token));
                    self.stack.push(OpenList {
                        items,
                        tail: Tail::Proper,
                    });
                    Ok(None)
                }
            },
        }
    }

    /// Deliver a completed expression to the enclosing open list, or
    /// yield it if none is open.
    fn reduce(&mut self, expr: SExpr) -> Result<Option<SExpr>, ParseError> {
        match self.stack.pop() {
            None => Ok(Some(expr)),
            Some(OpenList {
                mut items,
                tail: Tail::Proper,
            }) => {
                items.push(expr);
                self.stack.push(OpenList {
                    items,
                    tail: Tail::Proper,
                });
                Ok(None)
            }
            Some(OpenList {
                items,
                tail: Tail::AwaitingCdr,
            }) => {
                self.stack.push(OpenList {
                    items,
                    tail: Tail::Cdr(expr),
                });
                Ok(None)
            }
            // Once the tail holds a cdr, `consume` accepts only `)`, so no
            // sub-expression can still be open above this frame.
            Some(OpenList {
                tail: Tail::Cdr(_),
                ..
            }) => unreachable!("no expression can open after a dotted cdr"),
        }
    }
}

/// Right-fold the elements onto an explicit cdr: `(a b . c)`.
fn build_improper(items: Vec<SExpr>, cdr: SExpr) -> SExpr {
    items
        .into_iter()
        .rev()
        .fold(cdr, |tail, item| sexpr::cons(item, tail))
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::sexpr::{atom, cons, list, nil};

    /// Expected outcomes for the strict parser.
    #[derive(Debug)]
    enum ParseTestResult {
        Success(SExpr),
        SpecificError(ParseError),
    }
    use ParseTestResult::*;

    fn run_parse_tests(test_cases: Vec<(&str, ParseTestResult)>) {
        for (i, (input, expected)) in test_cases.iter().enumerate() {
            let test_id = format!("Parse test #{}", i + 1);
            let result = parse(lex(input));

            match (result, expected) {
                (Ok(actual), Success(expected_expr)) => {
                    assert_eq!(actual, *expected_expr, "{test_id}: tree mismatch");

                    // Canonical round-trip: display, re-lex, re-parse.
                    let displayed = actual.to_string();
                    let reparsed = parse(lex(&displayed)).unwrap_or_else(|e| {
                        panic!("{test_id}: round-trip parse failed for '{displayed}': {e:?}")
                    });
                    assert_eq!(
                        actual, reparsed,
                        "{test_id}: round-trip tree mismatch for '{input}'"
                    );
                }
                (Err(actual), SpecificError(expected_err)) => {
                    assert_eq!(actual, *expected_err, "{test_id}: error mismatch");
                }
                (Ok(actual), SpecificError(expected_err)) => {
                    panic!("{test_id}: expected {expected_err:?}, got {actual:?}");
                }
                (Err(err), Success(_)) => {
                    panic!("{test_id}: expected success, got error {err:?}");
                }
            }
        }
    }

    #[test]
    fn test_parser_comprehensive() {
        let test_cases = vec![
            // ===== ATOMS AND NIL =====
            ("x", Success(atom("x"))),
            ("42", Success(atom("42"))),
            ("()", Success(nil())),
            ("( )", Success(nil())),
            // A lone dot is an ordinary atom at the top level.
            (".", Success(atom("."))),
            // ===== PROPER LISTS =====
            ("(1 2)", Success(list([atom(1), atom(2)]))),
            (
                "(+ 1 2)",
                Success(list([atom("+"), atom(1), atom(2)])),
            ),
            ("((1))", Success(list([list([atom(1)])]))),
            (
                "(let ((a 2)) (- a))",
                Success(list([
                    atom("let"),
                    list([list([atom("a"), atom(2)])]),
                    list([atom("-"), atom("a")]),
                ])),
            ),
            // ===== DOTTED PAIRS =====
            ("(() . 0)", Success(cons(nil(), atom(0)))),
            (
                "(1 2 . 3)",
                Success(cons(atom(1), cons(atom(2), atom(3)))),
            ),
            ("(1 . (2 3))", Success(list([atom(1), atom(2), atom(3)]))),
            // A dot before any element is just an atom in car position.
            ("(. 3)", Success(list([atom("."), atom(3)]))),
            // ===== ERRORS =====
            ("", SpecificError(ParseError::UnexpectedEof)),
            ("   ", SpecificError(ParseError::UnexpectedEof)),
            ("(1 2", SpecificError(ParseError::UnclosedParen)),
            ("(", SpecificError(ParseError::UnclosedParen)),
            ("((1 2)", SpecificError(ParseError::UnclosedParen)),
            ("(1 .", SpecificError(ParseError::UnclosedParen)),
            ("(1 . 2", SpecificError(ParseError::UnclosedParen)),
            (")", SpecificError(ParseError::UnexpectedToken(")".into()))),
            (
                "(1 . )",
                SpecificError(ParseError::UnexpectedToken(")".into())),
            ),
            (
                "(1 . 2 3)",
                SpecificError(ParseError::MalformedDottedPair("3".into())),
            ),
            (
                "1 2",
                SpecificError(ParseError::RedundantExpression("2".into())),
            ),
            (
                "(+ 1 2) (+ 3 4)",
                SpecificError(ParseError::RedundantExpression("(".into())),
            ),
        ];

        run_parse_tests(test_cases);
    }

    /// Drive the incremental parser over `tokens` split at `split`,
    /// then classify the final outcome.
    #[derive(Debug, PartialEq)]
    enum Outcome {
        Complete(SExpr, Vec<String>),
        Suspended,
        Failed(ParseError),
    }

    fn run_split(tokens: &[String], split: usize) -> Outcome {
        let (first, second) = tokens.split_at(split);

        let step = match parse_incremental(first.to_vec()) {
            Ok(Step::Partial(partial)) => partial.feed(second.to_vec()),
            Ok(Step::Complete { expr, mut rest }) => {
                // Completed inside the first chunk: the rest of the input
                // is leftover, same as trailing tokens fed all at once.
                rest.extend_from_slice(second);
                Ok(Step::Complete { expr, rest })
            }
            Err(err) => Err(err),
        };

        match step {
            Ok(Step::Complete { expr, rest }) => Outcome::Complete(expr, rest),
            Ok(Step::Partial(_)) => Outcome::Suspended,
            Err(err) => Outcome::Failed(err),
        }
    }

    /// The incremental parser must agree with the strict parser on every
    /// input, at every split point: a strict success is a completion with
    /// no leftovers, `RedundantExpression` is a completion with leftovers,
    /// and the two exhaustion errors are suspensions.
    fn assert_incremental_agrees(input: &str) {
        let tokens = lex(input);
        let strict = parse(tokens.clone());

        for split in 0..=tokens.len() {
            let outcome = run_split(&tokens, split);
            match (&strict, outcome) {
                (Ok(expected), Outcome::Complete(expr, rest)) => {
                    assert_eq!(expr, *expected, "split {split} of {input:?}");
                    assert!(rest.is_empty(), "split {split} of {input:?}: leftovers");
                }
                (Err(ParseError::RedundantExpression(extra)), Outcome::Complete(_, rest)) => {
                    assert_eq!(
                        rest.first(),
                        Some(extra),
                        "split {split} of {input:?}: leftover mismatch"
                    );
                }
                (
                    Err(ParseError::UnexpectedEof) | Err(ParseError::UnclosedParen),
                    Outcome::Suspended,
                ) => {}
                (Err(expected), Outcome::Failed(err)) => {
                    assert_eq!(err, *expected, "split {split} of {input:?}");
                }
                (strict, outcome) => {
                    panic!("split {split} of {input:?}: strict {strict:?} vs {outcome:?}");
                }
            }
        }
    }

    #[test]
    fn test_incremental_agrees_with_strict_at_every_split() {
        let corpus = [
            "()",
            "x",
            "(() . 0)",
            "(1 2)",
            "(1 2 . 3)",
            "(let ((a 2)) (- a))",
            "((lambda (x y) (+ (* x x) (* y y))) 3 4)",
            "(. 3)",
            ".",
            // Errors must also agree.
            "",
            "(1 2",
            "(1 .",
            "(1 . 2",
            "(1 . )",
            "(1 . 2 3)",
            ")",
            "1 2",
            "(+ 1 2) extra",
        ];

        for input in corpus {
            assert_incremental_agrees(input);
        }
    }

    #[test]
    fn test_incremental_resumes_multiline_input() {
        let expected = list([
            atom("let"),
            list([list([atom("a"), atom(2)])]),
            list([atom("-"), atom("a")]),
        ]);

        let first = parse_incremental(lex("(let ((a 2))")).unwrap();
        let Step::Partial(partial) = first else {
            panic!("expected suspension, got {first:?}");
        };

        let second = partial.feed(lex("(- a))")).unwrap();
        assert_eq!(
            second,
            Step::Complete {
                expr: expected,
                rest: vec![],
            }
        );
    }

    #[test]
    fn test_incremental_resumes_inside_dotted_cdr() {
        let first = parse_incremental(lex("(1 .")).unwrap();
        let Step::Partial(partial) = first else {
            panic!("expected suspension, got {first:?}");
        };

        let second = partial.feed(lex("2)")).unwrap();
        assert_eq!(
            second,
            Step::Complete {
                expr: cons(atom(1), atom(2)),
                rest: vec![],
            }
        );
    }

    #[test]
    fn test_incremental_feeds_one_token_at_a_time() {
        let tokens = lex("(let ((a 2)) (- a))");
        let expected = parse(tokens.clone()).unwrap();

        let mut state = Partial::new();
        let mut completed = None;
        for token in tokens {
            match state.feed(vec![token]).unwrap() {
                Step::Partial(next) => state = next,
                Step::Complete { expr, rest } => {
                    assert!(rest.is_empty());
                    completed = Some(expr);
                    break;
                }
            }
        }

        assert_eq!(completed, Some(expected));
    }

    #[test]
    fn test_incremental_reports_leftover_tokens() {
        let step = parse_incremental(lex("42 43")).unwrap();
        assert_eq!(
            step,
            Step::Complete {
                expr: atom(42),
                rest: vec!["43".to_owned()],
            }
        );
    }

    #[test]
    fn test_empty_input_suspends_before_any_token() {
        let step = parse_incremental(Vec::new()).unwrap();
        let Step::Partial(partial) = step else {
            panic!("expected suspension, got {step:?}");
        };

        // The suspension is at the start of an expression; an atom
        // completes it immediately.
        let resumed = partial.feed(lex("7")).unwrap();
        assert_eq!(
            resumed,
            Step::Complete {
                expr: atom(7),
                rest: vec![],
            }
        );
    }
}
