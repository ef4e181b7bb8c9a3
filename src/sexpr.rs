//! The S-expression tree: the parser's output and the evaluator's input.
//!
//! An expression is `Nil`, an `Atom`, or a `Cons` pair. A proper list is a
//! `Cons` chain whose final cdr is `Nil`; a non-Nil atom in that position
//! makes the list improper (a dotted pair). Trees are built bottom-up by
//! the parser and never mutated afterwards.
//!
//! To build expressions in code and tests, use the constructor helpers:
//! `atom("x")`, `cons(a, b)`, and `list([...])` for a Nil-terminated chain.

use std::fmt;

/// A parsed S-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SExpr {
    /// The empty list, also the terminator of every proper list.
    Nil,
    /// A leaf token: symbol, number, or boolean literal. The evaluator
    /// decides which; the tree does not care.
    Atom(String),
    /// A pair of car (head) and cdr (tail).
    Cons(Box<SExpr>, Box<SExpr>),
}

/// The empty list.
pub fn nil() -> SExpr {
    SExpr::Nil
}

/// A leaf from anything stringy, mirroring the tokenizer's untyped atoms.
pub fn atom(text: impl ToString) -> SExpr {
    SExpr::Atom(text.to_string())
}

/// Pair `car` with `cdr`.
pub fn cons(car: SExpr, cdr: SExpr) -> SExpr {
    SExpr::Cons(Box::new(car), Box::new(cdr))
}

/// Build a proper list by right-folding the elements onto `Nil`.
pub fn list<I>(exprs: I) -> SExpr
where
    I: IntoIterator<Item = SExpr>,
    I::IntoIter: DoubleEndedIterator,
{
    exprs
        .into_iter()
        .rev()
        .fold(nil(), |tail, expr| cons(expr, tail))
}

impl SExpr {
    /// The atom's text, if this is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            SExpr::Atom(text) => Some(text),
            _ => None,
        }
    }

    /// The elements of a proper list, or None if any cdr position holds a
    /// non-Nil atom. `Nil` is the empty list.
    pub fn as_proper_list(&self) -> Option<Vec<&SExpr>> {
        let mut items = Vec::new();
        let mut rest = self;
        loop {
            match rest {
                SExpr::Nil => return Some(items),
                SExpr::Cons(car, cdr) => {
                    items.push(car.as_ref());
                    rest = cdr;
                }
                SExpr::Atom(_) => return None,
            }
        }
    }
}

/// Canonical reader syntax. Re-lexing and re-parsing the output
/// reconstructs the original tree.
impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExpr::Nil => write!(f, "()"),
            SExpr::Atom(text) => write!(f, "{text}"),
            SExpr::Cons(car, cdr) => {
                write!(f, "({car}")?;
                fmt_tail(cdr, f)
            }
        }
    }
}

/// Render the cdr chain of a list: no space before the Nil terminator, a
/// ` . ` before a non-Nil atom terminator.
fn fmt_tail(expr: &SExpr, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        SExpr::Nil => write!(f, ")"),
        SExpr::Atom(text) => write!(f, " . {text})"),
        SExpr::Cons(car, cdr) => {
            write!(f, " {car}")?;
            fmt_tail(cdr, f)
        }
    }
}
