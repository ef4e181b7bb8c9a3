//! Tokenizer: raw text to an ordered token sequence.
//!
//! The token grammar is deliberately dumb: whitespace separates, a fixed
//! set of single characters always stand alone, and everything else is an
//! atom run. `;`, `"`, `'` and the other reserved characters carry no
//! comment/string/quote semantics here; they are plain delimiter tokens
//! for the parser to reject or a future reader to assign meaning to.
//!
//! Lexing is total: every character is whitespace, a delimiter, or part
//! of an atom run, so there is no failure case.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{multispace0, one_of},
    combinator::recognize,
    multi::many0,
    sequence::preceded,
};

/// Characters that always form a single-character token on their own.
pub const DELIMITERS: &str = "()[]{};\"'`|";

fn delimiter(input: &str) -> IResult<&str, &str> {
    recognize(one_of(DELIMITERS)).parse(input)
}

/// A maximal run of characters containing no whitespace and no delimiter.
fn atom_run(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && !DELIMITERS.contains(c)).parse(input)
}

fn token(input: &str) -> IResult<&str, &str> {
    alt((delimiter, atom_run)).parse(input)
}

/// Split `input` into tokens.
///
/// Empty input (or all-whitespace input) yields an empty sequence.
pub fn lex(input: &str) -> Vec<String> {
    match many0(preceded(multispace0, token)).parse(input) {
        Ok((_trailing_whitespace, tokens)) => {
            tokens.into_iter().map(str::to_owned).collect()
        }
        // `many0` over complete input stops instead of failing; the only
        // unconsumed suffix is trailing whitespace.
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_tokens(input: &str, expected: &[&str]) {
        assert_eq!(lex(input), expected, "tokens for {input:?}");
    }

    #[test]
    fn test_simple_list() {
        assert_tokens("(1 2)", &["(", "1", "2", ")"]);
    }

    #[test]
    fn test_complex_expression_whitespace_variants() {
        let expected = [
            "(", "if", "(", "<", "1", "23", ")", "4", "(", "+", "5", "6", ")", ")",
        ];

        // The same token sequence regardless of how whitespace is laid out,
        // including none at all around delimiters.
        let variants = [
            "(if (< 1 23) 4 (+ 5 6))",
            " (if (< 1 23) 4 (+ 5 6)) ",
            "(if (< 1 23)\n\t4\n    (+ 5 6))",
            "(if(< 1 23)4(+ 5 6))",
        ];

        for input in variants {
            assert_tokens(input, &expected);
        }
    }

    #[test]
    fn test_every_delimiter_stands_alone() {
        assert_tokens(
            "()[]{};\"'`|",
            &["(", ")", "[", "]", "{", "}", ";", "\"", "'", "`", "|"],
        );
    }

    #[test]
    fn test_delimiters_terminate_atom_runs() {
        assert_tokens("(+)", &["(", "+", ")"]);
        assert_tokens("a;b", &["a", ";", "b"]);
        assert_tokens("x'y", &["x", "'", "y"]);
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_tokens("", &[]);
        assert_tokens("   ", &[]);
        assert_tokens("\t\n\r\n", &[]);
    }

    #[test]
    fn test_dot_is_an_ordinary_atom() {
        assert_tokens("(1 . 2)", &["(", "1", ".", "2", ")"]);
        assert_tokens("(1 .2)", &["(", "1", ".2", ")"]);
        assert_tokens("1.5", &["1.5"]);
    }
}
