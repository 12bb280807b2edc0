//! Call-expression parser
//!
//! Grammar:
//!
//! ```text
//! call   := ident ( "(" [ arg ("," arg)* [","] ] ")" )?
//! arg    := string | raw_string | char | "-"? number | ident
//! number := 0[xXoObB][0-9a-fA-F_]+ | decimal with optional "_" separators,
//!           fraction and exponent
//! ```
//!
//! Every argument becomes a literal token. Quoted strings and single-quoted
//! character literals are unescaped, a unary minus is folded into the number
//! that follows it, and bare identifiers (`true`, `on`, ...) are kept as text
//! for coercion to decide. Prefixed and `_`-separated numerals pass through as
//! written, so `0x10` reaches coercion as `0x10` and fails there as a base-10
//! integer. Anything else (operators, nested calls, trailing input) is a
//! syntax error.

use nom::branch::alt;
use nom::bytes::complete::{take_until, take_while, take_while1};
use nom::character::complete::{char, digit1, multispace0, one_of, satisfy};
use nom::combinator::{all_consuming, map, opt, recognize};
use nom::error::{Error as NomError, ErrorKind};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{IResult, Parser};

use crate::core::error::SyntaxError;

/// A parsed command: function name plus literal tokens in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<String>,
}

impl CallExpr {
    /// Parse a full command string; never returns a partial result
    pub fn parse(input: &str) -> Result<Self, SyntaxError> {
        match all_consuming(call).parse(input) {
            Ok((_, expr)) => Ok(expr),
            Err(e) => Err(SyntaxError {
                message: e.to_string(),
            }),
        }
    }
}

/// Convenience wrapper around [`CallExpr::parse`]
pub fn parse_call(input: &str) -> Result<CallExpr, SyntaxError> {
    CallExpr::parse(input)
}

fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = NomError<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = NomError<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn call(input: &str) -> IResult<&str, CallExpr> {
    let (input, name) = ws(identifier).parse(input)?;
    let (input, args) = opt(delimited(
        char('('),
        opt(terminated(
            separated_list1(char(','), ws(argument)),
            opt(char(',')),
        )),
        ws(char(')')),
    ))
    .parse(input)?;

    let (input, _) = multispace0::<_, NomError<&str>>(input)?;
    Ok((
        input,
        CallExpr {
            name: name.to_string(),
            args: args.flatten().unwrap_or_default(),
        },
    ))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn argument(input: &str) -> IResult<&str, String> {
    alt((
        string_literal,
        char_literal,
        raw_string,
        negative_number,
        map(number, str::to_string),
        map(identifier, str::to_string),
    ))
    .parse(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    alt((
        prefixed_integer,
        recognize(pair(
            alt((
                recognize(pair(digits, opt(pair(char('.'), opt(digits))))),
                recognize(pair(char('.'), digits)),
            )),
            opt((one_of("eE"), opt(one_of("+-")), digits)),
        )),
    ))
    .parse(input)
}

fn digits(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        digit1,
        take_while(|c: char| c.is_ascii_digit() || c == '_'),
    ))
    .parse(input)
}

fn prefixed_integer(input: &str) -> IResult<&str, &str> {
    recognize((
        char('0'),
        one_of("xXoObB"),
        take_while1(|c: char| c.is_ascii_hexdigit() || c == '_'),
    ))
    .parse(input)
}

fn negative_number(input: &str) -> IResult<&str, String> {
    map(preceded(pair(char('-'), multispace0), number), |n: &str| {
        format!("-{n}")
    })
    .parse(input)
}

fn raw_string(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('`'), take_until("`"), char('`')),
        str::to_string,
    )
    .parse(input)
}

/// Double-quoted literal with the usual escape sequences decoded
fn string_literal(input: &str) -> IResult<&str, String> {
    quoted(input, '"')
}

/// Single-quoted literal holding exactly one character after unescaping
fn char_literal(input: &str) -> IResult<&str, String> {
    let (rest, out) = quoted(input, '\'')?;
    if out.chars().count() != 1 {
        return Err(escape_error(input));
    }
    Ok((rest, out))
}

fn quoted(input: &str, quote: char) -> IResult<&str, String> {
    let rest = input.strip_prefix(quote).ok_or_else(|| escape_error(input))?;
    let mut out = String::new();
    let mut chars = rest.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((&rest[i + 1..], out)),
            '\n' => return Err(escape_error(&rest[i..])),
            '\\' => {
                let (_, esc) = chars.next().ok_or_else(|| escape_error(&rest[i..]))?;
                let decoded = match esc {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    'a' => '\u{07}',
                    'b' => '\u{08}',
                    'f' => '\u{0c}',
                    'v' => '\u{0b}',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    'x' => hex_escape(&mut chars, 2).ok_or_else(|| escape_error(&rest[i..]))?,
                    'u' => unicode_escape(&mut chars).ok_or_else(|| escape_error(&rest[i..]))?,
                    'U' => hex_escape(&mut chars, 8).ok_or_else(|| escape_error(&rest[i..]))?,
                    _ => return Err(escape_error(&rest[i..])),
                };
                out.push(decoded);
            }
            _ => out.push(c),
        }
    }

    Err(escape_error(input))
}

fn escape_error(at: &str) -> nom::Err<NomError<&str>> {
    nom::Err::Error(NomError::new(at, ErrorKind::Escaped))
}

fn hex_escape(chars: &mut std::str::CharIndices<'_>, len: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..len {
        let (_, c) = chars.next()?;
        code = code * 16 + c.to_digit(16)?;
    }
    char::from_u32(code)
}

/// `\u{1F600}` or `\u00e9`
fn unicode_escape(chars: &mut std::str::CharIndices<'_>) -> Option<char> {
    let mut peek = chars.clone();
    if let Some((_, '{')) = peek.next() {
        *chars = peek;
        let mut code = 0u32;
        let mut len = 0;
        loop {
            let (_, c) = chars.next()?;
            if c == '}' {
                break;
            }
            len += 1;
            if len > 6 {
                return None;
            }
            code = code * 16 + c.to_digit(16)?;
        }
        if len == 0 {
            return None;
        }
        return char::from_u32(code);
    }
    hex_escape(chars, 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(input: &str) -> CallExpr {
        CallExpr::parse(input).unwrap()
    }

    fn args(expr: &CallExpr) -> Vec<&str> {
        expr.args.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_bare_identifier() {
        let expr = parse("Ping");
        assert_eq!(expr.name, "Ping");
        assert!(expr.args.is_empty());
    }

    #[test]
    fn test_empty_call() {
        let expr = parse("Unknown()");
        assert_eq!(expr.name, "Unknown");
        assert!(expr.args.is_empty());
    }

    #[test]
    fn test_quoted_argument_is_unquoted() {
        let expr = parse(r#"Hello("true")"#);
        assert_eq!(expr.name, "Hello");
        assert_eq!(args(&expr), vec!["true"]);
    }

    #[test]
    fn test_mixed_arguments() {
        let expr = parse(r#"Give( 42 , "sword", 1.5e2, yes, `C:\tmp`)"#);
        assert_eq!(args(&expr), vec!["42", "sword", "1.5e2", "yes", r"C:\tmp"]);
    }

    #[test]
    fn test_unary_minus_is_folded() {
        assert_eq!(args(&parse("Neg(-5)")), vec!["-5"]);
        assert_eq!(args(&parse("Neg(- 2.5)")), vec!["-2.5"]);
    }

    #[test]
    fn test_prefixed_and_separated_numerals() {
        let expr = parse("Add(0x10, 0o17, 0b1010, 1_000, 2_5.0_1e1_0)");
        assert_eq!(
            args(&expr),
            vec!["0x10", "0o17", "0b1010", "1_000", "2_5.0_1e1_0"]
        );
        assert_eq!(args(&parse("Neg(-0x1F)")), vec!["-0x1F"]);
    }

    #[test]
    fn test_char_literal() {
        assert_eq!(args(&parse("Say('a')")), vec!["a"]);
        assert_eq!(args(&parse(r"Say('\n', '\'')")), vec!["\n", "'"]);
        assert_eq!(args(&parse("Say('é')")), vec!["é"]);
    }

    #[test]
    fn test_escapes() {
        let expr = parse(r#"Say("a\"b\\c\n\x41\u00e9\u{1F600}")"#);
        assert_eq!(args(&expr), vec!["a\"b\\c\nAé😀"]);
    }

    #[test]
    fn test_empty_string_argument() {
        assert_eq!(args(&parse(r#"Say("")"#)), vec![""]);
    }

    #[test]
    fn test_trailing_comma_after_argument() {
        assert_eq!(args(&parse("Add(1, 2,)")), vec!["1", "2"]);
    }

    #[test]
    fn test_surrounding_whitespace() {
        let expr = parse("  Add ( 1 ,2 )  ");
        assert_eq!(expr.name, "Add");
        assert_eq!(args(&expr), vec!["1", "2"]);
    }

    #[test]
    fn test_syntax_errors() {
        for bad in [
            "",
            "not valid syntax {{",
            "Add(1",
            "Add(1 2)",
            "Add(,)",
            "Add(1,,2)",
            "Add(1) + 2",
            "Outer(Inner(1))",
            "Neg(-x)",
            "Neg(--5)",
            "Not(!true)",
            "Say(\"unterminated)",
            r#"Say("bad \q escape")"#,
            "5()",
            "Add(1); Add(2)",
            "Add(12abc)",
            "Add(0x)",
            "Say('ab')",
            "Say('')",
        ] {
            assert!(CallExpr::parse(bad).is_err(), "expected syntax error: {bad:?}");
        }
    }

    proptest! {
        #[test]
        fn prop_string_literal_roundtrip(s in "[^\"\\\\\n]*") {
            let expr = CallExpr::parse(&format!("Say(\"{s}\")")).unwrap();
            prop_assert_eq!(expr.args, vec![s]);
        }

        #[test]
        fn prop_negative_integers_fold(v in 1i64..i64::MAX) {
            let expr = CallExpr::parse(&format!("Neg(-{v})")).unwrap();
            prop_assert_eq!(expr.args, vec![format!("-{v}")]);
        }
    }
}
