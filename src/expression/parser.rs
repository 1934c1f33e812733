//! Grammar for rule aggregation expressions.
//!
//! ```text
//! expr    = term (("+" | "-") term)*
//! term    = unary (("*" | "/") unary)*
//! unary   = "-" unary | primary
//! primary = "(" expr ")" | ident "(" expr? ")" | ident "." ident "(" ")" | ident | number
//! ```
//!
//! The parser only checks shape. Names are resolved afterwards so that an
//! unknown function or identifier gets a precise message instead of a
//! generic syntax error.
//!
//! Both the nesting of parentheses, calls and unary minus and the height of
//! the resulting tree are capped at [`MAX_DEPTH`], so resolving, evaluating
//! and dropping a tree never recurses deeper than that.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0, one_of},
    combinator::{map, opt, recognize},
    error::ErrorKind,
    multi::many0,
    number::complete::double,
    sequence::{delimited, pair, preceded},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    fn from_char(c: char) -> Self {
        match c {
            '+' => BinOp::Add,
            '-' => BinOp::Sub,
            '*' => BinOp::Mul,
            _ => BinOp::Div,
        }
    }
}

/// Unresolved syntax tree. Borrowed names point into the source string.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Syntax<'a> {
    Number(f64),
    Ident(&'a str),
    Call {
        function: &'a str,
        argument: Option<Box<Syntax<'a>>>,
    },
    Method {
        receiver: &'a str,
        function: &'a str,
    },
    Neg(Box<Syntax<'a>>),
    Binary(BinOp, Box<Syntax<'a>>, Box<Syntax<'a>>),
}

/// Limit on both nesting depth and tree height.
pub(crate) const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseError<'a> {
    /// Syntax error; holds the unparsed remainder.
    Syntax(&'a str),
    /// Nesting or tree height above [`MAX_DEPTH`].
    TooDeep,
}

/// A subtree together with its height (a leaf has height 1).
type Measured<'a> = (Syntax<'a>, usize);

/// Parses a complete expression.
pub(crate) fn parse(input: &str) -> Result<Syntax<'_>, ParseError<'_>> {
    match delimited(multispace0, |i| parse_expr(i, 0), multispace0).parse(input) {
        Ok(("", (syntax, _))) => Ok(syntax),
        Ok((rest, _)) => Err(ParseError::Syntax(rest)),
        Err(nom::Err::Failure(e)) if e.code == ErrorKind::TooLarge => Err(ParseError::TooDeep),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(ParseError::Syntax(e.input)),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::Syntax("")),
    }
}

fn too_deep<T>(input: &str) -> IResult<&str, T> {
    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        ErrorKind::TooLarge,
    )))
}

fn parse_expr(input: &str, depth: usize) -> IResult<&str, Measured<'_>> {
    let (input, first) = parse_term(input, depth)?;
    let (input, rest) = many0(pair(
        delimited(multispace0, one_of("+-"), multispace0),
        |i| parse_term(i, depth),
    ))
    .parse(input)?;
    fold_binary(input, first, rest)
}

fn parse_term(input: &str, depth: usize) -> IResult<&str, Measured<'_>> {
    let (input, first) = parse_unary(input, depth)?;
    let (input, rest) = many0(pair(
        delimited(multispace0, one_of("*/"), multispace0),
        |i| parse_unary(i, depth),
    ))
    .parse(input)?;
    fold_binary(input, first, rest)
}

// Operator chains lean left, so a long flat chain is as tall as it is long.
fn fold_binary<'a>(
    input: &'a str,
    first: Measured<'a>,
    rest: Vec<(char, Measured<'a>)>,
) -> IResult<&'a str, Measured<'a>> {
    let mut acc = first;
    for (op, (rhs, rhs_height)) in rest {
        let height = acc.1.max(rhs_height) + 1;
        if height > MAX_DEPTH {
            return too_deep(input);
        }
        acc = (
            Syntax::Binary(BinOp::from_char(op), Box::new(acc.0), Box::new(rhs)),
            height,
        );
    }
    Ok((input, acc))
}

fn parse_unary(input: &str, depth: usize) -> IResult<&str, Measured<'_>> {
    if depth >= MAX_DEPTH {
        return too_deep(input);
    }
    alt((
        map(
            preceded((char('-'), multispace0), |i| parse_unary(i, depth + 1)),
            |(inner, height)| (Syntax::Neg(Box::new(inner)), height + 1),
        ),
        |i| parse_primary(i, depth),
    ))
    .parse(input)
    .and_then(|(input, measured)| {
        if measured.1 > MAX_DEPTH {
            too_deep(input)
        } else {
            Ok((input, measured))
        }
    })
}

fn parse_primary(input: &str, depth: usize) -> IResult<&str, Measured<'_>> {
    alt((
        delimited(
            (char('('), multispace0),
            |i| parse_expr(i, depth + 1),
            (multispace0, char(')')),
        ),
        |i| parse_named(i, depth),
        map(double, |n| (Syntax::Number(n), 1)),
    ))
    .parse(input)
}

/// `name`, `name(arg)` or `receiver.name()`.
fn parse_named(input: &str, depth: usize) -> IResult<&str, Measured<'_>> {
    let (input, name) = parse_ident(input)?;

    let mut call = delimited(
        (multispace0, char('('), multispace0),
        opt(|i| parse_expr(i, depth + 1)),
        (multispace0, char(')')),
    );
    match call.parse(input) {
        Ok((input, argument)) => {
            let height = argument.as_ref().map_or(1, |(_, h)| h + 1);
            return Ok((
                input,
                (
                    Syntax::Call {
                        function: name,
                        argument: argument.map(|(syntax, _)| Box::new(syntax)),
                    },
                    height,
                ),
            ));
        }
        Err(e @ nom::Err::Failure(_)) => return Err(e),
        Err(_) => {}
    }

    let mut method = delimited(
        (multispace0, char('.'), multispace0),
        parse_ident,
        (multispace0, char('('), multispace0, char(')')),
    );
    if let Ok((input, function)) = method.parse(input) {
        return Ok((
            input,
            (
                Syntax::Method {
                    receiver: name,
                    function,
                },
                1,
            ),
        ));
    }

    Ok((input, (Syntax::Ident(name), 1)))
}

fn parse_ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_call_form() {
        let syntax = parse("sum(values)").unwrap();
        assert_eq!(
            syntax,
            Syntax::Call {
                function: "sum",
                argument: Some(Box::new(Syntax::Ident("values"))),
            }
        );
    }

    #[test]
    fn parses_method_form_with_whitespace() {
        let syntax = parse("  values . Average ( ) ").unwrap();
        assert_eq!(
            syntax,
            Syntax::Method {
                receiver: "values",
                function: "Average",
            }
        );
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let syntax = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            syntax,
            Syntax::Binary(
                BinOp::Add,
                Box::new(Syntax::Number(1.0)),
                Box::new(Syntax::Binary(
                    BinOp::Mul,
                    Box::new(Syntax::Number(2.0)),
                    Box::new(Syntax::Number(3.0)),
                )),
            )
        );
    }

    #[test]
    fn subtraction_is_left_associative() {
        let syntax = parse("8 - 4 - 2").unwrap();
        assert_eq!(
            syntax,
            Syntax::Binary(
                BinOp::Sub,
                Box::new(Syntax::Binary(
                    BinOp::Sub,
                    Box::new(Syntax::Number(8.0)),
                    Box::new(Syntax::Number(4.0)),
                )),
                Box::new(Syntax::Number(2.0)),
            )
        );
    }

    #[test]
    fn reports_trailing_input() {
        assert_eq!(parse("sum(values) )"), Err(ParseError::Syntax(")")));
    }

    #[test]
    fn rejects_deep_parenthesis_nesting() {
        let source = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
        assert_eq!(parse(&source), Err(ParseError::TooDeep));
    }

    #[test]
    fn rejects_long_unary_minus_run() {
        let source = format!("{}1", "-".repeat(5000));
        assert_eq!(parse(&source), Err(ParseError::TooDeep));
    }

    #[test]
    fn rejects_chain_taller_than_limit() {
        let source = vec!["1"; MAX_DEPTH + 1].join(" + ");
        assert_eq!(parse(&source), Err(ParseError::TooDeep));
    }

    #[test]
    fn accepts_chain_at_limit() {
        let source = vec!["1"; MAX_DEPTH].join(" + ");
        assert!(parse(&source).is_ok());
    }

    #[test]
    fn unclosed_deep_nesting_is_still_too_deep() {
        let source = "(".repeat(MAX_DEPTH + 10);
        assert_eq!(parse(&source), Err(ParseError::TooDeep));
    }

    #[test]
    fn rejects_unbalanced_parenthesis() {
        assert!(parse("(sum(values)").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse("   ").is_err());
    }
}
