//! Parser for label text.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! label    := expr ("," expr)* | <empty>
//! expr     := and-expr (("||" | "|") and-expr)*
//! and-expr := unary (("&&" | "&") unary)*
//! unary    := "!" unary | "(" expr ")" | term
//! term     := word ("=" word)?
//! word     := [A-Za-z0-9_.+-]+
//! ```
//!
//! Empty label text parses to an empty expression list; the protocol layer
//! treats that as a denial.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    multi::many0,
    sequence::{delimited, preceded, terminated},
    IResult,
};

use super::AttributeExpr;
use crate::error::{DomainError, DomainResult};
use crate::model::{Attribute, BARE_VALUE};

/// Parses label text into an ordered list of expressions.
pub fn parse_label_list(text: &str) -> DomainResult<Vec<AttributeExpr>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match all_consuming(terminated(expr_list, multispace0))(text) {
        Ok((_, exprs)) => Ok(exprs),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(syntax_error(text, e.input))
        }
        // Complete parsers never return Incomplete.
        Err(nom::Err::Incomplete(_)) => Err(syntax_error(text, "")),
    }
}

fn syntax_error(text: &str, remaining: &str) -> DomainError {
    let position = text.len() - remaining.len();
    let message = if remaining.is_empty() {
        "unexpected end of input".to_string()
    } else {
        let snippet: String = remaining.chars().take(16).collect();
        format!("unexpected input near '{snippet}'")
    };
    DomainError::LabelSyntax { position, message }
}

fn expr_list(input: &str) -> IResult<&str, Vec<AttributeExpr>> {
    let (input, first) = expr(input)?;
    let (input, rest) = many0(preceded(list_comma, expr))(input)?;
    let mut exprs = vec![first];
    exprs.extend(rest);
    Ok((input, exprs))
}

fn list_comma(input: &str) -> IResult<&str, char> {
    preceded(multispace0, char(','))(input)
}

fn expr(input: &str) -> IResult<&str, AttributeExpr> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(or_op, and_expr))(input)?;
    Ok((input, fold_binary(first, rest, AttributeExpr::Or)))
}

fn and_expr(input: &str) -> IResult<&str, AttributeExpr> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(preceded(and_op, unary))(input)?;
    Ok((input, fold_binary(first, rest, AttributeExpr::And)))
}

fn fold_binary(
    first: AttributeExpr,
    rest: Vec<AttributeExpr>,
    combine: fn(Box<AttributeExpr>, Box<AttributeExpr>) -> AttributeExpr,
) -> AttributeExpr {
    rest.into_iter()
        .fold(first, |acc, e| combine(Box::new(acc), Box::new(e)))
}

fn or_op(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, alt((tag("||"), tag("|"))))(input)
}

fn and_op(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, alt((tag("&&"), tag("&"))))(input)
}

fn unary(input: &str) -> IResult<&str, AttributeExpr> {
    let (input, _) = multispace0(input)?;
    alt((
        map(preceded(char('!'), unary), |e| {
            AttributeExpr::Not(Box::new(e))
        }),
        delimited(char('('), expr, preceded(multispace0, char(')'))),
        term,
    ))(input)
}

fn term(input: &str) -> IResult<&str, AttributeExpr> {
    let (input, name) = word(input)?;
    let (input, value) = opt(preceded(
        delimited(multispace0, char('='), multispace0),
        word,
    ))(input)?;
    Ok((
        input,
        AttributeExpr::Term {
            attribute: Attribute::new(name),
            value: value.unwrap_or(BARE_VALUE).to_string(),
        },
    ))
}

fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::AttributeExpr as E;

    #[test]
    fn empty_label_is_empty_list() {
        assert_eq!(parse_label_list("").unwrap(), Vec::new());
        assert_eq!(parse_label_list("   ").unwrap(), Vec::new());
    }

    #[test]
    fn bare_term_parses_as_true_value() {
        let exprs = parse_label_list("employee").unwrap();
        assert_eq!(exprs, vec![E::term("employee", "true")]);
    }

    #[test]
    fn term_with_value_and_spaces() {
        let exprs = parse_label_list("credentials = hnd").unwrap();
        assert_eq!(exprs, vec![E::term("credentials", "hnd")]);
    }

    #[test]
    fn comma_separated_list_preserves_order() {
        let exprs = parse_label_list("a=1, b, c=3").unwrap();
        assert_eq!(
            exprs,
            vec![E::term("a", "1"), E::term("b", "true"), E::term("c", "3")]
        );
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let exprs = parse_label_list("a || b && c").unwrap();
        assert_eq!(
            exprs,
            vec![E::Or(
                Box::new(E::term("a", "true")),
                Box::new(E::And(
                    Box::new(E::term("b", "true")),
                    Box::new(E::term("c", "true")),
                )),
            )]
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let exprs = parse_label_list("(a || b) && c").unwrap();
        assert_eq!(
            exprs,
            vec![E::And(
                Box::new(E::Or(
                    Box::new(E::term("a", "true")),
                    Box::new(E::term("b", "true")),
                )),
                Box::new(E::term("c", "true")),
            )]
        );
    }

    #[test]
    fn negation_applies_to_unary() {
        let exprs = parse_label_list("!contractor && employee").unwrap();
        assert_eq!(
            exprs,
            vec![E::And(
                Box::new(E::Not(Box::new(E::term("contractor", "true")))),
                Box::new(E::term("employee", "true")),
            )]
        );
    }

    #[test]
    fn single_char_operators_accepted() {
        assert_eq!(
            parse_label_list("a & b").unwrap(),
            parse_label_list("a && b").unwrap()
        );
        assert_eq!(
            parse_label_list("a | b").unwrap(),
            parse_label_list("a || b").unwrap()
        );
    }

    #[test]
    fn hyphenated_values_parse() {
        let exprs = parse_label_list("credentials = ordinary-degree").unwrap();
        assert_eq!(exprs, vec![E::term("credentials", "ordinary-degree")]);
    }

    #[test]
    fn rejects_dangling_operator() {
        let err = parse_label_list("a &&").unwrap_err();
        assert!(matches!(
            err,
            crate::DomainError::LabelSyntax { .. }
        ));
    }

    #[test]
    fn rejects_unbalanced_parenthesis() {
        assert!(parse_label_list("(a && b").is_err());
    }

    #[test]
    fn rejects_missing_value_after_equals() {
        assert!(parse_label_list("credentials =").is_err());
    }

    #[test]
    fn rejects_trailing_comma() {
        assert!(parse_label_list("a,").is_err());
    }

    #[test]
    fn rejects_garbage_with_position() {
        let err = parse_label_list("a ?? b").unwrap_err();
        match err {
            crate::DomainError::LabelSyntax { position, .. } => assert!(position <= 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
