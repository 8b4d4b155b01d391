//! Literal values and top-level `var name = value;` assignments.

use super::lexer::{
    PResult, codec_error, expected, identifier, integer, label, string, trivia,
};
use crate::error::CodecError;
use winnow::combinator::{fail, opt};
use winnow::prelude::*;
use winnow::token::one_of;

/// A parsed JavaScript literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JsValue {
    Str(String),
    Int(u64),
    Array(Vec<JsValue>),
    /// Object members in source order. Keys are integers or strings, both kept as text.
    Object(Vec<(String, JsValue)>),
}

impl JsValue {
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// Deepest array or object nesting accepted. Table files nest four levels.
pub(crate) const MAX_DEPTH: usize = 64;

fn value(input: &mut &str, depth: usize) -> PResult<JsValue> {
    trivia(input)?;
    match input.chars().next() {
        Some('\'' | '"') => string.map(JsValue::Str).parse_next(input),
        Some(c) if c.is_ascii_digit() => integer.map(JsValue::Int).parse_next(input),
        Some('[' | '{') if depth >= MAX_DEPTH => fail
            .context(label("arrays and objects nested more than 64 levels deep"))
            .parse_next(input),
        Some('[') => array(input, depth + 1),
        Some('{') => object(input, depth + 1),
        _ => fail.context(expected("value")).parse_next(input),
    }
}

/// Consumes `close` or a separating comma, reporting whether the list ended.
fn list_end(input: &mut &str, close: char, what: &'static str) -> PResult<bool> {
    trivia(input)?;
    match input.chars().next() {
        Some(',') => {
            let _ = ','.parse_next(input)?;
            Ok(false)
        }
        Some(c) if c == close => {
            let _: char = one_of(close).parse_next(input)?;
            Ok(true)
        }
        _ => fail.context(expected(what)).parse_next(input),
    }
}

/// Consumes `close` when it comes next, allowing a trailing comma before it.
fn closes(input: &mut &str, close: char) -> PResult<bool> {
    trivia(input)?;
    Ok(opt(close).parse_next(input)?.is_some())
}

fn array(input: &mut &str, depth: usize) -> PResult<JsValue> {
    let _ = '['.parse_next(input)?;
    let mut items = Vec::new();
    loop {
        if closes(input, ']')? {
            return Ok(JsValue::Array(items));
        }
        items.push(value(input, depth)?);
        if list_end(input, ']', "',' or ']'")? {
            return Ok(JsValue::Array(items));
        }
    }
}

fn object_key(input: &mut &str) -> PResult<String> {
    trivia(input)?;
    match input.chars().next() {
        Some(c) if c.is_ascii_digit() => integer.map(|n| n.to_string()).parse_next(input),
        Some('\'' | '"') => string(input),
        _ => identifier
            .map(str::to_string)
            .context(expected("object key"))
            .parse_next(input),
    }
}

fn object(input: &mut &str, depth: usize) -> PResult<JsValue> {
    let _ = '{'.parse_next(input)?;
    let mut members = Vec::new();
    loop {
        if closes(input, '}')? {
            return Ok(JsValue::Object(members));
        }
        let key = object_key(input)?;
        trivia(input)?;
        let _ = ':'.context(expected("':'")).parse_next(input)?;
        members.push((key, value(input, depth)?));
        if list_end(input, '}', "',' or '}'")? {
            return Ok(JsValue::Object(members));
        }
    }
}

/// `var name = value;`, with `var` and the semicolon optional.
fn assignment(input: &mut &str) -> PResult<(String, JsValue)> {
    let mut name = identifier
        .context(expected("variable declaration"))
        .parse_next(input)?;
    if name == "var" {
        trivia(input)?;
        name = identifier
            .context(expected("variable name"))
            .parse_next(input)?;
    }
    trivia(input)?;
    let _ = '='.context(expected("'='")).parse_next(input)?;
    let value = value(input, 0)?;
    trivia(input)?;
    let _ = opt(';').parse_next(input)?;
    Ok((name.to_string(), value))
}

/// Parses every top-level assignment in `text`, in source order.
pub(crate) fn parse_assignments(text: &str) -> Result<Vec<(String, JsValue)>, CodecError> {
    let mut input = text;
    let mut assignments = Vec::new();
    loop {
        trivia(&mut input).map_err(|e| codec_error(text, input, &e))?;
        if input.is_empty() {
            return Ok(assignments);
        }
        let assignment = assignment(&mut input).map_err(|e| codec_error(text, input, &e))?;
        assignments.push(assignment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_nested_values() {
        let parsed = parse_assignments("var t=[['k_0',['n',['u',1,'l']]]];").unwrap();
        check!(parsed.len() == 1);
        check!(parsed[0].0 == "t");
        let JsValue::Array(rows) = &parsed[0].1 else {
            panic!("expected array");
        };
        check!(rows.len() == 1);
    }

    #[test]
    fn test_objects_and_multiple_assignments() {
        let parsed =
            parse_assignments("var a =\n{\n  0: \"abc\",\n  1: \"x\"\n};\n\nvar b = { 0: \"all\" };")
                .unwrap();
        check!(parsed.len() == 2);
        check!(
            parsed[0].1
                == JsValue::Object(vec![
                    ("0".into(), JsValue::Str("abc".into())),
                    ("1".into(), JsValue::Str("x".into())),
                ])
        );
        check!(parsed[1].0 == "b");
    }

    #[test]
    fn test_trailing_comma_accepted() {
        let parsed = parse_assignments("var a=[1,2,];").unwrap();
        check!(parsed[0].1 == JsValue::Array(vec![JsValue::Int(1), JsValue::Int(2)]));
    }

    #[test]
    fn test_missing_bracket_reports_eof() {
        let err = parse_assignments("var a=[1,2").unwrap_err();
        check!(matches!(err, CodecError::UnexpectedEof(_)));
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        let text = format!("var searchData={};", "[".repeat(200_000));
        let err = parse_assignments(&text).unwrap_err();
        check!(matches!(err, CodecError::Syntax { line: 1, .. }));
        check!(err.to_string().contains("nested more than 64 levels"));
    }

    #[test]
    fn test_nesting_at_limit_accepted() {
        let depth = MAX_DEPTH;
        let text = format!("var a={}{};", "[".repeat(depth), "]".repeat(depth));
        check!(parse_assignments(&text).is_ok());
    }

    #[test]
    fn test_missing_equals_names_expectation() {
        let err = parse_assignments("var a [1]").unwrap_err();
        check!(err.to_string() == "line 1, column 7: expected '=', found '['");
    }

    #[test]
    fn test_unexpected_token_reports_position() {
        let err = parse_assignments("var a=\n[1 2]").unwrap_err();
        check!(
            err.to_string() == "line 2, column 4: expected ',' or ']', found integer 2"
        );
    }
}
