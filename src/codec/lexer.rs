//! Token-level parsers for the JavaScript literal subset search files are written in.

use crate::error::CodecError;
use winnow::ascii::digit1;
use winnow::combinator::fail;
use winnow::error::{ContextError, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_till, take_until, take_while};

pub(crate) type PResult<T> = Result<T, ContextError>;

pub(crate) const fn expected(what: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(what))
}

/// A hard failure whose label is reported verbatim.
pub(crate) const fn label(message: &'static str) -> StrContext {
    StrContext::Label(message)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Skips whitespace, a byte order mark, and both comment styles.
pub(crate) fn trivia(input: &mut &str) -> PResult<()> {
    loop {
        let _: &str =
            take_while(0.., |c: char| c.is_whitespace() || c == '\u{feff}').parse_next(input)?;
        if input.starts_with("//") {
            let _: &str = take_till(0.., '\n').parse_next(input)?;
        } else if input.starts_with("/*") {
            let _: &str = "/*".parse_next(input)?;
            let _: &str = take_until(0.., "*/")
                .context(label("unterminated block comment"))
                .parse_next(input)?;
            let _: &str = "*/".parse_next(input)?;
        } else {
            return Ok(());
        }
    }
}

pub(crate) fn identifier<'s>(input: &mut &'s str) -> PResult<&'s str> {
    (one_of(is_ident_start), take_while(0.., is_ident_continue))
        .take()
        .parse_next(input)
}

pub(crate) fn integer(input: &mut &str) -> PResult<u64> {
    digit1
        .try_map(str::parse::<u64>)
        .context(label("integer out of range"))
        .parse_next(input)
}

/// A single- or double-quoted string with JavaScript escapes resolved.
pub(crate) fn string(input: &mut &str) -> PResult<String> {
    let quote = one_of(['\'', '"']).parse_next(input)?;
    let mut value = String::new();

    loop {
        let chunk: &str =
            take_till(0.., |c: char| c == quote || c == '\\' || c == '\n').parse_next(input)?;
        value.push_str(chunk);

        let checkpoint = *input;
        match any.context(label("unterminated string")).parse_next(input)? {
            '\\' => value.push(escape(input)?),
            '\n' => {
                *input = checkpoint;
                return fail
                    .context(label("newline in string literal"))
                    .parse_next(input);
            }
            _ => return Ok(value),
        }
    }
}

fn escape(input: &mut &str) -> PResult<char> {
    let c = any
        .context(label("unterminated escape sequence"))
        .parse_next(input)?;
    Ok(match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'b' => '\u{8}',
        'f' => '\u{c}',
        '0' => '\0',
        'x' => hex(2)
            .verify_map(char::from_u32)
            .context(label("invalid \\x escape"))
            .parse_next(input)?,
        'u' => unicode_escape(input)?,
        // \\ \' \" \/ and any other escaped character stand for themselves
        other => other,
    })
}

fn hex<'s>(count: usize) -> impl Parser<&'s str, u32, ContextError> {
    take_while(count, |c: char| c.is_ascii_hexdigit())
        .try_map(|digits: &str| u32::from_str_radix(digits, 16))
        .context(label("invalid hex digit in escape"))
}

fn unicode_escape(input: &mut &str) -> PResult<char> {
    let code = hex(4).parse_next(input)?;
    if !(0xD800..0xDC00).contains(&code) {
        return match char::from_u32(code) {
            Some(c) => Ok(c),
            None => fail.context(label("invalid \\u escape")).parse_next(input),
        };
    }

    // High surrogate, a low one must follow as another \u escape
    let _: &str = "\\u"
        .context(label("unpaired surrogate in \\u escape"))
        .parse_next(input)?;
    hex(4)
        .verify(|low: &u32| (0xDC00..0xE000).contains(low))
        .verify_map(|low| char::from_u32(0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00)))
        .context(label("invalid low surrogate in \\u escape"))
        .parse_next(input)
}

/// Names the token at the start of `rest` for error messages.
fn describe(rest: &str) -> String {
    let mut ahead = rest;
    match rest.chars().next() {
        Some(c) if c.is_ascii_digit() => {
            let digits: PResult<&str> = digit1.parse_next(&mut ahead);
            format!("integer {}", digits.unwrap_or_default())
        }
        Some('\'' | '"') => "string".to_string(),
        Some(c) if is_ident_start(c) => match identifier(&mut ahead) {
            Ok(name) => format!("identifier '{}'", name),
            Err(_) => format!("'{}'", c),
        },
        Some(c) => format!("'{}'", c),
        None => "end of input".to_string(),
    }
}

fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |last| last.chars().count())
        + 1;
    (line, column)
}

/// Converts a parse failure into a `CodecError` positioned within `text`.
///
/// `rest` is the unparsed suffix of `text` at the point of failure.
pub(crate) fn codec_error(text: &str, rest: &str, error: &ContextError) -> CodecError {
    let mut ahead = rest;
    let _ = trivia(&mut ahead);

    let labelled = error.context().find_map(|context| match context {
        StrContext::Label(message) => Some(*message),
        _ => None,
    });
    let position = if labelled.is_some() { rest } else { ahead };
    let (line, column) = line_column(text, text.len() - position.len());

    if let Some(message) = labelled {
        return CodecError::Syntax {
            line,
            column,
            message: message.to_string(),
        };
    }

    let expected = error
        .context()
        .filter_map(|context| match context {
            StrContext::Expected(value) => Some(value.to_string()),
            _ => None,
        })
        .collect::<Vec<_>>();
    let expected = if expected.is_empty() {
        "value".to_string()
    } else {
        expected.join(" or ")
    };

    if ahead.is_empty() {
        return CodecError::UnexpectedEof(expected);
    }
    CodecError::Syntax {
        line,
        column,
        message: format!("expected {}, found {}", expected, describe(ahead)),
    }
}
