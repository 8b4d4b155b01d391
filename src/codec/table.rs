//! Reading and writing search table files (`all_0.js`, `classes_3.js`, ...).
//!
//! A table file is one global assignment:
//!
//! ```text
//! var searchData=
//! [
//!   ['async_5fclose_6',['async_close',['../classnexus_1_1quic_1_1stream.html#a63...',1,'nexus::quic::stream']]],
//!   ...
//! ];
//! ```
//!
//! Each row is `[key, [display_name, link, link, ...]]` and each link is
//! `[url, relevance, label]`. The nested spelling `[display_name, [link, ...]]`
//! is accepted on input; output always uses the flat spelling.

use super::value::{JsValue, parse_assignments};
use crate::error::CodecError;
use crate::index::{DEFAULT_VAR_NAME, SearchEntry, SearchKey, SearchLink, SearchTable};
use std::fmt::Write as _;

/// Parses a table file.
///
/// The first assignment holding an array is the table; other assignments are ignored.
pub fn parse_table(text: &str) -> Result<SearchTable, CodecError> {
    let (var_name, rows) = parse_assignments(text)?
        .into_iter()
        .find_map(|(name, value)| match value {
            JsValue::Array(rows) => Some((name, rows)),
            _ => None,
        })
        .ok_or_else(|| CodecError::MissingVariable(DEFAULT_VAR_NAME.to_string()))?;

    let entries = rows
        .into_iter()
        .enumerate()
        .map(|(index, row)| parse_entry(index, row))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::trace!("Parsed table '{}' with {} entries", var_name, entries.len());
    Ok(SearchTable { var_name, entries })
}

fn shape(index: usize, message: impl Into<String>) -> CodecError {
    CodecError::Shape {
        index,
        message: message.into(),
    }
}

fn parse_entry(index: usize, row: JsValue) -> Result<SearchEntry, CodecError> {
    let JsValue::Array(row) = row else {
        return Err(shape(index, format!("expected array, found {}", row.kind())));
    };
    let [key, display] = <[JsValue; 2]>::try_from(row)
        .map_err(|row| shape(index, format!("expected [key, [name, ...]], found {} items", row.len())))?;

    let JsValue::Str(key) = key else {
        return Err(shape(index, format!("key must be a string, found {}", key.kind())));
    };
    let key = SearchKey::parse(&key).map_err(|source| CodecError::Key { index, source })?;

    let JsValue::Array(display) = display else {
        return Err(shape(index, format!("display tuple must be an array, found {}", display.kind())));
    };
    let mut display = display.into_iter();
    let display_name = match display.next() {
        Some(JsValue::Str(name)) => name,
        Some(other) => {
            return Err(shape(index, format!("display name must be a string, found {}", other.kind())));
        }
        None => return Err(shape(index, "display tuple is empty")),
    };

    let mut raw_links: Vec<JsValue> = display.collect();
    if is_nested_link_list(&raw_links) {
        if let Some(JsValue::Array(nested)) = raw_links.pop() {
            raw_links = nested;
        }
    }

    let links = raw_links
        .into_iter()
        .enumerate()
        .map(|(n, link)| parse_link(index, n, link))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchEntry {
        key,
        display_name,
        links,
    })
}

/// `[[url, n, label], ...]` as the only element after the display name.
fn is_nested_link_list(rest: &[JsValue]) -> bool {
    match rest {
        [JsValue::Array(items)] => {
            !items.is_empty() && items.iter().all(|item| matches!(item, JsValue::Array(_)))
        }
        _ => false,
    }
}

fn parse_link(index: usize, n: usize, link: JsValue) -> Result<SearchLink, CodecError> {
    let JsValue::Array(parts) = link else {
        return Err(shape(index, format!("link {} must be an array, found {}", n, link.kind())));
    };

    let mut parts = parts.into_iter();
    let (Some(JsValue::Str(url)), Some(JsValue::Int(relevance))) = (parts.next(), parts.next())
    else {
        return Err(shape(index, format!("link {} must start with a url and an integer", n)));
    };
    let relevance = u32::try_from(relevance)
        .map_err(|_| shape(index, format!("link {} relevance {} out of range", n, relevance)))?;

    // Some generator versions omit the label when it would be empty
    let label = match parts.next() {
        Some(JsValue::Str(label)) => label,
        None => String::new(),
        Some(other) => {
            return Err(shape(index, format!("link {} label must be a string, found {}", n, other.kind())));
        }
    };
    if parts.next().is_some() {
        return Err(shape(index, format!("link {} has more than three fields", n)));
    }

    Ok(SearchLink {
        url,
        relevance,
        label,
    })
}

/// Writes a table in the generator's exact layout.
pub fn emit_table(table: &SearchTable) -> String {
    let mut out = String::with_capacity(64 + table.entries.len() * 160);
    let _ = write!(out, "var {}=\n[\n", table.var_name);

    for (i, entry) in table.entries.iter().enumerate() {
        if i > 0 {
            out.push_str(",\n");
        }
        out.push_str("  [");
        push_quoted(&mut out, &entry.key.to_string());
        out.push_str(",[");
        push_quoted(&mut out, &entry.display_name);
        for link in &entry.links {
            out.push_str(",[");
            push_quoted(&mut out, &link.url);
            let _ = write!(out, ",{},", link.relevance);
            push_quoted(&mut out, &link.label);
            out.push(']');
        }
        out.push_str("]]");
    }

    if !table.entries.is_empty() {
        out.push('\n');
    }
    out.push_str("];\n");
    out
}

/// Appends `value` as a single-quoted string literal.
pub(crate) fn push_quoted(out: &mut String, value: &str) {
    push_literal(out, value, '\'');
}

/// Appends `value` as a string literal delimited by `quote`.
pub(crate) fn push_literal(out: &mut String, value: &str, quote: char) {
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    const SAMPLE: &str = "var searchData=\n[\n  ['application_5fcategory_3',['application_category',['../namespacenexus_1_1quic.html#a456b6193f72338827026b59656279557',1,'nexus::quic']]],\n  ['assign_4',['assign',['../classnexus_1_1h3_1_1fields.html#af8b31cf5ec662dc392838c05b4c57d60',1,'nexus::h3::fields']]]\n];\n";

    #[test]
    fn test_parse_sample() {
        let table = parse_table(SAMPLE).unwrap();
        check!(table.var_name == "searchData");
        check!(table.len() == 2);

        let first = &table.entries[0];
        check!(first.key.to_string() == "application_5fcategory_3");
        check!(first.display_name == "application_category");
        check!(first.links.len() == 1);
        check!(first.links[0].relevance == 1);
        check!(first.links[0].label == "nexus::quic");
    }

    #[test]
    fn test_emit_reproduces_sample() {
        let table = parse_table(SAMPLE).unwrap();
        check!(emit_table(&table) == SAMPLE);
    }

    #[test]
    fn test_nested_link_list_accepted() {
        let text = "var searchData=[['at_0',['at',[['../a.html',1,'x::at()'],['../b.html',0,'y::at()']]]]];";
        let table = parse_table(text).unwrap();
        let entry = &table.entries[0];
        check!(entry.links.len() == 2);
        check!(entry.links[1].url == "../b.html");
        check!(!entry.links[1].is_local());
    }

    #[test]
    fn test_two_field_link_has_empty_label() {
        let table = parse_table("var searchData=[['a_0',['a',['../a.html',1]]]];").unwrap();
        check!(table.entries[0].links[0].label.is_empty());
    }

    #[test]
    fn test_shape_errors_name_the_entry() {
        let err = parse_table("var searchData=[['a_0',['a']],['b_1','oops']];").unwrap_err();
        check!(matches!(err, CodecError::Shape { index: 1, .. }));

        let err = parse_table("var searchData=[['nocounter',['a']]];").unwrap_err();
        check!(matches!(err, CodecError::Key { index: 0, .. }));

        let err = parse_table("var searchData=[['a_0',['a',['u','1','l']]]];").unwrap_err();
        check!(err.to_string().contains("link 0 must start with a url and an integer"));
    }

    #[test]
    fn test_missing_array_is_error() {
        let err = parse_table("var indexSectionNames = { 0: \"all\" };").unwrap_err();
        check!(err == CodecError::MissingVariable("searchData".to_string()));
    }

    #[test]
    fn test_emit_escapes_quotes() {
        let table = SearchTable::new(vec![SearchEntry::new(
            SearchKey::new("it's", 0),
            "it's",
            vec![SearchLink::new("../a.html", 1, "a\\b")],
        )]);
        let text = emit_table(&table);
        check!(text.contains(r"['it_27s_0',['it\'s',['../a.html',1,'a\\b']]]"));
        check!(parse_table(&text).unwrap() == table);
    }

    #[test]
    fn test_emit_empty_table() {
        check!(emit_table(&SearchTable::default()) == "var searchData=\n[\n];\n");
        check!(parse_table("var searchData=\n[\n];\n").unwrap().is_empty());
    }
}
