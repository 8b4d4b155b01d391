//! Word splitting and stemming for word-aware matching of symbol names.

use rust_stemmers::Stemmer;

/// Minimum token length. Set to 1 so one-letter parts like the `h` of `h3` survive.
const MIN_TOKEN_LENGTH: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
}

fn classify(c: char) -> Option<CharClass> {
    if c.is_numeric() {
        Some(CharClass::Digit)
    } else if c.is_uppercase() {
        Some(CharClass::Upper)
    } else if c.is_alphabetic() {
        Some(CharClass::Lower)
    } else {
        None
    }
}

/// Tokenizes a symbol name or query into stemmed, lowercase terms.
///
/// Splits on several boundaries:
/// - **scope and snake_case**: "quic::async_read" → ["quic", "async", "read", "async_read"]
/// - **CamelCase**: "HttpServer" → ["http", "server", "httpserver"]
/// - **letters and digits**: "h3" → ["h", "3", "h3"]
///
/// `word_start` marks the start of the complete word, `subword_start` the start
/// of the current part; both the parts and the complete word are emitted.
pub(crate) fn tokenize_and_stem(text: &str, stemmer: &Stemmer) -> Vec<String> {
    let mut tokens = vec![];

    let mut last_class = None;
    let mut word_start = 0;
    let mut subword_start = 0;
    let mut in_word = false;

    for (i, c) in text.char_indices() {
        let class = classify(c);

        if class.is_none() && c != '_' && c != '-' {
            // Word boundary (space, ':', punctuation)
            if in_word {
                flush_word(text, word_start, subword_start, i, &mut tokens, stemmer);
                in_word = false;
            }
            last_class = None;
            continue;
        }

        if !in_word {
            in_word = true;
            word_start = i;
            subword_start = i;
            last_class = class;
            if class.is_none() {
                // Leading '_' or '-' is not part of any part
                subword_start = i + c.len_utf8();
            }
            continue;
        }

        match class {
            None => {
                // snake_case / hyphen-case boundary
                push_token(&text[subword_start..i], &mut tokens, stemmer);
                subword_start = i + c.len_utf8();
            }
            Some(current) => {
                let boundary = matches!(
                    (last_class, current),
                    (Some(CharClass::Lower), CharClass::Upper)
                        | (Some(CharClass::Digit), CharClass::Lower | CharClass::Upper)
                        | (Some(CharClass::Lower | CharClass::Upper), CharClass::Digit)
                );
                if boundary && subword_start < i {
                    push_token(&text[subword_start..i], &mut tokens, stemmer);
                    subword_start = i;
                }
            }
        }
        last_class = class;
    }

    if in_word {
        flush_word(text, word_start, subword_start, text.len(), &mut tokens, stemmer);
    }

    tokens
}

fn flush_word(
    text: &str,
    word_start: usize,
    subword_start: usize,
    end: usize,
    tokens: &mut Vec<String>,
    stemmer: &Stemmer,
) {
    if subword_start != word_start {
        push_token(&text[subword_start.min(end)..end], tokens, stemmer);
    }
    let word = text[word_start..end].trim_matches(['_', '-']);
    push_token(word, tokens, stemmer);
}

/// Adds a lowercased, stemmed token; duplicates are kept out.
fn push_token(token: &str, tokens: &mut Vec<String>, stemmer: &Stemmer) {
    if token.chars().count() < MIN_TOKEN_LENGTH {
        return;
    }
    let lowercase = token.to_lowercase();
    let stemmed = stemmer.stem(&lowercase).into_owned();
    if !tokens.contains(&stemmed) {
        tokens.push(stemmed);
    }
}
