//! Search relevance and ranking.

/// Score for an exact id match.
pub const EXACT: u32 = 100;
/// Score for an id that starts with the query.
pub const PREFIX: u32 = 50;
/// Score for an id that contains the query elsewhere.
pub const CONTAINS: u32 = 10;

/// Per-word scores in word-aware matching.
const WORD_EXACT: u32 = 20;
const WORD_PREFIX: u32 = 10;

/// Calculate simple relevance score between two search ids.
///
/// Returns a score based on how well the query matches the text:
/// - 100: Exact match
/// - 50: Text starts with query
/// - 10: Text contains query at a character boundary
/// - None: No match
pub fn calculate_relevance(text: &str, query: &str) -> Option<u32> {
    if text == query {
        Some(EXACT)
    } else if text.starts_with(query) {
        Some(PREFIX)
    } else if char_starts(text).any(|i| text[i..].starts_with(query)) {
        Some(CONTAINS)
    } else {
        None
    }
}

/// Byte offsets in a search id where an encoded character begins.
///
/// A `_` opens a three-byte escape (`_5f`); offsets inside it are skipped.
fn char_starts(id: &str) -> impl Iterator<Item = usize> + '_ {
    let mut escaped = 0;
    id.char_indices().filter_map(move |(i, c)| {
        if escaped > 0 {
            escaped -= 1;
            return None;
        }
        if c == '_' {
            escaped = 2;
        }
        Some(i)
    })
}

/// Word-aware score: every query word must match a name word, exactly or as a prefix.
///
/// Returns `None` when any query word is unmatched or the query has no words.
pub(crate) fn calculate_word_relevance(name_words: &[String], query_words: &[String]) -> Option<u32> {
    if query_words.is_empty() {
        return None;
    }

    query_words.iter().try_fold(0, |score, query_word| {
        if name_words.iter().any(|w| w == query_word) {
            Some(score + WORD_EXACT)
        } else if name_words.iter().any(|w| w.starts_with(query_word.as_str())) {
            Some(score + WORD_PREFIX)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("async_5faccept", "async_5faccept", Some(100))]
    #[case("async_5faccept", "async_5f", Some(50))]
    #[case("async_5faccept", "accept", Some(10))]
    #[case("async_5faccept", "connect", None)]
    #[case("async_5fread_5fsome", "_5fsome", Some(10))]
    #[case("async_5fread_5fsome", "fr", None)]
    #[case("async_5fread_5fsome", "5f", None)]
    #[case("async_5fread_5fsome", "f", None)]
    #[case("operator_3d_3d", "3d", None)]
    fn test_calculate_relevance(#[case] text: &str, #[case] query: &str, #[case] expected: Option<u32>) {
        check!(calculate_relevance(text, query) == expected);
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_word_relevance() {
        let name = words(&["async", "read", "some"]);
        check!(calculate_word_relevance(&name, &words(&["read"])) == Some(20));
        check!(calculate_word_relevance(&name, &words(&["read", "so"])) == Some(30));
        check!(calculate_word_relevance(&name, &words(&["write"])) == None);
        check!(calculate_word_relevance(&name, &words(&["read", "write"])) == None);
        check!(calculate_word_relevance(&name, &[]) == None);
    }
}
