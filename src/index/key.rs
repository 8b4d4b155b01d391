//! Search key normalization.
//!
//! A key is the URL-safe search id of a display name followed by `_` and a
//! per-file counter, e.g. `async_5faccept_5` for the sixth entry `async_accept`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Converts a display name into its search id.
///
/// - ASCII letters and digits are kept and lowercased
/// - Non-ASCII characters are kept and lowercased
/// - Every other byte becomes `_` plus two lowercase hex digits (`_` → `_5f`)
pub fn search_id(display_name: &str) -> String {
    let mut id = String::with_capacity(display_name.len());
    for c in display_name.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c.to_ascii_lowercase());
        } else if !c.is_ascii() {
            id.extend(c.to_lowercase());
        } else {
            let byte = c as u8;
            id.push('_');
            id.push(HEX[usize::from(byte >> 4)] as char);
            id.push(HEX[usize::from(byte & 0x0f)] as char);
        }
    }
    id
}

/// Converts typed search text into the id space keys live in.
///
/// Leading spaces are dropped the way the search field drops them; everything
/// else goes through [`search_id`].
pub fn query_id(text: &str) -> String {
    search_id(text.trim_start_matches(' '))
}

/// Error returned when a key string cannot be split into id and counter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("key '{0}' has no '_<counter>' suffix")]
    MissingCounter(String),
    #[error("key '{0}' has a non-numeric counter suffix")]
    InvalidCounter(String),
}

/// A normalized search key: `{id}_{counter}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SearchKey {
    id: String,
    counter: u32,
}

impl SearchKey {
    /// Builds the key for `display_name` with the given disambiguating counter.
    pub fn new(display_name: &str, counter: u32) -> Self {
        Self {
            id: search_id(display_name),
            counter,
        }
    }

    /// Builds a key from an already normalized id.
    pub fn from_parts(id: impl Into<String>, counter: u32) -> Self {
        Self {
            id: id.into(),
            counter,
        }
    }

    /// Splits a key on its last `_`. The id may be empty; the counter may not.
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        let (id, counter) = key
            .rsplit_once('_')
            .ok_or_else(|| KeyError::MissingCounter(key.to_string()))?;

        if counter.is_empty() || !counter.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KeyError::InvalidCounter(key.to_string()));
        }
        let counter = counter
            .parse()
            .map_err(|_| KeyError::InvalidCounter(key.to_string()))?;

        Ok(Self {
            id: id.to_string(),
            counter,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// True when this key's id is the normalized form of `display_name`.
    pub fn matches(&self, display_name: &str) -> bool {
        self.id == search_id(display_name)
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.id, self.counter)
    }
}

impl FromStr for SearchKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
