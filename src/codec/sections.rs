//! Section metadata (`searchdata.js`).
//!
//! The metadata file declares three objects keyed by section id: the letters
//! that have a table file, the section's file-name stem, and its display label.

use super::table::push_literal;
use super::value::{JsValue, parse_assignments};
use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

pub const CONTENT_VAR: &str = "indexSectionsWithContent";
pub const NAMES_VAR: &str = "indexSectionNames";
pub const LABELS_VAR: &str = "indexSectionLabels";

/// File name of the section metadata inside a search directory.
pub const SECTIONS_FILE: &str = "searchdata.js";

/// One section of the index, e.g. `all` or `functions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: u32,
    /// File-name stem: tables are `{name}_{n}.js`
    pub name: String,
    pub label: String,
    /// Leading letters with a table, in table-number order
    pub letters: Vec<char>,
}

impl Section {
    /// File name of the table for the `n`-th letter.
    pub fn table_file(&self, n: usize) -> String {
        format!("{}_{}.js", self.name, n)
    }

    /// All table file names of this section with their letters.
    pub fn table_files(&self) -> impl Iterator<Item = (char, String)> + '_ {
        self.letters
            .iter()
            .enumerate()
            .map(|(n, &letter)| (letter, self.table_file(n)))
    }

    /// Table number holding entries that start with `letter`.
    pub fn letter_index(&self, letter: char) -> Option<usize> {
        self.letters.iter().position(|&c| c == letter)
    }
}

/// All sections of a search directory, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionIndex {
    pub sections: Vec<Section>,
}

impl SectionIndex {
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }
}

fn string_members(
    assignments: &mut BTreeMap<String, JsValue>,
    var: &str,
) -> Result<BTreeMap<u32, String>, CodecError> {
    let value = assignments
        .remove(var)
        .ok_or_else(|| CodecError::MissingVariable(var.to_string()))?;
    let JsValue::Object(members) = value else {
        return Err(CodecError::Section {
            id: var.to_string(),
            message: format!("'{}' must be an object, found {}", var, value.kind()),
        });
    };

    members
        .into_iter()
        .map(|(key, value)| {
            let id = key.parse::<u32>().map_err(|_| CodecError::Section {
                id: key.clone(),
                message: format!("'{}' key is not a section number", var),
            })?;
            match value {
                JsValue::Str(s) => Ok((id, s)),
                other => Err(CodecError::Section {
                    id: key,
                    message: format!("'{}' value must be a string, found {}", var, other.kind()),
                }),
            }
        })
        .collect()
}

/// Parses a `searchdata.js` file.
pub fn parse_sections(text: &str) -> Result<SectionIndex, CodecError> {
    let mut assignments: BTreeMap<String, JsValue> = parse_assignments(text)?.into_iter().collect();

    let mut contents = string_members(&mut assignments, CONTENT_VAR)?;
    let names = string_members(&mut assignments, NAMES_VAR)?;
    let mut labels = string_members(&mut assignments, LABELS_VAR)?;

    let sections = names
        .into_iter()
        .map(|(id, name)| {
            let letters = contents.remove(&id).ok_or_else(|| CodecError::Section {
                id: id.to_string(),
                message: format!("missing from '{}'", CONTENT_VAR),
            })?;
            let label = labels.remove(&id).ok_or_else(|| CodecError::Section {
                id: id.to_string(),
                message: format!("missing from '{}'", LABELS_VAR),
            })?;
            Ok(Section {
                id,
                name,
                label,
                letters: letters.chars().collect(),
            })
        })
        .collect::<Result<Vec<_>, CodecError>>()?;

    if let Some(id) = contents.keys().chain(labels.keys()).next() {
        return Err(CodecError::Section {
            id: id.to_string(),
            message: format!("missing from '{}'", NAMES_VAR),
        });
    }

    Ok(SectionIndex { sections })
}

fn emit_object(out: &mut String, var: &str, members: impl Iterator<Item = (u32, String)>) {
    let _ = write!(out, "var {} =\n{{\n", var);
    for (i, (id, value)) in members.enumerate() {
        if i > 0 {
            out.push_str(",\n");
        }
        let _ = write!(out, "  {}: ", id);
        push_literal(out, &value, '"');
    }
    out.push_str("\n};\n\n");
}

/// Writes a `searchdata.js` file.
pub fn emit_sections(index: &SectionIndex) -> String {
    let mut out = String::new();
    emit_object(
        &mut out,
        CONTENT_VAR,
        index
            .sections
            .iter()
            .map(|s| (s.id, s.letters.iter().collect())),
    );
    emit_object(
        &mut out,
        NAMES_VAR,
        index.sections.iter().map(|s| (s.id, s.name.clone())),
    );
    emit_object(
        &mut out,
        LABELS_VAR,
        index.sections.iter().map(|s| (s.id, s.label.clone())),
    );
    out
}
