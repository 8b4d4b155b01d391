//! Documented symbols, the input of index generation.

use serde::{Deserialize, Serialize};

/// Sections the generator knows, in the order it declares them, with their labels.
pub const KNOWN_SECTIONS: &[(&str, &str)] = &[
    ("all", "All"),
    ("classes", "Classes"),
    ("namespaces", "Namespaces"),
    ("files", "Files"),
    ("functions", "Functions"),
    ("variables", "Variables"),
    ("typedefs", "Typedefs"),
    ("enums", "Enumerations"),
    ("enumvalues", "Enumerator"),
    ("defines", "Macros"),
    ("pages", "Pages"),
];

/// Name of the section every symbol belongs to.
pub const ALL_SECTION: &str = "all";

/// Label for a section name; unknown sections get their name capitalized.
pub fn section_label(name: &str) -> String {
    KNOWN_SECTIONS
        .iter()
        .find(|(known, _)| *known == name)
        .map_or_else(
            || {
                let mut chars = name.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            },
            |(_, label)| (*label).to_string(),
        )
}

/// Declaration order of a section name; unknown sections sort after known ones.
pub(crate) fn section_rank(name: &str) -> usize {
    KNOWN_SECTIONS
        .iter()
        .position(|(known, _)| *known == name)
        .unwrap_or(KNOWN_SECTIONS.len())
}

/// Kind of a documented symbol, as written in `symbols.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Namespace,
    Class,
    Struct,
    Union,
    File,
    Function,
    Variable,
    Typedef,
    Enum,
    EnumValue,
    Define,
    Page,
}

impl SymbolKind {
    /// Section the symbol is listed under besides `all`.
    pub const fn section(self) -> &'static str {
        match self {
            Self::Namespace => "namespaces",
            Self::Class | Self::Struct | Self::Union => "classes",
            Self::File => "files",
            Self::Function => "functions",
            Self::Variable => "variables",
            Self::Typedef => "typedefs",
            Self::Enum => "enums",
            Self::EnumValue => "enumvalues",
            Self::Define => "defines",
            Self::Page => "pages",
        }
    }
}

/// A documented symbol and the page that documents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Display name, e.g. `async_accept`
    pub name: String,
    pub kind: SymbolKind,
    /// Enclosing scope, e.g. `nexus::quic::acceptor`
    #[serde(default)]
    pub scope: Option<String>,
    /// Argument list appended to the qualified name, e.g. `(connection &conn)`
    #[serde(default)]
    pub args: Option<String>,
    /// Page URL relative to the documentation root, with optional anchor
    pub url: String,
    /// Resolved through a tag file rather than documented here
    #[serde(default)]
    pub external: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            scope: None,
            args: None,
            url: url.into(),
            external: false,
        }
    }

    #[must_use]
    pub fn in_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = Some(args.into());
        self
    }

    #[must_use]
    pub const fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// `scope::name`, or just the name at global scope.
    pub fn qualified_name(&self) -> String {
        match &self.scope {
            Some(scope) if !scope.is_empty() => format!("{}::{}", scope, self.name),
            _ => self.name.clone(),
        }
    }

    /// Label used when this symbol is the only link of its entry.
    pub(crate) fn single_label(&self) -> &str {
        match &self.scope {
            Some(scope) if !scope.is_empty() => scope,
            _ => &self.name,
        }
    }

    /// Label used when the entry has several links.
    pub(crate) fn overload_label(&self) -> String {
        let mut label = self.qualified_name();
        if let Some(args) = &self.args {
            label.push_str(args);
        }
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("all", "All")]
    #[case("enums", "Enumerations")]
    #[case("defines", "Macros")]
    #[case("concepts", "Concepts")]
    #[case("", "")]
    fn test_section_label(#[case] name: &str, #[case] expected: &str) {
        check!(section_label(name) == expected);
    }

    #[test]
    fn test_labels() {
        let accept = Symbol::new("accept", SymbolKind::Function, "a.html#x")
            .in_scope("nexus::quic::acceptor")
            .with_args("(connection &conn)");
        check!(accept.single_label() == "nexus::quic::acceptor");
        check!(accept.overload_label() == "nexus::quic::acceptor::accept(connection &conn)");

        let nexus = Symbol::new("nexus", SymbolKind::Namespace, "namespacenexus.html");
        check!(nexus.single_label() == "nexus");
        check!(nexus.qualified_name() == "nexus");
    }

    #[test]
    fn test_deserialize_defaults() {
        let symbol: Symbol = serde_json::from_str(
            r#"{"name":"stream","kind":"class","scope":"nexus::h3","url":"classnexus_1_1h3_1_1stream.html"}"#,
        )
        .unwrap();
        check!(symbol.kind == SymbolKind::Class);
        check!(symbol.args.is_none());
        check!(!symbol.external);
        check!(symbol.kind.section() == "classes");
    }
}
