mod common;

use assert2::check;
use common::nexus_symbols;
use doxysearch_mcp::build::{IndexBuilder, SymbolKind};
use doxysearch_mcp::codec::{parse_sections, parse_table};
use doxysearch_mcp::{Catalog, validate_catalog};
use tempfile::TempDir;

fn builder() -> IndexBuilder {
    let mut builder = IndexBuilder::new();
    for symbol in nexus_symbols() {
        builder.add(symbol);
    }
    builder
}

/// Test: Building twice from the same symbols writes identical files.
#[test]
fn build_is_deterministic() {
    let first = builder().build().files();
    let second = builder().build().files();
    check!(first == second);

    // Insertion order does not matter
    let mut reversed = IndexBuilder::new();
    for symbol in nexus_symbols().into_iter().rev() {
        reversed.add(symbol);
    }
    let reversed = reversed.build().files();
    let names = |files: &[(String, String)]| files.iter().map(|(n, _)| n.clone()).collect::<Vec<_>>();
    check!(names(&reversed) == names(&first));
    check!(reversed[0] == first[0]);
}

/// Test: Every emitted file parses back to what was built.
#[test]
fn emitted_files_parse_back() {
    let bundle = builder().build();
    for (name, text) in bundle.files() {
        if name == "searchdata.js" {
            check!(parse_sections(&text).unwrap() == bundle.sections);
        } else {
            check!(&parse_table(&text).unwrap() == &bundle.tables[&name], "table {}", name);
        }
    }
}

/// Test: A written directory loads and validates without findings.
#[test]
fn written_directory_validates_clean() {
    let temp = TempDir::new().unwrap();
    builder().build().write_to(temp.path()).unwrap();

    let catalog = Catalog::load(temp.path()).unwrap();
    let report = validate_catalog(&catalog);
    check!(report.violations.is_empty(), "{:?}", report.violations);
    check!(report.entries_checked > 0);
}

/// Test: Links carry the URL prefix and external links have relevance 0.
#[test]
fn link_urls_and_relevance() {
    let bundle = builder().build();
    let typedefs = &bundle.tables["typedefs_0.js"];
    let error_code = typedefs.find("error_code").unwrap();
    check!(error_code.links[0].url == "https://en.cppreference.com/w/cpp/error/error_code");
    check!(!error_code.links[0].is_local());
    check!(error_code.links[0].label == "std");

    let classes = &bundle.tables["classes_0.js"];
    let connection = classes.find("connection").unwrap();
    check!(connection.links[0].url == "../classnexus_1_1quic_1_1connection.html");
    check!(connection.links[0].relevance == 1);
}

/// Test: Symbols are read from the JSON list the build command takes.
#[test]
fn builder_from_json() {
    let json = r#"[
        {"name": "stream", "kind": "class", "scope": "nexus::quic", "url": "s.html"},
        {"name": "NEXUS_VERSION", "kind": "define", "url": "v.html#a1", "external": false}
    ]"#;
    let builder = IndexBuilder::from_json(json).unwrap().with_url_prefix("");
    check!(builder.len() == 2);

    let bundle = builder.build();
    let names: Vec<_> = bundle.sections.names().collect();
    check!(names == vec!["all", "classes", "defines"]);
    check!(bundle.tables["defines_0.js"].entries[0].links[0].url == "v.html#a1");
    check!(SymbolKind::Define.section() == "defines");

    check!(IndexBuilder::from_json("{\"name\": 1}").is_err());
}
