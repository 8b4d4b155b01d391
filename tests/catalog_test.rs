mod common;

use assert2::check;
use common::{IsolatedIndex, built_index, nexus_index};
use doxysearch_mcp::cache::{CatalogCache, fingerprint};
use doxysearch_mcp::{Catalog, CatalogError};
use rstest::rstest;
use tempfile::TempDir;

/// Test: A directory with only table files gets inferred section metadata.
#[rstest]
fn discovered_catalog(nexus_index: IsolatedIndex) {
    let catalog = Catalog::load(nexus_index.path()).unwrap();
    let sections = &catalog.sections().sections;
    check!(sections.len() == 1);
    check!(sections[0].name == "all");
    check!(sections[0].label == "All");
    check!(sections[0].letters == vec!['a']);
    check!(catalog.entry_count() == 13);
}

/// Test: A generated directory loads through its searchdata.js.
#[rstest]
fn declared_catalog(built_index: IsolatedIndex) {
    let catalog = Catalog::load(built_index.path()).unwrap();
    let names: Vec<_> = catalog.sections().names().collect();
    check!(names == vec!["all", "classes", "namespaces", "functions", "typedefs"]);

    let functions = catalog.section("functions").unwrap();
    check!(functions.letters == vec!['a']);
    check!(catalog.entries(functions).count() == 3);
}

/// Test: A table listed in searchdata.js but missing on disk is reported.
#[rstest]
fn missing_declared_table(built_index: IsolatedIndex) {
    std::fs::remove_file(built_index.path().join("classes_0.js")).unwrap();
    let err = Catalog::load(built_index.path()).unwrap_err();
    check!(matches!(err, CatalogError::MissingTable { ref section, .. } if section == "classes"));
}

/// Test: A malformed table names the file it came from.
#[rstest]
fn malformed_table_names_file(nexus_index: IsolatedIndex) {
    nexus_index.create_file("all_0.js", "var searchData=\n[\n  ['a_0',['a'\n");
    let err = Catalog::load(nexus_index.path()).unwrap_err();
    check!(matches!(err, CatalogError::Parse { .. }));
    check!(err.to_string().contains("all_0.js"));
}

/// Test: A hostile table is a load error, not a crash of the loading thread.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deeply_nested_table_fails_load(nexus_index: IsolatedIndex) {
    let nested = format!("var searchData={};", "[".repeat(200_000));
    nexus_index.create_file("all_0.js", &nested);
    let err = nexus_index
        .state
        .get_catalog(nexus_index.directory().as_deref())
        .await
        .unwrap_err();
    check!(err.contains("all_0.js"));
}

#[test]
fn missing_directory() {
    let err = Catalog::load(std::path::Path::new("/no/such/search/dir")).unwrap_err();
    check!(matches!(err, CatalogError::NotFound { .. }));
}

/// Test: The disk cache returns the same catalog until the files change.
#[rstest]
fn disk_cache_round_trip(nexus_index: IsolatedIndex) {
    let cache_dir = TempDir::new().unwrap();
    let cache = CatalogCache::new(cache_dir.path());
    let catalog = Catalog::load(nexus_index.path()).unwrap();
    let print = fingerprint(nexus_index.path()).unwrap();

    cache.store(nexus_index.path(), print, &catalog);
    check!(cache.load(nexus_index.path(), print).as_ref() == Some(&catalog));

    nexus_index.create_file("all_0.js", "var searchData=\n[\n];\n");
    let changed = fingerprint(nexus_index.path()).unwrap();
    check!(changed != print);
    check!(cache.load(nexus_index.path(), changed).is_none());
}
