//! Loading definition files from disk

use pretty_assertions::assert_eq;
use renv::definition::{Definition, LoadError};
use renv::environment::EmptyEnvironment;
use std::path::Path;

fn write(dir: &Path, file_name: &str, contents: &str) {
    std::fs::write(dir.join(file_name), contents).expect("write fixture");
}

#[test]
fn directory_loads_definition_files_by_name() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b.env.yaml", "environment:\n  FROM: b\n");
    write(dir.path(), "a.env.yml", "environment:\n  FROM: a\n");
    write(dir.path(), "notes.yaml", "environment:\n  FROM: notes\n");
    std::fs::create_dir(dir.path().join("nested.env.yaml")).unwrap();

    let definitions = Definition::load_directory(dir.path()).unwrap();

    let from: Vec<&str> = definitions
        .iter()
        .map(|definition| definition.variables["FROM"].as_str())
        .collect();
    assert_eq!(from, vec!["a", "b"]);

    let expected = dir.path().canonicalize().unwrap().join("a.env.yml");
    assert_eq!(definitions[0].source.as_deref(), Some(expected.as_path()));
}

#[test]
fn empty_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "unrelated.txt", "");

    let error = Definition::load_directory(dir.path()).unwrap_err();
    assert!(matches!(error, LoadError::NoFilesFound(_)));
}

#[test]
fn parse_error_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.env.yaml", "environment: [unclosed\n");

    let error = Definition::load_file(&dir.path().join("broken.env.yaml")).unwrap_err();
    assert!(matches!(error, LoadError::Parse { .. }));
    assert!(error.to_string().ends_with("broken.env.yaml"), "{error}");
}

#[test]
fn every_file_is_resolved_on_its_own() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "1.env.yaml", "environment:\n  SHARED: one\n");
    write(dir.path(), "2.env.yaml", "environment:\n  OTHER: ${SHARED}\n");

    let resolved: Vec<_> = Definition::load_directory(dir.path())
        .unwrap()
        .iter()
        .map(|definition| renv::resolve::resolve(&definition.variables, &EmptyEnvironment))
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(resolved[0]["SHARED"], "one");
    assert_eq!(resolved[1]["OTHER"], "");
}
