//! Snapshot tests
//!
//! Loads each *.env.yaml file in /tests/ individually and compares if the
//! resolved variables (or the error) change.

use renv::resolve::ResolvedMapping;

/// Stands in for the process environment so results do not depend on the machine
fn environment() -> ResolvedMapping {
    renv::definitions! {
        "PATH" => "/usr/bin",
        "HOME" => "/home/user",
    }
}

#[test]
fn snapshots() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("RENV_LOG"))
        .with_writer(std::io::stderr)
        .init();

    insta::glob!("*.env.yaml", |path| {
        let definition =
            renv::definition::Definition::load_file(path).expect("must be valid definition file");

        let rendered = renv::resolve::resolve(&definition.variables, &environment())
            .map_err(|e| e.to_string());

        insta::assert_debug_snapshot!(rendered);
    });
}
