//! # renv - render environment variable definitions
//!
//! ## Introduction for developers
//!
//! Read this to understand how `renv` works internally.
//!
//! ### Definitions
//!
//! A definition file declares variables whose values may refer to each other and to the
//! environment `renv` runs in:
//!
//! ```yaml
//! environment:
//!   BASE: /opt/app
//!   BIN: ${BASE}/bin
//!   PATH_ENV: ${BIN}:$PATH
//! ```
//!
//! [definition::Definition] loads such a file into a [definition::RawDefinition] and remembers
//! where it came from so errors can point at it. Every file is resolved on its own, files
//! never see each other's variables.
//!
//! ### Dependency graph
//!
//! see [graph::DependencyGraph::build]
//!
//! For each declared variable we ask [scan::scan] which other *declared* variables its value
//! refers to. Given the example above:
//!
//! | **variable** | **depends on** |
//! |--------------|----------------|
//! | `BASE`       |                |
//! | `BIN`        | `BASE`         |
//! | `PATH_ENV`   | `BIN`          |
//!
//! `PATH` is not declared, so it is not part of the graph. It is looked up in the environment
//! when `PATH_ENV` gets expanded.
//!
//! ### Order
//!
//! see [graph::DependencyGraph::order]
//!
//! A depth first walk emits each variable after all of its dependencies (`BASE`, `BIN`,
//! `PATH_ENV`). When a dependency is found on the path that led to the current variable we have
//! a loop and report it as [graph::CycleError] (`A -> B -> A`).
//!
//! ### Expansion
//!
//! see [expand]
//!
//! Variables are expanded in order. Each expansion sees the variables resolved before it, and
//! falls back to the [environment::Environment] for anything else. `$$` is an escaped `$`.
//!
//! [resolve::resolve] ties all of this together. [resolve::Strategy::FixedPoint] is an alternative
//! that needs no explicit order but can not tell which variables form a loop.
//!
//! ### Output
//!
//! [emit::emit] writes the resolved variables as `NAME=value` lines, shell `export`s, json or yaml.
//!
pub mod definition;
pub mod emit;
pub mod environment;
pub mod expand;
pub mod graph;
pub mod resolve;
pub mod scan;
