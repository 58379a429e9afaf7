//! Resolution of a whole [RawDefinition]
use crate::definition::RawDefinition;
use crate::environment::Environment;
use crate::expand::{Expander, UndefinedPolicy, UndefinedReferenceError};
use crate::graph::{CycleError, DependencyGraph};

/// Fully expanded variables: name -> value
///
/// Iterates in the order the variables were resolved, dependencies first.
pub type ResolvedMapping = indexmap::IndexMap<String, String>;

/// How the evaluation order is found
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Order the dependency graph depth first. Reports the exact loop on failure.
    #[default]
    Topological,
    /// Expand whatever has all dependencies available, round after round, until done
    /// or stuck. Can only report the variables left over on failure.
    FixedPoint,
}

/// What to do when variables reference each other in a loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CyclePolicy {
    /// Fail the whole pass
    #[default]
    Abort,
    /// Return what was resolved before the loop was detected
    Partial,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub strategy: Strategy,
    pub on_cycle: CyclePolicy,
    pub on_undefined: UndefinedPolicy,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error(transparent)]
    Cycle(#[from] CycleError),
    #[error("Unable to expand {variable}")]
    UndefinedReference {
        variable: String,
        #[source]
        error: UndefinedReferenceError,
    },
    #[error("No progress resolving {}, check for circular references", .unresolved.join(", "))]
    Stalled { unresolved: Vec<String> },
}

/// Resolves `definition` with default [Options]
pub fn resolve<E: Environment + ?Sized>(
    definition: &RawDefinition,
    environment: &E,
) -> Result<ResolvedMapping, ResolveError> {
    resolve_with(definition, environment, Options::default())
}

#[tracing::instrument(level = "debug", skip_all, fields(variables = definition.len(), options = ?options))]
pub fn resolve_with<E: Environment + ?Sized>(
    definition: &RawDefinition,
    environment: &E,
    options: Options,
) -> Result<ResolvedMapping, ResolveError> {
    let graph = DependencyGraph::build(definition);

    match options.strategy {
        Strategy::Topological => topological(definition, &graph, environment, options),
        Strategy::FixedPoint => fixed_point(definition, &graph, environment, options),
    }
}

fn topological<E: Environment + ?Sized>(
    definition: &RawDefinition,
    graph: &DependencyGraph,
    environment: &E,
    options: Options,
) -> Result<ResolvedMapping, ResolveError> {
    let (order, cycle) = graph.partial_order();

    if let Some(cycle) = cycle {
        match options.on_cycle {
            CyclePolicy::Abort => return Err(cycle.into()),
            CyclePolicy::Partial => {
                tracing::warn!(%cycle, resolved = order.len(), "returning partial result");
            }
        }
    }

    let mut resolved = ResolvedMapping::with_capacity(order.len());
    for name in order {
        let value = expand_variable(name, definition, &resolved, environment, options)?;
        resolved.insert(name.to_string(), value);
    }

    Ok(resolved)
}

fn fixed_point<E: Environment + ?Sized>(
    definition: &RawDefinition,
    graph: &DependencyGraph,
    environment: &E,
    options: Options,
) -> Result<ResolvedMapping, ResolveError> {
    let mut resolved = ResolvedMapping::with_capacity(definition.len());
    let mut unresolved: Vec<&str> = graph.names().collect();

    // every round resolves at least one variable or stops, so at most N rounds
    let mut round = 0;
    while !unresolved.is_empty() {
        round += 1;

        let (ready, waiting): (Vec<&str>, Vec<&str>) = unresolved.into_iter().partition(|name| {
            graph
                .dependencies(name)
                .all(|dependency| resolved.contains_key(dependency))
        });

        if ready.is_empty() {
            let unresolved: Vec<String> = waiting.iter().map(|n| n.to_string()).collect();
            match options.on_cycle {
                CyclePolicy::Abort => return Err(ResolveError::Stalled { unresolved }),
                CyclePolicy::Partial => {
                    tracing::warn!(?unresolved, resolved = resolved.len(), "returning partial result");
                    return Ok(resolved);
                }
            }
        }

        tracing::trace!(round, ?ready, "round");
        for name in ready {
            let value = expand_variable(name, definition, &resolved, environment, options)?;
            resolved.insert(name.to_string(), value);
        }

        unresolved = waiting;
    }

    tracing::debug!(rounds = round, "fixed point reached");
    Ok(resolved)
}

fn expand_variable<E: Environment + ?Sized>(
    name: &str,
    definition: &RawDefinition,
    resolved: &ResolvedMapping,
    environment: &E,
    options: Options,
) -> Result<String, ResolveError> {
    let raw = definition.get(name).map(String::as_str).unwrap_or_default();

    let value = Expander::new(resolved, environment, options.on_undefined)
        .expand(raw)
        .map_err(|error| ResolveError::UndefinedReference {
            variable: name.to_string(),
            error,
        })?;

    tracing::trace!(%name, %raw, %value, "expanded");
    Ok(value)
}
