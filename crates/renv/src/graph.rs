//! Dependency graph between declared variables and its evaluation order
use crate::definition::RawDefinition;
use indexmap::{IndexMap, IndexSet};

/// Directed graph: variable -> declared variables its raw value references
///
/// References to names that are not declared are not part of the graph. They are
/// answered by the ambient environment and impose no ordering.
#[derive(Debug, Default, PartialEq)]
pub struct DependencyGraph {
    edges: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    pub fn build(definition: &RawDefinition) -> Self {
        let edges = definition
            .iter()
            .map(|(name, value)| {
                let dependencies: IndexSet<String> =
                    crate::scan::scan(value, definition.keys().map(String::as_str))
                        .into_iter()
                        .map(str::to_string)
                        .collect();

                tracing::trace!(%name, ?dependencies, "scanned");
                (name.clone(), dependencies)
            })
            .collect();

        let graph = Self { edges };
        tracing::debug!(
            nodes = graph.len(),
            edges = graph.edges.values().map(IndexSet::len).sum::<usize>(),
            "dependency graph built"
        );
        graph
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Declared variables `name` depends on. Empty for unknown names.
    pub fn dependencies(&self, name: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(name)
            .into_iter()
            .flat_map(|dependencies| dependencies.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Order in which the variables can be expanded
    ///
    /// Every variable comes after all of its dependencies.
    pub fn order(&self) -> Result<Vec<&str>, CycleError> {
        match self.partial_order() {
            (order, None) => Ok(order),
            (_, Some(cycle)) => Err(cycle),
        }
    }

    /// Like [DependencyGraph::order] but keeps what was ordered before a cycle was found
    ///
    /// Every variable in the returned order still comes after all of its dependencies.
    pub fn partial_order(&self) -> (Vec<&str>, Option<CycleError>) {
        let mut finished = IndexSet::new();
        let mut path = Vec::new();

        for root in self.names() {
            if let Err(cycle) = self.visit(root, &mut finished, &mut path) {
                return (finished.into_iter().collect(), Some(cycle));
            }
        }

        let order: Vec<&str> = finished.into_iter().collect();
        tracing::debug!(?order, "resolution order");
        (order, None)
    }

    /// Depth first, post order
    ///
    /// `finished` holds every fully visited node in emission order. `path` is the
    /// chain of nodes from the current root down to (excluding) `name`.
    fn visit<'g>(
        &'g self,
        name: &'g str,
        finished: &mut IndexSet<&'g str>,
        path: &mut Vec<&'g str>,
    ) -> Result<(), CycleError> {
        if finished.contains(name) {
            return Ok(());
        }

        path.push(name);
        for dependency in self.dependencies(name) {
            if let Some(start) = path.iter().position(|ancestor| *ancestor == dependency) {
                let mut variables: Vec<String> =
                    path[start..].iter().map(|v| v.to_string()).collect();
                variables.push(dependency.to_string());
                return Err(CycleError { variables });
            }

            self.visit(dependency, finished, path)?;
        }
        path.pop();

        finished.insert(name);
        Ok(())
    }
}

/// Variables reference each other in a loop
///
/// `variables` walks the loop and ends with the variable it started at.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Circular reference: {}", .variables.join(" -> "))]
pub struct CycleError {
    pub variables: Vec<String>,
}

impl CycleError {
    /// Distinct variables taking part in the loop
    pub fn participants(&self) -> &[String] {
        &self.variables[..self.variables.len().saturating_sub(1)]
    }
}
