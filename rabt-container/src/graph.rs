//! Static validation of declared dependencies.
//!
//! Registrations made with `register_shared` declare which services
//! they resolve. [`GraphValidator`] walks those declarations depth
//! first, before any resolver runs, and reports:
//! - declared dependencies that have no registration
//! - cycles among declared dependencies
//!
//! Registrations without a declaration are treated as leaves; their
//! resolvers are still checked at resolve time by the chain tracker.

use std::collections::HashMap;

use tracing::{debug, instrument, warn};

use crate::error::{CircularDependencyError, NotRegisteredError, RabtError, Result};
use crate::key::ServiceKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first validator over `key -> declared dependencies`.
pub(crate) struct GraphValidator<'a> {
    graph: &'a HashMap<ServiceKey, Vec<ServiceKey>>,
    marks: HashMap<ServiceKey, Mark>,
    path: Vec<ServiceKey>,
    max_suggestions: usize,
}

impl<'a> GraphValidator<'a> {
    pub fn new(graph: &'a HashMap<ServiceKey, Vec<ServiceKey>>, max_suggestions: usize) -> Self {
        Self {
            graph,
            marks: HashMap::with_capacity(graph.len()),
            path: Vec::new(),
            max_suggestions,
        }
    }

    /// Validates every registration, reporting the first problem found.
    ///
    /// Keys are visited in rendered-name order so the reported problem
    /// does not depend on hash order.
    #[instrument(skip(self), name = "graph_validation")]
    pub fn validate(mut self) -> Result<()> {
        let graph = self.graph;
        let mut roots: Vec<&ServiceKey> = graph.keys().collect();
        roots.sort_by_cached_key(|k| k.to_string());

        debug!(services = roots.len(), "Validating declared dependencies");

        for key in roots {
            self.visit(key)?;
        }

        debug!("Declared dependencies are complete and acyclic");
        Ok(())
    }

    fn visit(&mut self, key: &ServiceKey) -> Result<()> {
        match self.marks.get(key) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = self.path.iter().position(|k| k == key).unwrap_or(0);
                let mut chain = self.path[start..].to_vec();
                chain.push(key.clone());

                warn!(key = %key, chain = ?chain, "Declared dependencies form a cycle");
                return Err(RabtError::CircularDependency(CircularDependencyError {
                    key: key.clone(),
                    chain,
                }));
            }
            None => {}
        }

        let graph = self.graph;
        let Some(dependencies) = graph.get(key) else {
            let registered: Vec<ServiceKey> = graph.keys().cloned().collect();
            return Err(RabtError::NotRegistered(NotRegisteredError::new(
                key.clone(),
                self.path.last().cloned(),
                &registered,
                self.max_suggestions,
            )));
        };

        self.marks.insert(key.clone(), Mark::InProgress);
        self.path.push(key.clone());

        for dependency in dependencies {
            self.visit(dependency)?;
        }

        self.path.pop();
        self.marks.insert(key.clone(), Mark::Done);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Database;
    struct UserRepo;
    struct UserService;

    fn graph(edges: Vec<(ServiceKey, Vec<ServiceKey>)>) -> HashMap<ServiceKey, Vec<ServiceKey>> {
        edges.into_iter().collect()
    }

    #[test]
    fn chain_is_valid() {
        let g = graph(vec![
            (ServiceKey::of::<Database>(), vec![]),
            (ServiceKey::of::<UserRepo>(), vec![ServiceKey::of::<Database>()]),
            (ServiceKey::of::<UserService>(), vec![ServiceKey::of::<UserRepo>()]),
        ]);

        assert!(GraphValidator::new(&g, 3).validate().is_ok());
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        struct A;
        struct B;
        struct C;
        struct D;

        let g = graph(vec![
            (ServiceKey::of::<D>(), vec![]),
            (ServiceKey::of::<B>(), vec![ServiceKey::of::<D>()]),
            (ServiceKey::of::<C>(), vec![ServiceKey::of::<D>()]),
            (ServiceKey::of::<A>(), vec![ServiceKey::of::<B>(), ServiceKey::of::<C>()]),
        ]);

        assert!(GraphValidator::new(&g, 3).validate().is_ok());
    }

    #[test]
    fn three_step_cycle() {
        struct A;
        struct B;
        struct C;

        let g = graph(vec![
            (ServiceKey::of::<A>(), vec![ServiceKey::of::<B>()]),
            (ServiceKey::of::<B>(), vec![ServiceKey::of::<C>()]),
            (ServiceKey::of::<C>(), vec![ServiceKey::of::<A>()]),
        ]);

        match GraphValidator::new(&g, 3).validate().unwrap_err() {
            RabtError::CircularDependency(e) => {
                assert_eq!(e.chain.len(), 4);
                assert_eq!(e.chain.first(), e.chain.last());
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }
    }

    #[test]
    fn self_dependency() {
        struct A;

        let g = graph(vec![(ServiceKey::of::<A>(), vec![ServiceKey::of::<A>()])]);
        assert!(matches!(
            GraphValidator::new(&g, 3).validate(),
            Err(RabtError::CircularDependency(_))
        ));
    }

    #[test]
    fn missing_dependency_names_its_consumer() {
        let g = graph(vec![(
            ServiceKey::of::<UserRepo>(),
            vec![ServiceKey::named::<Database>("replica")],
        )]);

        match GraphValidator::new(&g, 3).validate().unwrap_err() {
            RabtError::NotRegistered(e) => {
                assert_eq!(e.requested, ServiceKey::named::<Database>("replica"));
                assert_eq!(e.required_by, Some(ServiceKey::of::<UserRepo>()));
            }
            other => panic!("Expected NotRegistered, got: {other:?}"),
        }
    }
}
