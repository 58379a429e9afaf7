//! ambient environment lookup
//!
//! The environment answers references to names that are not declared. It is only
//! ever read during a resolution pass.
use std::collections::{BTreeMap, HashMap};

/// Read-only name -> value lookup
pub trait Environment {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Variables of the current process
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// No ambient variables at all
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyEnvironment;

impl Environment for EmptyEnvironment {
    fn lookup(&self, _name: &str) -> Option<String> {
        None
    }
}

impl<E: Environment + ?Sized> Environment for &E {
    fn lookup(&self, name: &str) -> Option<String> {
        (**self).lookup(name)
    }
}

impl<S: std::hash::BuildHasher> Environment for indexmap::IndexMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<S: std::hash::BuildHasher> Environment for HashMap<String, String, S> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Environment for BTreeMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn maps_answer_their_keys() {
        let env: HashMap<String, String> = [("HOME".to_string(), "/root".to_string())].into();
        assert_eq!(env.lookup("HOME").as_deref(), Some("/root"));
        assert_eq!(env.lookup("USER"), None);
        assert_eq!((&env).lookup("HOME").as_deref(), Some("/root"));
    }

    #[test]
    fn empty_environment_knows_nothing() {
        assert_eq!(EmptyEnvironment.lookup("PATH"), None);
    }

    #[test]
    fn process_environment_reads_process_variables() {
        // cargo sets this for test binaries
        assert!(ProcessEnvironment.lookup("CARGO_MANIFEST_DIR").is_some());
        assert_eq!(
            ProcessEnvironment.lookup("RENV_TEST_SURELY_NOT_SET_ANYWHERE"),
            None
        );
    }
}
