//! Name-to-builder resolution table.
//!
//! A [`Registry`] maps qualified operator names (`stage.normalize`,
//! `helper.ar_write`, `combinator.chain`, ...) to builder factories. It is
//! an owned object passed explicitly to every builder call, never global
//! state, so multiple independent engines and tests coexist in one
//! process. Population happens once during setup; afterwards the registry
//! is read-only and safe to share across pipelines behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{BuildError, Result};
use crate::expression::Expression;

/// A builder factory: given the registry (for nested name resolution) and
/// a definition payload, produce a compiled expression or a build error.
pub type BuilderFn = Arc<dyn Fn(&Registry, &Value) -> Result<Expression> + Send + Sync>;

/// Associative store of qualified operator names to builder factories.
#[derive(Default, Clone)]
pub struct Registry {
    builders: HashMap<String, BuilderFn>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Registry {
            builders: HashMap::new(),
        }
    }

    /// Associate a qualified name with a builder factory.
    ///
    /// Re-registration overwrites the previous factory; the last
    /// registration wins and no error is reported.
    pub fn register(&mut self, name: impl Into<String>, builder: BuilderFn) {
        let name = name.into();
        debug!(operator = %name, "registering builder");
        self.builders.insert(name, builder);
    }

    /// Look up a builder factory by qualified name.
    ///
    /// This is the only lookup path: no fallback, no fuzzy matching.
    /// An absent name is always a build-time failure.
    pub fn resolve(&self, name: &str) -> Result<&BuilderFn> {
        self.builders
            .get(name)
            .ok_or_else(|| BuildError::UnknownOperator(name.to_string()))
    }

    /// Resolve `name` and invoke its factory on `definition`.
    pub fn build(&self, name: &str, definition: &Value) -> Result<Expression> {
        self.resolve(name)?(self, definition)
    }

    /// Names currently registered, for diagnostics.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("builders", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}
