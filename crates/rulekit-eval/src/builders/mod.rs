//! Stage and operator builders.
//!
//! Each builder translates one declarative definition node into an
//! [`Expression`](crate::expression::Expression) subtree, resolving nested
//! operator names through the [`Registry`](crate::registry::Registry) and
//! wrapping failures with positional context. Shape validation happens
//! here, at build time; nothing structural is deferred to evaluation.

pub mod check;
pub mod combinator;
pub mod map;
pub mod normalize;

use serde_json::Value;

use crate::error::{BuildError, Result};
use crate::event::type_name;
use crate::registry::Registry;
use crate::sink::{self, SinkConfig};

/// Install every built-in builder under its qualified name.
///
/// The sink configuration is injected here so the active-response queue
/// path is a property of the registry population, not process state.
pub fn register_defaults(registry: &mut Registry, sink_config: SinkConfig) {
    registry.register("stage.normalize", normalize::builder());
    registry.register("stage.map", map::stage_builder());
    registry.register("map.value", map::value_builder());
    registry.register("stage.check", check::stage_builder());
    registry.register("condition", check::condition_builder());
    registry.register("middle.condition", check::middle_condition_builder());
    registry.register("middle.helper.exists", check::exists_builder());
    registry.register("combinator.chain", combinator::chain_builder());
    registry.register("combinator.broadcast", combinator::broadcast_builder());
    registry.register("helper.ar_write", sink::ar_write_builder(sink_config));
}

/// Wrong-type error for a definition node.
pub(crate) fn invalid_type(expected: &'static str, actual: &Value) -> BuildError {
    BuildError::InvalidDefinitionType {
        expected,
        actual: type_name(actual).to_string(),
    }
}

/// Extract the single `(key, value)` entry of a one-entry definition object.
pub(crate) fn single_entry(definition: &Value) -> Result<(&str, &Value)> {
    let obj = definition
        .as_object()
        .ok_or_else(|| invalid_type("object", definition))?;
    let mut entries = obj.iter();
    match entries.next() {
        Some((key, value)) => Ok((key.as_str(), value)),
        None => Err(BuildError::InvalidDefinitionType {
            expected: "object",
            actual: "empty object".to_string(),
        }),
    }
}

/// Build a one-entry object `{key: value}` for delegating a single block
/// entry to a nested builder.
pub(crate) fn entry_value(key: &str, value: &Value) -> Value {
    let mut obj = serde_json::Map::with_capacity(1);
    obj.insert(key.to_string(), value.clone());
    Value::Object(obj)
}
