//! The `stage.map` block builder and the `map.value` leaf operator.
//!
//! A map block is an object whose entries assign values to destination
//! fields in declared order. A value that begins with the helper anchor
//! (`+name/arg`) dispatches to the registered `helper.<name>` operator;
//! everything else assigns through `map.value`: a literal JSON value, or
//! a `$reference` copied from the event at evaluation time.

use std::sync::Arc;

use serde_json::Value;

use super::{entry_value, invalid_type, single_entry};
use crate::expression::Expression;
use crate::registry::{BuilderFn, Registry};
use crate::syntax::{key_to_pointer, parse_helper_invocation, Argument, REFERENCE_ANCHOR};

pub fn stage_builder() -> BuilderFn {
    Arc::new(|registry: &Registry, definition: &Value| {
        let entries = definition
            .as_object()
            .ok_or_else(|| invalid_type("object", definition))?;

        let mut operations = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let operator = match value.as_str().and_then(parse_helper_invocation) {
                Some((helper, _)) => format!("helper.{helper}"),
                None => "map.value".to_string(),
            };
            let expr = registry
                .build(&operator, &entry_value(key, value))
                .map_err(|e| e.in_block(key))?;
            operations.push(expr);
        }

        // Mappings apply sequentially and unconditionally.
        Ok(Expression::chain("stage.map", operations))
    })
}

pub fn value_builder() -> BuilderFn {
    Arc::new(|_registry: &Registry, definition: &Value| {
        let (key, value) = single_entry(definition)?;
        let destination = key_to_pointer(key);
        let name = format!("map.value[{key}]");

        // A string beginning with the reference anchor resolves per event;
        // any other value is assigned verbatim.
        match value.as_str() {
            Some(s) if s.starts_with(REFERENCE_ANCHOR) => {
                let argument = Argument::parse(s);
                Ok(Expression::term(
                    name,
                    Arc::new(move |event| match argument.resolve(event) {
                        Some(resolved) => {
                            event.set(&destination, Value::String(resolved));
                            true
                        }
                        None => false,
                    }),
                ))
            }
            _ => {
                let literal = value.clone();
                Ok(Expression::term(
                    name,
                    Arc::new(move |event| {
                        event.set(&destination, literal.clone());
                        true
                    }),
                ))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::register_defaults;
    use crate::error::BuildError;
    use crate::event::Event;
    use crate::registry::Registry;
    use crate::sink::SinkConfig;
    use serde_json::json;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        register_defaults(&mut registry, SinkConfig::default());
        registry
    }

    #[test]
    fn test_rejects_non_object_definition() {
        let err = registry().build("stage.map", &json!([1, 2])).unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidDefinitionType {
                expected: "object",
                ..
            }
        ));
    }

    #[test]
    fn test_literal_assignment() {
        let expr = registry()
            .build("stage.map", &json!({"event.kind": "alert", "severity": 3}))
            .unwrap();
        let mut event = Event::from_value(json!({}));
        assert!(expr.evaluate(&mut event));
        assert_eq!(event.get("/event/kind"), Some(&json!("alert")));
        assert_eq!(event.get("/severity"), Some(&json!(3)));
    }

    #[test]
    fn test_reference_assignment() {
        let expr = registry()
            .build("stage.map", &json!({"copy": "$source.name"}))
            .unwrap();
        let mut event = Event::from_value(json!({"source": {"name": "srv01"}}));
        expr.evaluate(&mut event);
        assert_eq!(event.get("/copy"), Some(&json!("srv01")));
    }

    #[test]
    fn test_unresolved_reference_assigns_nothing() {
        let expr = registry()
            .build("map.value", &json!({"copy": "$missing"}))
            .unwrap();
        let mut event = Event::from_value(json!({"other": 1}));
        assert!(!expr.evaluate(&mut event));
        assert_eq!(event.get("/copy"), None);
    }

    #[test]
    fn test_unknown_helper_is_a_build_error() {
        let err = registry()
            .build("stage.map", &json!({"out": "+no_such_helper/x"}))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::StageBlockBuildFailed { ref key, ref source }
                if key == "out" && matches!(**source, BuildError::UnknownOperator(_))
        ));
    }

    #[test]
    fn test_failed_entry_does_not_stop_later_entries() {
        let expr = registry()
            .build("stage.map", &json!({"a": "1", "b": "$missing", "c": "3"}))
            .unwrap();
        let mut event = Event::from_value(json!({}));
        expr.evaluate(&mut event);
        assert_eq!(event.get("/a"), Some(&json!("1")));
        assert_eq!(event.get("/b"), None);
        assert_eq!(event.get("/c"), Some(&json!("3")));
    }

    #[test]
    fn test_later_entry_sees_earlier_assignment() {
        // Entries run in declared order over the same event, so a
        // reference can read a field written just before it.
        let expr = registry()
            .build("stage.map", &json!({"first": "hello", "second": "$first"}))
            .unwrap();
        let mut event = Event::from_value(json!({}));
        assert!(expr.evaluate(&mut event));
        assert_eq!(event.get("/second"), Some(&json!("hello")));
    }
}
