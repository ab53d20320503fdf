//! The `stage.check` builder and its condition operators.
//!
//! A check definition is an array of condition objects. Each entry builds
//! through `condition`, which delegates term construction to
//! `middle.condition`:
//!
//! - a `+<helper>` value resolves `middle.helper.<name>` (e.g. `+exists`);
//! - an array value matches when the field equals any element (`Or`);
//! - a `$reference` value compares the field against another field;
//! - any other value is a plain equality test.
//!
//! Conditions record a boolean aggregate; they never raise at evaluation
//! time and never prevent sibling operators from running.

use std::sync::Arc;

use serde_json::Value;

use super::{entry_value, invalid_type, single_entry};
use crate::expression::Expression;
use crate::registry::{BuilderFn, Registry};
use crate::syntax::{key_to_pointer, parse_helper_invocation, REFERENCE_ANCHOR};

pub fn stage_builder() -> BuilderFn {
    Arc::new(|registry: &Registry, definition: &Value| {
        let entries = definition
            .as_array()
            .ok_or_else(|| invalid_type("array", definition))?;

        let mut conditions = Vec::with_capacity(entries.len());
        for entry in entries {
            let obj = entry
                .as_object()
                .ok_or_else(|| invalid_type("object", entry))?;
            for (key, value) in obj {
                let expr = registry
                    .build("condition", &entry_value(key, value))
                    .map_err(|e| e.in_block(key))?;
                conditions.push(expr);
            }
        }

        Ok(Expression::and("stage.check", conditions))
    })
}

pub fn condition_builder() -> BuilderFn {
    Arc::new(|registry: &Registry, definition: &Value| {
        registry.build("middle.condition", definition)
    })
}

pub fn middle_condition_builder() -> BuilderFn {
    Arc::new(|registry: &Registry, definition: &Value| {
        let (key, value) = single_entry(definition)?;

        if let Some((helper, _)) = value.as_str().and_then(parse_helper_invocation) {
            return registry.build(&format!("middle.helper.{helper}"), definition);
        }

        if let Some(alternatives) = value.as_array() {
            let terms = alternatives
                .iter()
                .map(|alt| equality_term(key, alt))
                .collect();
            return Ok(Expression::or(format!("condition.anyof[{key}]"), terms));
        }

        Ok(equality_term(key, value))
    })
}

pub fn exists_builder() -> BuilderFn {
    Arc::new(|_registry: &Registry, definition: &Value| {
        let (key, _) = single_entry(definition)?;
        let pointer = key_to_pointer(key);
        Ok(Expression::term(
            format!("helper.exists[{key}]"),
            Arc::new(move |event| event.get(&pointer).is_some()),
        ))
    })
}

/// A leaf comparing one event field against an expected value. A string
/// expectation starting with the reference anchor compares against the
/// referenced field instead.
fn equality_term(key: &str, expected: &Value) -> Expression {
    let pointer = key_to_pointer(key);
    let name = format!("condition.value[{key}]");

    if let Some(reference) = expected
        .as_str()
        .and_then(|s| s.strip_prefix(REFERENCE_ANCHOR))
    {
        let other = key_to_pointer(reference);
        return Expression::term(
            format!("condition.reference[{key}]"),
            Arc::new(move |event| match (event.get(&pointer), event.get(&other)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }),
        );
    }

    let expected = expected.clone();
    Expression::term(
        name,
        Arc::new(move |event| event.get(&pointer) == Some(&expected)),
    )
}
