//! Top-level combinator builders.
//!
//! A combinator definition is an array of one-entry objects, each mapping
//! a fully qualified registry name to its definition (no prefixing).
//! `combinator.chain` sequences the compiled children unconditionally;
//! `combinator.broadcast` fans each input event out into one independent
//! evaluation per child.

use std::sync::Arc;

use serde_json::Value;

use super::{invalid_type, single_entry};
use crate::error::Result;
use crate::expression::Expression;
use crate::registry::{BuilderFn, Registry};

pub fn chain_builder() -> BuilderFn {
    Arc::new(|registry: &Registry, definition: &Value| {
        let children = build_children(registry, definition)?;
        Ok(Expression::chain("combinator.chain", children))
    })
}

pub fn broadcast_builder() -> BuilderFn {
    Arc::new(|registry: &Registry, definition: &Value| {
        let children = build_children(registry, definition)?;
        Ok(Expression::broadcast("combinator.broadcast", children))
    })
}

fn build_children(registry: &Registry, definition: &Value) -> Result<Vec<Expression>> {
    let entries = definition
        .as_array()
        .ok_or_else(|| invalid_type("array", definition))?;

    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        let (name, sub_definition) = single_entry(entry)?;
        let expr = registry
            .build(name, sub_definition)
            .map_err(|e| e.in_block(name))?;
        children.push(expr);
    }
    Ok(children)
}
