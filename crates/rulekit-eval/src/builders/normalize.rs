//! The `stage.normalize` builder.
//!
//! A normalize definition is an ordered array of block objects. Each key
//! in a block resolves as `"stage." + key` and builds in declared order;
//! the per-key expressions of one block combine with `And("subblock")`,
//! and the blocks of the stage combine with `Chain("stage.normalize")` so
//! every block always runs, whatever earlier blocks reported.

use std::sync::Arc;

use tracing::debug;

use serde_json::Value;

use super::invalid_type;
use crate::expression::Expression;
use crate::registry::{BuilderFn, Registry};

pub fn builder() -> BuilderFn {
    Arc::new(|registry: &Registry, definition: &Value| {
        let blocks = definition
            .as_array()
            .ok_or_else(|| invalid_type("array", definition))?;

        let mut block_expressions = Vec::with_capacity(blocks.len());
        for block in blocks {
            let entries = block
                .as_object()
                .ok_or_else(|| invalid_type("object", block))?;

            let mut sub_blocks = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                let expr = registry
                    .build(&format!("stage.{key}"), value)
                    .map_err(|e| e.in_block(key))?;
                sub_blocks.push(expr);
            }
            block_expressions.push(Expression::and("subblock", sub_blocks));
        }

        debug!(blocks = block_expressions.len(), "compiled normalize stage");
        Ok(Expression::chain("stage.normalize", block_expressions))
    })
}
