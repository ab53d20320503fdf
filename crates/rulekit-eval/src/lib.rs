//! # rulekit-eval
//!
//! Rule-compilation and event-evaluation core for a security telemetry
//! processing engine. Declarative, JSON-shaped stage definitions
//! (`normalize`, `check`, `map`, combinators) compile into an immutable
//! tree of composable operators; the tree then runs once per incoming
//! event to filter, enrich, and trigger side effects such as dispatching
//! an active-response command.
//!
//! ## Architecture
//!
//! - **Compile** (fatal, structural): a [`Registry`] of builder factories
//!   resolves every qualified operator name while the tree is assembled.
//!   Malformed shape, unknown names, and empty required arguments abort
//!   construction with a [`BuildError`] carrying positional context.
//! - **Evaluate** (recoverable, per event): the compiled [`Expression`]
//!   mutates each [`Event`] in place. Failures such as an unresolved
//!   reference or a transport error become boolean outcomes recorded on
//!   the event and never interrupt the stream.
//!
//! ## Quick Start
//!
//! ```rust
//! use rulekit_eval::{builders, Event, Pipeline, Registry, SinkConfig};
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! builders::register_defaults(&mut registry, SinkConfig::default());
//!
//! let definition = json!([
//!     {
//!         "check": [{"event.kind": "+exists"}],
//!         "map": {"normalized": "yes"}
//!     }
//! ]);
//!
//! let pipeline = Pipeline::compile(&registry, "stage.normalize", &definition).unwrap();
//! let outputs = pipeline.process(Event::from_value(json!({"event": {"kind": "alert"}})));
//! assert_eq!(outputs.len(), 1);
//! assert_eq!(outputs[0].get("/normalized"), Some(&json!("yes")));
//! ```
//!
//! Registries are plain owned values: populate one during setup, wrap it
//! in an `Arc`, and compile as many independent pipelines from it as you
//! need. Nothing in this crate is global state.

pub mod builders;
pub mod error;
pub mod event;
pub mod expression;
pub mod pipeline;
pub mod registry;
pub mod sink;
pub mod syntax;

// Re-export the most commonly used types at crate root
pub use error::{BuildError, Result};
pub use event::Event;
pub use expression::{EvalFn, Expression};
pub use pipeline::{Pipeline, PipelineHandle};
pub use registry::{BuilderFn, Registry};
pub use sink::{SinkConfig, AR_QUEUE_PATH};
pub use syntax::Argument;
