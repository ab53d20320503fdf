//! Per-event pipeline evaluation over a compiled expression tree.
//!
//! A [`Pipeline`] interprets the root expression as the per-event operator
//! of a continuous stream: one event in, zero or more events out (exactly
//! one for `Term`/`And`/`Or`/`Chain` roots, one per child for a
//! `Broadcast` root). Evaluation is synchronous and purely a function of
//! the event and the immutable tree, so a `Pipeline` behind an `Arc` may
//! serve several worker threads, each owning its events exclusively.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

use crate::error::Result;
use crate::event::Event;
use crate::expression::Expression;
use crate::registry::Registry;

/// A compiled, evaluable pipeline.
#[derive(Debug)]
pub struct Pipeline {
    root: Expression,
}

impl Pipeline {
    /// Wrap an already-built expression tree.
    pub fn new(root: Expression) -> Self {
        Pipeline { root }
    }

    /// Resolve `stage` in the registry and compile `definition` into a
    /// pipeline. All names are resolved here; evaluation never consults
    /// the registry.
    pub fn compile(
        registry: &Registry,
        stage: &str,
        definition: &serde_json::Value,
    ) -> Result<Self> {
        let root = registry.build(stage, definition)?;
        debug!(stage, "pipeline compiled");
        Ok(Pipeline::new(root))
    }

    /// The compiled root expression.
    pub fn root(&self) -> &Expression {
        &self.root
    }

    /// Evaluate one event, producing its outputs in order.
    ///
    /// A `Broadcast` root fans the input into one cloned, independently
    /// evaluated event per child; every other root mutates and returns
    /// the single input event. Per-event failures are outcomes recorded
    /// on the event, so this never fails and never drops an event.
    pub fn process(&self, event: Event) -> Vec<Event> {
        match &self.root {
            Expression::Broadcast { children, .. } => children
                .iter()
                .map(|child| {
                    let mut copy = event.clone();
                    child.evaluate(&mut copy);
                    copy
                })
                .collect(),
            root => {
                let mut event = event;
                root.evaluate(&mut event);
                vec![event]
            }
        }
    }

    /// Run the pipeline over a push-stream of events until the input side
    /// is dropped or the output side is closed.
    ///
    /// Events are processed strictly in arrival order; an evaluation in
    /// progress always completes before the loop observes cancellation.
    pub fn run(&self, input: Receiver<Event>, output: Sender<Event>) {
        for event in input.iter() {
            for out in self.process(event) {
                if output.send(out).is_err() {
                    debug!("output channel closed, stopping pipeline");
                    return;
                }
            }
        }
        debug!("input channel closed, pipeline drained");
    }

    /// Spawn a worker thread running this pipeline, returning its handle.
    pub fn spawn(self: Arc<Self>) -> PipelineHandle {
        let (input_tx, input_rx) = unbounded();
        let (output_tx, output_rx) = unbounded();
        let worker = std::thread::spawn(move || self.run(input_rx, output_tx));
        PipelineHandle {
            input: input_tx,
            output: output_rx,
            worker,
        }
    }
}

/// Handle to a spawned pipeline worker.
///
/// Dropping (or hanging up) `input` stops the worker after in-flight
/// events drain; `join` then returns.
pub struct PipelineHandle {
    /// Feed events in arrival order.
    pub input: Sender<Event>,
    /// Receive output events, order preserved.
    pub output: Receiver<Event>,
    worker: JoinHandle<()>,
}

impl PipelineHandle {
    /// Close the input side and wait for the worker to finish.
    pub fn join(self) {
        drop(self.input);
        let _ = self.worker.join();
    }
}
