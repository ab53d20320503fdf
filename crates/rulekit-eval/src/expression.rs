//! Expression algebra for compiled stages.
//!
//! A stage definition compiles into one immutable [`Expression`] tree.
//! Leaves ([`Expression::Term`]) wrap per-event evaluator closures; the
//! non-leaf variants define how child results and side effects combine.
//! Only events are mutated during evaluation; the tree itself is shared
//! read-only across every event and every pipeline holding it.

use std::fmt;
use std::sync::Arc;

use crate::event::Event;

/// A per-event evaluator: mutates the event in place and reports success.
pub type EvalFn = Arc<dyn Fn(&mut Event) -> bool + Send + Sync>;

/// One node of a compiled stage tree.
///
/// Every non-leaf node carries a diagnostic name (used in traces and in
/// the [`Expression::describe`] dump) and an ordered child sequence.
#[derive(Clone)]
pub enum Expression {
    /// Leaf: a single per-event operator.
    Term { name: String, eval: EvalFn },
    /// All children must succeed. Every child still runs; only the
    /// aggregate boolean short-circuits, the side effects do not.
    And {
        name: String,
        children: Vec<Expression>,
    },
    /// Any child success suffices; stops at the first success.
    Or {
        name: String,
        children: Vec<Expression>,
    },
    /// Applies every child in order, unconditionally. A failing child
    /// never prevents later children from running.
    Chain {
        name: String,
        children: Vec<Expression>,
    },
    /// Fans one input event into one independent evaluation per child.
    Broadcast {
        name: String,
        children: Vec<Expression>,
    },
}

impl Expression {
    /// Create a leaf node wrapping an evaluator closure.
    pub fn term(name: impl Into<String>, eval: EvalFn) -> Self {
        Expression::Term {
            name: name.into(),
            eval,
        }
    }

    /// Create an `And` node over `children`.
    pub fn and(name: impl Into<String>, children: Vec<Expression>) -> Self {
        Expression::And {
            name: name.into(),
            children,
        }
    }

    /// Create an `Or` node over `children`.
    pub fn or(name: impl Into<String>, children: Vec<Expression>) -> Self {
        Expression::Or {
            name: name.into(),
            children,
        }
    }

    /// Create a `Chain` node over `children`.
    pub fn chain(name: impl Into<String>, children: Vec<Expression>) -> Self {
        Expression::Chain {
            name: name.into(),
            children,
        }
    }

    /// Create a `Broadcast` node over `children`.
    pub fn broadcast(name: impl Into<String>, children: Vec<Expression>) -> Self {
        Expression::Broadcast {
            name: name.into(),
            children,
        }
    }

    /// The diagnostic name of this node.
    pub fn name(&self) -> &str {
        match self {
            Expression::Term { name, .. }
            | Expression::And { name, .. }
            | Expression::Or { name, .. }
            | Expression::Chain { name, .. }
            | Expression::Broadcast { name, .. } => name,
        }
    }

    /// Evaluate this node against an event, mutating it in place.
    ///
    /// Fan-out at the tree root is handled by
    /// [`Pipeline::process`](crate::pipeline::Pipeline::process); a nested
    /// `Broadcast` evaluates every child against the same event and always
    /// reports success.
    pub fn evaluate(&self, event: &mut Event) -> bool {
        match self {
            Expression::Term { eval, .. } => eval(event),
            Expression::And { children, .. } => {
                // No execution short-circuit: every child runs so its
                // side effects land on the event.
                let mut all = true;
                for child in children {
                    all &= child.evaluate(event);
                }
                all
            }
            Expression::Or { children, .. } => {
                for child in children {
                    if child.evaluate(event) {
                        return true;
                    }
                }
                false
            }
            Expression::Chain { children, .. } => {
                for child in children {
                    child.evaluate(event);
                }
                true
            }
            Expression::Broadcast { children, .. } => {
                for child in children {
                    child.evaluate(event);
                }
                true
            }
        }
    }

    /// Render the tree as an indented diagnostic dump.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, 0);
        out
    }

    fn describe_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        let (kind, children) = match self {
            Expression::Term { .. } => ("term", None),
            Expression::And { children, .. } => ("and", Some(children)),
            Expression::Or { children, .. } => ("or", Some(children)),
            Expression::Chain { children, .. } => ("chain", Some(children)),
            Expression::Broadcast { children, .. } => ("broadcast", Some(children)),
        };
        out.push_str(kind);
        out.push_str(": ");
        out.push_str(self.name());
        out.push('\n');
        if let Some(children) = children {
            for child in children {
                child.describe_into(out, depth + 1);
            }
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe().trim_end())
    }
}
