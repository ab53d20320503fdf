//! The `helper.ar_write` active-response sink operator.
//!
//! Forwards a resolved payload verbatim over a Unix datagram socket to the
//! active-response queue and records the boolean outcome on the event at
//! the destination's result field. The send is fire-and-forget: no
//! acknowledgment, no retry, no backpressure. A transport failure is a
//! defined per-event failure (`false`), never a crash.

use std::os::unix::net::UnixDatagram;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::builders::{invalid_type, single_entry};
use crate::error::BuildError;
use crate::expression::Expression;
use crate::registry::{BuilderFn, Registry};
use crate::syntax::{key_to_pointer, parse_helper_invocation, Argument};

/// Default active-response queue socket path.
pub const AR_QUEUE_PATH: &str = "/var/ossec/queue/alerts/ar";

/// Destination of side-effecting operators.
///
/// Injected when the defaults are registered, so tests and embedders can
/// point the sink at their own socket without touching process state.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Path of the Unix datagram socket receiving active-response commands.
    pub queue_path: PathBuf,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            queue_path: PathBuf::from(AR_QUEUE_PATH),
        }
    }
}

impl SinkConfig {
    /// A sink delivering to `queue_path`.
    pub fn new(queue_path: impl Into<PathBuf>) -> Self {
        SinkConfig {
            queue_path: queue_path.into(),
        }
    }
}

/// Build the `helper.ar_write` operator.
///
/// Build time: the content after `+ar_write/` must be non-empty, else the
/// whole pipeline refuses to compile. Run time: resolve the argument
/// (literal or `$reference`), send the bytes unframed, and write the
/// outcome to the destination field.
pub fn ar_write_builder(config: SinkConfig) -> BuilderFn {
    Arc::new(move |_registry: &Registry, definition: &Value| {
        let (key, value) = single_entry(definition)?;
        let raw = value.as_str().ok_or_else(|| invalid_type("string", value))?;

        let argument = match parse_helper_invocation(raw) {
            Some(("ar_write", arg)) if !arg.is_empty() => Argument::parse(arg),
            Some(("ar_write", _)) => return Err(BuildError::EmptyArgument("ar_write".into())),
            _ => {
                return Err(BuildError::InvalidDefinitionType {
                    expected: "+ar_write/<argument>",
                    actual: raw.to_string(),
                })
            }
        };

        let destination = key_to_pointer(key);
        let queue_path = config.queue_path.clone();

        Ok(Expression::term(
            format!("helper.ar_write[{key}]"),
            Arc::new(move |event| {
                let outcome = match argument.resolve(event) {
                    Some(payload) => send_datagram(&queue_path, payload.as_bytes()),
                    None => false,
                };
                event.set(&destination, Value::Bool(outcome));
                outcome
            }),
        ))
    })
}

/// Send one unacknowledged datagram; reports success only.
fn send_datagram(queue_path: &std::path::Path, payload: &[u8]) -> bool {
    let sent = UnixDatagram::unbound().and_then(|socket| socket.send_to(payload, queue_path));
    match sent {
        Ok(_) => true,
        Err(e) => {
            warn!(queue = %queue_path.display(), error = %e, "active-response send failed");
            false
        }
    }
}
