//! Stage-definition value syntax.
//!
//! Two markers appear inside definition values:
//!
//! - `+<helper>/<argument>` invokes a named helper operator with an
//!   argument string;
//! - `$<field>` denotes a run-time reference to an event field (dot
//!   separated for nesting), as opposed to a literal.
//!
//! Destination keys in `map` blocks are dot paths (`ar_write.result`) and
//! convert to JSON pointers (`/ar_write/result`) for event access.

use crate::event::Event;

/// Marker introducing a helper invocation value.
pub const HELPER_ANCHOR: char = '+';
/// Separator between a helper name and its argument.
pub const HELPER_ARG_SEPARATOR: char = '/';
/// Marker introducing a field reference.
pub const REFERENCE_ANCHOR: char = '$';

/// Split a `+<helper>/<argument>` value into helper name and argument.
///
/// Returns `None` when the value is not a helper invocation. The argument
/// may be empty here; whether that is acceptable is each builder's
/// build-time decision.
pub fn parse_helper_invocation(value: &str) -> Option<(&str, &str)> {
    let rest = value.strip_prefix(HELPER_ANCHOR)?;
    match rest.split_once(HELPER_ARG_SEPARATOR) {
        Some((name, arg)) => Some((name, arg)),
        None => Some((rest, "")),
    }
}

/// Convert a dot-separated destination key into a JSON pointer.
pub fn key_to_pointer(key: &str) -> String {
    let mut pointer = String::with_capacity(key.len() + 1);
    for segment in key.split('.') {
        pointer.push('/');
        pointer.push_str(segment);
    }
    pointer
}

/// An operator argument, parsed at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Use the string verbatim.
    Literal(String),
    /// Resolve the named event field at evaluation time. The name may be
    /// empty (`$` alone); that is a defined per-event failure, not a
    /// build error.
    Reference(String),
}

impl Argument {
    /// Parse an argument string as a literal or a `$field` reference.
    pub fn parse(raw: &str) -> Argument {
        match raw.strip_prefix(REFERENCE_ANCHOR) {
            Some(name) => Argument::Reference(name.to_string()),
            None => Argument::Literal(raw.to_string()),
        }
    }

    /// Resolve this argument against an event.
    ///
    /// A literal resolves to itself. A reference resolves only when the
    /// name is non-empty, the field is present, and the field holds a
    /// non-empty string; every other case is `None` (the per-event
    /// failure the caller records as a false outcome).
    pub fn resolve(&self, event: &Event) -> Option<String> {
        match self {
            Argument::Literal(value) => Some(value.clone()),
            Argument::Reference(name) => {
                if name.is_empty() {
                    return None;
                }
                match event.get(&key_to_pointer(name)) {
                    Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
                    _ => None,
                }
            }
        }
    }
}
