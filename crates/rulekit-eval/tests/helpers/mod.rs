use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rulekit_eval::{builders, Event, Pipeline, Registry, SinkConfig};
use serde_json::Value;
use tempfile::TempDir;

/// A bound active-response queue socket living in a temp directory.
pub struct ArQueue {
    _dir: TempDir,
    socket: UnixDatagram,
    pub path: PathBuf,
}

pub fn bind_ar_queue() -> ArQueue {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ar");
    let socket = UnixDatagram::bind(&path).unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    ArQueue {
        _dir: dir,
        socket,
        path,
    }
}

impl ArQueue {
    /// Receive one datagram as a string; panics after the read timeout.
    pub fn recv_string(&self) -> String {
        let mut buf = [0u8; 4096];
        let n = self.socket.recv(&mut buf).unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    /// True when a datagram is waiting right now.
    pub fn has_pending(&self) -> bool {
        self.socket.set_nonblocking(true).unwrap();
        let mut buf = [0u8; 4096];
        let pending = self.socket.recv(&mut buf).is_ok();
        self.socket.set_nonblocking(false).unwrap();
        pending
    }
}

pub fn registry_for(queue_path: &Path) -> Registry {
    let mut registry = Registry::new();
    builders::register_defaults(&mut registry, SinkConfig::new(queue_path));
    registry
}

pub fn compile_normalize(registry: &Registry, definition: Value) -> Pipeline {
    Pipeline::compile(registry, "stage.normalize", &definition).unwrap()
}

/// Process one event, asserting the one-in/one-out contract.
pub fn process_one(pipeline: &Pipeline, event: Value) -> Event {
    let mut outputs = pipeline.process(Event::from_value(event));
    assert_eq!(outputs.len(), 1, "expected exactly one output event");
    outputs.remove(0)
}
