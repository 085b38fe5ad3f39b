//! An in-memory transport used by the test suite.
//!
//! Concrete network transports (UDP, TCP, TLS) are deliberately not part of
//! this crate: the core only needs `send` and `reliable`/`secure` queries
//! against the [`Transport`] trait (see [`super::Transport`]). Call sites
//! that need an actual socket bring their own implementation of the trait.

use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Mutex;

use crate::error::Result;
use crate::message::TransportProtocol;

use super::Transport;

/// A `Transport` that records sent buffers instead of writing to a socket.
pub struct MockTransport {
    addr: SocketAddr,
    reliable: bool,
    secure: bool,
    kind: TransportProtocol,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl MockTransport {
    /// Creates a new unreliable, insecure mock transport bound to `127.0.0.1:5060`.
    pub fn new() -> Self {
        Self {
            addr: "127.0.0.1:5060".parse().unwrap(),
            reliable: false,
            secure: false,
            kind: TransportProtocol::Udp,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock transport that reports itself as reliable (e.g. to emulate TCP).
    pub fn reliable() -> Self {
        Self {
            reliable: true,
            kind: TransportProtocol::Tcp,
            ..Self::new()
        }
    }

    /// Returns every buffer handed to `send` so far, in order.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().expect("lock poisoned").clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, buf: &[u8], _addr: &SocketAddr) -> Result<usize> {
        self.sent.lock().expect("lock poisoned").push(buf.to_vec());
        Ok(buf.len())
    }

    fn tp_kind(&self) -> TransportProtocol {
        self.kind
    }

    fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn reliable(&self) -> bool {
        self.reliable
    }

    fn secure(&self) -> bool {
        self.secure
    }

    fn local_name(&self) -> Cow<'_, str> {
        Cow::Borrowed("mock")
    }
}
