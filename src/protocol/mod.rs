//! Protocol types and the forwarding-handler registry
//!
//! The routing core never talks to the network itself. It only needs to know,
//! at index build time, whether a forwarding handler has been registered for a
//! backend's protocol; routes pointing at backends without one are rejected
//! before they can be served.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Protocol type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolType {
    /// HTTP/1.1 protocol
    Http,
    /// HTTP/2 protocol
    Http2,
    /// gRPC protocol (HTTP/2 based)
    Grpc,
    /// WebSocket protocol
    WebSocket,
    /// TCP layer 4 protocol
    Tcp,
    /// UDP layer 4 protocol
    Udp,
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolType::Http => write!(f, "http"),
            ProtocolType::Http2 => write!(f, "http2"),
            ProtocolType::Grpc => write!(f, "grpc"),
            ProtocolType::WebSocket => write!(f, "websocket"),
            ProtocolType::Tcp => write!(f, "tcp"),
            ProtocolType::Udp => write!(f, "udp"),
        }
    }
}

impl Default for ProtocolType {
    fn default() -> Self {
        ProtocolType::Http
    }
}

/// A forwarding handler for one protocol.
///
/// The transport layer implements this; the routing core only records
/// registrations and checks presence during index build.
pub trait ProtocolHandler: Send + Sync {
    /// The protocol this handler forwards
    fn protocol(&self) -> ProtocolType;

    /// Handler name for logs and diagnostics
    fn name(&self) -> &str;
}

/// Explicit registry of forwarding handlers, keyed by protocol.
///
/// Constructed once at process start and passed by reference into the route
/// table builder; there is no ambient global registration.
#[derive(Default)]
pub struct ProtocolRegistry {
    handlers: RwLock<HashMap<ProtocolType, Arc<dyn ProtocolHandler>>>,
}

impl ProtocolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for its protocol, replacing any previous one
    pub fn register(&self, handler: Arc<dyn ProtocolHandler>) {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        handlers.insert(handler.protocol(), handler);
    }

    /// Look up the handler registered for a protocol
    pub fn lookup(&self, protocol: ProtocolType) -> Option<Arc<dyn ProtocolHandler>> {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        handlers.get(&protocol).cloned()
    }

    /// Whether a handler is registered for the protocol
    pub fn contains(&self, protocol: ProtocolType) -> bool {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        handlers.contains_key(&protocol)
    }
}
