//! WebSocket stream supervision for the cryptick ticker feeds.
//!
//! Provides one [`ConnectionSupervisor`] per market (spot, derivative) with:
//! - Bounded reconnection with a fixed delay and a terminal failed state
//! - Heartbeat monitoring (30s ping, pong timeout detection)
//! - Cancellation-safe shutdown at any point of the lifecycle
//! - Raw batch forwarding into an mpsc channel

pub mod error;
pub mod heartbeat;
pub mod retry;
pub mod supervisor;

pub use error::{WsError, WsResult};
pub use heartbeat::HeartbeatTracker;
pub use retry::{RetryDecision, RetryPolicy};
pub use supervisor::{ConnectionConfig, ConnectionSupervisor, RawBatch, SupervisorState};

use std::sync::Once;

static INIT_CRYPTO: Once = Once::new();

/// Initialize the TLS crypto provider.
/// Must be called before any WebSocket connections are made.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
