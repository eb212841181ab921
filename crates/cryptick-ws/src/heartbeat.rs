//! Heartbeat management for WebSocket connections.
//!
//! Monitors connection health by tracking ping/pong timing and
//! message activity while the connection is open.

use parking_lot::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Heartbeat tracker for WebSocket connection health.
///
/// A ping is sent whenever the connection has been quiet for the
/// configured interval; a pong that fails to arrive within the timeout
/// is treated as a transport error by the supervisor.
pub struct HeartbeatTracker {
    /// How often to send a ping while the connection is quiet.
    interval: Duration,
    /// How long to wait for a pong before declaring the link dead.
    timeout: Duration,
    /// When the last ping was sent.
    last_ping: RwLock<Option<Instant>>,
    /// When any message was last received.
    last_message: RwLock<Instant>,
    /// Whether a pong is currently outstanding.
    waiting_for_pong: RwLock<bool>,
}

impl HeartbeatTracker {
    pub fn new(interval_ms: u64, timeout_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
            last_ping: RwLock::new(None),
            last_message: RwLock::new(Instant::now()),
            waiting_for_pong: RwLock::new(false),
        }
    }

    /// Reset heartbeat state (called on every successful open).
    pub fn reset(&self) {
        *self.last_ping.write() = None;
        *self.last_message.write() = Instant::now();
        *self.waiting_for_pong.write() = false;
    }

    /// Record that a ping was sent.
    pub fn record_ping(&self) {
        *self.last_ping.write() = Some(Instant::now());
        *self.waiting_for_pong.write() = true;
        debug!("Recorded ping");
    }

    /// Record that a pong was received.
    pub fn record_pong(&self) {
        *self.waiting_for_pong.write() = false;
        if let Some(ping_time) = *self.last_ping.read() {
            debug!(rtt_ms = ping_time.elapsed().as_millis() as u64, "Received pong");
        }
    }

    /// Record that any message was received.
    pub fn record_message(&self) {
        *self.last_message.write() = Instant::now();
    }

    /// Check if an outstanding ping has gone unanswered past the timeout.
    pub fn is_timed_out(&self) -> bool {
        if !*self.waiting_for_pong.read() {
            return false;
        }
        match *self.last_ping.read() {
            Some(ping_time) => ping_time.elapsed() > self.timeout,
            None => false,
        }
    }

    /// Check if a ping should be sent now.
    pub fn should_send_ping(&self) -> bool {
        // Don't stack pings while one is outstanding
        if *self.waiting_for_pong.read() {
            return false;
        }
        self.last_message.read().elapsed() >= self.interval
    }

    /// Wait until the next heartbeat check is due.
    pub async fn wait_for_check(&self) {
        tokio::time::sleep(self.interval / 2).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_initial_state() {
        let hb = HeartbeatTracker::new(30000, 10000);
        assert!(!hb.is_timed_out());
        assert!(!*hb.waiting_for_pong.read());
    }

    #[test]
    fn test_heartbeat_ping_pong() {
        let hb = HeartbeatTracker::new(30000, 10000);

        hb.record_ping();
        assert!(*hb.waiting_for_pong.read());

        hb.record_pong();
        assert!(!*hb.waiting_for_pong.read());
        assert!(!hb.is_timed_out());
    }

    #[test]
    fn test_no_ping_while_pong_outstanding() {
        let hb = HeartbeatTracker::new(0, 10000);
        assert!(hb.should_send_ping());

        hb.record_ping();
        assert!(!hb.should_send_ping());
    }

    #[test]
    fn test_timeout_with_zero_budget() {
        let hb = HeartbeatTracker::new(30000, 0);
        hb.record_ping();
        std::thread::sleep(Duration::from_millis(5));
        assert!(hb.is_timed_out());
    }
}
