//! Per-market WebSocket connection supervision.
//!
//! Each supervisor owns one long-lived connection to an all-instrument
//! ticker stream, heartbeats it while open, and reconnects with a fixed
//! delay up to a bounded attempt count. Two instances (spot, derivative)
//! run concurrently with fully isolated retry and heartbeat state.

use crate::error::{WsError, WsResult};
use crate::heartbeat::HeartbeatTracker;
use crate::retry::{RetryDecision, RetryPolicy};
use cryptick_core::Market;
use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async_tls_with_config, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// WebSocket URL of the all-instrument ticker stream.
    pub url: String,
    /// Market label attached to every forwarded batch.
    pub market: Market,
    /// Maximum consecutive reconnect attempts before the terminal
    /// failed state.
    pub max_reconnect_attempts: u32,
    /// Fixed delay between reconnect attempts.
    pub reconnect_delay_ms: u64,
    /// Heartbeat ping interval while open.
    pub heartbeat_interval_ms: u64,
    /// Pong must arrive within this after a ping.
    pub heartbeat_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            market: Market::Spot,
            max_reconnect_attempts: 5,
            reconnect_delay_ms: 5000,
            heartbeat_interval_ms: 30000,
            heartbeat_timeout_ms: 10000,
        }
    }
}

/// Supervisor lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Not yet started.
    Idle,
    /// Dialing the endpoint.
    Connecting,
    /// Connection established and streaming.
    Open,
    /// Waiting out the fixed delay before the next attempt.
    Reconnecting,
    /// Retry budget exhausted; requires an external restart.
    Failed,
    /// Shut down on request.
    Disconnected,
}

/// A raw message batch received from one market's stream.
///
/// The payload is the untouched text frame; decoding happens downstream
/// so a malformed batch can never take the connection down.
#[derive(Debug, Clone)]
pub struct RawBatch {
    pub market: Market,
    pub payload: String,
}

/// Supervises one market's WebSocket connection.
pub struct ConnectionSupervisor {
    config: ConnectionConfig,
    state: RwLock<SupervisorState>,
    retry: Mutex<RetryPolicy>,
    heartbeat: HeartbeatTracker,
    batch_tx: mpsc::Sender<RawBatch>,
    shutdown_token: CancellationToken,
}

impl ConnectionSupervisor {
    /// Create a new supervisor forwarding batches into `batch_tx`.
    pub fn new(config: ConnectionConfig, batch_tx: mpsc::Sender<RawBatch>) -> Self {
        let retry = RetryPolicy::new(config.max_reconnect_attempts, config.reconnect_delay_ms);
        let heartbeat =
            HeartbeatTracker::new(config.heartbeat_interval_ms, config.heartbeat_timeout_ms);
        Self {
            config,
            state: RwLock::new(SupervisorState::Idle),
            retry: Mutex::new(retry),
            heartbeat,
            batch_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SupervisorState {
        *self.state.read()
    }

    /// Market this supervisor serves.
    pub fn market(&self) -> Market {
        self.config.market
    }

    /// Request shutdown.
    ///
    /// Idempotent and safe to call at any time, including during an
    /// in-flight reconnect wait. No further reconnect attempts or batch
    /// deliveries happen after the run loop observes the cancellation.
    pub fn shutdown(&self) {
        info!(market = %self.config.market, "Supervisor shutdown requested");
        self.shutdown_token.cancel();
    }

    /// Check if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect and run until shutdown or retry exhaustion.
    ///
    /// Returns `Ok(())` on requested shutdown and
    /// [`WsError::RetryExhausted`] when the retry budget is spent; the
    /// failed state is terminal and requires calling `run` again to
    /// recover.
    pub async fn run(&self) -> WsResult<()> {
        loop {
            if self.is_shutdown() {
                *self.state.write() = SupervisorState::Disconnected;
                return Ok(());
            }

            *self.state.write() = SupervisorState::Connecting;

            match self.stream_once().await {
                Ok(()) => {
                    info!(market = %self.config.market, "Connection closed");
                }
                Err(e) => {
                    error!(market = %self.config.market, ?e, "Connection error");
                }
            }

            if self.is_shutdown() {
                info!(market = %self.config.market, "Shutdown after disconnect, not reconnecting");
                *self.state.write() = SupervisorState::Disconnected;
                return Ok(());
            }

            let decision = self.retry.lock().record_failure();
            match decision {
                RetryDecision::GiveUp => {
                    *self.state.write() = SupervisorState::Failed;
                    let attempts = self.config.max_reconnect_attempts;
                    error!(
                        market = %self.config.market,
                        attempts,
                        "Reconnect attempts exhausted, giving up"
                    );
                    return Err(WsError::RetryExhausted { attempts });
                }
                RetryDecision::Retry(delay) => {
                    *self.state.write() = SupervisorState::Reconnecting;
                    warn!(
                        market = %self.config.market,
                        attempt = self.retry.lock().failures(),
                        delay_ms = delay.as_millis() as u64,
                        "Reconnecting"
                    );

                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        () = self.shutdown_token.cancelled() => {
                            info!(market = %self.config.market, "Shutdown during backoff");
                            *self.state.write() = SupervisorState::Disconnected;
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Dial once and pump messages until the connection drops.
    async fn stream_once(&self) -> WsResult<()> {
        info!(market = %self.config.market, url = %self.config.url, "Connecting to WebSocket");

        let (ws_stream, _response) =
            connect_async_tls_with_config(&self.config.url, None, true, None).await?;
        let (mut write, mut read) = ws_stream.split();

        *self.state.write() = SupervisorState::Open;
        self.retry.lock().record_open();
        self.heartbeat.reset();
        info!(market = %self.config.market, "WebSocket connected");

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!(market = %self.config.market, "Shutdown signal in message loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(?e, "Failed to send Close frame during shutdown");
                    }
                    *self.state.write() = SupervisorState::Disconnected;
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.heartbeat.record_message();
                            let batch = RawBatch {
                                market: self.config.market,
                                payload: text,
                            };
                            if self.batch_tx.send(batch).await.is_err() {
                                warn!(market = %self.config.market, "Batch receiver dropped");
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            debug!("Received ping, sending pong");
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            self.heartbeat.record_pong();
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = frame
                                .map(|f| (f.code.into(), f.reason.to_string()))
                                .unwrap_or((1000, "Normal close".to_string()));
                            warn!(market = %self.config.market, code, %reason, "WebSocket closed by server");
                            return Err(WsError::ConnectionClosed { code, reason });
                        }
                        Some(Err(e)) => {
                            error!(market = %self.config.market, ?e, "WebSocket read error");
                            return Err(e.into());
                        }
                        None => {
                            warn!(market = %self.config.market, "WebSocket stream ended");
                            return Ok(());
                        }
                        _ => {}
                    }
                }

                _ = self.heartbeat.wait_for_check() => {
                    if self.heartbeat.is_timed_out() {
                        error!(market = %self.config.market, "Heartbeat timeout");
                        return Err(WsError::HeartbeatTimeout);
                    }

                    if self.heartbeat.should_send_ping() {
                        write.send(Message::Ping(Vec::new())).await?;
                        self.heartbeat.record_ping();
                        debug!(market = %self.config.market, "Sent heartbeat ping");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConnectionConfig::default();
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.reconnect_delay_ms, 5000);
        assert_eq!(config.heartbeat_interval_ms, 30000);
    }

    #[tokio::test]
    async fn test_shutdown_before_run_is_clean() {
        let (batch_tx, _batch_rx) = mpsc::channel(8);
        let supervisor = ConnectionSupervisor::new(ConnectionConfig::default(), batch_tx);

        supervisor.shutdown();
        assert!(supervisor.is_shutdown());

        let result = supervisor.run().await;
        assert!(result.is_ok());
        assert_eq!(supervisor.state(), SupervisorState::Disconnected);
    }
}
