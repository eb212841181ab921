//! Integration tests for cryptick-app.
//!
//! These tests verify the interaction between components:
//! - WebSocket connection lifecycle against a mock server
//! - Reconnection and retry exhaustion behavior

pub mod common;
