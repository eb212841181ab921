//! Mock WebSocket server for integration tests.
//!
//! Provides a simple WebSocket server that can:
//! - Accept connections and count them
//! - Broadcast ticker batch frames to every client
//! - Force-close all open connections to provoke reconnects

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// A mock WebSocket server for testing.
pub struct MockWsServer {
    addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    clients: Arc<Mutex<Vec<mpsc::UnboundedSender<Message>>>>,
    connections: Arc<Mutex<u32>>,
}

impl MockWsServer {
    /// Start a new mock WebSocket server on an available port.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let clients: Arc<Mutex<Vec<mpsc::UnboundedSender<Message>>>> =
            Arc::new(Mutex::new(Vec::new()));
        let connections: Arc<Mutex<u32>> = Arc::new(Mutex::new(0));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let clients_clone = clients.clone();
        let connections_clone = connections.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Ok((stream, _)) = listener.accept() => {
                        let clients = clients_clone.clone();
                        let connections = connections_clone.clone();
                        tokio::spawn(handle_connection(stream, clients, connections));
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx,
            clients,
            connections,
        }
    }

    /// Get the server's WebSocket URL.
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Get the number of connections received.
    pub async fn connection_count(&self) -> u32 {
        *self.connections.lock().await
    }

    /// Send a text frame to every connected client.
    pub async fn broadcast(&self, text: &str) {
        let clients = self.clients.lock().await;
        for client in clients.iter() {
            let _ = client.send(Message::Text(text.to_string()));
        }
    }

    /// Close every open connection without shutting the listener down,
    /// so clients that reconnect are accepted again.
    pub async fn close_connections(&self) {
        let mut clients = self.clients.lock().await;
        for client in clients.drain(..) {
            let _ = client.send(Message::Close(None));
        }
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

async fn handle_connection(
    stream: TcpStream,
    clients: Arc<Mutex<Vec<mpsc::UnboundedSender<Message>>>>,
    connections: Arc<Mutex<u32>>,
) {
    {
        let mut count = connections.lock().await;
        *count += 1;
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
    {
        let mut list = clients.lock().await;
        list.push(outbound_tx);
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            Some(msg) = outbound_rx.recv() => {
                let closing = matches!(msg, Message::Close(_));
                if write.send(msg).await.is_err() {
                    break;
                }
                if closing {
                    break;
                }
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = write.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
