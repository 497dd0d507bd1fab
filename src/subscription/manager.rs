use crate::broker::{Broker, SubscriberId};
use crate::point::TelemetryPoint;
use crate::subscription::protocol::Command;
use axum::extract::ws::{Message, WebSocket};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Manages a single realtime WebSocket connection.
///
/// Registers with the broker on creation and tears the registration down
/// when the connection closes, whichever side closes it.
pub struct ConnectionManager {
    id: SubscriberId,
    broker: Arc<Broker>,
}

impl ConnectionManager {
    pub fn new(broker: Arc<Broker>) -> Self {
        Self {
            id: Uuid::new_v4(),
            broker,
        }
    }

    /// Handle the WebSocket connection lifecycle.
    pub async fn handle(self, mut socket: WebSocket) {
        let mut delivery = self.broker.register(self.id);
        info!(subscriber = %self.id, "Realtime connection established");

        loop {
            tokio::select! {
                // Incoming client commands
                msg = socket.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_command(&text);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(subscriber = %self.id, "Realtime client disconnected");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(subscriber = %self.id, error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, pong messages
                        }
                        Some(Err(e)) => {
                            warn!(subscriber = %self.id, error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Matched telemetry points from the broker
                point = delivery.recv() => {
                    match point {
                        Some(point) => {
                            if let Err(e) = Self::send_point(&mut socket, &point).await {
                                error!(subscriber = %self.id, error = %e,
                                       "Failed to push telemetry point");
                                break;
                            }
                        }
                        None => {
                            // Broker dropped the queue (re-registration)
                            break;
                        }
                    }
                }
            }
        }

        self.broker.remove(self.id);
        info!(subscriber = %self.id, "Realtime connection closed");
    }

    /// Apply one text command. Unknown commands are logged and ignored;
    /// they never tear down the connection.
    fn handle_command(&self, text: &str) {
        match Command::parse(text) {
            Ok(Command::Subscribe(point_id)) => self.broker.subscribe(self.id, &point_id),
            Ok(Command::Unsubscribe(point_id)) => self.broker.unsubscribe(self.id, &point_id),
            Err(e) => warn!(subscriber = %self.id, error = %e, "Ignoring realtime command"),
        }
    }

    async fn send_point(socket: &mut WebSocket, point: &TelemetryPoint) -> anyhow::Result<()> {
        let json = serde_json::to_string(point)?;
        socket.send(Message::Text(json)).await?;
        Ok(())
    }
}
