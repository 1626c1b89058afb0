//! WebSocket driver for the shared connection.

use std::sync::Weak;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::common::{ClientEvent, Credential, PushEvent};
use crate::error::Result;

use super::connection::{Connection, ConnectionLink, Connector};
use super::socketio::{self, Packet};

/// Silence allowed before the handshake tells us the real heartbeat.
const INITIAL_SILENCE: Duration = Duration::from_secs(60);

/// Opens the shared connection as a Socket.IO client over WebSocket.
pub struct SocketIoConnector {
    url: Url,
    runtime: Handle,
    reconnect_delay: Duration,
}

impl SocketIoConnector {
    pub fn new(url: Url, runtime: Handle, reconnect_delay: Duration) -> Self {
        Self {
            url,
            runtime,
            reconnect_delay,
        }
    }
}

impl Connector for SocketIoConnector {
    fn open(&self, credential: &Credential, link: ConnectionLink) {
        let driver = Driver {
            url: self.url.clone(),
            credential: credential.clone(),
            reconnect_delay: self.reconnect_delay,
        };
        let ConnectionLink {
            connection,
            outbound,
        } = link;
        let connection = std::sync::Arc::downgrade(&connection);
        self.runtime.spawn(driver.run(connection, outbound));
    }
}

enum SessionEnd {
    /// The connection object was dropped; stop for good.
    Closed,
    /// The server refused the credential.
    Rejected,
    Lost,
}

struct Driver {
    url: Url,
    credential: Credential,
    reconnect_delay: Duration,
}

impl Driver {
    async fn run(
        self,
        connection: Weak<Connection>,
        mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
    ) {
        log::info!("Real-time driver started for {}", self.url);
        loop {
            match self.session(&connection, &mut outbound).await {
                Ok(SessionEnd::Closed) => break,
                Ok(SessionEnd::Rejected) => {
                    log::error!("Real-time connection refused the credential; not retrying");
                    break;
                }
                Ok(SessionEnd::Lost) => {
                    log::warn!("Real-time connection lost; retrying in {:?}", self.reconnect_delay);
                }
                Err(err) => {
                    log::warn!(
                        "Real-time connection failed: {err}; retrying in {:?}",
                        self.reconnect_delay
                    );
                }
            }

            sleep(self.reconnect_delay).await;
            if connection.strong_count() == 0 {
                break;
            }
        }
        log::info!("Real-time driver stopped");
    }

    async fn session(
        &self,
        connection: &Weak<Connection>,
        outbound: &mut mpsc::UnboundedReceiver<ClientEvent>,
    ) -> Result<SessionEnd> {
        let (stream, _) = connect_async(self.url.as_str()).await?;
        let (mut write, mut read) = stream.split();
        let mut joined = false;
        let mut silence = INITIAL_SILENCE;
        let mut deadline = Instant::now() + silence;

        loop {
            tokio::select! {
                frame = read.next() => {
                    let Some(frame) = frame else {
                        return Ok(SessionEnd::Lost);
                    };
                    deadline = Instant::now() + silence;

                    let text = match frame? {
                        Message::Text(text) => text,
                        Message::Close(_) => return Ok(SessionEnd::Lost),
                        _ => continue,
                    };

                    let packet = match socketio::decode(text.as_str()) {
                        Ok(packet) => packet,
                        Err(err) => {
                            log::debug!("Skipping real-time frame: {err}");
                            continue;
                        }
                    };

                    match packet {
                        Packet::Open(handshake) => {
                            silence = Duration::from_millis(
                                handshake.ping_interval + handshake.ping_timeout,
                            )
                            .max(Duration::from_secs(1));
                            deadline = Instant::now() + silence;
                            let auth = json!({ "token": self.credential.as_str() });
                            write
                                .send(Message::text(socketio::encode(&Packet::Connect(Some(auth)))))
                                .await?;
                        }
                        Packet::Ping => {
                            write.send(Message::text(socketio::encode(&Packet::Pong))).await?;
                        }
                        Packet::Connect(_) => {
                            log::info!("Real-time connection established");
                            joined = true;
                        }
                        Packet::ConnectError(detail) => {
                            log::warn!("Real-time connect error: {detail}");
                            return Ok(SessionEnd::Rejected);
                        }
                        Packet::Event { name, payload } => {
                            let Some(connection) = connection.upgrade() else {
                                return Ok(SessionEnd::Closed);
                            };
                            match PushEvent::decode(&name, payload) {
                                Ok(Some(event)) => {
                                    connection.dispatch(event);
                                }
                                Ok(None) => log::debug!("Ignoring real-time event `{name}`"),
                                Err(err) => log::warn!("Malformed `{name}` payload: {err}"),
                            }
                        }
                        Packet::Disconnect | Packet::Close => return Ok(SessionEnd::Lost),
                        Packet::Pong | Packet::Noop => {}
                    }
                }
                event = outbound.recv(), if joined => {
                    let Some(event) = event else {
                        let _ = write
                            .send(Message::text(socketio::encode(&Packet::Disconnect)))
                            .await;
                        return Ok(SessionEnd::Closed);
                    };
                    let frame = socketio::encode(&Packet::Event {
                        name: event.name().to_string(),
                        payload: event.payload(),
                    });
                    write.send(Message::text(frame)).await?;
                }
                _ = sleep_until(deadline) => {
                    log::warn!("Real-time heartbeat missed");
                    return Ok(SessionEnd::Lost);
                }
            }
        }
    }
}
