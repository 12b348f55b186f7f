//! Client-Verbindung – eine TCP-Verbindung, ein tokio-Task
//!
//! Liest zeilenweise JSON-Nachrichten, dispatcht sie an das Gateway und
//! schreibt ausgehende Nachrichten aus der Transport-Queue zurueck auf
//! den Draht. Beim Verbindungsende werden alle Raeume des Sockets
//! verlassen, damit leave-Hooks und Presence-Deregistrierung auch bei
//! harten Trennungen laufen.

use futures_util::{SinkExt, StreamExt};
use funkhaus_channels::{ChannelGateway, MemoryTransport, RoomTransport};
use funkhaus_protocol::{ClientMessage, Socket, SocketId};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};

/// Grund der beim Verbindungsende an das Gateway gemeldet wird
const TRENNUNGS_GRUND: &str = "getrennt";

/// Grund der bei einer Unsubscribe-Nachricht gemeldet wird
const ABBESTELLT_GRUND: &str = "abbestellt";

/// Verarbeitet eine einzelne TCP-Verbindung
pub struct ClientConnection {
    gateway: Arc<ChannelGateway>,
    transport: MemoryTransport,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(
        gateway: Arc<ChannelGateway>,
        transport: MemoryTransport,
        peer_addr: SocketAddr,
    ) -> Self {
        Self {
            gateway,
            transport,
            peer_addr,
        }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let mut socket = Socket::neu(SocketId::new());
        tracing::info!(peer = %self.peer_addr, socket = %socket.id, "Neue Verbindung");

        let mut framed = Framed::new(stream, LinesCodec::new());
        let mut sende_rx = self.transport.registrieren(socket.id);

        loop {
            tokio::select! {
                // Eingehende Zeile vom Client
                zeile = framed.next() => {
                    match zeile {
                        Some(Ok(zeile)) => {
                            match serde_json::from_str::<ClientMessage>(&zeile) {
                                Ok(nachricht) => self.dispatch(&mut socket, nachricht).await,
                                Err(e) => {
                                    // Unlesbare Anfragen eskalieren nie
                                    tracing::debug!(
                                        socket = %socket.id,
                                        fehler = %e,
                                        "Unlesbare Nachricht verworfen"
                                    );
                                }
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(peer = %self.peer_addr, fehler = %e, "Lesefehler");
                            break;
                        }
                        None => {
                            tracing::info!(peer = %self.peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Ausgehende Nachricht aus der Transport-Queue
                Some(ausgehend) = sende_rx.recv() => {
                    match serde_json::to_string(&ausgehend) {
                        Ok(zeile) => {
                            if let Err(e) = framed.send(zeile).await {
                                tracing::warn!(peer = %self.peer_addr, fehler = %e, "Senden fehlgeschlagen");
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "Nachricht nicht serialisierbar");
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %self.peer_addr, "Shutdown-Signal – Verbindung wird getrennt");
                        break;
                    }
                }
            }
        }

        // Cleanup: alle Raeume verlassen (Presence + leave-Hooks), dann
        // aus dem Transport deregistrieren
        for kanal in self.transport.raeume_von(&socket.id) {
            self.gateway
                .verlassen(&socket, &kanal, TRENNUNGS_GRUND, None)
                .await;
        }
        self.transport.entfernen(&socket.id);

        tracing::info!(peer = %self.peer_addr, socket = %socket.id, "Verbindungs-Task beendet");
    }

    /// Dispatcht eine geparste Nachricht an das Gateway
    async fn dispatch(&self, socket: &mut Socket, nachricht: ClientMessage) {
        match nachricht {
            ClientMessage::Handshake { headers } => {
                socket.cookie = headers
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case("cookie"))
                    .map(|(_, wert)| wert.clone());
                tracing::debug!(
                    socket = %socket.id,
                    cookie_vorhanden = socket.cookie.is_some(),
                    "Handshake empfangen"
                );
            }
            ClientMessage::Subscribe(anfrage) => {
                self.gateway.beitreten(socket, anfrage).await;
            }
            ClientMessage::Unsubscribe(anfrage) => {
                self.gateway
                    .verlassen(socket, &anfrage.channel, ABBESTELLT_GRUND, anfrage.auth)
                    .await;
            }
            ClientMessage::ClientEvent(anfrage) => {
                self.gateway.client_event(socket, anfrage).await;
            }
        }
    }
}
