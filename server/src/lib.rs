//! funkhaus-server – Bibliotheks-Root
//!
//! Verdrahtet das Kanal-Gateway mit dem In-Memory-Transport und dem
//! HTTP-Authenticator und betreibt den TCP-Listener. Jede eingehende
//! Verbindung laeuft als eigener tokio-Task.

pub mod config;
pub mod connection;

use anyhow::Result;
use config::ServerConfig;
use connection::ClientConnection;
use funkhaus_channels::{ChannelGateway, HttpAuthenticator, MemoryPresence, MemoryTransport};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Server und laeuft bis zum Shutdown-Signal (Ctrl-C)
    pub async fn starten(self) -> Result<()> {
        let optionen = self.config.gateway_optionen();

        let transport = MemoryTransport::neu();
        let auth = Arc::new(HttpAuthenticator::neu(
            &optionen.auth_host,
            &optionen.auth_endpoint,
        ));
        let presence = Arc::new(MemoryPresence::neu());
        let gateway = Arc::new(ChannelGateway::neu(
            &optionen,
            Arc::new(transport.clone()),
            auth,
            presence,
        ));

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

        let listener = TcpListener::bind(self.config.tcp_bind_adresse()).await?;
        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %listener.local_addr()?,
            hooks_aktiv = optionen.hook_endpoint.is_some(),
            "TCP-Listener gestartet"
        );

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            // Client-Limit pruefen
                            if transport.socket_anzahl() >= self.config.server.max_clients as usize {
                                tracing::warn!(
                                    peer = %peer_addr,
                                    max = self.config.server.max_clients,
                                    "Server voll – Verbindung abgelehnt"
                                );
                                drop(stream);
                                continue;
                            }

                            let verbindung = ClientConnection::neu(
                                Arc::clone(&gateway),
                                transport.clone(),
                                peer_addr,
                            );
                            let shutdown_rx_clone = shutdown_rx.clone();
                            tokio::spawn(async move {
                                verbindung.verarbeiten(stream, shutdown_rx_clone).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
                    let _ = shutdown_tx.send(true);
                    break;
                }
            }
        }

        Ok(())
    }
}
