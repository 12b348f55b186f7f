//! Gemeinsame Identifikationstypen fuer Funkhaus
//!
//! Sockets verwenden das Newtype-Pattern um Verwechslungen mit anderen
//! UUID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Socket-ID einer verbundenen Client-Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketId(pub Uuid);

impl SocketId {
    /// Erstellt eine neue zufaellige SocketId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for SocketId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SocketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "socket:{}", self.0)
    }
}

/// Sicht des Gateways auf eine verbundene Client-Verbindung
///
/// Neben der stabilen ID traegt der Socket den Session-Cookie aus dem
/// urspruenglichen Handshake. Der Cookie wird bei Auth- und Hook-Anfragen
/// an die Empfaenger-Anwendung weitergereicht.
#[derive(Debug, Clone)]
pub struct Socket {
    /// Stabile Identitaet der Verbindung
    pub id: SocketId,
    /// Session-Cookie aus dem Handshake (falls vorhanden)
    pub cookie: Option<String>,
}

impl Socket {
    /// Erstellt einen Socket ohne Handshake-Kontext
    pub fn neu(id: SocketId) -> Self {
        Self { id, cookie: None }
    }

    /// Erstellt einen Socket mit Session-Cookie
    pub fn mit_cookie(id: SocketId, cookie: impl Into<String>) -> Self {
        Self {
            id,
            cookie: Some(cookie.into()),
        }
    }
}
