//! Wire-Nachrichten zwischen Client und Server
//!
//! ## Design
//! - JSON-Serialisierung via serde, eine Nachricht pro Zeile
//! - Tagged Enums fuer typsichere Nachrichtentypen
//! - Eingehende Anfragen deserialisieren auch unvollstaendig: fehlende
//!   Felder werden zu leeren Werten, das Gateway verwirft sie still.
//!   Fehlerhafte Anfragen duerfen niemals als Protokollfehler eskalieren.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Auth-Beilage
// ---------------------------------------------------------------------------

/// Vom Client mitgelieferte Autorisierungsdaten
///
/// Die Header werden unveraendert an den Auth-Endpoint bzw. an Hook-Aufrufe
/// weitergereicht. Der Server interpretiert sie nicht.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Weiterzureichende HTTP-Header (Name -> Wert)
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Eingehende Nachrichten
// ---------------------------------------------------------------------------

/// Kanal abonnieren
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Name des Kanals (leer = Anfrage wird verworfen)
    #[serde(default)]
    pub channel: String,
    /// Optionale Autorisierungsdaten
    #[serde(default)]
    pub auth: Option<AuthPayload>,
}

/// Kanal verlassen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Name des Kanals (leer = Anfrage wird verworfen)
    #[serde(default)]
    pub channel: String,
    /// Optionale Autorisierungsdaten
    #[serde(default)]
    pub auth: Option<AuthPayload>,
}

/// Client-Event zum Weiterleiten an andere Kanal-Mitglieder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientEventRequest {
    /// Event-Name (leer = Anfrage wird verworfen)
    #[serde(default)]
    pub event: String,
    /// Name des Kanals (leer = Anfrage wird verworfen)
    #[serde(default)]
    pub channel: String,
    /// Optionale Autorisierungsdaten
    #[serde(default)]
    pub auth: Option<AuthPayload>,
    /// Beliebige Event-Nutzdaten
    #[serde(default)]
    pub data: Value,
}

/// Alle Nachrichten die ein Client senden kann
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Erste Nachricht einer Verbindung: weiterzureichende Header
    /// (insbesondere der Session-Cookie)
    Handshake {
        #[serde(default)]
        headers: HashMap<String, String>,
    },
    /// Kanal abonnieren
    Subscribe(JoinRequest),
    /// Kanal verlassen
    Unsubscribe(LeaveRequest),
    /// Client-Event weiterleiten
    ClientEvent(ClientEventRequest),
}

// ---------------------------------------------------------------------------
// Ausgehende Nachrichten
// ---------------------------------------------------------------------------

/// Alle Nachrichten die der Server an Clients sendet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Autorisierung fuer einen Kanal wurde abgelehnt
    ///
    /// Geht ausschliesslich an den anfragenden Socket, genau einmal pro
    /// fehlgeschlagenem Versuch.
    SubscriptionError { channel: String, status: u16 },
    /// Weitergeleitetes Client-Event
    Event {
        event: String,
        channel: String,
        data: Value,
    },
}
