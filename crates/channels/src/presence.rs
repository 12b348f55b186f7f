//! Presence-Verwaltung – Wer ist auf welchem Presence-Kanal
//!
//! Das Gateway ruft den `PresenceDelegate` ausschliesslich fuer
//! presence-klassifizierte Kanaele auf: Registrierung nur nach einem
//! erfolgreich autorisierten Beitritt, Deregistrierung bei jedem
//! Verlassen. Die Mitglieds-Deskriptoren stammen aus den `channel_data`
//! der Autorisierung und sind fuer das Gateway opak.

use async_trait::async_trait;
use dashmap::DashMap;
use funkhaus_protocol::SocketId;
use serde_json::Value;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// PresenceDelegate-Trait
// ---------------------------------------------------------------------------

/// Delegate fuer die Presence-Registrierung
#[async_trait]
pub trait PresenceDelegate: Send + Sync + 'static {
    /// Registriert ein Mitglied auf einem Presence-Kanal
    async fn beitreten(&self, socket: &SocketId, kanal: &str, mitglied: Value);

    /// Entfernt einen Socket von einem Presence-Kanal
    async fn verlassen(&self, socket: &SocketId, kanal: &str);
}

// ---------------------------------------------------------------------------
// MemoryPresence
// ---------------------------------------------------------------------------

/// Eintrag eines Mitglieds auf einem Presence-Kanal
#[derive(Debug, Clone)]
pub struct PresenceMitglied {
    pub socket: SocketId,
    pub daten: Value,
}

/// In-Memory Presence-Verwaltung fuer einen einzelnen Server-Prozess
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct MemoryPresence {
    kanaele: Arc<DashMap<String, Vec<PresenceMitglied>>>,
}

impl MemoryPresence {
    /// Erstellt eine neue MemoryPresence
    pub fn neu() -> Self {
        Self::default()
    }

    /// Gibt die Mitglieds-Deskriptoren eines Kanals zurueck
    pub fn mitglieder(&self, kanal: &str) -> Vec<Value> {
        self.kanaele
            .get(kanal)
            .map(|eintraege| eintraege.iter().map(|m| m.daten.clone()).collect())
            .unwrap_or_default()
    }

    /// Gibt die Anzahl der Mitglieder eines Kanals zurueck
    pub fn anzahl(&self, kanal: &str) -> usize {
        self.kanaele.get(kanal).map(|e| e.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PresenceDelegate for MemoryPresence {
    async fn beitreten(&self, socket: &SocketId, kanal: &str, mitglied: Value) {
        let mut eintraege = self.kanaele.entry(kanal.to_string()).or_default();
        // Wiederholter Beitritt ersetzt den bestehenden Eintrag
        eintraege.retain(|m| m.socket != *socket);
        eintraege.push(PresenceMitglied {
            socket: *socket,
            daten: mitglied,
        });
        tracing::debug!(socket = %socket, kanal = %kanal, "Presence-Mitglied registriert");
    }

    async fn verlassen(&self, socket: &SocketId, kanal: &str) {
        if let Some(mut eintraege) = self.kanaele.get_mut(kanal) {
            eintraege.retain(|m| m.socket != *socket);
            let ist_leer = eintraege.is_empty();
            drop(eintraege);
            if ist_leer {
                self.kanaele.remove(kanal);
            }
        }
        tracing::debug!(socket = %socket, kanal = %kanal, "Presence-Mitglied entfernt");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn beitreten_und_verlassen() {
        let presence = MemoryPresence::neu();
        let socket = SocketId::new();

        presence
            .beitreten(&socket, "presence-lobby", json!({"id": 1}))
            .await;
        assert_eq!(presence.anzahl("presence-lobby"), 1);
        assert_eq!(presence.mitglieder("presence-lobby")[0]["id"], 1);

        presence.verlassen(&socket, "presence-lobby").await;
        assert_eq!(presence.anzahl("presence-lobby"), 0);
    }

    #[tokio::test]
    async fn wiederholter_beitritt_ersetzt_eintrag() {
        let presence = MemoryPresence::neu();
        let socket = SocketId::new();

        presence
            .beitreten(&socket, "presence-lobby", json!({"id": 1}))
            .await;
        presence
            .beitreten(&socket, "presence-lobby", json!({"id": 1, "name": "a"}))
            .await;

        let mitglieder = presence.mitglieder("presence-lobby");
        assert_eq!(mitglieder.len(), 1);
        assert_eq!(mitglieder[0]["name"], "a");
    }

    #[tokio::test]
    async fn mehrere_mitglieder_auf_einem_kanal() {
        let presence = MemoryPresence::neu();

        for i in 0..3 {
            presence
                .beitreten(&SocketId::new(), "presence-lobby", json!({"id": i}))
                .await;
        }
        assert_eq!(presence.anzahl("presence-lobby"), 3);
    }

    #[tokio::test]
    async fn verlassen_unbekannter_kanal_ist_noop() {
        let presence = MemoryPresence::neu();
        presence.verlassen(&SocketId::new(), "presence-nirgendwo").await;
        assert_eq!(presence.anzahl("presence-nirgendwo"), 0);
    }

    #[tokio::test]
    async fn clone_teilt_inneren_zustand() {
        let p1 = MemoryPresence::neu();
        let p2 = p1.clone();
        let socket = SocketId::new();

        p1.beitreten(&socket, "presence-lobby", Value::Null).await;
        assert_eq!(p2.anzahl("presence-lobby"), 1);
    }
}
