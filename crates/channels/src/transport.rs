//! Raum-Transport – Mitgliedschaft und Zustellung
//!
//! Der `RoomTransport`-Trait beschreibt die Transportschicht aus Sicht des
//! Gateways: Raeume betreten und verlassen, Mitgliedschaft abfragen und
//! Nachrichten zustellen. Das Gateway haelt keine eigene Kopie der
//! Mitgliedschaft – der Transport ist die einzige Quelle dieser Wahrheit.
//!
//! `MemoryTransport` ist die mitgelieferte In-Memory-Implementierung:
//! eine Send-Queue pro Socket, Raum-Mitgliedschaft in DashMaps.

use dashmap::DashMap;
use funkhaus_protocol::{ServerMessage, SocketId};
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// RoomTransport-Trait
// ---------------------------------------------------------------------------

/// Transportschicht aus Sicht des Gateways
pub trait RoomTransport: Send + Sync + 'static {
    /// Fuegt einen Socket dem Raum eines Kanals hinzu
    fn raum_beitreten(&self, socket: &SocketId, kanal: &str);

    /// Entfernt einen Socket aus dem Raum eines Kanals
    fn raum_verlassen(&self, socket: &SocketId, kanal: &str);

    /// Prueft ob ein Socket aktuell Mitglied des Raums ist
    fn ist_mitglied(&self, socket: &SocketId, kanal: &str) -> bool;

    /// Gibt alle Kanaele zurueck in deren Raum der Socket Mitglied ist
    fn raeume_von(&self, socket: &SocketId) -> Vec<String>;

    /// Sendet an alle Raum-Mitglieder ausser dem Absender
    ///
    /// Gibt die Anzahl der erfolgreichen Zustellungen zurueck.
    fn an_raum_senden(&self, kanal: &str, absender: &SocketId, nachricht: ServerMessage) -> usize;

    /// Sendet an einen einzelnen Socket
    ///
    /// Gibt `true` zurueck wenn der Socket gefunden und die Nachricht
    /// eingereiht wurde.
    fn an_socket_senden(&self, socket: &SocketId, nachricht: ServerMessage) -> bool;
}

// ---------------------------------------------------------------------------
// MemoryTransport
// ---------------------------------------------------------------------------

/// Groesse der Send-Queue pro Socket
const SEND_QUEUE_GROESSE: usize = 64;

/// Handle auf die Send-Queue eines verbundenen Sockets
#[derive(Clone, Debug)]
struct SocketSender {
    socket: SocketId,
    tx: mpsc::Sender<ServerMessage>,
}

impl SocketSender {
    /// Sendet eine Nachricht nicht-blockierend an den Socket
    ///
    /// Gibt `false` zurueck wenn die Queue voll oder geschlossen ist.
    fn senden(&self, nachricht: ServerMessage) -> bool {
        match self.tx.try_send(nachricht) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(socket = %self.socket, "Send-Queue voll – Nachricht verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(socket = %self.socket, "Send-Queue geschlossen (Socket getrennt)");
                false
            }
        }
    }
}

/// In-Memory-Transport fuer einen einzelnen Server-Prozess
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct MemoryTransport {
    inner: Arc<MemoryTransportInner>,
}

struct MemoryTransportInner {
    /// Socket-Sender, indiziert nach SocketId
    sockets: DashMap<SocketId, SocketSender>,
    /// Raum-Mitgliedschaft: Kanalname -> Vec<SocketId>
    raeume: DashMap<String, Vec<SocketId>>,
}

impl MemoryTransport {
    /// Erstellt einen neuen MemoryTransport
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(MemoryTransportInner {
                sockets: DashMap::new(),
                raeume: DashMap::new(),
            }),
        }
    }

    /// Registriert einen neuen Socket und gibt seine Empfangs-Queue zurueck
    ///
    /// Die Verbindungs-Task liest aus dieser Queue und schreibt auf den
    /// Draht.
    pub fn registrieren(&self, socket: SocketId) -> mpsc::Receiver<ServerMessage> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        self.inner.sockets.insert(socket, SocketSender { socket, tx });
        tracing::debug!(socket = %socket, "Socket im Transport registriert");
        rx
    }

    /// Entfernt einen Socket aus dem Transport und allen Raeumen
    pub fn entfernen(&self, socket: &SocketId) {
        self.inner.sockets.remove(socket);
        self.inner.raeume.iter_mut().for_each(|mut eintrag| {
            eintrag.value_mut().retain(|id| id != socket);
        });
        self.inner.raeume.retain(|_, mitglieder| !mitglieder.is_empty());
        tracing::debug!(socket = %socket, "Socket aus Transport entfernt");
    }

    /// Gibt die Anzahl der registrierten Sockets zurueck
    pub fn socket_anzahl(&self) -> usize {
        self.inner.sockets.len()
    }

    /// Gibt alle SocketIds in einem Raum zurueck
    pub fn mitglieder_von(&self, kanal: &str) -> Vec<SocketId> {
        self.inner
            .raeume
            .get(kanal)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

impl RoomTransport for MemoryTransport {
    fn raum_beitreten(&self, socket: &SocketId, kanal: &str) {
        let mut mitglieder = self.inner.raeume.entry(kanal.to_string()).or_default();
        if !mitglieder.contains(socket) {
            mitglieder.push(*socket);
        }
    }

    fn raum_verlassen(&self, socket: &SocketId, kanal: &str) {
        if let Some(mut mitglieder) = self.inner.raeume.get_mut(kanal) {
            mitglieder.retain(|id| id != socket);
            let ist_leer = mitglieder.is_empty();
            drop(mitglieder);
            if ist_leer {
                self.inner.raeume.remove(kanal);
            }
        }
    }

    fn ist_mitglied(&self, socket: &SocketId, kanal: &str) -> bool {
        self.inner
            .raeume
            .get(kanal)
            .map(|mitglieder| mitglieder.contains(socket))
            .unwrap_or(false)
    }

    fn raeume_von(&self, socket: &SocketId) -> Vec<String> {
        self.inner
            .raeume
            .iter()
            .filter(|eintrag| eintrag.value().contains(socket))
            .map(|eintrag| eintrag.key().clone())
            .collect()
    }

    fn an_raum_senden(&self, kanal: &str, absender: &SocketId, nachricht: ServerMessage) -> usize {
        let mitglieder = match self.inner.raeume.get(kanal) {
            Some(ids) => ids.clone(),
            None => return 0,
        };

        let mut gesendet = 0;
        for socket in &mitglieder {
            if socket == absender {
                continue;
            }
            if let Some(sender) = self.inner.sockets.get(socket) {
                if sender.senden(nachricht.clone()) {
                    gesendet += 1;
                }
            }
        }
        gesendet
    }

    fn an_socket_senden(&self, socket: &SocketId, nachricht: ServerMessage) -> bool {
        match self.inner.sockets.get(socket) {
            Some(sender) => sender.senden(nachricht),
            None => {
                tracing::debug!(socket = %socket, "Senden an unbekannten Socket");
                false
            }
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_nachricht(kanal: &str) -> ServerMessage {
        ServerMessage::Event {
            event: "client-test".into(),
            channel: kanal.into(),
            data: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn registrieren_und_senden() {
        let transport = MemoryTransport::neu();
        let socket = SocketId::new();

        let mut rx = transport.registrieren(socket);
        assert_eq!(transport.socket_anzahl(), 1);

        assert!(transport.an_socket_senden(&socket, test_nachricht("a")));
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn an_raum_senden_schliesst_absender_aus() {
        let transport = MemoryTransport::neu();
        let absender = SocketId::new();
        let anderer = SocketId::new();

        let mut rx_absender = transport.registrieren(absender);
        let mut rx_anderer = transport.registrieren(anderer);

        transport.raum_beitreten(&absender, "private-a");
        transport.raum_beitreten(&anderer, "private-a");

        let gesendet = transport.an_raum_senden("private-a", &absender, test_nachricht("private-a"));
        assert_eq!(gesendet, 1);
        assert!(rx_absender.try_recv().is_err(), "Absender darf nichts empfangen");
        assert!(rx_anderer.try_recv().is_ok());
    }

    #[test]
    fn mitgliedschaft_und_raeume() {
        let transport = MemoryTransport::neu();
        let socket = SocketId::new();

        transport.raum_beitreten(&socket, "news");
        transport.raum_beitreten(&socket, "private-a");
        assert!(transport.ist_mitglied(&socket, "news"));
        assert!(!transport.ist_mitglied(&socket, "private-b"));

        let mut raeume = transport.raeume_von(&socket);
        raeume.sort();
        assert_eq!(raeume, vec!["news".to_string(), "private-a".to_string()]);
    }

    #[test]
    fn doppelter_beitritt_ist_idempotent() {
        let transport = MemoryTransport::neu();
        let socket = SocketId::new();

        transport.raum_beitreten(&socket, "news");
        transport.raum_beitreten(&socket, "news");
        assert_eq!(transport.mitglieder_von("news").len(), 1);
    }

    #[test]
    fn verlassen_bereinigt_leere_raeume() {
        let transport = MemoryTransport::neu();
        let socket = SocketId::new();

        transport.raum_beitreten(&socket, "news");
        transport.raum_verlassen(&socket, "news");
        assert!(!transport.ist_mitglied(&socket, "news"));
        assert!(transport.raeume_von(&socket).is_empty());
    }

    #[tokio::test]
    async fn entfernen_bereinigt_raum_mitgliedschaft() {
        let transport = MemoryTransport::neu();
        let socket = SocketId::new();

        let _rx = transport.registrieren(socket);
        transport.raum_beitreten(&socket, "private-a");
        assert_eq!(transport.mitglieder_von("private-a").len(), 1);

        transport.entfernen(&socket);
        assert_eq!(transport.socket_anzahl(), 0);
        assert!(transport.mitglieder_von("private-a").is_empty());
    }

    #[test]
    fn senden_an_unbekannten_socket() {
        let transport = MemoryTransport::neu();
        assert!(!transport.an_socket_senden(&SocketId::new(), test_nachricht("a")));
    }

    #[test]
    fn clone_teilt_inneren_zustand() {
        let t1 = MemoryTransport::neu();
        let t2 = t1.clone();
        let socket = SocketId::new();

        t1.raum_beitreten(&socket, "news");
        assert!(t2.ist_mitglied(&socket, "news"));
    }
}
