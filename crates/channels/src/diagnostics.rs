//! Dev-Modus-Diagnose
//!
//! Im Dev-Modus meldet das Gateway Beitritte, Austritte und abgelehnte
//! Autorisierungen ueber tracing. Ausserhalb des Dev-Modus ist die Senke
//! stumm – der normale Betrieb erzeugt hier keine Log-Zeilen.

use funkhaus_protocol::SocketId;

/// Bedingte Diagnose-Senke des Gateways
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics {
    aktiv: bool,
}

impl Diagnostics {
    /// Erstellt die Senke; `aktiv` entspricht dem Dev-Modus
    pub fn neu(aktiv: bool) -> Self {
        Self { aktiv }
    }

    /// Gibt `true` zurueck wenn die Senke aktiv ist
    pub fn ist_aktiv(&self) -> bool {
        self.aktiv
    }

    /// Meldet die Betriebsbereitschaft des Gateways
    pub fn bereit(&self) {
        if self.aktiv {
            tracing::info!("Kanaele sind bereit");
        }
    }

    /// Meldet einen erfolgreichen Kanal-Beitritt
    pub fn beitritt(&self, socket: &SocketId, kanal: &str) {
        if self.aktiv {
            tracing::info!(socket = %socket, kanal = %kanal, "Kanal beigetreten");
        }
    }

    /// Meldet einen Kanal-Austritt samt Grund
    pub fn austritt(&self, socket: &SocketId, kanal: &str, grund: &str) {
        if self.aktiv {
            tracing::info!(socket = %socket, kanal = %kanal, grund = %grund, "Kanal verlassen");
        }
    }

    /// Meldet eine abgelehnte Autorisierung
    pub fn abgelehnt(&self, socket: &SocketId, kanal: &str, grund: &str) {
        if self.aktiv {
            tracing::error!(socket = %socket, kanal = %kanal, grund = %grund, "Autorisierung abgelehnt");
        }
    }
}
