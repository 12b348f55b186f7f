//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen und ist danach
//! unveraenderlich. Alle Felder haben sinnvolle Standardwerte, sodass der
//! Server ohne Konfigurationsdatei lauffaehig ist.

use funkhaus_channels::GatewayOptions;
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Kanal-Klassifizierung
    pub kanaele: KanalEinstellungen,
    /// Auth-Endpoint der Empfaenger-Anwendung
    pub auth: AuthEinstellungen,
    /// Webhook-Versand (optional)
    pub hooks: HookEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Aktiviert die Dev-Modus-Diagnose des Gateways
    pub dev_mode: bool,
    /// Maximale Anzahl gleichzeitiger Clients
    pub max_clients: u32,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Funkhaus Server".into(),
            dev_mode: false,
            max_clients: 512,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer den TCP-Listener
    pub bind_adresse: String,
    /// Port fuer den TCP-Listener
    pub tcp_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            tcp_port: 6001,
        }
    }
}

/// Kanal-Klassifizierung
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KanalEinstellungen {
    /// Muster fuer autorisierungspflichtige Kanaele
    pub private_muster: Vec<String>,
    /// Muster fuer weiterleitbare Client-Events
    pub client_event_muster: Vec<String>,
}

impl Default for KanalEinstellungen {
    fn default() -> Self {
        Self {
            private_muster: vec!["private-*".into(), "presence-*".into()],
            client_event_muster: vec!["client-*".into()],
        }
    }
}

/// Auth-Endpoint der Empfaenger-Anwendung
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// Basis-URL der Empfaenger-Anwendung
    pub host: String,
    /// Pfad des Auth-Endpoints
    pub endpoint: String,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:8000".into(),
            endpoint: "/broadcasting/auth".into(),
        }
    }
}

/// Webhook-Versand
///
/// Ohne `endpoint` ist der Versand vollstaendig deaktiviert. Ohne `host`
/// wird die Basis-URL des Auth-Endpoints verwendet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HookEinstellungen {
    /// Basis-URL fuer Hook-Aufrufe (leer = auth.host verwenden)
    pub host: Option<String>,
    /// Pfad des Hook-Endpoints (leer = Hooks deaktiviert)
    pub endpoint: Option<String>,
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Gibt die vollstaendige Bind-Adresse fuer TCP zurueck
    pub fn tcp_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.tcp_port)
    }

    /// Leitet die unveraenderlichen Gateway-Optionen ab
    pub fn gateway_optionen(&self) -> GatewayOptions {
        GatewayOptions {
            dev_mode: self.server.dev_mode,
            hook_endpoint: self.hooks.endpoint.clone(),
            hook_host: self.hooks.host.clone(),
            auth_host: self.auth.host.clone(),
            auth_endpoint: self.auth.endpoint.clone(),
            private_muster: self.kanaele.private_muster.clone(),
            client_event_muster: self.kanaele.client_event_muster.clone(),
        }
    }
}
