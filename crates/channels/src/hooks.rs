//! Webhook-Benachrichtigungen (fire-and-forget)
//!
//! Der `HookNotifier` meldet Lifecycle-Uebergaenge (join, leave,
//! client_event) per HTTP-POST an einen konfigurierten Empfaenger. Hooks
//! sind rein beobachtend: sie laufen als eigenstaendige tokio-Tasks,
//! werden nie wiederholt und aendern niemals den Ausgang der ausloesenden
//! Aktion. Saemtliche Ausgaenge – Netzwerkfehler, Fehlerstatus, Erfolg –
//! enden in einem Log-Aufruf.

use funkhaus_protocol::{AuthPayload, Socket};
use serde_json::Value;

use crate::gateway::GatewayOptions;

// ---------------------------------------------------------------------------
// Hook-Ereignisse
// ---------------------------------------------------------------------------

/// Art des Lifecycle-Ereignisses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Join,
    Leave,
    ClientEvent,
}

impl HookKind {
    /// Wire-Name des Ereignisses im Hook-Formular
    pub fn als_str(self) -> &'static str {
        match self {
            HookKind::Join => "join",
            HookKind::Leave => "leave",
            HookKind::ClientEvent => "client_event",
        }
    }
}

/// Ein Lifecycle-Ereignis fuer den Hook-Empfaenger
#[derive(Debug, Clone)]
pub struct HookEvent {
    pub kind: HookKind,
    pub channel: String,
    /// Nutzdaten (nur bei client_event gesetzt)
    pub payload: Option<Value>,
}

impl HookEvent {
    /// Ereignis fuer einen Kanal-Beitritt
    pub fn join(kanal: impl Into<String>) -> Self {
        Self {
            kind: HookKind::Join,
            channel: kanal.into(),
            payload: None,
        }
    }

    /// Ereignis fuer einen Kanal-Austritt
    pub fn leave(kanal: impl Into<String>) -> Self {
        Self {
            kind: HookKind::Leave,
            channel: kanal.into(),
            payload: None,
        }
    }

    /// Ereignis fuer ein weitergeleitetes Client-Event
    pub fn client_event(kanal: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: HookKind::ClientEvent,
            channel: kanal.into(),
            payload: Some(payload),
        }
    }
}

// ---------------------------------------------------------------------------
// HookNotifier
// ---------------------------------------------------------------------------

/// Fire-and-forget Hook-Versand
///
/// Ohne konfigurierten `hook_endpoint` ist der Notifier vollstaendig
/// deaktiviert und `melden` ein No-op.
#[derive(Clone)]
pub struct HookNotifier {
    http: reqwest::Client,
    ziel: Option<String>,
}

impl HookNotifier {
    /// Erstellt den Notifier aus den Gateway-Optionen
    pub fn aus_optionen(optionen: &GatewayOptions) -> Self {
        Self {
            http: reqwest::Client::new(),
            ziel: hook_ziel(optionen),
        }
    }

    /// Gibt `true` zurueck wenn Hooks konfiguriert sind
    pub fn aktiv(&self) -> bool {
        self.ziel.is_some()
    }

    /// Meldet ein Lifecycle-Ereignis an den Hook-Empfaenger
    ///
    /// Kehrt sofort zurueck; der HTTP-POST laeuft als eigener Task. Der
    /// Task muss tolerieren dass der ausloesende Socket inzwischen
    /// getrennt wurde – jedes Ergebnis endet in einem Log-Aufruf.
    pub fn melden(&self, socket: &Socket, auth: Option<&AuthPayload>, ereignis: HookEvent) {
        let Some(ziel) = self.ziel.clone() else {
            return;
        };

        let formular = hook_formular(&ereignis);
        let headers = hook_headers(socket, auth);
        let http = self.http.clone();
        let socket_id = socket.id;
        let ereignis_name = ereignis.kind.als_str();
        let kanal = ereignis.channel;

        tokio::spawn(async move {
            let mut request = http.post(&ziel).form(&formular);
            for (name, wert) in &headers {
                request = request.header(name.as_str(), wert.as_str());
            }

            match request.send().await {
                Err(e) => {
                    tracing::error!(
                        socket = %socket_id,
                        kanal = %kanal,
                        ereignis = ereignis_name,
                        fehler = %e,
                        "Hook-Aufruf fehlgeschlagen"
                    );
                }
                Ok(antwort) => {
                    let status = antwort.status().as_u16();
                    let body = antwort.text().await.unwrap_or_default();
                    if status != 200 {
                        tracing::warn!(
                            socket = %socket_id,
                            kanal = %kanal,
                            ereignis = ereignis_name,
                            status,
                            body = %body,
                            "Hook-Aufruf mit Fehlerstatus beantwortet"
                        );
                    } else {
                        tracing::debug!(
                            socket = %socket_id,
                            kanal = %kanal,
                            ereignis = ereignis_name,
                            body = %body,
                            "Hook-Aufruf zugestellt"
                        );
                    }
                }
            }
        });
    }
}

/// Baut die Ziel-URL: `hook_host` faellt auf `auth_host` zurueck
fn hook_ziel(optionen: &GatewayOptions) -> Option<String> {
    let endpoint = optionen.hook_endpoint.as_deref()?;
    if endpoint.is_empty() {
        return None;
    }

    let host = optionen.hook_host.as_deref().unwrap_or(&optionen.auth_host);
    if host.is_empty() {
        tracing::warn!(
            "Hook-Endpoint konfiguriert, aber weder hook_host noch auth_host gesetzt – Hooks deaktiviert"
        );
        return None;
    }

    Some(format!("{host}{endpoint}"))
}

/// Formular-Felder des Hook-POST: event, channel, payload
fn hook_formular(ereignis: &HookEvent) -> Vec<(&'static str, String)> {
    let mut formular = vec![
        ("event", ereignis.kind.als_str().to_string()),
        ("channel", ereignis.channel.clone()),
    ];
    if let Some(payload) = &ereignis.payload {
        formular.push(("payload", payload.to_string()));
    }
    formular
}

/// Header des Hook-POST
///
/// Die vom Client mitgelieferten Auth-Header, dann die beiden erzwungenen
/// Header: weitergereichter Session-Cookie und XHR-Marker. Die erzwungenen
/// Header gewinnen gegen gleichnamige Auth-Header.
fn hook_headers(socket: &Socket, auth: Option<&AuthPayload>) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = auth
        .map(|a| {
            a.headers
                .iter()
                .map(|(name, wert)| (name.clone(), wert.clone()))
                .collect()
        })
        .unwrap_or_default();

    headers.retain(|(name, _)| {
        !name.eq_ignore_ascii_case("cookie") && !name.eq_ignore_ascii_case("x-requested-with")
    });

    if let Some(cookie) = &socket.cookie {
        headers.push(("Cookie".to_string(), cookie.clone()));
    }
    headers.push(("X-Requested-With".to_string(), "XMLHttpRequest".to_string()));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use funkhaus_protocol::SocketId;
    use serde_json::json;
    use std::collections::HashMap;

    fn optionen_mit_hooks() -> GatewayOptions {
        GatewayOptions {
            hook_endpoint: Some("/hooks/broadcast".into()),
            hook_host: Some("http://hooks.intern:9000".into()),
            auth_host: "http://app.intern:8000".into(),
            ..GatewayOptions::default()
        }
    }

    #[test]
    fn ohne_endpoint_deaktiviert() {
        let notifier = HookNotifier::aus_optionen(&GatewayOptions::default());
        assert!(!notifier.aktiv());

        // melden ist ein stilles No-op
        let socket = Socket::neu(SocketId::new());
        notifier.melden(&socket, None, HookEvent::join("news"));
    }

    #[test]
    fn ziel_mit_hook_host() {
        assert_eq!(
            hook_ziel(&optionen_mit_hooks()).as_deref(),
            Some("http://hooks.intern:9000/hooks/broadcast")
        );
    }

    #[test]
    fn ziel_faellt_auf_auth_host_zurueck() {
        let optionen = GatewayOptions {
            hook_host: None,
            ..optionen_mit_hooks()
        };
        assert_eq!(
            hook_ziel(&optionen).as_deref(),
            Some("http://app.intern:8000/hooks/broadcast")
        );
    }

    #[test]
    fn ziel_ohne_jeden_host_deaktiviert() {
        let optionen = GatewayOptions {
            hook_host: None,
            auth_host: String::new(),
            ..optionen_mit_hooks()
        };
        assert!(hook_ziel(&optionen).is_none());
    }

    #[test]
    fn leerer_endpoint_deaktiviert() {
        let optionen = GatewayOptions {
            hook_endpoint: Some(String::new()),
            ..optionen_mit_hooks()
        };
        assert!(hook_ziel(&optionen).is_none());
    }

    #[test]
    fn formular_mit_und_ohne_payload() {
        let ohne = hook_formular(&HookEvent::leave("private-a"));
        assert_eq!(ohne.len(), 2);
        assert!(ohne.contains(&("event", "leave".to_string())));
        assert!(ohne.contains(&("channel", "private-a".to_string())));

        let mit = hook_formular(&HookEvent::client_event("private-a", json!({"x": 1})));
        assert!(mit.contains(&("event", "client_event".to_string())));
        assert!(mit.contains(&("payload", r#"{"x":1}"#.to_string())));
    }

    #[test]
    fn erzwungene_header_gewinnen() {
        let socket = Socket::mit_cookie(SocketId::new(), "session=echt");
        let mut client_header = HashMap::new();
        client_header.insert("Cookie".to_string(), "session=gefaelscht".to_string());
        client_header.insert("Authorization".to_string(), "Bearer x".to_string());
        let auth = AuthPayload {
            headers: client_header,
        };

        let headers = hook_headers(&socket, Some(&auth));
        let cookies: Vec<_> = headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("cookie"))
            .collect();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].1, "session=echt");
        assert!(headers.contains(&("Authorization".to_string(), "Bearer x".to_string())));
        assert!(headers.contains(&(
            "X-Requested-With".to_string(),
            "XMLHttpRequest".to_string()
        )));
    }

    #[test]
    fn header_ohne_cookie_und_auth() {
        let socket = Socket::neu(SocketId::new());
        let headers = hook_headers(&socket, None);
        assert_eq!(
            headers,
            vec![(
                "X-Requested-With".to_string(),
                "XMLHttpRequest".to_string()
            )]
        );
    }

    #[test]
    fn hook_kind_wire_namen() {
        assert_eq!(HookKind::Join.als_str(), "join");
        assert_eq!(HookKind::Leave.als_str(), "leave");
        assert_eq!(HookKind::ClientEvent.als_str(), "client_event");
    }
}
