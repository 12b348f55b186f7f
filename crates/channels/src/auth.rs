//! Kanal-Autorisierung
//!
//! Private und presence-Kanaele duerfen erst nach erfolgreicher
//! Autorisierung betreten werden. Der `AuthDelegate` entscheidet asynchron
//! und liefert entweder die Kanal-Daten der Anwendung oder eine typisierte
//! Ablehnung mit Status und Begruendung.
//!
//! `HttpAuthenticator` delegiert die Entscheidung per HTTP-POST an die
//! Empfaenger-Anwendung: Status 200 gewaehrt den Beitritt, jeder andere
//! Status lehnt ihn ab.

use async_trait::async_trait;
use funkhaus_protocol::{JoinRequest, Socket};
use serde::Deserialize;
use thiserror::Error;

/// Erfolgreiche Autorisierung
#[derive(Debug, Clone, Default)]
pub struct AuthGranted {
    /// Kanal-Daten der Anwendung, haeufig ein JSON-kodierter
    /// Mitglieds-Deskriptor fuer Presence-Kanaele
    pub channel_data: Option<String>,
}

/// Abgelehnte Autorisierung
///
/// Der Status geht als `subscription_error` an den anfragenden Socket,
/// die Begruendung bleibt serverseitig (Diagnose).
#[derive(Debug, Clone, Error)]
#[error("Autorisierung abgelehnt (Status {status}): {reason}")]
pub struct AuthRejection {
    pub status: u16,
    pub reason: String,
}

/// Ergebnis einer Autorisierungs-Anfrage
pub type AuthResult = Result<AuthGranted, AuthRejection>;

/// Delegate fuer die Kanal-Autorisierung
#[async_trait]
pub trait AuthDelegate: Send + Sync + 'static {
    /// Autorisiert einen Kanal-Beitritt fuer den gegebenen Socket
    async fn autorisieren(&self, socket: &Socket, anfrage: &JoinRequest) -> AuthResult;
}

// ---------------------------------------------------------------------------
// HttpAuthenticator
// ---------------------------------------------------------------------------

/// Antwort-Schema des Auth-Endpoints
#[derive(Debug, Default, Deserialize)]
struct AuthAntwort {
    #[serde(default)]
    channel_data: Option<String>,
}

/// Autorisierung ueber den HTTP-Endpoint der Empfaenger-Anwendung
///
/// Der POST traegt den Kanalnamen als Formular-Feld sowie die vom Client
/// mitgelieferten Auth-Header, den weitergereichten Session-Cookie und
/// den XHR-Marker.
pub struct HttpAuthenticator {
    http: reqwest::Client,
    ziel: String,
}

impl HttpAuthenticator {
    /// Erstellt einen Authenticator fuer `host + endpoint`
    pub fn neu(host: &str, endpoint: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            ziel: format!("{host}{endpoint}"),
        }
    }
}

#[async_trait]
impl AuthDelegate for HttpAuthenticator {
    async fn autorisieren(&self, socket: &Socket, anfrage: &JoinRequest) -> AuthResult {
        let mut request = self
            .http
            .post(&self.ziel)
            .form(&[("channel_name", anfrage.channel.as_str())]);

        if let Some(auth) = &anfrage.auth {
            for (name, wert) in &auth.headers {
                request = request.header(name.as_str(), wert.as_str());
            }
        }
        if let Some(cookie) = &socket.cookie {
            request = request.header("Cookie", cookie.as_str());
        }
        request = request.header("X-Requested-With", "XMLHttpRequest");

        let antwort = request.send().await.map_err(|e| AuthRejection {
            status: 500,
            reason: format!("Auth-Anfrage fehlgeschlagen: {e}"),
        })?;

        let status = antwort.status().as_u16();
        if status != 200 {
            let body = antwort.text().await.unwrap_or_default();
            return Err(AuthRejection {
                status,
                reason: body,
            });
        }

        // Ein unlesbarer Body ist KEIN Autorisierungsfehler – der Beitritt
        // ist gewaehrt, nur ohne Kanal-Daten
        let daten: AuthAntwort = antwort.json().await.unwrap_or_default();
        Ok(AuthGranted {
            channel_data: daten.channel_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ziel_wird_aus_host_und_endpoint_gebaut() {
        let auth = HttpAuthenticator::neu("http://127.0.0.1:8000", "/broadcasting/auth");
        assert_eq!(auth.ziel, "http://127.0.0.1:8000/broadcasting/auth");
    }

    #[test]
    fn ablehnung_anzeige() {
        let ablehnung = AuthRejection {
            status: 403,
            reason: "bad signature".into(),
        };
        assert_eq!(
            ablehnung.to_string(),
            "Autorisierung abgelehnt (Status 403): bad signature"
        );
    }

    #[test]
    fn auth_antwort_ohne_channel_data() {
        let antwort: AuthAntwort = serde_json::from_str("{}").unwrap();
        assert!(antwort.channel_data.is_none());

        let antwort: AuthAntwort =
            serde_json::from_str(r#"{"channel_data":"{\"id\":1}"}"#).unwrap();
        assert_eq!(antwort.channel_data.as_deref(), Some(r#"{"id":1}"#));
    }
}
