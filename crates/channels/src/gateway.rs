//! Kanal-Gateway – Orchestrierung von Beitritt, Austritt und Client-Events
//!
//! Das Gateway klassifiziert Kanalnamen, orchestriert die asynchrone
//! Autorisierung, leitet Client-Events an die uebrigen Raum-Mitglieder
//! weiter und meldet Lifecycle-Uebergaenge an den Hook-Empfaenger. Es
//! haelt keinen eigenen Mitgliedschafts-Zustand – Raum-Mitgliedschaft
//! gehoert dem Transport, Presence dem Presence-Delegate.
//!
//! ## Ordnungsgarantien
//! - Raum-Mitgliedschaft wird strikt VOR dem zugehoerigen Hook veraendert
//! - Client-Events werden strikt VOR dem client_event-Hook verteilt
//! - Hooks verschiedener Aktionen sind unabhaengige Tasks ohne Ordnung
//!
//! ## Fehlerverhalten
//! Unvollstaendige Anfragen (leerer Kanal, leerer Event-Name) sind stille
//! No-ops. Die einzige Fehlermeldung an den Client ist der
//! `subscription_error` nach einer abgelehnten Autorisierung.

use funkhaus_protocol::{AuthPayload, ClientEventRequest, JoinRequest, ServerMessage, Socket};
use serde_json::Value;
use std::sync::Arc;

use crate::auth::AuthDelegate;
use crate::diagnostics::Diagnostics;
use crate::hooks::{HookEvent, HookNotifier};
use crate::matcher::ChannelMatcher;
use crate::presence::PresenceDelegate;
use crate::transport::RoomTransport;

// ---------------------------------------------------------------------------
// GatewayOptions
// ---------------------------------------------------------------------------

/// Konfiguration des Gateways
///
/// Wird einmal beim Start erstellt und ist danach unveraenderlich; alle
/// Komponenten lesen sie nur.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Aktiviert die Dev-Modus-Diagnose
    pub dev_mode: bool,
    /// Pfad des Hook-Endpoints; None deaktiviert Hooks vollstaendig
    pub hook_endpoint: Option<String>,
    /// Basis-URL fuer Hook-Aufrufe; None = `auth_host` verwenden
    pub hook_host: Option<String>,
    /// Basis-URL der Empfaenger-Anwendung (Auth-Endpoint, Hook-Fallback)
    pub auth_host: String,
    /// Pfad des Auth-Endpoints
    pub auth_endpoint: String,
    /// Muster fuer autorisierungspflichtige Kanaele
    pub private_muster: Vec<String>,
    /// Muster fuer weiterleitbare Client-Events
    pub client_event_muster: Vec<String>,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            dev_mode: false,
            hook_endpoint: None,
            hook_host: None,
            auth_host: "http://127.0.0.1:8000".into(),
            auth_endpoint: "/broadcasting/auth".into(),
            private_muster: vec!["private-*".into(), "presence-*".into()],
            client_event_muster: vec!["client-*".into()],
        }
    }
}

// ---------------------------------------------------------------------------
// ChannelGateway
// ---------------------------------------------------------------------------

/// Orchestrator fuer Kanal-Lifecycle und Event-Relay
pub struct ChannelGateway {
    transport: Arc<dyn RoomTransport>,
    auth: Arc<dyn AuthDelegate>,
    presence: Arc<dyn PresenceDelegate>,
    hooks: HookNotifier,
    matcher: ChannelMatcher,
    diagnostik: Diagnostics,
}

impl ChannelGateway {
    /// Erstellt das Gateway mit expliziten, unveraenderlichen Abhaengigkeiten
    pub fn neu(
        optionen: &GatewayOptions,
        transport: Arc<dyn RoomTransport>,
        auth: Arc<dyn AuthDelegate>,
        presence: Arc<dyn PresenceDelegate>,
    ) -> Self {
        let diagnostik = Diagnostics::neu(optionen.dev_mode);
        diagnostik.bereit();

        Self {
            transport,
            auth,
            presence,
            hooks: HookNotifier::aus_optionen(optionen),
            matcher: ChannelMatcher::neu(&optionen.private_muster, &optionen.client_event_muster),
            diagnostik,
        }
    }

    /// Verarbeitet eine Beitritts-Anfrage
    ///
    /// Oeffentliche Kanaele werden direkt betreten; private und
    /// presence-Kanaele erst nach erfolgreicher Autorisierung. Eine
    /// Anfrage ohne Kanalnamen ist ein stilles No-op.
    pub async fn beitreten(&self, socket: &Socket, anfrage: JoinRequest) {
        if anfrage.channel.is_empty() {
            return;
        }

        if self.matcher.ist_privat(&anfrage.channel) {
            self.privat_beitreten(socket, anfrage).await;
        } else {
            self.transport.raum_beitreten(&socket.id, &anfrage.channel);
            self.nach_beitritt(socket, &anfrage.channel, anfrage.auth.as_ref());
        }
    }

    /// Beitritt zu einem autorisierungspflichtigen Kanal
    async fn privat_beitreten(&self, socket: &Socket, anfrage: JoinRequest) {
        match self.auth.autorisieren(socket, &anfrage).await {
            Ok(gewaehrt) => {
                self.transport.raum_beitreten(&socket.id, &anfrage.channel);

                if self.matcher.ist_presence(&anfrage.channel) {
                    let mitglied = mitglied_aus_channel_data(gewaehrt.channel_data);
                    self.presence
                        .beitreten(&socket.id, &anfrage.channel, mitglied)
                        .await;
                }

                self.nach_beitritt(socket, &anfrage.channel, anfrage.auth.as_ref());
            }
            Err(ablehnung) => {
                self.diagnostik
                    .abgelehnt(&socket.id, &anfrage.channel, &ablehnung.reason);
                // Ablehnung geht ausschliesslich an den anfragenden Socket;
                // Hooks werden nicht aufgerufen
                self.transport.an_socket_senden(
                    &socket.id,
                    ServerMessage::SubscriptionError {
                        channel: anfrage.channel,
                        status: ablehnung.status,
                    },
                );
            }
        }
    }

    /// Abschluss eines erfolgreichen Beitritts: Diagnose, dann join-Hook
    fn nach_beitritt(&self, socket: &Socket, kanal: &str, auth: Option<&AuthPayload>) {
        self.diagnostik.beitritt(&socket.id, kanal);
        self.hooks.melden(socket, auth, HookEvent::join(kanal));
    }

    /// Verarbeitet einen Kanal-Austritt
    ///
    /// Wird auch vom Transport beim Trennen einer Verbindung fuer jeden
    /// Raum des Sockets aufgerufen. Ein leerer Kanalname ist ein stilles
    /// No-op.
    pub async fn verlassen(
        &self,
        socket: &Socket,
        kanal: &str,
        grund: &str,
        auth: Option<AuthPayload>,
    ) {
        if kanal.is_empty() {
            return;
        }

        // Presence-Deregistrierung vor der Raum-Mitgliedschaft
        if self.matcher.ist_presence(kanal) {
            self.presence.verlassen(&socket.id, kanal).await;
        }

        self.transport.raum_verlassen(&socket.id, kanal);
        self.diagnostik.austritt(&socket.id, kanal, grund);
        // leave-Hook unabhaengig vom Kanal-Typ
        self.hooks.melden(socket, auth.as_ref(), HookEvent::leave(kanal));
    }

    /// Leitet ein Client-Event an die uebrigen Raum-Mitglieder weiter
    ///
    /// Weitergeleitet wird nur wenn alle drei Bedingungen gelten: der
    /// Event-Name ist als Client-Event klassifiziert, der Kanal als
    /// privat, und der Absender ist aktuell Raum-Mitglied (Abfrage beim
    /// Transport). Andernfalls wird das Event still verworfen – der
    /// Absender erhaelt keine Fehlermeldung.
    pub async fn client_event(&self, socket: &Socket, anfrage: ClientEventRequest) {
        if anfrage.event.is_empty() || anfrage.channel.is_empty() {
            return;
        }

        if !(self.matcher.ist_client_event(&anfrage.event)
            && self.matcher.ist_privat(&anfrage.channel)
            && self.transport.ist_mitglied(&socket.id, &anfrage.channel))
        {
            return;
        }

        // Verteilung strikt vor dem Hook
        self.transport.an_raum_senden(
            &anfrage.channel,
            &socket.id,
            ServerMessage::Event {
                event: anfrage.event,
                channel: anfrage.channel.clone(),
                data: anfrage.data.clone(),
            },
        );

        self.hooks.melden(
            socket,
            anfrage.auth.as_ref(),
            HookEvent::client_event(anfrage.channel, anfrage.data),
        );
    }
}

/// Leitet den Mitglieds-Deskriptor aus `channel_data` ab
///
/// Unparsebare Daten sind KEIN Autorisierungsfehler: der Rohtext wird
/// woertlich als Deskriptor uebernommen.
fn mitglied_aus_channel_data(channel_data: Option<String>) -> Value {
    match channel_data {
        None => Value::Null,
        Some(roh) => serde_json::from_str(&roh).unwrap_or(Value::String(roh)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
