//! Kanal-Klassifizierung via Wildcard-Muster
//!
//! Kanalnamen werden gegen konfigurierbare Muster geprueft um zu
//! entscheiden ob ein Beitritt autorisierungspflichtig ist und ob ein
//! Event-Name als Client-Event weitergeleitet werden darf. Die Muster
//! kennen genau ein Sonderzeichen: `*` steht fuer eine beliebige
//! Zeichenfolge. Alle uebrigen Zeichen matchen woertlich.
//!
//! Die Muster werden einmal beim Erstellen kompiliert, nicht pro Aufruf.
//! Gematcht wird per Suche, nicht verankert – `private-*` trifft damit
//! auch Namen die das Praefix erst spaeter enthalten.

use regex::Regex;

/// Literales Praefix fuer Presence-Kanaele
pub const PRESENCE_PRAEFIX: &str = "presence-";

/// Klassifiziert Kanalnamen und Event-Namen
///
/// Alle Operationen sind rein und ohne Seiteneffekte.
#[derive(Debug)]
pub struct ChannelMatcher {
    private_muster: Vec<Regex>,
    client_event_muster: Vec<Regex>,
}

impl ChannelMatcher {
    /// Erstellt einen Matcher mit vorkompilierten Mustern
    pub fn neu(private_muster: &[String], client_event_muster: &[String]) -> Self {
        Self {
            private_muster: muster_kompilieren(private_muster),
            client_event_muster: muster_kompilieren(client_event_muster),
        }
    }

    /// Prueft ob ein Kanal autorisierungspflichtig ist
    pub fn ist_privat(&self, kanal: &str) -> bool {
        self.private_muster.iter().any(|m| m.is_match(kanal))
    }

    /// Prueft ob ein Kanal ein Presence-Kanal ist
    pub fn ist_presence(&self, kanal: &str) -> bool {
        kanal.starts_with(PRESENCE_PRAEFIX)
    }

    /// Prueft ob ein Event-Name als Client-Event weitergeleitet werden darf
    pub fn ist_client_event(&self, event: &str) -> bool {
        self.client_event_muster.iter().any(|m| m.is_match(event))
    }
}

/// Kompiliert Wildcard-Muster zu Regex-Matchern
///
/// Jedes Vorkommen von `*` expandiert zu `.*`; alle anderen Zeichen
/// werden escaped und matchen woertlich.
fn muster_kompilieren(muster: &[String]) -> Vec<Regex> {
    muster
        .iter()
        .filter_map(|m| {
            let ausdruck = regex::escape(m).replace("\\*", ".*");
            match Regex::new(&ausdruck) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!(muster = %m, fehler = %e, "Ungueltiges Kanal-Muster ignoriert");
                    None
                }
            }
        })
        .collect()
}
