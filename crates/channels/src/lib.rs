//! funkhaus-channels – Autorisierungs- und Lifecycle-Gateway
//!
//! Dieser Crate implementiert das Herzstueck von Funkhaus: die
//! Entscheidung ob ein Kanalname autorisierungspflichtig ist, die
//! Orchestrierung der asynchronen Autorisierung, das Gating der
//! Client-Event-Weiterleitung und den fire-and-forget Hook-Versand.
//!
//! ## Architektur
//!
//! ```text
//! Eingehendes Ereignis (join / leave / client event)
//!     |
//!     v
//! ChannelGateway
//!     |  klassifiziert via ChannelMatcher
//!     |
//!     +-- AuthDelegate      (asynchrone Kanal-Autorisierung)
//!     +-- RoomTransport     (Raum-Mitgliedschaft, Zustellung)
//!     +-- PresenceDelegate  (Wer ist auf welchem Presence-Kanal)
//!     +-- HookNotifier      (Lifecycle-Meldungen, fire-and-forget)
//!     +-- Diagnostics       (Dev-Modus-Diagnose)
//! ```

pub mod auth;
pub mod diagnostics;
pub mod gateway;
pub mod hooks;
pub mod matcher;
pub mod presence;
pub mod transport;

// Bequeme Re-Exporte
pub use auth::{AuthDelegate, AuthGranted, AuthRejection, AuthResult, HttpAuthenticator};
pub use diagnostics::Diagnostics;
pub use gateway::{ChannelGateway, GatewayOptions};
pub use hooks::{HookEvent, HookKind, HookNotifier};
pub use matcher::ChannelMatcher;
pub use presence::{MemoryPresence, PresenceDelegate, PresenceMitglied};
pub use transport::{MemoryTransport, RoomTransport};
