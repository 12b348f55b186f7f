//! funkhaus-protocol – Wire-Nachrichten und gemeinsame Typen
//!
//! Dieses Crate definiert alle Nachrichtentypen die zwischen Client und
//! Server ausgetauscht werden, sowie die Socket-Identitaetstypen die alle
//! anderen Funkhaus-Crates gemeinsam nutzen.

pub mod messages;
pub mod types;

// Bequeme Re-Exporte
pub use messages::{
    AuthPayload, ClientEventRequest, ClientMessage, JoinRequest, LeaveRequest, ServerMessage,
};
pub use types::{Socket, SocketId};
