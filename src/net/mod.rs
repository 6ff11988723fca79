//! Outgoing HTTP: request descriptors, the plain network client, and the
//! intercepted client the application actually fetches through.

pub mod client;
pub mod intercepted;
pub mod types;
