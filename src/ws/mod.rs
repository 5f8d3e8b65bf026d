//! WebSocket layer: connection handling and inbound message decoding.
//!
//! The probe talks to a single notification endpoint, so this layer is a
//! thin wrapper over `tokio-tungstenite` plus the JSON view of each frame.

pub mod connection;
pub mod messages;
