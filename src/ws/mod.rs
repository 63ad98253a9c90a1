//! WebSocket surface at `/ws`.
//!
//! Clients send command envelopes (`subscribe`, `unsubscribe`,
//! `get_launch`) and receive launch events for the launches they follow.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
