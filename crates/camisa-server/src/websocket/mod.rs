//! WebSocket connection tracking and notification fan-out.

pub mod connection;
pub mod errors;
pub mod heartbeat;
pub mod hub;
pub mod registry;
pub mod session;
