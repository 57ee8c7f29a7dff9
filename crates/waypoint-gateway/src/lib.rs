//! waypoint-gateway: HTTP front end for the Waypoint routing gateway
//!
//! Exposes `POST /api/chat` (delegate to a remote agent, or stream runner events),
//! `GET /api/agents` (list the agent registry) and serves a static chat UI.

pub mod assets;
pub mod protocol;
pub mod server;

pub use server::{GatewayServer, GatewayState};
