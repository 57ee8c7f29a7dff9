//! waypoint-core: shared building blocks for the Waypoint routing gateway
//!
//! This crate provides:
//! - The conversation event model (text, function call, function response parts)
//! - The `Runner` trait and a scripted `MockRunner`
//! - An in-memory session service

pub mod event;
pub mod runner;
pub mod session;

pub use event::{Actions, Content, Event, FunctionCall, FunctionResponse, Part};
pub use runner::{EventStream, MockRunner, Runner};
pub use session::{Session, SessionService};
