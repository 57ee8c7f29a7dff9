//! A2A (Agent-to-Agent) support for Waypoint
//!
//! Resolves remote agents from their published cards and delegates user tasks to them
//! with JSON-RPC `message/send` calls.

pub mod client;
pub mod protocol;
pub mod registry;
pub mod routing;

pub use client::{A2aClient, AgentClient, AgentConnector, HttpConnector};
pub use protocol::{AgentCard, JsonRpcError, JsonRpcResponse, Message, MessageSendParams, Task, TaskState};
pub use registry::{AgentRegistry, AgentSummary, RemoteAgentConnection};
pub use routing::{
    ACTIVE_AGENT_KEY, AgentState, DelegationError, RoutingAgent, TaskCallback, active_agent_state,
};
