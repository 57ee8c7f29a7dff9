//! Gateway HTTP protocol: JSON bodies exchanged with browser clients

use serde::{Deserialize, Serialize};
use waypoint_a2a::AgentSummary;

/// Session coordinates used for every chat request
pub const APP_NAME: &str = "routing_app";
pub const DEFAULT_USER: &str = "default_user";
pub const DEFAULT_SESSION: &str = "default_session";

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Delegate to this remote agent instead of running locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
}

impl ChatRequest {
    /// Target agent, if one was named
    pub fn target_agent(&self) -> Option<&str> {
        self.agent_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Body of `GET /api/agents`
#[derive(Debug, Clone, Serialize)]
pub struct AgentListResponse {
    pub agents: Vec<AgentSummary>,
}

/// JSON error body for failed delegations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
