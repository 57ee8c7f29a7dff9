//! Routing agent: delegates a user task to one named remote agent

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use waypoint_core::Event;

use crate::client::AgentConnector;
use crate::protocol::{JsonRpcError, Message, MessageSendParams, Task};
use crate::registry::{AgentRegistry, AgentSummary};

/// Per-request state passed alongside a delegated task
pub type AgentState = Map<String, Value>;

/// Invoked with the task id and decoded task after each successful delegation
pub type TaskCallback = Arc<dyn Fn(&str, &Task) + Send + Sync>;

/// State key naming the agent currently handling the conversation
pub const ACTIVE_AGENT_KEY: &str = "active_agent";

/// Task id attached to every outgoing message
const DELEGATED_TASK_ID: &str = "1";

#[derive(Debug, Error)]
pub enum DelegationError {
    #[error("agent {0} not found or not initialized")]
    NotFound(String),
    #[error("{0:#}")]
    Transport(anyhow::Error),
    #[error("agent error: {0}")]
    Remote(JsonRpcError),
    #[error("invalid task in reply from agent {agent}: {source}")]
    Decode {
        agent: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Forwards tasks to remote agents held in an immutable registry.
///
/// The registry is never written after construction and each client handle is safe
/// to share, so calls to different agents proceed concurrently.
pub struct RoutingAgent {
    registry: AgentRegistry,
    task_callback: Option<TaskCallback>,
}

impl RoutingAgent {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            task_callback: None,
        }
    }

    /// Resolve the given addresses and build a routing agent over the result
    pub async fn connect(addresses: &[String], connector: &dyn AgentConnector) -> Self {
        Self::new(AgentRegistry::initialize(addresses, connector).await)
    }

    pub fn with_task_callback(mut self, callback: TaskCallback) -> Self {
        self.task_callback = Some(callback);
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn list_remote_agents(&self) -> Vec<AgentSummary> {
        self.registry.list()
    }

    /// Send `task` to `agent_name` and summarise the reply as a single text event
    pub async fn send_message(
        &self,
        agent_name: &str,
        task: &str,
        state: &AgentState,
    ) -> Result<Event, DelegationError> {
        let conn = self
            .registry
            .get(agent_name)
            .ok_or_else(|| DelegationError::NotFound(agent_name.to_string()))?;

        debug!(
            "Delegating to '{}' at {} (active agent: {})",
            agent_name,
            conn.address,
            Self::check_active_agent(state)
        );

        let params = MessageSendParams {
            message: Message::user_text(task).with_task_id(DELEGATED_TASK_ID),
            metadata: None,
        };

        let response = conn
            .client
            .send_message(params)
            .await
            .map_err(DelegationError::Transport)?;

        if let Some(error) = response.error {
            warn!("Agent '{}' returned an error: {}", agent_name, error);
            return Err(DelegationError::Remote(error));
        }

        let result = response.result.unwrap_or(Value::Null);
        let task_obj: Task =
            serde_json::from_value(result).map_err(|source| DelegationError::Decode {
                agent: agent_name.to_string(),
                source,
            })?;

        info!("Agent '{}' accepted task {}", agent_name, task_obj.id);
        if let Some(callback) = &self.task_callback {
            callback(&task_obj.id, &task_obj);
        }

        Ok(Event::text(format!(
            "Agent {} result: {}",
            agent_name, task_obj.id
        )))
    }

    /// Instruction text for a delegating LLM, listing the known agents
    pub fn root_instruction(&self, state: &AgentState) -> String {
        format!(
            r#"
**Role:** You are an expert Routing Delegator. Your primary function is to accurately delegate user inquiries regarding weather or accommodations to the appropriate specialized remote agents.

**Agent Roster:**
* Available Agents: {}
* Currently Active Agent: {}
"#,
            self.registry.roster(),
            Self::check_active_agent(state)
        )
    }

    /// The agent named in `state`, or "None"
    pub fn check_active_agent(state: &AgentState) -> String {
        match state.get(ACTIVE_AGENT_KEY) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => "None".to_string(),
        }
    }
}

/// State map with `active_agent` set to the given name
pub fn active_agent_state(agent_name: &str) -> AgentState {
    let mut state = AgentState::new();
    state.insert(
        ACTIVE_AGENT_KEY.to_string(),
        Value::String(agent_name.to_string()),
    );
    state
}
