//! A2A wire types: agent cards, messages, tasks and the JSON-RPC envelope

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a remote agent publishes its card, relative to its address
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Path of the JSON-RPC endpoint, relative to the agent address
pub const RPC_PATH: &str = "/api";

pub const JSONRPC_VERSION: &str = "2.0";

pub mod methods {
    pub const MESSAGE_SEND: &str = "message/send";
}

/// Self-description published by a remote agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

/// One piece of a message, tagged by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MessagePart {
    Text { text: String },
    Data { data: Value },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default = "message_kind")]
    pub kind: String,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    pub role: Role,
    pub parts: Vec<MessagePart>,
}

fn message_kind() -> String {
    "message".to_string()
}

impl Message {
    /// A user message carrying a single text part
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            kind: message_kind(),
            message_id: uuid::Uuid::new_v4().to_string(),
            task_id: None,
            context_id: None,
            role: Role::User,
            parts: vec![MessagePart::Text { text: text.into() }],
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }
}

/// Params of a `message/send` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSendParams {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    Completed,
    Canceled,
    Failed,
    Rejected,
    AuthRequired,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Submitted => "submitted",
            Self::Working => "working",
            Self::InputRequired => "input-required",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
            Self::AuthRequired => "auth-required",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Task object returned by a remote agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest<P> {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: P,
}

impl<P> JsonRpcRequest<P> {
    pub fn new(method: &str, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: uuid::Uuid::new_v4().to_string(),
            method: method.to_string(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_card_json() {
        let raw = r#"{
            "name": "weather-svc",
            "description": "Weather forecasts",
            "url": "http://localhost:10001",
            "version": "1.0.0",
            "capabilities": {"streaming": false},
            "skills": [{"id": "forecast"}],
            "defaultInputModes": ["text"]
        }"#;
        let card: AgentCard = serde_json::from_str(raw).unwrap();
        assert_eq!(card.name, "weather-svc");
        assert_eq!(card.description, "Weather forecasts");
        assert_eq!(card.skills.len(), 1);
    }

    #[test]
    fn test_agent_card_minimal() {
        let card: AgentCard = serde_json::from_str(r#"{"name":"bare"}"#).unwrap();
        assert_eq!(card.name, "bare");
        assert!(card.description.is_empty());
        let json = serde_json::to_string(&card).unwrap();
        assert!(!json.contains("skills"));
    }

    #[test]
    fn test_message_send_request_shape() {
        let message = Message::user_text("what's the weather?").with_task_id("1");
        let request = JsonRpcRequest::new(methods::MESSAGE_SEND, MessageSendParams {
            message,
            metadata: None,
        });
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "message/send");
        let msg = &json["params"]["message"];
        assert_eq!(msg["kind"], "message");
        assert_eq!(msg["taskId"], "1");
        assert_eq!(msg["role"], "user");
        assert_eq!(msg["parts"], json!([{"kind": "text", "text": "what's the weather?"}]));
        assert!(msg["messageId"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[test]
    fn test_task_decode() {
        let value = json!({
            "id": "task-7",
            "contextId": "ctx-1",
            "kind": "task",
            "status": {"state": "input-required"},
            "artifacts": [{"parts": [{"kind": "text", "text": "ok"}]}]
        });
        let task: Task = serde_json::from_value(value).unwrap();
        assert_eq!(task.id, "task-7");
        assert_eq!(task.context_id.as_deref(), Some("ctx-1"));
        assert_eq!(task.status.unwrap().state, TaskState::InputRequired);
        assert_eq!(task.artifacts.len(), 1);
    }

    #[test]
    fn test_unknown_task_state_tolerated() {
        let status: TaskStatus = serde_json::from_value(json!({"state": "paused"})).unwrap();
        assert_eq!(status.state, TaskState::Unknown);
        assert_eq!(TaskState::AuthRequired.to_string(), "auth-required");
    }

    #[test]
    fn test_rpc_response_error() {
        let raw = r#"{"jsonrpc":"2.0","id":"abc","error":{"code":-32601,"message":"Method not found"}}"#;
        let resp: JsonRpcResponse = serde_json::from_str(raw).unwrap();
        assert!(resp.result.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.to_string(), "Method not found (code -32601)");
    }
}
