//! Conversation events: the unit of output produced by runners and remote agents
//!
//! The JSON shape uses PascalCase keys and omits absent fields, e.g.
//! `{"Content":{"Parts":[{"Text":"hello"}]}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One turn of conversation output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Actions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Ordered parts making up a message or event body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single piece of content. Exactly one kind per part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Part {
    Text(String),
    FunctionCall(FunctionCall),
    FunctionResponse(FunctionResponse),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionResponse {
    pub name: String,
    #[serde(default)]
    pub response: Value,
}

/// Side-channel flags attached to an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Actions {
    #[serde(default)]
    pub escalate: bool,
}

impl Event {
    /// Event carrying the given content and nothing else
    pub fn new(content: Content) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    /// Event with a single text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Content::text(text))
    }

    /// An event is final when it asks to escalate control back to the caller
    pub fn is_final_response(&self) -> bool {
        self.actions.as_ref().is_some_and(|a| a.escalate)
    }

    /// Concatenated text of all text parts, if any
    pub fn text_content(&self) -> Option<String> {
        let content = self.content.as_ref()?;
        let texts: Vec<&str> = content.texts().collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}

impl Content {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Part::Text(text.into())])
    }

    /// Iterate over the text parts only
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            Part::Text(t) => Some(t.as_str()),
            _ => None,
        })
    }
}

impl Part {
    pub fn function_call(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self::FunctionCall(FunctionCall {
            name: name.into(),
            args,
        })
    }

    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Self::FunctionResponse(FunctionResponse {
            name: name.into(),
            response,
        })
    }

    /// Short label for logging: "text", "function_call" or "function_response"
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::FunctionCall(_) => "function_call",
            Self::FunctionResponse(_) => "function_response",
        }
    }
}
