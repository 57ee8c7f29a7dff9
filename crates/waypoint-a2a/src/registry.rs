//! Agent registry: remote agents discovered at startup, keyed by card name

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::{AgentClient, AgentConnector};
use crate::protocol::AgentCard;

/// A remote agent's card paired with a client bound to its address
pub struct RemoteAgentConnection {
    pub card: AgentCard,
    pub address: String,
    pub client: Arc<dyn AgentClient>,
}

/// Name and description of a registered agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub description: String,
}

/// Snapshot of the remote agents reachable at startup. Never mutated once shared.
#[derive(Default)]
pub struct AgentRegistry {
    connections: HashMap<String, RemoteAgentConnection>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every non-empty address. Addresses whose card cannot be fetched are
    /// logged and skipped; they never abort initialization.
    pub async fn initialize(addresses: &[String], connector: &dyn AgentConnector) -> Self {
        let mut registry = Self::new();

        for address in addresses {
            let address = address.trim();
            if address.is_empty() {
                continue;
            }

            let card = match connector.fetch_card(address).await {
                Ok(card) => card,
                Err(e) => {
                    warn!("Failed to get agent card from {}: {:#}", address, e);
                    continue;
                }
            };

            info!("Registered remote agent '{}' at {}", card.name, address);
            registry.insert(RemoteAgentConnection {
                client: connector.connect(address),
                address: address.to_string(),
                card,
            });
        }

        registry
    }

    /// Add a connection. An existing agent with the same name is replaced.
    pub fn insert(&mut self, connection: RemoteAgentConnection) {
        let name = connection.card.name.clone();
        if let Some(previous) = self.connections.insert(name.clone(), connection) {
            debug!(
                "Agent '{}' from {} replaced by a later registration",
                name, previous.address
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&RemoteAgentConnection> {
        self.connections.get(name)
    }

    /// Name and description of every registered agent, in no particular order
    pub fn list(&self) -> Vec<AgentSummary> {
        self.connections
            .values()
            .map(|c| AgentSummary {
                name: c.card.name.clone(),
                description: c.card.description.clone(),
            })
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connections.keys().cloned().collect();
        names.sort();
        names
    }

    /// One JSON-encoded card per line, sorted by name
    pub fn roster(&self) -> String {
        let mut cards: Vec<&AgentCard> = self.connections.values().map(|c| &c.card).collect();
        cards.sort_by(|a, b| a.name.cmp(&b.name));
        cards
            .into_iter()
            .filter_map(|card| serde_json::to_string(card).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
