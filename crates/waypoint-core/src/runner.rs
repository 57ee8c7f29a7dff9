//! Runners: produce a stream of events for one user turn

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Map, json};
use tokio::sync::mpsc;
use tracing::debug;

use crate::event::{Content, Event, Part};

/// Receiving end of a runner's output. Closed by the producer after its last event.
pub type EventStream = mpsc::Receiver<Event>;

/// Single-slot handoff between producer and consumer
const STREAM_CAPACITY: usize = 1;

/// Delay between mock events
const DEFAULT_STEP_DELAY: Duration = Duration::from_secs(1);

/// Anything that can turn a user message into a sequence of events.
///
/// Implementations push events as they become available and close the stream when
/// the turn is over. Dropping the stream tells the producer to stop.
pub trait Runner: Send + Sync {
    fn run_async(&self, user_id: &str, session_id: &str, new_message: Content) -> EventStream;
}

/// Simulates an agent turn: a weather tool call, its response, then a final answer
pub struct MockRunner {
    step_delay: Duration,
    emitted: Arc<AtomicUsize>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_STEP_DELAY)
    }

    pub fn with_delay(step_delay: Duration) -> Self {
        Self {
            step_delay,
            emitted: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Total events handed to consumers across all runs
    pub fn emitted(&self) -> usize {
        self.emitted.load(Ordering::Relaxed)
    }

    fn script() -> Vec<Event> {
        let mut args = Map::new();
        args.insert("city".to_string(), json!("Beijing"));

        vec![
            Event::new(Content::new(vec![Part::function_call("weather", args)])),
            Event::new(Content::new(vec![Part::function_response(
                "weather",
                json!({"temp": 25, "desc": "Sunny"}),
            )])),
            Event::text("The weather in Beijing is sunny, 25°C."),
        ]
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for MockRunner {
    fn run_async(&self, user_id: &str, session_id: &str, new_message: Content) -> EventStream {
        debug!(
            "Mock run for user '{}' session '{}' ({} parts)",
            user_id,
            session_id,
            new_message.parts.len()
        );

        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        let delay = self.step_delay;
        let emitted = self.emitted.clone();

        tokio::spawn(async move {
            let script = Self::script();
            let last = script.len() - 1;

            for (i, event) in script.into_iter().enumerate() {
                if tx.send(event).await.is_err() {
                    debug!("Mock run consumer went away before event {}", i + 1);
                    return;
                }
                emitted.fetch_add(1, Ordering::Relaxed);

                if i < last {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = tx.closed() => {
                            debug!("Mock run cancelled after {} events", i + 1);
                            return;
                        }
                    }
                }
            }
        });

        rx
    }
}
