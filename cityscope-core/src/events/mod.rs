//! Event bus for forecaster events.
//!
//! Provides a publish/subscribe mechanism for generation-cycle progress and
//! anomaly findings. [`crate::alerts`] turns anomalies into alert records.
//!
//! # Example
//!
//! ```ignore
//! let bus = EventBus::new();
//!
//! // Subscribe to anomaly events
//! let mut rx = bus.subscribe(vec!["anomaly.*".to_string()]);
//!
//! bus.publish(
//!     Event::new(EventType::AnomalyDetected, "Flow spike at Bridge Avenue")
//!         .with_module(Module::Traffic),
//! );
//!
//! while let Some(event) = rx.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! ```

use crate::types::{now_ms, Module};
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use tracing::debug;

/// Maximum number of events buffered in the broadcast channel.
const EVENT_BUFFER_SIZE: usize = 256;

/// Event types for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    CycleStarted,
    CycleCompleted,
    PredictionCreated,
    ModuleFailed,
    AnomalyDetected,
}

impl EventType {
    /// Get the event type string (e.g., "forecast.cycle_started").
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CycleStarted => "forecast.cycle_started",
            EventType::CycleCompleted => "forecast.cycle_completed",
            EventType::PredictionCreated => "forecast.prediction_created",
            EventType::ModuleFailed => "forecast.module_failed",
            EventType::AnomalyDetected => "anomaly.detected",
        }
    }
}

/// A forecaster event.
#[derive(Debug, Clone)]
pub struct Event {
    /// Unix timestamp in milliseconds
    pub timestamp_ms: i64,
    pub event_type: EventType,
    /// City module the event concerns, if any
    pub module: Option<Module>,
    /// Human-readable message
    pub message: String,
    /// Additional metadata
    pub metadata: BTreeMap<String, String>,
}

impl Event {
    /// Create a new event.
    pub fn new(event_type: EventType, message: impl Into<String>) -> Self {
        Self {
            timestamp_ms: now_ms(),
            event_type,
            module: None,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.module = Some(module);
        self
    }

    /// Add metadata to the event.
    pub fn with_metadata(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }
}

/// Event bus for publishing and subscribing to forecaster events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: Event) {
        debug!(event_type = event.event_type.as_str(), "Publishing event");
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    /// Subscribe to events, optionally filtered by event type patterns.
    ///
    /// # Filter patterns
    ///
    /// - `"forecast.*"` - All generation-cycle events
    /// - `"anomaly.*"` - All anomaly events
    /// - `"forecast.module_failed"` - Only module failures
    /// - Empty list - All events
    pub fn subscribe(&self, filters: Vec<String>) -> EventSubscriber {
        EventSubscriber { receiver: self.sender.subscribe(), filters }
    }

    /// Get the number of current subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Event subscriber with optional filtering.
pub struct EventSubscriber {
    receiver: broadcast::Receiver<Event>,
    filters: Vec<String>,
}

impl EventSubscriber {
    /// Receive the next matching event; `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.matches(&event) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    debug!("Event subscriber lagged by {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return None;
                }
            }
        }
    }

    fn matches(&self, event: &Event) -> bool {
        if self.filters.is_empty() {
            return true;
        }

        let name = event.event_type.as_str();
        self.filters.iter().any(|filter| match filter.strip_suffix(".*") {
            Some(prefix) => name.starts_with(prefix) && name[prefix.len()..].starts_with('.'),
            None => filter == name,
        })
    }
}
