//! Turns forecaster events into alert records and activity feed entries.
//!
//! Anomalies become warnings, failed modules become errors, and every
//! finished cycle is written to the activity feed.

use crate::events::{Event, EventBus, EventType};
use crate::state::StateManager;
use crate::types::alert::scope_str;
use crate::types::{AlertKind, AlertSeverity, NewActivity, NewAlert};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// The alert an event should raise, if any.
pub fn alert_for_event(event: &Event) -> Option<NewAlert> {
    let scope = scope_str(event.module);
    let (kind, severity, title) = match event.event_type {
        EventType::AnomalyDetected => {
            (AlertKind::Warning, AlertSeverity::Medium, format!("Anomaly in {} readings", scope))
        }
        EventType::ModuleFailed => {
            (AlertKind::Error, AlertSeverity::High, format!("Forecasting failed for {}", scope))
        }
        _ => return None,
    };

    Some(NewAlert { kind, title, message: event.message.clone(), module: event.module, severity })
}

/// The activity entry an event should leave, if any.
pub fn activity_for_event(event: &Event) -> Option<NewActivity> {
    match event.event_type {
        EventType::CycleCompleted => Some(NewActivity {
            action: event.event_type.as_str().to_string(),
            module: event.module,
            description: event.message.clone(),
            metadata: event.metadata.clone(),
        }),
        _ => None,
    }
}

/// Record alerts and activity until the bus closes.
///
/// Subscribes before returning, so events published after this call are
/// never missed.
pub fn spawn_event_recorder(events: &EventBus, state: StateManager) -> JoinHandle<()> {
    let mut subscriber = events.subscribe(vec![
        "anomaly.*".to_string(),
        EventType::ModuleFailed.as_str().to_string(),
        EventType::CycleCompleted.as_str().to_string(),
    ]);

    tokio::spawn(async move {
        while let Some(event) = subscriber.recv().await {
            if let Some(alert) = alert_for_event(&event) {
                warn!(
                    event = event.event_type.as_str(),
                    module = alert.module.map(|m| m.as_str()).unwrap_or("-"),
                    metadata = ?event.metadata,
                    "{}",
                    event.message
                );
                if let Err(e) = state.insert_alert(&alert).await {
                    warn!(error = %e, "Failed to record alert");
                }
            }

            if let Some(activity) = activity_for_event(&event) {
                debug!(action = %activity.action, "Recording activity");
                if let Err(e) = state.insert_activity(&activity).await {
                    warn!(error = %e, "Failed to record activity");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Module;

    #[test]
    fn test_anomaly_raises_warning() {
        let event = Event::new(EventType::AnomalyDetected, "quality 180 above 95.00")
            .with_module(Module::Environmental);

        let alert = alert_for_event(&event).unwrap();
        assert_eq!(alert.kind, AlertKind::Warning);
        assert_eq!(alert.severity, AlertSeverity::Medium);
        assert_eq!(alert.module, Some(Module::Environmental));
        assert_eq!(alert.title, "Anomaly in environmental readings");
        assert_eq!(alert.message, "quality 180 above 95.00");
    }

    #[test]
    fn test_module_failure_raises_error() {
        let event =
            Event::new(EventType::ModuleFailed, "database is locked").with_module(Module::Energy);
        let alert = alert_for_event(&event).unwrap();
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(alert.severity, AlertSeverity::High);
    }

    #[test]
    fn test_progress_events_raise_nothing() {
        let started = Event::new(EventType::CycleStarted, "started");
        assert!(alert_for_event(&started).is_none());
        assert!(activity_for_event(&started).is_none());

        let completed = Event::new(EventType::CycleCompleted, "4 predictions generated")
            .with_metadata("trigger", "manual");
        assert!(alert_for_event(&completed).is_none());
        let activity = activity_for_event(&completed).unwrap();
        assert_eq!(activity.action, "forecast.cycle_completed");
        assert_eq!(activity.module, None);
        assert_eq!(activity.metadata.get("trigger").map(String::as_str), Some("manual"));
    }

    #[tokio::test]
    async fn test_recorder_writes_until_bus_closes() {
        let state = StateManager::new_in_memory().await.unwrap();
        let bus = EventBus::new();
        let recorder = spawn_event_recorder(&bus, state.clone());

        bus.publish(Event::new(EventType::CycleStarted, "started"));
        bus.publish(
            Event::new(EventType::AnomalyDetected, "flow 97 above 80.00")
                .with_module(Module::Traffic),
        );
        bus.publish(Event::new(EventType::CycleCompleted, "4 predictions generated"));
        drop(bus);
        recorder.await.unwrap();

        let alerts = state.unresolved_alerts().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].module, Some(Module::Traffic));

        let feed = state.list_activity(10).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].description, "4 predictions generated");
    }
}
