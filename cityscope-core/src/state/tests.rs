#[cfg(test)]
mod tests {
    use crate::forecast::{ForecastStore, MetricKey};
    use crate::state::StateManager;
    use crate::error::CityError;
    use crate::types::{
        now_ms, AirQuality, AlertKind, AlertSeverity, EnergyReading, EnvironmentalReading, Module,
        NewActivity, NewAlert, NewPrediction, PopulationReading, ReadingExport, TrafficReading,
        HOUR_MS,
    };
    use std::collections::BTreeMap;

    fn traffic(location: &str, timestamp_ms: i64, flow_rate: f64) -> TrafficReading {
        TrafficReading {
            timestamp_ms: Some(timestamp_ms),
            location: location.to_string(),
            flow_rate,
            congestion_level: "medium".to_string(),
            average_speed: Some(42.0),
            vehicle_count: Some(250),
        }
    }

    fn energy(timestamp_ms: i64, total_consumption: f64, renewable: f64) -> EnergyReading {
        EnergyReading {
            timestamp_ms: Some(timestamp_ms),
            total_consumption,
            renewable_percentage: renewable,
            solar_output: None,
            wind_output: Some(40.0),
            grid_load: Some(total_consumption * 0.85),
            peak_demand: Some(total_consumption * 1.2),
        }
    }

    fn environmental(timestamp_ms: i64, aqi: i64) -> EnvironmentalReading {
        EnvironmentalReading {
            timestamp_ms: Some(timestamp_ms),
            air_quality_index: aqi,
            pm25: Some(12.0),
            pm10: None,
            temperature: Some(21.5),
            humidity: None,
            noise_level: None,
        }
    }

    #[tokio::test]
    async fn test_state_manager_init() {
        let manager = StateManager::new_in_memory().await.unwrap();
        assert_eq!(manager.count_predictions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_traffic_window_bounds_and_groups() {
        let manager = StateManager::new_in_memory().await.unwrap();
        let now = now_ms();

        manager.insert_traffic(&traffic("Bridge Avenue", now - 30 * HOUR_MS, 10.0)).await.unwrap();
        manager.insert_traffic(&traffic("Bridge Avenue", now - 2 * HOUR_MS, 55.0)).await.unwrap();
        manager.insert_traffic(&traffic("Central Plaza", now - HOUR_MS, 70.0)).await.unwrap();

        let readings =
            manager.readings_in_range(MetricKey::TrafficFlow, now - 24 * HOUR_MS, now).await.unwrap();

        assert_eq!(readings.len(), 2);
        // Newest first
        assert_eq!(readings[0].group.as_deref(), Some("Central Plaza"));
        assert_eq!(readings[1].value, 55.0);
        assert_eq!(readings[1].timestamp_ms, Some(now - 2 * HOUR_MS));
    }

    #[tokio::test]
    async fn test_energy_series_share_rows() {
        let manager = StateManager::new_in_memory().await.unwrap();
        let now = now_ms();
        manager.insert_energy(&energy(now - HOUR_MS, 900.0, 45.0)).await.unwrap();

        let consumption =
            manager.fetch_window(MetricKey::EnergyConsumption, now - HOUR_MS, now).await.unwrap();
        let renewable =
            manager.fetch_window(MetricKey::EnergyRenewable, now - HOUR_MS, now).await.unwrap();

        assert_eq!(consumption[0].value, 900.0);
        assert_eq!(renewable[0].value, 45.0);
        assert!(consumption[0].group.is_none());
    }

    #[tokio::test]
    async fn test_aqi_is_read_as_float() {
        let manager = StateManager::new_in_memory().await.unwrap();
        let now = now_ms();
        manager.insert_environmental(&environmental(now, 63)).await.unwrap();

        let readings =
            manager.fetch_window(MetricKey::AirQualityIndex, now - HOUR_MS, now).await.unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].value, 63.0);
    }

    #[tokio::test]
    async fn test_prediction_roundtrip_and_ordering() {
        let manager = StateManager::new_in_memory().await.unwrap();

        let first = manager
            .append_prediction(
                &NewPrediction::new(Module::Traffic, "flow", 61.5, 0.8, 1)
                    .with_metadata("location", "Bridge Avenue"),
            )
            .await
            .unwrap();
        let second = manager
            .append_prediction(&NewPrediction::new(Module::Energy, "demand", 910.0, 0.4, 6))
            .await
            .unwrap();
        manager
            .append_prediction(&NewPrediction::new(Module::Traffic, "flow", 63.0, 0.8, 6))
            .await
            .unwrap();

        let all = manager.list_predictions(None, 50).await.unwrap();
        assert_eq!(all.len(), 3);
        // Newest first, ties broken by insertion order
        assert!(all[0].id > all[1].id && all[1].id > all[2].id);
        assert_eq!(all[1], second);

        let traffic = manager.list_predictions(Some(Module::Traffic), 50).await.unwrap();
        assert_eq!(traffic.len(), 2);
        assert_eq!(traffic[1], first);
        assert_eq!(traffic[1].metadata.get("location").map(String::as_str), Some("Bridge Avenue"));

        let limited = manager.list_predictions(None, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].time_horizon_hours, 6);
    }

    #[tokio::test]
    async fn test_latest_predictions_capped_at_ten() {
        let manager = StateManager::new_in_memory().await.unwrap();
        for i in 0..15 {
            manager
                .insert_prediction(&NewPrediction::new(Module::Environmental, "quality", i as f64, 0.5, 1))
                .await
                .unwrap();
        }

        let latest = manager.latest_predictions().await.unwrap();
        assert_eq!(latest.len(), 10);
        assert_eq!(latest[0].predicted_value, 14.0);
    }

    #[tokio::test]
    async fn test_dashboard_metrics() {
        let manager = StateManager::new_in_memory().await.unwrap();

        let empty = manager.dashboard_metrics().await.unwrap();
        assert_eq!(empty.total_population, 0);
        assert_eq!(empty.traffic_flow, 0.0);
        assert_eq!(empty.air_quality, AirQuality::Good);

        let now = now_ms();
        manager.insert_traffic(&traffic("Central Plaza", now - HOUR_MS, 40.0)).await.unwrap();
        manager.insert_traffic(&traffic("Central Plaza", now - 2 * HOUR_MS, 60.0)).await.unwrap();
        manager.insert_energy(&energy(now - 2 * HOUR_MS, 800.0, 30.0)).await.unwrap();
        manager.insert_energy(&energy(now - HOUR_MS, 950.0, 35.0)).await.unwrap();
        manager.insert_environmental(&environmental(now, 120)).await.unwrap();
        manager
            .insert_population(&PopulationReading {
                timestamp_ms: Some(now),
                total_population: 2_400_512,
                active_users: Some(90_000),
                growth_rate: Some(1.2),
                demographics: Some(serde_json::json!({"income": {"low": 30}})),
            })
            .await
            .unwrap();

        let metrics = manager.dashboard_metrics().await.unwrap();
        assert_eq!(metrics.total_population, 2_400_512);
        assert_eq!(metrics.energy_consumption, 950.0);
        assert_eq!(metrics.traffic_flow, 50.0);
        assert_eq!(metrics.air_quality, AirQuality::Poor);
        assert_eq!(metrics.prediction_count, 0);
        assert_eq!(metrics.alert_count, 0);
    }

    fn alert(title: &str, module: Option<Module>) -> NewAlert {
        NewAlert {
            kind: AlertKind::Warning,
            title: title.to_string(),
            message: "PM2.5 levels above normal threshold".to_string(),
            module,
            severity: AlertSeverity::Medium,
        }
    }

    #[tokio::test]
    async fn test_alert_lifecycle() {
        let manager = StateManager::new_in_memory().await.unwrap();

        let air = manager
            .insert_alert(&alert("Air Quality Alert", Some(Module::Environmental)))
            .await
            .unwrap();
        let backup = manager.insert_alert(&alert("Backup Completed", None)).await.unwrap();
        assert!(!air.resolved);

        let all = manager.list_alerts(50).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], backup);
        assert_eq!(all[0].module, None);
        assert_eq!(all[1].module, Some(Module::Environmental));
        assert_eq!(manager.list_alerts(1).await.unwrap().len(), 1);

        manager.resolve_alert(air.id).await.unwrap();

        let unresolved = manager.unresolved_alerts().await.unwrap();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].id, backup.id);
        assert_eq!(manager.dashboard_metrics().await.unwrap().alert_count, 1);

        let find_air = |alerts: Vec<crate::types::Alert>| alerts.into_iter().find(|a| a.id == air.id);
        let resolved = find_air(manager.list_alerts(50).await.unwrap()).unwrap();
        assert!(resolved.resolved);
        let first_resolution = resolved.resolved_at_ms.unwrap();

        // Resolving again is accepted and keeps the original time
        manager.resolve_alert(air.id).await.unwrap();
        let again = find_air(manager.list_alerts(50).await.unwrap()).unwrap();
        assert_eq!(again.resolved_at_ms, Some(first_resolution));
    }

    #[tokio::test]
    async fn test_resolve_missing_alert() {
        let manager = StateManager::new_in_memory().await.unwrap();
        let err = manager.resolve_alert(404).await.unwrap_err();
        assert!(matches!(err, CityError::AlertNotFound { id: 404 }));
    }

    #[tokio::test]
    async fn test_activity_feed() {
        let manager = StateManager::new_in_memory().await.unwrap();

        let mut metadata = BTreeMap::new();
        metadata.insert("trigger".to_string(), "manual".to_string());
        manager
            .insert_activity(&NewActivity {
                action: "forecast.cycle_completed".to_string(),
                module: None,
                description: "15 predictions generated".to_string(),
                metadata,
            })
            .await
            .unwrap();
        manager
            .insert_activity(&NewActivity {
                action: "alert.resolved".to_string(),
                module: Some(Module::Traffic),
                description: "Resolved alert 3".to_string(),
                metadata: BTreeMap::new(),
            })
            .await
            .unwrap();

        let feed = manager.list_activity(50).await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].action, "alert.resolved");
        assert_eq!(feed[0].module, Some(Module::Traffic));
        assert_eq!(feed[1].module, None);
        assert_eq!(feed[1].metadata.get("trigger").map(String::as_str), Some("manual"));
    }

    #[tokio::test]
    async fn test_export_readings_per_module() {
        let manager = StateManager::new_in_memory().await.unwrap();
        let now = now_ms();

        manager.insert_traffic(&traffic("Bridge Avenue", now - 30 * HOUR_MS, 10.0)).await.unwrap();
        manager.insert_traffic(&traffic("Bridge Avenue", now - 2 * HOUR_MS, 55.0)).await.unwrap();
        manager.insert_traffic(&traffic("Central Plaza", now - HOUR_MS, 70.0)).await.unwrap();
        manager.insert_energy(&energy(now - HOUR_MS, 900.0, 45.0)).await.unwrap();
        manager
            .insert_population(&PopulationReading {
                timestamp_ms: Some(now - HOUR_MS),
                total_population: 2_399_100,
                active_users: None,
                growth_rate: Some(0.4),
                demographics: Some(serde_json::json!({"income": {"high": 20}})),
            })
            .await
            .unwrap();

        let start = now - 24 * HOUR_MS;
        match manager.export_readings(Module::Traffic, start, now).await.unwrap() {
            ReadingExport::Traffic(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].location, "Central Plaza");
                assert_eq!(rows[1].average_speed, Some(42.0));
            }
            other => panic!("expected traffic export, got {:?}", other.module()),
        }

        match manager.export_readings(Module::Energy, start, now).await.unwrap() {
            ReadingExport::Energy(rows) => {
                assert_eq!(rows[0].solar_output, None);
                assert_eq!(rows[0].grid_load, Some(900.0 * 0.85));
            }
            other => panic!("expected energy export, got {:?}", other.module()),
        }

        match manager.export_readings(Module::Population, start, now).await.unwrap() {
            ReadingExport::Population(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].demographics, Some(serde_json::json!({"income": {"high": 20}})));
            }
            other => panic!("expected population export, got {:?}", other.module()),
        }

        let environmental =
            manager.export_readings(Module::Environmental, start, now).await.unwrap();
        assert!(environmental.is_empty());
    }

    #[tokio::test]
    async fn test_export_rejects_inverted_range() {
        let manager = StateManager::new_in_memory().await.unwrap();
        let err = manager.export_readings(Module::Energy, 10, 5).await.unwrap_err();
        assert!(matches!(err, CityError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_reopen_file_database_keeps_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/cityscope.db");

        {
            let manager = StateManager::new(&path).await.unwrap();
            manager
                .insert_prediction(&NewPrediction::new(Module::Energy, "renewable", 44.0, 0.3, 24))
                .await
                .unwrap();
            manager.pool().close().await;
        }

        let manager = StateManager::new(&path).await.unwrap();
        assert_eq!(manager.count_predictions().await.unwrap(), 1);
        manager.pool().close().await;
    }
}
