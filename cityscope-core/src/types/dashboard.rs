//! Dashboard summary figures.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Air-quality label derived from the latest AQI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirQuality {
    Good,
    Moderate,
    Poor,
    Unhealthy,
}

impl AirQuality {
    /// Classify an AQI value. No reading counts as good.
    pub fn from_aqi(aqi: Option<i64>) -> Self {
        match aqi {
            None => AirQuality::Good,
            Some(v) if v <= 50 => AirQuality::Good,
            Some(v) if v <= 100 => AirQuality::Moderate,
            Some(v) if v <= 150 => AirQuality::Poor,
            Some(_) => AirQuality::Unhealthy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AirQuality::Good => "Good",
            AirQuality::Moderate => "Moderate",
            AirQuality::Poor => "Poor",
            AirQuality::Unhealthy => "Unhealthy",
        }
    }
}

impl fmt::Display for AirQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Headline figures for the dashboard landing view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_population: i64,
    pub energy_consumption: f64,
    /// Average traffic flow rate over the last 24 hours.
    pub traffic_flow: f64,
    pub air_quality: AirQuality,
    /// Alerts not yet resolved.
    pub alert_count: i64,
    pub prediction_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_quality_bands() {
        assert_eq!(AirQuality::from_aqi(None), AirQuality::Good);
        assert_eq!(AirQuality::from_aqi(Some(50)), AirQuality::Good);
        assert_eq!(AirQuality::from_aqi(Some(51)), AirQuality::Moderate);
        assert_eq!(AirQuality::from_aqi(Some(100)), AirQuality::Moderate);
        assert_eq!(AirQuality::from_aqi(Some(150)), AirQuality::Poor);
        assert_eq!(AirQuality::from_aqi(Some(151)), AirQuality::Unhealthy);
    }
}
