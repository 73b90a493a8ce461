//! Synthetic city data.
//!
//! Produces plausible traffic, energy, environmental and population readings
//! with simple time-of-day shapes, so the forecaster has something to chew
//! on without real sensors. Hours are taken in UTC.

use crate::error::Result;
use crate::state::StateManager;
use crate::types::{
    now_ms, EnergyReading, EnvironmentalReading, PopulationReading, TrafficReading, HOUR_MS,
};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Sensor locations traffic readings are attributed to.
pub const TRAFFIC_LOCATIONS: [&str; 8] = [
    "Downtown Main St",
    "Highway 101 North",
    "Bridge Avenue",
    "Central Plaza",
    "Industrial District",
    "Residential Area East",
    "University Campus",
    "Shopping District",
];

/// Chance per tick of also writing a population snapshot.
const POPULATION_PROBABILITY: f64 = 0.1;

const BASE_POPULATION: i64 = 2_400_000;

/// Hour of day (0-23, UTC) for a Unix millisecond timestamp.
pub fn hour_of_day(timestamp_ms: i64) -> u32 {
    (timestamp_ms.div_euclid(HOUR_MS).rem_euclid(24)) as u32
}

/// Congestion label for a flow rate percentage.
pub fn congestion_level(flow_rate: f64) -> &'static str {
    if flow_rate > 80.0 {
        "high"
    } else if flow_rate > 60.0 {
        "medium"
    } else {
        "low"
    }
}

pub fn traffic_reading<R: Rng + ?Sized>(rng: &mut R, timestamp_ms: i64) -> TrafficReading {
    let hour = hour_of_day(timestamp_ms);
    let base_flow = rng.gen_range(50.0..90.0);
    let modifier = match hour {
        7..=9 => 1.3,
        17..=19 => 1.4,
        22..=23 | 0..=5 => 0.6,
        _ => 1.0,
    };
    let flow_rate = f64::min(100.0, base_flow * modifier);

    TrafficReading {
        timestamp_ms: Some(timestamp_ms),
        location: TRAFFIC_LOCATIONS[rng.gen_range(0..TRAFFIC_LOCATIONS.len())].to_string(),
        flow_rate,
        congestion_level: congestion_level(flow_rate).to_string(),
        average_speed: Some(rng.gen_range(20.0..60.0)),
        vehicle_count: Some(rng.gen_range(100..500)),
    }
}

pub fn energy_reading<R: Rng + ?Sized>(rng: &mut R, timestamp_ms: i64) -> EnergyReading {
    let hour = hour_of_day(timestamp_ms);
    let base = rng.gen_range(800.0..1000.0);
    let modifier = match hour {
        18..=22 => 1.2,
        10..=16 => 1.1,
        0..=6 => 0.7,
        _ => 1.0,
    };
    let total_consumption = base * modifier;

    let solar_output = if (6..=18).contains(&hour) {
        let angle = (hour as f64 - 6.0) * std::f64::consts::PI / 12.0;
        rng.gen_range(50.0..200.0) * angle.sin()
    } else {
        0.0
    };

    EnergyReading {
        timestamp_ms: Some(timestamp_ms),
        total_consumption,
        renewable_percentage: rng.gen_range(30.0..60.0),
        solar_output: Some(solar_output),
        wind_output: Some(rng.gen_range(20.0..80.0)),
        grid_load: Some(total_consumption * 0.85),
        peak_demand: Some(total_consumption * 1.2),
    }
}

pub fn environmental_reading<R: Rng + ?Sized>(
    rng: &mut R,
    timestamp_ms: i64,
) -> EnvironmentalReading {
    let hour = hour_of_day(timestamp_ms);
    let base_aqi: f64 = rng.gen_range(30.0..70.0);
    let modifier = match hour {
        7..=9 => 1.3,
        17..=19 => 1.2,
        2..=6 => 0.8,
        _ => 1.0,
    };

    EnvironmentalReading {
        timestamp_ms: Some(timestamp_ms),
        air_quality_index: (base_aqi * modifier).floor() as i64,
        pm25: Some(rng.gen_range(5.0..25.0)),
        pm10: Some(rng.gen_range(10.0..50.0)),
        temperature: Some(rng.gen_range(15.0..30.0)),
        humidity: Some(rng.gen_range(40.0..80.0)),
        noise_level: Some(rng.gen_range(45.0..75.0)),
    }
}

pub fn population_reading<R: Rng + ?Sized>(rng: &mut R, timestamp_ms: i64) -> PopulationReading {
    PopulationReading {
        timestamp_ms: Some(timestamp_ms),
        total_population: BASE_POPULATION + rng.gen_range(-1000..1000),
        active_users: Some(rng.gen_range(50_000..150_000)),
        growth_rate: Some(rng.gen_range(-0.5..2.5)),
        demographics: Some(serde_json::json!({
            "ageGroups": { "0-18": 22, "19-35": 35, "36-55": 28, "56+": 15 },
            "income": { "low": 30, "medium": 50, "high": 20 },
        })),
    }
}

/// What one simulator tick wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub readings: usize,
    pub population: bool,
}

/// Writes synthetic readings into the state store.
#[derive(Clone)]
pub struct Simulator {
    state: StateManager,
}

impl Simulator {
    pub fn new(state: StateManager) -> Self {
        Self { state }
    }

    /// Write one round of readings stamped with the current time.
    pub async fn tick(&self) -> Result<TickSummary> {
        self.tick_at(now_ms()).await
    }

    /// Write one round of readings stamped `timestamp_ms`.
    #[instrument(skip(self))]
    pub async fn tick_at(&self, timestamp_ms: i64) -> Result<TickSummary> {
        let (traffic, energy, environmental, population) = {
            let mut rng = rand::thread_rng();
            let population = rng
                .gen_bool(POPULATION_PROBABILITY)
                .then(|| population_reading(&mut rng, timestamp_ms));
            (
                traffic_reading(&mut rng, timestamp_ms),
                energy_reading(&mut rng, timestamp_ms),
                environmental_reading(&mut rng, timestamp_ms),
                population,
            )
        };

        self.state.insert_traffic(&traffic).await?;
        self.state.insert_energy(&energy).await?;
        self.state.insert_environmental(&environmental).await?;

        let mut summary = TickSummary { readings: 3, population: false };
        if let Some(population) = population {
            self.state.insert_population(&population).await?;
            summary.readings += 1;
            summary.population = true;
        }

        debug!(readings = summary.readings, "Data simulation cycle completed");
        Ok(summary)
    }

    /// Write `ticks` rounds spaced `spacing` apart, ending now.
    pub async fn backfill(&self, ticks: usize, spacing: Duration) -> Result<usize> {
        let now = now_ms();
        let spacing_ms = spacing.as_millis() as i64;
        let mut written = 0;
        for i in 0..ticks {
            let timestamp_ms = now - (ticks - 1 - i) as i64 * spacing_ms;
            written += self.tick_at(timestamp_ms).await?.readings;
        }
        info!(ticks, written, "Backfilled simulated readings");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::MetricKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 2024-01-01T08:00:00Z, inside the morning rush.
    const MORNING_RUSH: i64 = 1_704_096_000_000;

    #[test]
    fn test_hour_of_day() {
        assert_eq!(hour_of_day(0), 0);
        assert_eq!(hour_of_day(MORNING_RUSH), 8);
        assert_eq!(hour_of_day(MORNING_RUSH + 15 * HOUR_MS), 23);
        assert_eq!(hour_of_day(-HOUR_MS), 23);
    }

    #[test]
    fn test_congestion_levels() {
        assert_eq!(congestion_level(85.0), "high");
        assert_eq!(congestion_level(80.0), "medium");
        assert_eq!(congestion_level(61.0), "medium");
        assert_eq!(congestion_level(60.0), "low");
    }

    #[test]
    fn test_generated_values_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..48 {
            let ts = MORNING_RUSH + i * HOUR_MS;

            let traffic = traffic_reading(&mut rng, ts);
            assert!(traffic.flow_rate > 0.0 && traffic.flow_rate <= 100.0);
            assert!(TRAFFIC_LOCATIONS.contains(&traffic.location.as_str()));
            assert_eq!(traffic.congestion_level, congestion_level(traffic.flow_rate));

            let energy = energy_reading(&mut rng, ts);
            assert!(energy.total_consumption >= 560.0 && energy.total_consumption < 1200.0);
            assert!((30.0..60.0).contains(&energy.renewable_percentage));
            assert!(energy.solar_output.unwrap() >= 0.0);

            let env = environmental_reading(&mut rng, ts);
            assert!(env.air_quality_index >= 24 && env.air_quality_index < 91);

            let population = population_reading(&mut rng, ts);
            assert!((BASE_POPULATION - 1000..BASE_POPULATION + 1000)
                .contains(&population.total_population));
        }
    }

    #[test]
    fn test_rush_hour_raises_aqi() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..32 {
            let aqi = environmental_reading(&mut rng, MORNING_RUSH).air_quality_index;
            assert!((39..91).contains(&aqi), "{}", aqi);
        }
    }

    #[test]
    fn test_night_has_no_solar() {
        let mut rng = StdRng::seed_from_u64(1);
        let midnight = MORNING_RUSH - 8 * HOUR_MS;
        assert_eq!(energy_reading(&mut rng, midnight).solar_output, Some(0.0));
    }

    #[tokio::test]
    async fn test_tick_writes_core_readings() {
        let state = StateManager::new_in_memory().await.unwrap();
        let simulator = Simulator::new(state.clone());

        let summary = simulator.tick_at(MORNING_RUSH).await.unwrap();
        assert!(summary.readings >= 3);

        for key in [MetricKey::TrafficFlow, MetricKey::EnergyConsumption, MetricKey::AirQualityIndex]
        {
            let readings =
                state.readings_in_range(key, MORNING_RUSH, MORNING_RUSH).await.unwrap();
            assert_eq!(readings.len(), 1, "{}", key);
        }
    }

    #[tokio::test]
    async fn test_backfill_spans_window() {
        let state = StateManager::new_in_memory().await.unwrap();
        let simulator = Simulator::new(state.clone());

        simulator.backfill(12, Duration::from_secs(3600)).await.unwrap();

        let now = now_ms();
        let readings = state
            .readings_in_range(MetricKey::EnergyConsumption, now - 12 * HOUR_MS, now)
            .await
            .unwrap();
        assert_eq!(readings.len(), 12);
    }
}
