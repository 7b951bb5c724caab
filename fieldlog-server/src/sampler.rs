//! Periodic sampling task
//!
//! One background loop reads the sensor, stamps the reading and hands it
//! to the engine. The interval is re-read from shared state on every
//! tick, so a settings change takes effect on the next cycle without a
//! restart.

use fieldlog_core::{LogEngine, SensorReading, SensorSource, TimeSource};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Simulated environment sensor
///
/// Random walk around plausible room conditions, so the service produces
/// data on hosts without real hardware. Real drivers implement
/// [`SensorSource`] and replace this in `main`.
pub struct SimulatedSensor {
    temperature: f32,
    humidity: f32,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self {
            temperature: 21.0,
            humidity: 45.0,
        }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorSource for SimulatedSensor {
    fn read(&mut self) -> Option<SensorReading> {
        let mut rng = rand::thread_rng();
        self.temperature = (self.temperature + rng.gen_range(-0.3..0.3)).clamp(-10.0, 45.0);
        self.humidity = (self.humidity + rng.gen_range(-1.0..1.0)).clamp(5.0, 95.0);
        Some(SensorReading {
            temperature: self.temperature,
            humidity: self.humidity,
        })
    }
}

/// Run the sampling loop until the process exits
pub async fn run(
    engine: Arc<Mutex<LogEngine>>,
    mut sensor: impl SensorSource,
    clock: impl TimeSource,
    interval_seconds: Arc<AtomicU64>,
) {
    info!(
        "sampler started, interval {}s",
        interval_seconds.load(Ordering::Relaxed)
    );

    loop {
        let secs = interval_seconds.load(Ordering::Relaxed).max(1);
        tokio::time::sleep(Duration::from_secs(secs)).await;

        let Some(reading) = sensor.read() else {
            warn!("sensor delivered no reading this cycle");
            continue;
        };
        if !reading.is_valid() {
            warn!("sensor delivered a non-finite reading, skipping");
            continue;
        }

        let now = clock.now();
        let outcome = engine
            .lock()
            .record(now, reading.temperature, reading.humidity);
        match outcome {
            Ok(outcome) => debug!("sample at {now}: {outcome:?}"),
            Err(e) => warn!("sample at {now} dropped: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_range() {
        let mut sensor = SimulatedSensor::new();
        for _ in 0..500 {
            let reading = sensor.read().unwrap();
            assert!(reading.is_valid());
            assert!((-10.0..=45.0).contains(&reading.temperature));
            assert!((5.0..=95.0).contains(&reading.humidity));
        }
    }

    #[test]
    fn test_sensor_walk() {
        let mut sensor = SimulatedSensor::new();
        let first = sensor.read().unwrap();
        let second = sensor.read().unwrap();
        assert!((second.temperature - first.temperature).abs() < 0.3 + f32::EPSILON);
        assert!((second.humidity - first.humidity).abs() < 1.0 + f32::EPSILON);
    }
}
