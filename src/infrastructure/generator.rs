// Synthetic telemetry generator - Stands in for a real machine agent
use crate::domain::sample::Sample;
use crate::infrastructure::feed::TelemetryFeed;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;
use tokio::task::JoinHandle;

pub fn synthetic_sample<R: Rng>(rng: &mut R, timestamp: DateTime<Utc>) -> Sample {
    Sample::new(
        timestamp,
        rng.random_range(0.0..100.0),
        rng.random_range(0.0..100.0),
        rng.random_range(0.0..500.0),
        rng.random_range(30.0..80.0),
    )
}

/// Publish one synthetic sample per `interval` until the task is dropped.
pub fn spawn_generator(feed: TelemetryFeed, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let sample = synthetic_sample(&mut rand::rng(), Utc::now());
            match sample.to_json() {
                Ok(record) => {
                    let receivers = feed.publish(record);
                    tracing::debug!(
                        cpu = sample.cpu_usage,
                        ram = sample.ram_usage,
                        power = sample.power_usage,
                        temperature = sample.temperature,
                        receivers,
                        "published synthetic sample"
                    );
                }
                Err(e) => tracing::error!("failed to encode synthetic sample: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_stay_in_metric_ranges() {
        let mut rng = rand::rng();
        for _ in 0..500 {
            let sample = synthetic_sample(&mut rng, Utc::now());
            assert!((0.0..100.0).contains(&sample.cpu_usage));
            assert!((0.0..100.0).contains(&sample.ram_usage));
            assert!((0.0..500.0).contains(&sample.power_usage));
            assert!((30.0..80.0).contains(&sample.temperature));
        }
    }

    #[tokio::test]
    async fn test_generator_publishes_parseable_records() {
        let feed = TelemetryFeed::new();
        let mut rx = feed.subscribe();
        let task = spawn_generator(feed, Duration::from_millis(10));

        let record = rx.recv().await.unwrap();
        task.abort();
        assert!(Sample::from_json(&record).is_ok());
    }
}
