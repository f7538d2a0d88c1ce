//! Mock image model with random latency and a configurable overload rate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, RngCore};
use tracing::{debug, info};

use crate::domain::Generation;
use crate::domain::generation_controller::{RetrySleeper, TokioSleeper};
use crate::domain::ports::{GenerationSimulator, SimulationVerdict};
use crate::outbound::storage::UPLOADS_URL_PREFIX;

/// Chance that a render reports the model as overloaded.
pub const DEFAULT_OVERLOAD_PROBABILITY: f64 = 0.2;
/// Shortest simulated render.
pub const MIN_LATENCY: Duration = Duration::from_millis(1_000);
/// Longest simulated render.
pub const MAX_LATENCY: Duration = Duration::from_millis(2_000);

/// Sleeps for a uniform 1..=2 s, then either fails with overload or returns
/// a fresh mock output URL.
#[derive(Clone)]
pub struct RandomGenerationSimulator {
    overload_probability: f64,
    min_latency: Duration,
    max_latency: Duration,
    sleeper: Arc<dyn RetrySleeper>,
}

impl RandomGenerationSimulator {
    /// Simulator with the given overload probability, clamped to `0.0..=1.0`.
    pub fn new(overload_probability: f64) -> Self {
        Self::with_sleeper(overload_probability, Arc::new(TokioSleeper))
    }

    /// Simulator whose latency waits go through `sleeper`.
    pub fn with_sleeper(overload_probability: f64, sleeper: Arc<dyn RetrySleeper>) -> Self {
        let overload_probability = if overload_probability.is_nan() {
            DEFAULT_OVERLOAD_PROBABILITY
        } else {
            overload_probability.clamp(0.0, 1.0)
        };
        Self {
            overload_probability,
            min_latency: MIN_LATENCY,
            max_latency: MAX_LATENCY,
            sleeper,
        }
    }

    /// Override the latency window.
    #[must_use]
    pub fn with_latency(mut self, min: Duration, max: Duration) -> Self {
        self.min_latency = min.min(max);
        self.max_latency = max.max(min);
        self
    }

    fn roll(&self) -> (Duration, bool, String) {
        let mut rng = rand::thread_rng();
        let latency = rng.gen_range(self.min_latency..=self.max_latency);
        let overloaded = rng.gen_bool(self.overload_probability);
        let mut name = [0_u8; 8];
        rng.fill_bytes(&mut name);
        let url = format!("{UPLOADS_URL_PREFIX}/generated_{}.jpg", hex::encode(name));
        (latency, overloaded, url)
    }
}

impl Default for RandomGenerationSimulator {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLOAD_PROBABILITY)
    }
}

#[async_trait]
impl GenerationSimulator for RandomGenerationSimulator {
    async fn render(&self, generation: &Generation) -> SimulationVerdict {
        let (latency, overloaded, image_url) = self.roll();
        debug!(generation_id = %generation.id, latency_ms = latency.as_millis(), "rendering");
        self.sleeper.sleep(latency).await;
        if overloaded {
            info!(generation_id = %generation.id, "simulated model overload");
            return SimulationVerdict::Overloaded;
        }
        SimulationVerdict::Completed { image_url }
    }
}
