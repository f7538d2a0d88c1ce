//! Driven port standing in for the image model.

use async_trait::async_trait;

use crate::domain::Generation;

/// What the simulated model produced for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationVerdict {
    /// Rendering finished with an image at `image_url`.
    Completed {
        /// Public URL of the mock output.
        image_url: String,
    },
    /// The model refused the request because it is overloaded.
    Overloaded,
}

/// Simulated rendering. Implementations decide latency and failure rate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationSimulator: Send + Sync {
    /// Render `generation`, returning once the simulated work is done.
    async fn render(&self, generation: &Generation) -> SimulationVerdict;
}
