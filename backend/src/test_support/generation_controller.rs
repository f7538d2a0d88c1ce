//! Shared test doubles for generation request controller tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::{Notify, mpsc};

use crate::domain::generation_controller::RetrySleeper;
use crate::domain::ports::{
    GenerationPayload, GenerationRequest, GenerationSubmitError, GenerationSubmitter,
};
use crate::domain::{GenerationId, GenerationStatus, Prompt, StyleName, UploadedImage};

/// Request used by controller tests.
pub fn sample_request() -> GenerationRequest {
    let prompt = match Prompt::new("a fox in a trench coat") {
        Ok(prompt) => prompt,
        Err(error) => panic!("sample prompt: {error}"),
    };
    let style = match StyleName::new("Editorial") {
        Ok(style) => style,
        Err(error) => panic!("sample style: {error}"),
    };
    let image = match UploadedImage::new("fox.png", "image/png", vec![0x89, 0x50], 1024) {
        Ok(image) => image,
        Err(error) => panic!("sample image: {error}"),
    };
    GenerationRequest {
        prompt,
        style,
        image,
    }
}

/// Completed payload tagged with `n` so tests can tell attempts apart.
pub fn sample_payload(n: u8) -> GenerationPayload {
    let created_at = match Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single() {
        Some(at) => at,
        None => panic!("valid timestamp"),
    };
    GenerationPayload {
        id: GenerationId::from(uuid::Uuid::from_u128(u128::from(n))),
        image_url: format!("/uploads/generated_{n:016x}.jpg"),
        prompt: "a fox in a trench coat".to_owned(),
        style: "Editorial".to_owned(),
        created_at,
        status: GenerationStatus::Completed,
    }
}

/// Submitter that replays a script of results, one per call.
///
/// Optionally announces each call on `entered` and then blocks until
/// `release` is notified.
pub struct ScriptedSubmitter {
    scripted: Mutex<VecDeque<Result<GenerationPayload, GenerationSubmitError>>>,
    calls: AtomicUsize,
    entered: Option<mpsc::UnboundedSender<usize>>,
    release: Option<Arc<Notify>>,
}

impl ScriptedSubmitter {
    /// Replay `scripted` without blocking.
    pub fn scripted(scripted: Vec<Result<GenerationPayload, GenerationSubmitError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            calls: AtomicUsize::new(0),
            entered: None,
            release: None,
        }
    }

    /// Replay `scripted`, parking each call until `release` fires.
    pub fn blocking(
        scripted: Vec<Result<GenerationPayload, GenerationSubmitError>>,
        entered: mpsc::UnboundedSender<usize>,
        release: Arc<Notify>,
    ) -> Self {
        Self {
            entered: Some(entered),
            release: Some(release),
            ..Self::scripted(scripted)
        }
    }

    /// Number of submissions made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationSubmitter for ScriptedSubmitter {
    async fn submit(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GenerationPayload, GenerationSubmitError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(entered) = &self.entered {
            if entered.send(call).is_err() {
                panic!("submission observer dropped");
            }
        }
        if let Some(release) = &self.release {
            release.notified().await;
        }
        let next = match self.scripted.lock() {
            Ok(mut scripted) => scripted.pop_front(),
            Err(_) => panic!("script mutex"),
        };
        match next {
            Some(result) => result,
            None => panic!("submitter script exhausted after {call} calls"),
        }
    }
}

/// Sleeper that returns immediately and records requested delays.
#[derive(Default)]
pub struct RecordingSleeper(pub Mutex<Vec<Duration>>);

impl RecordingSleeper {
    /// Delays requested so far.
    pub fn recorded(&self) -> Vec<Duration> {
        match self.0.lock() {
            Ok(entries) => entries.clone(),
            Err(_) => panic!("sleeper mutex"),
        }
    }
}

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        match self.0.lock() {
            Ok(mut entries) => entries.push(duration),
            Err(_) => panic!("sleeper mutex"),
        }
    }
}

/// Sleeper that announces the requested delay and never wakes up.
pub struct StalledSleeper {
    entered: mpsc::UnboundedSender<Duration>,
}

impl StalledSleeper {
    /// Report every wait on `entered`.
    pub fn new(entered: mpsc::UnboundedSender<Duration>) -> Self {
        Self { entered }
    }
}

#[async_trait]
impl RetrySleeper for StalledSleeper {
    async fn sleep(&self, duration: Duration) {
        if self.entered.send(duration).is_err() {
            panic!("sleep observer dropped");
        }
        std::future::pending::<()>().await;
    }
}
