//! Generation domain service implementing the command and query ports.
//!
//! Creating a generation stores the source image, inserts a `pending`
//! record, runs the simulated model, and writes the terminal status back
//! before answering. An overloaded model leaves a `failed` record behind.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    CreateGenerationRequest, GenerationCommand, GenerationOutcomeUpdate,
    GenerationPersistenceError, GenerationQuery, GenerationRepository, GenerationSimulator,
    ImageStore, ImageStoreError, SimulationVerdict,
};
use crate::domain::{
    Error, Generation, GenerationId, GenerationStatus, NewGeneration, RecentLimit, UserId,
};

/// Message returned when the simulated model rejects a request.
pub const MODEL_OVERLOADED: &str = "Model overloaded";

/// Generation service over a repository and the storage/simulation adapters.
#[derive(Clone)]
pub struct GenerationStudioService<R> {
    generations: Arc<R>,
    images: Arc<dyn ImageStore>,
    simulator: Arc<dyn GenerationSimulator>,
    clock: Arc<dyn Clock>,
}

impl<R> GenerationStudioService<R> {
    /// Create a service with the given adapters.
    pub fn new(
        generations: Arc<R>,
        images: Arc<dyn ImageStore>,
        simulator: Arc<dyn GenerationSimulator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            generations,
            images,
            simulator,
            clock,
        }
    }
}

fn map_repository_error(error: GenerationPersistenceError) -> Error {
    match error {
        GenerationPersistenceError::NotFound { id } => {
            Error::not_found(format!("generation {id} not found"))
        }
        GenerationPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("generation repository unavailable: {message}"))
        }
        GenerationPersistenceError::Query { message } => {
            Error::internal(format!("generation repository error: {message}"))
        }
    }
}

fn map_store_error(error: ImageStoreError) -> Error {
    Error::internal(error.to_string())
}

impl<R> GenerationStudioService<R>
where
    R: GenerationRepository,
{
    async fn record_outcome(
        &self,
        generation: &Generation,
        status: GenerationStatus,
        generated_image_url: Option<String>,
    ) -> Result<Generation, Error> {
        let update = GenerationOutcomeUpdate {
            status,
            generated_image_url,
            updated_at: self.clock.utc(),
        };
        self.generations
            .update_outcome(&generation.id, &generation.user_id, update)
            .await
            .map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> GenerationCommand for GenerationStudioService<R>
where
    R: GenerationRepository,
{
    async fn create(&self, request: CreateGenerationRequest) -> Result<Generation, Error> {
        let CreateGenerationRequest {
            user_id,
            prompt,
            style,
            image,
        } = request;

        let original_image_url = self.images.store(&image).await.map_err(map_store_error)?;
        let pending = Generation::pending(NewGeneration {
            id: GenerationId::random(),
            user_id,
            prompt,
            style,
            original_image_url,
            created_at: self.clock.utc(),
        });
        self.generations
            .insert(&pending)
            .await
            .map_err(map_repository_error)?;
        info!(generation_id = %pending.id, user_id = %pending.user_id, "generation pending");

        match self.simulator.render(&pending).await {
            SimulationVerdict::Overloaded => {
                self.record_outcome(&pending, GenerationStatus::Failed, None)
                    .await?;
                warn!(generation_id = %pending.id, "generation failed: model overloaded");
                Err(Error::service_unavailable(MODEL_OVERLOADED)
                    .with_details(json!({ "generationId": pending.id })))
            }
            SimulationVerdict::Completed { image_url } => {
                let completed = self
                    .record_outcome(&pending, GenerationStatus::Completed, Some(image_url))
                    .await?;
                info!(generation_id = %completed.id, "generation completed");
                Ok(completed)
            }
        }
    }
}

#[async_trait]
impl<R> GenerationQuery for GenerationStudioService<R>
where
    R: GenerationRepository,
{
    async fn recent(&self, user_id: &UserId, limit: RecentLimit) -> Result<Vec<Generation>, Error> {
        self.generations
            .list_recent(user_id, limit)
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{MockGenerationRepository, MockGenerationSimulator, MockImageStore};
    use crate::domain::{ErrorCode, Prompt, StyleName, UploadedImage};
    use chrono::{DateTime, TimeZone, Utc};
    use mockable::MockClock;
    use mockall::predicate::eq;
    use rstest::rstest;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    fn clock() -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(fixed_now);
        Arc::new(clock)
    }

    fn request(user_id: UserId) -> CreateGenerationRequest {
        CreateGenerationRequest {
            user_id,
            prompt: Prompt::new("neon skyline").expect("prompt"),
            style: StyleName::new("Cyberpunk").expect("style"),
            image: UploadedImage::new("city.png", "image/png", vec![1, 2, 3], 1024)
                .expect("image"),
        }
    }

    fn storing_images() -> MockImageStore {
        let mut images = MockImageStore::new();
        images
            .expect_store()
            .times(1)
            .returning(|_| Ok("/uploads/0123456789abcdef0123456789abcdef.png".to_owned()));
        images
    }

    fn simulator(verdict: SimulationVerdict) -> MockGenerationSimulator {
        let mut simulator = MockGenerationSimulator::new();
        simulator
            .expect_render()
            .times(1)
            .returning(move |_| verdict.clone());
        simulator
    }

    fn applying_updates(repo: &mut MockGenerationRepository, expected: GenerationStatus) {
        repo.expect_insert()
            .withf(|generation| {
                generation.status == GenerationStatus::Pending
                    && generation.original_image_url.ends_with(".png")
            })
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_update_outcome()
            .withf(move |_, _, update| update.status == expected)
            .times(1)
            .returning(|id, user_id, update| {
                Ok(Generation {
                    id: *id,
                    user_id: *user_id,
                    prompt: "neon skyline".to_owned(),
                    style: "Cyberpunk".to_owned(),
                    original_image_url: "/uploads/0123456789abcdef0123456789abcdef.png"
                        .to_owned(),
                    generated_image_url: update.generated_image_url,
                    status: update.status,
                    created_at: fixed_now(),
                    updated_at: update.updated_at,
                })
            });
    }

    fn service(
        repo: MockGenerationRepository,
        images: MockImageStore,
        simulator: MockGenerationSimulator,
    ) -> GenerationStudioService<MockGenerationRepository> {
        GenerationStudioService::new(Arc::new(repo), Arc::new(images), Arc::new(simulator), clock())
    }

    #[tokio::test]
    async fn completed_generation_records_rendered_url() {
        let mut repo = MockGenerationRepository::new();
        applying_updates(&mut repo, GenerationStatus::Completed);
        let service = service(
            repo,
            storing_images(),
            simulator(SimulationVerdict::Completed {
                image_url: "/uploads/generated_00112233aabbccdd.jpg".to_owned(),
            }),
        );

        let generation = service
            .create(request(UserId::random()))
            .await
            .expect("completed");

        assert_eq!(generation.status, GenerationStatus::Completed);
        assert_eq!(
            generation.display_image_url(),
            "/uploads/generated_00112233aabbccdd.jpg"
        );
        assert_eq!(generation.updated_at, fixed_now());
    }

    #[tokio::test]
    async fn overloaded_generation_is_persisted_as_failed() {
        let mut repo = MockGenerationRepository::new();
        applying_updates(&mut repo, GenerationStatus::Failed);
        let service = service(repo, storing_images(), simulator(SimulationVerdict::Overloaded));

        let err = service
            .create(request(UserId::random()))
            .await
            .expect_err("overloaded");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(err.message(), MODEL_OVERLOADED);
        let details = err.details().expect("details");
        assert!(details["generationId"].is_string());
    }

    #[tokio::test]
    async fn storage_failure_skips_persistence() {
        let mut images = MockImageStore::new();
        images
            .expect_store()
            .returning(|_| Err(ImageStoreError::io("disk full")));
        let mut repo = MockGenerationRepository::new();
        repo.expect_insert().never();
        let mut simulator = MockGenerationSimulator::new();
        simulator.expect_render().never();

        let err = service(repo, images, simulator)
            .create(request(UserId::random()))
            .await
            .expect_err("storage failure");

        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[case(GenerationPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(GenerationPersistenceError::query("bad sql"), ErrorCode::InternalError)]
    #[case(GenerationPersistenceError::not_found("x"), ErrorCode::NotFound)]
    #[tokio::test]
    async fn recent_maps_repository_errors(
        #[case] failure: GenerationPersistenceError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockGenerationRepository::new();
        repo.expect_list_recent()
            .returning(move |_, _| Err(failure.clone()));

        let err = service(repo, MockImageStore::new(), MockGenerationSimulator::new())
            .recent(&UserId::random(), RecentLimit::default())
            .await
            .expect_err("failure");

        assert_eq!(err.code(), expected);
    }

    #[tokio::test]
    async fn recent_passes_the_limit_through() {
        let user_id = UserId::random();
        let mut repo = MockGenerationRepository::new();
        repo.expect_list_recent()
            .with(eq(user_id), eq(RecentLimit::new(20)))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let generations = service(repo, MockImageStore::new(), MockGenerationSimulator::new())
            .recent(&user_id, RecentLimit::new(20))
            .await
            .expect("listed");

        assert!(generations.is_empty());
    }
}
