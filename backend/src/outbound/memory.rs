//! In-process repositories used when no database is configured.
//!
//! State lives behind a mutex and disappears with the process; suitable for
//! local development and tests only.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    GenerationOutcomeUpdate, GenerationPersistenceError, GenerationRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{Email, Generation, GenerationId, RecentLimit, UserAccount, UserId};

/// Mutex-guarded account store keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<Email, UserAccount>>,
}

impl InMemoryUserRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Email, UserAccount>>, UserPersistenceError> {
        self.accounts
            .lock()
            .map_err(|_| UserPersistenceError::query("user store mutex poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut accounts = self.lock()?;
        let email = account.user.email().clone();
        if accounts.contains_key(&email) {
            return Err(UserPersistenceError::duplicate_email(email.as_ref()));
        }
        accounts.insert(email, account.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        Ok(self.lock()?.get(email).cloned())
    }
}

/// Mutex-guarded generation store in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryGenerationRepository {
    generations: Mutex<Vec<Generation>>,
}

impl InMemoryGenerationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<Generation>>, GenerationPersistenceError> {
        self.generations
            .lock()
            .map_err(|_| GenerationPersistenceError::query("generation store mutex poisoned"))
    }
}

#[async_trait]
impl GenerationRepository for InMemoryGenerationRepository {
    async fn insert(&self, generation: &Generation) -> Result<(), GenerationPersistenceError> {
        let mut generations = self.lock()?;
        if generations.iter().any(|existing| existing.id == generation.id) {
            return Err(GenerationPersistenceError::query("duplicate generation id"));
        }
        generations.push(generation.clone());
        Ok(())
    }

    async fn update_outcome(
        &self,
        id: &GenerationId,
        user_id: &UserId,
        update: GenerationOutcomeUpdate,
    ) -> Result<Generation, GenerationPersistenceError> {
        let mut generations = self.lock()?;
        let Some(record) = generations
            .iter_mut()
            .find(|record| record.id == *id && record.user_id == *user_id)
        else {
            return Err(GenerationPersistenceError::not_found(id.to_string()));
        };
        record.status = update.status;
        record.generated_image_url = update.generated_image_url;
        record.updated_at = update.updated_at;
        Ok(record.clone())
    }

    async fn list_recent(
        &self,
        user_id: &UserId,
        limit: RecentLimit,
    ) -> Result<Vec<Generation>, GenerationPersistenceError> {
        let generations = self.lock()?;
        let mut owned: Vec<&Generation> = generations
            .iter()
            .filter(|record| record.user_id == *user_id)
            .collect();
        // Stable sort keeps later inserts first among equal timestamps.
        owned.reverse();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let take = usize::try_from(limit.get()).unwrap_or(usize::MAX);
        Ok(owned.into_iter().take(take).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{GenerationStatus, NewGeneration, Prompt, StyleName, User};
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;

    fn account(email: &str) -> UserAccount {
        UserAccount {
            user: User::new(UserId::random(), Email::new(email).expect("email")),
            password_hash: "hash".to_owned(),
        }
    }

    fn generation(user_id: UserId, minutes: i64) -> Generation {
        let base = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp");
        Generation::pending(NewGeneration {
            id: GenerationId::random(),
            user_id,
            prompt: Prompt::new(format!("prompt {minutes}")).expect("prompt"),
            style: StyleName::new("Minimal").expect("style"),
            original_image_url: "/uploads/x.png".to_owned(),
            created_at: base + Duration::minutes(minutes),
        })
    }

    #[tokio::test]
    async fn duplicate_emails_are_rejected() {
        let repo = InMemoryUserRepository::default();
        repo.create(&account("a@b.io")).await.expect("first");
        let err = repo.create(&account("a@b.io")).await.expect_err("second");
        assert_eq!(err, UserPersistenceError::duplicate_email("a@b.io"));
    }

    #[tokio::test]
    async fn finds_accounts_by_email() {
        let repo = InMemoryUserRepository::default();
        let stored = account("a@b.io");
        repo.create(&stored).await.expect("create");
        let found = repo
            .find_by_email(&Email::new("A@B.io").expect("email"))
            .await
            .expect("lookup");
        assert_eq!(found, Some(stored));
    }

    #[rstest]
    #[case(2, 2)]
    #[case(5, 3)]
    #[tokio::test]
    async fn lists_newest_first_for_owner_only(#[case] limit: i64, #[case] expected: usize) {
        let repo = InMemoryGenerationRepository::default();
        let owner = UserId::random();
        for minutes in [1, 3, 2] {
            repo.insert(&generation(owner, minutes)).await.expect("insert");
        }
        repo.insert(&generation(UserId::random(), 10))
            .await
            .expect("insert other");

        let listed = repo
            .list_recent(&owner, RecentLimit::new(limit))
            .await
            .expect("list");

        assert_eq!(listed.len(), expected);
        assert_eq!(listed.first().map(|g| g.prompt.as_str()), Some("prompt 3"));
        assert!(listed.iter().all(|g| g.user_id == owner));
    }

    #[tokio::test]
    async fn update_requires_matching_owner() {
        let repo = InMemoryGenerationRepository::default();
        let record = generation(UserId::random(), 0);
        repo.insert(&record).await.expect("insert");
        let update = GenerationOutcomeUpdate {
            status: GenerationStatus::Completed,
            generated_image_url: Some("/uploads/generated_1.jpg".to_owned()),
            updated_at: Utc::now(),
        };

        let err = repo
            .update_outcome(&record.id, &UserId::random(), update.clone())
            .await
            .expect_err("wrong owner");
        assert!(matches!(err, GenerationPersistenceError::NotFound { .. }));

        let updated = repo
            .update_outcome(&record.id, &record.user_id, update)
            .await
            .expect("owner");
        assert_eq!(updated.status, GenerationStatus::Completed);
        assert_eq!(updated.display_image_url(), "/uploads/generated_1.jpg");
    }
}
