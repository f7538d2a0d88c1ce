//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use crate::domain::ports::{MockAccountService, MockGenerationCommand, MockGenerationQuery};
use crate::domain::{Email, TokenClaims, UserId};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Fixed user id used across handler tests.
pub const TEST_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Claims for [`TEST_USER_ID`].
pub fn sample_claims() -> TokenClaims {
    TokenClaims {
        user_id: UserId::parse(TEST_USER_ID).expect("fixture user id"),
        email: Email::new("ada@example.com").expect("fixture email"),
    }
}

/// Account double that accepts the token `good` for [`sample_claims`].
pub fn accepting_accounts() -> MockAccountService {
    let mut accounts = MockAccountService::new();
    accounts
        .expect_authenticate()
        .withf(|token| token == "good")
        .returning(|_| Ok(sample_claims()));
    accounts
}

/// Build state from explicit doubles with the given upload limit.
pub fn state_with(
    accounts: MockAccountService,
    generations: MockGenerationCommand,
    generations_query: MockGenerationQuery,
    max_upload_bytes: usize,
) -> HttpState {
    HttpState::new(
        HttpStatePorts {
            accounts: Arc::new(accounts),
            generations: Arc::new(generations),
            generations_query: Arc::new(generations_query),
        },
        max_upload_bytes,
    )
}

/// State where only the account port is expected to be used.
pub fn state_with_accounts(accounts: MockAccountService) -> HttpState {
    state_with(
        accounts,
        MockGenerationCommand::new(),
        MockGenerationQuery::new(),
        1024,
    )
}
