//! Account API handlers.
//!
//! ```text
//! POST /auth/signup {"email":"ada@example.com","password":"hunter22"}
//! POST /auth/login  {"email":"ada@example.com","password":"hunter22"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    AccessToken, AuthSession, Credentials, CredentialsValidationError, Error, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Credentials body shared by signup and login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AuthRequest {
    /// Account email.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Plain-text password.
    #[schema(example = "hunter22")]
    pub password: String,
}

/// Successful signup or login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Human-readable outcome.
    #[schema(example = "Login successful")]
    pub message: String,
    /// Bearer token for the generation endpoints.
    pub token: AccessToken,
    /// The account.
    pub user: User,
}

impl AuthResponse {
    fn new(message: &str, session: AuthSession) -> Self {
        Self {
            message: message.to_owned(),
            token: session.token,
            user: session.user,
        }
    }
}

fn map_validation_error(err: &CredentialsValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

/// Create an account and return a bearer token for it.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = AuthRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "signup",
    security([])
)]
#[post("/auth/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    payload: web::Json<AuthRequest>,
) -> ApiResult<HttpResponse> {
    let AuthRequest { email, password } = payload.into_inner();
    let credentials =
        Credentials::for_signup(&email, &password).map_err(|err| map_validation_error(&err))?;
    let session = state.accounts.signup(&credentials).await?;
    Ok(HttpResponse::Created().json(AuthResponse::new("User created successfully", session)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<AuthRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let AuthRequest { email, password } = payload.into_inner();
    let credentials =
        Credentials::for_login(&email, &password).map_err(|err| map_validation_error(&err))?;
    let session = state.accounts.login(&credentials).await?;
    Ok(web::Json(AuthResponse::new("Login successful", session)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockAccountService;
    use crate::domain::{Email, UserId};
    use crate::inbound::http::test_utils::{TEST_USER_ID, state_with_accounts};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    fn session(email: &str) -> AuthSession {
        AuthSession {
            token: AccessToken::new("signed.jwt.token"),
            user: User::new(
                UserId::parse(TEST_USER_ID).expect("id"),
                Email::new(email).expect("email"),
            ),
        }
    }

    async fn post(accounts: MockAccountService, uri: &str, body: Value) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state_with_accounts(accounts)))
                .service(signup)
                .service(login),
        )
        .await;
        let request = actix_test::TestRequest::post()
            .uri(uri)
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[rstest]
    #[actix_web::test]
    async fn signup_returns_created_with_token_and_user() {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_signup()
            .withf(|creds| creds.email().as_ref() == "ada@example.com")
            .times(1)
            .returning(|creds| Ok(session(creds.email().as_ref())));

        let (status, body) = post(
            accounts,
            "/auth/signup",
            json!({"email": "Ada@Example.com", "password": "hunter22"}),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User created successfully");
        assert_eq!(body["token"], "signed.jwt.token");
        assert_eq!(body["user"]["id"], TEST_USER_ID);
        assert_eq!(body["user"]["email"], "ada@example.com");
    }

    #[rstest]
    #[case("not-an-email", "hunter22", "email")]
    #[case("ada@example.com", "short", "password")]
    #[actix_web::test]
    async fn signup_validation_failures_are_bad_requests(
        #[case] email: &str,
        #[case] password: &str,
        #[case] field: &str,
    ) {
        let mut accounts = MockAccountService::new();
        accounts.expect_signup().never();

        let (status, body) = post(
            accounts,
            "/auth/signup",
            json!({"email": email, "password": password}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_signup_is_conflict() {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_signup()
            .returning(|_| Err(Error::conflict("User with this email already exists")));

        let (status, body) = post(
            accounts,
            "/auth/signup",
            json!({"email": "ada@example.com", "password": "hunter22"}),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "User with this email already exists");
    }

    #[rstest]
    #[actix_web::test]
    async fn login_returns_ok_with_token() {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_login()
            .withf(|creds| creds.password() == "hunter22")
            .returning(|creds| Ok(session(creds.email().as_ref())));

        let (status, body) = post(
            accounts,
            "/auth/login",
            json!({"email": "ada@example.com", "password": "hunter22"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["token"], "signed.jwt.token");
    }

    #[rstest]
    #[actix_web::test]
    async fn login_failures_are_unauthorised() {
        let mut accounts = MockAccountService::new();
        accounts
            .expect_login()
            .returning(|_| Err(Error::unauthorized("Invalid email or password")));

        let (status, body) = post(
            accounts,
            "/auth/login",
            json!({"email": "ada@example.com", "password": "wrong-one"}),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");
    }

    #[rstest]
    #[actix_web::test]
    async fn login_requires_a_password() {
        let mut accounts = MockAccountService::new();
        accounts.expect_login().never();

        let (status, body) = post(
            accounts,
            "/auth/login",
            json!({"email": "ada@example.com", "password": ""}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Password is required");
    }
}
