//! Server construction and middleware wiring.

mod config;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use settings::StudioSettings;

use state_builders::build_http_state;

use std::path::PathBuf;

use actix_files::Files;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

use studio::Trace;
#[cfg(debug_assertions)]
use studio::doc::ApiDoc;
use studio::inbound::http::accounts::{login, signup};
use studio::inbound::http::generations::{create_generation, list_generations};
use studio::inbound::http::health::{HealthState, health, live, ready};
use studio::inbound::http::state::HttpState;
use studio::outbound::storage::UPLOADS_URL_PREFIX;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    upload_dir: PathBuf,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        upload_dir,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(signup)
        .service(login)
        .service(create_generation)
        .service(list_generations)
        .service(Files::new(UPLOADS_URL_PREFIX, upload_dir))
        .service(health)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

#[cfg(feature = "metrics")]
fn make_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("studio")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("configure Prometheus metrics: {e}")))
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] with the bind address, upload directory, secrets and optional pool.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the upload directory cannot be opened or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let upload_dir = config.upload_dir.clone();
    let bind_addr = config.bind_addr();

    #[cfg(feature = "metrics")]
    let prometheus = make_metrics()?;

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            upload_dir: upload_dir.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! End-to-end checks through the assembled application.

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};
    use zeroize::Zeroizing;

    fn app_dependencies(upload_dir: PathBuf) -> AppDependencies {
        let config = ServerConfig::new(
            "127.0.0.1:0".parse().expect("addr"),
            upload_dir.clone(),
            Zeroizing::new(b"server-test-secret".to_vec()),
        )
        .with_bcrypt_cost(4);
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        AppDependencies {
            health_state,
            http_state: build_http_state(&config).expect("state"),
            upload_dir,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn signup_then_list_round_trips_through_the_api() {
        let temp = tempfile::tempdir().expect("tempdir");
        let app =
            actix_test::init_service(build_app(app_dependencies(temp.path().to_path_buf()))).await;

        let signup_request = actix_test::TestRequest::post()
            .uri("/auth/signup")
            .set_json(json!({ "email": "grace@example.com", "password": "cobol59" }))
            .to_request();
        let response = actix_test::call_service(&app, signup_request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().contains_key("trace-id"));
        let body: Value = actix_test::read_body_json(response).await;
        let token = body["token"].as_str().expect("token").to_owned();

        let list_request = actix_test::TestRequest::get()
            .uri("/generations?limit=3")
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let listed: Value = actix_test::call_and_read_body_json(&app, list_request).await;
        assert_eq!(listed, json!([]));
    }

    #[rstest]
    #[actix_web::test]
    async fn generations_require_a_bearer_token() {
        let temp = tempfile::tempdir().expect("tempdir");
        let app =
            actix_test::init_service(build_app(app_dependencies(temp.path().to_path_buf()))).await;

        let request = actix_test::TestRequest::get()
            .uri("/generations")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("/health", StatusCode::OK)]
    #[case("/health/ready", StatusCode::OK)]
    #[case("/health/live", StatusCode::OK)]
    #[case("/uploads/missing.png", StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn unauthenticated_routes_are_mounted(#[case] uri: &str, #[case] expected: StatusCode) {
        let temp = tempfile::tempdir().expect("tempdir");
        let app =
            actix_test::init_service(build_app(app_dependencies(temp.path().to_path_buf()))).await;

        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), expected);
    }
}
