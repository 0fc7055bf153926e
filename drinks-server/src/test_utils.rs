use crate::config::Settings;
use crate::create_app;
use crate::state::AppState;
use crate::storage::DrinkRepository;
use axum::body::Body;
use axum::response::Response;
use axum::Router;
use drinks_auth::testing::{self, TestIssuer};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Test fixture for driving the full application against a mocked identity
/// provider.
///
/// The fixture starts a mock JWKS endpoint serving the primary test key, an
/// in-memory database seeded with `water`, and the complete router. Tokens
/// for the mock provider come from [`TestFixture::bearer`].
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_endpoint() {
///     let fixture = TestFixture::new().await;
///     let bearer = fixture.bearer(&["post:drinks"]);
///
///     let response = fixture.post("/drinks", &new_drink, Some(&bearer)).await;
///
///     response.assert_ok();
///     assert_eq!(response.json["drinks"]["title"], "mocha");
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub settings: Settings,
    /// Mock server for the identity provider's key set
    pub jwks_mock: MockServer,
    /// Mints tokens accepted by the application
    pub issuer: TestIssuer,
}

impl TestFixture {
    /// Creates a fixture whose JWKS endpoint serves the primary test key
    pub async fn new() -> Self {
        let jwks_mock = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(testing::jwks()))
            .mount(&jwks_mock)
            .await;
        Self::build(jwks_mock, None).await
    }

    /// Creates a fixture whose JWKS endpoint fails every request
    pub async fn without_jwks() -> Self {
        let jwks_mock = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&jwks_mock)
            .await;
        Self::build(jwks_mock, None).await
    }

    /// Creates a fixture backed by `drinks` instead of the in-memory database
    pub async fn with_repository(drinks: Arc<dyn DrinkRepository>) -> Self {
        let jwks_mock = MockServer::start().await;
        Self::build(jwks_mock, Some(drinks)).await
    }

    async fn build(jwks_mock: MockServer, drinks: Option<Arc<dyn DrinkRepository>>) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let settings = Settings::for_test_with_mocks(&jwks_mock);
        let mut state = AppState::new(&settings)
            .await
            .expect("Failed to create application state");
        if let Some(drinks) = drinks {
            state.drinks = drinks;
        }

        Self {
            app: create_app(state),
            settings,
            jwks_mock,
            issuer: TestIssuer::default(),
        }
    }

    /// Initializes the test logger; repeated calls are ignored
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// `Authorization` header value for a valid token granting `permissions`
    pub fn bearer(&self, permissions: &[&str]) -> String {
        self.issuer.bearer(permissions)
    }

    /// Creates a request builder with an optional `Authorization` header and a
    /// JSON content type
    pub fn request_builder(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        authorization: Option<&str>,
    ) -> http::request::Builder {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri.as_ref())
            .header("Content-Type", "application/json");

        if let Some(authorization) = authorization {
            builder = builder.header("Authorization", authorization);
        }

        builder
    }

    pub async fn get(&self, uri: impl AsRef<str>, authorization: Option<&str>) -> TestResponse {
        self.send_raw(Method::GET, uri, "", authorization).await
    }

    pub async fn post<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        authorization: Option<&str>,
    ) -> TestResponse {
        self.send_json(Method::POST, uri, body, authorization).await
    }

    pub async fn patch<T: Serialize>(
        &self,
        uri: impl AsRef<str>,
        body: &T,
        authorization: Option<&str>,
    ) -> TestResponse {
        self.send_json(Method::PATCH, uri, body, authorization).await
    }

    pub async fn delete(&self, uri: impl AsRef<str>, authorization: Option<&str>) -> TestResponse {
        self.send_raw(Method::DELETE, uri, "", authorization).await
    }

    async fn send_json<T: Serialize>(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        body: &T,
        authorization: Option<&str>,
    ) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body to JSON");
        self.send_raw(method, uri, json_body, authorization).await
    }

    /// Sends `body` verbatim, for requests that are not valid JSON
    pub async fn send_raw(
        &self,
        method: Method,
        uri: impl AsRef<str>,
        body: impl Into<String>,
        authorization: Option<&str>,
    ) -> TestResponse {
        let request = self
            .request_builder(method, uri, authorization)
            .body(Body::from(body.into()))
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns the raw response
    pub async fn send_raw_response(&self, request: Request<Body>) -> Response {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Sends a request and returns a TestResponse
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.send_raw_response(request).await;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !body.is_empty() {
            serde_json::from_slice(&body).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse { status, json }
    }

    /// Asserts the application never asked the identity provider for keys
    pub async fn assert_no_jwks_requests(&self) {
        let requests = self
            .jwks_mock
            .received_requests()
            .await
            .expect("Request recording is enabled by default");
        assert!(
            requests.is_empty(),
            "Expected no JWKS requests but got {}",
            requests.len()
        );
    }
}

/// Response from a test request that provides convenient access to status and JSON body
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match the expected value.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {} with body: {}",
            expected,
            self.status,
            serde_json::to_string_pretty(&self.json).unwrap_or_default()
        );
        self
    }

    /// Asserts that the response status is OK (200)
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }
}
