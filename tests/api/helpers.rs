use once_cell::sync::Lazy;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use school_console::api::ApiClient;
use school_console::core::config::ApiConfig;
use school_console::core::{get_subscriber, init_subscriber};
use school_console::notify::NotificationLog;
use school_console::session::SessionContext;

pub const TOKEN: &str = "test-token";

// Set TEST_LOG to see the client's logs while a test runs.
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "debug".to_string();
    let subscriber_name = "test".to_string();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        let _ = init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        let _ = init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub server: MockServer,
    pub api: ApiClient,
    pub session: SessionContext,
    pub notifications: NotificationLog,
}

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        page_size: 50,
        timeout_secs: 5,
        allow_insecure_credentials: false,
    }
}

/// Client signed in as an admin, talking to a fresh mock backend.
pub async fn spawn_app() -> TestApp {
    spawn_app_as(json!({"id": 1, "username": "admin", "role": "ADMIN"})).await
}

pub async fn spawn_app_as(user: Value) -> TestApp {
    Lazy::force(&TRACING);

    let server = MockServer::start().await;
    let session = SessionContext::with_token(TOKEN, Some(user));
    let api = ApiClient::new(&api_config(&format!("{}/api", server.uri())), session.clone())
        .expect("mock server uri is a valid base url");

    TestApp {
        server,
        api,
        session,
        notifications: NotificationLog::new(),
    }
}

impl TestApp {
    pub async fn mount_get(&self, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_schools(&self) {
        self.mount_get(
            "/api/schools",
            json!({"data": [
                {"id": 3, "school_code": "DPS01", "school_name": "Delhi Public School"},
                {"id": 4, "school_code": "KV02", "school_name": "Kendriya Vidyalaya"}
            ]}),
        )
        .await;
    }

    pub async fn requests_to(&self, route: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == route)
            .collect()
    }

    /// JSON body of the only request sent to `route`.
    pub async fn sent_json(&self, route: &str) -> Value {
        let requests = self.requests_to(route).await;
        assert_eq!(requests.len(), 1, "expected exactly one request to {}", route);
        serde_json::from_slice(&requests[0].body).expect("request body is json")
    }

    /// Raw multipart body of the only request sent to `route`.
    pub async fn sent_text(&self, route: &str) -> String {
        let requests = self.requests_to(route).await;
        assert_eq!(requests.len(), 1, "expected exactly one request to {}", route);
        String::from_utf8_lossy(&requests[0].body).into_owned()
    }
}
