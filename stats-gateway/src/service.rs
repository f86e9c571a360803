use crate::ResponseBody;
use crate::config::{Config, Environment};
use crate::errors::GatewayError;
use crate::metrics_defs::{REQUEST_DURATION, REQUESTS_INFLIGHT};
use crate::router::Router;
use hyper::body::{Body, Incoming};
use hyper::service::Service;
use hyper::{Request, Response};
use shared::{gauge, histogram};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

/// Client-facing service: routes the request and renders failures as JSON
/// error envelopes.
#[derive(Clone)]
pub struct GatewayService {
    router: Router,
    environment: Environment,
}

impl GatewayService {
    pub fn new(config: &Config) -> Self {
        Self {
            router: Router::new(config),
            environment: config.environment,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.router.is_configured()
    }

    /// Never fails: handler errors become error responses.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<ResponseBody>
    where
        B: Body + Send + 'static,
        B::Error: std::fmt::Display,
    {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let handler = self.router.handler_name(&method, &path);

        gauge!(REQUESTS_INFLIGHT).increment(1.0);
        let response = match self.router.route(req).await {
            Ok(response) => response,
            Err(e) => {
                if e.status().is_server_error() {
                    tracing::error!(%method, %path, handler, error = %e, "request failed");
                } else {
                    tracing::info!(%method, %path, handler, error = %e, "request rejected");
                }
                e.into_response(self.environment)
            }
        };
        gauge!(REQUESTS_INFLIGHT).decrement(1.0);

        let status = response.status();
        let elapsed = started.elapsed();
        histogram!(
            REQUEST_DURATION,
            "status" => status.as_str().to_string(),
            "handler" => handler
        )
        .record(elapsed.as_secs_f64());
        tracing::info!(
            %method,
            %path,
            handler,
            status = status.as_u16(),
            duration_ms = elapsed.as_millis() as u64,
            "request handled"
        );

        response
    }
}

impl Service<Request<Incoming>> for GatewayService {
    type Response = Response<ResponseBody>;
    type Error = GatewayError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{MockBackend, Reply};
    use http_body_util::{BodyExt, Full};
    use hyper::StatusCode;
    use hyper::body::Bytes;
    use serde_json::{Value, json};
    use url::Url;

    fn get(uri: &str) -> Request<Full<Bytes>> {
        Request::get(uri).body(Full::new(Bytes::new())).unwrap()
    }

    async fn body_json(response: Response<ResponseBody>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn configured(mock: &MockBackend, environment: Environment) -> GatewayService {
        let mut config = Config::default();
        config.environment = environment;
        config.backend.url = Some(Url::parse(&mock.url()).unwrap());
        config.backend.retry.base_delay_ms = 1;
        config.backend.match_batch.delay_ms = 1;
        GatewayService::new(&config)
    }

    #[tokio::test]
    async fn test_missing_backend_is_500() {
        let service = GatewayService::new(&Config::default());
        assert!(!service.is_ready());

        let response = service.handle(get("/api/player/Faker/KR1")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Backend URL is not configured"})
        );
    }

    #[tokio::test]
    async fn test_account_failure_mirrors_upstream_status() {
        let mock = MockBackend::start().await;
        mock.reply(
            "/api/riot/account/v1/accounts/by-riot-id/Nobody/000",
            Reply::json(404, r#"{"message":"Data not found - No results found for player"}"#),
        );
        let service = configured(&mock, Environment::Development);
        assert!(service.is_ready());

        let response = service.handle(get("/api/player/Nobody/000")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"message": "Account not found: Data not found - No results found for player"})
        );
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_profile_route() {
        let mock = MockBackend::start().await;
        mock.reply(
            "/api/riot/account/v1/accounts/by-riot-id/Hide%20on%20bush/KR1",
            Reply::json(200, r#"{"puuid":"p-1","gameName":"Hide on bush","tagLine":"KR1"}"#),
        );
        mock.reply(
            "/api/match/v5/matches/by-puuid/p-1/ids",
            Reply::json(200, r#"["KR_1","KR_2","KR_3"]"#),
        );
        mock.reply("/api/match/v5/matches/KR_1", Reply::json(200, r#"{"id":1}"#));
        mock.reply("/api/match/v5/matches/KR_3", Reply::json(200, r#"{"id":3}"#));
        let service = configured(&mock, Environment::Production);

        let response = service
            .handle(get("/api/player/Hide%20on%20bush/KR1?region=asia&count=2"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["account"]["gameName"], "Hide on bush");
        assert_eq!(json["matches"], json!([{"id": 1}]));
        assert_eq!(json["hasMore"], true);
        assert_eq!(json["totalFetched"], 2);
        assert_eq!(json["summoner"], Value::Null);
        assert_eq!(json["championMastery"], json!([]));
        assert_eq!(json["clash"], Value::Null);
        assert_eq!(json["platform"], "kr");
    }

    #[tokio::test]
    async fn test_bad_query_is_400() {
        let mock = MockBackend::start().await;
        let service = configured(&mock, Environment::Development);

        let response = service
            .handle(get("/api/player/Faker/KR1/matches?start=abc"))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert!(json.get("details").is_none());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_details_in_development() {
        let mock = MockBackend::start().await;
        mock.reply(
            "/api/ai/dashboard-insights",
            Reply::json(200, r#"{"insights":"not a list"}"#),
        );

        let request = || {
            Request::post("/api/ai/dashboard-insights")
                .body(Full::new(Bytes::from_static(b"{}")))
                .unwrap()
        };

        let response = configured(&mock, Environment::Development)
            .handle(request())
            .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(response).await;
        assert!(json["message"].as_str().unwrap().starts_with("Invalid payload"));
        assert!(json["details"].as_str().unwrap().starts_with("InvalidPayload"));

        let response = configured(&mock, Environment::Production)
            .handle(request())
            .await;
        assert!(body_json(response).await.get("details").is_none());
    }
}
