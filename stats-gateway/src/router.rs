use crate::ResponseBody;
use crate::aggregator::ProfileAggregator;
use crate::ai::AiForwarder;
use crate::api::ai::{AiHandler, PayloadCheck};
use crate::api::lookup::{ChallengesHandler, LeagueHandler, MasteryHandler};
use crate::api::player::{MatchPageHandler, ProfileHandler};
use crate::api::{GatewayRequest, Handler, UnconfiguredHandler};
use crate::config::Config;
use crate::errors::GatewayError;
use http::Method;
use http_body_util::BodyExt;
use hyper::body::Body;
use hyper::{Request, Response};
use shared::routing::{Resolution, Route, RouteTable};
use std::sync::Arc;

const AI_ROUTES: &[(Method, &str, &str, PayloadCheck)] = &[
    (Method::POST, "/api/ai/analyze", "ai_analyze", PayloadCheck::None),
    (Method::POST, "/api/ai/chat", "ai_chat", PayloadCheck::None),
    (
        Method::POST,
        "/api/ai/dashboard-insights",
        "ai_dashboard_insights",
        PayloadCheck::Insights,
    ),
    (
        Method::POST,
        "/api/ai/dashboard-insights/start",
        "ai_dashboard_insights_start",
        PayloadCheck::None,
    ),
    (
        Method::GET,
        "/api/ai/dashboard-insights/status/{jobId}",
        "ai_dashboard_insights_status",
        PayloadCheck::Job,
    ),
    (
        Method::POST,
        "/api/ai/year-end-summary",
        "ai_year_end_summary",
        PayloadCheck::None,
    ),
];

/// Matches incoming requests against the gateway routes and runs the handler.
#[derive(Clone)]
pub struct Router {
    routes: Arc<RouteTable<Arc<dyn Handler>>>,
    configured: bool,
}

impl Router {
    /// Builds the route table from a validated config.
    ///
    /// Without a backend URL every route answers with a configuration error
    /// and no network call is ever made.
    pub fn new(config: &Config) -> Self {
        let (routes, configured) = match ProfileAggregator::from_config(config) {
            Ok(aggregator) => {
                let forwarder = AiForwarder::new(
                    aggregator.backend_url().clone(),
                    config.backend.ai_timeout(),
                );
                tracing::info!(backend = %aggregator.backend_url(), "routing to backend");
                let routes = build_routes(|route| handler_for(route, &aggregator, &forwarder));
                (routes, true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "API routes will fail until a backend is configured");
                let routes = build_routes(|route| -> Arc<dyn Handler> {
                    Arc::new(UnconfiguredHandler { name: route.name() })
                });
                (routes, false)
            }
        };

        Self {
            routes: Arc::new(routes),
            configured,
        }
    }

    /// Whether the routes talk to a backend.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Routes an incoming request to the matching handler.
    pub async fn route<B>(&self, req: Request<B>) -> Result<Response<ResponseBody>, GatewayError>
    where
        B: Body + Send + 'static,
        B::Error: std::fmt::Display,
    {
        let (handler, params) = match self.routes.resolve(req.method(), req.uri().path()) {
            Resolution::Matched(m) => (m.action.clone(), m.params),
            Resolution::MethodNotAllowed => return Err(GatewayError::MethodNotAllowed),
            Resolution::NotFound => {
                tracing::debug!(method = %req.method(), path = %req.uri().path(), "No route matched");
                return Err(GatewayError::NotFound);
            }
        };

        let (parts, body) = req.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| GatewayError::RequestBody(e.to_string()))?
            .to_bytes();

        tracing::debug!(handler = handler.name(), "Matched route");
        handler
            .handle(GatewayRequest::new(parts, params, body))
            .await
    }

    /// Name of the handler serving `method` and `path`, for metrics tags.
    pub fn handler_name(&self, method: &Method, path: &str) -> &'static str {
        match self.routes.resolve(method, path) {
            Resolution::Matched(m) => m.action.name(),
            Resolution::MethodNotAllowed | Resolution::NotFound => "unmatched",
        }
    }
}

/// Every client-facing route, with the handler name used for logs and metrics.
#[derive(Clone, Copy, Debug)]
enum GatewayRoute {
    Profile,
    MatchPage,
    Challenges,
    Mastery,
    League,
    Ai(usize),
}

impl GatewayRoute {
    fn name(self) -> &'static str {
        match self {
            GatewayRoute::Profile => "profile",
            GatewayRoute::MatchPage => "match_page",
            GatewayRoute::Challenges => "challenges",
            GatewayRoute::Mastery => "champion_mastery",
            GatewayRoute::League => "league",
            GatewayRoute::Ai(index) => AI_ROUTES[index].2,
        }
    }
}

fn build_routes<F>(mut make: F) -> RouteTable<Arc<dyn Handler>>
where
    F: FnMut(GatewayRoute) -> Arc<dyn Handler>,
{
    let mut routes = vec![
        Route::new(
            Method::GET,
            "/api/player/{gameName}/{tagLine}",
            make(GatewayRoute::Profile),
        ),
        Route::new(
            Method::GET,
            "/api/player/{gameName}/{tagLine}/matches",
            make(GatewayRoute::MatchPage),
        ),
        Route::new(
            Method::GET,
            "/api/challenges/{gameName}/{tagLine}",
            make(GatewayRoute::Challenges),
        ),
        Route::new(
            Method::GET,
            "/api/champion-mastery",
            make(GatewayRoute::Mastery),
        ),
        Route::new(Method::GET, "/api/league", make(GatewayRoute::League)),
    ];
    for (index, (method, path, _, _)) in AI_ROUTES.iter().enumerate() {
        routes.push(Route::new(method.clone(), path, make(GatewayRoute::Ai(index))));
    }
    RouteTable::new(routes)
}

fn handler_for(
    route: GatewayRoute,
    aggregator: &ProfileAggregator,
    forwarder: &AiForwarder,
) -> Arc<dyn Handler> {
    let aggregator = aggregator.clone();
    match route {
        GatewayRoute::Profile => Arc::new(ProfileHandler { aggregator }),
        GatewayRoute::MatchPage => Arc::new(MatchPageHandler { aggregator }),
        GatewayRoute::Challenges => Arc::new(ChallengesHandler { aggregator }),
        GatewayRoute::Mastery => Arc::new(MasteryHandler { aggregator }),
        GatewayRoute::League => Arc::new(LeagueHandler { aggregator }),
        GatewayRoute::Ai(index) => Arc::new(AiHandler {
            name: route.name(),
            forwarder: forwarder.clone(),
            check: AI_ROUTES[index].3,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{MockBackend, Reply};
    use http_body_util::Full;
    use hyper::StatusCode;
    use hyper::body::Bytes;
    use url::Url;

    fn request(method: Method, uri: &str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_unconfigured_backend_fails_every_route() {
        let router = Router::new(&Config::default());

        for uri in [
            "/api/player/Faker/KR1",
            "/api/player/Faker/KR1/matches",
            "/api/challenges/Faker/KR1",
            "/api/league?puuid=p-1",
        ] {
            let err = router.route(request(Method::GET, uri)).await.unwrap_err();
            assert!(matches!(err, GatewayError::BackendNotConfigured), "{uri}");
        }
        let err = router
            .route(request(Method::POST, "/api/ai/chat"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::BackendNotConfigured));
    }

    #[tokio::test]
    async fn test_unknown_routes() {
        let router = Router::new(&Config::default());

        let err = router.route(request(Method::GET, "/api/nope")).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = router
            .route(request(Method::DELETE, "/api/player/a/b"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_handler_names() {
        let router = Router::new(&Config::default());
        assert!(!router.is_configured());
        assert_eq!(router.handler_name(&Method::GET, "/api/player/a/b"), "profile");
        assert_eq!(
            router.handler_name(&Method::GET, "/api/ai/dashboard-insights/status/j-1"),
            "ai_dashboard_insights_status"
        );
        assert_eq!(router.handler_name(&Method::GET, "/"), "unmatched");
    }

    #[tokio::test]
    async fn test_mastery_requires_puuid() {
        let mock = MockBackend::start().await;
        let mut config = Config::default();
        config.backend.url = Some(Url::parse(&mock.url()).unwrap());
        let router = Router::new(&config);

        let err = router
            .route(request(Method::GET, "/api/champion-mastery?region=asia"))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingParameter("puuid")));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_routes_reach_backend() {
        let mock = MockBackend::start().await;
        mock.reply(
            "/api/league/v4/entries/by-puuid/p-1",
            Reply::json(200, r#"[{"tier":"GOLD"}]"#),
        );
        let mut config = Config::default();
        config.backend.url = Some(Url::parse(&mock.url()).unwrap());
        let router = Router::new(&config);

        let response = router
            .route(request(Method::GET, "/api/league?puuid=p-1&region=europe"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            mock.requests(),
            vec!["/api/league/v4/entries/by-puuid/p-1?region=euw1"]
        );
    }
}
