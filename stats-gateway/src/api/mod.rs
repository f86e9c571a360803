pub mod ai;
pub mod lookup;
pub mod player;
pub mod utils;

use crate::ResponseBody;
use crate::errors::GatewayError;
use async_trait::async_trait;
use http::request::Parts;
use hyper::Response;
use hyper::body::Bytes;
use std::collections::HashMap;

/// A client request after routing: path parameters and query are decoded and
/// the body has been read.
#[derive(Debug)]
pub struct GatewayRequest {
    pub parts: Parts,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Bytes,
}

impl GatewayRequest {
    pub fn new(parts: Parts, params: HashMap<String, String>, body: Bytes) -> Self {
        let query = parts
            .uri
            .query()
            .map(utils::parse_query)
            .unwrap_or_default();
        Self {
            parts,
            params,
            query,
            body,
        }
    }

    /// A path parameter that must be present and non-blank.
    pub fn param(&self, name: &'static str) -> Result<&str, GatewayError> {
        self.params
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or(GatewayError::MissingParameter(name))
    }

    /// A query parameter, `None` when absent or blank.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn required_query(&self, name: &'static str) -> Result<&str, GatewayError> {
        self.query(name).ok_or(GatewayError::MissingParameter(name))
    }
}

/// Endpoint implementation behind a route.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle(&self, request: GatewayRequest) -> Result<Response<ResponseBody>, GatewayError>;
}

/// Installed on every route when no backend URL is configured.
pub struct UnconfiguredHandler {
    pub name: &'static str,
}

#[async_trait]
impl Handler for UnconfiguredHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(&self, _request: GatewayRequest) -> Result<Response<ResponseBody>, GatewayError> {
        Err(GatewayError::BackendNotConfigured)
    }
}
