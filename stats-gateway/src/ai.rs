//! Forwarding of AI-backed routes to the backend.
//!
//! Requests are relayed with their method, headers and body. Responses are
//! streamed back unchanged, which keeps server-sent events flowing, unless the
//! route asks for a typed check of the payload.

use crate::ResponseBody;
use crate::errors::{GatewayError, UpstreamError};
use http::header::{CONTENT_TYPE, HOST, HeaderValue};
use http::request::Parts;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::http::{add_via_header, full_body, normalize_headers};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

#[derive(Clone, Debug)]
pub struct AiForwarder {
    client: Client<HttpConnector, Full<Bytes>>,
    base_url: Url,
    timeout: Duration,
}

impl AiForwarder {
    pub fn new(base_url: Url, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            base_url,
            timeout,
        }
    }

    /// Relays the request and streams the response body back as it arrives.
    ///
    /// The timeout bounds the wait for the response head only.
    pub async fn stream(
        &self,
        parts: &Parts,
        body: Bytes,
    ) -> Result<Response<ResponseBody>, GatewayError> {
        let response = self.send(parts, body).await?;
        Ok(response.map(|body| {
            body.map_err(|e| GatewayError::Stream(e.to_string()))
                .boxed()
        }))
    }

    /// Relays the request and checks a successful response against `T`.
    ///
    /// Error responses from the backend are passed through untouched.
    pub async fn validated<T: Payload>(
        &self,
        parts: &Parts,
        body: Bytes,
    ) -> Result<Response<ResponseBody>, GatewayError> {
        let response = self.send(parts, body).await?;
        let (mut head, body) = response.into_parts();
        let bytes = timeout(self.timeout, body.collect())
            .await
            .map_err(|_| {
                GatewayError::Upstream(UpstreamError::Timeout(parts.uri.path().to_string()))
            })?
            .map_err(|e| GatewayError::Stream(e.to_string()))?
            .to_bytes();

        if !head.status.is_success() {
            return Ok(Response::from_parts(head, full_body(bytes)));
        }

        let payload = decode_payload::<T>(&bytes)?;
        let normalized = serde_json::to_vec(&payload)?;
        head.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Response::from_parts(head, full_body(normalized)))
    }

    async fn send(&self, parts: &Parts, body: Bytes) -> Result<Response<Incoming>, GatewayError> {
        let url = self.upstream_url(parts)?;
        let label = parts.uri.path().to_string();

        let mut headers = parts.headers.clone();
        normalize_headers(&mut headers, parts.version);
        headers.remove(HOST);
        add_via_header(&mut headers, parts.version);

        let mut builder = Request::builder()
            .method(parts.method.clone())
            .uri(url.as_str());
        if let Some(request_headers) = builder.headers_mut() {
            *request_headers = headers;
        }
        let request = builder
            .body(Full::new(body))
            .map_err(|e| GatewayError::Internal(format!("Failed to build request: {e}")))?;

        tracing::debug!(%url, method = %parts.method, "forwarding AI request");
        let response = timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| GatewayError::Upstream(UpstreamError::Timeout(label.clone())))?
            .map_err(|e| GatewayError::Upstream(UpstreamError::Request(label, e.to_string())))?;

        let (mut head, body) = response.into_parts();
        let version = head.version;
        normalize_headers(&mut head.headers, version);
        add_via_header(&mut head.headers, version);
        Ok(Response::from_parts(head, body))
    }

    /// Appends the request path to the backend base path and keeps the query.
    fn upstream_url(&self, parts: &Parts) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base_path}{}", parts.uri.path()));
        url.set_query(parts.uri.query());
        if url.cannot_be_a_base() {
            return Err(GatewayError::Upstream(UpstreamError::InvalidUrl(
                url.to_string(),
            )));
        }
        Ok(url)
    }
}

/// A backend payload that is decoded and checked before it reaches the client.
pub trait Payload: DeserializeOwned + Serialize {
    fn validate(&self) -> Result<(), String>;
}

pub fn decode_payload<T: Payload>(bytes: &[u8]) -> Result<T, GatewayError> {
    let payload: T =
        serde_json::from_slice(bytes).map_err(|e| GatewayError::InvalidPayload(e.to_string()))?;
    payload.validate().map_err(GatewayError::InvalidPayload)?;
    Ok(payload)
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardInsights {
    pub insights: Vec<Insight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl Payload for DashboardInsights {
    fn validate(&self) -> Result<(), String> {
        for (index, insight) in self.insights.iter().enumerate() {
            if insight.title.trim().is_empty() {
                return Err(format!("insight {index} has an empty title"));
            }
            if insight.description.trim().is_empty() {
                return Err(format!("insight {index} has an empty description"));
            }
            if let Some(confidence) = insight.confidence
                && !(0.0..=1.0).contains(&confidence)
            {
                return Err(format!("insight {index} has confidence {confidence}"));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[serde(alias = "queued")]
    Pending,
    #[serde(alias = "processing")]
    Running,
    Completed,
    Failed,
}

/// State of an asynchronous dashboard insights job.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsJob {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<DashboardInsights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Payload for InsightsJob {
    fn validate(&self) -> Result<(), String> {
        if self.job_id.trim().is_empty() {
            return Err("job has an empty id".to_string());
        }
        match (&self.status, &self.result) {
            (JobStatus::Completed, None) => Err("completed job has no result".to_string()),
            (_, Some(result)) => result.validate(),
            _ => Ok(()),
        }
    }
}
