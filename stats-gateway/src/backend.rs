use crate::errors::UpstreamError;
use crate::model::{Account, Summoner};
use crate::retry::RetryPolicy;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Upper bound for upstream error text copied into client responses.
const MAX_MESSAGE_LEN: usize = 200;

/// Typed client for the stats backend.
///
/// Every call goes through the configured [`RetryPolicy`]. Path segments are
/// percent-encoded, so Riot IDs with spaces or non-ASCII characters are safe.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl BackendClient {
    pub fn new(base_url: Url, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            retry,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn account_by_riot_id(
        &self,
        game_name: &str,
        tag_line: &str,
        region: &str,
    ) -> Result<Account, UpstreamError> {
        let url = self.endpoint(
            &[
                "api", "riot", "account", "v1", "accounts", "by-riot-id", game_name, tag_line,
            ],
            &[("region", region)],
        )?;
        self.get_json("account", url).await
    }

    pub async fn summoner_by_puuid(
        &self,
        puuid: &str,
        platform: &str,
    ) -> Result<Summoner, UpstreamError> {
        let url = self.endpoint(
            &["api", "summoner", "v4", "summoners", "by-puuid", puuid],
            &[("region", platform)],
        )?;
        self.get_json("summoner", url).await
    }

    pub async fn match_ids(
        &self,
        puuid: &str,
        region: &str,
        count: usize,
    ) -> Result<Vec<String>, UpstreamError> {
        let count = count.to_string();
        let url = self.endpoint(
            &["api", "match", "v5", "matches", "by-puuid", puuid, "ids"],
            &[("region", region), ("count", &count)],
        )?;
        self.get_json("match_ids", url).await
    }

    pub async fn match_detail(&self, match_id: &str, region: &str) -> Result<Value, UpstreamError> {
        let url = self.endpoint(
            &["api", "match", "v5", "matches", match_id],
            &[("region", region)],
        )?;
        self.get_json("match_detail", url).await
    }

    pub async fn champion_mastery(
        &self,
        puuid: &str,
        platform: &str,
    ) -> Result<Vec<Value>, UpstreamError> {
        let url = self.endpoint(
            &[
                "api",
                "champion-mastery",
                "v4",
                "champion-masteries",
                "by-puuid",
                puuid,
            ],
            &[("region", platform)],
        )?;
        self.get_json("champion_mastery", url).await
    }

    pub async fn league_entries(
        &self,
        puuid: &str,
        platform: &str,
    ) -> Result<Vec<Value>, UpstreamError> {
        let url = self.endpoint(
            &["api", "league", "v4", "entries", "by-puuid", puuid],
            &[("region", platform)],
        )?;
        self.get_json("league_entries", url).await
    }

    pub async fn challenges(&self, puuid: &str, platform: &str) -> Result<Value, UpstreamError> {
        let url = self.endpoint(
            &["api", "challenges", "v1", "player-data", "by-puuid", puuid],
            &[("region", platform)],
        )?;
        self.get_json("challenges", url).await
    }

    pub async fn clash_players(
        &self,
        summoner_id: &str,
        platform: &str,
    ) -> Result<Value, UpstreamError> {
        let url = self.endpoint(
            &["api", "clash", "v1", "players", "by-summoner", summoner_id],
            &[("region", platform)],
        )?;
        self.get_json("clash_players", url).await
    }

    pub async fn clash_tournaments(&self, platform: &str) -> Result<Value, UpstreamError> {
        let url = self.endpoint(
            &["api", "clash", "v1", "tournaments"],
            &[("region", platform)],
        )?;
        self.get_json("clash_tournaments", url).await
    }

    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        label: &'static str,
        url: Url,
    ) -> Result<T, UpstreamError> {
        self.retry
            .run(label, || self.fetch_once(label, url.clone()))
            .await
    }

    /// One attempt: send, check the status and decode the JSON body.
    async fn fetch_once<T: DeserializeOwned>(
        &self,
        label: &'static str,
        url: Url,
    ) -> Result<T, UpstreamError> {
        tracing::debug!(endpoint = label, %url, "calling backend");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(label.to_string(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                endpoint: label.to_string(),
                status,
                message: upstream_message(status, &body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(label.to_string(), e.to_string()))
    }
}

/// Pulls a readable message out of an upstream error body.
///
/// Understands `{"message": ..}`, `{"error": ..}` and Riot's
/// `{"status": {"message": ..}}`, then falls back to the raw text and finally
/// to the status reason.
fn upstream_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("message")
            .or_else(|| json.get("error"))
            .or_else(|| json.pointer("/status/message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    let text = body.trim();
    from_json
        .or_else(|| (!text.is_empty() && !text.starts_with('{')).then(|| text.to_string()))
        .map(|message| message.chars().take(MAX_MESSAGE_LEN).collect())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Upstream error")
                .to_string()
        })
}
